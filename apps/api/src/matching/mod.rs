//! Job-description matching — pluggable scorer comparing detected skills to a pasted JD.
//!
//! Default: `SubstringMatchScorer` (keyword containment, deterministic).
//! `AppState` holds an `Arc<dyn MatchScorer>` so a semantic backend can replace it.

pub mod scorer;

pub use scorer::{MatchResult, MatchScorer, SubstringMatchScorer};
