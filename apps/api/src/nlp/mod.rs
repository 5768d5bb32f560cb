//! Named-entity recognition over resume text.
//!
//! The recognizer itself is a pretrained artifact loaded from disk once at
//! startup (`ModelHandle::load`). This module only consumes its output:
//! `categorizer` sorts labelled spans into the fixed display buckets.

pub mod categorizer;
pub mod entity;
pub mod pattern_model;
pub mod recognizer;

pub use categorizer::{categorize, CategoryBuckets};
pub use entity::Entity;
pub use recognizer::{EntityRecognizer, ModelHandle};
