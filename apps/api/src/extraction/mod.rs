//! Document text extraction: PDF bytes in, whitespace-normalized text out.

pub mod normalize;
pub mod pdf;

pub use normalize::normalize_whitespace;
pub use pdf::{extract_text_from_pdf, ExtractionError};
