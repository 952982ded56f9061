//! Rule-based normalizers and heuristics shared by all extractors.

pub mod amounts;
pub mod category;
pub mod patterns;

pub use amounts::{normalize, AmountToken};
pub use category::{classify, classify_with_direction};
