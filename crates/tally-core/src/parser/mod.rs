//! Free-text transaction line parsing.

mod text_blob;

pub use text_blob::{ParsedLine, TextBlobParser};
