//! Content extraction
//!
//! Turns raw vault notes into normalized [`Note`] values: resolved title,
//! cleaned text, tags, links, headings and code/callout/table blocks.

pub mod content;
pub mod extractor;
pub mod models;

pub use content::{clean_content, extract_blocks, extract_links, extract_tags, resolve_title};
pub use extractor::{extract, NoteExtractor};
pub use models::*;
