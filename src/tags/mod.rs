//! Tag index
//!
//! Vault-wide tag analytics built from a raw-text scan of every note, plus
//! bulk rename and delete.
//!
//! ## Modules
//!
//! - [`scan`]: content-text tag scan and tag colours
//! - [`cache`]: `TagCache` snapshot with a freshness window
//! - [`index`]: `TagIndex` queries and mutations
//! - [`models`]: result types

pub mod cache;
pub mod index;
pub mod models;
pub mod scan;

pub use cache::{TagCache, DEFAULT_TAG_CACHE_TTL};
pub use index::TagIndex;
pub use models::*;
pub use scan::{scan_content_tags, tag_color};
