//! Graph compilation
//!
//! Maps a [`crate::extract::Note`] onto typed entities, relations and
//! properties, recording every creation as an [`Op`].
//!
//! ## Modules
//!
//! - [`ops`]: operation log entries
//! - [`factory`]: `OpsFactory` trait and `LocalOpsFactory`
//! - [`models`]: compiled entities/relations and compile options
//! - [`compiler`]: `GraphCompiler`

pub mod compiler;
pub mod factory;
pub mod models;
pub mod ops;

pub use compiler::{description, format_time, GraphCompiler};
pub use factory::{
    Created, EntityDraft, LocalOpsFactory, OpsFactory, PropertyDraft, RelationDraft, TypeDraft,
};
pub use models::*;
pub use ops::{DataType, Op, PropertyValue};
