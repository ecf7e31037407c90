//! Provides access to the externally maintained tables the engine consumes.
//!
//! The engine never talks to a concrete store. It receives implementations of
//! the repository traits in [`traits`], which keeps the algorithms testable
//! against in-memory fixtures. [`tables::TableStore`] implements every trait
//! over the CSV bulk-import tables of the surrounding pipeline.

pub(crate) mod records;
pub mod tables;
pub mod traits;
