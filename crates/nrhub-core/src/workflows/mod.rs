//! # Workflows Module
//!
//! Batch drivers that run the engine over a set of structures against the
//! data stores and report what happened to every structure or pair.
//!
//! ## Architecture
//!
//! - **Grouping Workflow** ([`group`]) - IFE grouping of each requested
//!   structure, failures reported per structure.
//! - **Comparison Workflow** ([`compare`]) - NR grouping, pair selection and
//!   discrepancy computation, with computed rows written to the sink.
//! - **Alignment Workflow** ([`align`]) - sequence pairs that still need an
//!   alignment.
//!
//! Each workflow emits [`Progress`](crate::engine::progress::Progress) events
//! through the caller's reporter and never aborts a batch for a failure that
//! is local to one structure or one pair.

pub mod align;
pub mod compare;
pub mod group;
