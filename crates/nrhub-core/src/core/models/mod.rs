//! # Core Models Module
//!
//! Explicit typed records for everything the grouping and comparison stages
//! read or write. Data sources construct these immediately after a lookup;
//! nothing downstream handles untyped rows.
//!
//! - [`ids`] - opaque database keys for chains, sequences and correspondences
//! - [`chain`] - chain records and the structuredness classification
//! - [`interactions`] - the sparse chain-pair interaction count matrix
//! - [`ife`] - IFE groups produced by the grouper
//! - [`unit`] - unit identifiers and per-unit center/rotation geometry
//! - [`info`] - resolved chain metadata used for comparison
//! - [`correspondence`] - sequence alignments and their unit pairs
//! - [`discrepancy`] - persisted chain-to-chain discrepancy rows

pub mod chain;
pub mod correspondence;
pub mod discrepancy;
pub mod ids;
pub mod ife;
pub mod info;
pub mod interactions;
pub mod unit;
