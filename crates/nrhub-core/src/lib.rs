//! # nrhub Core Library
//!
//! Grouping of RNA chains into Integrated Functional Elements (IFEs) and the
//! chain-to-chain discrepancy layer used to build non-redundant (NR) sets of
//! RNA 3D structures.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Typed records (`Chain`, `ChainInfo`,
//!   `DiscrepancyEntry`), the repository traits every data source implements,
//!   the CSV-backed [`TableStore`](core::io::tables::TableStore) and the
//!   numeric discrepancy kernel.
//!
//! - **[`engine`]: The Logic Core.** The IFE grouping algorithm, chain and
//!   correspondence resolution, NR sequence grouping, pair selection and the
//!   discrepancy computer with its known-pair cache.
//!
//! - **[`workflows`]: The Public API.** Batch drivers that run the engine over
//!   a set of structures and report per-structure or per-pair outcomes.

pub mod core;
pub mod engine;
pub mod workflows;
