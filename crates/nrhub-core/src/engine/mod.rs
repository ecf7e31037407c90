//! # Engine Module
//!
//! The algorithms that turn chain metadata and unit geometry into IFE groups
//! and chain-to-chain discrepancies.
//!
//! ## Overview
//!
//! Work flows leaves first. [`grouping`] partitions the chains of one
//! structure into IFEs. [`nr`] links the representative chains of those IFEs
//! across structures into NR groups, and [`selection`] enumerates the chain
//! pairs inside each group that still need a comparison. For every pair,
//! [`resolver`] and [`correspondence`] resolve the chain pose and the
//! sequence alignment, and [`discrepancy`] loads the aligned unit geometry
//! and scores it.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - thresholds and preference orders, with defaults
//! - **Errors and outcomes** ([`error`], [`outcome`]) - hard failures vs. per-pair skips
//! - **Progress Monitoring** ([`progress`]) - callback based progress reporting
//! - **Known pairs** ([`cache`]) - order independent set of already compared pairs
//! - **Alignment planning** ([`alignment`]) - sequence pairs that still need an alignment
//!
//! Every component receives its data source as a trait object from
//! [`crate::core::io::traits`], never a global handle.

pub mod alignment;
pub mod cache;
pub mod config;
pub mod correspondence;
pub mod discrepancy;
pub mod error;
pub mod grouping;
pub mod nr;
pub mod outcome;
pub mod progress;
pub mod resolver;
pub mod selection;
