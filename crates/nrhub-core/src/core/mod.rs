//! # Core Module
//!
//! Stateless building blocks shared by the grouping and comparison engine.
//!
//! - **Records** ([`models`]) - chains, interaction matrices, IFE groups, units,
//!   correspondences and discrepancy rows
//! - **Data access** ([`io`]) - repository traits and the CSV table store
//! - **Geometry** ([`geometry`]) - the injected discrepancy kernel and its
//!   `nalgebra` implementation

pub mod geometry;
pub mod io;
pub mod models;
