//! Numeric comparison of aligned unit geometry.
//!
//! The engine only depends on the [`GeometryEngine`](discrepancy::GeometryEngine)
//! capability; [`MatrixDiscrepancy`](discrepancy::MatrixDiscrepancy) is the
//! in-process implementation.

pub mod discrepancy;
