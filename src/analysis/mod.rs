//! Analysis modules.
//!
//! Aggregation of the sales dataset into summary statistics.

pub mod aggregator;

pub use aggregator::*;
