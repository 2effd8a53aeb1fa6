//! Client-local persistence
//!
//! Holds the file-backed implementation of the chart cache port.

pub mod chart_cache;

pub use chart_cache::FileChartCache;
