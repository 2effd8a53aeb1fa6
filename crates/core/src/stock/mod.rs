//! Stock screens
//!
//! - [`StockOverview`]: most critical insumos and products, open lots
//! - [`StockIntakeForm`]: invoice-based raw material intake
//! - [`StockChart`]: lowest-stock products, cached locally

pub mod chart;
pub mod intake;
pub mod overview;
pub mod ports;

pub use chart::{CachedChart, ChartPoint, StockChart};
pub use intake::{IntakeRow, StockIntakeForm};
pub use overview::StockOverview;
