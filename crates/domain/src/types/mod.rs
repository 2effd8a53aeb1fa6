//! Domain types and models
//!
//! Entities exchanged with the operations backend plus the client-side line
//! status rule.

pub mod ids;
pub mod line;
pub mod production;
pub mod stock;
pub mod user;

pub use ids::RecordId;
pub use line::{derive_line_status, LineStatus};
pub use production::{
    ItemCountField, LotStatus, MaterialLine, MaterialRequest, NewProductionItem, NewProductionLot,
    ProductionItem, ProductionLot,
};
pub use stock::{IntakeLine, StockIntake, StockRecord};
pub use user::{Profile, Sector, User};
