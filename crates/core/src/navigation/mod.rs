//! Navigation shell
//!
//! Route table, route guard, sector-aware menu and the navigator that ties
//! them to the session.

pub mod guard;
pub mod menu;
pub mod navigator;
pub mod ports;
pub mod routes;

pub use guard::{evaluate, GuardOutcome};
pub use menu::{menu_for, MenuEntry, MenuSection, Sidebar};
pub use navigator::{Navigation, Navigator};
pub use routes::{RouteMatch, RouteTable, Screen};
