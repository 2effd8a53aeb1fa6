//! Helpers shared by the command flows

pub mod command_helpers;
pub mod health;
pub mod logging;
