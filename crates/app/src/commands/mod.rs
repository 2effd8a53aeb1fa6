//! User-facing command flows
//!
//! Each flow ties a core controller call to navigation and is logged through
//! [`crate::utils::command_helpers`].

pub mod session;

pub use session::{login, logout, restore_session};
