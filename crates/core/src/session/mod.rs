//! Session management
//!
//! The session store owns the authenticated identity for the lifetime of a
//! client instance. It is constructed explicitly and passed to whoever needs
//! it; there is no global session.

pub mod ports;
pub mod store;

pub use store::{SessionState, SessionStore};
