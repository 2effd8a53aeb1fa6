//! Port interfaces for authentication
//!
//! Credentials travel as cookies managed by the transport; these calls only
//! exchange identities.

use async_trait::async_trait;
use marops_domain::{Result, User};

/// Trait for the backend authentication endpoints
#[async_trait]
pub trait AuthPort: Send + Sync {
    /// Identity bound to the current credentials (`GET /auth/me/`)
    async fn current_user(&self) -> Result<User>;

    /// Exchange email and password for credentials (`POST /auth/login/`)
    async fn login(&self, email: &str, senha: &str) -> Result<User>;

    /// Invalidate the current credentials (`POST /auth/logout/`)
    async fn logout(&self) -> Result<()>;
}
