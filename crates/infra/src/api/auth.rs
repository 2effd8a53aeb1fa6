//! Authentication endpoints
//!
//! Credentials are cookies held by the gateway's cookie store; these calls
//! only move identities around.

use std::sync::Arc;

use async_trait::async_trait;
use marops_core::session::ports::AuthPort;
use marops_domain::{Result, User};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use super::client::ApiClient;

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    senha: &'a str,
}

/// Login answers either `{"user": {...}}` or the user itself.
#[derive(Deserialize)]
#[serde(untagged)]
enum LoginResponse {
    Wrapped { user: User },
    Bare(User),
}

impl From<LoginResponse> for User {
    fn from(response: LoginResponse) -> Self {
        match response {
            LoginResponse::Wrapped { user } | LoginResponse::Bare(user) => user,
        }
    }
}

/// [`AuthPort`] over `/auth/*`
pub struct ApiAuthService {
    client: Arc<ApiClient>,
}

impl ApiAuthService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuthPort for ApiAuthService {
    #[instrument(skip(self))]
    async fn current_user(&self) -> Result<User> {
        Ok(self.client.get::<User>("/auth/me/").await?)
    }

    #[instrument(skip(self, senha))]
    async fn login(&self, email: &str, senha: &str) -> Result<User> {
        let response: LoginResponse =
            self.client.post("/auth/login/", &LoginRequest { email, senha }).await?;
        Ok(response.into())
    }

    #[instrument(skip(self))]
    async fn logout(&self) -> Result<()> {
        self.client.post_empty::<Value>("/auth/logout/").await?;
        Ok(())
    }
}
