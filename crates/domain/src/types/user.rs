//! Authenticated user identity
//!
//! Returned by `GET /auth/me/` and under `user` by `POST /auth/login/`.

use serde::{Deserialize, Serialize};

use super::RecordId;
use crate::impl_wire_enum_conversions;

/// Department a user belongs to; drives route permissions and the menu.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Sector {
    Production,
    Stock,
    Finance,
    /// Administrators pass every sector check in the menu.
    Admin,
    Other(String),
}

impl_wire_enum_conversions!(Sector {
    Production => "PRODUCAO",
    Stock => "ESTOQUE",
    Finance => "FINANCEIRO",
    Admin => "ADM",
} else Other);

impl Default for Sector {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl Sector {
    /// Path a user of this sector lands on after login.
    #[must_use]
    pub fn landing_path(&self) -> String {
        format!("/{}/inicio", self.to_string().to_lowercase())
    }
}

/// `perfil` block of the user payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub setor: Sector,
    #[serde(default)]
    pub cargo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: RecordId,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub perfil: Profile,
}

impl User {
    #[must_use]
    pub const fn sector(&self) -> &Sector {
        &self.perfil.setor
    }
}
