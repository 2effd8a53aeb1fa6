//! Session store

use std::sync::Arc;

use marops_domain::{MarOpsError, Result, Sector, User};
use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::{info, instrument, warn};

use super::ports::AuthPort;

/// Resolution of the current identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Identity check still running; routes render a placeholder.
    #[default]
    Loading,
    Authenticated(User),
    Unauthenticated,
}

impl SessionState {
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated(user) => Some(user),
            Self::Loading | Self::Unauthenticated => None,
        }
    }
}

/// Holds the session and performs the login/logout round-trips.
pub struct SessionStore {
    auth: Arc<dyn AuthPort>,
    state: RwLock<SessionState>,
    changes: watch::Sender<SessionState>,
}

impl SessionStore {
    pub fn new(auth: Arc<dyn AuthPort>) -> Self {
        let (changes, _) = watch::channel(SessionState::Loading);
        Self { auth, state: RwLock::new(SessionState::Loading), changes }
    }

    /// Resolve the identity once per client start.
    #[instrument(skip(self))]
    pub async fn init(&self) -> SessionState {
        let resolved = match self.auth.current_user().await {
            Ok(user) => {
                info!(user = %user.email, sector = %user.sector(), "Session restored");
                SessionState::Authenticated(user)
            }
            Err(err) => {
                info!(error = %err, "No active session");
                SessionState::Unauthenticated
            }
        };
        self.set(resolved.clone());
        resolved
    }

    /// Log in and return the user so the caller can navigate to
    /// [`Sector::landing_path`].
    ///
    /// # Errors
    /// `InvalidInput` for blank credentials; otherwise whatever the
    /// authentication port reports. The session is left untouched on error.
    #[instrument(skip(self, senha))]
    pub async fn login(&self, email: &str, senha: &str) -> Result<User> {
        let email = email.trim();
        if email.is_empty() || senha.is_empty() {
            return Err(MarOpsError::InvalidInput("email and password are required".into()));
        }
        let user = self.auth.login(email, senha).await?;
        info!(user = %user.email, sector = %user.sector(), "Logged in");
        self.set(SessionState::Authenticated(user.clone()));
        Ok(user)
    }

    /// Clear the session and tell the backend; the backend outcome does not
    /// matter.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        self.set(SessionState::Unauthenticated);
        if let Err(err) = self.auth.logout().await {
            warn!(error = %err, "Logout call failed; session cleared locally");
        }
    }

    /// Drop the session after the credentials could not be refreshed.
    pub fn expire(&self) {
        if self.state.read().user().is_some() {
            warn!("Session expired");
        }
        self.set(SessionState::Unauthenticated);
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.read().clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.state.read().user().cloned()
    }

    #[must_use]
    pub fn sector(&self) -> Option<Sector> {
        self.state.read().user().map(|u| u.sector().clone())
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.changes.subscribe()
    }

    fn set(&self, next: SessionState) {
        *self.state.write() = next.clone();
        self.changes.send_replace(next);
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use marops_domain::{Profile, RecordId};
    use parking_lot::Mutex;

    use super::*;

    struct FakeAuth {
        me: Option<User>,
        accept_password: &'static str,
        logout_fails: bool,
        calls: Mutex<Vec<&'static str>>,
    }

    fn ana() -> User {
        User {
            id: RecordId::from(1),
            email: "ana@example.com".into(),
            username: "ana".into(),
            perfil: Profile { setor: Sector::Stock, cargo: None },
        }
    }

    #[async_trait]
    impl AuthPort for FakeAuth {
        async fn current_user(&self) -> Result<User> {
            self.calls.lock().push("me");
            self.me.clone().ok_or_else(|| MarOpsError::Auth("401".into()))
        }

        async fn login(&self, _email: &str, senha: &str) -> Result<User> {
            self.calls.lock().push("login");
            if senha == self.accept_password {
                Ok(ana())
            } else {
                Err(MarOpsError::Auth("invalid credentials".into()))
            }
        }

        async fn logout(&self) -> Result<()> {
            self.calls.lock().push("logout");
            if self.logout_fails {
                Err(MarOpsError::Network("offline".into()))
            } else {
                Ok(())
            }
        }
    }

    fn store(me: Option<User>, logout_fails: bool) -> (SessionStore, Arc<FakeAuth>) {
        let auth = Arc::new(FakeAuth {
            me,
            accept_password: "segredo",
            logout_fails,
            calls: Mutex::new(Vec::new()),
        });
        (SessionStore::new(auth.clone()), auth)
    }

    #[tokio::test]
    async fn starts_loading_then_resolves() {
        let (session, _) = store(Some(ana()), false);
        assert_eq!(session.state(), SessionState::Loading);
        assert_eq!(session.init().await, SessionState::Authenticated(ana()));
        assert_eq!(session.sector(), Some(Sector::Stock));
    }

    #[tokio::test]
    async fn failed_identity_check_is_unauthenticated() {
        let (session, _) = store(None, false);
        assert_eq!(session.init().await, SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn login_sets_user_and_failures_leave_state() {
        let (session, _) = store(None, false);
        session.init().await;

        assert!(session.login("ana@example.com", "errada").await.is_err());
        assert_eq!(session.state(), SessionState::Unauthenticated);

        let user = session.login(" ana@example.com ", "segredo").await.unwrap();
        assert_eq!(user.sector().landing_path(), "/estoque/inicio");
        assert_eq!(session.user(), Some(ana()));
    }

    #[tokio::test]
    async fn blank_credentials_never_reach_the_backend() {
        let (session, auth) = store(None, false);
        assert!(matches!(session.login("  ", "x").await, Err(MarOpsError::InvalidInput(_))));
        assert!(auth.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn logout_clears_even_when_backend_fails() {
        let (session, auth) = store(Some(ana()), true);
        session.init().await;
        session.logout().await;
        assert_eq!(session.state(), SessionState::Unauthenticated);
        assert_eq!(auth.calls.lock().as_slice(), &["me", "logout"]);
    }

    #[tokio::test]
    async fn expire_notifies_subscribers() {
        let (session, _) = store(Some(ana()), false);
        session.init().await;
        let rx = session.subscribe();
        session.expire();
        assert_eq!(*rx.borrow(), SessionState::Unauthenticated);
    }
}
