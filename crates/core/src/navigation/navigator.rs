//! Navigator
//!
//! Holds the current location and resolves every move through the route
//! table and the guard.

use std::sync::Arc;

use marops_domain::constants::{FORBIDDEN_PATH, LOGIN_PATH};
use marops_domain::User;
use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::{debug, info};

use super::guard::{evaluate, GuardOutcome};
use super::ports::LoginRedirect;
use super::routes::{RouteMatch, RouteTable, Screen};
use crate::session::SessionStore;

/// Result of a navigation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Render(RouteMatch),
    /// Session still resolving; show a placeholder and retry later.
    Loading(RouteMatch),
    Redirected { from: String, to: String },
    NotFound(String),
}

pub struct Navigator {
    routes: RouteTable,
    session: Arc<SessionStore>,
    location: RwLock<String>,
    changes: watch::Sender<String>,
}

impl Navigator {
    pub fn new(routes: RouteTable, session: Arc<SessionStore>) -> Self {
        let (changes, _) = watch::channel(LOGIN_PATH.to_string());
        Self { routes, session, location: RwLock::new(LOGIN_PATH.to_string()), changes }
    }

    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    #[must_use]
    pub fn current(&self) -> String {
        self.location.read().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.changes.subscribe()
    }

    /// Navigate to `path`, following guard redirects.
    pub fn go(&self, path: &str) -> Navigation {
        let Some(route) = self.routes.resolve(path) else {
            debug!(path, "No route");
            return Navigation::NotFound(path.to_string());
        };

        if route.public {
            self.set_location(&route.path);
            return Navigation::Render(route);
        }

        match evaluate(&self.session.state(), &route.permitted) {
            GuardOutcome::Loading => {
                self.set_location(&route.path);
                Navigation::Loading(route)
            }
            GuardOutcome::RedirectLogin => self.redirect(&route.path, LOGIN_PATH),
            GuardOutcome::RedirectForbidden => self.redirect(&route.path, FORBIDDEN_PATH),
            GuardOutcome::Render if route.screen == Screen::Home => {
                match self.session.user().map(|u| self.landing_path(&u)) {
                    Some(landing) if landing != route.path => self.redirect(&route.path, &landing),
                    _ => {
                        self.set_location(&route.path);
                        Navigation::Render(route)
                    }
                }
            }
            GuardOutcome::Render => {
                self.set_location(&route.path);
                Navigation::Render(route)
            }
        }
    }

    /// Where a user lands after logging in.
    #[must_use]
    pub fn landing_path(&self, user: &User) -> String {
        let landing = user.sector().landing_path();
        if self.routes.resolve(&landing).is_some() {
            landing
        } else {
            "/".to_string()
        }
    }

    /// Navigate to the landing page of a freshly logged-in user.
    pub fn after_login(&self, user: &User) -> Navigation {
        let landing = self.landing_path(user);
        info!(path = %landing, "Navigating to landing page");
        self.go(&landing)
    }

    fn redirect(&self, from: &str, to: &str) -> Navigation {
        debug!(from, to, "Guard redirect");
        self.set_location(to);
        Navigation::Redirected { from: from.to_string(), to: to.to_string() }
    }

    fn set_location(&self, path: &str) {
        *self.location.write() = path.to_string();
        self.changes.send_replace(path.to_string());
    }
}

impl LoginRedirect for Navigator {
    fn redirect_to_login(&self) {
        self.session.expire();
        self.set_location(LOGIN_PATH);
    }
}
