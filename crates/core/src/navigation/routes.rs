//! Route table
//!
//! Paths follow the dashboard's URL scheme; `:id` segments bind the record
//! the screen works on.

use marops_domain::constants::{FORBIDDEN_PATH, LOGIN_PATH};
use marops_domain::{RecordId, Sector};

/// Screens reachable through the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Login,
    Forbidden,
    /// Authenticated root; forwards to the sector landing page.
    Home,
    ProductionBoard,
    ProductionEditor,
    StockOverview,
    ColdStorageQueue,
    ColdStorageEditor,
    StockIntake,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDef {
    pub pattern: &'static str,
    pub screen: Screen,
    /// Public routes skip the guard.
    pub public: bool,
    /// Sectors allowed in; empty means any authenticated user.
    pub permitted: Vec<Sector>,
}

/// A path resolved against the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub path: String,
    pub screen: Screen,
    pub id: Option<RecordId>,
    pub public: bool,
    pub permitted: Vec<Sector>,
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<RouteDef>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl RouteTable {
    /// The dashboard's routes.
    #[must_use]
    pub fn standard() -> Self {
        let production = vec![Sector::Production, Sector::Admin];
        let stock = vec![Sector::Stock, Sector::Admin];
        let public = |pattern, screen| RouteDef { pattern, screen, public: true, permitted: vec![] };
        let guarded = |pattern, screen, permitted: &[Sector]| RouteDef {
            pattern,
            screen,
            public: false,
            permitted: permitted.to_vec(),
        };

        Self {
            routes: vec![
                public(LOGIN_PATH, Screen::Login),
                public(FORBIDDEN_PATH, Screen::Forbidden),
                guarded("/", Screen::Home, &[][..]),
                guarded("/producao/inicio", Screen::ProductionBoard, production.as_slice()),
                guarded("/producao/:id", Screen::ProductionEditor, production.as_slice()),
                guarded("/estoque", Screen::StockOverview, stock.as_slice()),
                guarded("/estoque/inicio", Screen::StockOverview, stock.as_slice()),
                guarded("/estoque/camara-fria", Screen::ColdStorageQueue, stock.as_slice()),
                guarded("/estoque/producao/:id", Screen::ColdStorageEditor, stock.as_slice()),
                guarded("/estoque/entrada", Screen::StockIntake, stock.as_slice()),
            ],
        }
    }

    #[must_use]
    pub fn routes(&self) -> &[RouteDef] {
        &self.routes
    }

    /// Match a path; literal routes win over parameterised ones.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<RouteMatch> {
        let normalized = normalize(path);
        let segments: Vec<&str> = split(&normalized);

        let mut best: Option<(usize, &RouteDef, Option<RecordId>)> = None;
        for route in &self.routes {
            let pattern: Vec<&str> = split(route.pattern);
            if pattern.len() != segments.len() {
                continue;
            }
            let mut id = None;
            let mut literal = 0;
            let matched = pattern.iter().zip(&segments).all(|(p, s)| {
                if *p == ":id" {
                    id = Some(RecordId::from(*s));
                    true
                } else if p == s {
                    literal += 1;
                    true
                } else {
                    false
                }
            });
            if matched && best.as_ref().map_or(true, |(score, _, _)| literal > *score) {
                best = Some((literal, route, id));
            }
        }

        best.map(|(_, route, id)| RouteMatch {
            path: normalized.clone(),
            screen: route.screen,
            id,
            public: route.public,
            permitted: route.permitted.clone(),
        })
    }

    /// Build the path of a screen.
    #[must_use]
    pub fn path_for(&self, screen: Screen, id: Option<&RecordId>) -> Option<String> {
        let route = self.routes.iter().find(|r| r.screen == screen)?;
        if route.pattern.contains(":id") {
            id.map(|id| route.pattern.replace(":id", id.as_str()))
        } else {
            Some(route.pattern.to_string())
        }
    }
}

/// Drop query, fragment and trailing slash.
fn normalize(path: &str) -> String {
    let end = path.find(|c| c == '?' || c == '#').unwrap_or(path.len());
    let trimmed = path[..end].trim().trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

fn split(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}
