//! Route guard
//!
//! Decides what a protected route shows for the current session.

use marops_domain::Sector;

use crate::session::SessionState;

/// What a guarded route renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Identity still resolving.
    Loading,
    RedirectLogin,
    RedirectForbidden,
    Render,
}

/// Evaluate a route against the session.
///
/// An empty `permitted` set only requires an authenticated user.
///
/// # Examples
///
/// ```
/// use marops_core::navigation::{evaluate, GuardOutcome};
/// use marops_core::SessionState;
/// use marops_domain::Sector;
///
/// let permitted = [Sector::Stock, Sector::Admin];
/// assert_eq!(evaluate(&SessionState::Loading, &permitted), GuardOutcome::Loading);
/// assert_eq!(evaluate(&SessionState::Unauthenticated, &permitted), GuardOutcome::RedirectLogin);
/// ```
#[must_use]
pub fn evaluate(session: &SessionState, permitted: &[Sector]) -> GuardOutcome {
    match session {
        SessionState::Loading => GuardOutcome::Loading,
        SessionState::Unauthenticated => GuardOutcome::RedirectLogin,
        SessionState::Authenticated(user) => {
            if !permitted.is_empty() && !permitted.contains(user.sector()) {
                GuardOutcome::RedirectForbidden
            } else {
                GuardOutcome::Render
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use marops_domain::{Profile, RecordId, User};

    use super::*;

    fn session_for(sector: Sector) -> SessionState {
        SessionState::Authenticated(User {
            id: RecordId::from(1),
            email: "op@example.com".into(),
            username: "op".into(),
            perfil: Profile { setor: sector, cargo: None },
        })
    }

    const STOCK_ROUTE: [Sector; 2] = [Sector::Stock, Sector::Admin];

    #[test]
    fn sector_outside_permitted_set_is_forbidden() {
        assert_eq!(
            evaluate(&session_for(Sector::Production), &STOCK_ROUTE),
            GuardOutcome::RedirectForbidden
        );
        assert_eq!(
            evaluate(&session_for(Sector::Other("RH".into())), &STOCK_ROUTE),
            GuardOutcome::RedirectForbidden
        );
    }

    #[test]
    fn sector_inside_permitted_set_renders() {
        assert_eq!(evaluate(&session_for(Sector::Stock), &STOCK_ROUTE), GuardOutcome::Render);
        assert_eq!(evaluate(&session_for(Sector::Admin), &STOCK_ROUTE), GuardOutcome::Render);
    }

    #[test]
    fn empty_permitted_set_only_needs_login() {
        assert_eq!(evaluate(&session_for(Sector::Finance), &[]), GuardOutcome::Render);
        assert_eq!(evaluate(&SessionState::Unauthenticated, &[]), GuardOutcome::RedirectLogin);
    }
}
