//! Login, logout and session restore

use marops_core::navigation::Navigation;
use marops_domain::constants::LOGIN_PATH;
use marops_domain::Result;

use crate::context::AppContext;
use crate::utils::command_helpers::execute_with_logging;

/// Log in and move to the user's landing page.
///
/// # Errors
/// `InvalidInput` for blank credentials, otherwise the backend's answer. The
/// location does not change on error.
pub async fn login(ctx: &AppContext, email: &str, senha: &str) -> Result<Navigation> {
    execute_with_logging("session::login", move || async move {
        let user = ctx.session.login(email, senha).await?;
        Ok(ctx.navigator.after_login(&user))
    })
    .await
}

/// Clear the session and return to the login page.
pub async fn logout(ctx: &AppContext) -> Navigation {
    ctx.session.logout().await;
    ctx.navigator.go(LOGIN_PATH)
}

/// Resolve the session again and re-run the guard on `path`.
pub async fn restore_session(ctx: &AppContext, path: &str) -> Navigation {
    ctx.session.init().await;
    ctx.navigator.go(path)
}
