//! Port interfaces for navigation side effects

/// Sink for the forced redirect issued when credentials cannot be refreshed.
pub trait LoginRedirect: Send + Sync {
    fn redirect_to_login(&self);
}
