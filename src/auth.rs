pub mod models;
#[cfg(feature = "ssr")]
pub mod token;
#[cfg(feature = "ssr")]
pub mod demo_auth;

use async_trait::async_trait;

use crate::auth::models::{AuthenticatedUser, Credentials};
use crate::error::AppError;

/// Resolves the editor behind a request's session credentials.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Returns `Ok(None)` when no credentials were presented and an error when the
    /// presented credentials could not be verified.
    async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<Option<AuthenticatedUser>, AppError>;
}
