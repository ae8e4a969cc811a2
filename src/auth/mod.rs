//! Identity provider seam.
//!
//! The API never issues credentials itself. It asks a provider to turn the
//! credential material on a request into a session and, on sign-out, to
//! revoke it.

mod cognito_provider;
mod session_provider;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::HeaderMap;
use mockable::Clock;
use sqlx::{Pool, Sqlite};
use thiserror::Error;

use crate::config::AuthConfig;

pub use cognito_provider::{bearer_token, CognitoProvider};
pub use session_provider::{sign_token, SessionCookieProvider};

/// A validated session, reduced to what the API needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("session store error: {0}")]
    Store(#[from] sqlx::Error),
    #[error("identity provider error: {0}")]
    Provider(String),
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// `Ok(None)` means the request carries no valid session.
    async fn resolve(&self, headers: &HeaderMap) -> Result<Option<Session>, AuthError>;

    /// Ends the session carried by `headers`, if the provider tracks sessions.
    async fn revoke(&self, _headers: &HeaderMap) -> Result<(), AuthError> {
        Ok(())
    }

    /// Name of the cookie to expire on sign-out, if the provider uses one.
    fn session_cookie(&self) -> Option<&str> {
        None
    }
}

/// Builds the provider selected in configuration.
pub fn create_identity_provider(
    config: &AuthConfig,
    db: Pool<Sqlite>,
    clock: Arc<dyn Clock + Send + Sync>,
) -> Result<Arc<dyn IdentityProvider>, AuthError> {
    match config {
        AuthConfig::Session {
            secret,
            cookie_name,
        } => Ok(Arc::new(SessionCookieProvider::new(
            db,
            secret.as_bytes(),
            cookie_name.clone(),
            clock,
        ))),
        AuthConfig::Cognito {
            region,
            user_pool_id,
            client_id,
        } => Ok(Arc::new(CognitoProvider::new(
            region,
            user_pool_id,
            client_id,
        )?)),
    }
}
