use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{header::COOKIE, HeaderMap};
use base64::{engine::general_purpose, Engine};
use cookie::Cookie;
use mockable::Clock;
use ring::hmac;
use sqlx::{query, query_as, Pool, Sqlite};
use tracing::debug;

use super::{AuthError, IdentityProvider, Session};

/// Sessions stored in the `session` table, referenced by a signed cookie of
/// the form `<token>.<base64 HMAC-SHA256(secret, token)>`.
pub struct SessionCookieProvider {
    db: Pool<Sqlite>,
    key: hmac::Key,
    cookie_name: String,
    clock: Arc<dyn Clock + Send + Sync>,
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    user_id: String,
    expires_at: i64,
}

impl SessionCookieProvider {
    pub fn new(
        db: Pool<Sqlite>,
        secret: &[u8],
        cookie_name: String,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            db,
            key: hmac::Key::new(hmac::HMAC_SHA256, secret),
            cookie_name,
            clock,
        }
    }

    /// The session token, if the request carries a correctly signed cookie.
    fn verified_token(&self, headers: &HeaderMap) -> Option<String> {
        let signed = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|header| Cookie::split_parse_encoded(header.to_owned()))
            .filter_map(Result::ok)
            .find(|cookie| cookie.name() == self.cookie_name)?;

        let (token, signature) = signed.value().rsplit_once('.')?;
        let signature = general_purpose::STANDARD.decode(signature).ok()?;
        match hmac::verify(&self.key, token.as_bytes(), &signature) {
            Ok(()) => Some(token.to_owned()),
            Err(_) => {
                debug!("session cookie signature mismatch");
                None
            }
        }
    }
}

/// Produces the cookie value the provider accepts for `token`.
pub fn sign_token(secret: &[u8], token: &str) -> String {
    let key = hmac::Key::new(hmac::HMAC_SHA256, secret);
    let signature = hmac::sign(&key, token.as_bytes());
    format!(
        "{token}.{}",
        general_purpose::STANDARD.encode(signature.as_ref())
    )
}

#[async_trait]
impl IdentityProvider for SessionCookieProvider {
    async fn resolve(&self, headers: &HeaderMap) -> Result<Option<Session>, AuthError> {
        let Some(token) = self.verified_token(headers) else {
            return Ok(None);
        };

        let row = query_as::<_, SessionRow>(
            "SELECT user_id, expires_at FROM session WHERE token = ?",
        )
        .bind(&token)
        .fetch_optional(&self.db)
        .await?;

        let now = self.clock.utc().timestamp_millis();
        match row {
            Some(row) if row.expires_at > now => Ok(Some(Session {
                user_id: row.user_id,
            })),
            Some(_) => {
                debug!("session expired");
                Ok(None)
            }
            None => {
                debug!("unknown session token");
                Ok(None)
            }
        }
    }

    async fn revoke(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        if let Some(token) = self.verified_token(headers) {
            query("DELETE FROM session WHERE token = ?")
                .bind(token)
                .execute(&self.db)
                .await?;
        }
        Ok(())
    }

    fn session_cookie(&self) -> Option<&str> {
        Some(&self.cookie_name)
    }
}
