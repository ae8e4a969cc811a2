use async_trait::async_trait;
use axum::http::{header::AUTHORIZATION, HeaderMap};
use jsonwebtokens_cognito::KeySet;
use serde_json::Value;
use tracing::debug;

use super::{AuthError, IdentityProvider, Session};

/// Cognito user pool access tokens passed in the `Authorization` header.
pub struct CognitoProvider {
    keyset: KeySet,
    client_id: String,
}

impl CognitoProvider {
    pub fn new(region: &str, user_pool_id: &str, client_id: &str) -> Result<Self, AuthError> {
        let keyset = KeySet::new(region.to_owned(), user_pool_id.to_owned())
            .map_err(|err| AuthError::Provider(format!("invalid user pool: {err:?}")))?;
        Ok(Self {
            keyset,
            client_id: client_id.to_owned(),
        })
    }
}

/// The token in an `Authorization` header, with or without a `Bearer` prefix.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim_start();
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .unwrap_or(value)
        .trim();
    (!token.is_empty()).then_some(token)
}

#[async_trait]
impl IdentityProvider for CognitoProvider {
    async fn resolve(&self, headers: &HeaderMap) -> Result<Option<Session>, AuthError> {
        let Some(token) = bearer_token(headers) else {
            return Ok(None);
        };

        let verifier = self
            .keyset
            .new_access_token_verifier(&[self.client_id.as_str()])
            .build()
            .map_err(|err| AuthError::Provider(format!("verifier setup failed: {err:?}")))?;

        let claims = match self.keyset.verify(token, &verifier).await {
            Ok(claims) => claims,
            Err(err) => {
                debug!("access token rejected: {:?}", err);
                return Ok(None);
            }
        };

        match claims.get("sub") {
            Some(Value::String(sub)) if !sub.is_empty() => Ok(Some(Session {
                user_id: sub.clone(),
            })),
            _ => {
                debug!("access token has no subject");
                Ok(None)
            }
        }
    }
}
