use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{request::Parts, Request},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::{error::AppError, model::CurrentUser, AppState};

/// Resolves the caller through the identity provider and attaches a
/// [`CurrentUser`] to the request. Requests without a valid session stop here.
pub async fn mw_require_auth<B>(
    State(state): State<Arc<AppState>>,
    mut request: Request<B>,
    next: Next<B>,
) -> Result<Response, AppError> {
    let session = state.identity.resolve(request.headers()).await?;

    let Some(session) = session else {
        debug!(path = %request.uri().path(), "rejecting unauthenticated request");
        return Err(AppError::Unauthenticated);
    };

    request
        .extensions_mut()
        .insert(CurrentUser::new(session.user_id));

    Ok(next.run(request).await)
}

// Only the guard inserts a CurrentUser, so a handler mounted outside it
// rejects every request instead of running anonymously.
#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AppError::Unauthenticated)
    }
}
