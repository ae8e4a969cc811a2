use std::sync::Arc;

use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{handler::*, middleware::mw_require_auth, AppState};

/// Request pipeline: tracing, then CORS, then the auth guard in front of
/// every route except the health check.
pub fn create_router(app_state: Arc<AppState>, cors_origin: Option<HeaderValue>) -> Router {
    let app = Router::new()
        .route("/todos", get(get_todos).post(create_todo))
        .route("/todos/:id", get(get_todo).delete(delete_todo))
        .route("/todos/:id/complete", patch(complete_todo))
        .route("/todos/:id/incomplete", patch(incomplete_todo))
        .route("/auth/sign-out", post(sign_out))
        .route_layer(from_fn_with_state(app_state.clone(), mw_require_auth))
        .route("/", get(health_checker_handler))
        .with_state(app_state);

    let app = match cors_origin {
        Some(origin) => app.layer(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
                .allow_credentials(true)
                .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE]),
        ),
        None => app,
    };

    app.layer(TraceLayer::new_for_http())
}
