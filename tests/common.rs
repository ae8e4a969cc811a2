#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::{
    body::{Body, BoxBody},
    http::{header::COOKIE, HeaderValue, Method, Request, Response},
    Router,
};
use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;
use serde_json::Value;
use sqlx::{Pool, Sqlite};
use todo_api::{
    auth::{sign_token, SessionCookieProvider},
    db,
    repository::SqliteTodoRepository,
    route::create_router,
    service::TodoService,
    AppState,
};
use tower::ServiceExt;

pub const SECRET: &[u8] = b"integration-secret";
pub const COOKIE_NAME: &str = "better-auth.session_token";

/// Starts at a fixed instant and moves one second forward on every read.
pub struct SteppingClock(Mutex<DateTime<Utc>>);

impl SteppingClock {
    pub fn new() -> Self {
        Self(Mutex::new(
            DateTime::<Utc>::from_timestamp_millis(1_700_000_000_000).unwrap(),
        ))
    }
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        let mut now = self.0.lock().unwrap();
        *now += TimeDelta::seconds(1);
        *now
    }
}

pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
}

pub async fn build_app() -> TestApp {
    build_app_with_cors(None).await
}

pub async fn build_app_with_cors(cors_origin: Option<HeaderValue>) -> TestApp {
    let pool = db::connect("sqlite::memory:", 1)
        .await
        .expect("in-memory database");
    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(SteppingClock::new());

    let identity = Arc::new(SessionCookieProvider::new(
        pool.clone(),
        SECRET,
        COOKIE_NAME.into(),
        clock.clone(),
    ));
    let todos = TodoService::new(Arc::new(SqliteTodoRepository::new(pool.clone())), clock);
    let state = Arc::new(AppState { todos, identity });

    TestApp {
        router: create_router(state, cors_origin),
        pool,
    }
}

impl TestApp {
    /// Creates a user with a live session and returns the cookie header value.
    pub async fn sign_in(&self, user_id: &str) -> String {
        self.sign_in_until(user_id, i64::MAX).await
    }

    pub async fn sign_in_until(&self, user_id: &str, expires_at: i64) -> String {
        sqlx::query(
            r#"INSERT OR IGNORE INTO "user" (id, name, email, created_at, updated_at)
               VALUES (?, ?, ?, 0, 0)"#,
        )
        .bind(user_id)
        .bind(user_id)
        .bind(format!("{user_id}@example.com"))
        .execute(&self.pool)
        .await
        .expect("insert user");

        let token = format!("token-{user_id}-{expires_at}");
        sqlx::query(
            "INSERT INTO session (id, token, user_id, expires_at, created_at, updated_at) \
             VALUES (?, ?, ?, ?, 0, 0)",
        )
        .bind(format!("session-{token}"))
        .bind(&token)
        .bind(user_id)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .expect("insert session");

        format!("{COOKIE_NAME}={}", sign_token(SECRET, &token))
    }

    pub async fn send(
        &self,
        method: Method,
        path: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> Response<BoxBody> {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let request = builder.body(body).expect("failed to build request");

        self.send_request(request).await
    }

    pub async fn send_request(&self, request: Request<Body>) -> Response<BoxBody> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn todo_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM todo")
            .fetch_one(&self.pool)
            .await
            .expect("count todos")
    }
}

pub async fn json_body(response: Response<BoxBody>) -> Value {
    let bytes = hyper::body::to_bytes(response.into_body())
        .await
        .expect("read body");
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).expect("body is JSON")
}
