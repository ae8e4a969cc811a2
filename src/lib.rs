//! Per-user todo lists behind an authenticated JSON API.

use std::sync::Arc;

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handler;
pub mod logging;
pub mod middleware;
pub mod model;
pub mod repository;
pub mod route;
pub mod schema;
pub mod service;
pub mod startup;

use auth::IdentityProvider;
use service::TodoService;

// Struct representing the application state
pub struct AppState {
    pub todos: TodoService,
    pub identity: Arc<dyn IdentityProvider>,
}
