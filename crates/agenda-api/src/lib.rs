//! HTTP surface for Agenda+: accounts, schedule, tasks, contacts and journal.
//!
//! [`router`] builds the complete application. Every route under `/api`
//! except register/login sits behind [`middleware::require_auth`], and every
//! write passes through [`payload::guard_payload`] first.

pub mod auth;
pub mod contacts;
pub mod courses;
pub mod error;
pub mod middleware;
pub mod pagination;
pub mod password;
pub mod payload;
pub mod tasks;
pub mod thoughts;
pub mod token;
pub mod user;
pub mod validate;


use std::sync::Arc;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post},
};
use serde_json::{Value, json};
use tracing::error;

use agenda_db::Database;

pub use error::ApiError;
use token::TokenService;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub tokens: TokenService,
}

/// Build the full router for `state`.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login));

    let protected = Router::new()
        .route("/courses", get(courses::list).post(courses::create))
        .route(
            "/courses/{id}",
            get(courses::get_one).put(courses::update).delete(courses::delete),
        )
        .route("/tasks", get(tasks::list).post(tasks::create))
        .route(
            "/tasks/{id}",
            get(tasks::get_one).put(tasks::update).delete(tasks::delete),
        )
        .route("/tasks/{id}/toggle", patch(tasks::toggle))
        .route("/contacts", get(contacts::list).post(contacts::create))
        .route(
            "/contacts/{id}",
            get(contacts::get_one).put(contacts::update).delete(contacts::delete),
        )
        .route("/thoughts", get(thoughts::list).post(thoughts::create))
        .route(
            "/thoughts/{id}",
            get(thoughts::get_one).put(thoughts::update).delete(thoughts::delete),
        )
        .route("/user/me", get(user::me).put(user::update_me))
        .route_layer(from_fn_with_state(state.clone(), middleware::require_auth));

    Router::new()
        .route("/", get(welcome))
        .nest("/api", public.merge(protected))
        .layer(from_fn(payload::guard_payload))
        .layer(DefaultBodyLimit::max(payload::MAX_BODY_BYTES))
        .with_state(state)
}

async fn welcome() -> Json<Value> {
    Json(json!({ "message": "Welcome to Agenda+ API" }))
}

/// Run store access or password hashing off the async runtime.
pub(crate) async fn run_blocking<F, T>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(anyhow::anyhow!("blocking task failed: {}", e))
        })?
        .map_err(ApiError::from)
}
