use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::info;

use agenda_types::api::{AuthResponse, AuthUser, LoginRequest, RegisterRequest};

use crate::error::{ApiError, ApiJson};
use crate::{AppState, password, run_blocking};

fn credentials(
    username: Option<String>,
    password: Option<String>,
) -> Result<(String, String), ApiError> {
    match (username, password) {
        (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => Ok((u, p)),
        _ => Err(ApiError::Validation(
            "Username and password required".to_string(),
        )),
    }
}

pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (username, secret) = credentials(req.username, req.password)?;

    let db = state.clone();
    let name = username.clone();
    let user_id = run_blocking(move || {
        let hash = password::hash_password(&secret)?;
        db.db.create_user(&name, &hash)
    })
    .await?
    .ok_or(ApiError::DuplicateUsername)?;

    info!("Registered user '{}' (id {})", username, user_id);

    let token = state.tokens.issue(user_id, &username)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: AuthUser {
                id: user_id,
                username,
            },
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (username, secret) = credentials(req.username, req.password)?;

    let db = state.clone();
    let user = run_blocking(move || {
        let Some(user) = db.db.get_user_by_username(&username)? else {
            return Ok(None);
        };
        let valid = password::verify_password(&secret, &user.password)?;
        Ok(valid.then_some(user))
    })
    .await?
    .ok_or(ApiError::InvalidCredentials)?;

    let token = state.tokens.issue(user.id, &user.username)?;

    Ok(Json(AuthResponse {
        token,
        user: AuthUser {
            id: user.id,
            username: user.username,
        },
    }))
}
