use axum::{Extension, Json, extract::State};

use agenda_types::api::{Claims, UpdateProfileRequest};
use agenda_types::models::UserProfile;

use crate::error::{ApiError, ApiJson};
use crate::{AppState, password, run_blocking};

/// GET /api/user/me
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<UserProfile>, ApiError> {
    let user = run_blocking(move || state.db.get_user_by_id(claims.sub))
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    Ok(Json(user.into()))
}

/// PUT /api/user/me: replaces display name and avatar; re-hashes the password
/// only when a new one is given. The avatar size has already been checked by
/// the payload guard.
pub async fn update_me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    let user_id = claims.sub;
    let user = run_blocking(move || {
        let new_hash = match req.password.as_deref() {
            Some(p) if !p.is_empty() => Some(password::hash_password(p)?),
            _ => None,
        };
        if !state.db.update_profile(
            user_id,
            req.display_name.as_deref(),
            req.avatar_url.as_deref(),
            new_hash.as_deref(),
        )? {
            return Ok(None);
        }
        state.db.get_user_by_id(user_id)
    })
    .await?
    .ok_or(ApiError::NotFound("User"))?;

    Ok(Json(user.into()))
}
