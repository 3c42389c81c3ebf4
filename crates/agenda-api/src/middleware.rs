use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::AppState;
use crate::error::{ApiError, INVALID_TOKEN, NO_TOKEN};

/// Extract and verify the bearer token, then expose its `Claims` to handlers
/// through request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = {
        let auth_header = req
            .headers()
            .get(header::AUTHORIZATION)
            .filter(|v| !v.as_bytes().trim_ascii().is_empty())
            .ok_or(ApiError::Unauthorized(NO_TOKEN))?;

        let token = auth_header
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(ApiError::Unauthorized(INVALID_TOKEN))?;

        state
            .tokens
            .verify(token.trim())
            .map_err(|_| ApiError::Unauthorized(INVALID_TOKEN))?
    };

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
