//! Size limits applied to write requests before any handler sees them.

use axum::{
    body::Body,
    extract::Request,
    http::Method,
    middleware::Next,
    response::Response,
};
use serde_json::Value;
use tracing::debug;

use crate::error::ApiError;

/// Hard cap on any request body.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Cap on the base64 part of an embedded avatar (≈375 KiB once decoded).
pub const MAX_AVATAR_BASE64: usize = 500 * 1024;

const MAX_AVATAR_DECODED: usize = 375 * 1024;

/// Reject an avatar whose base64 payload, after any `data:<mime>;base64,`
/// prefix, exceeds [`MAX_AVATAR_BASE64`].
pub fn check_avatar(avatar: &str) -> Result<(), ApiError> {
    let data = avatar.split_once(',').map_or(avatar, |(_, data)| data);
    let size = data.len();

    if size > MAX_AVATAR_BASE64 {
        return Err(ApiError::PayloadTooLarge(format!(
            "Image too large: {:.2}KB. Maximum: {:.2}KB base64 (≈{:.2}KB image)",
            size as f64 / 1024.0,
            MAX_AVATAR_BASE64 as f64 / 1024.0,
            MAX_AVATAR_DECODED as f64 / 1024.0,
        )));
    }
    Ok(())
}

/// Buffer write bodies up to [`MAX_BODY_BYTES`] and check any top-level
/// `avatar_url` before passing the request on unchanged.
pub async fn guard_payload(req: Request, next: Next) -> Result<Response, ApiError> {
    if !matches!(*req.method(), Method::POST | Method::PUT | Method::PATCH) {
        return Ok(next.run(req).await);
    }

    let (parts, body) = req.into_parts();
    let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| {
            debug!("Rejected body on {} {}: {}", parts.method, parts.uri, e);
            ApiError::BodyTooLarge
        })?;

    // Anything that is not a JSON object is left for the handler's extractor to reject.
    if let Ok(Value::Object(fields)) = serde_json::from_slice::<Value>(&bytes) {
        if let Some(Value::String(avatar)) = fields.get("avatar_url") {
            check_avatar(avatar)?;
        }
    }

    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}
