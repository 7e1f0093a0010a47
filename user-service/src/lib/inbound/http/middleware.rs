use auth::UserStore;
use axum::extract::Request;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde_json::json;

use crate::inbound::http::router::AppState;

/// Extension type to store the authenticated username in request extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub username: String,
}

/// Middleware that admits requests carrying a valid bearer token for a
/// registered user and adds that user to request extensions
pub async fn authenticate<S: UserStore>(
    State(state): State<AppState<S>>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = bearer_token(req.headers())?;

    let claims = state
        .authenticator
        .tokens()
        .decode_and_verify(&token)
        .map_err(|e| {
            tracing::warn!(error = %e, "JWT validation failed");
            unauthorized("Invalid or expired token")
        })?;

    let user = state
        .store
        .find_by_username(&claims.sub)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "User lookup failed during authentication");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            )
                .into_response()
        })?
        .ok_or_else(|| {
            tracing::warn!(username = %claims.sub, "Token subject is not a registered user");
            unauthorized("Invalid or expired token")
        })?;

    if !state.authenticator.claims_match_user(&claims, &user) {
        tracing::debug!(username = %user.username, "Token expired");
        return Err(unauthorized("Invalid or expired token"));
    }

    req.extensions_mut().insert(AuthenticatedUser {
        username: user.username,
    });

    Ok(next.run(req).await)
}

fn bearer_token(headers: &HeaderMap) -> Result<String, Response> {
    let auth_header = headers
        .get(http::header::AUTHORIZATION)
        .ok_or_else(|| unauthorized("Missing Authorization header"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| unauthorized("Invalid Authorization header"))?;

    auth_str
        .strip_prefix("Bearer ")
        .map(str::to_string)
        .ok_or_else(|| unauthorized("Invalid Authorization header format. Expected: Bearer <token>"))
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": message
        })),
    )
        .into_response()
}
