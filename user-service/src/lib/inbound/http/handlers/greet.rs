use axum::Extension;

use crate::inbound::http::middleware::AuthenticatedUser;

/// Greeting for an authenticated caller.
pub async fn greet(Extension(user): Extension<AuthenticatedUser>) -> String {
    format!("welcome, {}", user.username)
}
