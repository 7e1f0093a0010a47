use std::sync::Arc;
use std::time::Duration;

use auth::Argon2Hasher;
use auth::Authenticator;
use auth::StoreCredentialVerifier;
use auth::UserStore;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::greet::greet;
use super::handlers::login::login;
use super::handlers::register::register;
use super::middleware::authenticate;

/// Authenticator wired to a user store through Argon2 hashing.
pub type ServiceAuthenticator<S> =
    Authenticator<StoreCredentialVerifier<S, Argon2Hasher>, Argon2Hasher, S>;

pub struct AppState<S: UserStore> {
    pub authenticator: Arc<ServiceAuthenticator<S>>,
    pub store: Arc<S>,
}

impl<S: UserStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            authenticator: Arc::clone(&self.authenticator),
            store: Arc::clone(&self.store),
        }
    }
}

pub fn create_router<S: UserStore>(
    authenticator: Arc<ServiceAuthenticator<S>>,
    store: Arc<S>,
) -> Router {
    let state = AppState {
        authenticator,
        store,
    };

    let public_routes = Router::new()
        .route("/register", post(register::<S>))
        .route("/login", post(login::<S>));

    let protected_routes = Router::new()
        .route("/", get(greet))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            authenticate::<S>,
        ));

    // Headers are left out of the span: they carry bearer tokens.
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
