use std::sync::Arc;

use auth::Argon2Hasher;
use auth::Authenticator;
use auth::Clock;
use auth::KeyProvider;
use auth::ManualClock;
use auth::StoreCredentialVerifier;
use auth::TokenService;
use chrono::Duration;
use serde_json::json;
use user_service::inbound::http::router::create_router;
use user_service::repositories::InMemoryUserStore;

pub const TOKEN_TTL_SECONDS: i64 = 1800;

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub api_client: reqwest::Client,
    pub store: Arc<InMemoryUserStore>,
    pub tokens: Arc<TokenService>,
    pub clock: Arc<ManualClock>,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let clock = Arc::new(ManualClock::default());
        let keys = KeyProvider::generate().expect("Failed to generate signing key");
        let tokens = Arc::new(TokenService::with_clock(
            &keys,
            Arc::clone(&clock) as Arc<dyn Clock>,
        ));

        let store = Arc::new(InMemoryUserStore::new());
        let hasher = Arc::new(Argon2Hasher::new());
        let verifier = Arc::new(
            StoreCredentialVerifier::new(Arc::clone(&store), Arc::clone(&hasher))
                .expect("Failed to create credential verifier"),
        );
        let authenticator = Arc::new(Authenticator::new(
            verifier,
            hasher,
            Arc::clone(&store),
            Arc::clone(&tokens),
            Duration::seconds(TOKEN_TTL_SECONDS),
        ));

        let router = create_router(authenticator, Arc::clone(&store));

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            api_client: reqwest::Client::new(),
            store,
            tokens,
            clock,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(&format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(&format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Register a user, panicking unless the server answers 201
    pub async fn register(&self, username: &str, password: &str) {
        let response = self
            .post("/register")
            .json(&json!({
                "username": username,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    }

    /// Log in and return the issued token
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .post("/login")
            .json(&json!({
                "username": username,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        body["data"]["token"]
            .as_str()
            .expect("Token missing from login response")
            .to_string()
    }
}
