use std::sync::Arc;

use chrono::Duration;

use crate::identity::CredentialError;
use crate::identity::CredentialVerifier;
use crate::identity::Identity;
use crate::identity::PasswordHasher;
use crate::identity::Principal;
use crate::identity::StoreError;
use crate::identity::StoredIdentity;
use crate::identity::UserStore;
use crate::jwt::Claims;
use crate::jwt::TokenError;
use crate::jwt::TokenService;
use crate::password::PasswordError;

/// Authentication coordinator for registration, login and token checks.
///
/// Holds no key material itself: signing is delegated to the [`TokenService`],
/// hashing, persistence and credential checks to the injected collaborators.
pub struct Authenticator<V, H, S>
where
    V: CredentialVerifier,
    H: PasswordHasher,
    S: UserStore,
{
    verifier: Arc<V>,
    hasher: Arc<H>,
    store: Arc<S>,
    tokens: Arc<TokenService>,
    token_ttl: Duration,
}

/// Result of successful authentication.
#[derive(Debug, Clone)]
pub struct AuthenticationResult {
    /// JWT access token
    pub access_token: String,

    /// Lifetime of the token from issuance
    pub expires_in: Duration,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    AuthenticationFailed,

    #[error("Credential verifier unavailable: {0}")]
    VerifierUnavailable(String),

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl<V, H, S> Authenticator<V, H, S>
where
    V: CredentialVerifier,
    H: PasswordHasher,
    S: UserStore,
{
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `verifier` - Credential check used by login
    /// * `hasher` - Password hashing used by registration
    /// * `store` - User persistence used by registration
    /// * `tokens` - Token issuance and verification
    /// * `token_ttl` - Lifetime of tokens issued at login
    pub fn new(
        verifier: Arc<V>,
        hasher: Arc<H>,
        store: Arc<S>,
        tokens: Arc<TokenService>,
        token_ttl: Duration,
    ) -> Self {
        Self {
            verifier,
            hasher,
            store,
            tokens,
            token_ttl,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Hash the credential and persist the user.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing failed
    /// * `Store` - Persistence failed (including a taken username)
    pub async fn register(&self, identity: Identity) -> Result<StoredIdentity, AuthenticationError> {
        let password_hash = self.hasher.hash(identity.credential())?;
        let stored = StoredIdentity::new(identity.username(), password_hash);

        let saved = self.store.save(stored).await.map_err(|e| {
            tracing::warn!(username = %identity.username(), error = %e, "Registration failed");
            e
        })?;

        tracing::info!(username = %saved.username, "User registered");
        Ok(saved)
    }

    /// Verify credentials and issue an access token.
    ///
    /// # Errors
    /// * `AuthenticationFailed` - Unknown user or wrong password
    /// * `VerifierUnavailable` - Credentials could not be checked
    /// * `Token` - Token generation failed
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        self.verifier
            .authenticate(username, password)
            .await
            .map_err(|e| match e {
                CredentialError::Rejected => {
                    tracing::warn!(username = %username, "Login rejected");
                    AuthenticationError::AuthenticationFailed
                }
                CredentialError::Unavailable(reason) => {
                    tracing::error!(username = %username, error = %reason, "Credential check failed");
                    AuthenticationError::VerifierUnavailable(reason)
                }
            })?;

        let access_token = self.tokens.issue(username, self.token_ttl)?;
        tracing::debug!(username = %username, ttl_seconds = self.token_ttl.num_seconds(), "Token issued");

        Ok(AuthenticationResult {
            access_token,
            expires_in: self.token_ttl,
        })
    }

    /// Check that `token` is genuine, unexpired and belongs to `principal`.
    ///
    /// # Returns
    /// True when the token subject is the principal's username and the token
    /// has not expired
    ///
    /// # Errors
    /// * `Token` - Token is malformed or its signature does not verify
    pub fn validate_for_user<P: Principal + ?Sized>(
        &self,
        token: &str,
        principal: &P,
    ) -> Result<bool, AuthenticationError> {
        let claims = self.tokens.decode_and_verify(token)?;

        Ok(self.claims_match_user(&claims, principal))
    }

    /// Same check as [`Authenticator::validate_for_user`] for claims that were
    /// already verified.
    pub fn claims_match_user<P: Principal + ?Sized>(
        &self,
        claims: &Claims,
        principal: &P,
    ) -> bool {
        claims.sub == principal.username() && !self.tokens.claims_expired(claims)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use async_trait::async_trait;
    use chrono::DateTime;
    use chrono::Utc;
    use mockall::mock;

    use super::*;
    use crate::clock::Clock;
    use crate::clock::ManualClock;
    use crate::key::KeyProvider;

    mock! {
        pub TestVerifier {}

        #[async_trait]
        impl CredentialVerifier for TestVerifier {
            async fn authenticate(&self, username: &str, password: &str) -> Result<(), CredentialError>;
        }
    }

    mock! {
        pub TestHasher {}

        impl PasswordHasher for TestHasher {
            fn hash(&self, password: &str) -> Result<String, PasswordError>;
            fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError>;
        }
    }

    mock! {
        pub TestUserStore {}

        #[async_trait]
        impl UserStore for TestUserStore {
            async fn save(&self, identity: StoredIdentity) -> Result<StoredIdentity, StoreError>;
            async fn find_by_username(&self, username: &str) -> Result<Option<StoredIdentity>, StoreError>;
        }
    }

    /// Manual clock that counts reads; only issuance reads the clock.
    struct CountingClock {
        inner: ManualClock,
        reads: AtomicUsize,
    }

    impl Clock for CountingClock {
        fn now(&self) -> DateTime<Utc> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.now()
        }
    }

    fn counting_clock() -> Arc<CountingClock> {
        Arc::new(CountingClock {
            inner: ManualClock::new(DateTime::from_timestamp(1_700_000_000, 0).unwrap()),
            reads: AtomicUsize::new(0),
        })
    }

    fn authenticator(
        verifier: MockTestVerifier,
        hasher: MockTestHasher,
        store: MockTestUserStore,
        clock: Arc<CountingClock>,
    ) -> Authenticator<MockTestVerifier, MockTestHasher, MockTestUserStore> {
        let keys = KeyProvider::generate().unwrap();
        let tokens = Arc::new(TokenService::with_clock(&keys, clock));

        Authenticator::new(
            Arc::new(verifier),
            Arc::new(hasher),
            Arc::new(store),
            tokens,
            Duration::seconds(1800),
        )
    }

    #[tokio::test]
    async fn test_register_stores_hash_not_plaintext() {
        let mut hasher = MockTestHasher::new();
        let mut store = MockTestUserStore::new();

        hasher
            .expect_hash()
            .withf(|password| password == "pw")
            .times(1)
            .returning(|_| Ok("$argon2id$hashed".to_string()));

        store
            .expect_save()
            .withf(|identity| {
                identity.username == "neo"
                    && identity.password_hash == "$argon2id$hashed"
                    && !identity.password_hash.contains("pw")
            })
            .times(1)
            .returning(|identity| Ok(identity));

        let auth = authenticator(MockTestVerifier::new(), hasher, store, counting_clock());

        let stored = auth
            .register(Identity::new("neo", "pw"))
            .await
            .expect("Registration failed");

        assert_eq!(stored.username, "neo");
        assert_eq!(stored.password_hash, "$argon2id$hashed");
    }

    #[tokio::test]
    async fn test_register_store_failure() {
        let mut hasher = MockTestHasher::new();
        let mut store = MockTestUserStore::new();

        hasher
            .expect_hash()
            .times(1)
            .returning(|_| Ok("$argon2id$hashed".to_string()));
        store
            .expect_save()
            .times(1)
            .returning(|identity| Err(StoreError::UsernameTaken(identity.username)));

        let auth = authenticator(MockTestVerifier::new(), hasher, store, counting_clock());

        let result = auth.register(Identity::new("neo", "pw")).await;
        assert!(matches!(
            result,
            Err(AuthenticationError::Store(StoreError::UsernameTaken(name))) if name == "neo"
        ));
    }

    #[tokio::test]
    async fn test_register_hash_failure_skips_store() {
        let mut hasher = MockTestHasher::new();
        let mut store = MockTestUserStore::new();

        hasher
            .expect_hash()
            .times(1)
            .returning(|_| Err(PasswordError::HashingFailed("out of memory".to_string())));
        store.expect_save().times(0);

        let auth = authenticator(MockTestVerifier::new(), hasher, store, counting_clock());

        let result = auth.register(Identity::new("neo", "pw")).await;
        assert!(matches!(result, Err(AuthenticationError::PasswordError(_))));
    }

    #[tokio::test]
    async fn test_login_success_issues_token_for_username() {
        let mut verifier = MockTestVerifier::new();
        verifier
            .expect_authenticate()
            .withf(|username, password| username == "neo" && password == "pw")
            .times(1)
            .returning(|_, _| Ok(()));

        let auth = authenticator(
            verifier,
            MockTestHasher::new(),
            MockTestUserStore::new(),
            counting_clock(),
        );

        let result = auth.login("neo", "pw").await.expect("Login failed");
        assert_eq!(result.expires_in, Duration::seconds(1800));

        let claims = auth.tokens().decode_and_verify(&result.access_token).unwrap();
        assert_eq!(claims.sub, "neo");
        assert_eq!(claims.exp - claims.iat, 1800);
    }

    #[tokio::test]
    async fn test_login_rejected_issues_nothing() {
        let mut verifier = MockTestVerifier::new();
        verifier
            .expect_authenticate()
            .times(1)
            .returning(|_, _| Err(CredentialError::Rejected));

        let clock = counting_clock();
        let auth = authenticator(
            verifier,
            MockTestHasher::new(),
            MockTestUserStore::new(),
            clock.clone(),
        );

        let result = auth.login("neo", "wrongpass").await;

        assert!(matches!(
            result,
            Err(AuthenticationError::AuthenticationFailed)
        ));
        assert_eq!(clock.reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_login_verifier_unavailable() {
        let mut verifier = MockTestVerifier::new();
        verifier
            .expect_authenticate()
            .times(1)
            .returning(|_, _| Err(CredentialError::Unavailable("timeout".to_string())));

        let auth = authenticator(
            verifier,
            MockTestHasher::new(),
            MockTestUserStore::new(),
            counting_clock(),
        );

        let result = auth.login("neo", "pw").await;
        assert!(matches!(
            result,
            Err(AuthenticationError::VerifierUnavailable(reason)) if reason == "timeout"
        ));
    }

    #[tokio::test]
    async fn test_concurrent_logins_produce_independent_tokens() {
        let mut verifier = MockTestVerifier::new();
        verifier
            .expect_authenticate()
            .times(2)
            .returning(|_, _| Ok(()));

        let auth = authenticator(
            verifier,
            MockTestHasher::new(),
            MockTestUserStore::new(),
            counting_clock(),
        );

        let (first, second) = tokio::join!(auth.login("neo", "pw"), auth.login("neo", "pw"));
        let first = first.unwrap();
        let second = second.unwrap();
        assert_ne!(first.access_token, second.access_token);

        let owner = StoredIdentity::new("neo", "$argon2id$hash");
        assert!(auth.validate_for_user(&first.access_token, &owner).unwrap());
        assert!(auth.validate_for_user(&second.access_token, &owner).unwrap());
    }

    #[test]
    fn test_validate_for_user() {
        let clock = counting_clock();
        let auth = authenticator(
            MockTestVerifier::new(),
            MockTestHasher::new(),
            MockTestUserStore::new(),
            clock.clone(),
        );

        let token = auth.tokens().issue("alice", Duration::seconds(60)).unwrap();
        let alice = Identity::new("alice", "ignored");
        let bob = Identity::new("bob", "ignored");

        assert!(auth.validate_for_user(&token, &alice).unwrap());
        assert!(!auth.validate_for_user(&token, &bob).unwrap());

        clock.inner.advance(Duration::seconds(61));
        assert!(!auth.validate_for_user(&token, &alice).unwrap());
    }

    #[test]
    fn test_claims_match_user() {
        let clock = counting_clock();
        let auth = authenticator(
            MockTestVerifier::new(),
            MockTestHasher::new(),
            MockTestUserStore::new(),
            clock.clone(),
        );

        let token = auth.tokens().issue("alice", Duration::seconds(60)).unwrap();
        let claims = auth.tokens().decode_and_verify(&token).unwrap();
        let alice = StoredIdentity::new("alice", "$argon2id$hash");
        let bob = StoredIdentity::new("bob", "$argon2id$hash");

        assert!(auth.claims_match_user(&claims, &alice));
        assert!(!auth.claims_match_user(&claims, &bob));

        clock.inner.advance(Duration::seconds(60));
        assert!(!auth.claims_match_user(&claims, &alice));
    }

    #[test]
    fn test_validate_for_user_propagates_decode_failure() {
        let auth = authenticator(
            MockTestVerifier::new(),
            MockTestHasher::new(),
            MockTestUserStore::new(),
            counting_clock(),
        );

        let alice = Identity::new("alice", "ignored");

        assert!(matches!(
            auth.validate_for_user("invalid.token.here", &alice),
            Err(AuthenticationError::Token(TokenError::Malformed(_)))
        ));

        let other = TokenService::new(&KeyProvider::generate().unwrap());
        let foreign = other.issue("alice", Duration::seconds(60)).unwrap();
        assert!(matches!(
            auth.validate_for_user(&foreign, &alice),
            Err(AuthenticationError::Token(TokenError::SignatureInvalid))
        ));
    }
}
