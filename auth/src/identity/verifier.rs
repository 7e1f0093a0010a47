use std::sync::Arc;

use async_trait::async_trait;

use crate::identity::errors::CredentialError;
use crate::identity::ports::CredentialVerifier;
use crate::identity::ports::PasswordHasher;
use crate::identity::ports::UserStore;
use crate::password::PasswordError;

/// Password that no registered user can have; only its hash is ever used.
const DUMMY_PASSWORD: &str = "unused-timing-equalizer";

/// Credential verifier backed by a [`UserStore`] and a [`PasswordHasher`].
///
/// Unknown users are still checked against a dummy hash so that both rejection
/// paths cost one hash verification.
pub struct StoreCredentialVerifier<S, H>
where
    S: UserStore,
    H: PasswordHasher,
{
    store: Arc<S>,
    hasher: Arc<H>,
    dummy_hash: String,
}

impl<S, H> StoreCredentialVerifier<S, H>
where
    S: UserStore,
    H: PasswordHasher,
{
    /// Create a verifier over the given store and hasher.
    ///
    /// # Errors
    /// * `HashingFailed` - The dummy hash could not be computed
    pub fn new(store: Arc<S>, hasher: Arc<H>) -> Result<Self, PasswordError> {
        let dummy_hash = hasher.hash(DUMMY_PASSWORD)?;

        Ok(Self {
            store,
            hasher,
            dummy_hash,
        })
    }
}

#[async_trait]
impl<S, H> CredentialVerifier for StoreCredentialVerifier<S, H>
where
    S: UserStore,
    H: PasswordHasher,
{
    async fn authenticate(&self, username: &str, password: &str) -> Result<(), CredentialError> {
        let stored = self
            .store
            .find_by_username(username)
            .await
            .map_err(|e| CredentialError::Unavailable(e.to_string()))?;

        let Some(identity) = stored else {
            // Result ignored: the user does not exist either way.
            let _ = self.hasher.verify(password, &self.dummy_hash);
            return Err(CredentialError::Rejected);
        };

        match self.hasher.verify(password, &identity.password_hash) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CredentialError::Rejected),
            Err(e) => {
                tracing::error!(
                    username = %identity.username,
                    error = %e,
                    "Stored password hash is unreadable"
                );
                Err(CredentialError::Unavailable(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use mockall::mock;

    use super::*;
    use crate::identity::errors::StoreError;
    use crate::identity::models::StoredIdentity;
    use crate::password::Argon2Hasher;

    mock! {
        pub TestUserStore {}

        #[async_trait]
        impl UserStore for TestUserStore {
            async fn save(&self, identity: StoredIdentity) -> Result<StoredIdentity, StoreError>;
            async fn find_by_username(&self, username: &str) -> Result<Option<StoredIdentity>, StoreError>;
        }
    }

    fn store_with(username: &'static str, password: &str) -> MockTestUserStore {
        let hash = Argon2Hasher::new().hash(password).unwrap();
        let mut store = MockTestUserStore::new();
        store
            .expect_find_by_username()
            .returning(move |requested| {
                if requested == username {
                    Ok(Some(StoredIdentity::new(username, hash.clone())))
                } else {
                    Ok(None)
                }
            });
        store
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let store = store_with("neo", "pw");
        let verifier =
            StoreCredentialVerifier::new(Arc::new(store), Arc::new(Argon2Hasher::new())).unwrap();

        assert_eq!(verifier.authenticate("neo", "pw").await, Ok(()));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_look_the_same() {
        let store = store_with("neo", "pw");
        let verifier =
            StoreCredentialVerifier::new(Arc::new(store), Arc::new(Argon2Hasher::new())).unwrap();

        let wrong_password = verifier.authenticate("neo", "wrongpass").await;
        let unknown_user = verifier.authenticate("smith", "pw").await;

        assert_eq!(wrong_password, Err(CredentialError::Rejected));
        assert_eq!(unknown_user, Err(CredentialError::Rejected));
    }

    #[tokio::test]
    async fn test_store_failure_is_unavailable() {
        let mut store = MockTestUserStore::new();
        store
            .expect_find_by_username()
            .times(1)
            .returning(|_| Err(StoreError::Unavailable("connection refused".to_string())));

        let verifier =
            StoreCredentialVerifier::new(Arc::new(store), Arc::new(Argon2Hasher::new())).unwrap();

        assert!(matches!(
            verifier.authenticate("neo", "pw").await,
            Err(CredentialError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_corrupt_hash_is_unavailable() {
        let mut store = MockTestUserStore::new();
        store
            .expect_find_by_username()
            .returning(|_| Ok(Some(StoredIdentity::new("neo", "not-a-phc-string"))));

        let verifier =
            StoreCredentialVerifier::new(Arc::new(store), Arc::new(Argon2Hasher::new())).unwrap();

        assert!(matches!(
            verifier.authenticate("neo", "pw").await,
            Err(CredentialError::Unavailable(_))
        ));
    }
}
