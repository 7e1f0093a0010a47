use async_trait::async_trait;

use crate::identity::errors::CredentialError;
use crate::identity::errors::StoreError;
use crate::identity::models::StoredIdentity;
use crate::password::PasswordError;

/// Decides whether a username/password pair is genuine.
#[async_trait]
pub trait CredentialVerifier: Send + Sync + 'static {
    /// Check a presented credential.
    ///
    /// # Arguments
    /// * `username` - Claimed username
    /// * `password` - Plaintext password
    ///
    /// # Returns
    /// Unit when the pair is genuine
    ///
    /// # Errors
    /// * `Rejected` - Unknown user or wrong password (indistinguishable)
    /// * `Unavailable` - Backing store could not be consulted
    async fn authenticate(&self, username: &str, password: &str) -> Result<(), CredentialError>;
}

/// One-way salted password hashing.
pub trait PasswordHasher: Send + Sync + 'static {
    /// Hash a plaintext password for storage.
    ///
    /// # Errors
    /// * `HashingFailed` - Hashing operation failed
    fn hash(&self, password: &str) -> Result<String, PasswordError>;

    /// Check a plaintext password against a stored hash.
    ///
    /// # Returns
    /// True if password matches, false otherwise
    ///
    /// # Errors
    /// * `UnreadableHash` - Stored hash is unreadable
    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError>;
}

/// Persistence of user records keyed by username.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Persist a new user.
    ///
    /// # Arguments
    /// * `identity` - User record carrying a password hash, never plaintext
    ///
    /// # Returns
    /// Stored user record
    ///
    /// # Errors
    /// * `UsernameTaken` - Username is already registered
    /// * `Unavailable` - Storage operation failed
    async fn save(&self, identity: StoredIdentity) -> Result<StoredIdentity, StoreError>;

    /// Retrieve a user by username.
    ///
    /// # Returns
    /// Optional user record (None if not found)
    ///
    /// # Errors
    /// * `Unavailable` - Storage operation failed
    async fn find_by_username(&self, username: &str) -> Result<Option<StoredIdentity>, StoreError>;
}
