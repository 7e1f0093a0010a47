//! Credential authentication core
//!
//! Turns a verified username/password pair into a signed, time-bounded access
//! token and later re-validates that token against a user:
//! - Signing key lifecycle (one symmetric key per process)
//! - JWT issuance and verification (HS256)
//! - Registration, login and token/user validation flows
//! - Password hashing (Argon2id) and a store-backed credential verifier
//!
//! Persistence and transport are left to the embedding service, which plugs
//! them in through the [`UserStore`] and [`CredentialVerifier`] ports.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::{Argon2Hasher, PasswordHasher};
//!
//! let hasher = Argon2Hasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## JWT Tokens
//! ```
//! use auth::{KeyProvider, TokenService};
//! use chrono::Duration;
//!
//! let keys = KeyProvider::generate().unwrap();
//! let tokens = TokenService::new(&keys);
//!
//! let token = tokens.issue("neo", Duration::minutes(30)).unwrap();
//! assert_eq!(tokens.extract_subject(&token).unwrap(), "neo");
//! assert!(!tokens.is_expired(&token).unwrap());
//! ```

pub mod authenticator;
pub mod clock;
pub mod identity;
pub mod jwt;
pub mod key;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use clock::Clock;
pub use clock::ManualClock;
pub use clock::SystemClock;
pub use identity::CredentialError;
pub use identity::CredentialVerifier;
pub use identity::Identity;
pub use identity::PasswordHasher;
pub use identity::Principal;
pub use identity::StoreCredentialVerifier;
pub use identity::StoreError;
pub use identity::StoredIdentity;
pub use identity::UserStore;
pub use jwt::Claims;
pub use jwt::TokenError;
pub use jwt::TokenService;
pub use key::KeyError;
pub use key::KeyProvider;
pub use key::SigningKey;
pub use password::Argon2Hasher;
pub use password::PasswordError;
