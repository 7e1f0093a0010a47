use std::fmt;

use chrono::DateTime;
use chrono::Utc;

/// Anything that names a user a token can be checked against.
pub trait Principal {
    fn username(&self) -> &str;
}

/// Username and plaintext password as presented by a caller.
///
/// Only lives for the duration of a registration or login call. The
/// credential is never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    username: String,
    credential: String,
}

impl Identity {
    pub fn new(username: impl Into<String>, credential: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            credential: credential.into(),
        }
    }

    pub fn credential(&self) -> &str {
        &self.credential
    }
}

impl Principal for Identity {
    fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("username", &self.username)
            .field("credential", &"<redacted>")
            .finish()
    }
}

/// Identity as persisted: the plaintext credential replaced by its hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredIdentity {
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl StoredIdentity {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            created_at: Utc::now(),
        }
    }
}

impl Principal for StoredIdentity {
    fn username(&self) -> &str {
        &self.username
    }
}
