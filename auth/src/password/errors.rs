use thiserror::Error;

/// Failures of the password hashing primitive.
///
/// A password that simply does not match is not an error, see
/// [`crate::PasswordHasher::verify`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Stored password hash is unreadable: {0}")]
    UnreadableHash(String),
}
