use thiserror::Error;

/// Error for user store operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Username already exists: {0}")]
    UsernameTaken(String),

    #[error("Database error: {0}")]
    Unavailable(String),
}

/// Outcome of a failed credential check
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CredentialError {
    /// Username unknown or password wrong; callers must not learn which.
    #[error("Invalid credentials")]
    Rejected,

    #[error("Credential verifier unavailable: {0}")]
    Unavailable(String),
}
