pub mod errors;
pub mod models;
pub mod ports;
pub mod verifier;

pub use errors::CredentialError;
pub use errors::StoreError;
pub use models::Identity;
pub use models::Principal;
pub use models::StoredIdentity;
pub use ports::CredentialVerifier;
pub use ports::PasswordHasher;
pub use ports::UserStore;
pub use verifier::StoreCredentialVerifier;
