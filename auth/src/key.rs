use std::fmt;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::rand_core::RngCore;
use thiserror::Error;

/// Length in bytes of a generated HS256 signing key.
pub const KEY_LENGTH: usize = 32;

/// Error type for signing key setup.
#[derive(Debug, Clone, Error)]
pub enum KeyError {
    #[error("Failed to generate signing key: {0}")]
    GenerationFailed(String),

    #[error("Signing key too short: minimum {min} bytes, got {actual}")]
    TooShort { min: usize, actual: usize },
}

/// Symmetric secret used to sign and verify tokens.
///
/// Never leaves the process: there is no serialization and `Debug` is redacted.
#[derive(Clone)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningKey(<{} bytes redacted>)", self.0.len())
    }
}

/// Owner of the single signing key of a process.
///
/// Built once at startup and handed by reference to the token service.
/// A generated key lives only in memory, so a restart invalidates every token
/// issued before it.
#[derive(Debug)]
pub struct KeyProvider {
    key: SigningKey,
}

impl KeyProvider {
    /// Generate a fresh random key from the operating system CSPRNG.
    ///
    /// # Errors
    /// * `GenerationFailed` - The entropy source is unavailable
    pub fn generate() -> Result<Self, KeyError> {
        let mut bytes = vec![0u8; KEY_LENGTH];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| KeyError::GenerationFailed(e.to_string()))?;

        Ok(Self {
            key: SigningKey(bytes),
        })
    }

    /// Use externally supplied key material.
    ///
    /// # Errors
    /// * `TooShort` - Secret is shorter than 32 bytes
    pub fn from_secret(secret: &[u8]) -> Result<Self, KeyError> {
        if secret.len() < KEY_LENGTH {
            return Err(KeyError::TooShort {
                min: KEY_LENGTH,
                actual: secret.len(),
            });
        }

        Ok(Self {
            key: SigningKey(secret.to_vec()),
        })
    }

    /// Build the provider from an optional configured secret.
    ///
    /// An absent or empty secret falls back to a generated key.
    pub fn from_settings(secret: Option<&str>) -> Result<Self, KeyError> {
        match secret.filter(|s| !s.is_empty()) {
            Some(secret) => {
                let provider = Self::from_secret(secret.as_bytes())?;
                tracing::info!(
                    source = "configured",
                    key_bytes = provider.key.len(),
                    "Signing key loaded"
                );
                Ok(provider)
            }
            None => {
                let provider = Self::generate()?;
                tracing::info!(
                    source = "generated",
                    key_bytes = provider.key.len(),
                    "Signing key generated, tokens will not survive a restart"
                );
                Ok(provider)
            }
        }
    }

    pub fn key(&self) -> &SigningKey {
        &self.key
    }
}
