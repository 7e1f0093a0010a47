use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::TokenError;
use crate::clock::Clock;
use crate::clock::SystemClock;
use crate::key::KeyProvider;

/// Issues and verifies HS256 access tokens.
///
/// Holds key material derived from a [`KeyProvider`] and a clock; every
/// operation only reads them, so one instance is shared across requests.
/// Signature comparison happens inside `jsonwebtoken` and is constant-time.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    /// Create a token service signing with the provider's key and the wall clock.
    pub fn new(keys: &KeyProvider) -> Self {
        Self::with_clock(keys, Arc::new(SystemClock))
    }

    /// Create a token service reading time from `clock`.
    pub fn with_clock(keys: &KeyProvider, clock: Arc<dyn Clock>) -> Self {
        let secret = keys.key().as_bytes();
        let algorithm = Algorithm::HS256;

        // Expiry is checked against our own clock, not by jsonwebtoken.
        let mut validation = Validation::new(algorithm);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm,
            validation,
            clock,
        }
    }

    /// Issue a token for `subject` valid for `ttl` from now.
    ///
    /// # Errors
    /// * `InvalidTtl` - ttl is shorter than one second
    /// * `EncodingFailed` - Claims could not be serialized or signed
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<String, TokenError> {
        if ttl.num_seconds() < 1 {
            return Err(TokenError::InvalidTtl(ttl.num_seconds()));
        }

        let claims = Claims::issued(subject, self.clock.now(), ttl)
            .ok_or(TokenError::InvalidTtl(ttl.num_seconds()))?;

        self.issue_claims(&claims)
    }

    /// Sign caller-built claims.
    ///
    /// # Errors
    /// * `InvalidTtl` - `exp` is not after `iat`
    /// * `EncodingFailed` - An `extra` key reuses a reserved claim name, or the
    ///   claims could not be serialized or signed
    pub fn issue_claims(&self, claims: &Claims) -> Result<String, TokenError> {
        if claims.exp <= claims.iat {
            return Err(TokenError::InvalidTtl(claims.exp.saturating_sub(claims.iat)));
        }

        if let Some(key) = claims.reserved_extra_key() {
            return Err(TokenError::EncodingFailed(format!(
                "extra claim `{}` would shadow a reserved claim",
                key
            )));
        }

        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))
    }

    /// Verify the signature of `token` and return its claims.
    ///
    /// Expiry is not checked here, see [`TokenService::is_expired`].
    ///
    /// # Errors
    /// * `SignatureInvalid` - Signature does not match the current key, or the
    ///   header names another algorithm
    /// * `Malformed` - Token structure or claims cannot be parsed
    pub fn decode_and_verify(&self, token: &str) -> Result<Claims, TokenError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                        TokenError::SignatureInvalid
                    }
                    _ => TokenError::Malformed(e.to_string()),
                }
            })?;

        Ok(token_data.claims)
    }

    /// Verify `token` and return its subject.
    pub fn extract_subject(&self, token: &str) -> Result<String, TokenError> {
        self.decode_and_verify(token).map(|claims| claims.sub)
    }

    /// Verify `token` and report whether it has expired.
    pub fn is_expired(&self, token: &str) -> Result<bool, TokenError> {
        self.decode_and_verify(token)
            .map(|claims| self.claims_expired(&claims))
    }

    /// Check already verified claims against the current time.
    pub fn claims_expired(&self, claims: &Claims) -> bool {
        claims.is_expired(self.clock.now().timestamp())
    }
}
