use std::collections::HashMap;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Claim names owned by the token service; `extra` never overrides them.
const RESERVED: [&str; 4] = ["sub", "iat", "exp", "jti"];

/// Payload carried by an access token.
///
/// Timestamps are absolute Unix seconds. Application-defined fields go in
/// `extra` and are flattened into the token payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject (username the token was issued to)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// JWT ID, unique per issued token
    pub jti: String,

    /// Additional custom fields (flattened into token)
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Claims {
    /// Create claims issued at `now` that expire `ttl` later, with a fresh `jti`.
    ///
    /// The ttl is truncated to whole seconds. Returns `None` when the
    /// expiration cannot be represented.
    pub fn issued(subject: impl ToString, now: DateTime<Utc>, ttl: Duration) -> Option<Self> {
        let iat = now.timestamp();
        let exp = iat.checked_add(ttl.num_seconds())?;

        Some(Self {
            sub: subject.to_string(),
            iat,
            exp,
            jti: Uuid::new_v4().to_string(),
            extra: HashMap::new(),
        })
    }

    /// Add a custom field. Reserved claim names are ignored.
    pub fn with_extra(mut self, key: impl ToString, value: impl Serialize) -> Self {
        let key = key.to_string();
        if RESERVED.contains(&key.as_str()) {
            return self;
        }
        if let Ok(json_value) = serde_json::to_value(value) {
            self.extra.insert(key, json_value);
        }
        self
    }

    /// First `extra` key that collides with a claim name owned by the token
    /// service, if any.
    pub fn reserved_extra_key(&self) -> Option<&str> {
        self.extra
            .keys()
            .map(String::as_str)
            .find(|key| RESERVED.contains(key))
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Check if the token is expired at `current_timestamp`.
    ///
    /// A token stops being valid at the exact second of `exp`.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        current_timestamp >= self.exp
    }
}
