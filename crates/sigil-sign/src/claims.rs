//! Token claims for session and resource tokens.

use crate::schema::{self, Field};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Everything a caller decides when issuing a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimsRequest {
    /// Calling application.
    pub application_id: u64,

    /// End user the token acts for.
    pub user_id: u64,

    /// Lifetime in seconds, `0` for no expiry.
    #[serde(default)]
    pub expire_seconds: u64,

    /// Resource URL the token is scoped to.
    #[serde(default)]
    pub resource_url: Option<String>,
}

impl ClaimsRequest {
    /// A time-limited session token request.
    pub fn session(application_id: u64, user_id: u64, expire_seconds: u64) -> Self {
        Self {
            application_id,
            user_id,
            expire_seconds,
            resource_url: None,
        }
    }

    /// A permanent token bound to one resource.
    pub fn resource(application_id: u64, user_id: u64, resource_url: impl Into<String>) -> Self {
        Self {
            application_id,
            user_id,
            expire_seconds: 0,
            resource_url: Some(resource_url.into()),
        }
    }
}

/// The full set of signed claims, as written into the plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    pub application_id: u64,
    pub secret_id: String,
    pub expire_at: u64,
    pub issued_at: u64,
    pub nonce: u32,
    pub user_id: u64,
    pub resource_id: String,
}

impl Claims {
    /// Canonical plaintext over which the tag is computed.
    pub fn to_plaintext(&self) -> String {
        schema::render(|field| match field {
            Field::AppId => Cow::Owned(self.application_id.to_string()),
            Field::SecretId => Cow::Borrowed(self.secret_id.as_str()),
            Field::ExpireAt => Cow::Owned(self.expire_at.to_string()),
            Field::IssuedAt => Cow::Owned(self.issued_at.to_string()),
            Field::Nonce => Cow::Owned(self.nonce.to_string()),
            Field::UserId => Cow::Owned(self.user_id.to_string()),
            Field::ResourceId => Cow::Borrowed(self.resource_id.as_str()),
        })
    }
}

/// Issuing mode of a verified token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenMode {
    /// Time-limited, not bound to a resource.
    Session,
    /// Bound to one resource, never expires by time.
    Resource,
}

/// Claims extracted from a token that passed verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedClaims {
    pub user_id: u64,

    /// Absolute expiry in epoch seconds, `0` for resource tokens.
    pub expire_at: u64,

    /// Resource id, empty for session tokens.
    pub resource_id: String,
}

impl VerifiedClaims {
    pub fn mode(&self) -> TokenMode {
        if self.resource_id.is_empty() {
            TokenMode::Session
        } else {
            TokenMode::Resource
        }
    }

    /// Check whether the token has expired at `now` (epoch seconds).
    ///
    /// Resource tokens never expire.
    pub fn is_expired(&self, now: u64) -> bool {
        self.expire_at != 0 && now > self.expire_at
    }

    /// Seconds left before expiry, `None` for resource tokens.
    pub fn time_until_expiration(&self, now: u64) -> Option<u64> {
        (self.expire_at != 0).then(|| self.expire_at.saturating_sub(now))
    }
}

impl From<VerifiedClaims> for (u64, u64, String) {
    fn from(claims: VerifiedClaims) -> Self {
        (claims.user_id, claims.expire_at, claims.resource_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plaintext_layout() {
        let claims = Claims {
            application_id: 100,
            secret_id: "sid1".to_string(),
            expire_at: 0,
            issued_at: 1_700_000_000,
            nonce: 12345,
            user_id: 42,
            resource_id: "file123".to_string(),
        };

        assert_eq!(
            claims.to_plaintext(),
            "a=100&k=sid1&e=0&t=1700000000&r=12345&u=42&f=file123"
        );
    }

    #[test]
    fn test_session_expiry() {
        let claims = VerifiedClaims {
            user_id: 1,
            expire_at: 1000,
            resource_id: String::new(),
        };

        assert_eq!(claims.mode(), TokenMode::Session);
        assert!(!claims.is_expired(1000));
        assert!(claims.is_expired(1001));
        assert_eq!(claims.time_until_expiration(400), Some(600));
        assert_eq!(claims.time_until_expiration(2000), Some(0));
    }

    #[test]
    fn test_resource_token_never_expires() {
        let claims = VerifiedClaims {
            user_id: 1,
            expire_at: 0,
            resource_id: "abc".to_string(),
        };

        assert_eq!(claims.mode(), TokenMode::Resource);
        assert!(!claims.is_expired(u64::MAX));
        assert_eq!(claims.time_until_expiration(5), None);
    }
}
