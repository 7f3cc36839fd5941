//! Token creation and verification.

use crate::claims::{Claims, ClaimsRequest, VerifiedClaims};
use crate::error::SignError;
use crate::resource::ResourceUrl;
use crate::schema::{Field, MarkerTrim, Record, TAG_LEN};
use crate::secret::SecretPair;
use crate::source::{Clock, NonceSource, SystemClock, ThreadRngNonce};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use subtle::ConstantTimeEq;

/// Issues signed tokens.
pub struct Signer<C = SystemClock, N = ThreadRngNonce> {
    secret: SecretPair,
    clock: C,
    nonce: N,
}

impl Signer {
    /// Create a signer using the wall clock and thread RNG.
    pub fn new(secret: SecretPair) -> Self {
        Self::with_sources(secret, SystemClock, ThreadRngNonce)
    }
}

impl<C: Clock, N: NonceSource> Signer<C, N> {
    /// Create a signer with explicit time and nonce sources.
    pub fn with_sources(secret: SecretPair, clock: C, nonce: N) -> Self {
        Self {
            secret,
            clock,
            nonce,
        }
    }

    /// Sign a time-limited session token. `expire_seconds == 0` means no expiry.
    pub fn sign_session(
        &self,
        application_id: u64,
        user_id: u64,
        expire_seconds: u64,
    ) -> Result<String, SignError> {
        self.issue(&ClaimsRequest::session(
            application_id,
            user_id,
            expire_seconds,
        ))
    }

    /// Sign a permanent token scoped to the resource named by `resource_url`.
    pub fn sign_once(
        &self,
        application_id: u64,
        user_id: u64,
        resource_url: &str,
    ) -> Result<String, SignError> {
        self.issue(&ClaimsRequest::resource(application_id, user_id, resource_url))
    }

    /// Sign a token for `request`.
    pub fn issue(&self, request: &ClaimsRequest) -> Result<String, SignError> {
        let claims = self.claims_for(request)?;
        let plaintext = claims.to_plaintext();
        let tag = self.secret.tag(plaintext.as_bytes())?;

        let mut envelope = Vec::with_capacity(TAG_LEN + plaintext.len());
        envelope.extend_from_slice(&tag);
        envelope.extend_from_slice(plaintext.as_bytes());

        tracing::debug!(
            application_id = claims.application_id,
            user_id = claims.user_id,
            expire_at = claims.expire_at,
            scoped = !claims.resource_id.is_empty(),
            "Issued signature"
        );

        Ok(STANDARD.encode(envelope))
    }

    /// Resolve the signed claims for `request` at the current time.
    pub fn claims_for(&self, request: &ClaimsRequest) -> Result<Claims, SignError> {
        let resource_id = match request.resource_url.as_deref() {
            Some(url) if !url.is_empty() => ResourceUrl::parse(url)?.resource_id,
            _ => String::new(),
        };

        let issued_at = self.clock.now();
        let expire_at = if request.expire_seconds == 0 {
            0
        } else {
            issued_at.saturating_add(request.expire_seconds)
        };

        Ok(Claims {
            application_id: request.application_id,
            secret_id: self.secret.id().to_string(),
            expire_at,
            issued_at,
            nonce: self.nonce.nonce(),
            user_id: request.user_id,
            resource_id,
        })
    }
}

/// Verifies tokens issued for one application and secret.
#[derive(Debug, Clone)]
pub struct Verifier {
    application_id: u64,
    secret: SecretPair,
    trim: MarkerTrim,
}

impl Verifier {
    /// Create a verifier that expects tokens for `application_id`.
    pub fn new(application_id: u64, secret: SecretPair) -> Self {
        Self {
            application_id,
            secret,
            trim: MarkerTrim::default(),
        }
    }

    /// Choose how field markers are stripped.
    pub fn with_marker_trim(mut self, trim: MarkerTrim) -> Self {
        self.trim = trim;
        self
    }

    /// Verify a token and extract its claims.
    pub fn verify(&self, token: &str) -> Result<VerifiedClaims, SignError> {
        match self.check(token) {
            Ok(claims) => {
                tracing::debug!(
                    application_id = self.application_id,
                    user_id = claims.user_id,
                    expire_at = claims.expire_at,
                    mode = ?claims.mode(),
                    "Signature verified"
                );
                Ok(claims)
            }
            Err(e) => {
                tracing::warn!(
                    application_id = self.application_id,
                    kind = e.kind(),
                    "Signature verification failed"
                );
                Err(e)
            }
        }
    }

    fn check(&self, token: &str) -> Result<VerifiedClaims, SignError> {
        if token.is_empty() {
            return Err(SignError::InvalidSign);
        }

        let envelope = STANDARD
            .decode(token)
            .map_err(|e| SignError::DecodeFailed(e.to_string()))?;
        if envelope.len() <= TAG_LEN {
            return Err(SignError::TokenTooShort {
                len: envelope.len(),
            });
        }

        let (tag, plaintext) = envelope.split_at(TAG_LEN);
        let expected = self.secret.tag(plaintext)?;
        if !bool::from(tag.ct_eq(&expected[..])) {
            return Err(SignError::SignatureMismatch);
        }

        let plaintext = std::str::from_utf8(plaintext)
            .map_err(|_| SignError::MalformedPlaintext("plaintext is not valid utf-8"))?;
        let record = Record::parse(plaintext)?;

        let expected_app = format!("{}{}", Field::AppId.marker(), self.application_id);
        if record.raw(Field::AppId) != expected_app {
            return Err(SignError::AppIdMismatch {
                expected: self.application_id,
            });
        }

        if record.value(Field::SecretId, MarkerTrim::Prefix) != Some(self.secret.id()) {
            return Err(SignError::SecretIdMismatch);
        }

        let expire_at = record
            .value(Field::ExpireAt, self.trim)
            .and_then(|v| v.parse::<u64>().ok())
            .ok_or(SignError::MalformedExpire)?;

        let user_id = record
            .value(Field::UserId, self.trim)
            .and_then(|v| v.parse::<u64>().ok())
            .ok_or(SignError::MalformedUser)?;

        let resource_id = record
            .value(Field::ResourceId, self.trim)
            .ok_or(SignError::MalformedPlaintext("missing resource marker"))?
            .to_string();

        if (expire_at == 0) == resource_id.is_empty() {
            return Err(SignError::InconsistentClaims);
        }

        Ok(VerifiedClaims {
            user_id,
            expire_at,
            resource_id,
        })
    }
}

/// Sign a token from positional arguments.
///
/// An empty `resource_url` issues an unscoped token; `expire_seconds == 0`
/// issues one without expiry.
pub fn encode(
    application_id: u64,
    secret_id: &str,
    secret_key: &str,
    expire_seconds: u64,
    user_id: u64,
    resource_url: &str,
) -> Result<String, SignError> {
    let signer = Signer::new(SecretPair::new(secret_id, secret_key)?);
    let request = ClaimsRequest {
        application_id,
        user_id,
        expire_seconds,
        resource_url: (!resource_url.is_empty()).then(|| resource_url.to_string()),
    };
    signer.issue(&request)
}

/// Sign a session token.
pub fn app_sign(
    application_id: u64,
    secret_id: &str,
    secret_key: &str,
    expire_seconds: u64,
    user_id: u64,
) -> Result<String, SignError> {
    encode(application_id, secret_id, secret_key, expire_seconds, user_id, "")
}

/// Sign a one-shot resource token.
pub fn app_sign_once(
    application_id: u64,
    secret_id: &str,
    secret_key: &str,
    user_id: u64,
    resource_url: &str,
) -> Result<String, SignError> {
    encode(application_id, secret_id, secret_key, 0, user_id, resource_url)
}

/// Verify a token, returning `(user_id, expire_at, resource_id)`.
pub fn decode(
    token: &str,
    application_id: u64,
    secret_id: &str,
    secret_key: &str,
) -> Result<(u64, u64, String), SignError> {
    let verifier = Verifier::new(application_id, SecretPair::unchecked(secret_id, secret_key));
    verifier.verify(token).map(Into::into)
}

/// One plaintext field as seen by [`inspect_token_unverified`].
#[derive(Debug, Clone, Serialize)]
pub struct InspectedField {
    pub name: &'static str,
    pub value: String,
}

/// Information about a token (for inspection).
#[derive(Debug, Clone, Serialize)]
pub struct TokenInfo {
    /// Decoded envelope length in bytes.
    pub envelope_len: usize,

    /// Plaintext fields in wire order.
    pub fields: Vec<InspectedField>,
}

/// Inspect a token without verification (for debugging).
///
/// The tag is not checked; nothing returned here may be trusted.
pub fn inspect_token_unverified(token: &str) -> Result<TokenInfo, SignError> {
    if token.is_empty() {
        return Err(SignError::InvalidSign);
    }
    let envelope = STANDARD
        .decode(token)
        .map_err(|e| SignError::DecodeFailed(e.to_string()))?;
    if envelope.len() <= TAG_LEN {
        return Err(SignError::TokenTooShort {
            len: envelope.len(),
        });
    }

    let plaintext = String::from_utf8_lossy(&envelope[TAG_LEN..]);
    let record = Record::parse(&plaintext)?;
    let fields = Field::ALL
        .iter()
        .map(|field| InspectedField {
            name: field.name(),
            value: record
                .value(*field, MarkerTrim::Prefix)
                .unwrap_or_else(|| record.raw(*field))
                .to_string(),
        })
        .collect();

    Ok(TokenInfo {
        envelope_len: envelope.len(),
        fields,
    })
}
