//! Error types for the signing crate.

use thiserror::Error;

/// Errors that can occur while issuing or verifying a signature.
///
/// Every variant means "reject this token". Messages never carry key material,
/// tag bytes or raw plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignError {
    /// Secret id or secret key is missing.
    #[error("invalid params: {0}")]
    InvalidParams(&'static str),

    /// Resource URL does not have enough path segments.
    #[error("malformed resource url: expected domain/app_id/user_id/resource_id, got {segments} segment(s)")]
    MalformedResourceUrl { segments: usize },

    /// Empty signature string.
    #[error("invalid sign string")]
    InvalidSign,

    /// Token is not valid base64.
    #[error("failed to decode sign: {0}")]
    DecodeFailed(String),

    /// Decoded token is not longer than the tag.
    #[error("sign is too short: {len} byte(s)")]
    TokenTooShort { len: usize },

    /// Integrity tag does not match the plaintext.
    #[error("signature mismatch")]
    SignatureMismatch,

    /// Application id in the token differs from the expected one.
    #[error("application id mismatch (expected {expected})")]
    AppIdMismatch { expected: u64 },

    /// Secret id in the token differs from the expected one.
    #[error("secret id mismatch")]
    SecretIdMismatch,

    /// Expiry field is not an unsigned integer.
    #[error("malformed expire field")]
    MalformedExpire,

    /// User field is not an unsigned integer.
    #[error("malformed user field")]
    MalformedUser,

    /// Plaintext does not have the expected field layout.
    #[error("malformed plaintext: {0}")]
    MalformedPlaintext(&'static str),

    /// Both or neither of expiry and resource id are set.
    #[error("inconsistent claims: exactly one of expire time and resource id must be set")]
    InconsistentClaims,
}

impl SignError {
    /// Short stable name of the error kind, suitable for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            SignError::InvalidParams(_) => "invalid_params",
            SignError::MalformedResourceUrl { .. } => "malformed_resource_url",
            SignError::InvalidSign => "invalid_sign",
            SignError::DecodeFailed(_) => "decode_failed",
            SignError::TokenTooShort { .. } => "token_too_short",
            SignError::SignatureMismatch => "signature_mismatch",
            SignError::AppIdMismatch { .. } => "app_id_mismatch",
            SignError::SecretIdMismatch => "secret_id_mismatch",
            SignError::MalformedExpire => "malformed_expire",
            SignError::MalformedUser => "malformed_user",
            SignError::MalformedPlaintext(_) => "malformed_plaintext",
            SignError::InconsistentClaims => "inconsistent_claims",
        }
    }
}
