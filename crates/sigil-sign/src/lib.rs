//! # sigil-sign
//!
//! Signed access tokens for Sigil.
//!
//! This crate provides functionality for:
//! - Issuing session tokens (time-limited, not bound to a resource)
//! - Issuing one-shot resource tokens (bound to one resource id, no expiry)
//! - Verifying tokens and extracting their claims
//!
//! ## Wire Format
//!
//! ```text
//! base64( HMAC-SHA1(secret_key, plaintext) || plaintext )
//! plaintext = a=<app>&k=<secret_id>&e=<expire_at>&t=<issued_at>&r=<nonce>&u=<user>&f=<resource_id>
//! ```
//!
//! | Token Type | Issued With | `e` | `f` |
//! |------------|-------------|-----|-----|
//! | **Session** | [`app_sign`] / [`Signer::sign_session`] | expiry (epoch s) | empty |
//! | **Resource** | [`app_sign_once`] / [`Signer::sign_once`] | `0` | resource id |
//!
//! A verified token always has exactly one of the two set.

pub mod claims;
pub mod error;
pub mod resource;
pub mod schema;
pub mod secret;
pub mod source;
pub mod token;

pub use claims::{Claims, ClaimsRequest, TokenMode, VerifiedClaims};
pub use error::SignError;
pub use resource::ResourceUrl;
pub use schema::{MarkerTrim, TAG_LEN};
pub use secret::SecretPair;
pub use source::{Clock, FixedClock, FixedNonce, NonceSource, SystemClock, ThreadRngNonce};
pub use token::{
    InspectedField, Signer, TokenInfo, Verifier, app_sign, app_sign_once, decode, encode,
    inspect_token_unverified,
};
