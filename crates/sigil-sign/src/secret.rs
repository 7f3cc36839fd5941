//! Shared secret pair used to sign and verify tokens.

use crate::error::SignError;
use crate::schema::TAG_LEN;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use std::fmt;

type HmacSha1 = Hmac<Sha1>;

/// A secret id and the HMAC key it names.
///
/// The id is embedded in every token; the key never leaves this struct and is
/// redacted from `Debug` output.
#[derive(Clone)]
pub struct SecretPair {
    id: String,
    key: Vec<u8>,
}

impl SecretPair {
    /// Create a secret pair, rejecting an empty id or key.
    pub fn new(id: impl Into<String>, key: impl Into<Vec<u8>>) -> Result<Self, SignError> {
        let id = id.into();
        let key = key.into();
        if id.is_empty() || key.is_empty() {
            return Err(SignError::InvalidParams("secret id or key is empty"));
        }
        Ok(Self { id, key })
    }

    /// Create a secret pair without the emptiness check.
    ///
    /// Verification accepts any configured pair; an empty key fails the tag
    /// comparison and an empty id fails the secret id check.
    pub(crate) fn unchecked(id: impl Into<String>, key: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Compute the HMAC-SHA1 tag of `plaintext`.
    pub(crate) fn tag(&self, plaintext: &[u8]) -> Result<[u8; TAG_LEN], SignError> {
        let mut mac = HmacSha1::new_from_slice(&self.key)
            .map_err(|_| SignError::InvalidParams("secret key rejected by hmac"))?;
        mac.update(plaintext);

        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&mac.finalize().into_bytes());
        Ok(tag)
    }
}

impl fmt::Debug for SecretPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretPair")
            .field("id", &self.id)
            .field("key", &"<redacted>")
            .finish()
    }
}
