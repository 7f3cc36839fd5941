//! Canonical plaintext layout shared by the signer and the verifier.
//!
//! A plaintext is an ordered, `&`-joined list of `marker=value` fields:
//!
//! ```text
//! a=<application_id>&k=<secret_id>&e=<expire_at>&t=<issued_at>&r=<nonce>&u=<user_id>&f=<resource_id>
//! ```
//!
//! Fields are addressed by position, never by name. [`Field::ALL`] is the only
//! place the order is defined.

use crate::error::SignError;
use std::borrow::Cow;

/// Length in bytes of the HMAC-SHA1 tag prefixed to every token.
pub const TAG_LEN: usize = 20;

/// Separator between plaintext fields.
pub const SEPARATOR: char = '&';

/// One positional field of the plaintext.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    AppId = 0,
    SecretId = 1,
    ExpireAt = 2,
    IssuedAt = 3,
    Nonce = 4,
    UserId = 5,
    ResourceId = 6,
}

impl Field {
    /// All fields in wire order.
    pub const ALL: [Field; 7] = [
        Field::AppId,
        Field::SecretId,
        Field::ExpireAt,
        Field::IssuedAt,
        Field::Nonce,
        Field::UserId,
        Field::ResourceId,
    ];

    /// Position of the field in the plaintext.
    pub fn position(self) -> usize {
        self as usize
    }

    /// Literal marker that starts the field, including the `=`.
    pub fn marker(self) -> &'static str {
        match self {
            Field::AppId => "a=",
            Field::SecretId => "k=",
            Field::ExpireAt => "e=",
            Field::IssuedAt => "t=",
            Field::Nonce => "r=",
            Field::UserId => "u=",
            Field::ResourceId => "f=",
        }
    }

    /// Human-readable name, used by token inspection.
    pub fn name(self) -> &'static str {
        match self {
            Field::AppId => "application_id",
            Field::SecretId => "secret_id",
            Field::ExpireAt => "expire_at",
            Field::IssuedAt => "issued_at",
            Field::Nonce => "nonce",
            Field::UserId => "user_id",
            Field::ResourceId => "resource_id",
        }
    }
}

/// How a field's marker is removed before its value is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkerTrim {
    /// Strip the literal marker exactly once. A field without it is malformed.
    #[default]
    Prefix,

    /// Strip every leading character found in the marker (`f=file` reads as
    /// `ile`). Only for compatibility with verifiers that behaved this way.
    LegacyCharset,
}

impl MarkerTrim {
    /// Remove `field`'s marker from `raw`, returning `None` when the field is
    /// not marked as expected.
    pub fn strip(self, raw: &str, field: Field) -> Option<&str> {
        let marker = field.marker();
        match self {
            MarkerTrim::Prefix => raw.strip_prefix(marker),
            MarkerTrim::LegacyCharset => Some(raw.trim_start_matches(|c| marker.contains(c))),
        }
    }
}

/// Renders field values in wire order.
pub fn render<'a>(value_of: impl Fn(Field) -> Cow<'a, str>) -> String {
    let mut out = String::new();
    for (i, field) in Field::ALL.iter().enumerate() {
        if i > 0 {
            out.push(SEPARATOR);
        }
        out.push_str(field.marker());
        out.push_str(&value_of(*field));
    }
    out
}

/// A plaintext split into its positional fields.
#[derive(Debug)]
pub struct Record<'a> {
    fields: Vec<&'a str>,
}

impl<'a> Record<'a> {
    /// Split a plaintext into fields, requiring exactly one per schema entry.
    pub fn parse(plaintext: &'a str) -> Result<Self, SignError> {
        let fields: Vec<&str> = plaintext.split(SEPARATOR).collect();
        if fields.len() != Field::ALL.len() {
            return Err(SignError::MalformedPlaintext("unexpected field count"));
        }
        Ok(Self { fields })
    }

    /// The raw field text, marker included.
    pub fn raw(&self, field: Field) -> &'a str {
        self.fields.get(field.position()).copied().unwrap_or_default()
    }

    /// The field value with its marker removed per `trim`.
    pub fn value(&self, field: Field, trim: MarkerTrim) -> Option<&'a str> {
        trim.strip(self.raw(field), field)
    }
}
