//! CLI command implementations for Sigil.

pub mod token;
