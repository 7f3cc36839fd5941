// Configuration types shared across all Sigil crates
pub mod config;

// Re-export commonly used config types for convenience
pub use config::{ConfigError, SecretConfig, SigilConfig};
