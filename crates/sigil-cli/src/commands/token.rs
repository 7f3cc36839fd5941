//! Token commands.
//!
//! `sigil sign` - Sign a session token.
//! `sigil sign-once` - Sign a one-shot resource token.
//! `sigil verify` - Verify a token and print its claims.
//! `sigil inspect` - Inspect a token's fields without verification.

use anyhow::Context;
use serde::Serialize;
use sigil_core::SigilConfig;
use sigil_sign::{
    MarkerTrim, SecretPair, Signer, TokenMode, VerifiedClaims, Verifier, inspect_token_unverified,
};
use std::fs;
use std::path::{Path, PathBuf};

/// Flags and configuration shared by every token command.
#[derive(Debug, Default)]
pub struct Settings {
    pub config: SigilConfig,
    pub secret_id: Option<String>,
    pub secret_key: Option<String>,
}

impl Settings {
    /// Resolve the secret pair, preferring flags over configuration.
    ///
    /// The secret key may be given as a path to a file containing it.
    fn secret(&self) -> anyhow::Result<SecretPair> {
        let id = match &self.secret_id {
            Some(id) => id.clone(),
            None => self.config.secret.resolve_id().context(
                "Secret id not provided. Either pass --secret-id or set SIGIL_SECRET_ID env var",
            )?,
        };

        let key = match &self.secret_key {
            Some(key) => {
                let path = Path::new(key);
                if path.is_file() {
                    fs::read_to_string(path)
                        .with_context(|| {
                            format!("Failed to read secret key from file: {}", path.display())
                        })?
                        .trim()
                        .to_string()
                } else {
                    key.clone()
                }
            }
            None => self
                .config
                .secret
                .resolve_key()
                .context("Failed to read secret key file")?
                .context(
                    "Secret key not provided. Either pass --secret-key or set SIGIL_SECRET_KEY env var",
                )?,
        };

        Ok(SecretPair::new(id, key)?)
    }

    fn application_id(&self, flag: Option<u64>) -> anyhow::Result<u64> {
        match flag {
            Some(app) => Ok(app),
            None => self
                .config
                .require_application_id()
                .context("Pass --app or set application_id in sigil.yaml"),
        }
    }
}

/// Parse a duration string like "24h", "7d", "90s" into seconds.
///
/// A bare number is taken as seconds.
pub fn parse_duration(s: &str) -> anyhow::Result<u64> {
    let s = s.trim().to_lowercase();

    let (digits, unit) = match s.char_indices().last() {
        Some((i, c)) if c.is_ascii_alphabetic() => (&s[..i], c),
        _ => (s.as_str(), 's'),
    };
    let value: u64 = digits
        .parse()
        .with_context(|| format!("Invalid duration: {}", s))?;

    let scale = match unit {
        's' => 1,
        'm' => 60,
        'h' => 60 * 60,
        'd' => 24 * 60 * 60,
        other => anyhow::bail!("Unknown duration unit '{}' in {}", other, s),
    };

    value
        .checked_mul(scale)
        .with_context(|| format!("Duration too large: {}", s))
}

/// Load a token from a file if `token` is a path to one.
fn read_token(token: String) -> anyhow::Result<String> {
    if Path::new(&token).is_file() {
        Ok(fs::read_to_string(&token)?.trim().to_string())
    } else {
        Ok(token)
    }
}

fn write_token(token: &str, output: Option<PathBuf>) -> anyhow::Result<()> {
    match output {
        Some(output_path) => {
            fs::write(&output_path, token)?;
            println!("✔ Token written to: {}", output_path.display());
        }
        None => println!("{}", token),
    }
    Ok(())
}

/// Sign a session token.
pub fn sign(
    settings: &Settings,
    app: Option<u64>,
    user: u64,
    expire: Option<String>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let application_id = settings.application_id(app)?;
    let expire = expire
        .or_else(|| settings.config.default_expire.clone())
        .context("Session tokens need a lifetime. Pass --expire or set default_expire")?;
    let expire_seconds = parse_duration(&expire)?;
    if expire_seconds == 0 {
        anyhow::bail!("Session token lifetime must be greater than zero");
    }

    let signer = Signer::new(settings.secret()?);
    let token = signer.sign_session(application_id, user, expire_seconds)?;

    tracing::info!(application_id, user, expire_seconds, "Signed session token");
    write_token(&token, output)
}

/// Sign a one-shot token for the resource at `url`.
pub fn sign_once(
    settings: &Settings,
    app: Option<u64>,
    user: u64,
    url: String,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let application_id = settings.application_id(app)?;

    let signer = Signer::new(settings.secret()?);
    let token = signer
        .sign_once(application_id, user, &url)
        .with_context(|| format!("Failed to sign token for {}", url))?;

    tracing::info!(application_id, user, "Signed resource token");
    write_token(&token, output)
}

#[derive(Serialize)]
struct VerifyReport<'a> {
    #[serde(flatten)]
    claims: &'a VerifiedClaims,
    mode: TokenMode,
    expired: bool,
}

/// Verify a token and print its claims.
pub fn verify(
    settings: &Settings,
    app: Option<u64>,
    token: String,
    legacy_trim: bool,
    json: bool,
) -> anyhow::Result<()> {
    let application_id = settings.application_id(app)?;
    let trim = if legacy_trim || settings.config.legacy_trim {
        MarkerTrim::LegacyCharset
    } else {
        MarkerTrim::Prefix
    };
    let verifier = Verifier::new(application_id, settings.secret()?).with_marker_trim(trim);

    let token = read_token(token)?;
    let claims = verifier
        .verify(&token)
        .context("Token verification failed")?;

    let now = u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0);
    let expired = claims.is_expired(now);

    if json {
        let report = VerifyReport {
            claims: &claims,
            mode: claims.mode(),
            expired,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        if expired {
            println!(
                "✖ Signature is valid but the token expired at {}",
                format_epoch(claims.expire_at)
            );
        } else {
            println!("✔ Signature is valid");
        }
        println!();
        println!("Token Details:");
        println!("  Application: {}", application_id);
        println!("  User: {}", claims.user_id);
        match claims.mode() {
            TokenMode::Session => {
                println!("  Type: Session token");
                println!("  Expires: {}", format_epoch(claims.expire_at));
            }
            TokenMode::Resource => {
                println!("  Type: Resource token");
                println!("  Resource: {}", claims.resource_id);
            }
        }
    }

    if expired {
        anyhow::bail!("Token expired at {}", format_epoch(claims.expire_at));
    }

    Ok(())
}

/// Inspect a token without verification.
pub fn inspect(token: String, json: bool) -> anyhow::Result<()> {
    let token = read_token(token)?;
    let info = inspect_token_unverified(&token)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("Token Information (unverified):");
    println!("  Envelope: {} bytes", info.envelope_len);
    for field in &info.fields {
        println!("  {}: {}", field.name, field.value);
    }

    Ok(())
}

fn format_epoch(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|s| chrono::DateTime::from_timestamp(s, 0))
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| secs.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn settings() -> Settings {
        Settings {
            config: SigilConfig::default(),
            secret_id: Some("sid1".to_string()),
            secret_key: Some("key1".to_string()),
        }
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("24h").unwrap(), 86_400);
        assert_eq!(parse_duration("7d").unwrap(), 604_800);
        assert_eq!(parse_duration("30m").unwrap(), 1_800);
        assert_eq!(parse_duration("60s").unwrap(), 60);
        assert_eq!(parse_duration("90").unwrap(), 90);
        assert!(parse_duration("5w").is_err());
        assert!(parse_duration("h").is_err());
    }

    #[test]
    fn test_sign_and_verify_session_token() {
        let dir = tempdir().unwrap();
        let token_path = dir.path().join("session.token");

        sign(
            &settings(),
            Some(100),
            42,
            Some("1h".to_string()),
            Some(token_path.clone()),
        )
        .unwrap();

        assert!(token_path.exists());
        verify(
            &settings(),
            Some(100),
            token_path.to_string_lossy().to_string(),
            false,
            false,
        )
        .unwrap();
    }

    #[test]
    fn test_sign_once_and_verify_json() {
        let dir = tempdir().unwrap();
        let token_path = dir.path().join("resource.token");

        sign_once(
            &settings(),
            Some(100),
            42,
            "http://cdn.example.com/100/42/file123".to_string(),
            Some(token_path.clone()),
        )
        .unwrap();

        let token = fs::read_to_string(&token_path).unwrap();
        verify(&settings(), Some(100), token, false, true).unwrap();
    }

    #[test]
    fn test_verify_rejects_other_application() {
        let dir = tempdir().unwrap();
        let token_path = dir.path().join("session.token");

        sign(
            &settings(),
            Some(100),
            42,
            Some("1h".to_string()),
            Some(token_path.clone()),
        )
        .unwrap();

        let token = fs::read_to_string(&token_path).unwrap();
        assert!(verify(&settings(), Some(101), token, false, false).is_err());
    }

    #[test]
    fn test_verify_reports_expired_token() {
        use sigil_sign::{FixedClock, FixedNonce};

        // Issued at 2001-09-09, expired an hour later.
        let secret = SecretPair::new("sid1", "key1").unwrap();
        let signer = Signer::with_sources(secret, FixedClock(1_000_000_000), FixedNonce(7));
        let token = signer.sign_session(100, 42, 3_600).unwrap();

        let err = verify(&settings(), Some(100), token.clone(), false, false).unwrap_err();
        assert!(err.to_string().contains("expired"));
        assert!(verify(&settings(), Some(100), token, false, true).is_err());
    }

    #[test]
    fn test_secret_key_from_file() {
        let dir = tempdir().unwrap();
        let key_path = dir.path().join("secret.key");
        fs::write(&key_path, "key1\n").unwrap();
        let token_path = dir.path().join("session.token");

        let from_file = Settings {
            secret_key: Some(key_path.to_string_lossy().to_string()),
            ..settings()
        };
        sign(
            &from_file,
            Some(100),
            42,
            Some("10m".to_string()),
            Some(token_path.clone()),
        )
        .unwrap();

        // Same key given inline must verify.
        let token = fs::read_to_string(&token_path).unwrap();
        verify(&settings(), Some(100), token, false, false).unwrap();
    }

    #[test]
    fn test_application_and_expiry_from_config() {
        let dir = tempdir().unwrap();
        let token_path = dir.path().join("session.token");

        let configured = Settings {
            config: SigilConfig::from_yaml("application_id: 7\ndefault_expire: 5m\n").unwrap(),
            ..settings()
        };
        sign(&configured, None, 1, None, Some(token_path.clone())).unwrap();

        let token = fs::read_to_string(&token_path).unwrap();
        verify(&configured, None, token, false, true).unwrap();
    }

    #[test]
    fn test_sign_requires_lifetime() {
        assert!(sign(&settings(), Some(100), 42, None, None).is_err());
        assert!(sign(&settings(), Some(100), 42, Some("0s".to_string()), None).is_err());
    }

    #[test]
    fn test_inspect_token() {
        let dir = tempdir().unwrap();
        let token_path = dir.path().join("resource.token");

        sign_once(
            &settings(),
            Some(100),
            42,
            "http://cdn.example.com/100/42/file123".to_string(),
            Some(token_path.clone()),
        )
        .unwrap();

        inspect(token_path.to_string_lossy().to_string(), false).unwrap();
        inspect(token_path.to_string_lossy().to_string(), true).unwrap();
        assert!(inspect("AAAA".to_string(), false).is_err());
    }
}
