use anyhow::Context;
use clap::{Parser, Subcommand};
use sigil_core::SigilConfig;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::token::Settings;

/// Configuration file looked up in the working directory when --config is not given.
const DEFAULT_CONFIG_FILE: &str = "sigil.yaml";

#[derive(Parser, Debug)]
#[command(name = "sigil", version, about = "Issue and verify signed access tokens")]
struct Cli {
    /// Path to sigil.yaml
    #[arg(long, global = true, env = "SIGIL_CONFIG")]
    config: Option<PathBuf>,

    /// Secret id embedded in issued tokens
    #[arg(long = "secret-id", global = true, env = "SIGIL_SECRET_ID")]
    secret_id: Option<String>,

    /// Secret key, or a path to a file containing it
    #[arg(
        long = "secret-key",
        global = true,
        env = "SIGIL_SECRET_KEY",
        hide_env_values = true
    )]
    secret_key: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign a time-limited session token.
    Sign {
        /// Application id (defaults to application_id from the config file)
        #[arg(long)]
        app: Option<u64>,

        /// User id the token acts for
        #[arg(long)]
        user: u64,

        /// Token lifetime, e.g. "90s", "30m", "2h", "7d"
        #[arg(long)]
        expire: Option<String>,

        /// Write the token to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Sign a permanent token bound to one resource.
    SignOnce {
        #[arg(long)]
        app: Option<u64>,

        #[arg(long)]
        user: u64,

        /// Resource URL: scheme://domain/app_id/user_id/resource_id
        #[arg(long)]
        url: String,

        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Verify a token and print its claims.
    Verify {
        /// Token string or path to a file containing it
        token: String,

        #[arg(long)]
        app: Option<u64>,

        /// Strip field markers by character set (compatibility mode)
        #[arg(long, default_value_t = false)]
        legacy_trim: bool,

        /// Print claims as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Print a token's fields without verifying it.
    Inspect {
        /// Token string or path to a file containing it
        token: String,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<SigilConfig> {
    match path {
        Some(path) => SigilConfig::load_with_context(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
            SigilConfig::load_with_context(DEFAULT_CONFIG_FILE)
                .with_context(|| format!("Failed to load config: {}", DEFAULT_CONFIG_FILE))
        }
        None => Ok(SigilConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let settings = Settings {
        config: load_config(cli.config.as_deref())?,
        secret_id: cli.secret_id,
        secret_key: cli.secret_key,
    };

    match cli.cmd {
        Command::Sign {
            app,
            user,
            expire,
            output,
        } => commands::token::sign(&settings, app, user, expire, output)?,

        Command::SignOnce {
            app,
            user,
            url,
            output,
        } => commands::token::sign_once(&settings, app, user, url, output)?,

        Command::Verify {
            token,
            app,
            legacy_trim,
            json,
        } => commands::token::verify(&settings, app, token, legacy_trim, json)?,

        Command::Inspect { token, json } => commands::token::inspect(token, json)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_sign_once() {
        let cli = Cli::try_parse_from([
            "sigil",
            "--secret-id",
            "sid1",
            "sign-once",
            "--app",
            "100",
            "--user",
            "42",
            "--url",
            "http://cdn.example.com/100/42/file123",
        ])
        .unwrap();

        assert_eq!(cli.secret_id.as_deref(), Some("sid1"));
        match cli.cmd {
            Command::SignOnce { app, user, url, .. } => {
                assert_eq!(app, Some(100));
                assert_eq!(user, 42);
                assert_eq!(url, "http://cdn.example.com/100/42/file123");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        assert!(load_config(Some(Path::new("/nonexistent/sigil.yaml"))).is_err());
    }
}
