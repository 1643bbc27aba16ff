use std::env;
use std::path::PathBuf;

use thiserror::Error;

/// Authentication mode for the application.
#[derive(Debug, Clone)]
pub enum AuthMode {
    /// No authentication required - all requests act as the local user.
    Unauthenticated,
    /// Password authentication with an Argon2 hash.
    Password(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "POCKETLEDGER_PASSWORD_HASH is not set. Set a valid Argon2 hash or '{UNAUTHENTICATED_MAGIC}' to explicitly allow unauthenticated access."
    )]
    MissingPasswordHash,

    #[error(
        "Invalid POCKETLEDGER_PASSWORD_HASH: must start with '$argon2id$' or be set to '{UNAUTHENTICATED_MAGIC}'. Got: {0}..."
    )]
    InvalidPasswordHash(String),

    #[error("Invalid POCKETLEDGER_PORT: {0}")]
    InvalidPort(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    /// Currency code used when formatting amounts for display.
    pub currency: String,
    pub auth_mode: AuthMode,
}

/// The magic value that disables authentication.
pub const UNAUTHENTICATED_MAGIC: &str = "DANGEROUSLY_ALLOW_UNAUTHENTICATED_USERS";

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let auth_mode = match env::var("POCKETLEDGER_PASSWORD_HASH") {
            Ok(hash) => parse_auth_mode(&hash)?,
            Err(_) => return Err(ConfigError::MissingPasswordHash),
        };

        let port = match env::var("POCKETLEDGER_PORT") {
            Ok(p) => p.parse().map_err(|_| ConfigError::InvalidPort(p))?,
            Err(_) => 7070,
        };

        Ok(Self {
            host: env::var("POCKETLEDGER_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port,
            database_path: env::var("POCKETLEDGER_DATABASE_URL")
                .map(|v| {
                    PathBuf::from(
                        v.strip_prefix("sqlite://")
                            .or_else(|| v.strip_prefix("sqlite:"))
                            .unwrap_or(&v),
                    )
                })
                .unwrap_or_else(|_| PathBuf::from("data/pocketledger.db")),
            currency: env::var("POCKETLEDGER_CURRENCY").unwrap_or_else(|_| "THB".into()),
            auth_mode,
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_auth_mode(hash: &str) -> Result<AuthMode, ConfigError> {
    if hash == UNAUTHENTICATED_MAGIC {
        Ok(AuthMode::Unauthenticated)
    } else if hash.starts_with("$argon2id$") {
        Ok(AuthMode::Password(hash.to_string()))
    } else if hash.is_empty() {
        Err(ConfigError::MissingPasswordHash)
    } else {
        let prefix: String = hash.chars().take(20).collect();
        Err(ConfigError::InvalidPasswordHash(prefix))
    }
}
