use std::fmt;
use std::path::PathBuf;

use crate::export::Orientation;

const REDACTED: &str = "<redacted>";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),
    #[error("JWT signing key must not be empty")]
    EmptySigningKey,
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &REDACTED)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub wkhtmltopdf_path: PathBuf,
    pub stylesheet: Option<PathBuf>,
    pub orientation: Orientation,
    pub sheet_author: Option<String>,
    pub freeze_header: bool,
}

/// Credentials for an admin account created at startup when missing.
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("username", &self.username)
            .field("password", &REDACTED)
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
    pub export: ExportConfig,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

// the database URL usually embeds a password
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &REDACTED)
            .field("database_max_connections", &self.database_max_connections)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("jwt", &self.jwt)
            .field("export", &self.export)
            .field("bootstrap_admin", &self.bootstrap_admin)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        if secret.trim().is_empty() {
            return Err(ConfigError::EmptySigningKey);
        }
        let jwt = JwtConfig {
            secret,
            issuer: lookup("JWT_ISSUER").unwrap_or_else(|| "userdir".into()),
            audience: lookup("JWT_AUDIENCE").unwrap_or_else(|| "userdir-clients".into()),
        };

        let export = ExportConfig {
            wkhtmltopdf_path: lookup("WKHTMLTOPDF_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("wkhtmltopdf")),
            stylesheet: lookup("EXPORT_STYLESHEET").map(PathBuf::from),
            orientation: parse_or(&lookup, "EXPORT_ORIENTATION", Orientation::Portrait)?,
            sheet_author: lookup("EXPORT_SHEET_AUTHOR"),
            freeze_header: parse_or(&lookup, "EXPORT_FREEZE_HEADER", false)?,
        };

        let bootstrap_admin = match (
            lookup("BOOTSTRAP_ADMIN_USERNAME"),
            lookup("BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (Some(username), Some(password)) => Some(BootstrapAdmin { username, password }),
            _ => None,
        };

        Ok(Self {
            database_url,
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&lookup, "APP_PORT", 8080)?,
            jwt,
            export,
            bootstrap_admin,
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
