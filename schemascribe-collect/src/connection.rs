//! Connection URL resolution from flags and environment variables.
//!
//! A full `--database-url` / `DATABASE_URL` wins. Otherwise the URL is
//! assembled from the individual `DB_*` settings.

use clap::Args;
use schemascribe_core::{
    ConnectionConfig, Result, error::ScribeError, security::Credentials,
};

/// Connection settings accepted by every collector command.
#[derive(Args, Clone, Default)]
pub struct ConnectionArgs {
    /// Database connection URL
    #[arg(
        long,
        env = "DATABASE_URL",
        hide_env_values = true,
        help = "Database connection string (credentials will be sanitized in logs)"
    )]
    pub database_url: Option<String>,

    /// Database host
    #[arg(long = "host", env = "DB_HOST", help = "Database host (default: localhost)")]
    pub host: Option<String>,

    /// Database port
    #[arg(long = "port", env = "DB_PORT", help = "Database port (default: 3306)")]
    pub port: Option<u16>,

    /// Database user
    #[arg(long = "user", env = "DB_USER", help = "Database user")]
    pub user: Option<String>,

    /// Database password
    #[arg(
        long = "password",
        env = "DB_PASSWORD",
        hide_env_values = true,
        help = "Database password (prefer the DB_PASSWORD environment variable)"
    )]
    pub password: Option<String>,

    /// Database to document
    #[arg(long = "database", env = "DB_DATABASE", help = "Database to document")]
    pub database: Option<String>,
}

impl std::fmt::Debug for ConnectionArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionArgs")
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "****"))
            .field("database", &self.database)
            .finish()
    }
}

impl ConnectionArgs {
    /// Resolves the connection URL.
    ///
    /// # Errors
    /// Returns a configuration error when no URL is given and no database
    /// name is available to assemble one.
    pub fn resolve_url(&self) -> Result<String> {
        if let Some(url) = self.database_url.as_deref().filter(|u| !u.trim().is_empty()) {
            return Ok(url.trim().to_string());
        }

        let database = self
            .database
            .as_deref()
            .filter(|db| !db.is_empty())
            .ok_or_else(|| {
                ScribeError::configuration(
                    "No connection configured: set DATABASE_URL or DB_DATABASE (with DB_HOST, DB_USER, DB_PASSWORD)",
                )
            })?;

        let mut config = ConnectionConfig::new(
            self.host
                .clone()
                .filter(|h| !h.is_empty())
                .unwrap_or_else(|| "localhost".to_string()),
        )
        .with_database(database.to_string());
        if let Some(port) = self.port {
            config = config.with_port(port);
        }

        let credentials = Credentials::new(
            self.user.clone().unwrap_or_default(),
            self.password.clone(),
        );
        config.to_mysql_url(&credentials)
    }
}
