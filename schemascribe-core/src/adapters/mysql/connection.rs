//! MySQL connection URL validation and pool setup.
//!
//! Sessions are opened read-only with a server-side execution limit, and the
//! pool is created lazily so a bad URL fails here while an unreachable
//! server fails on the first query.

use super::MySqlSource;
use crate::Result;
use crate::adapters::ConnectionConfig;
use crate::adapters::config::DEFAULT_MYSQL_PORT;
use crate::error::ScribeError;
use percent_encoding::percent_decode_str;
use sqlx::MySqlPool;
use std::time::Duration;
use url::Url;

/// Longest database name MySQL accepts.
const MAX_DATABASE_NAME_LEN: usize = 64;

impl MySqlSource {
    /// Creates a new MySQL source for the database named in the URL.
    ///
    /// # Errors
    /// Returns error if:
    /// - The connection string is invalid or names no database
    /// - The pool cannot be configured
    pub async fn new(connection_string: &str) -> Result<Self> {
        let config = parse_mysql_connection_config(connection_string)?;
        Self::with_config(connection_string, config).await
    }

    /// Creates a new MySQL source with a custom configuration.
    ///
    /// The database name is always taken from the configuration.
    pub async fn with_config(connection_string: &str, config: ConnectionConfig) -> Result<Self> {
        config.validate()?;
        let engine = engine_label_for(connection_string);
        let connection_string = normalize_scheme(connection_string);
        validate_mysql_connection_string(&connection_string)?;

        let database = config
            .database
            .clone()
            .filter(|db| !db.is_empty())
            .ok_or_else(|| {
                ScribeError::configuration("Connection string must name a database")
            })?;

        let pool = create_mysql_connection_pool(&connection_string, &config)?;
        tracing::debug!("Created MySQL pool for {}", config);

        Ok(Self {
            pool,
            config,
            database,
            engine,
        })
    }

    /// Closes the connection pool gracefully.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Heading label for the server named by the URL scheme.
fn engine_label_for(connection_string: &str) -> &'static str {
    if connection_string.starts_with("mariadb://") {
        "MariaDB"
    } else {
        "MySQL"
    }
}

/// Rewrites a `mariadb://` URL to the `mysql://` scheme the driver expects.
fn normalize_scheme(connection_string: &str) -> String {
    match connection_string.strip_prefix("mariadb://") {
        Some(rest) => format!("mysql://{}", rest),
        None => connection_string.to_string(),
    }
}

/// Parses a MySQL connection string into a [`ConnectionConfig`].
///
/// Recognised query parameters are `connect_timeout` and `query_timeout`
/// (seconds, 1-300). Anything else is left to the driver.
///
/// # Errors
/// Returns error if the URL is malformed, uses another scheme, or carries
/// out-of-range values.
pub fn parse_mysql_connection_config(connection_string: &str) -> Result<ConnectionConfig> {
    let connection_string = normalize_scheme(connection_string);
    validate_mysql_connection_string(&connection_string)?;

    let url = Url::parse(&connection_string).map_err(|e| {
        ScribeError::configuration(format!("Invalid MySQL connection string format: {}", e))
    })?;

    let mut config = ConnectionConfig::new(url.host_str().unwrap_or("localhost").to_string())
        .with_port(url.port().unwrap_or(DEFAULT_MYSQL_PORT));

    let database = decode_component(url.path().trim_start_matches('/'), "database name")?;
    if !database.is_empty() {
        if database.chars().count() > MAX_DATABASE_NAME_LEN {
            return Err(ScribeError::configuration(
                "Database name too long: maximum 64 characters",
            ));
        }
        config = config.with_database(database);
    }

    let username = decode_component(url.username(), "username")?;
    if !username.is_empty() {
        config = config.with_username(username);
    }

    for (key, value) in url.query_pairs() {
        let timeout = value
            .parse::<u64>()
            .ok()
            .filter(|secs| (1..=300).contains(secs))
            .map(Duration::from_secs);
        match key.as_ref() {
            "connect_timeout" => {
                if let Some(timeout) = timeout {
                    config.connect_timeout = timeout;
                }
            }
            "query_timeout" => {
                if let Some(timeout) = timeout {
                    config.query_timeout = timeout;
                }
            }
            _ => {}
        }
    }

    config.validate()?;
    Ok(config)
}

/// Percent-decodes a URL component; catalog lookups need the literal name.
fn decode_component(raw: &str, what: &str) -> Result<String> {
    percent_decode_str(raw)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| ScribeError::configuration(format!("Invalid UTF-8 in {}", what)))
}

/// Validates MySQL connection string format.
///
/// # Errors
/// Returns error if the string is not a `mysql://` URL with a host.
pub fn validate_mysql_connection_string(connection_string: &str) -> Result<()> {
    let url = Url::parse(connection_string).map_err(|e| {
        ScribeError::configuration(format!("Invalid MySQL connection string format: {}", e))
    })?;

    if url.scheme() != "mysql" {
        return Err(ScribeError::configuration(
            "Connection string must use mysql:// scheme",
        ));
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(ScribeError::configuration(
            "Connection string must specify a host",
        ));
    }

    Ok(())
}

fn create_mysql_connection_pool(
    connection_string: &str,
    config: &ConnectionConfig,
) -> Result<MySqlPool> {
    use sqlx::Executor;

    let max_execution_ms = config.query_timeout.as_millis();
    let read_only = config.read_only;

    sqlx::mysql::MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.connect_timeout)
        .test_before_acquire(true)
        .after_connect(move |conn, _meta| {
            Box::pin(async move {
                conn.execute(format!("SET max_execution_time = {}", max_execution_ms).as_str())
                    .await?;
                if read_only {
                    conn.execute("SET SESSION TRANSACTION READ ONLY").await?;
                }
                Ok(())
            })
        })
        .connect_lazy(connection_string)
        .map_err(|e| {
            ScribeError::collection_failed(
                format!(
                    "Failed to create MySQL connection pool to {}",
                    crate::adapters::redact_database_url(connection_string)
                ),
                e,
            )
        })
}
