//! Configuration management

use std::str::FromStr;

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default deployment environment.
pub const DEFAULT_APP_ENV: &str = "development";

pub const DEFAULT_DB_HOST: &str = "localhost";
pub const DEFAULT_DB_PORT: u16 = 3306;
pub const DEFAULT_DB_USER: &str = "root";
pub const DEFAULT_DB_PASSWORD: &str = "test";
pub const DEFAULT_DB_NAME: &str = "infraestructura_portuaria";

/// Default maximum database connections in the pool.
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub app_env: String,
    /// `json` for JSON log lines, anything else for compact text.
    pub log_format: String,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// Create missing tables at startup.
    pub auto_migrate: bool,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Empty means any origin.
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from `.env`, the environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self::from_lookup(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let url = lookup("DATABASE_URL").unwrap_or_else(|| {
            format!(
                "mysql://{}:{}@{}:{}/{}",
                lookup("DB_USER").unwrap_or_else(|| DEFAULT_DB_USER.to_string()),
                lookup("DB_PASSWORD").unwrap_or_else(|| DEFAULT_DB_PASSWORD.to_string()),
                lookup("DB_HOST").unwrap_or_else(|| DEFAULT_DB_HOST.to_string()),
                parsed(&lookup, "DB_PORT").unwrap_or(DEFAULT_DB_PORT),
                lookup("DB_NAME").unwrap_or_else(|| DEFAULT_DB_NAME.to_string()),
            )
        });

        Self {
            server: ServerConfig {
                host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parsed(&lookup, "PORT").unwrap_or(DEFAULT_PORT),
                app_env: lookup("APP_ENV").unwrap_or_else(|| DEFAULT_APP_ENV.to_string()),
                log_format: lookup("LOG_FORMAT").unwrap_or_else(|| "compact".to_string()),
            },
            database: DatabaseConfig {
                url,
                max_connections: parsed(&lookup, "DB_MAX_CONNECTIONS").unwrap_or(DEFAULT_DB_MAX_CONNECTIONS),
                auto_migrate: parsed(&lookup, "DB_AUTO_MIGRATE").unwrap_or(false),
            },
            cors: CorsConfig {
                allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_default()
                    .split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect(),
            },
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }

        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.database.max_connections == 0 {
            anyhow::bail!("Database max_connections must be greater than 0");
        }

        Ok(())
    }

    /// Non-fatal findings, logged once the subscriber is installed.
    #[must_use]
    pub fn warnings(&self) -> Vec<&'static str> {
        let mut warnings = Vec::new();
        if self.cors.allowed_origins.is_empty() {
            warnings.push("No CORS origins configured - all origins will be allowed");
        }
        warnings
    }

    #[must_use]
    pub fn is_production(&self) -> bool {
        self.server.app_env.eq_ignore_ascii_case("production")
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|value| value.trim().parse().ok())
}
