use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid configuration for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub billing: BillingConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    /// Anon key handed to browser clients; never used server side.
    pub public_key: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub max_rows: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingConfig {
    pub secret_key: String,
    pub webhook_secret: String,
    pub publishable_key: String,
    pub api_base: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    /// Used for redirect targets when a request carries no Origin header.
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
    pub session_secret: String,
    pub session_expiry_hours: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup. `from_env` is the production caller.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        let mut config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        };
        config.apply_overrides(&lookup);
        config.apply_required(&lookup)?;
        Ok(config)
    }

    fn apply_overrides<F>(&mut self, lookup: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Database overrides
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Some(v) = lookup("DATABASE_MAX_ROWS") {
            self.database.max_rows = v.parse().unwrap_or(self.database.max_rows);
        }

        // Billing overrides
        if let Some(v) = lookup("STRIPE_API_BASE") {
            self.billing.api_base = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = lookup("STRIPE_TIMEOUT_SECS") {
            self.billing.timeout_secs = v.parse().unwrap_or(self.billing.timeout_secs);
        }

        // API overrides
        if let Some(v) = lookup("PORTAL_PORT").or_else(|| lookup("PORT")) {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Some(v) = lookup("APP_BASE_URL") {
            self.api.base_url = v.trim_end_matches('/').to_string();
        }

        // Security overrides
        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(v) = lookup("SESSION_EXPIRY_HOURS") {
            self.security.session_expiry_hours = v.parse().unwrap_or(self.security.session_expiry_hours);
        }
    }

    fn apply_required<F>(&mut self, lookup: &F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.billing.secret_key = required(lookup, "STRIPE_SECRET_KEY")?;
        self.billing.webhook_secret = required(lookup, "STRIPE_WEBHOOK_SECRET")?;
        self.billing.publishable_key = required(lookup, "STRIPE_PUBLISHABLE_KEY")?;
        self.database.public_key = required(lookup, "DATA_STORE_PUBLIC_KEY")?;
        self.security.session_secret = required(lookup, "SESSION_JWT_SECRET")?;

        let url = required(lookup, "DATABASE_URL")?;
        url::Url::parse(&url).map_err(|e| ConfigError::Invalid {
            key: "DATABASE_URL",
            reason: e.to_string(),
        })?;
        self.database.url = url;

        url::Url::parse(&self.api.base_url).map_err(|e| ConfigError::Invalid {
            key: "APP_BASE_URL",
            reason: e.to_string(),
        })?;

        Ok(())
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: String::new(),
                public_key: String::new(),
                max_connections: 10,
                connection_timeout: 30,
                max_rows: 1000,
            },
            billing: BillingConfig::unset(30),
            api: ApiConfig {
                port: 3000,
                base_url: "http://localhost:3000".to_string(),
            },
            security: SecurityConfig {
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                session_secret: String::new(),
                session_expiry_hours: 24 * 7, // 1 week
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: String::new(),
                public_key: String::new(),
                max_connections: 20,
                connection_timeout: 10,
                max_rows: 500,
            },
            billing: BillingConfig::unset(20),
            api: ApiConfig {
                port: 3000,
                base_url: "https://staging.example.com".to_string(),
            },
            security: SecurityConfig {
                cors_origins: vec!["https://staging.example.com".to_string()],
                session_secret: String::new(),
                session_expiry_hours: 24,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: String::new(),
                public_key: String::new(),
                max_connections: 50,
                connection_timeout: 5,
                max_rows: 100,
            },
            billing: BillingConfig::unset(10),
            api: ApiConfig {
                port: 3000,
                base_url: "https://app.example.com".to_string(),
            },
            security: SecurityConfig {
                cors_origins: vec!["https://app.example.com".to_string()],
                session_secret: String::new(),
                session_expiry_hours: 4,
            },
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Base for payment redirect URLs. A request origin is used only when it
    /// is listed in `security.cors_origins`; a `*` entry does not count.
    pub fn redirect_origin<'a>(&'a self, origin: Option<&'a str>) -> &'a str {
        origin
            .map(|o| o.trim_end_matches('/'))
            .filter(|o| self.security.cors_origins.iter().any(|allowed| allowed != "*" && allowed == o))
            .unwrap_or(self.api.base_url.as_str())
    }
}

impl BillingConfig {
    fn unset(timeout_secs: u64) -> Self {
        Self {
            secret_key: String::new(),
            webhook_secret: String::new(),
            publishable_key: String::new(),
            api_base: "https://api.stripe.com".to_string(),
            timeout_secs,
        }
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ConfigError::Missing(key)),
    }
}
