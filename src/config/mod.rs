use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while assembling configuration at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

/// Identity provider settings used by the token verifier
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Expected `iss` claim, e.g. `https://example.us.auth0.com/`
    pub issuer: Option<String>,
    /// Expected `aud` claim (the API identifier)
    pub audience: Option<String>,
    pub jwks_url: Option<String>,
    /// Local JWKS document; takes precedence over `jwks_url`
    pub jwks_path: Option<PathBuf>,
    pub leeway_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Allowed origins; empty means any origin
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        // Server overrides
        if let Ok(v) = env::var("DRINKS_BIND") {
            self.server.bind = v;
        }
        if let Some(v) = env::var("DRINKS_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.server.port = parse_var("DRINKS_PORT", &v)?;
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_var("DATABASE_MAX_CONNECTIONS", &v)?;
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = parse_var("DATABASE_CONNECTION_TIMEOUT", &v)?;
        }

        // Auth overrides; AUTH0_DOMAIN fills in issuer and key location first
        if let Ok(domain) = env::var("AUTH0_DOMAIN") {
            self.auth.apply_domain(&domain)?;
        }
        if let Ok(v) = env::var("AUTH_ISSUER") {
            self.auth.issuer = Some(v);
        }
        if let Ok(v) = env::var("AUTH_AUDIENCE").or_else(|_| env::var("API_AUDIENCE")) {
            self.auth.audience = Some(v);
        }
        if let Ok(v) = env::var("AUTH_JWKS_URL") {
            self.auth.jwks_url = Some(v);
        }
        if let Ok(v) = env::var("AUTH_JWKS_PATH") {
            self.auth.jwks_path = Some(PathBuf::from(v));
        }
        if let Ok(v) = env::var("AUTH_LEEWAY_SECS") {
            self.auth.leeway_secs = parse_var("AUTH_LEEWAY_SECS", &v)?;
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = split_list(&v);
        }

        Ok(self)
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                bind: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 5,
                connection_timeout: 30,
            },
            auth: AuthConfig::default(),
            security: SecurityConfig {
                cors_origins: Vec::new(),
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                bind: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 10,
            },
            auth: AuthConfig {
                leeway_secs: 30,
                ..AuthConfig::default()
            },
            security: SecurityConfig {
                cors_origins: Vec::new(),
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                bind: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 5,
            },
            auth: AuthConfig {
                leeway_secs: 30,
                ..AuthConfig::default()
            },
            security: SecurityConfig {
                cors_origins: Vec::new(),
            },
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self.environment, Environment::Production)
    }

    pub fn database_url(&self) -> Result<&str, ConfigError> {
        self.database
            .url
            .as_deref()
            .ok_or(ConfigError::Missing("DATABASE_URL"))
    }
}

impl AuthConfig {
    /// Derive issuer and JWKS location from an Auth0 tenant domain
    pub fn apply_domain(&mut self, domain: &str) -> Result<(), ConfigError> {
        let domain = domain.trim().trim_end_matches('/');
        let domain = domain
            .strip_prefix("https://")
            .unwrap_or(domain);

        let base = url::Url::parse(&format!("https://{}/", domain)).map_err(|_| {
            ConfigError::Invalid {
                name: "AUTH0_DOMAIN",
                value: domain.to_string(),
            }
        })?;
        let jwks = base
            .join(".well-known/jwks.json")
            .map_err(|_| ConfigError::Invalid {
                name: "AUTH0_DOMAIN",
                value: domain.to_string(),
            })?;

        self.issuer = Some(base.to_string());
        self.jwks_url = Some(jwks.to_string());
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_derives_issuer_and_jwks_url() {
        let mut auth = AuthConfig::default();
        auth.apply_domain("coffee.us.auth0.com").unwrap();
        assert_eq!(auth.issuer.as_deref(), Some("https://coffee.us.auth0.com/"));
        assert_eq!(
            auth.jwks_url.as_deref(),
            Some("https://coffee.us.auth0.com/.well-known/jwks.json")
        );
    }

    #[test]
    fn domain_accepts_scheme_and_trailing_slash() {
        let mut auth = AuthConfig::default();
        auth.apply_domain("https://coffee.us.auth0.com/").unwrap();
        assert_eq!(auth.issuer.as_deref(), Some("https://coffee.us.auth0.com/"));
    }

    #[test]
    fn presets_differ_in_leeway() {
        assert_eq!(AppConfig::development().auth.leeway_secs, 0);
        assert_eq!(AppConfig::production().auth.leeway_secs, 30);
        assert!(AppConfig::production().is_production());
    }

    #[test]
    fn presets_bind_all_interfaces_on_port_5000() {
        for config in [
            AppConfig::development(),
            AppConfig::staging(),
            AppConfig::production(),
        ] {
            assert_eq!(config.server.bind, "0.0.0.0");
            assert_eq!(config.server.port, 5000);
        }
    }

    #[test]
    fn missing_database_url_is_reported() {
        let config = AppConfig::development();
        assert!(matches!(
            config.database_url(),
            Err(ConfigError::Missing("DATABASE_URL"))
        ));
    }

    #[test]
    fn parses_lists_and_numbers() {
        assert_eq!(split_list("a, b,,c "), vec!["a", "b", "c"]);
        assert_eq!(parse_var::<u16>("PORT", " 8080").unwrap(), 8080);
        assert!(parse_var::<u16>("PORT", "eighty").is_err());
    }
}
