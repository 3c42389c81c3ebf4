use std::path::PathBuf;

use thiserror::Error;

/// Secrets that only exist to get a dev box running.
const PLACEHOLDER_SECRETS: &[&str] = &["default_secret", "change-me", "dev-secret-change-me"];

const DEFAULT_SECRET: &str = "default_secret";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn default_log_filter(&self) -> &'static str {
        match self {
            Environment::Development => {
                "agenda=debug,agenda_api=debug,agenda_db=debug,tower_http=debug"
            }
            Environment::Production => "agenda=info,agenda_api=info,agenda_db=info,tower_http=info",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("AGENDA_PORT must be a port number, got '{0}'")]
    InvalidPort(String),

    #[error("AGENDA_ENV must be 'production' or 'development', got '{0}'")]
    InvalidEnvironment(String),

    #[error("AGENDA_JWT_SECRET is unset or still a placeholder; refusing to start in production")]
    InsecureSecret,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("AGENDA_ENV") {
            None => Environment::Development,
            Some(raw) => match raw.to_ascii_lowercase().as_str() {
                "production" => Environment::Production,
                "development" => Environment::Development,
                _ => return Err(ConfigError::InvalidEnvironment(raw)),
            },
        };

        let port = match lookup("AGENDA_PORT") {
            None => 3000,
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidPort(raw))?,
        };

        let jwt_secret = lookup("AGENDA_JWT_SECRET")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SECRET.to_string());

        let config = Self {
            host: lookup("AGENDA_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            db_path: lookup("AGENDA_DB_PATH")
                .unwrap_or_else(|| "agenda.db".into())
                .into(),
            jwt_secret,
            environment,
        };

        if config.environment == Environment::Production && config.insecure_secret() {
            return Err(ConfigError::InsecureSecret);
        }
        Ok(config)
    }

    pub fn insecure_secret(&self) -> bool {
        PLACEHOLDER_SECRETS.contains(&self.jwt_secret.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_are_development() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.db_path, PathBuf::from("agenda.db"));
        assert_eq!(cfg.environment, Environment::Development);
        assert!(cfg.insecure_secret());
    }

    #[test]
    fn production_refuses_default_secret() {
        assert!(matches!(
            config(&[("AGENDA_ENV", "production")]),
            Err(ConfigError::InsecureSecret)
        ));

        let cfg = config(&[("AGENDA_ENV", "Production"), ("AGENDA_JWT_SECRET", "k7#pL0q")]).unwrap();
        assert_eq!(cfg.environment, Environment::Production);
        assert!(!cfg.insecure_secret());
    }

    #[test]
    fn malformed_values_are_errors() {
        assert!(matches!(
            config(&[("AGENDA_PORT", "eighty")]),
            Err(ConfigError::InvalidPort(_))
        ));
        assert!(matches!(
            config(&[("AGENDA_ENV", "staging")]),
            Err(ConfigError::InvalidEnvironment(_))
        ));
    }
}
