//! Client configuration.
//!
//! These types are designed to be deserialized from TOML configuration files.
//! Credentials are never stored in the file itself; the file names the
//! environment variable that holds the access token.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::endpoints::V20Endpoints;
use crate::error::{BrokerError, BrokerResult};

/// Trading environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Environment {
    /// Demo account, simulated fills
    #[default]
    Practice,
    /// Real money account
    Live,
}

impl FromStr for Environment {
    type Err = BrokerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "practice" | "demo" => Ok(Environment::Practice),
            "live" | "real" => Ok(Environment::Live),
            other => Err(BrokerError::Configuration(format!(
                "Unknown environment '{}', expected practice or live",
                other
            ))),
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = BrokerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Environment> for String {
    fn from(env: Environment) -> Self {
        env.to_string()
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Practice => write!(f, "practice"),
            Environment::Live => write!(f, "live"),
        }
    }
}

/// Top-level client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Trading environment
    #[serde(default)]
    pub environment: Environment,
    /// Account used when a call does not name one
    #[serde(default)]
    pub default_account_id: String,
    /// REST API configuration
    #[serde(default)]
    pub rest: RestConfig,
    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,
}

impl ClientConfig {
    /// Practice configuration for the given account.
    pub fn practice(account_id: impl Into<String>) -> Self {
        Self {
            environment: Environment::Practice,
            default_account_id: account_id.into(),
            ..Default::default()
        }
    }

    /// Live configuration for the given account.
    pub fn live(account_id: impl Into<String>) -> Self {
        Self {
            environment: Environment::Live,
            default_account_id: account_id.into(),
            ..Default::default()
        }
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> BrokerResult<Self> {
        toml::from_str(content)
            .map_err(|e| BrokerError::Configuration(format!("Invalid config: {}", e)))
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> BrokerResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            BrokerError::Configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Accounts base URL: the configured override, else the environment default.
    pub fn base_url(&self) -> String {
        if self.rest.base_url.is_empty() {
            V20Endpoints::for_environment(self.environment).rest_url
        } else {
            self.rest.base_url.trim_end_matches('/').to_string()
        }
    }
}

/// REST API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestConfig {
    /// Base URL override; empty means derive from the environment
    #[serde(default)]
    pub base_url: String,
    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl RestConfig {
    /// Returns the request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Environment variable name for the access token
    #[serde(default = "default_access_token_env")]
    pub access_token_env: String,
}

fn default_access_token_env() -> String {
    "OANDA_ACCESS_TOKEN".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_env: default_access_token_env(),
        }
    }
}

impl AuthConfig {
    /// Create an auth config reading the token from `env`.
    pub fn new(access_token_env: impl Into<String>) -> Self {
        Self {
            access_token_env: access_token_env.into(),
        }
    }

    /// Load the access token from the environment.
    pub fn load_access_token(&self) -> Option<String> {
        std::env::var(&self.access_token_env)
            .ok()
            .filter(|token| !token.is_empty())
    }

    /// Returns true if a token is available in the environment.
    pub fn has_credentials(&self) -> bool {
        self.load_access_token().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parsing() {
        assert_eq!("practice".parse::<Environment>().unwrap(), Environment::Practice);
        assert_eq!("DEMO".parse::<Environment>().unwrap(), Environment::Practice);
        assert_eq!("REAL".parse::<Environment>().unwrap(), Environment::Live);
        assert_eq!("Live".parse::<Environment>().unwrap(), Environment::Live);
        assert!(matches!(
            "paper".parse::<Environment>(),
            Err(BrokerError::Configuration(_))
        ));
    }

    #[test]
    fn test_rest_config_defaults() {
        let config = RestConfig::default();
        assert_eq!(config.timeout_ms, 10_000);
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert!(config.base_url.is_empty());
    }

    #[test]
    fn test_base_url_resolution() {
        let config = ClientConfig::live("001");
        assert_eq!(config.base_url(), "https://api-fxtrade.oanda.com/v3/accounts");

        let mut config = ClientConfig::practice("001");
        config.rest.base_url = "http://localhost:8080/v3/accounts/".to_string();
        assert_eq!(config.base_url(), "http://localhost:8080/v3/accounts");
    }

    #[test]
    fn test_client_config_deserialization() {
        let toml_str = r#"
            environment = "REAL"
            default_account_id = "001-004-1234567-001"

            [rest]
            timeout_ms = 5000

            [auth]
            access_token_env = "MY_V20_TOKEN"
        "#;

        let config = ClientConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.environment, Environment::Live);
        assert_eq!(config.default_account_id, "001-004-1234567-001");
        assert_eq!(config.rest.timeout_ms, 5000);
        assert_eq!(config.auth.access_token_env, "MY_V20_TOKEN");
    }

    #[test]
    fn test_client_config_minimal() {
        let config = ClientConfig::from_toml_str("default_account_id = \"abc\"").unwrap();
        assert_eq!(config.environment, Environment::Practice);
        assert_eq!(config.auth.access_token_env, "OANDA_ACCESS_TOKEN");
        assert_eq!(config.rest.timeout_ms, 10_000);
    }

    #[test]
    fn test_client_config_bad_environment() {
        let result = ClientConfig::from_toml_str("environment = \"sandbox\"");
        assert!(matches!(result, Err(BrokerError::Configuration(_))));
    }

    #[test]
    fn test_missing_token() {
        let auth = AuthConfig::new("V20_CLIENT_TEST_TOKEN_THAT_IS_NEVER_SET");
        assert!(auth.load_access_token().is_none());
        assert!(!auth.has_credentials());
    }
}
