//! Runtime configuration: credentials for the default provider and the
//! environment that gates real delivery.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const ENV_LOGIN: &str = "SMSRU_LOGIN";
pub const ENV_PASSWORD: &str = "SMSRU_PASSWORD";
pub const ENV_SIGN: &str = "SMSRU_SIGN";
pub const ENV_ENDPOINT: &str = "SMSRU_ENDPOINT";
pub const ENV_TIMEOUT_SECS: &str = "SMSRU_TIMEOUT_SECS";
pub const ENV_TEST: &str = "SMSRU_TEST";
pub const ENV_APP_ENV: &str = "APP_ENV";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A messenger was built without a delivery provider.
    #[error("no SMS provider configured")]
    MissingProvider,

    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid value {value:?} for {name}")]
    InvalidVar { name: &'static str, value: String },

    #[error("unknown environment {0:?}")]
    InvalidEnvironment(String),

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Deployment environment. Only [`Environment::Production`] talks to a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Environment {
    Production,
    Staging,
    #[default]
    Development,
    Testing,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Self::Production
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Staging => "staging",
            Self::Development => "development",
            Self::Testing => "testing",
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "staging" | "stage" => Ok(Self::Staging),
            "development" | "dev" | "local" => Ok(Self::Development),
            "testing" | "test" => Ok(Self::Testing),
            _ => Err(ConfigError::InvalidEnvironment(value.to_owned())),
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Environment> for String {
    fn from(value: Environment) -> Self {
        value.as_str().to_owned()
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings for the default SMS.RU provider.
///
/// `login`, `password` and `sign` are the three values the
/// [`quick`](crate::quick) factory needs; the rest have defaults.
#[derive(Clone, Deserialize)]
pub struct SmsConfig {
    pub login: String,
    pub password: String,
    /// Sender signature (`from`); the account default is used when absent.
    #[serde(default)]
    pub sign: Option<String>,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Ask SMS.RU to accept requests without delivering them.
    #[serde(default)]
    pub test_mode: bool,
}

impl SmsConfig {
    /// Credentials only, development environment.
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
            sign: None,
            environment: Environment::default(),
            endpoint: None,
            timeout_secs: None,
            test_mode: false,
        }
    }

    pub fn with_sign(mut self, sign: impl Into<String>) -> Self {
        self.sign = Some(sign.into());
        self
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &'static str| lookup(name).filter(|value| !value.trim().is_empty());
        let login = get(ENV_LOGIN).ok_or(ConfigError::MissingVar(ENV_LOGIN))?;
        // Passwords keep their whitespace; only an empty value counts as missing.
        let password = lookup(ENV_PASSWORD)
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::MissingVar(ENV_PASSWORD))?;

        let environment = match get(ENV_APP_ENV) {
            Some(value) => value.parse()?,
            None => Environment::default(),
        };
        let timeout_secs = match get(ENV_TIMEOUT_SECS) {
            Some(value) => Some(value.trim().parse::<u64>().map_err(|_| {
                ConfigError::InvalidVar {
                    name: ENV_TIMEOUT_SECS,
                    value,
                }
            })?),
            None => None,
        };
        let test_mode = match get(ENV_TEST) {
            Some(value) => parse_flag(ENV_TEST, value)?,
            None => false,
        };

        Ok(Self {
            login,
            password,
            sign: get(ENV_SIGN),
            environment,
            endpoint: get(ENV_ENDPOINT),
            timeout_secs,
            test_mode,
        })
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }
}

impl fmt::Debug for SmsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmsConfig")
            .field("login", &self.login)
            .field("password", &"***")
            .field("sign", &self.sign)
            .field("environment", &self.environment)
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .field("test_mode", &self.test_mode)
            .finish()
    }
}

fn parse_flag(name: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidVar { name, value }),
    }
}
