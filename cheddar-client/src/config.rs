//! Client configuration
//!
//! Values come from a TOML file and the `CHEDDAR_*` environment variables,
//! environment winning. The credentials are only checked when a request is
//! about to be made, so a partially configured client can still be built.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CheddarError, Result};

pub const DEFAULT_API_URL: &str = "https://cheddargetter.com/xml";

pub const ENV_EMAIL: &str = "CHEDDAR_EMAIL";
pub const ENV_PASSWORD: &str = "CHEDDAR_PASSWORD";
pub const ENV_PRODUCT: &str = "CHEDDAR_PRODUCT";
pub const ENV_MARKETING_COOKIE_NAME: &str = "CHEDDAR_MARKETING_COOKIE_NAME";
pub const ENV_API_URL: &str = "CHEDDAR_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "CHEDDAR_TIMEOUT_SECS";

/// Account credentials and product selection
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Account email used for HTTP basic auth
    #[serde(default)]
    pub email: Option<String>,
    /// Account password used for HTTP basic auth
    #[serde(default)]
    pub password: Option<String>,
    /// Product code every request is scoped to
    #[serde(default)]
    pub product_code: Option<String>,
    /// Marketing attribution cookie name (not used by the client itself)
    #[serde(default)]
    pub marketing_cookie_name: Option<String>,
    /// Base endpoint, without trailing slash
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Request timeout applied by the HTTP transport
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Borrowed view of the validated credentials
#[derive(Debug, Clone, Copy)]
pub struct Credentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub product_code: &'a str,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            email: None,
            password: None,
            product_code: None,
            marketing_cookie_name: None,
            api_url: default_api_url(),
            timeout_secs: None,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "********"))
            .field("product_code", &self.product_code)
            .field("marketing_cookie_name", &self.marketing_cookie_name)
            .field("api_url", &self.api_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Config {
    /// Create a config with the three required values set
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        product_code: impl Into<String>,
    ) -> Self {
        Self {
            email: Some(email.into()),
            password: Some(password.into()),
            product_code: Some(product_code.into()),
            ..Self::default()
        }
    }

    /// Override the base endpoint
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Default location of the config file (`<config dir>/cheddar/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("cheddar").join("config.toml"))
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CheddarError::Configuration(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
            .map_err(|e| CheddarError::Configuration(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        let mut config: Config = toml::from_str(content)?;
        config.api_url = config.api_url.trim_end_matches('/').to_string();
        Ok(config)
    }

    /// Config built from the process environment only
    pub fn from_env() -> Self {
        Self::default().merge_env(|key| std::env::var(key).ok())
    }

    /// Load the config file (explicit path, or the default location when it
    /// exists) and apply environment overrides on top
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(default) if default.exists() => Self::from_file(&default)?,
                _ => Self::default(),
            },
        };

        Ok(base.merge_env(|key| std::env::var(key).ok()))
    }

    /// Overlay values returned by `lookup` for the `CHEDDAR_*` variables
    pub fn merge_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(email) = non_empty(ENV_EMAIL) {
            self.email = Some(email);
        }
        if let Some(password) = non_empty(ENV_PASSWORD) {
            self.password = Some(password);
        }
        if let Some(product) = non_empty(ENV_PRODUCT) {
            self.product_code = Some(product);
        }
        if let Some(cookie) = non_empty(ENV_MARKETING_COOKIE_NAME) {
            self.marketing_cookie_name = Some(cookie);
        }
        if let Some(url) = non_empty(ENV_API_URL) {
            self.api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(timeout) = non_empty(ENV_TIMEOUT_SECS) {
            match timeout.parse() {
                Ok(secs) => self.timeout_secs = Some(secs),
                Err(_) => log::warn!("Ignoring invalid {}: {}", ENV_TIMEOUT_SECS, timeout),
            }
        }
        self
    }

    /// The required credentials, or a configuration error naming the first
    /// missing one
    pub fn credentials(&self) -> Result<Credentials<'_>> {
        fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
            match value.as_deref() {
                Some(v) if !v.is_empty() => Ok(v),
                _ => Err(CheddarError::Configuration(format!("{} not configured", name))),
            }
        }

        Ok(Credentials {
            email: required(&self.email, ENV_EMAIL)?,
            password: required(&self.password, ENV_PASSWORD)?,
            product_code: required(&self.product_code, ENV_PRODUCT)?,
        })
    }
}
