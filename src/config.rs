//! Configuration for the promodesk client.
//!
//! Settings come from three layers, later ones winning:
//!
//! 1. built-in defaults
//! 2. `promodesk.toml` (or the file given with `--config`)
//! 3. the `PROMODESK_API_URL` environment variable
//!
//! The CLI applies `--api-url` on top. [`Config::validate`] then checks the
//! merged result.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::constants;

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Non-fatal warnings that should be logged but don't prevent operation.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Returns true if there are any warnings.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// promodesk.toml configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the backend, e.g. `https://api.example.com`.
    #[serde(default = "default_api_url")]
    pub url: String,
    /// Upper bound for one request, connect through body.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

/// Log output settings. `RUST_LOG` overrides `level` when set.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_api_url() -> String {
    constants::DEFAULT_API_URL.to_string()
}

fn default_request_timeout() -> u64 {
    constants::DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_connect_timeout() -> u64 {
    constants::DEFAULT_CONNECT_TIMEOUT_SECS
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Load configuration from the specified path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read (IO error)
    /// - The file contains invalid TOML syntax
    /// - Fields have invalid types
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load the explicit file if given, else `promodesk.toml` in the current
    /// directory if present, else defaults. Environment overrides are applied.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit file is missing, or if any file found
    /// cannot be parsed.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load_from(path)?,
            None if Path::new(constants::CONFIG_FILE).exists() => {
                Self::load_from(constants::CONFIG_FILE)?
            },
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(constants::API_URL_ENV)
            && !url.trim().is_empty()
        {
            self.api.url = url.trim().to_string();
        }
    }

    /// Validate configuration with comprehensive checks.
    ///
    /// Returns a `ValidationResult` containing any non-fatal warnings.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails with one or more errors:
    /// - API URL empty, unparsable, or not http(s)
    /// - Zero timeouts
    /// - Unknown log level
    pub fn validate(&self) -> Result<ValidationResult> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        // 1. API URL
        if self.api.url.trim().is_empty() {
            errors.push(format!(
                "api.url cannot be empty\n  \
                 Set it in {} or via {}",
                constants::CONFIG_FILE,
                constants::API_URL_ENV
            ));
        } else {
            match url::Url::parse(&self.api.url) {
                Ok(parsed) => {
                    if !matches!(parsed.scheme(), "http" | "https") {
                        errors.push(format!(
                            "api.url must use http or https (got: '{}')",
                            parsed.scheme()
                        ));
                    } else if parsed.scheme() == "http"
                        && !matches!(parsed.host_str(), Some("localhost" | "127.0.0.1" | "[::1]"))
                    {
                        warnings.push(format!(
                            "api.url {} is plain http\n  \
                             Bearer tokens will be sent unencrypted; use https outside local development",
                            self.api.url
                        ));
                    }
                    if parsed.query().is_some() || parsed.fragment().is_some() {
                        errors.push(format!(
                            "api.url must not contain a query or fragment (got: '{}')",
                            self.api.url
                        ));
                    }
                },
                Err(e) => errors.push(format!("api.url is not a valid URL ('{}'): {e}", self.api.url)),
            }
        }

        // 2. Timeouts
        if self.api.request_timeout_secs == 0 {
            errors.push(
                "api.request_timeout_secs cannot be 0\n  \
                 Requests without a bound can hang forever; default: 30"
                    .to_string(),
            );
        } else if self.api.request_timeout_secs > constants::MAX_RECOMMENDED_TIMEOUT_SECS {
            warnings.push(format!(
                "api.request_timeout_secs {} is very high (> {})\n  \
                 A stuck backend will block the command for that long",
                self.api.request_timeout_secs,
                constants::MAX_RECOMMENDED_TIMEOUT_SECS
            ));
        }

        if self.api.connect_timeout_secs == 0 {
            errors.push("api.connect_timeout_secs cannot be 0 (default: 10)".to_string());
        } else if self.api.connect_timeout_secs > self.api.request_timeout_secs {
            warnings.push(format!(
                "api.connect_timeout_secs ({}) exceeds api.request_timeout_secs ({}); \
                 the request timeout wins",
                self.api.connect_timeout_secs, self.api.request_timeout_secs
            ));
        }

        // 3. Logging
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "Invalid logging.level '{}'. Valid levels: {}",
                self.logging.level,
                valid_levels.join(", ")
            ));
        }

        if !errors.is_empty() {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }

        Ok(ValidationResult { warnings })
    }
}
