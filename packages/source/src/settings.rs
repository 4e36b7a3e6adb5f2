//! Pipeline configuration.
//!
//! Settings come from built-in defaults, an optional TOML file, and
//! environment variables, in increasing order of precedence. The API
//! credential is never compiled in; it must arrive through the file or
//! `EGEN_API_KEY`.

use std::fmt;
use std::num::NonZeroU32;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

/// Public data portal endpoint for real-time emergency-room bed data.
pub const DEFAULT_BASE_URL: &str =
    "http://apis.data.go.kr/B552657/ErmctInfoInqireService/getEmrrmRltmUsefulSckbdInfoInqire";

/// Credential environment variable.
pub const ENV_SERVICE_KEY: &str = "EGEN_API_KEY";
pub const ENV_BASE_URL: &str = "ER_BASE_URL";
pub const ENV_ROW_LIMIT: &str = "ER_ROW_LIMIT";
pub const ENV_TIMEOUT_SECS: &str = "ER_TIMEOUT_SECS";
pub const ENV_CACHE_TTL_SECS: &str = "ER_CACHE_TTL_SECS";
pub const ENV_DEBUG_ECHO: &str = "ER_DEBUG_ECHO";
pub const ENV_MAX_RETRIES: &str = "ER_MAX_RETRIES";

/// Errors raised while assembling [`SourceSettings`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No credential was configured.
    #[error("{ENV_SERVICE_KEY} is not set; register the API key before fetching")]
    MissingCredential,

    /// A setting had an unusable value.
    #[error("Invalid value for {key}: {message}")]
    Invalid {
        /// Setting or environment variable name.
        key: String,
        /// Description of what went wrong.
        message: String,
    },

    /// The settings file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file is not valid TOML for [`SourceSettings`].
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// API credential. Redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ServiceKey(String);

impl ServiceKey {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ServiceKey(***)")
    }
}

/// Configuration surface of the refresh pipeline.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// Endpoint queried by the fetcher.
    pub base_url: String,
    /// API credential.
    pub service_key: Option<ServiceKey>,
    /// Rows requested per refresh.
    pub row_limit: u32,
    /// Upper bound on a single fetch, in seconds.
    pub timeout_secs: u64,
    /// How long a snapshot is reused. `0` disables caching.
    pub cache_ttl_secs: u64,
    /// Log raw response excerpts and per-refresh summaries.
    pub debug_echo: bool,
    /// Retries for transient fetch failures. `0` disables retrying.
    pub max_retries: u32,
    /// First retry delay in milliseconds; doubles on each attempt.
    pub retry_base_delay_ms: u64,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            service_key: None,
            row_limit: 999,
            timeout_secs: 15,
            cache_ttl_secs: 60,
            debug_echo: false,
            max_retries: 0,
            retry_base_delay_ms: 1_000,
        }
    }
}

impl SourceSettings {
    /// Loads settings from an optional TOML file, then applies process
    /// environment overrides and validates the result.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, an
    /// environment value is malformed, or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = match path {
            Some(path) => {
                log::info!("Loading settings from {}", path.display());
                Self::from_toml_str(&std::fs::read_to_string(path)?)?
            }
            None => Self::default(),
        };
        settings.apply_env(|key| std::env::var(key).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parses settings from a TOML document. Missing keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if the document is malformed.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::de::from_str(toml_str)?)
    }

    /// Overrides fields from environment variables resolved by `lookup`.
    /// Blank values are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a numeric or boolean variable
    /// cannot be parsed.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(ENV_SERVICE_KEY) {
            self.service_key = Some(ServiceKey::new(key.trim()));
        }
        if let Some(url) = get(ENV_BASE_URL) {
            self.base_url = url.trim().to_string();
        }
        if let Some(v) = get(ENV_ROW_LIMIT) {
            self.row_limit = parse_env(ENV_ROW_LIMIT, &v)?;
        }
        if let Some(v) = get(ENV_TIMEOUT_SECS) {
            self.timeout_secs = parse_env(ENV_TIMEOUT_SECS, &v)?;
        }
        if let Some(v) = get(ENV_CACHE_TTL_SECS) {
            self.cache_ttl_secs = parse_env(ENV_CACHE_TTL_SECS, &v)?;
        }
        if let Some(v) = get(ENV_DEBUG_ECHO) {
            self.debug_echo = parse_bool(ENV_DEBUG_ECHO, &v)?;
        }
        if let Some(v) = get(ENV_MAX_RETRIES) {
            self.max_retries = parse_env(ENV_MAX_RETRIES, &v)?;
        }
        Ok(())
    }

    /// Checks that the settings can drive a fetch.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredential`] if no non-blank key is
    /// set, or [`ConfigError::Invalid`] for a zero row limit or timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.service_key {
            Some(key) if !key.expose().trim().is_empty() => {}
            _ => return Err(ConfigError::MissingCredential),
        }
        if self.row_limit == 0 {
            return Err(ConfigError::Invalid {
                key: "row_limit".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "timeout_secs".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// The configured row limit, falling back to 1 if it was zeroed.
    #[must_use]
    pub fn row_limit(&self) -> NonZeroU32 {
        NonZeroU32::new(self.row_limit).unwrap_or(NonZeroU32::MIN)
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    #[must_use]
    pub const fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}

fn parse_env<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key: key.to_string(),
        message: format!("{value:?}: {e}"),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key: key.to_string(),
            message: format!("{value:?} is not a boolean"),
        }),
    }
}
