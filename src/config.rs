use std::env;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deployment {
    Local,
    Dev,
    Stage,
    Prod,
}

impl Deployment {
    #[must_use]
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Self::Dev,
            "stage" | "staging" => Self::Stage,
            "prod" | "production" => Self::Prod,
            _ => Self::Local,
        }
    }

    /// Whether logs should be emitted as JSON lines instead of pretty text.
    #[must_use]
    pub fn structured_logs(&self) -> bool {
        matches!(self, Self::Stage | Self::Prod)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // Lookup service
    pub lookup_base_url: String,
    pub lookup_timeout_seconds: u64,

    // Caching
    pub lookup_cache_ttl_seconds: u64,
    pub lookup_cache_max_entries: u64,

    // Application metadata
    pub deployment: Deployment,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lookup_base_url: "http://127.0.0.1:5000".to_string(),
            lookup_timeout_seconds: 10,
            lookup_cache_ttl_seconds: 0,
            lookup_cache_max_entries: 256,
            deployment: Deployment::Local,
        }
    }
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if a numeric variable is set but cannot be parsed,
    /// or if the result fails [`Config::validate`].
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let lookup_base_url = env::var("LOOKUP_BASE_URL")
            .unwrap_or(defaults.lookup_base_url)
            .trim_end_matches('/')
            .to_string();

        Self {
            lookup_base_url,
            lookup_timeout_seconds: parse_var(
                "LOOKUP_TIMEOUT_SECONDS",
                defaults.lookup_timeout_seconds,
            )?,
            lookup_cache_ttl_seconds: parse_var(
                "LOOKUP_CACHE_TTL_SECONDS",
                defaults.lookup_cache_ttl_seconds,
            )?,
            lookup_cache_max_entries: parse_var(
                "LOOKUP_CACHE_MAX_ENTRIES",
                defaults.lookup_cache_max_entries,
            )?,
            deployment: Deployment::from_str(
                &env::var("DEPLOYMENT").unwrap_or_else(|_| "local".to_string()),
            ),
        }
        .validate()
    }

    /// Reject settings that would make every lookup fail.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for an empty base URL or a zero timeout.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.lookup_base_url.is_empty() {
            return Err(ConfigError::Invalid {
                key: "LOOKUP_BASE_URL",
                value: self.lookup_base_url,
            });
        }
        if self.lookup_timeout_seconds == 0 {
            return Err(ConfigError::Invalid {
                key: "LOOKUP_TIMEOUT_SECONDS",
                value: self.lookup_timeout_seconds.to_string(),
            });
        }
        Ok(self)
    }

    #[must_use]
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_seconds)
    }

    /// `None` when caching is disabled (TTL of zero).
    #[must_use]
    pub fn lookup_cache_ttl(&self) -> Option<Duration> {
        (self.lookup_cache_ttl_seconds > 0)
            .then(|| Duration::from_secs(self.lookup_cache_ttl_seconds))
    }
}

fn parse_var<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}
