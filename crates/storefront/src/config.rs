//! Storefront configuration loaded from environment variables.
//!
//! The environment profile (`APP_ENV`) supplies defaults for every setting and
//! the region (`APP_REGION`) fixes the marketplace site and currency. Individual
//! variables override the profile.
//!
//! # Environment Variables
//!
//! ## Profile selection
//! - `APP_ENV` - development, production, testing or local (default: development)
//! - `APP_REGION` - colombia, argentina, mexico, brazil or chile (default: colombia)
//!
//! ## Overrides
//! - `API_BASE_URL` - Marketplace REST API base URL
//! - `API_TIMEOUT_MS` - Per-request timeout in milliseconds
//! - `API_AUTH_TOKEN` - Bearer token sent with API requests
//! - `ENABLE_LOGGING` - Verbose logging (`false` lowers the default filter to warn)
//! - `ENABLE_CACHE` / `CACHE_TTL_SECS` - GET response cache
//! - `ENABLE_REVIEWS` / `ENABLE_QUESTIONS` / `ENABLE_RECOMMENDATIONS` - Feature flags
//! - `USE_MOCK_DATA` - Serve from the in-memory fixtures instead of the API
//! - `MOCK_DELAY_MS` - Fixed fixture latency (per-method default when unset)
//! - `MOCK_ERROR_RATE` - Probability in `[0, 1]` of a simulated fixture failure
//! - `DEFAULT_LIMIT` - Default page size
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `SENTRY_DSN` / `SENTRY_ENVIRONMENT` - Sentry error tracking

mod profile;
mod region;

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use vitrina_core::{CurrencyCode, SiteId};

pub use profile::{Environment, EnvironmentProfile};
pub use region::{Region, RegionSettings};

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    pub environment: Environment,
    pub region: Region,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Marketplace API client settings
    pub api: ApiConfig,
    pub features: FeatureFlags,
    /// Fixture backend settings
    pub mock: MockConfig,
    /// Page size used when a request does not specify one
    pub default_limit: u32,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag (defaults to `APP_ENV`)
    pub sentry_environment: String,
}

/// Marketplace REST API configuration.
///
/// Implements `Debug` manually to redact the auth token.
#[derive(Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub auth_token: Option<SecretString>,
    /// GET response cache TTL; `None` disables the cache
    pub cache_ttl: Option<Duration>,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("cache_ttl", &self.cache_ttl)
            .finish()
    }
}

/// Optional page sections and behaviors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureFlags {
    pub logging: bool,
    pub reviews: bool,
    pub questions: bool,
    pub recommendations: bool,
    /// Answer from fixtures when a live call fails in transport
    pub fallback_to_mock: bool,
}

/// Fixture backend configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MockConfig {
    /// Serve every call from fixtures at startup
    pub enabled: bool,
    /// Fixed latency; `None` uses each method's default
    pub delay: Option<Duration>,
    /// Probability of a simulated failure per call
    pub error_rate: f64,
}

impl MockConfig {
    /// No latency and no simulated failures.
    #[must_use]
    pub const fn instant() -> Self {
        Self {
            enabled: true,
            delay: Some(Duration::ZERO),
            error_rate: 0.0,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);

        let environment: Environment = vars.parsed("APP_ENV")?.unwrap_or_default();
        let region: Region = vars.parsed("APP_REGION")?.unwrap_or_default();
        let profile = environment.profile();

        let host = vars
            .parsed("STOREFRONT_HOST")?
            .unwrap_or(IpAddr::from([127, 0, 0, 1]));
        let port = vars.parsed("STOREFRONT_PORT")?.unwrap_or(3000);

        let cache_enabled = vars.flag("ENABLE_CACHE")?.unwrap_or(profile.enable_cache);
        let cache_ttl = vars
            .millis_or_secs("CACHE_TTL_SECS", Duration::from_secs)?
            .unwrap_or(profile.cache_ttl);

        let api = ApiConfig {
            base_url: vars
                .get("API_BASE_URL")
                .unwrap_or_else(|| profile.api_base_url.to_string()),
            timeout: vars
                .millis_or_secs("API_TIMEOUT_MS", Duration::from_millis)?
                .unwrap_or(profile.api_timeout),
            auth_token: vars.get("API_AUTH_TOKEN").map(SecretString::from),
            cache_ttl: (cache_enabled && !cache_ttl.is_zero()).then_some(cache_ttl),
        };

        let features = FeatureFlags {
            logging: vars.flag("ENABLE_LOGGING")?.unwrap_or(profile.enable_logging),
            reviews: vars.flag("ENABLE_REVIEWS")?.unwrap_or(profile.enable_reviews),
            questions: vars.flag("ENABLE_QUESTIONS")?.unwrap_or(profile.enable_questions),
            recommendations: vars
                .flag("ENABLE_RECOMMENDATIONS")?
                .unwrap_or(profile.enable_recommendations),
            fallback_to_mock: vars.flag("FALLBACK_TO_MOCK")?.unwrap_or(false),
        };

        let error_rate: f64 = vars
            .parsed("MOCK_ERROR_RATE")?
            .unwrap_or(profile.mock_error_rate);
        if !(0.0..=1.0).contains(&error_rate) {
            return Err(ConfigError::InvalidEnvVar(
                "MOCK_ERROR_RATE".to_string(),
                format!("{error_rate} is outside [0, 1]"),
            ));
        }

        let mock = MockConfig {
            enabled: vars.flag("USE_MOCK_DATA")?.unwrap_or(profile.use_mock_data),
            delay: vars.millis_or_secs("MOCK_DELAY_MS", Duration::from_millis)?,
            error_rate,
        };

        let default_limit = vars
            .parsed("DEFAULT_LIMIT")?
            .unwrap_or(profile.default_limit);

        Ok(Self {
            environment,
            region,
            host,
            port,
            api,
            features,
            mock,
            default_limit,
            sentry_dsn: vars.get("SENTRY_DSN"),
            sentry_environment: vars
                .get("SENTRY_ENVIRONMENT")
                .unwrap_or_else(|| environment.to_string()),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Marketplace site for the configured region.
    #[must_use]
    pub const fn site_id(&self) -> SiteId {
        self.region.settings().site_id
    }

    /// Currency for the configured region.
    #[must_use]
    pub const fn currency(&self) -> CurrencyCode {
        self.region.settings().currency
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional variable; blank values count as unset.
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    fn parsed<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(key)
            .map(|value| {
                value
                    .trim()
                    .parse::<T>()
                    .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
            })
            .transpose()
    }

    fn flag(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        self.get(key)
            .map(|value| match value.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(true),
                "false" | "0" | "no" | "off" => Ok(false),
                other => Err(ConfigError::InvalidEnvVar(
                    key.to_string(),
                    format!("expected a boolean, got {other:?}"),
                )),
            })
            .transpose()
    }

    fn millis_or_secs(
        &self,
        key: &str,
        to_duration: fn(u64) -> Duration,
    ) -> Result<Option<Duration>, ConfigError> {
        Ok(self.parsed::<u64>(key)?.map(to_duration))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_to_development_colombia() {
        let config = load(&[]).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.region, Region::Colombia);
        assert_eq!(config.site_id(), SiteId::Mco);
        assert_eq!(config.currency(), CurrencyCode::Cop);
        assert_eq!(config.api.base_url, "https://api.mercadolibre.com");
        assert_eq!(config.api.timeout, Duration::from_millis(10_000));
        assert_eq!(config.api.cache_ttl, Some(Duration::from_secs(300)));
        assert!(config.mock.enabled);
        assert!(config.mock.delay.is_none());
        assert!((config.mock.error_rate - 0.05).abs() < f64::EPSILON);
        assert_eq!(config.sentry_environment, "development");
        assert!(!config.features.fallback_to_mock);
    }

    #[test]
    fn test_overrides_apply_on_top_of_profile() {
        let config = load(&[
            ("APP_ENV", "production"),
            ("APP_REGION", "argentina"),
            ("USE_MOCK_DATA", "true"),
            ("MOCK_DELAY_MS", "0"),
            ("MOCK_ERROR_RATE", "0"),
            ("ENABLE_CACHE", "false"),
            ("DEFAULT_LIMIT", "5"),
            ("STOREFRONT_PORT", "8080"),
            ("FALLBACK_TO_MOCK", "yes"),
        ])
        .unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.site_id(), SiteId::Mla);
        assert!(config.mock.enabled);
        assert_eq!(config.mock.delay, Some(Duration::ZERO));
        assert!(config.api.cache_ttl.is_none());
        assert_eq!(config.default_limit, 5);
        assert_eq!(config.socket_addr().port(), 8080);
        assert!(config.features.fallback_to_mock);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = load(&[("API_TIMEOUT_MS", "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "API_TIMEOUT_MS"));

        let err = load(&[("MOCK_ERROR_RATE", "1.5")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "MOCK_ERROR_RATE"));

        let err = load(&[("ENABLE_REVIEWS", "maybe")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));

        assert!(load(&[("APP_REGION", "peru")]).is_err());
    }

    #[test]
    fn test_auth_token_redacted_in_debug() {
        let config = load(&[("API_AUTH_TOKEN", "APP_USR-1234567890")]).unwrap();
        let debug = format!("{:?}", config.api);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("APP_USR-1234567890"));
    }

    #[test]
    fn test_blank_values_count_as_unset() {
        let config = load(&[("API_BASE_URL", "  "), ("APP_ENV", "testing")]).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:3001/api");
        assert!(!config.features.recommendations);
    }
}
