//! Deployment environment profiles.
//!
//! Each profile supplies defaults that individual environment variables may
//! override. The CLI writes the same table out as a `.env` file.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
    Testing,
    Local,
}

impl Environment {
    /// All environments, in the order the CLI lists them.
    pub const ALL: [Self; 4] = [
        Self::Development,
        Self::Production,
        Self::Testing,
        Self::Local,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Testing => "testing",
            Self::Local => "local",
        }
    }

    /// Defaults for this environment.
    #[must_use]
    pub const fn profile(self) -> EnvironmentProfile {
        match self {
            Self::Development => EnvironmentProfile {
                api_base_url: "https://api.mercadolibre.com",
                api_timeout: Duration::from_millis(10_000),
                enable_logging: true,
                enable_cache: true,
                cache_ttl: Duration::from_secs(300),
                enable_reviews: true,
                enable_questions: true,
                enable_recommendations: true,
                use_mock_data: true,
                mock_delay: Duration::from_millis(1000),
                mock_error_rate: 0.05,
                default_limit: 10,
            },
            Self::Production => EnvironmentProfile {
                api_base_url: "https://api.mercadolibre.com",
                api_timeout: Duration::from_millis(15_000),
                enable_logging: false,
                enable_cache: true,
                cache_ttl: Duration::from_secs(600),
                enable_reviews: true,
                enable_questions: true,
                enable_recommendations: true,
                use_mock_data: false,
                mock_delay: Duration::ZERO,
                mock_error_rate: 0.0,
                default_limit: 10,
            },
            Self::Testing => EnvironmentProfile {
                api_base_url: "http://localhost:3001/api",
                api_timeout: Duration::from_millis(5000),
                enable_logging: true,
                enable_cache: false,
                cache_ttl: Duration::ZERO,
                enable_reviews: true,
                enable_questions: true,
                enable_recommendations: false,
                use_mock_data: true,
                mock_delay: Duration::from_millis(100),
                mock_error_rate: 0.0,
                default_limit: 10,
            },
            Self::Local => EnvironmentProfile {
                api_base_url: "http://localhost:3001/api",
                api_timeout: Duration::from_millis(8000),
                enable_logging: true,
                enable_cache: false,
                cache_ttl: Duration::ZERO,
                enable_reviews: true,
                enable_questions: true,
                enable_recommendations: true,
                use_mock_data: true,
                mock_delay: Duration::from_millis(800),
                mock_error_rate: 0.02,
                default_limit: 20,
            },
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            "testing" | "test" => Ok(Self::Testing),
            "local" => Ok(Self::Local),
            _ => Err(format!(
                "invalid environment: {s} (expected development, production, testing or local)"
            )),
        }
    }
}

/// Default settings for one environment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvironmentProfile {
    pub api_base_url: &'static str,
    pub api_timeout: Duration,
    pub enable_logging: bool,
    pub enable_cache: bool,
    pub cache_ttl: Duration,
    pub enable_reviews: bool,
    pub enable_questions: bool,
    pub enable_recommendations: bool,
    pub use_mock_data: bool,
    pub mock_delay: Duration,
    pub mock_error_rate: f64,
    pub default_limit: u32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_aliases() {
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!("LOCAL".parse::<Environment>().unwrap(), Environment::Local);
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn test_production_never_uses_mocks() {
        let profile = Environment::Production.profile();
        assert!(!profile.use_mock_data);
        assert!(!profile.enable_logging);
        assert_eq!(profile.api_timeout, Duration::from_millis(15_000));
    }

    #[test]
    fn test_local_profile_values() {
        let profile = Environment::Local.profile();
        assert_eq!(profile.api_base_url, "http://localhost:3001/api");
        assert_eq!(profile.mock_delay, Duration::from_millis(800));
        assert!((profile.mock_error_rate - 0.02).abs() < f64::EPSILON);
        assert_eq!(profile.default_limit, 20);
    }
}
