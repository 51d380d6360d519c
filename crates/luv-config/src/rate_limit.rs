//! Rate limiting configuration for API endpoints.
//!
//! Two token buckets are configured: a general bucket applied to every `/api`
//! route and a stricter one for `/api/auth`, where credential guessing
//! happens.
//!
//! # Configuration
//!
//! - `RATE_LIMIT_ENABLED`: Set to `false` to disable rate limiting (default: true)
//! - `RATE_LIMIT_GENERAL_PER_SECOND`: Seconds between token refills, general bucket (default: 2)
//! - `RATE_LIMIT_GENERAL_BURST_SIZE`: Burst size, general bucket (default: 30)
//! - `RATE_LIMIT_AUTH_PER_SECOND`: Seconds between token refills, auth bucket (default: 10)
//! - `RATE_LIMIT_AUTH_BURST_SIZE`: Burst size, auth bucket (default: 5)
//!
//! Clients are keyed by `X-Forwarded-For`/`X-Real-IP`/`Forwarded` when a proxy
//! sets them, falling back to the peer address.

use tower_governor::governor::{GovernorConfig, GovernorConfigBuilder};
use tower_governor::key_extractor::SmartIpKeyExtractor;

pub type IpGovernorConfig =
    GovernorConfig<SmartIpKeyExtractor, ::governor::middleware::NoOpMiddleware>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub enabled: bool,

    /// Interval in seconds after which one general-bucket token is replenished.
    pub general_per_second: u64,

    /// Maximum number of general-bucket tokens that can accumulate.
    pub general_burst_size: u32,

    /// Interval in seconds after which one auth-bucket token is replenished.
    pub auth_per_second: u64,

    /// Maximum number of auth-bucket tokens that can accumulate.
    pub auth_burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            general_per_second: 2,
            general_burst_size: 30,
            auth_per_second: 10,
            auth_burst_size: 5,
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl RateLimitConfig {
    /// Creates a new `RateLimitConfig` from environment variables.
    ///
    /// Falls back to [`RateLimitConfig::default`] values when a variable is
    /// missing or cannot be parsed.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            enabled: std::env::var("RATE_LIMIT_ENABLED")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.enabled),
            general_per_second: env_or("RATE_LIMIT_GENERAL_PER_SECOND", defaults.general_per_second),
            general_burst_size: env_or("RATE_LIMIT_GENERAL_BURST_SIZE", defaults.general_burst_size),
            auth_per_second: env_or("RATE_LIMIT_AUTH_PER_SECOND", defaults.auth_per_second),
            auth_burst_size: env_or("RATE_LIMIT_AUTH_BURST_SIZE", defaults.auth_burst_size),
        }
    }

    /// Same limits, switched off. Used by tests and local tooling.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Creates a `GovernorConfig` for general API endpoints.
    ///
    /// # Panics
    ///
    /// Panics if the governor configuration cannot be built, which only
    /// happens when the interval or burst size is zero.
    #[must_use]
    pub fn general_governor_config(&self) -> IpGovernorConfig {
        GovernorConfigBuilder::default()
            .per_second(self.general_per_second)
            .burst_size(self.general_burst_size)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .expect("Failed to build general rate limiter config")
    }

    /// Creates a `GovernorConfig` for authentication endpoints.
    ///
    /// # Panics
    ///
    /// Panics if the governor configuration cannot be built.
    #[must_use]
    pub fn auth_governor_config(&self) -> IpGovernorConfig {
        GovernorConfigBuilder::default()
            .per_second(self.auth_per_second)
            .burst_size(self.auth_burst_size)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .expect("Failed to build auth rate limiter config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RateLimitConfig::default();
        assert!(config.enabled);
        assert_eq!(config.general_per_second, 2);
        assert_eq!(config.general_burst_size, 30);
        assert_eq!(config.auth_per_second, 10);
        assert_eq!(config.auth_burst_size, 5);
    }

    #[test]
    fn test_disabled_keeps_limits() {
        let config = RateLimitConfig::disabled();
        assert!(!config.enabled);
        assert_eq!(config.auth_burst_size, 5);
    }

    #[test]
    fn test_governor_configs_build() {
        let config = RateLimitConfig::default();
        let _general = config.general_governor_config();
        let _auth = config.auth_governor_config();
    }
}
