//! Game session configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timing and capacity settings shared by every game a manager creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Time the queue head has to select or cancel (default: 5 s)
    pub selection_timeout: Duration,

    /// Pause after a successful trio before the queue resumes (default: 1.6 s)
    pub celebration_delay: Duration,

    /// Idle time after which a game shuts down (default: 10 min)
    pub inactivity_timeout: Duration,

    /// Actor inbox size
    pub inbox_capacity: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            selection_timeout: Duration::from_millis(5000),
            celebration_delay: Duration::from_millis(1600),
            inactivity_timeout: Duration::from_secs(600),
            inbox_capacity: 100,
        }
    }
}

impl GameConfig {
    /// Load configuration from environment variables, falling back to the
    /// defaults for anything unset or unparsable.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            selection_timeout: Duration::from_millis(parse_env_or(
                "TRIO_SELECTION_TIMEOUT_MS",
                millis(defaults.selection_timeout),
            )),
            celebration_delay: Duration::from_millis(parse_env_or(
                "TRIO_CELEBRATION_DELAY_MS",
                millis(defaults.celebration_delay),
            )),
            inactivity_timeout: Duration::from_secs(parse_env_or(
                "TRIO_INACTIVITY_TIMEOUT_SECS",
                defaults.inactivity_timeout.as_secs(),
            )),
            inbox_capacity: parse_env_or("TRIO_INBOX_CAPACITY", defaults.inbox_capacity),
        }
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the first offending variable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.selection_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                var: "TRIO_SELECTION_TIMEOUT_MS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.celebration_delay.is_zero() {
            return Err(ConfigError::Invalid {
                var: "TRIO_CELEBRATION_DELAY_MS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.inactivity_timeout <= self.selection_timeout {
            return Err(ConfigError::Invalid {
                var: "TRIO_INACTIVITY_TIMEOUT_SECS".to_string(),
                reason: format!(
                    "Must be longer than the selection timeout ({:?})",
                    self.selection_timeout
                ),
            });
        }

        // tokio panics on a zero-capacity channel
        if self.inbox_capacity == 0 {
            return Err(ConfigError::Invalid {
                var: "TRIO_INBOX_CAPACITY".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 4] = [
        "TRIO_SELECTION_TIMEOUT_MS",
        "TRIO_CELEBRATION_DELAY_MS",
        "TRIO_INACTIVITY_TIMEOUT_SECS",
        "TRIO_INBOX_CAPACITY",
    ];

    fn clear_env() {
        for var in VARS {
            unsafe { std::env::remove_var(var) };
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = GameConfig::default();
        assert_eq!(config.selection_timeout, Duration::from_secs(5));
        assert_eq!(config.celebration_delay, Duration::from_millis(1600));
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        unsafe {
            std::env::set_var("TRIO_SELECTION_TIMEOUT_MS", "2500");
            std::env::set_var("TRIO_INBOX_CAPACITY", "16");
        }

        let config = GameConfig::from_env();
        assert_eq!(config.selection_timeout, Duration::from_millis(2500));
        assert_eq!(config.inbox_capacity, 16);
        assert_eq!(config.celebration_delay, Duration::from_millis(1600));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_ignores_garbage() {
        clear_env();
        unsafe { std::env::set_var("TRIO_CELEBRATION_DELAY_MS", "soon") };

        let config = GameConfig::from_env();
        assert_eq!(config, GameConfig::default());

        clear_env();
    }

    #[test]
    fn test_config_validation_zero_timeout() {
        let config = GameConfig {
            selection_timeout: Duration::ZERO,
            ..GameConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("TRIO_SELECTION_TIMEOUT_MS"));
    }

    #[test]
    fn test_config_validation_zero_capacity() {
        let config = GameConfig {
            inbox_capacity: 0,
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { var, .. }) if var == "TRIO_INBOX_CAPACITY"
        ));
    }

    #[test]
    fn test_config_validation_inactivity_too_short() {
        let config = GameConfig {
            inactivity_timeout: Duration::from_secs(1),
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
