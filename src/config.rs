//! Game configuration: board size, timings, piece source seed.

use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_WIDTH: u16 = 10;
pub const DEFAULT_HEIGHT: u16 = 20;
pub const DEFAULT_FALL_MS: u64 = 500;
pub const DEFAULT_LOCK_DELAY_MS: u64 = 1000;
/// Delay before a held direction starts repeating.
pub const DEFAULT_REPEAT_DELAY_MS: u64 = 100;
/// Interval between repeats once repeating.
pub const DEFAULT_REPEAT_INTERVAL_MS: u64 = 50;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("board must be at least 1x1, got {width}x{height}")]
    EmptyBoard { width: u16, height: u16 },
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}

/// Everything the core needs to build a `GameState`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub width: u16,
    pub height: u16,
    pub fall_interval: Duration,
    pub lock_delay: Duration,
    pub repeat_delay: Duration,
    pub repeat_interval: Duration,
    /// `None` seeds the piece source from entropy.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            fall_interval: Duration::from_millis(DEFAULT_FALL_MS),
            lock_delay: Duration::from_millis(DEFAULT_LOCK_DELAY_MS),
            repeat_delay: Duration::from_millis(DEFAULT_REPEAT_DELAY_MS),
            repeat_interval: Duration::from_millis(DEFAULT_REPEAT_INTERVAL_MS),
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyBoard {
                width: self.width,
                height: self.height,
            });
        }
        for (name, value) in [
            ("fall interval", self.fall_interval),
            ("lock delay", self.lock_delay),
            ("repeat interval", self.repeat_interval),
        ] {
            if value.is_zero() {
                return Err(ConfigError::ZeroDuration(name));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(GameConfig::default().validate(), Ok(()));
    }

    #[test]
    fn zero_dimension_is_rejected() {
        let config = GameConfig {
            width: 0,
            ..GameConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::EmptyBoard {
                width: 0,
                height: 20
            })
        );
    }

    #[test]
    fn zero_fall_interval_is_rejected() {
        let config = GameConfig {
            fall_interval: Duration::ZERO,
            ..GameConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.to_string(), "fall interval must be greater than zero");
    }

    #[test]
    fn zero_repeat_delay_is_allowed() {
        let config = GameConfig {
            repeat_delay: Duration::ZERO,
            ..GameConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
