//! Error types for the Monte Carlo engine.
//!
//! This module defines structured error types for simulation settings
//! validation. Runtime failures are reported as
//! [`PricingError`](pricer_core::types::PricingError).

use pricer_core::types::PricingError;
use thiserror::Error;

use super::config::{MAX_PATHS, MAX_STEPS_PER_PATH, MAX_STEPS_PER_YEAR};

/// Configuration error for Monte Carlo simulation settings.
///
/// These errors occur during construction when invalid parameters are provided.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// Path count outside valid range.
    #[error("Invalid path count {0}: must be in range [1, {max}]", max = MAX_PATHS)]
    InvalidPathCount(usize),
    /// Steps per year outside valid range.
    #[error(
        "Invalid steps per year {0}: must be in range [1, {max}]",
        max = MAX_STEPS_PER_YEAR
    )]
    InvalidStepCount(usize),
    /// Horizon needs more path points than allowed.
    #[error(
        "Maturity {maturity} at {steps_per_year} steps per year exceeds {max} path points",
        max = MAX_STEPS_PER_PATH
    )]
    HorizonTooLong {
        /// Requested maturity in years.
        maturity: f64,
        /// Configured resolution.
        steps_per_year: usize,
    },
    /// Invalid parameter value with name and description.
    #[error("Invalid parameter '{name}': {value}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Description of the invalid value.
        value: String,
    },
}

impl From<ConfigError> for PricingError {
    fn from(err: ConfigError) -> Self {
        PricingError::InvalidArgument(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidPathCount(0);
        assert!(err.to_string().contains("Invalid path count 0"));

        let err = ConfigError::InvalidStepCount(20_000);
        assert!(err.to_string().contains("Invalid steps per year 20000"));

        let err = ConfigError::InvalidParameter {
            name: "n_paths",
            value: "must be specified".to_string(),
        };
        assert!(err.to_string().contains("n_paths"));

        let err = ConfigError::HorizonTooLong {
            maturity: 1e9,
            steps_per_year: 100,
        };
        assert!(err.to_string().contains("exceeds 1000000 path points"));
        assert!(PricingError::from(err).is_invalid_argument());
    }

    #[test]
    fn test_converts_to_invalid_argument() {
        let err: PricingError = ConfigError::InvalidPathCount(0).into();
        assert!(err.is_invalid_argument());
    }
}
