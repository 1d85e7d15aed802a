//! Instrument error types.
//!
//! This module provides structured error handling for contract
//! construction.

use pricer_core::types::PricingError;
use thiserror::Error;

/// Instrument-related errors.
///
/// # Variants
/// - `InvalidStrike`: Strike price is non-positive
/// - `InvalidExpiry`: Maturity is non-positive
/// - `MissingMonitoringDates`: Asian contract without monitoring dates
/// - `InvalidMonitoringDate`: Monitoring date outside `(0, maturity]`
///
/// # Examples
/// ```
/// use pricer_models::instruments::InstrumentError;
///
/// let err = InstrumentError::InvalidStrike { strike: -100.0 };
/// assert!(format!("{}", err).contains("-100"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InstrumentError {
    /// Invalid strike price (non-positive).
    #[error("Invalid strike: K = {strike}")]
    InvalidStrike {
        /// The invalid strike value
        strike: f64,
    },

    /// Invalid maturity (non-positive).
    #[error("Invalid expiry: T = {expiry}")]
    InvalidExpiry {
        /// The invalid expiry value
        expiry: f64,
    },

    /// Asian contract without monitoring dates.
    #[error("Asian contract requires at least one monitoring date")]
    MissingMonitoringDates,

    /// Monitoring date outside `(0, maturity]`.
    #[error("Monitoring date {date} outside (0, {maturity}]")]
    InvalidMonitoringDate {
        /// The offending date
        date: f64,
        /// Contract maturity
        maturity: f64,
    },
}

impl From<InstrumentError> for PricingError {
    fn from(err: InstrumentError) -> Self {
        PricingError::InvalidArgument(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_to_pricing_error() {
        let err: PricingError = InstrumentError::InvalidExpiry { expiry: 0.0 }.into();
        assert_eq!(
            err,
            PricingError::InvalidArgument("Invalid expiry: T = 0".to_string())
        );

        let err: PricingError = InstrumentError::MissingMonitoringDates.into();
        assert!(err.is_invalid_argument());
    }
}
