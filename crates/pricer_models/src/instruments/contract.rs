//! Single-asset option contract.

use super::error::InstrumentError;
use super::exercise::ContractStyle;
use super::payoff::OptionType;

/// Validated option contract on one underlying.
///
/// # Examples
/// ```
/// use pricer_models::instruments::{ContractSpec, OptionType};
///
/// let call = ContractSpec::european(OptionType::Call, 100.0, 1.0).unwrap();
/// assert_eq!(call.strike(), 100.0);
///
/// let asian = ContractSpec::asian(OptionType::Put, 100.0, 1.0, vec![0.5, 1.0]).unwrap();
/// assert_eq!(asian.style().monitoring_dates(), &[0.5, 1.0]);
///
/// assert!(ContractSpec::european(OptionType::Call, 100.0, 0.0).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContractSpec {
    strike: f64,
    maturity: f64,
    option_type: OptionType,
    style: ContractStyle,
}

impl ContractSpec {
    /// Creates a contract.
    ///
    /// # Errors
    ///
    /// - `InvalidStrike` if `strike` is not positive and finite
    /// - `InvalidExpiry` if `maturity` is not positive and finite
    /// - `MissingMonitoringDates` for an Asian style without dates
    /// - `InvalidMonitoringDate` for a date outside `(0, maturity]`
    pub fn new(
        option_type: OptionType,
        strike: f64,
        maturity: f64,
        style: ContractStyle,
    ) -> Result<Self, InstrumentError> {
        if !strike.is_finite() || strike <= 0.0 {
            return Err(InstrumentError::InvalidStrike { strike });
        }
        if !maturity.is_finite() || maturity <= 0.0 {
            return Err(InstrumentError::InvalidExpiry { expiry: maturity });
        }
        let dates = style.monitoring_dates();
        if matches!(style, ContractStyle::Asian { .. }) && dates.is_empty() {
            return Err(InstrumentError::MissingMonitoringDates);
        }
        if let Some(&date) = dates
            .iter()
            .find(|&&d| !d.is_finite() || d <= 0.0 || d > maturity)
        {
            return Err(InstrumentError::InvalidMonitoringDate { date, maturity });
        }

        Ok(Self {
            strike,
            maturity,
            option_type,
            style,
        })
    }

    /// European contract.
    ///
    /// # Errors
    ///
    /// See [`ContractSpec::new`].
    pub fn european(
        option_type: OptionType,
        strike: f64,
        maturity: f64,
    ) -> Result<Self, InstrumentError> {
        Self::new(option_type, strike, maturity, ContractStyle::European)
    }

    /// Asian contract averaging at `monitoring_dates`.
    ///
    /// # Errors
    ///
    /// See [`ContractSpec::new`].
    pub fn asian(
        option_type: OptionType,
        strike: f64,
        maturity: f64,
        monitoring_dates: Vec<f64>,
    ) -> Result<Self, InstrumentError> {
        Self::new(
            option_type,
            strike,
            maturity,
            ContractStyle::asian(monitoring_dates),
        )
    }

    /// Lookback contract. The strike is validated but does not enter the payoff.
    ///
    /// # Errors
    ///
    /// See [`ContractSpec::new`].
    pub fn lookback(
        option_type: OptionType,
        strike: f64,
        maturity: f64,
    ) -> Result<Self, InstrumentError> {
        Self::new(option_type, strike, maturity, ContractStyle::Lookback)
    }

    /// Strike price.
    #[inline]
    pub fn strike(&self) -> f64 {
        self.strike
    }

    /// Time to maturity in years.
    #[inline]
    pub fn maturity(&self) -> f64 {
        self.maturity
    }

    /// Call or put.
    #[inline]
    pub fn option_type(&self) -> OptionType {
        self.option_type
    }

    /// Payoff style.
    #[inline]
    pub fn style(&self) -> &ContractStyle {
        &self.style
    }

    /// Same contract with the other option type.
    pub fn with_option_type(&self, option_type: OptionType) -> Self {
        Self {
            option_type,
            ..self.clone()
        }
    }
}
