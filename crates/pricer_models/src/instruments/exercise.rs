//! Contract style definitions.

/// Payoff style of a single-asset contract.
///
/// All styles are exercised at maturity only; they differ in which part of
/// the simulated trajectory enters the payoff.
///
/// # Variants
/// - `European`: terminal value
/// - `Asian`: arithmetic average over monitoring dates
/// - `Lookback`: terminal value against the path minimum
///
/// # Examples
/// ```
/// use pricer_models::instruments::ContractStyle;
///
/// let asian = ContractStyle::asian(vec![0.25, 0.5, 0.75, 1.0]);
/// assert!(asian.is_path_dependent());
/// assert_eq!(asian.monitoring_dates().len(), 4);
/// assert!(ContractStyle::European.monitoring_dates().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ContractStyle {
    /// European style: payoff on the terminal value.
    #[default]
    European,

    /// Asian style: payoff on the arithmetic average at monitoring dates.
    Asian {
        /// Monitoring times in years, each in `(0, maturity]`
        monitoring_dates: Vec<f64>,
    },

    /// Lookback style: `S_T - min(S)`, identical for calls and puts.
    Lookback,
}

impl ContractStyle {
    /// Creates an Asian style.
    #[inline]
    pub fn asian(monitoring_dates: Vec<f64>) -> Self {
        ContractStyle::Asian { monitoring_dates }
    }

    /// Monitoring dates, empty for non-Asian styles.
    #[inline]
    pub fn monitoring_dates(&self) -> &[f64] {
        match self {
            ContractStyle::Asian { monitoring_dates } => monitoring_dates,
            _ => &[],
        }
    }

    /// Returns whether the payoff depends on more than the terminal value.
    #[inline]
    pub fn is_path_dependent(&self) -> bool {
        !matches!(self, ContractStyle::European)
    }

    /// Short label for logs.
    pub fn name(&self) -> &'static str {
        match self {
            ContractStyle::European => "european",
            ContractStyle::Asian { .. } => "asian",
            ContractStyle::Lookback => "lookback",
        }
    }
}
