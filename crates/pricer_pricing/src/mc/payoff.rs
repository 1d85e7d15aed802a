//! Payoff evaluation on simulated trajectories.
//!
//! This module provides the payoff variants priced by the Monte Carlo engine:
//!
//! - **European**: `max(S_T - K, 0)` call, `max(K - S_T, 0)` put
//! - **Asian**: arithmetic average of the trajectory at the monitoring
//!   indices, against the strike
//! - **Lookback**: floating strike `S_T - min(S)`; call and put coincide
//! - **Basket minimum** (Everest): `min_i S_T^i / S_0^i` across assets
//!
//! Payoffs are undiscounted; the engine applies `e^{-rT}`.

use pricer_models::instruments::{ContractSpec, ContractStyle, OptionType};

/// Payoff selected per pricing call.
///
/// # Examples
///
/// ```rust
/// use pricer_models::instruments::OptionType;
/// use pricer_pricing::mc::Payoff;
///
/// let path = [100.0, 104.0, 98.0, 110.0];
///
/// let call = Payoff::European { option_type: OptionType::Call, strike: 100.0 };
/// assert_eq!(call.evaluate(&path), 10.0);
///
/// let asian = Payoff::Asian {
///     option_type: OptionType::Put,
///     strike: 105.0,
///     indices: vec![1, 3],
/// };
/// assert_eq!(asian.evaluate(&path), 0.0);
///
/// assert_eq!(Payoff::Lookback.evaluate(&path), 12.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Payoff {
    /// Plain vanilla on the terminal value.
    European {
        /// Call or put.
        option_type: OptionType,
        /// Strike price.
        strike: f64,
    },
    /// Arithmetic average over trajectory indices.
    Asian {
        /// Call or put.
        option_type: OptionType,
        /// Strike price.
        strike: f64,
        /// Distinct trajectory indices, ascending.
        indices: Vec<usize>,
    },
    /// Floating strike lookback, `S_T - min(S)`.
    Lookback,
}

impl Payoff {
    /// Payoff for a contract simulated on `path_len` points at
    /// `steps_per_year` resolution.
    ///
    /// European puts are mapped to the call payoff; the engine recovers the
    /// put by parity.
    pub fn for_contract(spec: &ContractSpec, steps_per_year: usize, path_len: usize) -> Self {
        match spec.style() {
            ContractStyle::European => Payoff::European {
                option_type: OptionType::Call,
                strike: spec.strike(),
            },
            ContractStyle::Asian { monitoring_dates } => Payoff::Asian {
                option_type: spec.option_type(),
                strike: spec.strike(),
                indices: asian_indices(monitoring_dates, steps_per_year, path_len),
            },
            ContractStyle::Lookback => Payoff::Lookback,
        }
    }

    /// Evaluates the undiscounted payoff on one trajectory.
    ///
    /// An empty trajectory pays nothing.
    pub fn evaluate(&self, path: &[f64]) -> f64 {
        let Some(&terminal) = path.last() else {
            return 0.0;
        };
        match self {
            Payoff::European {
                option_type,
                strike,
            } => option_type.intrinsic(terminal, *strike),
            Payoff::Asian {
                option_type,
                strike,
                indices,
            } => {
                let (sum, count) = indices
                    .iter()
                    .filter_map(|&i| path.get(i))
                    .fold((0.0, 0usize), |(sum, count), &s| (sum + s, count + 1));
                if count == 0 {
                    return 0.0;
                }
                option_type.intrinsic(sum / count as f64, *strike)
            }
            Payoff::Lookback => terminal - path.iter().copied().fold(f64::INFINITY, f64::min),
        }
    }
}

/// Maps monitoring dates to trajectory indices.
///
/// Each date `t` maps to `floor(t * steps_per_year) - 1`, clamped to
/// `[1, path_len - 1]`. Dates landing on the same index count once. The
/// result is sorted ascending.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::asian_indices;
///
/// // 100 steps per year on a 100-point path
/// assert_eq!(asian_indices(&[0.25, 0.5, 0.75, 1.0], 100, 100), vec![24, 49, 74, 99]);
///
/// // Early dates clamp to 1, duplicates collapse
/// assert_eq!(asian_indices(&[0.001, 0.005, 0.5, 0.505], 100, 100), vec![1, 49]);
/// ```
pub fn asian_indices(dates: &[f64], steps_per_year: usize, path_len: usize) -> Vec<usize> {
    let last = path_len.saturating_sub(1);
    let mut indices: Vec<usize> = dates
        .iter()
        .map(|&date| {
            let raw = (date * steps_per_year as f64).floor() - 1.0;
            let index = if raw.is_finite() && raw > 0.0 {
                raw as usize
            } else {
                0
            };
            index.max(1).min(last)
        })
        .collect();
    indices.sort_unstable();
    indices.dedup();
    indices
}

/// Everest payoff: the worst terminal return across asset trajectories.
///
/// Returns `None` for an empty basket.
pub fn basket_minimum<'a, I>(paths: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a [f64]>,
{
    paths
        .into_iter()
        .filter_map(|path| match (path.first(), path.last()) {
            (Some(&first), Some(&last)) => Some(last / first),
            _ => None,
        })
        .reduce(f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ========================================
    // European
    // ========================================

    #[test]
    fn test_european() {
        let path = [100.0, 90.0, 95.0];
        let call = Payoff::European {
            option_type: OptionType::Call,
            strike: 90.0,
        };
        let put = Payoff::European {
            option_type: OptionType::Put,
            strike: 100.0,
        };
        assert_eq!(call.evaluate(&path), 5.0);
        assert_eq!(put.evaluate(&path), 5.0);
    }

    #[test]
    fn test_european_put_contract_uses_call_payoff() {
        let spec = ContractSpec::european(OptionType::Put, 100.0, 1.0).unwrap();
        assert_eq!(
            Payoff::for_contract(&spec, 100, 100),
            Payoff::European {
                option_type: OptionType::Call,
                strike: 100.0
            }
        );
    }

    // ========================================
    // Asian
    // ========================================

    #[test]
    fn test_asian_contract_indices() {
        let spec =
            ContractSpec::asian(OptionType::Put, 100.0, 1.0, vec![0.75, 0.25, 0.5, 0.5]).unwrap();
        match Payoff::for_contract(&spec, 100, 100) {
            Payoff::Asian {
                option_type,
                indices,
                ..
            } => {
                assert_eq!(option_type, OptionType::Put);
                assert_eq!(indices, vec![24, 49, 74]);
            }
            other => panic!("unexpected payoff {:?}", other),
        }
    }

    #[test]
    fn test_asian_indices_clamped_to_path() {
        // Date at maturity maps past the last point of a ceil-sized path
        assert_eq!(asian_indices(&[1.0], 100, 50), vec![49]);
        assert_eq!(asian_indices(&[0.0], 100, 50), vec![1]);
        assert_eq!(asian_indices(&[0.3], 1, 1), vec![0]);
    }

    #[test]
    fn test_asian_average() {
        let path = [100.0, 102.0, 104.0, 106.0];
        let call = Payoff::Asian {
            option_type: OptionType::Call,
            strike: 100.0,
            indices: vec![1, 2, 3],
        };
        assert!((call.evaluate(&path) - 4.0).abs() < 1e-12);

        let put = Payoff::Asian {
            option_type: OptionType::Put,
            strike: 110.0,
            indices: vec![1, 3],
        };
        assert!((put.evaluate(&path) - 6.0).abs() < 1e-12);
    }

    // ========================================
    // Lookback and Basket
    // ========================================

    #[test]
    fn test_lookback_ignores_option_type() {
        let path = [100.0, 80.0, 120.0, 90.0];
        assert_eq!(Payoff::Lookback.evaluate(&path), 10.0);

        let call = ContractSpec::lookback(OptionType::Call, 100.0, 1.0).unwrap();
        let put = call.with_option_type(OptionType::Put);
        assert_eq!(
            Payoff::for_contract(&call, 100, 100),
            Payoff::for_contract(&put, 100, 100)
        );
    }

    #[test]
    fn test_basket_minimum() {
        let a = [100.0, 120.0];
        let b = [50.0, 45.0];
        let c = [10.0, 11.0];
        let worst = basket_minimum([&a[..], &b[..], &c[..]]).unwrap();
        assert!((worst - 0.9).abs() < 1e-15);
        assert_eq!(basket_minimum(std::iter::empty::<&[f64]>()), None);
    }

    #[test]
    fn test_empty_path_pays_nothing() {
        assert_eq!(Payoff::Lookback.evaluate(&[]), 0.0);
    }

    // ========================================
    // Properties
    // ========================================

    proptest! {
        #[test]
        fn prop_payoffs_non_negative(
            path in prop::collection::vec(1.0f64..500.0, 1..50),
            strike in 1.0f64..500.0,
        ) {
            let len = path.len();
            for option_type in [OptionType::Call, OptionType::Put] {
                let european = Payoff::European { option_type, strike };
                let asian = Payoff::Asian {
                    option_type,
                    strike,
                    indices: (1..len).collect(),
                };
                prop_assert!(european.evaluate(&path) >= 0.0);
                prop_assert!(asian.evaluate(&path) >= 0.0);
            }
            prop_assert!(Payoff::Lookback.evaluate(&path) >= 0.0);
        }

        #[test]
        fn prop_asian_indices_in_range(
            dates in prop::collection::vec(0.0f64..20.0, 1..20),
            steps_per_year in 1usize..500,
            path_len in 2usize..5000,
        ) {
            let indices = asian_indices(&dates, steps_per_year, path_len);
            prop_assert!(!indices.is_empty());
            prop_assert!(indices.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(indices.iter().all(|&i| (1..path_len).contains(&i)));
        }
    }
}
