//! Everest (worst-of) basket pricing.
//!
//! An Everest option pays the worst terminal return across a basket of
//! assets, `min_i S_T^i / S_0^i`, at maturity. Each asset follows its own
//! Heston dynamics under the basket's risk-free rate and is driven by its own
//! random stream; assets are simulated independently.

use pricer_core::types::PricingError;
use pricer_models::models::HestonParams;
use rayon::prelude::*;
use tracing::{debug, debug_span};

use super::accumulator::PayoffAccumulator;
use super::config::SimulationSettings;
use super::paths::HestonPathSimulator;
use super::payoff::basket_minimum;
use super::pricer::PricingResult;
use crate::rng::{entropy_seed, path_seed, PricerRng};

/// Everest basket priced by Monte Carlo.
///
/// # Examples
///
/// ```rust
/// use pricer_models::models::HestonParams;
/// use pricer_pricing::mc::{EverestBasket, SimulationSettings};
///
/// let settings = SimulationSettings::builder()
///     .n_paths(1_000)
///     .steps_per_year(50)
///     .seed(7)
///     .build()
///     .unwrap();
///
/// let mut basket = EverestBasket::new(0.05, settings).unwrap();
/// basket
///     .add_asset(HestonParams::new(0.05, 98.0, 2.0, 0.06, 0.4, 0.7, 0.07).unwrap())
///     .unwrap();
/// basket
///     .add_asset(HestonParams::new(0.05, 115.0, 3.5, 0.07, 0.02, 0.394, 0.09).unwrap())
///     .unwrap();
///
/// let price = basket.price(1.0).unwrap();
/// assert!(price > 0.0 && price < 1.0);
/// ```
#[derive(Clone, Debug)]
pub struct EverestBasket {
    rate: f64,
    settings: SimulationSettings,
    assets: Vec<HestonPathSimulator>,
}

impl EverestBasket {
    /// Creates an empty basket.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the rate is not finite or the settings are
    /// invalid.
    pub fn new(risk_free_rate: f64, settings: SimulationSettings) -> Result<Self, PricingError> {
        if !risk_free_rate.is_finite() {
            return Err(PricingError::invalid("risk-free rate must be finite"));
        }
        settings.validate()?;
        Ok(Self {
            rate: risk_free_rate,
            settings,
            assets: Vec::new(),
        })
    }

    /// Adds an asset. Its rate is replaced by the basket's risk-free rate.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the parameters are invalid or violate the
    /// Feller condition.
    pub fn add_asset(&mut self, params: HestonParams) -> Result<(), PricingError> {
        let simulator = HestonPathSimulator::new(&params.with_rate(self.rate))?;
        self.assets.push(simulator);
        Ok(())
    }

    /// Number of assets in the basket.
    #[inline]
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Returns `true` if no asset has been added.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Discounted worst-of return at `maturity`.
    ///
    /// # Errors
    ///
    /// See [`EverestBasket::price_with_statistics`].
    pub fn price(&self, maturity: f64) -> Result<f64, PricingError> {
        Ok(self.price_with_statistics(maturity)?.price)
    }

    /// Discounted worst-of return with its standard error.
    ///
    /// # Errors
    ///
    /// - `NoAssets` for an empty basket
    /// - `InvalidArgument` if `maturity` is not positive and finite, or needs
    ///   more than [`MAX_STEPS_PER_PATH`](super::config::MAX_STEPS_PER_PATH)
    ///   path points
    /// - `NumericalInstability` if the time step is singular for an asset
    pub fn price_with_statistics(&self, maturity: f64) -> Result<PricingResult, PricingError> {
        if self.assets.is_empty() {
            return Err(PricingError::NoAssets);
        }
        if !maturity.is_finite() || maturity <= 0.0 {
            return Err(PricingError::invalid(format!(
                "maturity must be positive, got {}",
                maturity
            )));
        }

        let (num_steps, dt) = self.settings.discretise(maturity)?;
        for asset in &self.assets {
            asset.check_discretisation(num_steps, dt)?;
        }

        let n_paths = self.settings.n_paths();
        let n_assets = self.assets.len();
        let base_seed = self.settings.seed().unwrap_or_else(entropy_seed);
        let _span = debug_span!("everest_price", n_paths, n_assets, n_steps = num_steps).entered();
        debug!(base_seed, dt, "Everest plan");

        let acc = (0..n_paths)
            .into_par_iter()
            .fold(PayoffAccumulator::new, |mut acc, index| {
                acc.add(self.path_payoff(base_seed, index, num_steps, dt));
                acc
            })
            .reduce(PayoffAccumulator::new, PayoffAccumulator::merged);

        let discount = (-self.rate * maturity).exp();
        let result = PricingResult {
            price: discount * acc.mean(),
            std_error: discount * acc.std_error(),
            n_paths: acc.count(),
        };
        debug!(price = result.price, std_error = result.std_error, "Everest price");
        Ok(result)
    }

    /// One basket scenario; asset `j` of path `i` draws from stream
    /// `path_seed(path_seed(base, i), j)`.
    fn path_payoff(&self, base_seed: u64, index: usize, num_steps: usize, dt: f64) -> f64 {
        let scenario_seed = path_seed(base_seed, index as u64);
        let paths: Vec<Vec<f64>> = self
            .assets
            .iter()
            .enumerate()
            .map(|(j, asset)| {
                let mut rng = PricerRng::for_path(scenario_seed, j as u64);
                asset.simulate(num_steps, dt, &mut rng)
            })
            .collect();
        basket_minimum(paths.iter().map(Vec::as_slice)).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn settings(n_paths: usize, seed: u64) -> SimulationSettings {
        SimulationSettings::builder()
            .n_paths(n_paths)
            .steps_per_year(50)
            .seed(seed)
            .build()
            .unwrap()
    }

    fn asset(spot: f64) -> HestonParams {
        HestonParams::new(0.0, spot, 2.0, 0.06, 0.4, 0.5, 0.04).unwrap()
    }

    #[test]
    fn test_empty_basket() {
        let basket = EverestBasket::new(0.05, settings(100, 1)).unwrap();
        assert!(basket.is_empty());
        assert!(matches!(basket.price(1.0), Err(PricingError::NoAssets)));
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(EverestBasket::new(f64::NAN, settings(100, 1)).is_err());

        let mut basket = EverestBasket::new(0.05, settings(100, 1)).unwrap();
        let feller_violating = HestonParams::new(0.05, 100.0, 0.5, 0.01, 0.2, 0.1, 0.4).unwrap();
        assert!(basket
            .add_asset(feller_violating)
            .unwrap_err()
            .is_invalid_argument());
        assert!(basket.is_empty());

        basket.add_asset(asset(100.0)).unwrap();
        assert!(basket.price(0.0).unwrap_err().is_invalid_argument());
        assert!(basket.price(f64::INFINITY).unwrap_err().is_invalid_argument());
        assert!(basket.price(1e12).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_asset_takes_basket_rate() {
        let mut basket = EverestBasket::new(0.05, settings(10, 1)).unwrap();
        basket.add_asset(asset(100.0)).unwrap();
        assert_eq!(basket.assets[0].params().rate, 0.05);
    }

    #[test]
    fn test_single_asset_is_discounted_growth() {
        // Worst-of one asset: E[e^{-rT} S_T / S_0] = (1 + r dt)^n e^{-rT} ~ 1
        let mut basket = EverestBasket::new(0.05, settings(20_000, 4)).unwrap();
        basket.add_asset(asset(100.0)).unwrap();
        assert_relative_eq!(basket.price(1.0).unwrap(), 1.0, max_relative = 0.01);
    }

    #[test]
    fn test_more_assets_lower_price() {
        let mut one = EverestBasket::new(0.05, settings(4_000, 6)).unwrap();
        one.add_asset(asset(100.0)).unwrap();

        let mut three = one.clone();
        three.add_asset(asset(50.0)).unwrap();
        three.add_asset(asset(200.0)).unwrap();

        // Asset 0 of every scenario draws the same stream in both baskets
        assert!(three.price(1.0).unwrap() < one.price(1.0).unwrap());
        assert_eq!(three.len(), 3);
    }

    #[test]
    fn test_seeded_reproducible() {
        let mut basket = EverestBasket::new(0.05, settings(2_000, 13)).unwrap();
        basket.add_asset(asset(100.0)).unwrap();
        basket.add_asset(asset(120.0)).unwrap();
        let a = basket.price_with_statistics(2.0).unwrap();
        let b = basket.price_with_statistics(2.0).unwrap();
        assert_relative_eq!(a.price, b.price, max_relative = 1e-12);
        assert!(a.std_error > 0.0);
    }
}
