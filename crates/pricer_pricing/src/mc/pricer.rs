//! Monte Carlo pricing engine.
//!
//! # Overview
//!
//! The [`MonteCarloEngine`] coordinates:
//! 1. Discretisation of the contract horizon (via
//!    [`SimulationSettings::discretise`])
//! 2. Per-path random streams (via [`PricerRng::for_path`])
//! 3. Path generation (via [`HestonPathSimulator`])
//! 4. Payoff evaluation (via [`Payoff`])
//! 5. Lossless aggregation and discounting (via [`PayoffAccumulator`])
//!
//! Paths are distributed over rayon's global pool with a `fold`/`reduce`
//! over path indices. The only shared state is the immutable engine.
//!
//! # Put Prices
//!
//! European puts are priced from the call estimate by parity,
//! `P = C + K e^{-rT} - S₀`. Asian puts use their own payoff. Lookback calls
//! and puts are the same contract.

use pricer_core::types::PricingError;
use pricer_models::instruments::ContractSpec;
use pricer_models::models::HestonParams;
use rayon::prelude::*;
use tracing::{debug, debug_span};

use super::accumulator::PayoffAccumulator;
use super::config::SimulationSettings;
use super::paths::HestonPathSimulator;
use super::payoff::Payoff;
use crate::rng::{entropy_seed, PricerRng};

/// Pricing result with sampling statistics.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::PricingResult;
///
/// let result = PricingResult {
///     price: 10.5,
///     std_error: 0.05,
///     n_paths: 10_000,
/// };
///
/// assert!((result.confidence_95() - 0.098).abs() < 1e-12);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PricingResult {
    /// Present value of the contract.
    pub price: f64,
    /// Standard error of the price estimate.
    pub std_error: f64,
    /// Number of simulated paths.
    pub n_paths: usize,
}

impl PricingResult {
    /// Returns the 95% confidence interval half-width.
    #[inline]
    pub fn confidence_95(&self) -> f64 {
        1.96 * self.std_error
    }

    /// Returns the 99% confidence interval half-width.
    #[inline]
    pub fn confidence_99(&self) -> f64 {
        2.576 * self.std_error
    }
}

/// Everything a worker needs to price one path.
#[derive(Debug)]
struct PricingPlan {
    payoff: Payoff,
    num_steps: usize,
    dt: f64,
    base_seed: u64,
    discount: f64,
    parity_shift: f64,
}

impl PricingPlan {
    #[inline]
    fn path_payoff(&self, simulator: &HestonPathSimulator, index: usize) -> f64 {
        let mut rng = PricerRng::for_path(self.base_seed, index as u64);
        let path = simulator.simulate(self.num_steps, self.dt, &mut rng);
        self.payoff.evaluate(&path)
    }

    fn finish(&self, acc: &PayoffAccumulator) -> PricingResult {
        PricingResult {
            price: self.discount * acc.mean() + self.parity_shift,
            std_error: self.discount * acc.std_error(),
            n_paths: acc.count(),
        }
    }
}

/// Parallel Monte Carlo engine for single-asset Heston contracts.
///
/// # Examples
///
/// ```rust
/// use pricer_models::instruments::{ContractSpec, OptionType};
/// use pricer_models::models::HestonParams;
/// use pricer_pricing::mc::{MonteCarloEngine, SimulationSettings};
///
/// let params = HestonParams::new(0.05, 100.0, 2.0, 0.04, 0.3, -0.7, 0.04).unwrap();
/// let settings = SimulationSettings::builder()
///     .n_paths(2_000)
///     .steps_per_year(50)
///     .seed(42)
///     .build()
///     .unwrap();
///
/// let engine = MonteCarloEngine::new(params, settings).unwrap();
/// let call = ContractSpec::european(OptionType::Call, 100.0, 1.0).unwrap();
/// let result = engine.price_with_statistics(&call).unwrap();
///
/// assert!(result.price > 0.0);
/// assert_eq!(result.n_paths, 2_000);
/// ```
#[derive(Clone, Debug)]
pub struct MonteCarloEngine {
    simulator: HestonPathSimulator,
    settings: SimulationSettings,
}

impl MonteCarloEngine {
    /// Creates an engine.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the settings are invalid, the parameters
    /// are invalid or they violate the Feller condition.
    pub fn new(params: HestonParams, settings: SimulationSettings) -> Result<Self, PricingError> {
        settings.validate()?;
        let simulator = HestonPathSimulator::new(&params)?;
        Ok(Self {
            simulator,
            settings,
        })
    }

    /// Model parameters.
    #[inline]
    pub fn params(&self) -> &HestonParams {
        self.simulator.params()
    }

    /// Simulation settings.
    #[inline]
    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    /// Prices a contract.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the horizon needs more than
    /// [`MAX_STEPS_PER_PATH`](super::config::MAX_STEPS_PER_PATH) path points,
    /// and `NumericalInstability` if the time step makes the variance scheme
    /// singular. All checks run before any path is simulated.
    pub fn price(&self, contract: &ContractSpec) -> Result<f64, PricingError> {
        Ok(self.price_with_statistics(contract)?.price)
    }

    /// Prices a contract and reports the standard error.
    ///
    /// # Errors
    ///
    /// See [`MonteCarloEngine::price`].
    pub fn price_with_statistics(
        &self,
        contract: &ContractSpec,
    ) -> Result<PricingResult, PricingError> {
        let plan = self.plan(contract)?;
        let n_paths = self.settings.n_paths();
        let _span = debug_span!(
            "mc_price",
            style = contract.style().name(),
            n_paths,
            n_steps = plan.num_steps
        )
        .entered();

        let acc = (0..n_paths)
            .into_par_iter()
            .fold(PayoffAccumulator::new, |mut acc, index| {
                acc.add(plan.path_payoff(&self.simulator, index));
                acc
            })
            .reduce(PayoffAccumulator::new, PayoffAccumulator::merged);

        let result = plan.finish(&acc);
        debug!(
            price = result.price,
            std_error = result.std_error,
            "Monte Carlo price"
        );
        Ok(result)
    }

    /// Single-threaded reference pricing on the same per-path streams.
    ///
    /// Agrees with [`MonteCarloEngine::price_with_statistics`] for a fixed
    /// seed up to floating-point summation order.
    ///
    /// # Errors
    ///
    /// See [`MonteCarloEngine::price`].
    pub fn price_serial(&self, contract: &ContractSpec) -> Result<PricingResult, PricingError> {
        let plan = self.plan(contract)?;
        let mut acc = PayoffAccumulator::new();
        for index in 0..self.settings.n_paths() {
            acc.add(plan.path_payoff(&self.simulator, index));
        }
        Ok(plan.finish(&acc))
    }

    fn plan(&self, contract: &ContractSpec) -> Result<PricingPlan, PricingError> {
        let maturity = contract.maturity();
        if !maturity.is_finite() || maturity <= 0.0 {
            return Err(PricingError::invalid(format!(
                "maturity must be positive, got {}",
                maturity
            )));
        }

        let (num_steps, dt) = self.settings.discretise(maturity)?;
        self.simulator.check_discretisation(num_steps, dt)?;

        let params = self.simulator.params();
        let discount = (-params.rate * maturity).exp();
        let parity_shift =
            if contract.style().is_path_dependent() || contract.option_type().is_call() {
                0.0
            } else {
                contract.strike() * discount - params.spot
            };

        let base_seed = self.settings.seed().unwrap_or_else(entropy_seed);
        debug!(base_seed, num_steps, dt, "Monte Carlo plan");

        Ok(PricingPlan {
            payoff: Payoff::for_contract(contract, self.settings.steps_per_year(), num_steps),
            num_steps,
            dt,
            base_seed,
            discount,
            parity_shift,
        })
    }
}
