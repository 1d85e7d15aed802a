//! Monte Carlo pricing under the Heston model.
//!
//! This module provides the simulation infrastructure for pricing contracts
//! whose value has no closed form under Heston dynamics:
//!
//! - Heston path generation with the quadratic variance scheme
//! - European, Asian and lookback payoffs on single-asset trajectories
//! - Everest worst-of baskets over independently simulated assets
//! - Parallel fork-join over paths with compensated accumulation
//!
//! # Architecture
//!
//! ```text
//! MonteCarloEngine / EverestBasket
//! ├── SimulationSettings   (paths, steps per year, seed)
//! ├── HestonPathSimulator  (one per asset)
//! ├── PricerRng            (one stream per path)
//! └── Orchestration
//!     ├── Payoff::evaluate()
//!     └── PayoffAccumulator (fold + reduce)
//! ```
//!
//! # Examples
//!
//! ## European Option Pricing
//!
//! ```rust
//! use pricer_models::instruments::{ContractSpec, OptionType};
//! use pricer_models::models::HestonParams;
//! use pricer_pricing::mc::{MonteCarloEngine, SimulationSettings};
//!
//! let params = HestonParams::new(0.1, 100.0, 2.0, 0.06, 0.4, 0.5, 0.04).unwrap();
//! let settings = SimulationSettings::builder()
//!     .n_paths(2_000)
//!     .steps_per_year(100)
//!     .seed(42)
//!     .build()
//!     .unwrap();
//!
//! let engine = MonteCarloEngine::new(params, settings).unwrap();
//! let call = ContractSpec::european(OptionType::Call, 100.0, 1.0).unwrap();
//! let result = engine.price_with_statistics(&call).unwrap();
//! println!("Price: {:.4} +/- {:.4}", result.price, result.confidence_95());
//! ```
//!
//! ## Asian Option Pricing
//!
//! ```rust
//! use pricer_models::instruments::{ContractSpec, OptionType};
//! use pricer_models::models::HestonParams;
//! use pricer_pricing::mc::{MonteCarloEngine, SimulationSettings};
//!
//! let params = HestonParams::new(0.1, 100.0, 2.0, 0.06, 0.4, 0.5, 0.04).unwrap();
//! let settings = SimulationSettings::new(2_000, 100).unwrap().with_seed(1);
//! let engine = MonteCarloEngine::new(params, settings).unwrap();
//!
//! let asian = ContractSpec::asian(OptionType::Put, 100.0, 1.0, vec![0.25, 0.5, 0.75, 1.0])
//!     .unwrap();
//! let price = engine.price(&asian).unwrap();
//! assert!(price >= 0.0);
//! ```

pub mod accumulator;
pub mod basket;
pub mod config;
pub mod error;
pub mod paths;
pub mod payoff;
pub mod pricer;

// Re-exports for convenient access
pub use accumulator::PayoffAccumulator;
pub use basket::EverestBasket;
pub use config::{
    SimulationSettings, SimulationSettingsBuilder, MAX_PATHS, MAX_STEPS_PER_PATH,
    MAX_STEPS_PER_YEAR,
};
pub use error::ConfigError;
pub use paths::HestonPathSimulator;
pub use payoff::{asian_indices, basket_minimum, Payoff};
pub use pricer::{MonteCarloEngine, PricingResult};
