//! # Pricer Pricing (Layer 3: Engine)
//!
//! ## Layer 3 Role
//!
//! pricer_pricing is the simulation and orchestration layer:
//! - Seeded per-path random streams
//! - Heston path simulation and Monte Carlo pricing of European, Asian,
//!   lookback and Everest basket contracts
//! - Entry points combining the formula, the Monte Carlo engine and the
//!   calibrator behind one API
//!
//! ## Layer Integration
//!
//! - Layer 1 (pricer_core): error types, quadrature, minimiser contract
//! - Layer 2 (pricer_models): `HestonParams`, contracts, closed forms,
//!   calibrator
//! - Infra (infra_config): runtime settings for [`api::HestonFacade`]
//!
//! ## Usage Example
//!
//! ```rust
//! use pricer_models::instruments::{ContractSpec, OptionType};
//! use pricer_models::models::HestonParams;
//! use pricer_pricing::api::{price, PricingMethod};
//!
//! let params = HestonParams::new(0.1, 100.0, 2.0, 0.06, 0.4, 0.5, 0.04).unwrap();
//! let put = ContractSpec::european(OptionType::Put, 100.0, 1.0).unwrap();
//! let value = price(&params, &put, PricingMethod::Formula).unwrap();
//! assert!(value > 0.0);
//! ```
//!
//! ## Concurrency
//!
//! Monte Carlo paths run on rayon's global pool, sized to the available
//! hardware parallelism unless `RAYON_NUM_THREADS` is set. Calibration is
//! single-threaded.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod api;
pub mod mc;
pub mod rng;

// Re-export commonly used items for convenience
pub use api::{calibrate, price, price_basket, HestonFacade, PricingMethod};
pub use mc::{EverestBasket, MonteCarloEngine, PricingResult, SimulationSettings};
