//! # Random Number Generation
//!
//! Seeded standard normal sampling for Monte Carlo simulation.
//!
//! ## Design Rationale
//!
//! - **Reproducibility**: all generators are seeded; the seed is kept for logging
//! - **Independent streams**: every path gets its own generator, derived from
//!   a base seed and the path index, so results do not depend on how paths
//!   are scheduled across threads
//! - **Efficiency**: batch operations fill caller-owned `&mut [f64]` slices
//!
//! ## Usage Example
//!
//! ```rust
//! use pricer_pricing::rng::PricerRng;
//!
//! // Create a seeded RNG for reproducible simulations
//! let mut rng = PricerRng::from_seed(12345);
//! let normal_value = rng.gen_normal();
//!
//! // Per-path stream: same base seed and index, same numbers
//! let mut a = PricerRng::for_path(12345, 7);
//! let mut b = PricerRng::for_path(12345, 7);
//! assert_eq!(a.gen_normal(), b.gen_normal());
//!
//! // Batch generation into a pre-allocated buffer
//! let mut buffer = vec![0.0; 1000];
//! rng.fill_normal(&mut buffer);
//! ```

mod prng;

pub use prng::{entropy_seed, path_seed, PricerRng};
