//! # infra_config
//!
//! Runtime settings for the Heston pricing workspace.
//!
//! Settings are layered, later sources overriding earlier ones:
//! 1. Built-in defaults
//! 2. `config/heston.toml` (or an explicit path), if present
//! 3. Environment variables prefixed with `HESTON__`, sections separated by `__`
//!    (for example `HESTON__SIMULATION__PATHS=50000`)
//!
//! ## Architecture Position
//!
//! Part of the **I**nfra layer. Must not depend on **P**ricer crates; the
//! pricing crates translate these plain values into their own configuration
//! types.
//!
//! ## Example
//!
//! ```rust
//! use infra_config::Settings;
//!
//! let settings = Settings::from_toml_str(
//!     r#"
//!     [simulation]
//!     paths = 20000
//!     seed = 7
//!     "#,
//! )
//! .unwrap();
//! assert_eq!(settings.simulation.paths, 20_000);
//! assert_eq!(settings.simulation.seed, Some(7));
//! assert_eq!(settings.quadrature.partitions, 1000);
//! ```

mod error;
mod settings;

pub use error::ConfigError;
pub use settings::{
    CalibrationSection, CliquetSection, QuadratureSection, Settings, SimulationSection,
    DEFAULT_CONFIG_PATH, ENV_PREFIX,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        CalibrationSection, CliquetSection, ConfigError, QuadratureSection, Settings,
        SimulationSection,
    };
}
