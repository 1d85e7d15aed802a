//! Option contract definitions.
//!
//! # Types
//!
//! - [`ContractSpec`]: validated strike, maturity, option type and style
//! - [`ContractStyle`]: European, Asian (monitoring dates) or Lookback
//! - [`OptionType`]: Call or Put
//! - [`InstrumentError`]: validation failures
//!
//! # Examples
//!
//! ```
//! use pricer_models::instruments::{ContractSpec, ContractStyle, OptionType};
//!
//! let spec = ContractSpec::new(
//!     OptionType::Call,
//!     100.0,
//!     1.0,
//!     ContractStyle::asian(vec![0.25, 0.5, 0.75, 1.0]),
//! )
//! .unwrap();
//! assert!(spec.style().is_path_dependent());
//! ```

mod contract;
mod error;
mod exercise;
mod payoff;

pub use contract::ContractSpec;
pub use error::InstrumentError;
pub use exercise::ContractStyle;
pub use payoff::OptionType;
