//! Numerical building blocks.
//!
//! - [`quadrature`]: composite Simpson integration over truncated domains
//! - [`solvers`]: minimiser contract and the L-BFGS implementation

pub mod quadrature;
pub mod solvers;
