//! Composite Simpson quadrature over finite intervals.
//!
//! Integrals over unbounded domains (Fourier inversion, normal probabilities)
//! are truncated to a finite interval and partitioned into an even number of
//! panels. The truncation bounds and panel count travel together in a
//! [`QuadratureConfig`] so callers can widen them for extreme parameter regimes.
//!
//! # Example
//!
//! ```
//! use pricer_core::math::quadrature::{simpson, QuadratureConfig};
//!
//! // ∫₀¹ x² dx = 1/3 (Simpson is exact for cubics)
//! let value = simpson(|x| x * x, 0.0, 1.0, 10);
//! assert!((value - 1.0 / 3.0).abs() < 1e-14);
//!
//! let config = QuadratureConfig::new(0.0, std::f64::consts::PI, 200);
//! let area = config.integrate(f64::sin);
//! assert!((area - 2.0).abs() < 1e-8);
//! ```

use crate::types::PricingError;

/// Truncated integration domain and panel count for composite Simpson.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuadratureConfig {
    /// Lower integration bound.
    pub lower: f64,
    /// Upper integration bound.
    pub upper: f64,
    /// Number of Simpson panels (rounded up to the next even number).
    pub partitions: usize,
}

impl QuadratureConfig {
    /// Creates a new configuration.
    #[inline]
    pub fn new(lower: f64, upper: f64, partitions: usize) -> Self {
        Self {
            lower,
            upper,
            partitions,
        }
    }

    /// Returns a copy with a different panel count.
    #[inline]
    pub fn with_partitions(mut self, partitions: usize) -> Self {
        self.partitions = partitions;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::InvalidArgument` if the bounds are not finite,
    /// not strictly ordered, or the panel count is zero.
    pub fn validate(&self) -> Result<(), PricingError> {
        if !self.lower.is_finite() || !self.upper.is_finite() {
            return Err(PricingError::invalid(format!(
                "quadrature bounds must be finite, got [{}, {}]",
                self.lower, self.upper
            )));
        }
        if self.lower >= self.upper {
            return Err(PricingError::invalid(format!(
                "quadrature lower bound {} must be below upper bound {}",
                self.lower, self.upper
            )));
        }
        if self.partitions == 0 {
            return Err(PricingError::invalid("quadrature needs at least one partition"));
        }
        Ok(())
    }

    /// Integrates `f` over `[lower, upper]`.
    #[inline]
    pub fn integrate<F: Fn(f64) -> f64>(&self, f: F) -> f64 {
        simpson(f, self.lower, self.upper, self.partitions)
    }

    /// Integrates a fallible integrand over `[lower, upper]`, stopping at the first error.
    #[inline]
    pub fn try_integrate<F, E>(&self, f: F) -> Result<f64, E>
    where
        F: FnMut(f64) -> Result<f64, E>,
    {
        try_simpson(f, self.lower, self.upper, self.partitions)
    }
}

/// Composite Simpson rule for `∫ₐᵇ f(x) dx`.
///
/// `partitions` is rounded up to the next even number (minimum 2). An empty or
/// reversed interval yields the signed integral.
pub fn simpson<F: Fn(f64) -> f64>(f: F, a: f64, b: f64, partitions: usize) -> f64 {
    let result: Result<f64, std::convert::Infallible> = try_simpson(|x| Ok(f(x)), a, b, partitions);
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

/// Composite Simpson rule for an integrand that may fail.
///
/// Evaluation stops at the first error, which is returned unchanged.
pub fn try_simpson<F, E>(mut f: F, a: f64, b: f64, partitions: usize) -> Result<f64, E>
where
    F: FnMut(f64) -> Result<f64, E>,
{
    let n = even_partitions(partitions);
    let h = (b - a) / n as f64;

    let mut sum = f(a)? + f(b)?;
    for k in 1..n {
        let weight = if k % 2 == 1 { 4.0 } else { 2.0 };
        sum += weight * f(a + k as f64 * h)?;
    }

    Ok(sum * h / 3.0)
}

#[inline]
fn even_partitions(partitions: usize) -> usize {
    let n = partitions.max(2);
    n + n % 2
}
