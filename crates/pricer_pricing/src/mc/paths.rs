//! Heston path generation for Monte Carlo simulation.
//!
//! This module implements the quadratic (implicit Milstein-type) scheme for
//! the square root of the variance, `Y = √V`, with an Euler step for the
//! asset price.
//!
//! # Scheme
//!
//! With `α = (4κθ − ξ²)/8`, `β = −κ/2`, `γ = ξ/2` and two independent normals
//! `X₁, X₂` per step:
//!
//! ```text
//! ΔZ₁ = √Δt X₁
//! ΔZ₂ = √Δt (ρ X₁ + √(1 − ρ²) X₂)
//! S   ← S + r S Δt + Y S ΔZ₁
//! a   = (Y + γ ΔZ₂) / (2 (1 − β Δt))
//! Y   ← a + √(a² + α Δt / (1 − β Δt))
//! ```
//!
//! starting from `Y₀ = √v₀`. The asset step uses `Y` before it is updated.
//!
//! # Memory Layout
//!
//! A trajectory is a `Vec<f64>` of `num_steps` points where index 0 holds the
//! initial spot; `num_steps - 1` steps of length `Δt` are taken.

use pricer_core::types::PricingError;
use pricer_models::models::HestonParams;

use crate::rng::PricerRng;

/// Heston path simulator.
///
/// Immutable after construction and shared by reference across workers.
///
/// # Examples
///
/// ```rust
/// use pricer_models::models::HestonParams;
/// use pricer_pricing::mc::HestonPathSimulator;
/// use pricer_pricing::rng::PricerRng;
///
/// let params = HestonParams::new(0.1, 100.0, 2.0, 0.06, 0.4, 0.5, 0.04).unwrap();
/// let simulator = HestonPathSimulator::new(&params).unwrap();
///
/// let mut rng = PricerRng::from_seed(42);
/// let path = simulator.generate_path(365, 1.0 / 365.0, &mut rng).unwrap();
/// assert_eq!(path.len(), 365);
/// assert_eq!(path[0], 100.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct HestonPathSimulator {
    params: HestonParams,
    alpha: f64,
    beta: f64,
    gamma: f64,
    rho_complement: f64,
}

impl HestonPathSimulator {
    /// Creates a simulator for the given parameters.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the parameters are invalid or violate the
    /// Feller condition `2κθ > ξ²`.
    pub fn new(params: &HestonParams) -> Result<Self, PricingError> {
        params.validate()?;
        params.ensure_feller()?;

        Ok(Self {
            params: *params,
            alpha: (4.0 * params.kappa * params.theta - params.xi * params.xi) / 8.0,
            beta: -0.5 * params.kappa,
            gamma: 0.5 * params.xi,
            rho_complement: (1.0 - params.rho * params.rho).sqrt(),
        })
    }

    /// Model parameters.
    #[inline]
    pub fn params(&self) -> &HestonParams {
        &self.params
    }

    /// Scheme constants `(α, β, γ)`.
    #[inline]
    pub fn coefficients(&self) -> (f64, f64, f64) {
        (self.alpha, self.beta, self.gamma)
    }

    /// Checks a step count and time step before simulating.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `num_steps == 0` or `dt` is not positive and finite
    /// - `NumericalInstability` if `β Δt == 1`
    pub fn check_discretisation(&self, num_steps: usize, dt: f64) -> Result<(), PricingError> {
        if num_steps == 0 {
            return Err(PricingError::invalid("path must have at least one point"));
        }
        if !dt.is_finite() || dt <= 0.0 {
            return Err(PricingError::invalid(format!(
                "time step must be positive, got {}",
                dt
            )));
        }
        if self.beta * dt == 1.0 {
            return Err(PricingError::NumericalInstability(format!(
                "variance scheme singular: beta * dt = 1 (kappa = {}, dt = {})",
                self.params.kappa, dt
            )));
        }
        Ok(())
    }

    /// Generates one trajectory of `num_steps` points with time step `dt`.
    ///
    /// Consumes `2 (num_steps - 1)` normals from `rng`.
    ///
    /// # Errors
    ///
    /// See [`HestonPathSimulator::check_discretisation`].
    pub fn generate_path(
        &self,
        num_steps: usize,
        dt: f64,
        rng: &mut PricerRng,
    ) -> Result<Vec<f64>, PricingError> {
        self.check_discretisation(num_steps, dt)?;
        Ok(self.simulate(num_steps, dt, rng))
    }

    /// Generates one trajectory from caller-supplied normals.
    ///
    /// `normals` holds `(X₁, X₂)` pairs, step by step, and must have length
    /// `2 (num_steps - 1)`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` on a length mismatch, otherwise see
    /// [`HestonPathSimulator::check_discretisation`].
    pub fn generate_path_from_normals(
        &self,
        num_steps: usize,
        dt: f64,
        normals: &[f64],
    ) -> Result<Vec<f64>, PricingError> {
        self.check_discretisation(num_steps, dt)?;
        let expected = 2 * (num_steps - 1);
        if normals.len() != expected {
            return Err(PricingError::invalid(format!(
                "expected {} normals for {} points, got {}",
                expected,
                num_steps,
                normals.len()
            )));
        }
        let mut path = Vec::with_capacity(num_steps);
        self.evolve(dt, normals, &mut path);
        Ok(path)
    }

    /// Unchecked simulation; the caller has run `check_discretisation`.
    pub(crate) fn simulate(&self, num_steps: usize, dt: f64, rng: &mut PricerRng) -> Vec<f64> {
        let mut normals = vec![0.0; 2 * (num_steps - 1)];
        rng.fill_normal(&mut normals);
        let mut path = Vec::with_capacity(num_steps);
        self.evolve(dt, &normals, &mut path);
        path
    }

    fn evolve(&self, dt: f64, normals: &[f64], path: &mut Vec<f64>) {
        let p = &self.params;
        let sqrt_dt = dt.sqrt();
        let denom = 1.0 - self.beta * dt;
        let variance_shift = self.alpha * dt / denom;

        let mut s = p.spot;
        let mut y = p.v0.sqrt();
        path.push(s);

        for pair in normals.chunks_exact(2) {
            let dz1 = sqrt_dt * pair[0];
            let dz2 = sqrt_dt * (p.rho * pair[0] + self.rho_complement * pair[1]);

            s += p.rate * s * dt + y * s * dz1;
            path.push(s);

            let aux = (y + self.gamma * dz2) / (2.0 * denom);
            y = aux + (aux * aux + variance_shift).sqrt();
        }
    }
}
