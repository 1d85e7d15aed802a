//! Monte Carlo simulation settings.
//!
//! This module provides [`SimulationSettings`] and its builder. Settings are
//! immutable once built and are shared read-only by all simulation workers.

use super::error::ConfigError;

/// Maximum number of simulation paths allowed.
pub const MAX_PATHS: usize = 10_000_000;

/// Maximum time-step resolution (steps per year).
pub const MAX_STEPS_PER_YEAR: usize = 10_000;

/// Maximum number of points on one simulated path.
pub const MAX_STEPS_PER_PATH: usize = 1_000_000;

/// Monte Carlo simulation settings.
///
/// Immutable settings specifying path count, time-step resolution and
/// optional seed. Use [`SimulationSettingsBuilder`] or
/// [`SimulationSettings::new`] to construct instances.
///
/// The number of steps of a simulated path is derived from the contract
/// maturity: `ceil(maturity * steps_per_year)`.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::SimulationSettings;
///
/// let settings = SimulationSettings::builder()
///     .n_paths(10_000)
///     .steps_per_year(252)
///     .seed(42)
///     .build()
///     .expect("valid settings");
///
/// assert_eq!(settings.n_paths(), 10_000);
/// assert_eq!(settings.steps_per_year(), 252);
/// assert_eq!(settings.seed(), Some(42));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationSettings {
    /// Number of simulation paths.
    n_paths: usize,
    /// Time steps per unit of time (year).
    steps_per_year: usize,
    /// Optional seed for reproducibility.
    seed: Option<u64>,
}

impl SimulationSettings {
    /// Creates validated settings without a seed.
    ///
    /// # Errors
    ///
    /// See [`SimulationSettings::validate`].
    pub fn new(n_paths: usize, steps_per_year: usize) -> Result<Self, ConfigError> {
        Self::builder()
            .n_paths(n_paths)
            .steps_per_year(steps_per_year)
            .build()
    }

    /// Creates a new settings builder.
    #[inline]
    pub fn builder() -> SimulationSettingsBuilder {
        SimulationSettingsBuilder::default()
    }

    /// Returns the number of simulation paths.
    #[inline]
    pub fn n_paths(&self) -> usize {
        self.n_paths
    }

    /// Returns the number of time steps per year.
    #[inline]
    pub fn steps_per_year(&self) -> usize {
        self.steps_per_year
    }

    /// Returns the optional seed for reproducibility.
    #[inline]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Copy with the given seed.
    #[inline]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - `n_paths` is 0 or greater than 10,000,000
    /// - `steps_per_year` is 0 or greater than 10,000
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_paths == 0 || self.n_paths > MAX_PATHS {
            return Err(ConfigError::InvalidPathCount(self.n_paths));
        }
        if self.steps_per_year == 0 || self.steps_per_year > MAX_STEPS_PER_YEAR {
            return Err(ConfigError::InvalidStepCount(self.steps_per_year));
        }
        Ok(())
    }

    /// Number of path points and time step for a horizon of `maturity` years.
    ///
    /// Returns `(ceil(maturity * steps_per_year), maturity / num_steps)`.
    /// The caller validates that `maturity` is positive.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::HorizonTooLong` if the path would exceed
    /// [`MAX_STEPS_PER_PATH`] points.
    pub fn discretise(&self, maturity: f64) -> Result<(usize, f64), ConfigError> {
        let raw = (maturity * self.steps_per_year as f64).ceil();
        if raw.is_nan() || raw > MAX_STEPS_PER_PATH as f64 {
            return Err(ConfigError::HorizonTooLong {
                maturity,
                steps_per_year: self.steps_per_year,
            });
        }
        let num_steps = (raw as usize).max(1);
        Ok((num_steps, maturity / num_steps as f64))
    }
}

/// Builder for [`SimulationSettings`].
///
/// Provides a fluent API with validation at build time.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::SimulationSettings;
///
/// let settings = SimulationSettings::builder()
///     .n_paths(50_000)
///     .steps_per_year(365)
///     .build()
///     .expect("valid settings");
/// ```
#[derive(Clone, Debug, Default)]
pub struct SimulationSettingsBuilder {
    n_paths: Option<usize>,
    steps_per_year: Option<usize>,
    seed: Option<u64>,
}

impl SimulationSettingsBuilder {
    /// Sets the number of simulation paths.
    ///
    /// # Arguments
    ///
    /// * `n_paths` - Number of paths in [1, 10_000_000]
    #[inline]
    pub fn n_paths(mut self, n_paths: usize) -> Self {
        self.n_paths = Some(n_paths);
        self
    }

    /// Sets the time-step resolution.
    ///
    /// # Arguments
    ///
    /// * `steps_per_year` - Steps per year in [1, 10_000]
    #[inline]
    pub fn steps_per_year(mut self, steps_per_year: usize) -> Self {
        self.steps_per_year = Some(steps_per_year);
        self
    }

    /// Sets the seed for reproducibility.
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets or clears the seed.
    #[inline]
    pub fn maybe_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - `n_paths` not set or invalid
    /// - `steps_per_year` not set or invalid
    pub fn build(self) -> Result<SimulationSettings, ConfigError> {
        let n_paths = self.n_paths.ok_or(ConfigError::InvalidParameter {
            name: "n_paths",
            value: "must be specified".to_string(),
        })?;

        let steps_per_year = self.steps_per_year.ok_or(ConfigError::InvalidParameter {
            name: "steps_per_year",
            value: "must be specified".to_string(),
        })?;

        let settings = SimulationSettings {
            n_paths,
            steps_per_year,
            seed: self.seed,
        };

        settings.validate()?;
        Ok(settings)
    }
}
