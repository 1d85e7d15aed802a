//! Settings and configuration structures.

use std::path::Path;

use crate::error::ConfigError;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Settings file consulted by [`Settings::load`], without extension.
pub const DEFAULT_CONFIG_PATH: &str = "config/heston";

/// Prefix of environment variable overrides.
pub const ENV_PREFIX: &str = "HESTON";

/// Main application settings.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Settings {
    /// Fourier inversion quadrature for the characteristic formula
    #[serde(default)]
    pub quadrature: QuadratureSection,
    /// Monte Carlo defaults
    #[serde(default)]
    pub simulation: SimulationSection,
    /// Calibration defaults
    #[serde(default)]
    pub calibration: CalibrationSection,
    /// Normal integrals used by the Cliquet closed form
    #[serde(default)]
    pub cliquet: CliquetSection,
}

impl Settings {
    /// Load settings from the default file and environment variables.
    ///
    /// Configuration is loaded in the following order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. `config/heston.{toml,yaml,json,...}`, if present
    /// 3. Environment variables prefixed with `HESTON__`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be parsed or a value fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name(DEFAULT_CONFIG_PATH).required(false));
        Self::from_builder(builder, ENV_PREFIX)
    }

    /// Load settings from an explicit file, then environment variables.
    ///
    /// Unlike [`Settings::load`], the file must exist.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing or malformed, or a value
    /// fails validation.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder =
            Config::builder().add_source(File::from(path.as_ref().to_path_buf()).required(true));
        Self::from_builder(builder, ENV_PREFIX)
    }

    /// Parse settings from a TOML document, without consulting the environment.
    ///
    /// Missing sections and keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Toml` for malformed input and
    /// `ConfigError::InvalidValue` if a value fails validation.
    pub fn from_toml_str(document: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(document)?;
        settings.validate()?;
        Ok(settings)
    }

    fn from_builder(
        builder: ConfigBuilder<DefaultState>,
        env_prefix: &str,
    ) -> Result<Self, ConfigError> {
        let config = builder
            .add_source(
                Environment::with_prefix(env_prefix)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        debug!(
            paths = settings.simulation.paths,
            steps_per_year = settings.simulation.steps_per_year,
            partitions = settings.quadrature.partitions,
            "settings loaded"
        );
        Ok(settings)
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.quadrature.validate()?;
        self.simulation.validate()?;
        self.calibration.validate()?;
        self.cliquet.validate()
    }
}

/// Fourier inversion quadrature settings.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct QuadratureSection {
    /// Lower integration bound (strictly positive, the integrand is singular at 0)
    #[serde(default = "default_quadrature_lower")]
    pub lower: f64,
    /// Upper truncation of the integration domain
    #[serde(default = "default_quadrature_upper")]
    pub upper: f64,
    /// Number of Simpson partitions
    #[serde(default = "default_quadrature_partitions")]
    pub partitions: usize,
}

impl Default for QuadratureSection {
    fn default() -> Self {
        Self {
            lower: default_quadrature_lower(),
            upper: default_quadrature_upper(),
            partitions: default_quadrature_partitions(),
        }
    }
}

impl QuadratureSection {
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.lower.is_finite() || self.lower <= 0.0 {
            return Err(ConfigError::invalid(
                "quadrature.lower",
                format!("must be positive, got {}", self.lower),
            ));
        }
        if !self.upper.is_finite() || self.upper <= self.lower {
            return Err(ConfigError::invalid(
                "quadrature.upper",
                format!("must exceed quadrature.lower, got {}", self.upper),
            ));
        }
        if self.partitions == 0 {
            return Err(ConfigError::invalid("quadrature.partitions", "must be positive"));
        }
        Ok(())
    }
}

fn default_quadrature_lower() -> f64 {
    1e-5
}

fn default_quadrature_upper() -> f64 {
    100.0
}

fn default_quadrature_partitions() -> usize {
    1000
}

/// Monte Carlo settings.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct SimulationSection {
    /// Number of simulated paths per pricing call
    #[serde(default = "default_paths")]
    pub paths: usize,
    /// Time steps per unit of time (year)
    #[serde(default = "default_steps_per_year")]
    pub steps_per_year: usize,
    /// Base seed; drawn from OS entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            paths: default_paths(),
            steps_per_year: default_steps_per_year(),
            seed: None,
        }
    }
}

impl SimulationSection {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.paths == 0 {
            return Err(ConfigError::invalid("simulation.paths", "must be positive"));
        }
        if self.steps_per_year == 0 {
            return Err(ConfigError::invalid(
                "simulation.steps_per_year",
                "must be positive",
            ));
        }
        Ok(())
    }
}

fn default_paths() -> usize {
    10_000
}

fn default_steps_per_year() -> usize {
    100
}

/// Calibration settings.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct CalibrationSection {
    /// Shared gradient, function and step tolerance
    #[serde(default = "default_accuracy")]
    pub accuracy: f64,
    /// Iteration cap of the minimiser
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Largest trial step of the minimiser
    #[serde(default = "default_max_step")]
    pub max_step: f64,
    /// Step of the numerical gradient
    #[serde(default = "default_diff_step")]
    pub diff_step: f64,
}

impl Default for CalibrationSection {
    fn default() -> Self {
        Self {
            accuracy: default_accuracy(),
            max_iterations: default_max_iterations(),
            max_step: default_max_step(),
            diff_step: default_diff_step(),
        }
    }
}

impl CalibrationSection {
    fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("calibration.accuracy", self.accuracy),
            ("calibration.max_step", self.max_step),
            ("calibration.diff_step", self.diff_step),
        ];
        for (key, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::invalid(
                    key,
                    format!("must be positive, got {}", value),
                ));
            }
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::invalid(
                "calibration.max_iterations",
                "must be positive",
            ));
        }
        Ok(())
    }
}

fn default_accuracy() -> f64 {
    1e-3
}

fn default_max_iterations() -> usize {
    1000
}

fn default_max_step() -> f64 {
    0.05
}

fn default_diff_step() -> f64 {
    1e-6
}

/// Normal integral settings for the Cliquet closed form.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct CliquetSection {
    /// Finite lower bound standing in for minus infinity
    #[serde(default = "default_lower_bound")]
    pub lower_bound: f64,
    /// Number of Simpson partitions
    #[serde(default = "default_cliquet_partitions")]
    pub partitions: usize,
}

impl Default for CliquetSection {
    fn default() -> Self {
        Self {
            lower_bound: default_lower_bound(),
            partitions: default_cliquet_partitions(),
        }
    }
}

impl CliquetSection {
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.lower_bound.is_finite() || self.lower_bound >= 0.0 {
            return Err(ConfigError::invalid(
                "cliquet.lower_bound",
                format!("must be negative, got {}", self.lower_bound),
            ));
        }
        if self.partitions == 0 {
            return Err(ConfigError::invalid("cliquet.partitions", "must be positive"));
        }
        Ok(())
    }
}

fn default_lower_bound() -> f64 {
    -12.0
}

fn default_cliquet_partitions() -> usize {
    2000
}
