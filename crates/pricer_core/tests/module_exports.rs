//! Integration tests for module exports.
//!
//! Verify that all public modules and types are correctly exported
//! and accessible via absolute paths.

/// Test that quadrature is accessible via absolute path.
#[test]
fn test_quadrature_module_exports() {
    use pricer_core::math::quadrature::{simpson, try_simpson, QuadratureConfig};

    let config = QuadratureConfig::new(0.0, 1.0, 10);
    assert!(config.validate().is_ok());

    let area = simpson(|x| x * x, 0.0, 1.0, 10);
    assert!((area - 1.0 / 3.0).abs() < 1e-12);

    let fallible: Result<f64, String> = try_simpson(|x| Ok(2.0 * x), 0.0, 1.0, 4);
    assert!((fallible.unwrap() - 1.0).abs() < 1e-12);
}

/// Test that the minimiser contract is accessible via absolute path.
#[test]
fn test_solvers_module_exports() {
    use pricer_core::math::solvers::{
        LbfgsConfig, LbfgsMinimiser, Minimiser, MinimiserReport, TerminationReason,
    };

    fn run<M: Minimiser>(minimiser: &M) -> MinimiserReport {
        minimiser
            .minimise(|p: &[f64]| (p[0] - 3.0).powi(2), &[0.0])
            .unwrap()
    }

    let report = run(&LbfgsMinimiser::new(
        LbfgsConfig::new(1e-10, 200).with_max_step(1.0),
    ));
    assert!(report.termination.is_converged());
    assert_ne!(report.termination, TerminationReason::MaxIterations);
    assert!((report.params[0] - 3.0).abs() < 1e-5);
}

/// Test that trait module is accessible via absolute path.
#[test]
fn test_traits_module_exports() {
    use pricer_core::traits::calibration::{
        CalibrationConfig, CalibrationOutcome, CalibrationResult, Calibrator,
    };
    use pricer_core::types::error::PricingError;

    struct NoopCalibrator;

    impl Calibrator for NoopCalibrator {
        type Quote = f64;
        type ModelParams = f64;

        fn add_quote(&mut self, _quote: f64) {}

        fn objective_function(&self, _params: &f64) -> f64 {
            0.0
        }

        fn calibrate(
            &mut self,
            config: &CalibrationConfig,
        ) -> Result<CalibrationResult<f64>, PricingError> {
            config.validate()?;
            Ok(CalibrationResult::new(0.0, CalibrationOutcome::Converged, 0.0, 0))
        }

        fn status(&self) -> (CalibrationOutcome, f64) {
            (CalibrationOutcome::NotStarted, 0.0)
        }
    }

    let mut calibrator = NoopCalibrator;
    assert!(calibrator.calibrate_default().is_ok());
    assert!(calibrator
        .calibrate(&CalibrationConfig::new(-1.0, 10))
        .is_err());
}

/// Test that types module is accessible via absolute path.
#[test]
fn test_types_module_exports() {
    use pricer_core::types::{PricingError, SolverError};

    let err: PricingError = SolverError::EmptyParameters.into();
    assert!(err.is_invalid_argument());
}
