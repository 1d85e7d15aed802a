//! Core traits for model calibration.
//!
//! This module defines the abstractions shared between model crates:
//! - Model calibration (`Calibrator` trait)

pub mod calibration;
