//! Constants for UWBCal Core
//!
//! Centralized numeric values for the calibration engine. Every constant
//! carries its unit in the name.
//!
//! ## Organization
//!
//! - **Ranging**: bucket thresholds, table dimensions, saturation values
//! - **Bias**: fixed values used by the piecewise bias estimator

/// Bucket thresholds, table shape and saturation policy.
pub mod ranging;

/// Fixed values of the piecewise bias curves.
pub mod bias;

pub use ranging::{
    ANCHOR_COUNT, BUCKET_COUNT, BUCKET_THRESHOLDS_CM, COEFFICIENT_COUNT,
    CORRECTED_FLOOR_CM, SATURATION_CM,
};

pub use bias::{BASE_BIAS_NEAR_CM, BASE_BIAS_SATURATED_CM};
