//! Error Types for Calibration Failures
//!
//! ## Design Philosophy
//!
//! The calibration math itself is total: every finite or non-finite raw
//! distance produces a number, and distances past the calibrated range
//! saturate instead of failing. Errors only appear at the edges of the API:
//!
//! 1. **Anchor identity**: an anchor index outside 0-2 or an anchor id
//!    outside 1-3 is rejected when the typed value is built. Once an
//!    [`AnchorIndex`](crate::AnchorIndex) exists, evaluation cannot fail.
//!
//! 2. **Coefficient assets**: a table loaded from outside the firmware must
//!    be finite everywhere and keep the saturation rows intact.
//!
//! 3. **Offline comparison**: model statistics need at least one sample.
//!
//! Like the rest of the crate, errors are small, `Copy`, and carry no heap
//! data, so they can be returned from interrupt context.
//!
//! ```rust
//! use uwbcal_core::{AnchorIndex, CalibrationError};
//!
//! match AnchorIndex::new(7) {
//!     Ok(_) => unreachable!(),
//!     Err(CalibrationError::InvalidAnchor { value, .. }) => assert_eq!(value, 7),
//!     Err(_) => unreachable!(),
//! }
//! ```

use thiserror_no_std::Error;

use crate::regression::Model;

/// Result type for calibration operations
pub type CalibrationResult<T> = Result<T, CalibrationError>;

/// Calibration errors - kept small for embedded use
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum CalibrationError {
    /// Anchor number outside the table
    #[error("Invalid anchor {value}: expected {expected}")]
    InvalidAnchor {
        /// The rejected anchor number
        value: u8,
        /// Accepted encoding, e.g. "index 0-2"
        expected: &'static str,
    },

    /// A coefficient is NaN or infinite
    #[error("Non-finite {model} coefficient at bucket {bucket}, anchor index {anchor}")]
    NonFiniteCoefficient {
        /// Model owning the coefficient
        model: Model,
        /// Bucket ordinal (0-5)
        bucket: u8,
        /// Zero-based anchor index
        anchor: u8,
    },

    /// The out-of-range bucket no longer evaluates to the saturation value
    #[error("{model} saturation row broken for anchor index {anchor}")]
    SaturationViolated {
        /// Model owning the row
        model: Model,
        /// Zero-based anchor index
        anchor: u8,
    },

    /// Not enough reference samples for a statistic
    #[error("Insufficient data: need {required}, have {available}")]
    InsufficientData {
        /// Minimum number of samples needed
        required: usize,
        /// Number of samples supplied
        available: usize,
    },
}

#[cfg(feature = "defmt")]
impl defmt::Format for CalibrationError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::InvalidAnchor { value, expected } =>
                defmt::write!(fmt, "Invalid anchor {}: expected {}", value, expected),
            Self::NonFiniteCoefficient { model, bucket, anchor } =>
                defmt::write!(fmt, "Non-finite {} coefficient [{}][{}]", model.name(), bucket, anchor),
            Self::SaturationViolated { model, anchor } =>
                defmt::write!(fmt, "{} saturation row broken [{}]", model.name(), anchor),
            Self::InsufficientData { required, available } =>
                defmt::write!(fmt, "Need {} samples, have {}", required, available),
        }
    }
}
