//! Coefficient Assets for UWBCal
//!
//! ## Overview
//!
//! The calibration engine in `uwbcal-core` ships one coefficient table
//! compiled into the firmware. Offline tooling and gateway-side services
//! need more: they load refits produced by the coefficient-generation
//! scripts, check them before use, and compare generations against each
//! other. This crate does that on `std` targets.
//!
//! ## Asset Formats
//!
//! ### Nested
//!
//! One `[bucket][anchor]` grid per coefficient, mirroring the firmware's
//! array layout:
//!
//! ```json
//! {
//!   "version": "v3.0.1",
//!   "raw_linear":            { "a": [[...]], "b": [[...]] },
//!   "raw_polynomial":        { "p0": [[...]], "p1": [[...]], "p2": [[...]] },
//!   "bias_corrected_linear": { "a": [[...]], "b": [[...]] }
//! }
//! ```
//!
//! ### Flat
//!
//! One record per coefficient, keyed by (model, bucket, anchor, name):
//!
//! ```json
//! [
//!   { "model": "raw_linear", "bucket": 0, "anchor": 0, "coefficient": "a", "value": -7.920987 }
//! ]
//! ```
//!
//! Cells missing from a flat asset keep the saturation sentinel
//! (intercept 3000, slopes 0). Fits usually leave the 3000+ bucket empty,
//! and the sentinel is exactly what that bucket needs.
//!
//! ## Validation
//!
//! Every table is checked with
//! [`CoefficientTable::validate`](uwbcal_core::CoefficientTable::validate)
//! before it is returned or registered: all values finite, bucket 5
//! saturating in every model.
//!
//! ## Usage Example
//!
//! ```rust
//! use uwbcal_tables::{TableRegistry, parse_json, BUILTIN_NAME};
//!
//! let registry = TableRegistry::new();
//! registry.load_defaults()?;
//!
//! let refit = parse_json(r#"[
//!     { "model": "raw_linear", "bucket": 0, "anchor": 0, "coefficient": "a", "value": -6.5 },
//!     { "model": "raw_linear", "bucket": 0, "anchor": 0, "coefficient": "b", "value": 0.58 }
//! ]"#)?;
//! registry.register("v3.0.8", refit)?;
//!
//! assert!(registry.get(BUILTIN_NAME).is_ok());
//! assert_eq!(registry.names()?, vec!["builtin".to_string(), "v3.0.8".to_string()]);
//! # Ok::<(), uwbcal_tables::TableError>(())
//! ```

use uwbcal_core::{CalibrationError, Model};

pub mod asset;
pub mod registry;
pub mod settings;

pub use asset::{export_json, load_table, parse_flat, parse_json, parse_nested, FlatRecord, NestedAsset};
pub use registry::{TableRegistry, BUILTIN_NAME, GLOBAL_REGISTRY};
pub use settings::CalibratorSettings;

/// Result type for asset operations
pub type TableResult<T> = Result<T, TableError>;

/// Asset loading and registry errors
#[derive(Debug, thiserror_no_std::Error)]
pub enum TableError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Failed to parse asset: {0}")]
    Parse(String),

    #[error("Invalid coefficient table: {0}")]
    Invalid(#[from] CalibrationError),

    #[error("{field} {value} out of bounds")]
    OutOfBounds { field: &'static str, value: u64 },

    #[error("Model {model} has no coefficient '{name}'")]
    UnknownCoefficient { model: Model, name: String },

    #[error("Duplicate {model} coefficient '{name}' at bucket {bucket}, anchor index {anchor}")]
    Duplicate {
        model: Model,
        bucket: u8,
        anchor: u8,
        name: &'static str,
    },

    #[error("Table not found: {0}")]
    NotFound(String),

    #[error("Registry error: {0}")]
    Registry(String),
}

impl From<std::io::Error> for TableError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for TableError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
