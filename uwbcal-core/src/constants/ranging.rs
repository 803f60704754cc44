//! Ranging Table Shape and Saturation Policy
//!
//! Dimensions of the coefficient asset and the thresholds that split raw
//! distances into calibration buckets.

// ===== TABLE SHAPE =====

/// Number of fixed anchors the tag ranges against.
pub const ANCHOR_COUNT: usize = 3;

/// Number of distance buckets, including the out-of-range bucket.
pub const BUCKET_COUNT: usize = 6;

/// Total coefficients across the three models.
///
/// 6 buckets × 3 anchors × (2 linear + 3 polynomial + 2 bias-corrected).
pub const COEFFICIENT_COUNT: usize = BUCKET_COUNT * ANCHOR_COUNT * (2 + 3 + 2);

// ===== BUCKET THRESHOLDS =====

/// Upper bounds (exclusive) of buckets 0 through 4, in centimeters.
///
/// A distance exactly on a threshold belongs to the next bucket up.
/// Anything at or past the last threshold is out of calibrated range.
///
/// Source: ranging campaign at 10-50, 50-100, 100-500, 500-1000 and
/// 1000-3000 cm between tag and anchors.
pub const BUCKET_THRESHOLDS_CM: [f32; BUCKET_COUNT - 1] = [50.0, 100.0, 500.0, 1000.0, 3000.0];

// ===== SATURATION =====

/// Value every model returns for out-of-range distances (cm).
///
/// Signals "no reliable calibration available" to the positioning solver.
pub const SATURATION_CM: f32 = 3000.0;

/// Minimum bias-corrected input for the bias-corrected model (cm).
///
/// The bias estimate can exceed the raw distance at short range, which
/// would feed zero or negative distances into the regression.
pub const CORRECTED_FLOOR_CM: f32 = 5.0;
