//! Bias Curve Constants
//!
//! Fixed values of the anchor-1 bias curve outside its ramp segments.
//! The ramp breakpoints themselves live next to the curve in
//! [`crate::bias`].

/// Bias below the first breakpoint (d < 10 cm).
pub const BASE_BIAS_NEAR_CM: f32 = 21.0;

/// Bias at or past the saturation distance (d ≥ 3000 cm).
///
/// Deliberately not continuous with the 2000-3000 cm ramp: past the
/// calibrated range the curve falls back to a fixed negative offset.
pub const BASE_BIAS_SATURATED_CM: f32 = -83.0;
