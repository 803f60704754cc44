//! Piecewise bias estimator
//!
//! Estimates the systematic offset a raw reading carries for a given
//! anchor. The bias-corrected model subtracts it before regression.
//!
//! ## Anchor 1: base curve
//!
//! Segment-relative ramps between fixed breakpoints
//! (10, 15, 25, 50, 100, 200, 500, 1000, 2000, 3000 cm):
//!
//! ```text
//! bias(d) = value_at_breakpoint + slope * (d - breakpoint)
//! ```
//!
//! Below 10 cm the curve is flat at 21 cm. At or past 3000 cm it drops to
//! a fixed -83 cm instead of continuing the last ramp.
//!
//! ## Anchors 2 and 3: base curve plus offset
//!
//! ```text
//! bias_k(d) = base(d) + constant_k + coefficient_k * d
//! ```
//!
//! The offsets are absolute in `d`, not relative to the segment start
//! like the base curve. Breakpoints are 100 and 500 cm.
//!
//! Evaluation is layered: anchors 2 and 3 call [`base_bias`] once and add
//! their offset. No curve refers back to another anchor's total.

use crate::anchor::AnchorId;
use crate::constants::{BASE_BIAS_NEAR_CM, BASE_BIAS_SATURATED_CM};

/// One ramp of the base curve, valid below `upper_cm`
#[derive(Debug, Clone, Copy)]
struct BaseSegment {
    upper_cm: f32,
    breakpoint_cm: f32,
    value_cm: f32,
    slope: f32,
}

/// One segment of an anchor offset, valid below `upper_cm`
#[derive(Debug, Clone, Copy)]
struct OffsetSegment {
    upper_cm: f32,
    constant_cm: f32,
    coefficient: f32,
}

const fn ramp(breakpoint_cm: f32, upper_cm: f32, value_cm: f32, slope: f32) -> BaseSegment {
    BaseSegment { upper_cm, breakpoint_cm, value_cm, slope }
}

/// Breakpoint where the flat near-field segment ends
const BASE_CURVE_START_CM: f32 = 10.0;

/// Breakpoint where the curve saturates
const BASE_CURVE_END_CM: f32 = 3000.0;

const BASE_RAMPS: [BaseSegment; 9] = [
    ramp(10.0, 15.0, 21.0, 0.6),
    ramp(15.0, 25.0, 24.0, 1.095),
    ramp(25.0, 50.0, 34.95, 0.388),
    ramp(50.0, 100.0, 44.65, 0.084),
    ramp(100.0, 200.0, 48.85, 0.0565),
    ramp(200.0, 500.0, 54.50, -0.0153),
    ramp(500.0, 1000.0, 49.90, 0.068),
    ramp(1000.0, 2000.0, 83.90, 0.1046),
    ramp(2000.0, BASE_CURVE_END_CM, 188.50, -0.2715),
];

const ANCHOR2_OFFSET: [OffsetSegment; 3] = [
    OffsetSegment { upper_cm: 100.0, constant_cm: 5.0, coefficient: 0.02 },
    OffsetSegment { upper_cm: 500.0, constant_cm: 7.0, coefficient: 0.015 },
    OffsetSegment { upper_cm: f32::INFINITY, constant_cm: 40.0, coefficient: 0.008 },
];

const ANCHOR3_OFFSET: [OffsetSegment; 3] = [
    OffsetSegment { upper_cm: 100.0, constant_cm: 2.0, coefficient: 0.03 },
    OffsetSegment { upper_cm: 500.0, constant_cm: 15.0, coefficient: 0.02 },
    OffsetSegment { upper_cm: f32::INFINITY, constant_cm: 10.0, coefficient: 0.012 },
];

/// Anchor 1 bias curve at `raw_cm`
///
/// NaN fails every comparison and lands on the saturated constant.
pub fn base_bias(raw_cm: f32) -> f32 {
    if raw_cm < BASE_CURVE_START_CM {
        return BASE_BIAS_NEAR_CM;
    }
    BASE_RAMPS
        .iter()
        .find(|seg| raw_cm < seg.upper_cm)
        .map(|seg| seg.value_cm + (raw_cm - seg.breakpoint_cm) * seg.slope)
        .unwrap_or(BASE_BIAS_SATURATED_CM)
}

/// Offset an anchor adds on top of the base curve (0 for anchor 1)
pub fn anchor_offset(raw_cm: f32, anchor: AnchorId) -> f32 {
    let table = match anchor {
        AnchorId::A1 => return 0.0,
        AnchorId::A2 => &ANCHOR2_OFFSET,
        _ => &ANCHOR3_OFFSET,
    };
    let seg = table
        .iter()
        .find(|seg| raw_cm < seg.upper_cm)
        .unwrap_or(&table[table.len() - 1]);
    seg.constant_cm + raw_cm * seg.coefficient
}

/// Systematic bias (cm) to subtract from a raw reading of `anchor`
///
/// May be negative past the calibrated range.
pub fn estimate_bias(raw_cm: f32, anchor: AnchorId) -> f32 {
    let base = base_bias(raw_cm);
    match anchor {
        AnchorId::A1 => base,
        _ => base + anchor_offset(raw_cm, anchor),
    }
}
