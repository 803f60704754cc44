//! Frame calibrator
//!
//! The tag ranges against all three anchors every cycle and forwards one
//! corrected distance per anchor to the positioning solver and telemetry.
//! [`Calibrator`] wraps that cycle: it holds the coefficient table and the
//! configured model, and corrects a whole [`RangingFrame`] at once.
//!
//! Model choice is configuration, not code. The engine itself exposes every
//! model; [`CalibrationConfig`] picks the one used on the live path.
//!
//! ```
//! use uwbcal_core::{Calibrator, CalibrationConfig, Model, RangingFrame};
//!
//! let calibrator = Calibrator::builtin(CalibrationConfig::with_model(Model::RawLinear));
//! let frame = RangingFrame::new([Some(30.0), None, Some(4200.0)]);
//! let corrected = calibrator.correct_frame(&frame);
//!
//! assert!(corrected.get(0).is_some());
//! assert!(corrected.get(1).is_none());
//! assert!(corrected.get(2).map_or(false, |r| r.saturated));
//! ```

use heapless::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::anchor::AnchorIndex;
use crate::bucket::{classify, DistanceBucket};
use crate::coefficients::{CoefficientTable, BUILTIN_TABLE};
use crate::constants::ANCHOR_COUNT;
use crate::errors::CalibrationResult;
use crate::regression::{Model, ModelEvaluator};
use crate::traits::RangeCorrector;

/// Runtime calibration settings
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct CalibrationConfig {
    /// Model applied on the live path
    pub model: Model,

    /// Drop saturated readings from corrected frames instead of reporting 3000
    pub drop_saturated: bool,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            model: Model::BiasCorrectedLinear,
            drop_saturated: false,
        }
    }
}

impl CalibrationConfig {
    /// Default settings with a specific model
    pub fn with_model(model: Model) -> Self {
        Self { model, ..Self::default() }
    }
}

/// Raw readings from one ranging cycle, `None` where an anchor was not heard
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RangingFrame {
    /// Raw distance (cm) per anchor index
    pub raw_cm: [Option<f32>; ANCHOR_COUNT],
}

impl RangingFrame {
    /// Frame from per-anchor readings
    pub fn new(raw_cm: [Option<f32>; ANCHOR_COUNT]) -> Self {
        Self { raw_cm }
    }

    /// Set the reading for one anchor
    pub fn set(&mut self, anchor: AnchorIndex, raw_cm: f32) {
        self.raw_cm[anchor.as_usize()] = Some(raw_cm);
    }
}

/// One corrected reading
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CorrectedRange {
    /// Anchor the reading came from
    pub anchor: AnchorIndex,
    /// Raw distance (cm)
    pub raw_cm: f32,
    /// Corrected distance (cm)
    pub corrected_cm: f32,
    /// Bucket chosen from the raw distance
    pub bucket: DistanceBucket,
    /// Raw distance was past the calibrated range
    pub saturated: bool,
}

/// Corrected readings for one cycle
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CorrectedFrame {
    /// Corrected reading per anchor index
    pub ranges: [Option<CorrectedRange>; ANCHOR_COUNT],
}

impl CorrectedFrame {
    /// Reading for an anchor index, `None` if missing or out of bounds
    pub fn get(&self, index: usize) -> Option<&CorrectedRange> {
        self.ranges.get(index).and_then(Option::as_ref)
    }

    /// Present readings in anchor order
    pub fn present(&self) -> Vec<CorrectedRange, ANCHOR_COUNT> {
        self.ranges.iter().flatten().copied().collect()
    }

    /// Corrected distances (cm) in anchor order
    pub fn distances_cm(&self) -> [Option<f32>; ANCHOR_COUNT] {
        self.ranges.map(|r| r.map(|r| r.corrected_cm))
    }
}

/// Corrects raw readings with one configured model
#[derive(Debug, Clone, Copy)]
pub struct Calibrator<'a> {
    evaluator: ModelEvaluator<'a>,
    config: CalibrationConfig,
}

impl<'a> Calibrator<'a> {
    /// Calibrator over a loaded table
    pub fn new(table: &'a CoefficientTable, config: CalibrationConfig) -> Self {
        Self {
            evaluator: ModelEvaluator::new(table, config.model),
            config,
        }
    }

    /// Calibrator over the built-in table
    pub fn builtin(config: CalibrationConfig) -> Calibrator<'static> {
        Calibrator::new(&BUILTIN_TABLE, config)
    }

    /// Active settings
    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Correct one reading of a validated anchor
    pub fn correct_range(&self, raw_cm: f32, anchor: AnchorIndex) -> CorrectedRange {
        let bucket = classify(raw_cm);
        let corrected_cm = self.evaluator.correct(raw_cm, anchor);
        if bucket.is_saturated() {
            log_debug!("{}: raw {} cm past calibrated range", anchor, raw_cm);
        }
        CorrectedRange {
            anchor,
            raw_cm,
            corrected_cm,
            bucket,
            saturated: bucket.is_saturated(),
        }
    }

    /// Correct one reading given a raw anchor index from the driver
    pub fn correct_one(&self, raw_cm: f32, anchor_index: u8) -> CalibrationResult<CorrectedRange> {
        let anchor = AnchorIndex::new(anchor_index).map_err(|e| {
            log_warn!("Dropping reading {} cm: {}", raw_cm, e);
            e
        })?;
        Ok(self.correct_range(raw_cm, anchor))
    }

    /// Correct every present reading of a frame
    pub fn correct_frame(&self, frame: &RangingFrame) -> CorrectedFrame {
        let mut out = CorrectedFrame::default();
        for anchor in AnchorIndex::ALL {
            let Some(raw_cm) = frame.raw_cm[anchor.as_usize()] else {
                continue;
            };
            let range = self.correct_range(raw_cm, anchor);
            if range.saturated && self.config.drop_saturated {
                continue;
            }
            out.ranges[anchor.as_usize()] = Some(range);
        }
        out
    }
}

impl RangeCorrector for Calibrator<'_> {
    fn model(&self) -> Model {
        self.config.model
    }

    fn correct(&self, raw_cm: f32, anchor: AnchorIndex) -> f32 {
        self.evaluator.correct(raw_cm, anchor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SATURATION_CM;
    use crate::errors::CalibrationError;
    use crate::regression::{evaluate_model1, evaluate_model3};

    #[test]
    fn default_config_uses_bias_corrected_model() {
        let config = CalibrationConfig::default();
        assert_eq!(config.model, Model::BiasCorrectedLinear);
        assert!(!config.drop_saturated);
    }

    #[test]
    fn corrects_each_present_anchor() {
        let calibrator = Calibrator::builtin(CalibrationConfig::with_model(Model::RawLinear));
        let frame = RangingFrame::new([Some(30.0), Some(250.0), None]);
        let out = calibrator.correct_frame(&frame);

        assert_eq!(out.get(0).map(|r| r.corrected_cm), Some(evaluate_model1(30.0, AnchorIndex::A1)));
        assert_eq!(out.get(1).map(|r| r.bucket), Some(DistanceBucket::Medium));
        assert!(out.get(2).is_none());
        assert_eq!(out.present().len(), 2);
    }

    #[test]
    fn saturated_readings_are_flagged() {
        let calibrator = Calibrator::builtin(CalibrationConfig::default());
        let range = calibrator.correct_range(3200.0, AnchorIndex::A2);
        assert!(range.saturated);
        assert_eq!(range.corrected_cm, SATURATION_CM);
    }

    #[test]
    fn saturated_readings_can_be_dropped() {
        let config = CalibrationConfig {
            drop_saturated: true,
            ..CalibrationConfig::default()
        };
        let calibrator = Calibrator::builtin(config);
        let mut frame = RangingFrame::default();
        frame.set(AnchorIndex::A1, 120.0);
        frame.set(AnchorIndex::A3, 3500.0);

        let out = calibrator.correct_frame(&frame);
        assert_eq!(out.distances_cm()[0], Some(evaluate_model3(120.0, AnchorIndex::A1)));
        assert_eq!(out.distances_cm()[2], None);
    }

    #[test]
    fn invalid_driver_index_is_rejected() {
        let calibrator = Calibrator::builtin(CalibrationConfig::default());
        assert!(matches!(
            calibrator.correct_one(100.0, 3),
            Err(CalibrationError::InvalidAnchor { value: 3, .. })
        ));
        assert!(calibrator.correct_one(100.0, 2).is_ok());
    }

    #[test]
    fn loaded_table_is_used() {
        let table = CoefficientTable::saturated();
        let calibrator = Calibrator::new(&table, CalibrationConfig::with_model(Model::RawLinear));
        assert_eq!(calibrator.correct(42.0, AnchorIndex::A1), SATURATION_CM);
    }
}
