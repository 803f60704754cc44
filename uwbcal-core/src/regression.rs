//! Regression evaluator
//!
//! Three independent correction models, all `(raw_cm, anchor) -> cm`:
//!
//! 1. **Raw linear**: `a + b*raw`
//! 2. **Raw polynomial**: `p0 + p1*raw + p2*raw^2`
//! 3. **Bias-corrected linear**: `a + b*x`, where
//!    `x = max(raw - bias(raw, anchor), 5)`
//!
//! Every model picks its coefficient row by classifying the *raw*
//! distance. Model 3 does this too even though its formula runs on the
//! corrected distance.
//!
//! For raw distances of 3000 cm and beyond all three return exactly 3000
//! because the out-of-range rows are zero-slope constants.
//!
//! The free functions use [`BUILTIN_TABLE`]; [`CoefficientTable::evaluate`]
//! and [`ModelEvaluator`] run the same formulas on any table.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::anchor::AnchorIndex;
use crate::bias::estimate_bias;
use crate::bucket::classify;
use crate::coefficients::{CoefficientTable, BUILTIN_TABLE};
use crate::constants::CORRECTED_FLOOR_CM;
use crate::traits::RangeCorrector;

/// Correction model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "snake_case"))]
pub enum Model {
    /// Model 1: linear fit on raw distances
    RawLinear,
    /// Model 2: quadratic fit on raw distances
    RawPolynomial,
    /// Model 3: linear fit on bias-corrected distances
    BiasCorrectedLinear,
}

impl Model {
    /// All models in numbering order
    pub const ALL: [Self; 3] = [Self::RawLinear, Self::RawPolynomial, Self::BiasCorrectedLinear];

    /// Stable name used in assets and configuration
    pub const fn name(self) -> &'static str {
        match self {
            Self::RawLinear => "raw_linear",
            Self::RawPolynomial => "raw_polynomial",
            Self::BiasCorrectedLinear => "bias_corrected_linear",
        }
    }

    /// Model number (1-3)
    pub const fn number(self) -> u8 {
        match self {
            Self::RawLinear => 1,
            Self::RawPolynomial => 2,
            Self::BiasCorrectedLinear => 3,
        }
    }

    /// Model for a number (1-3)
    pub fn from_number(number: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| m.number() == number)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Model {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.name() == s)
            .ok_or("unknown model")
    }
}

/// Bias-corrected input of model 3, floored at 5 cm
///
/// NaN input stays NaN.
pub fn corrected_input(raw_cm: f32, anchor: AnchorIndex) -> f32 {
    let x = raw_cm - estimate_bias(raw_cm, anchor.id());
    if x < CORRECTED_FLOOR_CM {
        log_debug!("{}: corrected input {} floored to {}", anchor, x, CORRECTED_FLOOR_CM);
        CORRECTED_FLOOR_CM
    } else {
        x
    }
}

impl CoefficientTable {
    /// Model 1 on this table
    pub fn evaluate_raw_linear(&self, raw_cm: f32, anchor: AnchorIndex) -> f32 {
        self.raw_linear(classify(raw_cm), anchor).apply(raw_cm)
    }

    /// Model 2 on this table
    pub fn evaluate_raw_polynomial(&self, raw_cm: f32, anchor: AnchorIndex) -> f32 {
        self.raw_polynomial(classify(raw_cm), anchor).apply(raw_cm)
    }

    /// Model 3 on this table
    pub fn evaluate_bias_corrected(&self, raw_cm: f32, anchor: AnchorIndex) -> f32 {
        let x = corrected_input(raw_cm, anchor);
        self.bias_corrected(classify(raw_cm), anchor).apply(x)
    }

    /// Evaluate any model on this table
    pub fn evaluate(&self, model: Model, raw_cm: f32, anchor: AnchorIndex) -> f32 {
        match model {
            Model::RawLinear => self.evaluate_raw_linear(raw_cm, anchor),
            Model::RawPolynomial => self.evaluate_raw_polynomial(raw_cm, anchor),
            Model::BiasCorrectedLinear => self.evaluate_bias_corrected(raw_cm, anchor),
        }
    }
}

/// Model 1 (raw linear) with built-in coefficients
pub fn evaluate_model1(raw_cm: f32, anchor: AnchorIndex) -> f32 {
    BUILTIN_TABLE.evaluate_raw_linear(raw_cm, anchor)
}

/// Model 2 (raw polynomial) with built-in coefficients
pub fn evaluate_model2(raw_cm: f32, anchor: AnchorIndex) -> f32 {
    BUILTIN_TABLE.evaluate_raw_polynomial(raw_cm, anchor)
}

/// Model 3 (bias-corrected linear) with built-in coefficients
pub fn evaluate_model3(raw_cm: f32, anchor: AnchorIndex) -> f32 {
    BUILTIN_TABLE.evaluate_bias_corrected(raw_cm, anchor)
}

/// Any model with built-in coefficients
pub fn evaluate(model: Model, raw_cm: f32, anchor: AnchorIndex) -> f32 {
    BUILTIN_TABLE.evaluate(model, raw_cm, anchor)
}

/// One model bound to one coefficient table
#[derive(Debug, Clone, Copy)]
pub struct ModelEvaluator<'a> {
    table: &'a CoefficientTable,
    model: Model,
}

impl<'a> ModelEvaluator<'a> {
    /// Bind `model` to `table`
    pub fn new(table: &'a CoefficientTable, model: Model) -> Self {
        Self { table, model }
    }

    /// Bind `model` to the built-in table
    pub fn builtin(model: Model) -> ModelEvaluator<'static> {
        ModelEvaluator { table: &BUILTIN_TABLE, model }
    }

    /// Coefficient table in use
    pub fn table(&self) -> &'a CoefficientTable {
        self.table
    }
}

impl RangeCorrector for ModelEvaluator<'_> {
    fn model(&self) -> Model {
        self.model
    }

    fn correct(&self, raw_cm: f32, anchor: AnchorIndex) -> f32 {
        self.table.evaluate(self.model, raw_cm, anchor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SATURATION_CM;

    #[test]
    fn model1_near_field() {
        let y = evaluate_model1(30.0, AnchorIndex::A1);
        assert!((y - (-7.920987 + 0.560629874 * 30.0)).abs() < 1e-4);
        assert!((y - 8.8979).abs() < 1e-3);
    }

    #[test]
    fn model2_medium_range() {
        // bucket 2, anchor A2
        let raw = 250.0_f32;
        let expected = -84.559781 + 1.500325769 * raw + -0.001293928520 * raw * raw;
        assert!((evaluate_model2(raw, AnchorIndex::A2) - expected).abs() < 1e-2);
    }

    #[test]
    fn model2_saturates() {
        for anchor in AnchorIndex::ALL {
            assert_eq!(evaluate_model2(5000.0, anchor), SATURATION_CM);
        }
    }

    #[test]
    fn model3_floors_corrected_input() {
        // bias(30, A1) = 36.89, so 30 - 36.89 is floored to 5
        assert_eq!(corrected_input(30.0, AnchorIndex::A1), 5.0);
        let y = evaluate_model3(30.0, AnchorIndex::A1);
        assert!((y - (14.922785 + 0.688663616 * 5.0)).abs() < 1e-4);
        assert!((y - 18.3661).abs() < 1e-3);
    }

    #[test]
    fn model3_uses_raw_bucket() {
        // 520 cm raw is bucket 3; corrected input (~463 cm) would be bucket 2
        let raw = 520.0_f32;
        let x = corrected_input(raw, AnchorIndex::A1);
        assert!(x < 500.0);
        let expected = 5.973045 + 0.996019882 * x;
        assert!((evaluate_model3(raw, AnchorIndex::A1) - expected).abs() < 1e-3);
    }

    #[test]
    fn model3_converts_index_to_id() {
        // A2 uses the anchor-2 bias curve
        let raw = 800.0_f32;
        let bias = estimate_bias(raw, AnchorIndex::A2.id());
        assert_eq!(corrected_input(raw, AnchorIndex::A2), raw - bias);
    }

    #[test]
    fn all_models_saturate_at_threshold() {
        for model in Model::ALL {
            for anchor in AnchorIndex::ALL {
                assert_eq!(evaluate(model, 3000.0, anchor), SATURATION_CM);
                assert_eq!(evaluate(model, 1.0e9, anchor), SATURATION_CM);
            }
        }
    }

    #[test]
    fn model_names_round_trip() {
        for model in Model::ALL {
            assert_eq!(model.name().parse::<Model>(), Ok(model));
            assert_eq!(Model::from_number(model.number()), Some(model));
        }
        assert!("cubic".parse::<Model>().is_err());
        assert_eq!(Model::from_number(4), None);
    }

    #[test]
    fn evaluator_matches_free_functions() {
        let evaluator = ModelEvaluator::builtin(Model::RawPolynomial);
        assert_eq!(evaluator.model(), Model::RawPolynomial);
        assert_eq!(
            evaluator.correct(420.0, AnchorIndex::A3),
            evaluate_model2(420.0, AnchorIndex::A3)
        );
    }
}
