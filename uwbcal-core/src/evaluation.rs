//! Offline model comparison
//!
//! Runs every model over reference measurements (raw reading plus the
//! tape-measured true distance) and reports error statistics, overall and
//! per distance bucket. Used to decide which model goes on the live path
//! and to compare coefficient generations against held-out data.
//!
//! Statistics are running sums, so no sample buffer is needed:
//!
//! ```text
//! error  = corrected - true
//! mean   = Σ error / n
//! MAE    = Σ |error| / n
//! RMSE   = sqrt(Σ error² / n)
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::anchor::AnchorIndex;
use crate::bucket::{classify, DistanceBucket};
use crate::coefficients::CoefficientTable;
use crate::constants::BUCKET_COUNT;
use crate::errors::{CalibrationError, CalibrationResult};
use crate::regression::Model;

/// One reference measurement
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReferenceSample {
    /// Raw distance reported by the ranging hardware (cm)
    pub raw_cm: f32,
    /// Anchor the reading came from
    pub anchor: AnchorIndex,
    /// Measured true distance (cm)
    pub true_cm: f32,
}

/// Running error statistics
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ErrorStats {
    count: u32,
    sum_error: f32,
    sum_abs_error: f32,
    sum_sq_error: f32,
    max_abs_error: f32,
}

impl ErrorStats {
    /// Record one signed error (corrected - true)
    pub fn push(&mut self, error: f32) {
        let abs = libm::fabsf(error);
        self.count += 1;
        self.sum_error += error;
        self.sum_abs_error += abs;
        self.sum_sq_error += error * error;
        if abs > self.max_abs_error {
            self.max_abs_error = abs;
        }
    }

    /// Number of recorded errors
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Mean signed error, `None` when empty
    pub fn mean_error(&self) -> Option<f32> {
        self.mean(self.sum_error)
    }

    /// Mean absolute error, `None` when empty
    pub fn mean_abs_error(&self) -> Option<f32> {
        self.mean(self.sum_abs_error)
    }

    /// Root mean square error, `None` when empty
    pub fn rmse(&self) -> Option<f32> {
        self.mean(self.sum_sq_error).map(libm::sqrtf)
    }

    /// Largest absolute error seen, `None` when empty
    pub fn max_abs_error(&self) -> Option<f32> {
        (self.count > 0).then_some(self.max_abs_error)
    }

    fn mean(&self, sum: f32) -> Option<f32> {
        (self.count > 0).then(|| sum / self.count as f32)
    }
}

/// Statistics for one model
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ModelReport {
    /// Model evaluated
    pub model: Model,
    /// Over all samples
    pub overall: ErrorStats,
    /// Per bucket of the raw distance
    pub per_bucket: [ErrorStats; BUCKET_COUNT],
}

impl ModelReport {
    fn new(model: Model) -> Self {
        Self {
            model,
            overall: ErrorStats::default(),
            per_bucket: [ErrorStats::default(); BUCKET_COUNT],
        }
    }

    /// Statistics of one bucket
    pub fn bucket(&self, bucket: DistanceBucket) -> &ErrorStats {
        &self.per_bucket[bucket.index()]
    }
}

/// Statistics for every model over the same samples
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ComparisonReport {
    /// One report per model, in model order
    pub reports: [ModelReport; 3],
}

impl ComparisonReport {
    /// Report for one model
    pub fn report(&self, model: Model) -> &ModelReport {
        &self.reports[model.number() as usize - 1]
    }

    /// Model with the lowest overall RMSE; ties go to the lower model number
    pub fn best_model(&self) -> Model {
        let mut best = &self.reports[0];
        for report in &self.reports[1..] {
            let (Some(candidate), Some(current)) = (report.overall.rmse(), best.overall.rmse()) else {
                continue;
            };
            if candidate < current {
                best = report;
            }
        }
        best.model
    }
}

/// Run every model of `table` over `samples`
///
/// Saturated readings are included; their error shows how far past the
/// calibrated range the reference data reached.
pub fn compare_models(
    table: &CoefficientTable,
    samples: &[ReferenceSample],
) -> CalibrationResult<ComparisonReport> {
    if samples.is_empty() {
        return Err(CalibrationError::InsufficientData {
            required: 1,
            available: 0,
        });
    }

    let mut reports = Model::ALL.map(ModelReport::new);
    for sample in samples {
        let bucket = classify(sample.raw_cm);
        for report in reports.iter_mut() {
            let error = table.evaluate(report.model, sample.raw_cm, sample.anchor) - sample.true_cm;
            report.overall.push(error);
            report.per_bucket[bucket.index()].push(error);
        }
    }

    log_debug!(
        "Compared {} samples: best model {}",
        samples.len(),
        ComparisonReport { reports }.best_model()
    );
    Ok(ComparisonReport { reports })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coefficients::{LinearCoefficients, BUILTIN_TABLE};

    fn sample(raw_cm: f32, anchor: AnchorIndex, true_cm: f32) -> ReferenceSample {
        ReferenceSample { raw_cm, anchor, true_cm }
    }

    #[test]
    fn stats_on_known_errors() {
        let mut stats = ErrorStats::default();
        for e in [3.0, -4.0] {
            stats.push(e);
        }
        assert_eq!(stats.count(), 2);
        assert_eq!(stats.mean_error(), Some(-0.5));
        assert_eq!(stats.mean_abs_error(), Some(3.5));
        assert_eq!(stats.max_abs_error(), Some(4.0));
        let rmse = stats.rmse().unwrap();
        assert!((rmse - 12.5_f32.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn empty_stats_report_nothing() {
        let stats = ErrorStats::default();
        assert_eq!(stats.mean_error(), None);
        assert_eq!(stats.rmse(), None);
        assert_eq!(stats.max_abs_error(), None);
    }

    #[test]
    fn no_samples_is_an_error() {
        assert_eq!(
            compare_models(&BUILTIN_TABLE, &[]),
            Err(CalibrationError::InsufficientData { required: 1, available: 0 })
        );
    }

    #[test]
    fn best_model_has_lowest_rmse() {
        // Identity fit for model 1, everything else saturated
        let mut table = CoefficientTable::saturated();
        for bucket in 0..BUCKET_COUNT - 1 {
            for anchor in 0..3 {
                table.raw_linear[bucket][anchor] = LinearCoefficients { a: 0.0, b: 1.0 };
            }
        }
        let samples = [
            sample(120.0, AnchorIndex::A1, 120.0),
            sample(640.0, AnchorIndex::A2, 640.0),
            sample(45.0, AnchorIndex::A3, 45.0),
        ];

        let report = compare_models(&table, &samples).unwrap();
        assert_eq!(report.best_model(), Model::RawLinear);
        assert_eq!(report.report(Model::RawLinear).overall.rmse(), Some(0.0));
        assert_eq!(report.report(Model::RawLinear).bucket(DistanceBucket::Far).count(), 1);
        assert_eq!(report.report(Model::RawLinear).bucket(DistanceBucket::OutOfRange).count(), 0);
    }

    #[test]
    fn every_model_sees_every_sample() {
        let samples = [
            sample(30.0, AnchorIndex::A1, 20.0),
            sample(250.0, AnchorIndex::A2, 240.0),
        ];
        let report = compare_models(&BUILTIN_TABLE, &samples).unwrap();
        for model in Model::ALL {
            assert_eq!(report.report(model).model, model);
            assert_eq!(report.report(model).overall.count(), 2);
        }
    }
}
