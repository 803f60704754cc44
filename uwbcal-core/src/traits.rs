//! Core traits for range correction
//!
//! A corrector maps one raw reading of one anchor to a corrected distance.

use crate::anchor::AnchorIndex;
use crate::regression::Model;

/// Maps raw anchor distances to corrected distances
pub trait RangeCorrector {
    /// Model this corrector applies
    fn model(&self) -> Model;

    /// Corrected distance (cm) for a raw reading (cm) of `anchor`
    fn correct(&self, raw_cm: f32, anchor: AnchorIndex) -> f32;

    /// Correct one reading per anchor, in anchor order
    fn correct_all(&self, raw_cm: [f32; 3]) -> [f32; 3] {
        let [a1, a2, a3] = raw_cm;
        [
            self.correct(a1, AnchorIndex::A1),
            self.correct(a2, AnchorIndex::A2),
            self.correct(a3, AnchorIndex::A3),
        ]
    }
}

impl<T: RangeCorrector + ?Sized> RangeCorrector for &T {
    fn model(&self) -> Model {
        (**self).model()
    }

    fn correct(&self, raw_cm: f32, anchor: AnchorIndex) -> f32 {
        (**self).correct(raw_cm, anchor)
    }
}
