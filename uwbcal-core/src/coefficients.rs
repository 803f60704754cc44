//! Coefficient Store
//!
//! ## Layout
//!
//! Every model keeps one coefficient set per (bucket, anchor) pair, stored
//! as a `[bucket][anchor]` grid:
//!
//! ```text
//! model                  | shape            | formula
//! -----------------------|------------------|---------------------------
//! raw_linear             | (a, b)           | y = a + b*x
//! raw_polynomial         | (p0, p1, p2)     | y = p0 + p1*x + p2*x^2
//! bias_corrected_linear  | (a, b)           | y = a + b*x_corrected
//! ```
//!
//! 6 buckets × 3 anchors × 7 coefficients = 126 values.
//!
//! ## Saturation rows
//!
//! Bucket 5 (out of calibrated range) is degenerate in every model:
//! intercepts are 3000 and every slope is zero, so evaluation returns
//! exactly 3000 for any finite input. [`CoefficientTable::validate`]
//! checks this before a loaded table is trusted.
//!
//! ## Built-in asset
//!
//! [`BUILTIN_TABLE`] is the v3.0.1 calibration fit from the ranging
//! campaign. It is a `static`, built at compile time and never written.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::anchor::AnchorIndex;
use crate::bucket::DistanceBucket;
use crate::constants::{ANCHOR_COUNT, BUCKET_COUNT, SATURATION_CM};
use crate::errors::{CalibrationError, CalibrationResult};
use crate::regression::Model;

/// `[bucket][anchor]` grid of per-cell values
pub type Grid<T> = [[T; ANCHOR_COUNT]; BUCKET_COUNT];

/// Version tag of the built-in coefficient asset
pub const BUILTIN_TABLE_VERSION: &str = "v3.0.1";

/// Coefficients of `y = a + b*x`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinearCoefficients {
    /// Intercept (cm)
    pub a: f32,
    /// Slope
    pub b: f32,
}

impl LinearCoefficients {
    /// Constant 3000 for any finite input
    pub const SATURATED: Self = Self { a: SATURATION_CM, b: 0.0 };

    /// Evaluate at `x`
    #[inline]
    pub fn apply(&self, x: f32) -> f32 {
        self.a + self.b * x
    }

    fn is_finite(&self) -> bool {
        self.a.is_finite() && self.b.is_finite()
    }

    fn is_saturated(&self) -> bool {
        self.a == SATURATION_CM && self.b == 0.0
    }
}

/// Coefficients of `y = p0 + p1*x + p2*x^2`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PolynomialCoefficients {
    /// Constant term (cm)
    pub p0: f32,
    /// Linear term
    pub p1: f32,
    /// Quadratic term
    pub p2: f32,
}

impl PolynomialCoefficients {
    /// Constant 3000 for any finite input
    pub const SATURATED: Self = Self { p0: SATURATION_CM, p1: 0.0, p2: 0.0 };

    /// Evaluate at `x`
    ///
    /// `p2*x` is formed before the second multiply so a zero `p2` never
    /// squares a large `x` into infinity.
    #[inline]
    pub fn apply(&self, x: f32) -> f32 {
        self.p0 + self.p1 * x + self.p2 * x * x
    }

    fn is_finite(&self) -> bool {
        self.p0.is_finite() && self.p1.is_finite() && self.p2.is_finite()
    }

    fn is_saturated(&self) -> bool {
        self.p0 == SATURATION_CM && self.p1 == 0.0 && self.p2 == 0.0
    }
}

/// Name of a single coefficient within a model's set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "snake_case"))]
pub enum Coefficient {
    /// Linear intercept
    A,
    /// Linear slope
    B,
    /// Polynomial constant term
    P0,
    /// Polynomial linear term
    P1,
    /// Polynomial quadratic term
    P2,
}

impl Coefficient {
    /// Coefficients used by a model, in formula order
    pub const fn for_model(model: Model) -> &'static [Coefficient] {
        match model {
            Model::RawLinear | Model::BiasCorrectedLinear => &[Self::A, Self::B],
            Model::RawPolynomial => &[Self::P0, Self::P1, Self::P2],
        }
    }

    /// Asset name ("a", "b", "p0", "p1", "p2")
    pub const fn name(self) -> &'static str {
        match self {
            Self::A => "a",
            Self::B => "b",
            Self::P0 => "p0",
            Self::P1 => "p1",
            Self::P2 => "p2",
        }
    }

    /// Parse an asset name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "a" => Some(Self::A),
            "b" => Some(Self::B),
            "p0" => Some(Self::P0),
            "p1" => Some(Self::P1),
            "p2" => Some(Self::P2),
            _ => None,
        }
    }
}

/// Immutable per-model, per-bucket, per-anchor coefficient asset
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CoefficientTable {
    /// Model 1: linear fit on raw distances
    pub raw_linear: Grid<LinearCoefficients>,
    /// Model 2: quadratic fit on raw distances
    pub raw_polynomial: Grid<PolynomialCoefficients>,
    /// Model 3: linear fit on bias-corrected distances
    pub bias_corrected: Grid<LinearCoefficients>,
}

impl CoefficientTable {
    /// Table where every cell is the saturation sentinel
    ///
    /// Starting point for assets that only define some cells.
    pub const fn saturated() -> Self {
        Self {
            raw_linear: [[LinearCoefficients::SATURATED; ANCHOR_COUNT]; BUCKET_COUNT],
            raw_polynomial: [[PolynomialCoefficients::SATURATED; ANCHOR_COUNT]; BUCKET_COUNT],
            bias_corrected: [[LinearCoefficients::SATURATED; ANCHOR_COUNT]; BUCKET_COUNT],
        }
    }

    /// Model 1 coefficients for a cell
    #[inline]
    pub fn raw_linear(&self, bucket: DistanceBucket, anchor: AnchorIndex) -> LinearCoefficients {
        self.raw_linear[bucket.index()][anchor.as_usize()]
    }

    /// Model 2 coefficients for a cell
    #[inline]
    pub fn raw_polynomial(&self, bucket: DistanceBucket, anchor: AnchorIndex) -> PolynomialCoefficients {
        self.raw_polynomial[bucket.index()][anchor.as_usize()]
    }

    /// Model 3 coefficients for a cell
    #[inline]
    pub fn bias_corrected(&self, bucket: DistanceBucket, anchor: AnchorIndex) -> LinearCoefficients {
        self.bias_corrected[bucket.index()][anchor.as_usize()]
    }

    /// Read one named coefficient, `None` if the model has no such coefficient
    pub fn get(
        &self,
        model: Model,
        bucket: DistanceBucket,
        anchor: AnchorIndex,
        coefficient: Coefficient,
    ) -> Option<f32> {
        let (b, a) = (bucket.index(), anchor.as_usize());
        match (model, coefficient) {
            (Model::RawLinear, Coefficient::A) => Some(self.raw_linear[b][a].a),
            (Model::RawLinear, Coefficient::B) => Some(self.raw_linear[b][a].b),
            (Model::RawPolynomial, Coefficient::P0) => Some(self.raw_polynomial[b][a].p0),
            (Model::RawPolynomial, Coefficient::P1) => Some(self.raw_polynomial[b][a].p1),
            (Model::RawPolynomial, Coefficient::P2) => Some(self.raw_polynomial[b][a].p2),
            (Model::BiasCorrectedLinear, Coefficient::A) => Some(self.bias_corrected[b][a].a),
            (Model::BiasCorrectedLinear, Coefficient::B) => Some(self.bias_corrected[b][a].b),
            _ => None,
        }
    }

    /// Write one named coefficient while assembling a table
    ///
    /// Returns `false` if the model has no such coefficient.
    pub fn set(
        &mut self,
        model: Model,
        bucket: DistanceBucket,
        anchor: AnchorIndex,
        coefficient: Coefficient,
        value: f32,
    ) -> bool {
        let (b, a) = (bucket.index(), anchor.as_usize());
        let slot = match (model, coefficient) {
            (Model::RawLinear, Coefficient::A) => &mut self.raw_linear[b][a].a,
            (Model::RawLinear, Coefficient::B) => &mut self.raw_linear[b][a].b,
            (Model::RawPolynomial, Coefficient::P0) => &mut self.raw_polynomial[b][a].p0,
            (Model::RawPolynomial, Coefficient::P1) => &mut self.raw_polynomial[b][a].p1,
            (Model::RawPolynomial, Coefficient::P2) => &mut self.raw_polynomial[b][a].p2,
            (Model::BiasCorrectedLinear, Coefficient::A) => &mut self.bias_corrected[b][a].a,
            (Model::BiasCorrectedLinear, Coefficient::B) => &mut self.bias_corrected[b][a].b,
            _ => return false,
        };
        *slot = value;
        true
    }

    /// Check every coefficient is finite and bucket 5 still saturates
    pub fn validate(&self) -> CalibrationResult<()> {
        for bucket in DistanceBucket::ALL {
            for anchor in AnchorIndex::ALL {
                let cells = [
                    (Model::RawLinear, self.raw_linear(bucket, anchor).is_finite()),
                    (Model::RawPolynomial, self.raw_polynomial(bucket, anchor).is_finite()),
                    (Model::BiasCorrectedLinear, self.bias_corrected(bucket, anchor).is_finite()),
                ];
                if let Some((model, _)) = cells.iter().find(|(_, finite)| !finite) {
                    return Err(CalibrationError::NonFiniteCoefficient {
                        model: *model,
                        bucket: bucket.index() as u8,
                        anchor: anchor.get(),
                    });
                }
            }
        }

        let last = DistanceBucket::OutOfRange;
        for anchor in AnchorIndex::ALL {
            let rows = [
                (Model::RawLinear, self.raw_linear(last, anchor).is_saturated()),
                (Model::RawPolynomial, self.raw_polynomial(last, anchor).is_saturated()),
                (Model::BiasCorrectedLinear, self.bias_corrected(last, anchor).is_saturated()),
            ];
            if let Some((model, _)) = rows.iter().find(|(_, saturated)| !saturated) {
                return Err(CalibrationError::SaturationViolated {
                    model: *model,
                    anchor: anchor.get(),
                });
            }
        }

        Ok(())
    }
}

impl Default for CoefficientTable {
    fn default() -> Self {
        BUILTIN_TABLE.clone()
    }
}

const fn linear_grid(a: &Grid<f32>, b: &Grid<f32>) -> Grid<LinearCoefficients> {
    let mut grid = [[LinearCoefficients::SATURATED; ANCHOR_COUNT]; BUCKET_COUNT];
    let mut bucket = 0;
    while bucket < BUCKET_COUNT {
        let mut anchor = 0;
        while anchor < ANCHOR_COUNT {
            grid[bucket][anchor] = LinearCoefficients {
                a: a[bucket][anchor],
                b: b[bucket][anchor],
            };
            anchor += 1;
        }
        bucket += 1;
    }
    grid
}

const fn polynomial_grid(p0: &Grid<f32>, p1: &Grid<f32>, p2: &Grid<f32>) -> Grid<PolynomialCoefficients> {
    let mut grid = [[PolynomialCoefficients::SATURATED; ANCHOR_COUNT]; BUCKET_COUNT];
    let mut bucket = 0;
    while bucket < BUCKET_COUNT {
        let mut anchor = 0;
        while anchor < ANCHOR_COUNT {
            grid[bucket][anchor] = PolynomialCoefficients {
                p0: p0[bucket][anchor],
                p1: p1[bucket][anchor],
                p2: p2[bucket][anchor],
            };
            anchor += 1;
        }
        bucket += 1;
    }
    grid
}

/// Built-in v3.0.1 calibration, shared process-wide
pub static BUILTIN_TABLE: CoefficientTable = CoefficientTable {
    raw_linear: linear_grid(&LINEAR_A_RAW, &LINEAR_B_RAW),
    raw_polynomial: polynomial_grid(&POLY_P0_RAW, &POLY_P1_RAW, &POLY_P2_RAW),
    bias_corrected: linear_grid(&LINEAR_A_BIAS_CORRECTED, &LINEAR_B_BIAS_CORRECTED),
};

// Model 1, fit on raw distances. Columns are anchors A1, A2, A3.
const LINEAR_A_RAW: Grid<f32> = [
    [-7.920987, -11.788778, -10.975864],      // 10-50 cm
    [-45.320531, -150.276048, -72.250721],    // 50-100 cm
    [-46.127010, -6.897944, -48.541441],      // 100-500 cm
    [-9.863671, -18.451526, 238.863974],      // 500-1000 cm
    [16.207090, -1189.281891, -722.593423],   // 1000-3000 cm
    [3000.0, 3000.0, 3000.0],                 // 3000+ cm
];

const LINEAR_B_RAW: Grid<f32> = [
    [0.560629874, 0.629175295, 0.614821903],
    [1.011238899, 2.015586367, 1.267072780],
    [0.974567451, 0.815575627, 0.979988595],
    [0.928290530, 0.847455072, 0.568337768],
    [0.906326793, 1.528761112, 1.266922277],
    [0.0, 0.0, -0.0],
];

// Model 2, fit on raw distances
const POLY_P0_RAW: Grid<f32> = [
    [0.506960, -22.550835, -4.121911],
    [-269.371748, -56.450537, -798.792456],
    [-30.914491, -84.559781, 79.446354],
    [-1713.639273, 1594.617826, 1095.019806],
    [1971.562486, -1591.815677, -1610.998913],
    [3000.0, 3000.0, 3000.0],
];

const POLY_P1_RAW: Grid<f32> = [
    [0.232764752, 1.015710318, 0.353741242],
    [5.345956243, 0.212203772, 15.067108369],
    [0.838229897, 1.500325769, -0.219436726],
    [6.252989621, -3.821157546, -2.027975940],
    [-1.789529706, 2.002782068, 2.332959723],
    [0.0, 0.0, 0.0],
];

const POLY_P2_RAW: Grid<f32> = [
    [0.002877630304, -0.003227560187, 0.002288546413],
    [-0.020781949043, 0.008649595507, -0.065233037975],
    [0.000271495075, -0.001293928520, 0.002477209871],
    [-0.004048981892, 0.003318121619, 0.001904415423],
    [0.000823687047, -0.000134730616, -0.000303717763],
    [0.0, 0.0, 0.0],
];

// Model 3, fit on bias-corrected distances
const LINEAR_A_BIAS_CORRECTED: Grid<f32> = [
    [14.922785, 19.044369, 16.907343],
    [0.404563, -53.644725, 33.645219],
    [4.479074, 42.143090, 17.636734],
    [5.973045, 32.817672, 254.863918],
    [62.409720, -1041.511129, -605.126993],
    [3000.0, 3000.0, 3000.0],
];

const LINEAR_B_BIAS_CORRECTED: Grid<f32> = [
    [0.688663616, 0.756355616, 0.772887050],
    [1.080779719, 2.419191474, 0.612479014],
    [0.977251735, 0.828020098, 1.006625052],
    [0.996019882, 0.917159169, 0.617758443],
    [0.944525786, 1.631358961, 1.325598606],
    [0.0, 0.0, -0.0],
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_is_valid() {
        assert!(BUILTIN_TABLE.validate().is_ok());
    }

    #[test]
    fn builtin_spot_values() {
        let cell = BUILTIN_TABLE.raw_linear(DistanceBucket::VeryNear, AnchorIndex::A1);
        assert_eq!(cell.a, -7.920987);
        assert_eq!(cell.b, 0.560629874);

        let cell = BUILTIN_TABLE.raw_polynomial(DistanceBucket::Far, AnchorIndex::A2);
        assert_eq!(cell.p0, 1594.617826);

        let cell = BUILTIN_TABLE.bias_corrected(DistanceBucket::VeryNear, AnchorIndex::A1);
        assert_eq!(cell.a, 14.922785);
        assert_eq!(cell.b, 0.688663616);
    }

    #[test]
    fn get_and_set_named_coefficients() {
        let mut table = CoefficientTable::saturated();
        let (bucket, anchor) = (DistanceBucket::Medium, AnchorIndex::A3);

        assert!(table.set(Model::RawPolynomial, bucket, anchor, Coefficient::P2, 0.5));
        assert_eq!(table.get(Model::RawPolynomial, bucket, anchor, Coefficient::P2), Some(0.5));

        // Linear models have no quadratic term
        assert!(!table.set(Model::RawLinear, bucket, anchor, Coefficient::P2, 0.5));
        assert_eq!(table.get(Model::BiasCorrectedLinear, bucket, anchor, Coefficient::P0), None);
    }

    #[test]
    fn validate_rejects_non_finite() {
        let mut table = BUILTIN_TABLE.clone();
        table.bias_corrected[2][1].b = f32::NAN;
        assert_eq!(
            table.validate(),
            Err(CalibrationError::NonFiniteCoefficient {
                model: Model::BiasCorrectedLinear,
                bucket: 2,
                anchor: 1,
            })
        );
    }

    #[test]
    fn validate_rejects_broken_saturation_row() {
        let mut table = BUILTIN_TABLE.clone();
        table.raw_polynomial[5][0].p1 = 0.01;
        assert_eq!(
            table.validate(),
            Err(CalibrationError::SaturationViolated {
                model: Model::RawPolynomial,
                anchor: 0,
            })
        );
    }

    #[test]
    fn coefficient_names() {
        for name in ["a", "b", "p0", "p1", "p2"] {
            assert_eq!(Coefficient::from_name(name).map(Coefficient::name), Some(name));
        }
        assert_eq!(Coefficient::from_name("c"), None);
        assert_eq!(Coefficient::for_model(Model::RawPolynomial).len(), 3);
    }
}
