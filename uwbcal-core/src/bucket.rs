//! Range classifier
//!
//! Splits raw distances into six ordered buckets:
//!
//! ```text
//! bucket | interval (cm)  | label
//! -------|----------------|--------
//!   0    | [10, 50)       | 10-50
//!   1    | [50, 100)      | 50-100
//!   2    | [100, 500)     | 100-500
//!   3    | [500, 1000)    | 500-1k
//!   4    | [1000, 3000)   | 1k-3k
//!   5    | [3000, inf)    | 3k+
//! ```
//!
//! Comparisons are strict less-than against the ascending thresholds, so a
//! distance sitting exactly on a threshold belongs to the higher bucket.
//! Nothing is rejected: negative distances fall into bucket 0 and NaN
//! fails every comparison, ending up in bucket 5.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::{BUCKET_COUNT, BUCKET_THRESHOLDS_CM};

/// Label returned for an index outside 0-5
pub const UNKNOWN_BUCKET_LABEL: &str = "UNK";

/// Distance bucket selecting a row of calibration coefficients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum DistanceBucket {
    /// 10-50 cm
    VeryNear = 0,
    /// 50-100 cm
    Near = 1,
    /// 100-500 cm
    Medium = 2,
    /// 500-1000 cm
    Far = 3,
    /// 1000-3000 cm
    VeryFar = 4,
    /// 3000 cm and beyond, no calibration available
    OutOfRange = 5,
}

impl DistanceBucket {
    /// All buckets in ascending distance order
    pub const ALL: [Self; BUCKET_COUNT] = [
        Self::VeryNear,
        Self::Near,
        Self::Medium,
        Self::Far,
        Self::VeryFar,
        Self::OutOfRange,
    ];

    /// Bucket ordinal (0-5)
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Bucket for an ordinal, `None` past 5
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Human-readable range label
    pub const fn label(self) -> &'static str {
        match self {
            Self::VeryNear => "10-50",
            Self::Near => "50-100",
            Self::Medium => "100-500",
            Self::Far => "500-1k",
            Self::VeryFar => "1k-3k",
            Self::OutOfRange => "3k+",
        }
    }

    /// Exclusive upper bound in cm, `None` for the out-of-range bucket
    pub fn upper_cm(self) -> Option<f32> {
        BUCKET_THRESHOLDS_CM.get(self.index()).copied()
    }

    /// Whether coefficients in this bucket are the saturation sentinel
    pub const fn is_saturated(self) -> bool {
        matches!(self, Self::OutOfRange)
    }
}

impl fmt::Display for DistanceBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a raw distance (cm) into its bucket
pub fn classify(raw_cm: f32) -> DistanceBucket {
    if raw_cm < BUCKET_THRESHOLDS_CM[0] {
        DistanceBucket::VeryNear
    } else if raw_cm < BUCKET_THRESHOLDS_CM[1] {
        DistanceBucket::Near
    } else if raw_cm < BUCKET_THRESHOLDS_CM[2] {
        DistanceBucket::Medium
    } else if raw_cm < BUCKET_THRESHOLDS_CM[3] {
        DistanceBucket::Far
    } else if raw_cm < BUCKET_THRESHOLDS_CM[4] {
        DistanceBucket::VeryFar
    } else {
        DistanceBucket::OutOfRange
    }
}

/// Label for a bucket ordinal, "UNK" outside 0-5
pub fn bucket_label(index: usize) -> &'static str {
    DistanceBucket::from_index(index)
        .map(DistanceBucket::label)
        .unwrap_or(UNKNOWN_BUCKET_LABEL)
}
