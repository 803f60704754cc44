//! Anchor identity
//!
//! The three anchors have two encodings:
//! - [`AnchorIndex`]: zero-based, 0-2, used to index coefficient tables
//! - [`AnchorId`]: one-based, 1-3, used to parameterize the bias curves
//!
//! They are separate types so one cannot be passed where the other is
//! expected. [`AnchorIndex::id`] and [`AnchorId::index`] are the only
//! conversions (`index = id - 1`).

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::ANCHOR_COUNT;
use crate::errors::{CalibrationError, CalibrationResult};

/// Zero-based anchor index (0, 1 or 2)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(try_from = "u8", into = "u8"))]
pub struct AnchorIndex(u8);

/// One-based anchor id (1, 2 or 3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(try_from = "u8", into = "u8"))]
pub struct AnchorId(u8);

impl AnchorIndex {
    /// First anchor (A1)
    pub const A1: Self = Self(0);
    /// Second anchor (A2)
    pub const A2: Self = Self(1);
    /// Third anchor (A3)
    pub const A3: Self = Self(2);

    /// All anchors in table order
    pub const ALL: [Self; ANCHOR_COUNT] = [Self::A1, Self::A2, Self::A3];

    /// Validate a zero-based index
    pub fn new(index: u8) -> CalibrationResult<Self> {
        if (index as usize) < ANCHOR_COUNT {
            Ok(Self(index))
        } else {
            Err(CalibrationError::InvalidAnchor {
                value: index,
                expected: "index 0-2",
            })
        }
    }

    /// Raw index value
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Index for table access
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// Convert to the one-based id (`id = index + 1`)
    pub const fn id(self) -> AnchorId {
        AnchorId(self.0 + 1)
    }
}

impl AnchorId {
    /// First anchor (A1), owner of the base bias curve
    pub const A1: Self = Self(1);
    /// Second anchor (A2)
    pub const A2: Self = Self(2);
    /// Third anchor (A3)
    pub const A3: Self = Self(3);

    /// Validate a one-based id
    pub fn new(id: u8) -> CalibrationResult<Self> {
        if (1..=ANCHOR_COUNT as u8).contains(&id) {
            Ok(Self(id))
        } else {
            Err(CalibrationError::InvalidAnchor {
                value: id,
                expected: "id 1-3",
            })
        }
    }

    /// Raw id value
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Convert to the zero-based index (`index = id - 1`)
    pub const fn index(self) -> AnchorIndex {
        AnchorIndex(self.0 - 1)
    }
}

impl TryFrom<u8> for AnchorIndex {
    type Error = CalibrationError;

    fn try_from(index: u8) -> CalibrationResult<Self> {
        Self::new(index)
    }
}

impl TryFrom<u8> for AnchorId {
    type Error = CalibrationError;

    fn try_from(id: u8) -> CalibrationResult<Self> {
        Self::new(id)
    }
}

impl From<AnchorIndex> for u8 {
    fn from(index: AnchorIndex) -> u8 {
        index.0
    }
}

impl From<AnchorId> for u8 {
    fn from(id: AnchorId) -> u8 {
        id.0
    }
}

impl From<AnchorIndex> for AnchorId {
    fn from(index: AnchorIndex) -> Self {
        index.id()
    }
}

impl From<AnchorId> for AnchorIndex {
    fn from(id: AnchorId) -> Self {
        id.index()
    }
}

impl fmt::Display for AnchorIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A{}", self.0 + 1)
    }
}

impl fmt::Display for AnchorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_bounds() {
        assert!(AnchorIndex::new(0).is_ok());
        assert!(AnchorIndex::new(2).is_ok());
        assert!(matches!(
            AnchorIndex::new(3),
            Err(CalibrationError::InvalidAnchor { value: 3, .. })
        ));
    }

    #[test]
    fn id_bounds() {
        assert!(AnchorId::new(0).is_err());
        assert!(AnchorId::new(1).is_ok());
        assert!(AnchorId::new(3).is_ok());
        assert!(AnchorId::new(4).is_err());
    }

    #[test]
    fn encodings_round_trip() {
        for index in AnchorIndex::ALL {
            assert_eq!(index.id().get(), index.get() + 1);
            assert_eq!(index.id().index(), index);
        }
        assert_eq!(AnchorId::A3.index(), AnchorIndex::A3);
    }

    #[test]
    fn display_uses_anchor_names() {
        assert_eq!(AnchorIndex::A1.to_string(), "A1");
        assert_eq!(AnchorId::A2.to_string(), "A2");
    }
}
