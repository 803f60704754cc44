//! Coefficient asset parsing and export
//!
//! Both formats end in a validated [`CoefficientTable`]. Parsing goes
//! through `serde_json::Value` first so the shape of the document (object
//! or array) picks the format.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uwbcal_core::coefficients::{Grid, LinearCoefficients, PolynomialCoefficients, BUILTIN_TABLE_VERSION};
use uwbcal_core::constants::{ANCHOR_COUNT, BUCKET_COUNT};
use uwbcal_core::{AnchorIndex, Coefficient, CoefficientTable, DistanceBucket, Model, BUILTIN_TABLE};

use crate::{TableError, TableResult};

/// `a`/`b` grids of a linear model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearGrids {
    pub a: Grid<f32>,
    pub b: Grid<f32>,
}

/// `p0`/`p1`/`p2` grids of the polynomial model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolynomialGrids {
    pub p0: Grid<f32>,
    pub p1: Grid<f32>,
    pub p2: Grid<f32>,
}

/// Nested asset document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestedAsset {
    /// Free-form generation tag, e.g. "v3.0.1"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub raw_linear: LinearGrids,
    pub raw_polynomial: PolynomialGrids,
    pub bias_corrected_linear: LinearGrids,
}

/// One row of a flat asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatRecord {
    pub model: Model,
    pub bucket: u8,
    pub anchor: u8,
    pub coefficient: String,
    pub value: f64,
}

fn split_linear(grid: &Grid<LinearCoefficients>) -> LinearGrids {
    LinearGrids {
        a: grid.map(|row| row.map(|c| c.a)),
        b: grid.map(|row| row.map(|c| c.b)),
    }
}

fn join_linear(grids: &LinearGrids) -> Grid<LinearCoefficients> {
    let mut out = [[LinearCoefficients::SATURATED; ANCHOR_COUNT]; BUCKET_COUNT];
    for (bucket, row) in out.iter_mut().enumerate() {
        for (anchor, cell) in row.iter_mut().enumerate() {
            *cell = LinearCoefficients {
                a: grids.a[bucket][anchor],
                b: grids.b[bucket][anchor],
            };
        }
    }
    out
}

impl NestedAsset {
    /// Nested document for a table
    pub fn from_table(table: &CoefficientTable, version: Option<String>) -> Self {
        let poly = &table.raw_polynomial;
        Self {
            version,
            raw_linear: split_linear(&table.raw_linear),
            raw_polynomial: PolynomialGrids {
                p0: poly.map(|row| row.map(|c| c.p0)),
                p1: poly.map(|row| row.map(|c| c.p1)),
                p2: poly.map(|row| row.map(|c| c.p2)),
            },
            bias_corrected_linear: split_linear(&table.bias_corrected),
        }
    }

    /// Validated table from this document
    pub fn into_table(self) -> TableResult<CoefficientTable> {
        let mut raw_polynomial = [[PolynomialCoefficients::SATURATED; ANCHOR_COUNT]; BUCKET_COUNT];
        for (bucket, row) in raw_polynomial.iter_mut().enumerate() {
            for (anchor, cell) in row.iter_mut().enumerate() {
                *cell = PolynomialCoefficients {
                    p0: self.raw_polynomial.p0[bucket][anchor],
                    p1: self.raw_polynomial.p1[bucket][anchor],
                    p2: self.raw_polynomial.p2[bucket][anchor],
                };
            }
        }

        let table = CoefficientTable {
            raw_linear: join_linear(&self.raw_linear),
            raw_polynomial,
            bias_corrected: join_linear(&self.bias_corrected_linear),
        };
        table.validate()?;
        Ok(table)
    }
}

/// Parse a nested asset
pub fn parse_nested(value: Value) -> TableResult<CoefficientTable> {
    let asset: NestedAsset = serde_json::from_value(value)?;
    if let Some(version) = &asset.version {
        log::info!("Parsed nested coefficient asset {}", version);
    }
    asset.into_table()
}

/// Parse flat records; cells without a record keep the saturation sentinel
pub fn parse_flat(records: &[FlatRecord]) -> TableResult<CoefficientTable> {
    let mut table = CoefficientTable::saturated();
    let mut seen = HashSet::new();

    for record in records {
        let bucket = DistanceBucket::from_index(record.bucket as usize).ok_or(TableError::OutOfBounds {
            field: "bucket",
            value: record.bucket as u64,
        })?;
        let anchor = AnchorIndex::new(record.anchor).map_err(|_| TableError::OutOfBounds {
            field: "anchor",
            value: record.anchor as u64,
        })?;
        let coefficient = Coefficient::from_name(&record.coefficient)
            .filter(|c| Coefficient::for_model(record.model).contains(c))
            .ok_or_else(|| TableError::UnknownCoefficient {
                model: record.model,
                name: record.coefficient.clone(),
            })?;

        if !seen.insert((record.model, bucket, anchor, coefficient)) {
            return Err(TableError::Duplicate {
                model: record.model,
                bucket: record.bucket,
                anchor: record.anchor,
                name: coefficient.name(),
            });
        }
        table.set(record.model, bucket, anchor, coefficient, record.value as f32);
    }

    let expected: usize = Model::ALL
        .iter()
        .map(|&m| Coefficient::for_model(m).len() * (BUCKET_COUNT - 1) * ANCHOR_COUNT)
        .sum();
    let calibrated = seen.iter().filter(|(_, bucket, _, _)| !bucket.is_saturated()).count();
    if calibrated < expected {
        log::warn!(
            "Flat asset defines {} of {} calibrated coefficients; the rest saturate at 3000 cm",
            calibrated,
            expected
        );
    }

    table.validate()?;
    Ok(table)
}

/// Parse either asset format, picked from the document shape
pub fn parse_json(text: &str) -> TableResult<CoefficientTable> {
    let value: Value = serde_json::from_str(text)?;
    match value {
        Value::Array(_) => {
            let records: Vec<FlatRecord> = serde_json::from_value(value)?;
            parse_flat(&records)
        }
        Value::Object(_) => parse_nested(value),
        _ => Err(TableError::Parse(
            "expected an object (nested) or array (flat) document".to_string(),
        )),
    }
}

/// Load and validate an asset file
pub fn load_table(path: impl AsRef<Path>) -> TableResult<CoefficientTable> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let table = parse_json(&text)?;
    log::info!("Loaded coefficient table from {}", path.display());
    Ok(table)
}

/// Nested JSON for a table; `None` exports the built-in table
pub fn export_json(table: Option<&CoefficientTable>) -> TableResult<String> {
    let asset = match table {
        Some(table) => NestedAsset::from_table(table, None),
        None => NestedAsset::from_table(&BUILTIN_TABLE, Some(BUILTIN_TABLE_VERSION.to_string())),
    };
    Ok(serde_json::to_string_pretty(&asset)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uwbcal_core::CalibrationError;

    fn record(model: Model, bucket: u8, anchor: u8, coefficient: &str, value: f64) -> FlatRecord {
        FlatRecord {
            model,
            bucket,
            anchor,
            coefficient: coefficient.to_string(),
            value,
        }
    }

    #[test]
    fn builtin_export_parses_back() {
        let json = export_json(None).unwrap();
        assert!(json.contains("\"version\": \"v3.0.1\""));
        assert_eq!(parse_json(&json).unwrap(), BUILTIN_TABLE);
    }

    #[test]
    fn flat_records_fill_cells() {
        let table = parse_flat(&[
            record(Model::RawLinear, 1, 2, "a", -70.0),
            record(Model::RawLinear, 1, 2, "b", 1.25),
            record(Model::RawPolynomial, 3, 0, "p2", -0.004),
        ])
        .unwrap();

        let cell = table.raw_linear[1][2];
        assert_eq!((cell.a, cell.b), (-70.0, 1.25));
        assert_eq!(table.raw_polynomial[3][0].p2, -0.004);
        // untouched cells saturate
        assert_eq!(table.bias_corrected[0][0], LinearCoefficients::SATURATED);
    }

    #[test]
    fn flat_rejects_duplicates() {
        let err = parse_flat(&[
            record(Model::BiasCorrectedLinear, 0, 0, "a", 1.0),
            record(Model::BiasCorrectedLinear, 0, 0, "a", 2.0),
        ])
        .unwrap_err();
        assert!(matches!(err, TableError::Duplicate { bucket: 0, anchor: 0, name: "a", .. }));
    }

    #[test]
    fn flat_rejects_foreign_coefficient() {
        let err = parse_flat(&[record(Model::RawLinear, 0, 0, "p1", 1.0)]).unwrap_err();
        assert!(matches!(err, TableError::UnknownCoefficient { model: Model::RawLinear, .. }));
    }

    #[test]
    fn flat_rejects_out_of_table_cells() {
        let err = parse_flat(&[record(Model::RawLinear, 6, 0, "a", 1.0)]).unwrap_err();
        assert!(matches!(err, TableError::OutOfBounds { field: "bucket", value: 6 }));

        let err = parse_flat(&[record(Model::RawLinear, 0, 3, "a", 1.0)]).unwrap_err();
        assert!(matches!(err, TableError::OutOfBounds { field: "anchor", value: 3 }));
    }

    #[test]
    fn flat_cannot_break_saturation_row() {
        let err = parse_flat(&[record(Model::RawLinear, 5, 1, "b", 0.5)]).unwrap_err();
        assert!(matches!(
            err,
            TableError::Invalid(CalibrationError::SaturationViolated { model: Model::RawLinear, anchor: 1 })
        ));
    }

    #[test]
    fn scalar_document_is_rejected() {
        assert!(matches!(parse_json("42"), Err(TableError::Parse(_))));
        assert!(matches!(parse_json("{ not json"), Err(TableError::Parse(_))));
    }
}
