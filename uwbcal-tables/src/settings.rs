//! Calibrator settings file

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uwbcal_core::{CalibrationConfig, CoefficientTable, Model, BUILTIN_TABLE};

use crate::asset::load_table;
use crate::TableResult;

/// Settings for a gateway-side calibrator
///
/// ```json
/// { "model": "raw_polynomial", "drop_saturated": true, "coefficients": "v3.0.8.json" }
/// ```
///
/// Every field is optional. Without `coefficients` the built-in table is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibratorSettings {
    pub model: Model,
    pub drop_saturated: bool,
    /// Coefficient asset, relative to the settings file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coefficients: Option<PathBuf>,
}

impl Default for CalibratorSettings {
    fn default() -> Self {
        let config = CalibrationConfig::default();
        Self {
            model: config.model,
            drop_saturated: config.drop_saturated,
            coefficients: None,
        }
    }
}

impl CalibratorSettings {
    /// Read settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> TableResult<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Live-path configuration
    pub fn config(&self) -> CalibrationConfig {
        CalibrationConfig {
            model: self.model,
            drop_saturated: self.drop_saturated,
        }
    }

    /// Coefficient table named by these settings
    ///
    /// Relative asset paths resolve against `base_dir`, normally the
    /// directory holding the settings file.
    pub fn table(&self, base_dir: impl AsRef<Path>) -> TableResult<CoefficientTable> {
        match &self.coefficients {
            None => Ok(BUILTIN_TABLE.clone()),
            Some(path) if path.is_absolute() => load_table(path),
            Some(path) => load_table(base_dir.as_ref().join(path)),
        }
    }
}
