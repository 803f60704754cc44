//! Coefficient Table Registry
//!
//! Named, validated tables shared across threads. Tables are immutable once
//! registered; callers get an `Arc` and evaluate against it without holding
//! the registry lock.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

use uwbcal_core::{compare_models, CoefficientTable, ComparisonReport, ReferenceSample, BUILTIN_TABLE};

use crate::asset::load_table;
use crate::{TableError, TableResult};

/// Name the built-in v3.0.1 table is registered under
pub const BUILTIN_NAME: &str = "builtin";

/// Thread-safe registry of named coefficient tables
pub struct TableRegistry {
    tables: RwLock<HashMap<String, Arc<CoefficientTable>>>,
}

impl TableRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
        }
    }

    /// Register a table under `name`
    ///
    /// The table is validated first; names can't be reused.
    pub fn register(&self, name: &str, table: CoefficientTable) -> TableResult<()> {
        table.validate()?;

        let mut tables = self.tables.write()
            .map_err(|_| TableError::Registry("Lock poisoned".to_string()))?;
        if tables.contains_key(name) {
            return Err(TableError::Registry(format!("Table {} already registered", name)));
        }
        tables.insert(name.to_string(), Arc::new(table));

        log::debug!("Registered coefficient table {}", name);
        Ok(())
    }

    /// Load an asset file and register it under `name`
    pub fn load_file(&self, name: &str, path: impl AsRef<Path>) -> TableResult<()> {
        let table = load_table(path)?;
        self.register(name, table)
    }

    /// Get a table by name
    pub fn get(&self, name: &str) -> TableResult<Arc<CoefficientTable>> {
        let tables = self.tables.read()
            .map_err(|_| TableError::Registry("Lock poisoned".to_string()))?;

        tables.get(name)
            .cloned()
            .ok_or_else(|| TableError::NotFound(name.to_string()))
    }

    /// Registered names, sorted
    pub fn names(&self) -> TableResult<Vec<String>> {
        let tables = self.tables.read()
            .map_err(|_| TableError::Registry("Lock poisoned".to_string()))?;

        let mut names: Vec<String> = tables.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    /// Score every model of a registered table against reference samples
    pub fn compare(&self, name: &str, samples: &[ReferenceSample]) -> TableResult<ComparisonReport> {
        let table = self.get(name)?;
        Ok(compare_models(&table, samples)?)
    }

    /// Register the built-in table
    pub fn load_defaults(&self) -> TableResult<()> {
        self.register(BUILTIN_NAME, BUILTIN_TABLE.clone())
    }
}

impl Default for TableRegistry {
    fn default() -> Self {
        Self::new()
    }
}

lazy_static::lazy_static! {
    /// Global table registry with the built-in table loaded
    pub static ref GLOBAL_REGISTRY: TableRegistry = {
        let registry = TableRegistry::new();
        // The built-in table always validates
        let _ = registry.load_defaults();
        registry
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use uwbcal_core::{AnchorIndex, CalibrationError, Model};

    #[test]
    fn register_and_retrieve() {
        let registry = TableRegistry::new();
        registry.register("flat", CoefficientTable::saturated()).unwrap();

        let table = registry.get("flat").unwrap();
        assert_eq!(*table, CoefficientTable::saturated());
    }

    #[test]
    fn duplicate_names_rejected() {
        let registry = TableRegistry::new();
        registry.load_defaults().unwrap();
        assert!(matches!(registry.load_defaults(), Err(TableError::Registry(_))));
    }

    #[test]
    fn invalid_tables_rejected() {
        let registry = TableRegistry::new();
        let mut table = BUILTIN_TABLE.clone();
        table.raw_linear[0][0].a = f32::INFINITY;

        let err = registry.register("broken", table).unwrap_err();
        assert!(matches!(err, TableError::Invalid(CalibrationError::NonFiniteCoefficient { .. })));
        assert!(matches!(registry.get("broken"), Err(TableError::NotFound(_))));
    }

    #[test]
    fn global_registry_has_builtin() {
        let table = GLOBAL_REGISTRY.get(BUILTIN_NAME).unwrap();
        assert_eq!(*table, BUILTIN_TABLE);
    }

    #[test]
    fn compare_registered_table() {
        let registry = TableRegistry::new();
        registry.load_defaults().unwrap();

        let samples = [ReferenceSample { raw_cm: 250.0, anchor: AnchorIndex::A2, true_cm: 240.0 }];
        let report = registry.compare(BUILTIN_NAME, &samples).unwrap();
        assert_eq!(report.report(Model::RawLinear).overall.count(), 1);

        assert!(matches!(
            registry.compare(BUILTIN_NAME, &[]),
            Err(TableError::Invalid(CalibrationError::InsufficientData { .. }))
        ));
    }
}
