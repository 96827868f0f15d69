//! Measure registry
//!
//! The registry is an explicit value owned by the caller for the duration of
//! a run. Specifications are shared read-only with the evaluators through
//! `Arc`, so one registry can serve many runs and worker threads.

use crate::parser::parse_measures;
use crate::{MeasureSpecification, SpecError, SpecResult};
use indexmap::IndexMap;
use std::sync::Arc;

/// Loaded measure specifications keyed by measure id
#[derive(Debug, Clone, Default)]
pub struct MeasureRegistry {
    measures: IndexMap<String, Arc<MeasureSpecification>>,
    rejected: Vec<SpecError>,
}

impl MeasureRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Load measures from a JSON document
    ///
    /// Measures failing validation are recorded in [`rejected`](Self::rejected)
    /// and do not affect the others.
    pub fn from_json(json: &str) -> SpecResult<Self> {
        let mut registry = Self::new();
        for parsed in parse_measures(json)? {
            match parsed {
                Ok(spec) => {
                    if let Err(err) = registry.insert(spec) {
                        registry.reject(err);
                    }
                }
                Err(err) => registry.reject(err),
            }
        }
        Ok(registry)
    }

    /// Load measures from a JSON file
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> SpecResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| SpecError::Io(e.to_string()))?;
        Self::from_json(&json)
    }

    /// Register a specification, validating it first
    pub fn insert(&mut self, spec: MeasureSpecification) -> SpecResult<()> {
        spec.validate()?;
        if self.measures.contains_key(&spec.id) {
            return Err(SpecError::DuplicateMeasure {
                measure_id: spec.id.clone(),
            });
        }
        self.measures.insert(spec.id.clone(), Arc::new(spec));
        Ok(())
    }

    fn reject(&mut self, err: SpecError) {
        log::warn!("Rejected measure specification: {}", err);
        self.rejected.push(err);
    }

    /// Get a specification by measure id
    pub fn get(&self, measure_id: &str) -> Option<&Arc<MeasureSpecification>> {
        self.measures.get(measure_id)
    }

    pub fn contains(&self, measure_id: &str) -> bool {
        self.measures.contains_key(measure_id)
    }

    /// Measure ids in load order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.measures.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<MeasureSpecification>> {
        self.measures.values()
    }

    pub fn len(&self) -> usize {
        self.measures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measures.is_empty()
    }

    /// Specifications that failed to load
    pub fn rejected(&self) -> &[SpecError] {
        &self.rejected
    }

    /// Why `measure_id` was rejected, if it was
    pub fn rejection_for(&self, measure_id: &str) -> Option<&SpecError> {
        self.rejected
            .iter()
            .find(|err| err.measure_id() == Some(measure_id))
    }
}
