//! Code sets
//!
//! A code set names one clinical concept and lists the codes or code prefixes
//! expressing it, grouped by coding system. Codes are normalized when they
//! are added so that matching only has to normalize the claim side.

use indexmap::IndexMap;
use octofhir_qm_types::{CodeSystem, normalize_code};
use smallvec::SmallVec;

type Codes = SmallVec<[String; 4]>;

/// Named set of `(code system, code or prefix)` entries
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CodeSet {
    name: String,
    codes: IndexMap<CodeSystem, Codes>,
}

impl CodeSet {
    /// Create an empty code set
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            codes: IndexMap::new(),
        }
    }

    /// Add a code, builder style
    pub fn with_code(mut self, system: CodeSystem, code: &str) -> Self {
        self.insert(system, code);
        self
    }

    /// Add several codes of one system, builder style
    pub fn with_codes<'a>(mut self, system: CodeSystem, codes: impl IntoIterator<Item = &'a str>) -> Self {
        for code in codes {
            self.insert(system.clone(), code);
        }
        self
    }

    /// Add a code; blank and duplicate codes are ignored
    pub fn insert(&mut self, system: CodeSystem, code: &str) {
        let normalized = normalize_code(code, &system);
        if normalized.is_empty() {
            return;
        }
        let codes = self.codes.entry(system).or_default();
        if !codes.contains(&normalized) {
            codes.push(normalized);
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Normalized codes listed for `system`
    pub fn codes_for(&self, system: &CodeSystem) -> &[String] {
        self.codes.get(system).map(|c| c.as_slice()).unwrap_or(&[])
    }

    /// Code systems this set has entries for, in insertion order
    pub fn systems(&self) -> impl Iterator<Item = &CodeSystem> {
        self.codes.keys()
    }

    /// All `(system, code)` entries
    pub fn entries(&self) -> impl Iterator<Item = (&CodeSystem, &str)> {
        self.codes
            .iter()
            .flat_map(|(system, codes)| codes.iter().map(move |code| (system, code.as_str())))
    }

    /// Total number of entries
    pub fn len(&self) -> usize {
        self.codes.values().map(SmallVec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
