//! Typed measure specifications

use crate::{CodeSet, SpecError, SpecResult};
use octofhir_qm_types::{CodeSystem, Gender};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Inclusive age range in whole years
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRange {
    pub min: u32,
    pub max: u32,
}

impl AgeRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, age: u32) -> bool {
        (self.min..=self.max).contains(&age)
    }
}

/// Kind of evidence a numerator event represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Procedure,
    Lab,
    Prescription,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Procedure => write!(f, "procedure"),
            EventKind::Lab => write!(f, "lab"),
            EventKind::Prescription => write!(f, "prescription"),
        }
    }
}

/// One accepted kind of numerator evidence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumeratorEvent {
    pub kind: EventKind,
    pub codes: CodeSet,
}

impl NumeratorEvent {
    pub fn new(kind: EventKind, codes: CodeSet) -> Self {
        Self { kind, codes }
    }
}

/// Who is eligible for a measure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenominatorCriteria {
    pub age_range: AgeRange,
    /// Restrict the population to one gender
    pub gender: Option<Gender>,
    /// Qualifying diagnosis; `None` or an empty set is vacuously satisfied
    pub diagnosis: Option<CodeSet>,
    pub continuous_enrollment_days: u32,
    /// Any match removes the patient from the denominator
    pub exclusions: Option<CodeSet>,
}

impl DenominatorCriteria {
    pub fn new(age_range: AgeRange) -> Self {
        Self {
            age_range,
            gender: None,
            diagnosis: None,
            continuous_enrollment_days: 0,
            exclusions: None,
        }
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    pub fn with_diagnosis(mut self, diagnosis: CodeSet) -> Self {
        self.diagnosis = Some(diagnosis);
        self
    }

    pub fn with_continuous_enrollment_days(mut self, days: u32) -> Self {
        self.continuous_enrollment_days = days;
        self
    }

    pub fn with_exclusions(mut self, exclusions: CodeSet) -> Self {
        self.exclusions = Some(exclusions);
        self
    }

    /// Whether a diagnosis has to be present at all
    pub fn requires_diagnosis(&self) -> bool {
        self.diagnosis.as_ref().is_some_and(|set| !set.is_empty())
    }
}

/// Who counts as compliant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumeratorCriteria {
    /// Any matching event of any kind is sufficient
    pub events: SmallVec<[NumeratorEvent; 2]>,
    /// Days before the reference date; `None` means the measurement period
    pub lookback_days: Option<u32>,
}

impl NumeratorCriteria {
    pub fn new(events: impl IntoIterator<Item = NumeratorEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
            lookback_days: None,
        }
    }

    pub fn with_lookback_days(mut self, days: u32) -> Self {
        self.lookback_days = Some(days);
        self
    }
}

/// A parsed and validated quality measure
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureSpecification {
    pub id: String,
    pub name: String,
    pub description: String,
    pub denominator: DenominatorCriteria,
    pub numerator: NumeratorCriteria,
    /// Expected compliance rate, 0.0-1.0
    pub target_rate: f64,
}

impl MeasureSpecification {
    /// Create a specification and validate it
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        denominator: DenominatorCriteria,
        numerator: NumeratorCriteria,
        target_rate: f64,
    ) -> SpecResult<Self> {
        let spec = Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            denominator,
            numerator,
            target_rate,
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Check the structural rules every measure has to satisfy
    pub fn validate(&self) -> SpecResult<()> {
        if self.id.trim().is_empty() {
            return Err(SpecError::malformed("<unnamed>", "measure id is empty"));
        }

        let AgeRange { min, max } = self.denominator.age_range;
        if min > max {
            return Err(SpecError::InvalidAgeRange {
                measure_id: self.id.clone(),
                min,
                max,
            });
        }

        if !self.target_rate.is_finite() || !(0.0..=1.0).contains(&self.target_rate) {
            return Err(SpecError::InvalidTargetRate {
                measure_id: self.id.clone(),
                rate: self.target_rate,
            });
        }

        if self.numerator.events.is_empty() {
            return Err(SpecError::MissingNumerator {
                measure_id: self.id.clone(),
            });
        }

        for event in &self.numerator.events {
            if event.codes.is_empty() {
                return Err(SpecError::EmptyCodeSet {
                    measure_id: self.id.clone(),
                    code_set: event.codes.name().to_string(),
                });
            }
        }

        let code_sets = self
            .denominator
            .diagnosis
            .iter()
            .chain(self.denominator.exclusions.iter())
            .chain(self.numerator.events.iter().map(|e| &e.codes));
        for set in code_sets {
            if let Some(CodeSystem::Unrecognized(system)) =
                set.systems().find(|s| !s.is_recognized())
            {
                return Err(SpecError::UnknownCodeSystem {
                    measure_id: self.id.clone(),
                    code_set: set.name().to_string(),
                    system: system.clone(),
                });
            }
        }

        Ok(())
    }

    /// All numerator code sets, regardless of event kind
    pub fn numerator_code_sets(&self) -> impl Iterator<Item = &CodeSet> {
        self.numerator.events.iter().map(|e| &e.codes)
    }
}
