//! Measure aggregation
//!
//! Counts are collected into [`PartialAggregate`]s which merge associatively
//! and commutatively, so workers can aggregate their own patients and the
//! results can be combined in any order.

use crate::result::{EligibilityResult, MeasureReport};
use octofhir_qm_measure::MeasureSpecification;
use octofhir_qm_types::{Gender, PatientId};
use std::collections::{BTreeMap, BTreeSet};

/// Denominator and numerator counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StratumCounts {
    pub denominator: usize,
    pub numerator: usize,
}

impl StratumCounts {
    fn record(&mut self, compliant: bool) {
        self.denominator += 1;
        if compliant {
            self.numerator += 1;
        }
    }

    fn merge(&mut self, other: StratumCounts) {
        self.denominator += other.denominator;
        self.numerator += other.numerator;
    }
}

/// Counts of a subset of patients for one measure
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialAggregate {
    pub totals: StratumCounts,
    pub by_gender: BTreeMap<Gender, StratumCounts>,
}

impl PartialAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one denominator member
    pub fn record(&mut self, gender: Gender, compliant: bool) {
        self.totals.record(compliant);
        self.by_gender.entry(gender).or_default().record(compliant);
    }

    /// Fold `other` into `self`
    pub fn merge(&mut self, other: PartialAggregate) {
        self.totals.merge(other.totals);
        for (gender, counts) in other.by_gender {
            self.by_gender.entry(gender).or_default().merge(counts);
        }
    }

    /// Collect counts from patient results; non-members are ignored
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a EligibilityResult>) -> Self {
        let mut partial = Self::new();
        for result in results.into_iter().filter(|r| r.in_denominator) {
            partial.record(result.gender, result.compliant);
        }
        partial
    }
}

/// Build the report of `spec` from its denominator and patient results
///
/// Patients outside `denominator` never count toward the numerator, whatever
/// their result says.
pub fn aggregate(
    spec: &MeasureSpecification,
    denominator: &BTreeSet<PatientId>,
    results: &BTreeMap<PatientId, EligibilityResult>,
) -> MeasureReport {
    let mut partial = PartialAggregate::new();
    for patient_id in denominator {
        let (gender, compliant) = results
            .get(patient_id)
            .map(|r| (r.gender, r.compliant))
            .unwrap_or((Gender::Unknown, false));
        partial.record(gender, compliant);
    }
    MeasureReport::from_partial(spec, &partial)
}

/// Denominator members without a qualifying event, in patient id order
pub fn gaps_in_care(
    denominator: &BTreeSet<PatientId>,
    results: &BTreeMap<PatientId, EligibilityResult>,
) -> Vec<PatientId> {
    denominator
        .iter()
        .filter(|patient_id| results.get(*patient_id).is_none_or(|r| !r.compliant))
        .cloned()
        .collect()
}
