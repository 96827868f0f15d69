//! Evaluation results
//!
//! Results are plain data owned by the caller once returned. They derive
//! `Serialize` so callers can write them in whatever format they need.

use crate::aggregate::PartialAggregate;
use crate::cohort::Criterion;
use crate::error::EvalError;
use chrono::NaiveDate;
use indexmap::IndexMap;
use octofhir_qm_diagnostics::Diagnostic;
use octofhir_qm_measure::{EventKind, MeasureSpecification};
use octofhir_qm_types::{Gender, PatientId};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Per-patient, per-measure outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityResult {
    pub patient_id: PatientId,
    pub measure_id: String,
    pub gender: Gender,
    pub in_denominator: bool,
    /// First denominator criterion the patient failed
    pub failed_criterion: Option<Criterion>,
    /// Only meaningful when `in_denominator` is true
    pub compliant: bool,
    /// Most recent qualifying event date
    pub event_date: Option<NaiveDate>,
    pub event_kind: Option<EventKind>,
    /// Days between the qualifying event and the reference date
    pub days_since_event: Option<i64>,
    /// Denominator member without a qualifying event
    pub gap_in_care: bool,
    /// Data quality issues were found for this patient
    pub needs_review: bool,
    pub warnings: Vec<Diagnostic>,
}

/// Whether a measure reached its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Performance {
    MeetsTarget,
    BelowTarget,
}

impl Performance {
    /// Classify `rate` against `target`; equality meets the target
    pub fn classify(rate: f64, target: f64) -> Self {
        if rate >= target {
            Self::MeetsTarget
        } else {
            Self::BelowTarget
        }
    }
}

impl fmt::Display for Performance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Performance::MeetsTarget => write!(f, "meets target"),
            Performance::BelowTarget => write!(f, "below target"),
        }
    }
}

/// Rate of one gender within a measure
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenderStratum {
    pub gender: Gender,
    pub denominator_count: usize,
    pub numerator_count: usize,
    pub rate: f64,
}

/// Aggregate result of one measure
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureReport {
    pub measure_id: String,
    pub measure_name: String,
    pub denominator_count: usize,
    pub numerator_count: usize,
    /// `numerator / denominator`, exactly 0.0 for an empty denominator
    pub rate: f64,
    pub target_rate: f64,
    pub performance: Performance,
    pub strata: Vec<GenderStratum>,
}

/// `numerator / denominator`, 0.0 when the denominator is empty
pub(crate) fn rate(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl MeasureReport {
    /// Build a report from merged counts
    pub fn from_partial(spec: &MeasureSpecification, partial: &PartialAggregate) -> Self {
        let rate = rate(partial.totals.numerator, partial.totals.denominator);
        let strata = partial
            .by_gender
            .iter()
            .map(|(gender, counts)| GenderStratum {
                gender: *gender,
                denominator_count: counts.denominator,
                numerator_count: counts.numerator,
                rate: self::rate(counts.numerator, counts.denominator),
            })
            .collect();

        Self {
            measure_id: spec.id.clone(),
            measure_name: spec.name.clone(),
            denominator_count: partial.totals.denominator,
            numerator_count: partial.totals.numerator,
            rate,
            target_rate: spec.target_rate,
            performance: Performance::classify(rate, spec.target_rate),
            strata,
        }
    }

    /// Exact rate rounded half away from zero to `decimal_places`
    pub fn rounded_rate(&self, decimal_places: u32) -> Decimal {
        if self.denominator_count == 0 {
            return Decimal::ZERO;
        }
        let exact = Decimal::from(self.numerator_count as u64) / Decimal::from(self.denominator_count as u64);
        exact.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero)
    }

    pub fn meets_target(&self) -> bool {
        self.performance == Performance::MeetsTarget
    }
}

/// Report and patient-level results of one measure
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureOutcome {
    pub report: MeasureReport,
    /// Every evaluated patient, keyed by patient id
    pub patients: BTreeMap<PatientId, EligibilityResult>,
}

impl MeasureOutcome {
    /// Denominator members without a qualifying event
    pub fn gaps_in_care(&self) -> impl Iterator<Item = &EligibilityResult> {
        self.patients.values().filter(|r| r.gap_in_care)
    }

    /// Patients in the denominator
    pub fn denominator(&self) -> impl Iterator<Item = &EligibilityResult> {
        self.patients.values().filter(|r| r.in_denominator)
    }

    /// Patients flagged for data quality review
    pub fn flagged_for_review(&self) -> impl Iterator<Item = &EligibilityResult> {
        self.patients.values().filter(|r| r.needs_review)
    }
}

/// Everything a run produced
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EvaluationRun {
    /// Evaluated measures in request order
    pub outcomes: IndexMap<String, MeasureOutcome>,
    /// Measures that could not be evaluated
    pub failures: IndexMap<String, EvalError>,
}

impl EvaluationRun {
    pub fn report(&self, measure_id: &str) -> Option<&MeasureReport> {
        self.outcomes.get(measure_id).map(|o| &o.report)
    }

    /// Reports of all evaluated measures
    pub fn reports(&self) -> impl Iterator<Item = &MeasureReport> {
        self.outcomes.values().map(|o| &o.report)
    }

    /// Failures as diagnostics
    pub fn failure_diagnostics(&self) -> Vec<Diagnostic> {
        self.failures
            .iter()
            .map(|(measure_id, err)| Diagnostic::error(err.code(), err.to_string()).for_measure(measure_id.clone()))
            .collect()
    }

    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary {
            measures_evaluated: self.outcomes.len(),
            measures_failed: self.failures.len(),
            ..RunSummary::default()
        };
        for outcome in self.outcomes.values() {
            if outcome.report.meets_target() {
                summary.measures_meeting_target += 1;
            }
            summary.total_gaps_in_care += outcome.gaps_in_care().count();
            summary.patients_flagged_for_review += outcome.flagged_for_review().count();
        }
        summary
    }
}

/// Totals across every measure of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub measures_evaluated: usize,
    pub measures_failed: usize,
    pub measures_meeting_target: usize,
    pub total_gaps_in_care: usize,
    /// Patient/measure pairs carrying data quality warnings
    pub patients_flagged_for_review: usize,
}
