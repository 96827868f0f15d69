//! Cohort building (denominator membership)
//!
//! A patient belongs to a measure's denominator when the age, gender,
//! enrollment and qualifying diagnosis tests pass and no exclusion code is
//! present. Exclusions override every other criterion. Each patient is
//! decided on its own, so the denominator is a set.

use crate::context::EvaluationContext;
use crate::terminology::{claim_matches, history_matches};
use crate::window::enrollment_satisfied;
use octofhir_qm_diagnostics::{Diagnostic, QM0200, QM0201, QM0202, QM0204};
use octofhir_qm_measure::MeasureSpecification;
use octofhir_qm_types::{PatientHistory, PatientId};
use serde::Serialize;
use std::collections::BTreeSet;

/// Denominator criterion a patient can fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Criterion {
    Age,
    Gender,
    Enrollment,
    Diagnosis,
    Exclusion,
}

/// Denominator decision for one patient and one measure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenominatorDecision {
    pub patient_id: PatientId,
    pub eligible: bool,
    /// First failed criterion in evaluation order, exclusion last
    pub failed: Option<Criterion>,
    /// Data quality issues found while deciding
    pub warnings: Vec<Diagnostic>,
}

/// Decide denominator membership of one patient
pub fn evaluate_denominator(
    history: &PatientHistory,
    spec: &MeasureSpecification,
    ctx: &EvaluationContext,
) -> DenominatorDecision {
    let criteria = &spec.denominator;
    let reference = ctx.reference_date();
    let mut warnings = Vec::new();
    let warn = |code, message: String| {
        Diagnostic::warning(code, message)
            .for_measure(spec.id.clone())
            .for_patient(history.patient_id())
    };

    for claim in history.claims() {
        if !claim.code_system.is_recognized() {
            warnings.push(warn(
                QM0200,
                format!(
                    "claim code '{}' has unrecognized code system '{}'",
                    claim.code, claim.code_system
                ),
            ));
        }
    }

    let age_ok = match history.age_at(reference) {
        Some(age) => criteria.age_range.contains(age),
        None => {
            warnings.push(warn(QM0201, "age cannot be determined".to_string()));
            false
        }
    };

    let gender_ok = match criteria.gender {
        None => true,
        Some(required) if history.gender().is_known() => history.gender() == required,
        Some(_) => {
            warnings.push(warn(QM0204, "gender is not reported".to_string()));
            false
        }
    };

    let enrollment_ok = if criteria.continuous_enrollment_days == 0 {
        true
    } else {
        match history.enrollment_start() {
            Some(start) => enrollment_satisfied(start, reference, criteria.continuous_enrollment_days),
            None => {
                warnings.push(warn(QM0202, "enrollment start date is missing".to_string()));
                false
            }
        }
    };

    let diagnosis_ok = match &criteria.diagnosis {
        Some(diagnosis) if !diagnosis.is_empty() => history_matches(history, diagnosis),
        _ => true,
    };

    let excluded = criteria.exclusions.as_ref().is_some_and(|exclusions| {
        history
            .claims()
            .iter()
            .any(|claim| claim_matches(claim, exclusions).unwrap_or(false))
    });

    let failed = [
        (age_ok, Criterion::Age),
        (gender_ok, Criterion::Gender),
        (enrollment_ok, Criterion::Enrollment),
        (diagnosis_ok, Criterion::Diagnosis),
        (!excluded, Criterion::Exclusion),
    ]
    .into_iter()
    .find(|(passed, _)| !passed)
    .map(|(_, criterion)| criterion);

    DenominatorDecision {
        patient_id: history.patient_id().to_string(),
        eligible: failed.is_none(),
        failed,
        warnings,
    }
}

/// Patient ids of the denominator for `spec`
pub fn build_denominator<'a>(
    histories: impl IntoIterator<Item = &'a PatientHistory>,
    spec: &MeasureSpecification,
    ctx: &EvaluationContext,
) -> BTreeSet<PatientId> {
    histories
        .into_iter()
        .map(|history| evaluate_denominator(history, spec, ctx))
        .filter(|decision| decision.eligible)
        .map(|decision| decision.patient_id)
        .collect()
}
