//! Compliance evaluation (numerator membership)
//!
//! A denominator member is compliant when at least one claim matches any of
//! the measure's numerator events and falls inside the compliance window.
//! The most recent qualifying event is reported.

use crate::context::EvaluationContext;
use crate::terminology::claim_matches;
use crate::window::ComplianceWindow;
use chrono::NaiveDate;
use octofhir_qm_diagnostics::{Diagnostic, QM0203};
use octofhir_qm_measure::{EventKind, MeasureSpecification};
use octofhir_qm_types::{ClaimRecord, PatientHistory};

/// Numerator decision for one patient and one measure
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumeratorOutcome {
    pub compliant: bool,
    /// Date of the most recent qualifying event
    pub event_date: Option<NaiveDate>,
    pub event_kind: Option<EventKind>,
    pub warnings: Vec<Diagnostic>,
}

/// First numerator event of `spec` whose code set contains the claim
fn matching_event(claim: &ClaimRecord, spec: &MeasureSpecification) -> Option<EventKind> {
    spec.numerator
        .events
        .iter()
        .find(|event| claim_matches(claim, &event.codes).unwrap_or(false))
        .map(|event| event.kind)
}

/// Decide numerator compliance of one patient
///
/// Callers are expected to have placed the patient in the denominator.
pub fn evaluate_numerator(
    history: &PatientHistory,
    spec: &MeasureSpecification,
    ctx: &EvaluationContext,
) -> NumeratorOutcome {
    let window = ComplianceWindow::for_measure(spec, ctx);
    let mut outcome = NumeratorOutcome::default();

    // Claims are ordered by date with undated claims last.
    for claim in history.claims().iter().rev() {
        let Some(kind) = matching_event(claim, spec) else {
            continue;
        };
        match claim.claim_date {
            None => outcome.warnings.push(
                Diagnostic::warning(
                    QM0203,
                    format!("qualifying {} claim '{}' has no service date", kind, claim.code),
                )
                .for_measure(spec.id.clone())
                .for_patient(history.patient_id()),
            ),
            Some(date) if window.contains(date) => {
                outcome.compliant = true;
                outcome.event_date = Some(date);
                outcome.event_kind = Some(kind);
                break;
            }
            Some(_) => {}
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use octofhir_qm_measure::{AgeRange, CodeSet, DenominatorCriteria, NumeratorCriteria, NumeratorEvent};
    use octofhir_qm_types::CodeSystem;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ctx() -> EvaluationContext {
        EvaluationContext::builder()
            .measurement_period(date(2023, 1, 1), date(2023, 12, 31))
            .build()
            .unwrap()
    }

    fn colorectal(lookback: Option<u32>) -> MeasureSpecification {
        let mut numerator = NumeratorCriteria::new([
            NumeratorEvent::new(
                EventKind::Procedure,
                CodeSet::new("Colonoscopy").with_code(CodeSystem::Cpt, "45378"),
            ),
            NumeratorEvent::new(EventKind::Lab, CodeSet::new("FIT").with_code(CodeSystem::Cpt, "82274")),
        ]);
        if let Some(days) = lookback {
            numerator = numerator.with_lookback_days(days);
        }
        MeasureSpecification::new(
            "COL",
            "Colorectal Cancer Screening",
            DenominatorCriteria::new(AgeRange::new(45, 75)),
            numerator,
            0.7,
        )
        .unwrap()
    }

    fn history(claims: Vec<ClaimRecord>) -> PatientHistory {
        PatientHistory::from_claims("P1", claims)
    }

    #[test]
    fn test_most_recent_event_wins() {
        let history = history(vec![
            ClaimRecord::new("P1", CodeSystem::Cpt, "45378").with_claim_date(date(2019, 5, 1)),
            ClaimRecord::new("P1", CodeSystem::Cpt, "82274").with_claim_date(date(2023, 8, 1)),
        ]);

        let outcome = evaluate_numerator(&history, &colorectal(Some(3650)), &ctx());
        assert!(outcome.compliant);
        assert_eq!(outcome.event_date, Some(date(2023, 8, 1)));
        assert_eq!(outcome.event_kind, Some(EventKind::Lab));
    }

    #[test]
    fn test_event_outside_lookback() {
        let history = history(vec![
            ClaimRecord::new("P1", CodeSystem::Cpt, "45378").with_claim_date(date(2012, 5, 1)),
        ]);

        let outcome = evaluate_numerator(&history, &colorectal(Some(3650)), &ctx());
        assert!(!outcome.compliant);
        assert_eq!(outcome.event_date, None);
    }

    #[test]
    fn test_period_used_without_lookback() {
        let history = history(vec![
            ClaimRecord::new("P1", CodeSystem::Cpt, "82274").with_claim_date(date(2022, 12, 31)),
        ]);
        assert!(!evaluate_numerator(&history, &colorectal(None), &ctx()).compliant);

        let history = self::history(vec![
            ClaimRecord::new("P1", CodeSystem::Cpt, "82274").with_claim_date(date(2023, 1, 1)),
        ]);
        assert!(evaluate_numerator(&history, &colorectal(None), &ctx()).compliant);
    }

    #[test]
    fn test_undated_event_is_flagged() {
        let history = history(vec![ClaimRecord::new("P1", CodeSystem::Cpt, "45378")]);

        let outcome = evaluate_numerator(&history, &colorectal(Some(3650)), &ctx());
        assert!(!outcome.compliant);
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].code, QM0203);
    }

    #[test]
    fn test_event_after_reference_not_credited() {
        let history = history(vec![
            ClaimRecord::new("P1", CodeSystem::Cpt, "45378").with_claim_date(date(2024, 1, 1)),
        ]);
        assert!(!evaluate_numerator(&history, &colorectal(Some(3650)), &ctx()).compliant);
    }
}
