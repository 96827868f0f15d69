//! End-to-end tests against the standard measure catalog
//!
//! Claims are read from JSON the way an external loader would hand them in.

use chrono::NaiveDate;
use octofhir_qm::diagnostics::QM0100;
use octofhir_qm::eval::EvalError;
use octofhir_qm::{
    ClaimRecord, EvaluationContext, MeasureEngine, MeasureRegistry, Performance, evaluate_measures,
    standard_registry,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use rust_decimal::Decimal;
use serde_json::json;
use std::io::Write;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn ctx() -> EvaluationContext {
    serde_json::from_value(json!({
        "measurementPeriod": { "start": "2023-01-01", "end": "2023-12-31" }
    }))
    .unwrap()
}

fn claims() -> Vec<ClaimRecord> {
    serde_json::from_value(json!([
        // Diabetic woman: HbA1c tested, statin dispensed, mammogram within 27 months
        {"patientId": "P001", "age": 55, "gender": "F", "enrollmentStart": "2020-01-01",
         "claimDate": "2023-02-10", "code": "E11.9", "codeSystem": "ICD10CM",
         "description": "Type 2 diabetes mellitus without complications"},
        {"patientId": "P001", "age": 55, "gender": "F", "enrollmentStart": "2020-01-01",
         "claimDate": "2023-05-02", "code": "83036", "codeSystem": "CPT"},
        {"patientId": "P001", "age": 55, "gender": "F", "enrollmentStart": "2020-01-01",
         "claimDate": "2023-09-01", "code": "0071-0155-23", "codeSystem": "NDC"},
        {"patientId": "P001", "age": 55, "gender": "F", "enrollmentStart": "2020-01-01",
         "claimDate": "2021-10-04", "code": "77067", "codeSystem": "CPT"},
        {"patientId": "P001", "age": 55, "gender": "F", "enrollmentStart": "2020-01-01",
         "claimDate": "2016-03-03", "code": "45378", "codeSystem": "CPT"},

        // Diabetic man with no follow-up care
        {"patientId": "P002", "age": 62, "gender": "M", "enrollmentStart": "2019-06-01",
         "claimDate": "2023-04-11", "code": "E1165", "codeSystem": "ICD-10-CM"},

        // Colorectal cancer patient: excluded from screening
        {"patientId": "P003", "age": 60, "gender": "M", "enrollmentStart": "2018-01-01",
         "claimDate": "2022-08-19", "code": "C18.7", "codeSystem": "ICD10CM"},
        {"patientId": "P003", "age": 60, "gender": "M", "enrollmentStart": "2018-01-01",
         "claimDate": "2023-01-19", "code": "82274", "codeSystem": "CPT"},

        // Recently enrolled woman with an unrecognized code system
        {"patientId": "P004", "age": 51, "gender": "F", "enrollmentStart": "2023-06-01",
         "claimDate": "2023-07-01", "code": "268547008", "codeSystem": "SNOMED"}
    ]))
    .unwrap()
}

#[test]
fn test_standard_catalog_run() {
    let registry = standard_registry().unwrap();
    let run = MeasureEngine::new().evaluate(&registry, claims(), &ctx());

    assert!(run.failures.is_empty());
    let ids: Vec<_> = run.outcomes.keys().map(String::as_str).collect();
    assert_eq!(ids, vec!["CDC-HBA1C", "BCS", "COL", "SPD"]);

    let hba1c = &run.outcomes["CDC-HBA1C"];
    assert_eq!(hba1c.report.denominator_count, 2);
    assert_eq!(hba1c.report.numerator_count, 1);
    assert_eq!(hba1c.report.rounded_rate(2), Decimal::new(50, 2));
    assert_eq!(hba1c.report.performance, Performance::BelowTarget);
    assert!(hba1c.patients["P002"].gap_in_care);

    let bcs = &run.outcomes["BCS"];
    assert_eq!(bcs.report.denominator_count, 1);
    assert!(bcs.patients["P001"].compliant);
    assert!(!bcs.patients["P004"].in_denominator);
    assert!(bcs.patients["P004"].needs_review);

    let col = &run.outcomes["COL"];
    assert!(!col.patients["P003"].in_denominator);
    assert!(col.patients["P001"].compliant);
    assert_eq!(col.patients["P001"].event_date, Some(date(2016, 3, 3)));

    let spd = &run.outcomes["SPD"];
    assert_eq!(spd.report.numerator_count, 1);
    assert_eq!(spd.patients["P001"].days_since_event, Some(121));
}

#[test]
fn test_gender_strata() {
    let registry = standard_registry().unwrap();
    let run = MeasureEngine::new().evaluate(&registry, claims(), &ctx());

    let strata = &run.outcomes["CDC-HBA1C"].report.strata;
    let rates: Vec<_> = strata.iter().map(|s| (s.gender.as_str(), s.rate)).collect();
    assert_eq!(rates, vec![("F", 1.0), ("M", 0.0)]);
}

#[test]
fn test_run_summary() {
    let registry = standard_registry().unwrap();
    let summary = MeasureEngine::new().evaluate(&registry, claims(), &ctx()).summary();

    assert_eq!(summary.measures_evaluated, 4);
    assert_eq!(summary.measures_failed, 0);
    assert_eq!(summary.total_gaps_in_care, 3);
    assert_eq!(summary.measures_meeting_target, 1);
}

#[rstest]
#[case::hba1c("CDC-HBA1C")]
#[case::statins("SPD")]
fn test_selected_measure_only(#[case] measure_id: &str) {
    let registry = standard_registry().unwrap();
    let ctx = ctx().with_measures([measure_id]);
    let run = MeasureEngine::new().evaluate(&registry, claims(), &ctx);

    assert_eq!(run.outcomes.len(), 1);
    assert!(run.report(measure_id).is_some());
}

#[test]
fn test_rejected_measure_does_not_block_others() {
    let document = json!({
        "measures": [
            {"id": "BROKEN", "name": "Missing numerator", "targetRate": 0.5,
             "denominator": {"ageRange": {"min": 18, "max": 75}}},
            {"id": "HBA1C", "name": "HbA1c Testing", "targetRate": 0.5,
             "denominator": {
                "ageRange": {"min": 18, "max": 75},
                "diagnosis": {"codes": {"ICD10CM": ["E11"]}}
             },
             "numerator": {"events": [{"kind": "lab", "codes": {"CPT": ["83036"]}}]}}
        ]
    })
    .to_string();

    let run = evaluate_measures(&document, claims(), &ctx()).unwrap();

    assert_eq!(run.outcomes["HBA1C"].report.numerator_count, 1);
    assert!(matches!(run.failures["BROKEN"], EvalError::RejectedMeasure { .. }));
    let diagnostics = run.failure_diagnostics();
    assert_eq!(diagnostics[0].measure_id.as_deref(), Some("BROKEN"));
    assert!(diagnostics[0].code.is_evaluation_error());
}

#[test]
fn test_registry_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(octofhir_qm::measure::STANDARD_MEASURES_JSON.as_bytes())
        .unwrap();

    let registry = MeasureRegistry::from_json_file(file.path()).unwrap();
    assert_eq!(registry.len(), 4);
    assert!(registry.rejected().is_empty());
}

#[test]
fn test_malformed_measure_code() {
    let document = json!([{"id": "X", "name": "No target"}]).to_string();
    let registry = MeasureRegistry::from_json(&document).unwrap();
    assert_eq!(registry.rejected()[0].code(), QM0100);
}

#[tokio::test]
async fn test_parallel_run_matches() {
    let registry = standard_registry().unwrap();
    let engine = MeasureEngine::new().with_chunk_size(2);

    let sequential = engine.evaluate(&registry, claims(), &ctx());
    let parallel = engine.evaluate_parallel(&registry, claims(), &ctx()).await.unwrap();
    assert_eq!(parallel, sequential);
}
