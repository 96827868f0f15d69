//! Parallel evaluation tests
//!
//! The parallel path must produce exactly the run the sequential path
//! produces, whatever the chunk size.

use chrono::{Days, NaiveDate};
use octofhir_qm_eval::{EvalError, EvaluationContext, MeasureEngine};
use octofhir_qm_measure::standard_registry;
use octofhir_qm_types::{ClaimRecord, CodeSystem, Gender};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn ctx() -> EvaluationContext {
    EvaluationContext::builder()
        .measurement_period(date(2023, 1, 1), date(2023, 12, 31))
        .build()
        .unwrap()
}

/// A mixed population touching every standard measure
fn population(size: usize) -> Vec<ClaimRecord> {
    let mut claims = Vec::new();
    for i in 0..size {
        let patient = format!("P{:04}", i);
        let age = 30 + (i % 50) as u32;
        let gender = if i % 2 == 0 { Gender::Female } else { Gender::Male };
        let seen = date(2023, 1, 15) + Days::new((i % 300) as u64);

        claims.push(
            ClaimRecord::new(&patient, CodeSystem::Icd10Cm, if i % 3 == 0 { "E11.65" } else { "I10" })
                .with_age(age)
                .with_gender(gender)
                .with_enrollment_start(date(2021, 1, 1))
                .with_claim_date(seen),
        );
        if i % 4 != 0 {
            claims.push(ClaimRecord::new(&patient, CodeSystem::Cpt, "83036").with_claim_date(seen));
        }
        if i % 5 == 0 {
            claims.push(ClaimRecord::new(&patient, CodeSystem::Cpt, "77067").with_claim_date(date(2022, 3, 1)));
        }
        if i % 7 == 0 {
            claims.push(ClaimRecord::new(&patient, CodeSystem::Hcpcs, "G0121").with_claim_date(date(2016, 9, 9)));
        }
        if i % 11 == 0 {
            claims.push(ClaimRecord::new(&patient, "UNKNOWN", "X1"));
        }
    }
    claims
}

#[rstest]
#[case::single_chunk(1024)]
#[case::small_chunks(7)]
#[case::one_patient_per_chunk(1)]
#[tokio::test]
async fn test_parallel_matches_sequential(#[case] chunk_size: usize) {
    let registry = standard_registry().unwrap();
    let engine = MeasureEngine::new().with_chunk_size(chunk_size);
    let claims = population(120);

    let sequential = engine.evaluate(&registry, claims.clone(), &ctx());
    let parallel = engine.evaluate_parallel(&registry, claims, &ctx()).await.unwrap();

    assert_eq!(parallel, sequential);
    assert_eq!(parallel.outcomes.len(), registry.len());
}

#[tokio::test]
async fn test_parallel_records_unknown_measures() {
    let registry = standard_registry().unwrap();
    let ctx = ctx().with_measures(["COL", "MISSING"]);

    let run = MeasureEngine::new()
        .evaluate_parallel(&registry, population(10), &ctx)
        .await
        .unwrap();

    assert_eq!(run.outcomes.keys().collect::<Vec<_>>(), vec!["COL"]);
    assert_eq!(run.failures["MISSING"], EvalError::unknown_measure("MISSING"));
}

#[tokio::test]
async fn test_parallel_without_claims() {
    let registry = standard_registry().unwrap();
    let run = MeasureEngine::new()
        .evaluate_parallel(&registry, Vec::new(), &ctx())
        .await
        .unwrap();

    for outcome in run.outcomes.values() {
        assert_eq!(outcome.report.denominator_count, 0);
        assert_eq!(outcome.report.rate, 0.0);
        assert!(outcome.patients.is_empty());
    }
}
