//! Code matcher and window properties

use chrono::{Days, NaiveDate};
use octofhir_qm_eval::{in_window, matches};
use octofhir_qm_measure::CodeSet;
use octofhir_qm_types::CodeSystem;
use proptest::prelude::*;
use rstest::rstest;

fn icd(code: &str) -> CodeSet {
    CodeSet::new("Test").with_code(CodeSystem::Icd10Cm, code)
}

#[rstest]
#[case::exact("E11", true)]
#[case::dotted_child("E11.9", true)]
#[case::undotted_child("E119", true)]
#[case::lowercase("e11.65", true)]
#[case::padded("  E11.9 ", true)]
#[case::shorter("E1", false)]
#[case::sibling("E10.9", false)]
#[case::empty("", false)]
fn test_diabetes_category(#[case] code: &str, #[case] expected: bool) {
    assert_eq!(matches(code, &CodeSystem::Icd10Cm, &icd("E11")).unwrap(), expected);
}

#[rstest]
#[case::cpt(CodeSystem::Cpt, "83036")]
#[case::hcpcs(CodeSystem::Hcpcs, "G0202")]
#[case::loinc(CodeSystem::Loinc, "4548-4")]
#[case::ndc(CodeSystem::Ndc, "00071015523")]
fn test_non_diagnosis_systems_keep_punctuation(#[case] system: CodeSystem, #[case] code: &str) {
    let set = CodeSet::new("Test").with_code(system.clone(), code);
    assert!(matches(code, &system, &set).unwrap());
    assert!(!matches(code, &CodeSystem::Icd10Cm, &set).unwrap());
}

fn icd_code() -> impl Strategy<Value = String> {
    "[A-Z][0-9]{2}(\\.[0-9A-Z]{1,4})?"
}

proptest! {
    #[test]
    fn every_code_matches_itself(code in icd_code()) {
        prop_assert!(matches(&code, &CodeSystem::Icd10Cm, &icd(&code)).unwrap());
    }

    #[test]
    fn category_matches_its_children(category in "[A-Z][0-9]{2}", suffix in "[0-9A-Z]{1,4}") {
        let child = format!("{}.{}", category, suffix);
        prop_assert!(matches(&child, &CodeSystem::Icd10Cm, &icd(&category)).unwrap());
    }

    #[test]
    fn truncated_code_never_matches(code in "[A-Z][0-9]{2}[0-9A-Z]{1,4}") {
        let shorter = &code[..code.len() - 1];
        prop_assert!(!matches(shorter, &CodeSystem::Icd10Cm, &icd(&code)).unwrap());
    }

    #[test]
    fn window_contains_both_bounds(days in 0u32..5000, offset in 0i64..20000) {
        let reference = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap() + Days::new(offset as u64);
        let start = reference - Days::new(u64::from(days));
        prop_assert!(in_window(reference, reference, days));
        prop_assert!(in_window(start, reference, days));
        prop_assert!(!in_window(start - Days::new(1), reference, days));
        prop_assert!(!in_window(reference + Days::new(1), reference, days));
    }
}
