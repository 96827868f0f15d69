//! Code matching against measure code sets
//!
//! A claim code matches a code set when, after normalization, it equals a
//! listed code of the same system or starts with one. Prefix entries express
//! hierarchical categories: `E11` covers `E11.9` and `E119`, while a shorter
//! claim code such as `E1` never matches the longer entry.

use crate::error::{EvalError, EvalResult};
use octofhir_qm_measure::CodeSet;
use octofhir_qm_types::{ClaimRecord, CodeSystem, PatientHistory, normalize_code};

/// Check whether `code` of `system` belongs to `code_set`
///
/// Fails with [`EvalError::InvalidCodeSystem`] for unrecognized systems.
pub fn matches(code: &str, system: &CodeSystem, code_set: &CodeSet) -> EvalResult<bool> {
    if let CodeSystem::Unrecognized(tag) = system {
        return Err(EvalError::invalid_code_system(tag.clone()));
    }

    let normalized = normalize_code(code, system);
    if normalized.is_empty() {
        return Ok(false);
    }

    Ok(code_set
        .codes_for(system)
        .iter()
        .any(|entry| !entry.is_empty() && normalized.starts_with(entry.as_str())))
}

/// Check whether a claim's code belongs to `code_set`
pub fn claim_matches(claim: &ClaimRecord, code_set: &CodeSet) -> EvalResult<bool> {
    matches(&claim.code, &claim.code_system, code_set)
}

/// Check whether any claim of a history belongs to `code_set`
///
/// Claims with an unrecognized code system are left out of consideration.
pub fn history_matches(history: &PatientHistory, code_set: &CodeSet) -> bool {
    history
        .claims()
        .iter()
        .any(|claim| claim_matches(claim, code_set).unwrap_or(false))
}
