//! Per-patient claim histories

use crate::{ClaimRecord, Gender, PatientId};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

/// All claims of one patient, ordered by claim date
///
/// Undated claims sort after dated ones and keep their input order. The
/// demographic attributes are derived once at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientHistory {
    patient_id: PatientId,
    claims: Vec<ClaimRecord>,
    birth_date: Option<NaiveDate>,
    reported_age: Option<u32>,
    gender: Gender,
    enrollment_start: Option<NaiveDate>,
}

impl PatientHistory {
    /// Build a history from claims already known to belong to `patient_id`
    pub fn from_claims(patient_id: impl Into<PatientId>, mut claims: Vec<ClaimRecord>) -> Self {
        // Stable sort: None > Some keeps undated claims last
        claims.sort_by_key(|claim| (claim.claim_date.is_none(), claim.claim_date));

        let birth_date = claims.iter().find_map(|c| c.birth_date);
        // Latest dated claim carrying an age wins
        let reported_age = claims
            .iter()
            .rev()
            .filter(|c| c.claim_date.is_some())
            .find_map(|c| c.age)
            .or_else(|| claims.iter().find_map(|c| c.age));
        let gender = claims
            .iter()
            .map(|c| c.gender)
            .find(Gender::is_known)
            .unwrap_or_default();
        let enrollment_start = claims.iter().filter_map(|c| c.enrollment_start).min();

        Self {
            patient_id: patient_id.into(),
            claims,
            birth_date,
            reported_age,
            gender,
            enrollment_start,
        }
    }

    pub fn patient_id(&self) -> &str {
        &self.patient_id
    }

    /// Claims in ascending date order
    pub fn claims(&self) -> &[ClaimRecord] {
        &self.claims
    }

    pub fn birth_date(&self) -> Option<NaiveDate> {
        self.birth_date
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    /// Earliest enrollment start reported on any claim
    pub fn enrollment_start(&self) -> Option<NaiveDate> {
        self.enrollment_start
    }

    /// Age in whole years as of `reference`
    ///
    /// A birth date takes precedence over the reported age. Returns `None`
    /// when neither is available or the birth date lies after `reference`.
    pub fn age_at(&self, reference: NaiveDate) -> Option<u32> {
        match self.birth_date {
            Some(birth) => age_in_years(birth, reference),
            None => self.reported_age,
        }
    }
}

/// Group claims into histories, one per patient, ordered by patient id
pub fn group_by_patient(claims: impl IntoIterator<Item = ClaimRecord>) -> Vec<PatientHistory> {
    let mut by_patient: BTreeMap<PatientId, Vec<ClaimRecord>> = BTreeMap::new();
    for claim in claims {
        by_patient
            .entry(claim.patient_id.clone())
            .or_default()
            .push(claim);
    }

    by_patient
        .into_iter()
        .map(|(patient_id, claims)| PatientHistory::from_claims(patient_id, claims))
        .collect()
}

/// Full years between `birth` and `as_of`
pub fn age_in_years(birth: NaiveDate, as_of: NaiveDate) -> Option<u32> {
    if as_of < birth {
        return None;
    }
    let mut years = as_of.year() - birth.year();
    // Adjust if birthday hasn't occurred yet this year
    if (as_of.month(), as_of.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}
