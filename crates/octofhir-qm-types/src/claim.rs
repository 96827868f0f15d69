//! Claim records

use crate::CodeSystem;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Patient identifier as carried on claims
pub type PatientId = String;

/// Administrative gender reported on a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Gender {
    Female,
    Male,
    Other,
    #[default]
    Unknown,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Female => "F",
            Self::Male => "M",
            Self::Other => "O",
            Self::Unknown => "U",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl From<&str> for Gender {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "f" | "female" => Self::Female,
            "m" | "male" => Self::Male,
            "o" | "other" => Self::Other,
            _ => Self::Unknown,
        }
    }
}

impl From<String> for Gender {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<Gender> for String {
    fn from(gender: Gender) -> Self {
        gender.as_str().to_string()
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One clinical event from a claims dataset
///
/// Records are produced by an external loader and never mutated by the
/// engine. Demographic fields are repeated on every claim; any of the dated
/// fields may be missing in dirty data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRecord {
    pub patient_id: PatientId,
    /// Age as reported by the source, used when no birth date is known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrollment_start: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_date: Option<NaiveDate>,
    pub code: String,
    pub code_system: CodeSystem,
    /// Advisory only, never used for matching
    #[serde(default)]
    pub description: String,
}

impl ClaimRecord {
    /// Create a claim with only the identifying fields set
    pub fn new(
        patient_id: impl Into<PatientId>,
        code_system: impl Into<CodeSystem>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            patient_id: patient_id.into(),
            age: None,
            birth_date: None,
            gender: Gender::Unknown,
            enrollment_start: None,
            claim_date: None,
            code: code.into(),
            code_system: code_system.into(),
            description: String::new(),
        }
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_birth_date(mut self, birth_date: NaiveDate) -> Self {
        self.birth_date = Some(birth_date);
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        self
    }

    pub fn with_enrollment_start(mut self, start: NaiveDate) -> Self {
        self.enrollment_start = Some(start);
        self
    }

    pub fn with_claim_date(mut self, date: NaiveDate) -> Self {
        self.claim_date = Some(date);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}
