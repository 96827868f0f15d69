//! Code systems recognized by the measure engine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coding system a claim code belongs to
///
/// The tag is resolved once when a claim is ingested. Tags outside the
/// recognized set are preserved as [`CodeSystem::Unrecognized`] so the engine
/// can report them instead of guessing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CodeSystem {
    /// ICD-10-CM diagnosis codes
    Icd10Cm,
    /// CPT procedure codes
    Cpt,
    /// HCPCS Level II codes
    Hcpcs,
    /// LOINC laboratory observation codes
    Loinc,
    /// National Drug Codes
    Ndc,
    /// Tag outside the recognized enumeration
    Unrecognized(String),
}

impl CodeSystem {
    /// All recognized code systems
    pub const RECOGNIZED: [CodeSystem; 5] = [
        CodeSystem::Icd10Cm,
        CodeSystem::Cpt,
        CodeSystem::Hcpcs,
        CodeSystem::Loinc,
        CodeSystem::Ndc,
    ];

    /// Parse a code system tag, returning `None` for unrecognized tags
    pub fn parse(tag: &str) -> Option<Self> {
        let normalized: String = tag
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_uppercase())
            .collect();

        match normalized.as_str() {
            "ICD10CM" | "ICD10" => Some(Self::Icd10Cm),
            "CPT" => Some(Self::Cpt),
            "HCPCS" => Some(Self::Hcpcs),
            "LOINC" => Some(Self::Loinc),
            "NDC" => Some(Self::Ndc),
            _ => None,
        }
    }

    /// Canonical tag for this system
    pub fn as_str(&self) -> &str {
        match self {
            Self::Icd10Cm => "ICD10CM",
            Self::Cpt => "CPT",
            Self::Hcpcs => "HCPCS",
            Self::Loinc => "LOINC",
            Self::Ndc => "NDC",
            Self::Unrecognized(tag) => tag,
        }
    }

    /// Check whether this is one of the recognized systems
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }

    /// Check whether this system carries diagnosis codes
    pub fn is_diagnosis(&self) -> bool {
        matches!(self, Self::Icd10Cm)
    }
}

impl From<&str> for CodeSystem {
    fn from(tag: &str) -> Self {
        Self::parse(tag).unwrap_or_else(|| Self::Unrecognized(tag.to_string()))
    }
}

impl From<String> for CodeSystem {
    fn from(tag: String) -> Self {
        Self::parse(&tag).unwrap_or(Self::Unrecognized(tag))
    }
}

impl From<CodeSystem> for String {
    fn from(system: CodeSystem) -> Self {
        match system {
            CodeSystem::Unrecognized(tag) => tag,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for CodeSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalize a code for comparison
///
/// Uppercases and strips whitespace. Diagnosis codes additionally drop the
/// decimal point so that `E11.9` and `E119` compare equal.
pub fn normalize_code(code: &str, system: &CodeSystem) -> String {
    code.chars()
        .filter(|c| !c.is_whitespace())
        .filter(|c| !(system.is_diagnosis() && *c == '.'))
        .flat_map(char::to_uppercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!(CodeSystem::parse("ICD10CM"), Some(CodeSystem::Icd10Cm));
        assert_eq!(CodeSystem::parse("icd-10-cm"), Some(CodeSystem::Icd10Cm));
        assert_eq!(CodeSystem::parse("ICD10"), Some(CodeSystem::Icd10Cm));
        assert_eq!(CodeSystem::parse("loinc"), Some(CodeSystem::Loinc));
        assert_eq!(CodeSystem::parse("SNOMED"), None);
    }

    #[test]
    fn test_unrecognized_keeps_tag() {
        let system = CodeSystem::from("SNOMED");
        assert_eq!(system, CodeSystem::Unrecognized("SNOMED".to_string()));
        assert!(!system.is_recognized());
        assert_eq!(system.to_string(), "SNOMED");
    }

    #[test]
    fn test_normalize_diagnosis_drops_decimal() {
        assert_eq!(normalize_code("e11.9", &CodeSystem::Icd10Cm), "E119");
        assert_eq!(normalize_code(" E11 9 ", &CodeSystem::Icd10Cm), "E119");
    }

    #[test]
    fn test_normalize_keeps_decimal_outside_diagnosis() {
        assert_eq!(normalize_code("4548-4", &CodeSystem::Loinc), "4548-4");
        assert_eq!(normalize_code(" 1.5 ", &CodeSystem::Cpt), "1.5");
    }
}
