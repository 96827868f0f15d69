//! Measure specification parser
//!
//! Measures are authored as JSON documents. Each measure is decoded into a
//! loose intermediate shape first and then converted into a validated
//! [`MeasureSpecification`], so a broken measure is reported on its own and
//! never prevents its neighbours from loading.
//!
//! ```json
//! {
//!   "measures": [{
//!     "id": "CDC-HBA1C",
//!     "name": "Diabetes Care: HbA1c Testing",
//!     "targetRate": 0.85,
//!     "denominator": {
//!       "ageRange": { "min": 18, "max": 75 },
//!       "continuousEnrollmentDays": 365,
//!       "diagnosis": { "name": "Diabetes", "codes": { "ICD10CM": ["E10", "E11"] } },
//!       "exclusions": { "name": "Palliative Care", "codes": { "ICD10CM": ["Z51.5"] } }
//!     },
//!     "numerator": {
//!       "events": [
//!         { "kind": "lab", "name": "HbA1c Tests", "codes": { "CPT": ["83036"], "LOINC": ["4548-4"] } }
//!       ]
//!     }
//!   }]
//! }
//! ```

use crate::{
    AgeRange, CodeSet, DenominatorCriteria, EventKind, MeasureSpecification, NumeratorCriteria,
    NumeratorEvent, SpecError, SpecResult,
};
use indexmap::IndexMap;
use octofhir_qm_types::{CodeSystem, Gender};
use serde::Deserialize;
use serde_json::Value as JsonValue;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMeasure {
    id: Option<String>,
    name: Option<String>,
    #[serde(default)]
    description: String,
    target_rate: Option<f64>,
    denominator: Option<RawDenominator>,
    numerator: Option<RawNumerator>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDenominator {
    age_range: Option<AgeRange>,
    gender: Option<String>,
    diagnosis: Option<RawCodeSet>,
    #[serde(default)]
    continuous_enrollment_days: u32,
    exclusions: Option<RawCodeSet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNumerator {
    lookback_days: Option<u32>,
    #[serde(default)]
    events: Vec<RawEvent>,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    kind: EventKind,
    #[serde(flatten)]
    code_set: RawCodeSet,
}

#[derive(Debug, Deserialize)]
struct RawCodeSet {
    name: Option<String>,
    #[serde(default)]
    codes: IndexMap<String, Vec<String>>,
}

impl RawCodeSet {
    fn into_code_set(self, measure_id: &str, fallback_name: &str) -> SpecResult<CodeSet> {
        let name = self.name.unwrap_or_else(|| fallback_name.to_string());
        let mut set = CodeSet::new(name);
        for (tag, codes) in self.codes {
            let system = CodeSystem::parse(&tag).ok_or_else(|| SpecError::UnknownCodeSystem {
                measure_id: measure_id.to_string(),
                code_set: set.name().to_string(),
                system: tag.clone(),
            })?;
            for code in &codes {
                set.insert(system.clone(), code);
            }
        }
        Ok(set)
    }
}

impl RawMeasure {
    fn into_specification(self) -> SpecResult<MeasureSpecification> {
        let id = self
            .id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| SpecError::malformed("<unnamed>", "missing measure id"))?;

        let target_rate = self
            .target_rate
            .ok_or_else(|| SpecError::malformed(&id, "missing targetRate"))?;

        let raw_denominator = self
            .denominator
            .ok_or_else(|| SpecError::malformed(&id, "missing denominator criteria"))?;
        let age_range = raw_denominator
            .age_range
            .ok_or_else(|| SpecError::malformed(&id, "missing denominator ageRange"))?;

        let mut denominator = DenominatorCriteria::new(age_range)
            .with_continuous_enrollment_days(raw_denominator.continuous_enrollment_days);
        if let Some(gender) = raw_denominator.gender {
            let gender = Gender::from(gender.as_str());
            if !gender.is_known() {
                return Err(SpecError::malformed(&id, "unrecognized denominator gender"));
            }
            denominator = denominator.with_gender(gender);
        }
        if let Some(diagnosis) = raw_denominator.diagnosis {
            denominator = denominator.with_diagnosis(diagnosis.into_code_set(&id, "Diagnosis")?);
        }
        if let Some(exclusions) = raw_denominator.exclusions {
            denominator = denominator.with_exclusions(exclusions.into_code_set(&id, "Exclusions")?);
        }

        let raw_numerator = self.numerator.ok_or_else(|| SpecError::MissingNumerator {
            measure_id: id.clone(),
        })?;
        let events = raw_numerator
            .events
            .into_iter()
            .map(|event| {
                let fallback = event.kind.to_string();
                event
                    .code_set
                    .into_code_set(&id, &fallback)
                    .map(|codes| NumeratorEvent::new(event.kind, codes))
            })
            .collect::<SpecResult<Vec<_>>>()?;
        let mut numerator = NumeratorCriteria::new(events);
        numerator.lookback_days = raw_numerator.lookback_days;

        let name = self.name.unwrap_or_else(|| id.clone());
        Ok(MeasureSpecification::new(id, name, denominator, numerator, target_rate)?
            .with_description(self.description))
    }
}

/// Parse a single measure from a JSON value
pub fn parse_measure(value: JsonValue) -> SpecResult<MeasureSpecification> {
    let measure_id = value
        .get("id")
        .and_then(JsonValue::as_str)
        .unwrap_or("<unnamed>")
        .to_string();

    let raw: RawMeasure = serde_json::from_value(value)
        .map_err(|e| SpecError::malformed(measure_id, e.to_string()))?;
    raw.into_specification()
}

/// Parse every measure of a JSON document
///
/// Accepts `{"measures": [...]}`, a bare array, or a single measure object.
/// Only a document that is not JSON at all is an error; each measure yields
/// its own result.
pub fn parse_measures(json: &str) -> SpecResult<Vec<SpecResult<MeasureSpecification>>> {
    let document: JsonValue =
        serde_json::from_str(json).map_err(|e| SpecError::InvalidDocument(e.to_string()))?;

    let values = match document {
        JsonValue::Array(values) => values,
        JsonValue::Object(mut object) => match object.remove("measures") {
            Some(JsonValue::Array(values)) => values,
            Some(_) => {
                return Err(SpecError::InvalidDocument(
                    "'measures' must be an array".to_string(),
                ));
            }
            None => vec![JsonValue::Object(object)],
        },
        _ => {
            return Err(SpecError::InvalidDocument(
                "expected an object or an array of measures".to_string(),
            ));
        }
    };

    Ok(values.into_iter().map(parse_measure).collect())
}
