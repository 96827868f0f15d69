//! Standard measure catalog

use crate::{MeasureRegistry, SpecResult};

/// JSON definitions of the standard measures shipped with the engine
pub const STANDARD_MEASURES_JSON: &str = include_str!("../measures/standard.json");

/// Registry preloaded with the standard measures
pub fn standard_registry() -> SpecResult<MeasureRegistry> {
    MeasureRegistry::from_json(STANDARD_MEASURES_JSON)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EventKind;
    use octofhir_qm_types::Gender;

    #[test]
    fn test_standard_measures_load_cleanly() {
        let registry = standard_registry().unwrap();

        assert!(registry.rejected().is_empty());
        assert_eq!(
            registry.ids().collect::<Vec<_>>(),
            vec!["CDC-HBA1C", "BCS", "COL", "SPD"]
        );
    }

    #[test]
    fn test_breast_cancer_screening_is_female_only() {
        let registry = standard_registry().unwrap();
        let bcs = registry.get("BCS").unwrap();

        assert_eq!(bcs.denominator.gender, Some(Gender::Female));
        assert!(!bcs.denominator.requires_diagnosis());
        assert_eq!(bcs.numerator.lookback_days, Some(821));
    }

    #[test]
    fn test_colorectal_accepts_several_event_kinds() {
        let registry = standard_registry().unwrap();
        let kinds: Vec<EventKind> = registry
            .get("COL")
            .unwrap()
            .numerator
            .events
            .iter()
            .map(|e| e.kind)
            .collect();

        assert_eq!(kinds, vec![EventKind::Procedure, EventKind::Lab]);
    }
}
