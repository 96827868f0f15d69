//! Temporal window evaluation
//!
//! All dates are calendar dates; differences are exact day counts and every
//! window is inclusive on both ends.

use crate::context::{EvaluationContext, MeasurementPeriod};
use chrono::{Days, NaiveDate};
use octofhir_qm_measure::MeasureSpecification;

/// Check `reference - lookback_days <= event <= reference`
pub fn in_window(event: NaiveDate, reference: NaiveDate, lookback_days: u32) -> bool {
    let start = reference
        .checked_sub_days(Days::new(u64::from(lookback_days)))
        .unwrap_or(NaiveDate::MIN);
    (start..=reference).contains(&event)
}

/// Check `period.start <= event <= period.end`
pub fn in_period(event: NaiveDate, period: &MeasurementPeriod) -> bool {
    period.contains(event)
}

/// Check that enrollment starting at `enrollment_start` covers `min_days`
///
/// Covered days are counted inclusively: enrollment from January 1st through
/// a December 31st reference date covers 365 days. Enrollment is assumed to
/// be one continuous span.
pub fn enrollment_satisfied(enrollment_start: NaiveDate, reference: NaiveDate, min_days: u32) -> bool {
    if min_days == 0 {
        return true;
    }
    if enrollment_start > reference {
        return false;
    }
    let covered = (reference - enrollment_start).num_days() + 1;
    covered >= i64::from(min_days)
}

/// Window in which numerator events are credited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplianceWindow {
    /// A fixed number of days up to the reference date
    Lookback { reference: NaiveDate, days: u32 },
    /// The run's measurement period
    Period(MeasurementPeriod),
}

impl ComplianceWindow {
    /// Window for `spec`: its lookback if set, else the measurement period
    pub fn for_measure(spec: &MeasureSpecification, ctx: &EvaluationContext) -> Self {
        match spec.numerator.lookback_days {
            Some(days) => Self::Lookback {
                reference: ctx.reference_date(),
                days,
            },
            None => Self::Period(*ctx.measurement_period()),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        match self {
            Self::Lookback { reference, days } => in_window(date, *reference, *days),
            Self::Period(period) => in_period(date, period),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_window_boundaries_inclusive() {
        let reference = date(2023, 12, 31);
        assert!(in_window(date(2023, 12, 31), reference, 365));
        assert!(in_window(date(2022, 12, 31), reference, 365));
        assert!(!in_window(date(2022, 12, 30), reference, 365));
        assert!(!in_window(date(2024, 1, 1), reference, 365));
    }

    #[test]
    fn test_zero_lookback_is_same_day() {
        let reference = date(2023, 6, 1);
        assert!(in_window(reference, reference, 0));
        assert!(!in_window(date(2023, 5, 31), reference, 0));
    }

    #[test]
    fn test_enrollment_counts_covered_days() {
        let reference = date(2023, 12, 31);
        assert!(enrollment_satisfied(date(2023, 1, 1), reference, 365));
        assert!(!enrollment_satisfied(date(2023, 1, 2), reference, 365));
        assert!(!enrollment_satisfied(date(2024, 1, 1), reference, 1));
        assert!(enrollment_satisfied(date(2024, 1, 1), reference, 0));
    }

    #[test]
    fn test_huge_lookback_saturates() {
        assert!(in_window(date(1900, 1, 1), date(2023, 1, 1), u32::MAX));
    }
}
