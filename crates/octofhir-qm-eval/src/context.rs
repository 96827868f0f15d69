//! Evaluation context for a measure run
//!
//! The context is the configuration surface of a run: the reference date,
//! the measurement period used by measures without an explicit lookback, and
//! the measures to evaluate.

use crate::error::{EvalError, EvalResult};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Inclusive `[start, end]` measurement period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPeriod")]
pub struct MeasurementPeriod {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct RawPeriod {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawPeriod> for MeasurementPeriod {
    type Error = EvalError;

    fn try_from(raw: RawPeriod) -> EvalResult<Self> {
        Self::new(raw.start, raw.end)
    }
}

impl MeasurementPeriod {
    /// Create a period, rejecting a start after the end
    pub fn new(start: NaiveDate, end: NaiveDate) -> EvalResult<Self> {
        if start > end {
            return Err(EvalError::InvalidPeriod { start, end });
        }
        Ok(Self { start, end })
    }

    /// January 1st through December 31st of `year`
    pub fn calendar_year(year: i32) -> EvalResult<Self> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| EvalError::internal(format!("year {} out of range", year)))?;
        let end = NaiveDate::from_ymd_opt(year, 12, 31)
            .ok_or_else(|| EvalError::internal(format!("year {} out of range", year)))?;
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        (self.start..=self.end).contains(&date)
    }
}

/// Configuration of one evaluation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawContext")]
pub struct EvaluationContext {
    reference_date: NaiveDate,
    measurement_period: MeasurementPeriod,
    measure_ids: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawContext {
    reference_date: Option<NaiveDate>,
    measurement_period: Option<MeasurementPeriod>,
    #[serde(default)]
    measure_ids: Vec<String>,
}

impl TryFrom<RawContext> for EvaluationContext {
    type Error = EvalError;

    fn try_from(raw: RawContext) -> EvalResult<Self> {
        let mut builder = EvaluationContextBuilder::new().measures(raw.measure_ids);
        if let Some(date) = raw.reference_date {
            builder = builder.reference_date(date);
        }
        if let Some(period) = raw.measurement_period {
            builder = builder.period(period);
        }
        builder.build()
    }
}

impl EvaluationContext {
    /// Create a context evaluating every loaded measure
    pub fn new(reference_date: NaiveDate, measurement_period: MeasurementPeriod) -> Self {
        Self {
            reference_date,
            measurement_period,
            measure_ids: Vec::new(),
        }
    }

    /// Start building a context
    pub fn builder() -> EvaluationContextBuilder {
        EvaluationContextBuilder::new()
    }

    /// Date against which ages, enrollment and lookbacks are measured
    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    pub fn measurement_period(&self) -> &MeasurementPeriod {
        &self.measurement_period
    }

    /// Requested measure ids; empty means every loaded measure
    pub fn measure_ids(&self) -> &[String] {
        &self.measure_ids
    }

    /// Restrict the run to the given measures
    pub fn with_measures(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.measure_ids = ids.into_iter().map(Into::into).collect();
        self
    }
}

/// Builder for [`EvaluationContext`]
///
/// A missing reference date defaults to the end of the measurement period; a
/// missing period defaults to the calendar year up to the reference date.
#[derive(Debug, Clone, Default)]
pub struct EvaluationContextBuilder {
    reference_date: Option<NaiveDate>,
    period: Option<MeasurementPeriod>,
    period_bounds: Option<(NaiveDate, NaiveDate)>,
    measure_ids: Vec<String>,
}

impl EvaluationContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    /// Set the measurement period bounds; validated in [`build`](Self::build)
    pub fn measurement_period(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.period_bounds = Some((start, end));
        self.period = None;
        self
    }

    /// Set an already validated measurement period
    pub fn period(mut self, period: MeasurementPeriod) -> Self {
        self.period = Some(period);
        self.period_bounds = None;
        self
    }

    /// Add one measure to evaluate
    pub fn measure(mut self, id: impl Into<String>) -> Self {
        self.measure_ids.push(id.into());
        self
    }

    /// Add several measures to evaluate
    pub fn measures(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.measure_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> EvalResult<EvaluationContext> {
        let period = match (self.period, self.period_bounds) {
            (Some(period), _) => Some(period),
            (None, Some((start, end))) => Some(MeasurementPeriod::new(start, end)?),
            (None, None) => None,
        };

        let (reference_date, measurement_period) = match (self.reference_date, period) {
            (Some(date), Some(period)) => (date, period),
            (None, Some(period)) => (period.end(), period),
            (Some(date), None) => {
                let start = NaiveDate::from_ymd_opt(date.year(), 1, 1)
                    .ok_or_else(|| EvalError::internal("reference year out of range"))?;
                (date, MeasurementPeriod::new(start, date)?)
            }
            (None, None) => return Err(EvalError::MissingReferenceDate),
        };

        Ok(EvaluationContext {
            reference_date,
            measurement_period,
            measure_ids: self.measure_ids,
        })
    }
}
