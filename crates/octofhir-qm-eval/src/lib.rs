//! Quality Measure Evaluation Engine
//!
//! This crate evaluates quality measures against in-memory claim histories:
//!
//! - **Code Matcher**: exact and prefix matching of claim codes against code sets
//! - **Temporal Windows**: lookback windows, measurement periods, continuous enrollment
//! - **Cohort Builder**: denominator membership (age, gender, enrollment, diagnosis, exclusions)
//! - **Compliance Evaluator**: numerator compliance with the most recent qualifying event
//! - **Measure Aggregator**: counts, rates, target classification and gaps in care
//!
//! # Example
//!
//! ```ignore
//! use octofhir_qm_eval::{EvaluationContext, MeasureEngine};
//! use octofhir_qm_measure::standard_registry;
//!
//! let registry = standard_registry()?;
//! let ctx = EvaluationContext::builder()
//!     .measurement_period(start, end)
//!     .build()?;
//!
//! let run = MeasureEngine::new().evaluate(&registry, claims, &ctx);
//! for outcome in run.outcomes.values() {
//!     println!("{}: {:.4}", outcome.report.measure_id, outcome.report.rate);
//! }
//! ```
//!
//! # Evaluation model
//!
//! Every patient is evaluated independently and specifications are shared
//! read-only, so patients can be split across workers freely. Per-worker
//! partial aggregates combine associatively; see [`PartialAggregate`].

pub mod aggregate;
pub mod cohort;
pub mod compliance;
pub mod context;
pub mod engine;
pub mod error;
pub mod result;
pub mod terminology;
pub mod window;

pub use aggregate::{PartialAggregate, StratumCounts, aggregate, gaps_in_care};
pub use cohort::{Criterion, DenominatorDecision, build_denominator, evaluate_denominator};
pub use compliance::{NumeratorOutcome, evaluate_numerator};
pub use context::{EvaluationContext, EvaluationContextBuilder, MeasurementPeriod};
pub use engine::MeasureEngine;
pub use error::{EvalError, EvalResult};
pub use result::{
    EligibilityResult, EvaluationRun, GenderStratum, MeasureOutcome, MeasureReport, Performance,
    RunSummary,
};
pub use terminology::{claim_matches, history_matches, matches};
pub use window::{ComplianceWindow, enrollment_satisfied, in_period, in_window};
