//! Clinical quality measure engine for claims data
//!
//! This crate evaluates standardized quality measures over in-memory claim
//! records:
//! - Loading and validating measure specifications from JSON
//! - Building the eligible population (denominator) of each measure
//! - Deciding compliance (numerator) within lookback windows
//! - Aggregating rates, target performance and gaps in care
//!
//! # Example
//!
//! ```ignore
//! use octofhir_qm::{EvaluationContext, MeasureEngine, standard_registry};
//!
//! let registry = standard_registry()?;
//! let ctx = EvaluationContext::builder()
//!     .measurement_period(start, end)
//!     .build()?;
//!
//! let run = MeasureEngine::new().evaluate(&registry, claims, &ctx);
//! for report in run.reports() {
//!     println!("{}: {} ({})", report.measure_id, report.rounded_rate(4), report.performance);
//! }
//! ```

// Re-export all public APIs from internal crates
pub use octofhir_qm_diagnostics as diagnostics;
pub use octofhir_qm_eval as eval;
pub use octofhir_qm_measure as measure;
pub use octofhir_qm_types as types;

// Convenience re-exports
pub use octofhir_qm_diagnostics::{Diagnostic, QmError, Result};
pub use octofhir_qm_eval::{
    EligibilityResult, EvaluationContext, EvaluationRun, MeasureEngine, MeasureOutcome,
    MeasureReport, Performance, RunSummary,
};
pub use octofhir_qm_measure::{MeasureRegistry, MeasureSpecification, standard_registry};
pub use octofhir_qm_types::{ClaimRecord, CodeSystem, Gender};

/// Load measures from a JSON document and evaluate them over `claims`
///
/// Measures rejected while loading do not stop the run; they show up in
/// [`EvaluationRun::failures`] like any other measure that could not be
/// evaluated. Only an unreadable document is an error.
pub fn evaluate_measures(
    measures_json: &str,
    claims: impl IntoIterator<Item = ClaimRecord>,
    ctx: &EvaluationContext,
) -> Result<EvaluationRun> {
    let registry = MeasureRegistry::from_json(measures_json)?;
    let run = MeasureEngine::new().evaluate(&registry, claims, ctx);

    let summary = run.summary();
    log::debug!(
        "Evaluated {} measures ({} failed, {} meeting target)",
        summary.measures_evaluated,
        summary.measures_failed,
        summary.measures_meeting_target
    );
    Ok(run)
}
