//! Measure evaluation engine
//!
//! The engine groups claims into patient histories, resolves the requested
//! measures against a registry and evaluates every patient for every
//! measure. A measure that cannot be resolved is recorded as a failure and
//! the remaining measures are still evaluated.

use crate::aggregate::{PartialAggregate, aggregate};
use crate::cohort::evaluate_denominator;
use crate::compliance::evaluate_numerator;
use crate::context::EvaluationContext;
use crate::error::{EvalError, EvalResult};
use crate::result::{EligibilityResult, EvaluationRun, MeasureOutcome, MeasureReport};
use octofhir_qm_diagnostics::Diagnostic;
use octofhir_qm_measure::{MeasureRegistry, MeasureSpecification};
use octofhir_qm_types::{ClaimRecord, PatientHistory, PatientId, group_by_patient};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::task::JoinSet;

const DEFAULT_CHUNK_SIZE: usize = 512;

/// Evaluates measures over patient histories
#[derive(Debug, Clone)]
pub struct MeasureEngine {
    chunk_size: usize,
}

impl Default for MeasureEngine {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

type Resolved = Result<Arc<MeasureSpecification>, (String, EvalError)>;

impl MeasureEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of patients handed to each worker by
    /// [`evaluate_parallel`](Self::evaluate_parallel)
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Evaluate the measures selected by `ctx` over a batch of claims
    pub fn evaluate(
        &self,
        registry: &MeasureRegistry,
        claims: impl IntoIterator<Item = ClaimRecord>,
        ctx: &EvaluationContext,
    ) -> EvaluationRun {
        let histories = group_by_patient(claims);
        self.evaluate_histories(registry, &histories, ctx)
    }

    /// Evaluate the measures selected by `ctx` over prepared histories
    pub fn evaluate_histories(
        &self,
        registry: &MeasureRegistry,
        histories: &[PatientHistory],
        ctx: &EvaluationContext,
    ) -> EvaluationRun {
        let mut run = EvaluationRun::default();
        for resolved in resolve_measures(registry, ctx) {
            match resolved {
                Ok(spec) => {
                    let outcome = self.evaluate_measure(&spec, histories, ctx);
                    run.outcomes.insert(spec.id.clone(), outcome);
                }
                Err((measure_id, err)) => {
                    run.failures.insert(measure_id, err);
                }
            }
        }
        run
    }

    /// Evaluate one measure over every history
    pub fn evaluate_measure(
        &self,
        spec: &MeasureSpecification,
        histories: &[PatientHistory],
        ctx: &EvaluationContext,
    ) -> MeasureOutcome {
        let patients: BTreeMap<PatientId, EligibilityResult> = histories
            .iter()
            .map(|history| (history.patient_id().to_string(), evaluate_patient(history, spec, ctx)))
            .collect();
        let denominator: BTreeSet<PatientId> = patients
            .values()
            .filter(|r| r.in_denominator)
            .map(|r| r.patient_id.clone())
            .collect();

        let report = aggregate(spec, &denominator, &patients);
        log::debug!(
            "Measure {}: {}/{} compliant ({})",
            spec.id,
            report.numerator_count,
            report.denominator_count,
            report.performance
        );

        MeasureOutcome { report, patients }
    }

    /// Evaluate like [`evaluate`](Self::evaluate), splitting patients across
    /// blocking workers
    ///
    /// Each worker evaluates a chunk of patients for every measure and
    /// returns partial aggregates, which are merged once all workers are
    /// done. The run is identical to the sequential one.
    pub async fn evaluate_parallel(
        &self,
        registry: &MeasureRegistry,
        claims: impl IntoIterator<Item = ClaimRecord>,
        ctx: &EvaluationContext,
    ) -> EvalResult<EvaluationRun> {
        let mut run = EvaluationRun::default();
        let mut specs = Vec::new();
        for resolved in resolve_measures(registry, ctx) {
            match resolved {
                Ok(spec) => specs.push(spec),
                Err((measure_id, err)) => {
                    run.failures.insert(measure_id, err);
                }
            }
        }
        let specs = Arc::new(specs);
        let ctx = Arc::new(ctx.clone());

        let mut histories = group_by_patient(claims).into_iter().peekable();
        let mut workers = JoinSet::new();
        while histories.peek().is_some() {
            let chunk: Vec<PatientHistory> = histories.by_ref().take(self.chunk_size).collect();
            let specs = Arc::clone(&specs);
            let ctx = Arc::clone(&ctx);
            workers.spawn_blocking(move || evaluate_chunk(&chunk, &specs, &ctx));
        }
        log::debug!("Evaluating {} measures on {} workers", specs.len(), workers.len());

        let mut merged: Vec<ChunkResult> = specs.iter().map(|_| ChunkResult::default()).collect();
        while let Some(joined) = workers.join_next().await {
            let chunk = joined.map_err(|e| EvalError::WorkerFailed {
                message: e.to_string(),
            })?;
            for (total, part) in merged.iter_mut().zip(chunk) {
                total.partial.merge(part.partial);
                total.patients.extend(part.patients);
            }
        }

        for (spec, result) in specs.iter().zip(merged) {
            let report = MeasureReport::from_partial(spec, &result.partial);
            run.outcomes.insert(
                spec.id.clone(),
                MeasureOutcome {
                    report,
                    patients: result.patients,
                },
            );
        }
        Ok(run)
    }
}

/// Per-measure output of one worker
#[derive(Debug, Default)]
struct ChunkResult {
    partial: PartialAggregate,
    patients: BTreeMap<PatientId, EligibilityResult>,
}

fn evaluate_chunk(
    histories: &[PatientHistory],
    specs: &[Arc<MeasureSpecification>],
    ctx: &EvaluationContext,
) -> Vec<ChunkResult> {
    specs
        .iter()
        .map(|spec| {
            let patients: BTreeMap<PatientId, EligibilityResult> = histories
                .iter()
                .map(|history| (history.patient_id().to_string(), evaluate_patient(history, spec, ctx)))
                .collect();
            ChunkResult {
                partial: PartialAggregate::from_results(patients.values()),
                patients,
            }
        })
        .collect()
}

/// Resolve the measures requested by `ctx`, in request order
///
/// An empty request selects every loaded measure and reports every measure
/// rejected at load time.
fn resolve_measures(registry: &MeasureRegistry, ctx: &EvaluationContext) -> Vec<Resolved> {
    let rejected = |measure_id: &str| {
        registry.rejection_for(measure_id).map(|err| EvalError::RejectedMeasure {
            measure_id: measure_id.to_string(),
            reason: err.to_string(),
        })
    };

    if ctx.measure_ids().is_empty() {
        let mut resolved: Vec<Resolved> = registry.iter().map(|spec| Ok(Arc::clone(spec))).collect();
        for err in registry.rejected() {
            if let Some(measure_id) = err.measure_id().filter(|id| !registry.contains(id)) {
                if let Some(err) = rejected(measure_id) {
                    log::warn!("Skipping measure: {}", err);
                    resolved.push(Err((measure_id.to_string(), err)));
                }
            }
        }
        return resolved;
    }

    let mut seen = BTreeSet::new();
    ctx.measure_ids()
        .iter()
        .filter(|id| seen.insert(id.as_str()))
        .map(|id| match registry.get(id) {
            Some(spec) => Ok(Arc::clone(spec)),
            None => {
                let err = rejected(id).unwrap_or_else(|| EvalError::unknown_measure(id.clone()));
                log::warn!("Skipping measure: {}", err);
                Err((id.clone(), err))
            }
        })
        .collect()
}

/// Full per-patient result for one measure
fn evaluate_patient(
    history: &PatientHistory,
    spec: &MeasureSpecification,
    ctx: &EvaluationContext,
) -> EligibilityResult {
    let decision = evaluate_denominator(history, spec, ctx);
    let mut warnings: Vec<Diagnostic> = Vec::new();
    let mut push_unique = |diagnostic: Diagnostic| {
        if !warnings.contains(&diagnostic) {
            warnings.push(diagnostic);
        }
    };
    decision.warnings.into_iter().for_each(&mut push_unique);

    let numerator = decision.eligible.then(|| evaluate_numerator(history, spec, ctx));
    let (compliant, event_date, event_kind) = match numerator {
        Some(outcome) => {
            outcome.warnings.into_iter().for_each(&mut push_unique);
            (outcome.compliant, outcome.event_date, outcome.event_kind)
        }
        None => (false, None, None),
    };

    EligibilityResult {
        patient_id: history.patient_id().to_string(),
        measure_id: spec.id.clone(),
        gender: history.gender(),
        in_denominator: decision.eligible,
        failed_criterion: decision.failed,
        compliant,
        event_date,
        event_kind,
        days_since_event: event_date.map(|date| (ctx.reference_date() - date).num_days()),
        gap_in_care: decision.eligible && !compliant,
        needs_review: !warnings.is_empty(),
        warnings,
    }
}
