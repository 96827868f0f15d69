//! Evaluation errors for the measure engine

use chrono::NaiveDate;
use octofhir_qm_diagnostics::{ErrorCode, QM0200, QM0300, QM0301, QM0302, QM0303, QM0400, QmError};
use thiserror::Error;

/// Result type for evaluation operations
pub type EvalResult<T> = Result<T, EvalError>;

/// Errors that can occur during measure evaluation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    /// Claim carries a code system outside the recognized enumeration
    #[error("Invalid code system: {system}")]
    InvalidCodeSystem { system: String },

    /// Measurement period with start after end
    #[error("Invalid measurement period: {start} is after {end}")]
    InvalidPeriod { start: NaiveDate, end: NaiveDate },

    /// Neither a reference date nor a measurement period was configured
    #[error("Evaluation context needs a reference date or a measurement period")]
    MissingReferenceDate,

    /// Requested measure is not in the registry
    #[error("Unknown measure: {measure_id}")]
    UnknownMeasure { measure_id: String },

    /// Requested measure failed validation when the registry was loaded
    #[error("Measure '{measure_id}' was rejected at load time: {reason}")]
    RejectedMeasure { measure_id: String, reason: String },

    /// A parallel worker panicked or was cancelled
    #[error("Evaluation worker failed: {message}")]
    WorkerFailed { message: String },

    /// Internal error (should not happen)
    #[error("Internal evaluation error: {message}")]
    Internal { message: String },
}

impl EvalError {
    /// Create an invalid code system error
    pub fn invalid_code_system(system: impl Into<String>) -> Self {
        Self::InvalidCodeSystem {
            system: system.into(),
        }
    }

    /// Create an unknown measure error
    pub fn unknown_measure(measure_id: impl Into<String>) -> Self {
        Self::UnknownMeasure {
            measure_id: measure_id.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidCodeSystem { .. } => QM0200,
            Self::InvalidPeriod { .. } | Self::MissingReferenceDate => QM0300,
            Self::UnknownMeasure { .. } => QM0301,
            Self::RejectedMeasure { .. } => QM0302,
            Self::WorkerFailed { .. } => QM0303,
            Self::Internal { .. } => QM0400,
        }
    }

    fn measure_id(&self) -> Option<String> {
        match self {
            Self::UnknownMeasure { measure_id } | Self::RejectedMeasure { measure_id, .. } => {
                Some(measure_id.clone())
            }
            _ => None,
        }
    }
}

impl From<EvalError> for QmError {
    fn from(err: EvalError) -> Self {
        QmError::evaluation(err.code(), err.to_string(), err.measure_id())
    }
}
