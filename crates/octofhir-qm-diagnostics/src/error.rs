//! Quality measure error types

use crate::ErrorCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Error - the affected measure cannot be evaluated
    Error,
    /// Warning - data quality issue, evaluation continues
    Warning,
    /// Information - informational message
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// A diagnostic message attached to a measure or patient result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    /// Severity level
    pub severity: Severity,
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Measure the diagnostic was raised for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measure_id: Option<String>,
    /// Patient the diagnostic was raised for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    /// Additional context or help
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    /// Create a new warning diagnostic
    pub fn warning(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    fn new(severity: Severity, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            measure_id: None,
            patient_id: None,
            help: code.info().help.map(String::from),
        }
    }

    /// Attach the measure identifier
    pub fn for_measure(mut self, measure_id: impl Into<String>) -> Self {
        self.measure_id = Some(measure_id.into());
        self
    }

    /// Attach the patient identifier
    pub fn for_patient(mut self, patient_id: impl Into<String>) -> Self {
        self.patient_id = Some(patient_id.into());
        self
    }

    /// Set help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} - {}", self.severity, self.code, self.message)?;
        if let Some(measure) = &self.measure_id {
            write!(f, " [measure {}]", measure)?;
        }
        if let Some(patient) = &self.patient_id {
            write!(f, " [patient {}]", patient)?;
        }
        Ok(())
    }
}

/// Main quality measure error type
#[derive(Debug, Clone, Error)]
pub enum QmError {
    /// Measure specification error
    #[error("{code}: {message}")]
    Specification {
        code: ErrorCode,
        message: String,
        measure_id: Option<String>,
    },

    /// Evaluation error
    #[error("{code}: {message}")]
    Evaluation {
        code: ErrorCode,
        message: String,
        measure_id: Option<String>,
    },

    /// System error
    #[error("{code}: {message}")]
    System { code: ErrorCode, message: String },

    /// Multiple errors collected
    #[error("Multiple errors: {}", .0.len())]
    Multiple(Vec<QmError>),
}

impl QmError {
    /// Create a specification error
    pub fn specification(
        code: ErrorCode,
        message: impl Into<String>,
        measure_id: Option<String>,
    ) -> Self {
        Self::Specification {
            code,
            message: message.into(),
            measure_id,
        }
    }

    /// Create an evaluation error
    pub fn evaluation(code: ErrorCode, message: impl Into<String>, measure_id: Option<String>) -> Self {
        Self::Evaluation {
            code,
            message: message.into(),
            measure_id,
        }
    }

    /// Create a system error
    pub fn system(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::System {
            code,
            message: message.into(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Specification { code, .. } => *code,
            Self::Evaluation { code, .. } => *code,
            Self::System { code, .. } => *code,
            Self::Multiple(errors) => errors.first().map(|e| e.code()).unwrap_or(ErrorCode::new(0)),
        }
    }

    /// Convert to a diagnostic
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Self::Specification { code, message, measure_id }
            | Self::Evaluation { code, message, measure_id } => {
                let diag = Diagnostic::error(*code, message.clone());
                match measure_id {
                    Some(id) => diag.for_measure(id.clone()),
                    None => diag,
                }
            }
            Self::System { code, message } => Diagnostic::error(*code, message.clone()),
            Self::Multiple(errors) => match errors.first() {
                Some(first) => first.to_diagnostic(),
                None => Diagnostic::error(ErrorCode::new(0), "Unknown error"),
            },
        }
    }
}
