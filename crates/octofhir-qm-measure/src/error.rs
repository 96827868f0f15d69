//! Specification errors

use octofhir_qm_diagnostics::{
    ErrorCode, QM0100, QM0101, QM0102, QM0103, QM0104, QM0105, QM0106, QM0107, QM0401, QmError,
};
use thiserror::Error;

/// Result type for specification operations
pub type SpecResult<T> = Result<T, SpecError>;

/// Errors raised while loading or validating measure specifications
///
/// Everything except [`SpecError::InvalidDocument`] and [`SpecError::Io`]
/// affects a single measure only.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpecError {
    /// Measure is structurally incomplete or has the wrong shape
    #[error("Malformed specification for measure '{measure_id}': {message}")]
    Malformed { measure_id: String, message: String },

    /// Two measures share one identifier
    #[error("Duplicate measure identifier: {measure_id}")]
    DuplicateMeasure { measure_id: String },

    /// Code set lists a code system outside the recognized enumeration
    #[error("Unknown code system '{system}' in code set '{code_set}' of measure '{measure_id}'")]
    UnknownCodeSystem {
        measure_id: String,
        code_set: String,
        system: String,
    },

    /// Age range bounds are inverted
    #[error("Invalid age range [{min}, {max}] for measure '{measure_id}'")]
    InvalidAgeRange { measure_id: String, min: u32, max: u32 },

    /// Target rate outside 0.0-1.0
    #[error("Target rate {rate} for measure '{measure_id}' is outside 0.0-1.0")]
    InvalidTargetRate { measure_id: String, rate: f64 },

    /// No numerator code set at all
    #[error("Measure '{measure_id}' has no numerator criteria")]
    MissingNumerator { measure_id: String },

    /// Numerator code set without codes
    #[error("Code set '{code_set}' of measure '{measure_id}' lists no codes")]
    EmptyCodeSet { measure_id: String, code_set: String },

    /// Document is not valid JSON or has no measures
    #[error("Invalid specification document: {0}")]
    InvalidDocument(String),

    /// Reading the document failed
    #[error("I/O error: {0}")]
    Io(String),
}

impl SpecError {
    /// Create a malformed specification error
    pub fn malformed(measure_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Malformed {
            measure_id: measure_id.into(),
            message: message.into(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Malformed { .. } => QM0100,
            Self::DuplicateMeasure { .. } => QM0101,
            Self::UnknownCodeSystem { .. } => QM0102,
            Self::InvalidAgeRange { .. } => QM0103,
            Self::InvalidTargetRate { .. } => QM0104,
            Self::MissingNumerator { .. } => QM0105,
            Self::EmptyCodeSet { .. } => QM0106,
            Self::InvalidDocument(_) => QM0107,
            Self::Io(_) => QM0401,
        }
    }

    /// Measure the error applies to, if it is scoped to one measure
    pub fn measure_id(&self) -> Option<&str> {
        match self {
            Self::Malformed { measure_id, .. }
            | Self::DuplicateMeasure { measure_id }
            | Self::UnknownCodeSystem { measure_id, .. }
            | Self::InvalidAgeRange { measure_id, .. }
            | Self::InvalidTargetRate { measure_id, .. }
            | Self::MissingNumerator { measure_id }
            | Self::EmptyCodeSet { measure_id, .. } => Some(measure_id),
            Self::InvalidDocument(_) | Self::Io(_) => None,
        }
    }
}

impl From<SpecError> for QmError {
    fn from(err: SpecError) -> Self {
        match err {
            SpecError::Io(message) => QmError::system(QM0401, message),
            other => QmError::specification(
                other.code(),
                other.to_string(),
                other.measure_id().map(String::from),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_scoped_errors() {
        let err = SpecError::MissingNumerator {
            measure_id: "CDC".to_string(),
        };
        assert_eq!(err.code(), QM0105);
        assert_eq!(err.measure_id(), Some("CDC"));

        let err = SpecError::InvalidDocument("expected value".to_string());
        assert_eq!(err.measure_id(), None);
    }

    #[test]
    fn test_into_qm_error() {
        let err: QmError = SpecError::malformed("BCS", "missing ageRange").into();
        assert_eq!(err.code(), QM0100);
        assert!(err.to_string().contains("missing ageRange"));

        let err: QmError = SpecError::Io("not found".to_string()).into();
        assert!(matches!(err, QmError::System { .. }));
    }
}
