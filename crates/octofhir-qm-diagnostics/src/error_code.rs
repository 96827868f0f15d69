//! Quality measure error codes following a structured numbering system
//!
//! Error code ranges:
//! - QM0100-QM0199: Specification errors (malformed measure definitions)
//! - QM0200-QM0299: Data quality issues (claim records)
//! - QM0300-QM0399: Evaluation errors (run configuration, unknown measures)
//! - QM0400-QM0499: System errors (I/O, serialization)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Error code identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ErrorCode(u16);

impl ErrorCode {
    /// Create a new error code
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Get the numeric code
    pub const fn code(&self) -> u16 {
        self.0
    }

    /// Get error information for this code
    pub fn info(&self) -> &'static ErrorInfo {
        ERROR_INFO.get(&self.0).unwrap_or(&UNKNOWN_ERROR)
    }

    /// Check if this is a specification error (0100-0199)
    pub const fn is_specification_error(&self) -> bool {
        self.0 >= 100 && self.0 < 200
    }

    /// Check if this is a data quality issue (0200-0299)
    pub const fn is_data_quality_issue(&self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    /// Check if this is an evaluation error (0300-0399)
    pub const fn is_evaluation_error(&self) -> bool {
        self.0 >= 300 && self.0 < 400
    }

    /// Check if this is a system error (0400-0499)
    pub const fn is_system_error(&self) -> bool {
        self.0 >= 400 && self.0 < 500
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QM{:04}", self.0)
    }
}

/// Information about an error code
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// Short description of the error
    pub description: &'static str,
    /// Detailed help text
    pub help: Option<&'static str>,
}

impl ErrorInfo {
    const fn new(description: &'static str) -> Self {
        Self {
            description,
            help: None,
        }
    }

    const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

static UNKNOWN_ERROR: ErrorInfo = ErrorInfo::new("Unknown error");

static ERROR_INFO: LazyLock<HashMap<u16, ErrorInfo>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Specification errors (0100-0199)
    map.insert(100, ErrorInfo::new("Malformed measure specification"));
    map.insert(101, ErrorInfo::new("Duplicate measure identifier"));
    map.insert(102, ErrorInfo::new("Unknown code system in code set")
        .with_help("Use one of ICD10CM, CPT, HCPCS, LOINC or NDC"));
    map.insert(103, ErrorInfo::new("Invalid age range"));
    map.insert(104, ErrorInfo::new("Target rate outside 0.0-1.0"));
    map.insert(105, ErrorInfo::new("Missing numerator criteria")
        .with_help("A measure needs at least one numerator code set"));
    map.insert(106, ErrorInfo::new("Empty code set"));
    map.insert(107, ErrorInfo::new("Invalid specification document"));

    // Data quality issues (0200-0299)
    map.insert(200, ErrorInfo::new("Invalid code system on claim")
        .with_help("The claim is skipped for code matching"));
    map.insert(201, ErrorInfo::new("Missing patient age or birth date"));
    map.insert(202, ErrorInfo::new("Missing enrollment start date"));
    map.insert(203, ErrorInfo::new("Missing claim date"));
    map.insert(204, ErrorInfo::new("Missing patient gender"));

    // Evaluation errors (0300-0399)
    map.insert(300, ErrorInfo::new("Invalid measurement period"));
    map.insert(301, ErrorInfo::new("Unknown measure"));
    map.insert(302, ErrorInfo::new("Measure rejected at load time"));
    map.insert(303, ErrorInfo::new("Worker task failed"));

    // System errors (0400-0499)
    map.insert(400, ErrorInfo::new("Internal error"));
    map.insert(401, ErrorInfo::new("I/O error"));
    map.insert(402, ErrorInfo::new("Serialization error"));

    map
});

// Specification errors
pub const QM0100: ErrorCode = ErrorCode::new(100);
pub const QM0101: ErrorCode = ErrorCode::new(101);
pub const QM0102: ErrorCode = ErrorCode::new(102);
pub const QM0103: ErrorCode = ErrorCode::new(103);
pub const QM0104: ErrorCode = ErrorCode::new(104);
pub const QM0105: ErrorCode = ErrorCode::new(105);
pub const QM0106: ErrorCode = ErrorCode::new(106);
pub const QM0107: ErrorCode = ErrorCode::new(107);

// Data quality issues
pub const QM0200: ErrorCode = ErrorCode::new(200);
pub const QM0201: ErrorCode = ErrorCode::new(201);
pub const QM0202: ErrorCode = ErrorCode::new(202);
pub const QM0203: ErrorCode = ErrorCode::new(203);
pub const QM0204: ErrorCode = ErrorCode::new(204);

// Evaluation errors
pub const QM0300: ErrorCode = ErrorCode::new(300);
pub const QM0301: ErrorCode = ErrorCode::new(301);
pub const QM0302: ErrorCode = ErrorCode::new(302);
pub const QM0303: ErrorCode = ErrorCode::new(303);

// System errors
pub const QM0400: ErrorCode = ErrorCode::new(400);
pub const QM0401: ErrorCode = ErrorCode::new(401);
pub const QM0402: ErrorCode = ErrorCode::new(402);
