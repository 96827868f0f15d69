//! Quality measure diagnostics and error handling
//!
//! This crate provides the error handling infrastructure shared by the measure
//! engine crates: structured error codes, severities, diagnostics attached to
//! patient results, and the top-level [`QmError`].

mod error;
mod error_code;

pub use error::*;
pub use error_code::*;

/// Result type for quality measure operations
pub type Result<T> = std::result::Result<T, QmError>;
