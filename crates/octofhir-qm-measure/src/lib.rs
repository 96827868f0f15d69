//! Quality measure specifications
//!
//! This crate provides:
//! - Code sets spanning one or more coding systems
//! - Typed measure specifications (denominator and numerator criteria)
//! - A validating JSON parser that rejects malformed measures one at a time
//! - The measure registry handed to the evaluation engine
//! - A catalog of standard measures

pub mod catalog;
pub mod code_set;
pub mod error;
pub mod parser;
pub mod registry;
pub mod specification;

pub use catalog::{STANDARD_MEASURES_JSON, standard_registry};
pub use code_set::CodeSet;
pub use error::{SpecError, SpecResult};
pub use parser::{parse_measure, parse_measures};
pub use registry::MeasureRegistry;
pub use specification::{
    AgeRange, DenominatorCriteria, EventKind, MeasureSpecification, NumeratorCriteria,
    NumeratorEvent,
};
