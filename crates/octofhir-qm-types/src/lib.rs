//! Quality measure data types
//!
//! This crate defines the in-memory data the measure engine consumes:
//! - Code systems and code normalization
//! - Claim records as handed over by a claims loader
//! - Per-patient claim histories with derived demographics

pub mod claim;
pub mod code_system;
pub mod history;

pub use claim::{ClaimRecord, Gender, PatientId};
pub use code_system::{CodeSystem, normalize_code};
pub use history::{PatientHistory, age_in_years, group_by_patient};
