use thiserror::Error;

use crate::models::{AssessedResult, LabInput, LabPanel, PatientContext, Pattern, Report};

// ---------------------------------------------------------------------------
// InterpretError
// ---------------------------------------------------------------------------

/// Failures of the interpretation engine.
///
/// Data-quality problems in a lab panel never show up here: unknown tests and
/// malformed values degrade inside the report. These variants cover startup
/// (reference data) and broken caller contracts.
#[derive(Error, Debug)]
pub enum InterpretError {
    #[error("Reference data load failed ({0}): {1}")]
    ReferenceDataLoad(String, String),

    #[error("Reference data parse failed ({0}): {1}")]
    ReferenceDataParse(String, String),

    #[error("Invalid reference range for {test}: {detail}")]
    InvalidReferenceRange { test: String, detail: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Value for {test} is not a finite number")]
    NonFiniteValue { test: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// LabInterpreter trait
// ---------------------------------------------------------------------------

/// The interpretation pipeline: assess each value, detect cross-parameter
/// patterns, then aggregate. Every stage is a pure function of its inputs
/// and the shared reference data.
pub trait LabInterpreter {
    /// Grade one validated measurement.
    fn assess(&self, input: &LabInput, patient: &PatientContext) -> AssessedResult;

    /// Cross-parameter patterns over one batch, in rule order.
    fn detect(&self, results: &[AssessedResult]) -> Vec<Pattern>;

    /// Counts, summary and next steps.
    fn build_report(&self, results: Vec<AssessedResult>, patterns: Vec<Pattern>) -> Report;

    /// Full pipeline over a raw panel. Malformed entries are skipped and
    /// listed in `Report::skipped`.
    fn analyze(&self, panel: &LabPanel, patient: &PatientContext) -> Report;
}
