pub mod config;
pub mod intelligence;
pub mod models;

use std::io::{Read, Write};
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use intelligence::{
    DefaultLabInterpreter, InterpretError, KnowledgeBase, LabInterpreter,
    ReferenceRangeRepository,
};
use models::{AnalysisRequest, Report};

/// Build the interpreter, preferring reference data from
/// `DIAGNOVA_REFERENCE_DIR` over the bundled copy.
pub fn load_interpreter() -> Result<DefaultLabInterpreter, InterpretError> {
    match config::reference_data_dir() {
        Some(dir) => {
            tracing::warn!(dir = %dir.display(), "Using reference data override");
            let repository = ReferenceRangeRepository::load(&dir)?;
            let knowledge = KnowledgeBase::load(&dir)?;
            Ok(DefaultLabInterpreter::new(
                Arc::new(repository),
                Arc::new(knowledge),
            ))
        }
        None => DefaultLabInterpreter::bundled(),
    }
}

/// Parse one `AnalysisRequest` and run it through the interpreter.
pub fn analyze_request(
    interpreter: &impl LabInterpreter,
    request_json: &str,
) -> Result<Report, InterpretError> {
    let request: AnalysisRequest = serde_json::from_str(request_json)?;
    Ok(interpreter.analyze(&request.values, &request.patient.context()))
}

/// Read a request from `input`, write the report as pretty JSON to `output`.
pub fn process<R: Read, W: Write>(
    interpreter: &impl LabInterpreter,
    mut input: R,
    mut output: W,
) -> Result<(), InterpretError> {
    let mut request_json = String::new();
    input.read_to_string(&mut request_json)?;
    let report = analyze_request(interpreter, &request_json)?;
    serde_json::to_writer_pretty(&mut output, &report)?;
    writeln!(output)?;
    Ok(())
}

pub fn run() -> Result<(), InterpretError> {
    // Logs go to stderr; stdout carries the report.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let interpreter = load_interpreter()?;
    process(&interpreter, std::io::stdin().lock(), std::io::stdout().lock())
}
