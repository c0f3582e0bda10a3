use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Diagnova";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable naming a directory with replacement reference data.
pub const REFERENCE_DIR_ENV: &str = "DIAGNOVA_REFERENCE_DIR";

/// File names expected inside a reference data directory.
pub const REFERENCE_RANGES_FILE: &str = "reference_ranges.json";
pub const TEST_KNOWLEDGE_FILE: &str = "test_knowledge.json";

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "diagnova_lib=info,diagnova=info"
}

/// Directory overriding the bundled reference data, if configured.
pub fn reference_data_dir() -> Option<PathBuf> {
    std::env::var_os(REFERENCE_DIR_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
