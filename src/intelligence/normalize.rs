//! Boundary between the extraction step and the engine.
//!
//! Turns `(name, LabValue)` pairs into validated `LabInput`s. Anything the
//! engine cannot grade is reported as a `SkipReason` instead of an error, so
//! one bad line never sinks the whole panel.

use crate::models::{LabInput, LabValue, SkipReason};

/// Values above this are treated as extraction errors.
pub const MAX_PLAUSIBLE_VALUE: f64 = 1_000_000.0;

/// Validate one extracted entry.
pub fn normalize_entry(name: &str, value: &LabValue) -> Result<LabInput, SkipReason> {
    let name = name.trim();
    if name.is_empty() {
        return Err(SkipReason::EmptyName);
    }

    let (value, unit) = match value {
        LabValue::Bare(v) => (*v, ""),
        LabValue::WithUnit { value, unit } => (*value, unit.trim()),
        LabValue::Unparsed(_) => return Err(SkipReason::NonNumeric),
    };

    if !value.is_finite() {
        return Err(SkipReason::NonFinite);
    }
    if value < 0.0 {
        return Err(SkipReason::Negative);
    }
    if value > MAX_PLAUSIBLE_VALUE {
        return Err(SkipReason::ImplausiblyLarge);
    }

    Ok(LabInput::new(name.to_string(), value, unit.to_string()))
}

/// Readable name for a test the repository does not know:
/// underscores become spaces and each word is capitalized.
pub fn title_case(name: &str) -> String {
    name.replace('_', " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
