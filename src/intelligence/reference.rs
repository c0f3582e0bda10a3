use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::REFERENCE_RANGES_FILE;
use crate::models::{AgeGroup, Gender};

use super::types::InterpretError;

/// Stratum used when no gender or age specific entry applies.
pub const DEFAULT_STRATUM: &str = "default";

static BUNDLED_RANGES: &str = include_str!("../../resources/reference_ranges.json");

/// Normalize a test name to its repository key: trimmed, lowercase,
/// whitespace runs replaced by a single underscore.
pub fn normalize_test_name(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// A normal band for one stratum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

impl Band {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    pub fn is_degenerate(&self) -> bool {
        self.min == self.max
    }
}

/// Panic limits; breaching either forces the most severe tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticalLimits {
    pub low: f64,
    pub high: f64,
}

/// Reference range entry for one test (loaded from reference_ranges.json).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRange {
    pub test_key: String,
    pub display_name: String,
    pub unit: String,
    pub strata: BTreeMap<String, Band>,
    #[serde(default)]
    pub critical: Option<CriticalLimits>,
}

impl ReferenceRange {
    /// Band for a named stratum, including clinical sub-states such as
    /// `prediabetic`.
    pub fn stratum(&self, name: &str) -> Option<Band> {
        self.strata.get(name).copied()
    }

    /// Resolve the band for a patient: exact gender, then exact age group,
    /// then `default`. The `default` variants never count as exact matches.
    pub fn resolve(&self, gender: Gender, age_group: AgeGroup) -> Option<(&str, Band)> {
        let gender_key = (gender != Gender::Default).then_some(gender.as_str());
        let age_key = (age_group != AgeGroup::Default).then_some(age_group.as_str());

        [gender_key, age_key, Some(DEFAULT_STRATUM)]
            .into_iter()
            .flatten()
            .find_map(|key| {
                self.strata
                    .get_key_value(key)
                    .map(|(k, band)| (k.as_str(), *band))
            })
    }

    fn validate(&self) -> Result<(), InterpretError> {
        let invalid = |detail: String| InterpretError::InvalidReferenceRange {
            test: self.test_key.clone(),
            detail,
        };

        if self.test_key.is_empty() || normalize_test_name(&self.test_key) != self.test_key {
            return Err(invalid(format!(
                "key '{}' is not in normalized form",
                self.test_key
            )));
        }
        if self.display_name.trim().is_empty() {
            return Err(invalid("display name is empty".into()));
        }
        if self.strata.is_empty() {
            return Err(invalid("no strata defined".into()));
        }
        for (name, band) in &self.strata {
            if !band.min.is_finite() || !band.max.is_finite() || band.min >= band.max {
                return Err(invalid(format!(
                    "stratum {} has min {} >= max {}",
                    name, band.min, band.max
                )));
            }
        }
        if let Some(critical) = self.critical {
            if !critical.low.is_finite()
                || !critical.high.is_finite()
                || critical.low >= critical.high
            {
                return Err(invalid(format!(
                    "critical low {} >= high {}",
                    critical.low, critical.high
                )));
            }
        }
        Ok(())
    }
}

/// The band a lookup resolved to, with the entry it came from.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedRange<'a> {
    pub range: &'a ReferenceRange,
    pub stratum: &'a str,
    pub band: Band,
}

impl ResolvedRange<'_> {
    /// `min – max`, followed by the unit when one is given.
    pub fn display(&self, unit: &str) -> String {
        let unit = unit.trim();
        if unit.is_empty() {
            format!("{} – {}", self.band.min, self.band.max)
        } else {
            format!("{} – {} {}", self.band.min, self.band.max, unit)
        }
    }
}

/// Read-only store of reference ranges and critical limits.
///
/// Built once at startup and shared (usually behind an `Arc`) by every
/// assessment; nothing mutates it after construction.
#[derive(Debug, Clone)]
pub struct ReferenceRangeRepository {
    ranges: HashMap<String, ReferenceRange>,
}

impl ReferenceRangeRepository {
    /// Repository built from the ranges compiled into the binary.
    pub fn bundled() -> Result<Self, InterpretError> {
        Self::from_json(REFERENCE_RANGES_FILE, BUNDLED_RANGES)
    }

    /// Load `reference_ranges.json` from a resources directory.
    pub fn load(resources_dir: &Path) -> Result<Self, InterpretError> {
        let path = resources_dir.join(REFERENCE_RANGES_FILE);
        let json = std::fs::read_to_string(&path).map_err(|e| {
            InterpretError::ReferenceDataLoad(path.display().to_string(), e.to_string())
        })?;
        Self::from_json(REFERENCE_RANGES_FILE, &json)
    }

    pub fn from_json(source: &str, json: &str) -> Result<Self, InterpretError> {
        let ranges: Vec<ReferenceRange> = serde_json::from_str(json)
            .map_err(|e| InterpretError::ReferenceDataParse(source.into(), e.to_string()))?;
        Self::from_ranges(ranges)
    }

    /// Validate and index a list of entries. Keys must be unique.
    pub fn from_ranges(ranges: Vec<ReferenceRange>) -> Result<Self, InterpretError> {
        let mut indexed = HashMap::with_capacity(ranges.len());
        for range in ranges {
            range.validate()?;
            if indexed.contains_key(&range.test_key) {
                return Err(InterpretError::InvalidReferenceRange {
                    test: range.test_key,
                    detail: "duplicate entry".into(),
                });
            }
            indexed.insert(range.test_key.clone(), range);
        }
        Ok(Self { ranges: indexed })
    }

    /// Entry for a test name, matched exactly after normalization.
    pub fn get(&self, test_name: &str) -> Option<&ReferenceRange> {
        self.ranges.get(&normalize_test_name(test_name))
    }

    /// Resolve the normal band for a test and patient. `None` means the
    /// range is unavailable, which callers treat as a soft outcome.
    pub fn lookup(
        &self,
        test_name: &str,
        gender: Gender,
        age_group: AgeGroup,
    ) -> Option<ResolvedRange<'_>> {
        let range = self.get(test_name)?;
        let (stratum, band) = range.resolve(gender, age_group)?;
        Some(ResolvedRange {
            range,
            stratum,
            band,
        })
    }

    pub fn critical_limits(&self, test_name: &str) -> Option<CriticalLimits> {
        self.get(test_name).and_then(|r| r.critical)
    }

    /// Known keys, sorted.
    pub fn test_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.ranges.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}
