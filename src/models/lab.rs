use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::enums::{AgeGroup, Gender, Tier};

/// A single value as handed over by the extraction step.
///
/// Extractors emit either a bare number or a `{value, unit}` object. Anything
/// else (strings, nulls, objects with a non-numeric value) lands in
/// `Unparsed` and is skipped during normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabValue {
    Bare(f64),
    WithUnit {
        value: f64,
        #[serde(default, deserialize_with = "null_as_empty")]
        unit: String,
    },
    Unparsed(serde_json::Value),
}

/// Extractors write `"unit": null` when no unit was found.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl From<f64> for LabValue {
    fn from(value: f64) -> Self {
        Self::Bare(value)
    }
}

impl LabValue {
    pub fn with_unit(value: f64, unit: impl Into<String>) -> Self {
        Self::WithUnit {
            value,
            unit: unit.into(),
        }
    }
}

/// Ordered `test name -> value` mapping.
///
/// Deserializes from a JSON object and keeps document order, which decides
/// which result a pattern rule sees first and which findings a summary lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabPanel(Vec<(String, LabValue)>);

impl LabPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<LabValue>) {
        self.0.push((name.into(), value.into()));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LabValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<N: Into<String>, V: Into<LabValue>> FromIterator<(N, V)> for LabPanel {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

impl Serialize for LabPanel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LabPanel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PanelVisitor;

        impl<'de> Visitor<'de> for PanelVisitor {
            type Value = LabPanel;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of test names to lab values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<LabPanel, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, value)) = access.next_entry::<String, LabValue>()? {
                    entries.push((name, value));
                }
                Ok(LabPanel(entries))
            }
        }

        deserializer.deserialize_map(PanelVisitor)
    }
}

/// Patient context selecting the reference stratum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientContext {
    pub gender: Gender,
    pub age_group: AgeGroup,
}

impl PatientContext {
    pub fn new(gender: Gender, age_group: AgeGroup) -> Self {
        Self { gender, age_group }
    }
}

/// Patient details as a caller supplies them. Either an explicit
/// `age_group` or a numeric `age` may be given; the group wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientProfile {
    pub gender: Gender,
    pub age_group: Option<AgeGroup>,
    pub age: Option<u32>,
}

impl PatientProfile {
    pub fn context(&self) -> PatientContext {
        let age_group = self
            .age_group
            .or_else(|| self.age.map(AgeGroup::from_years))
            .unwrap_or_default();
        PatientContext::new(self.gender, age_group)
    }
}

/// One analysis call: patient details plus the extracted values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    #[serde(default)]
    pub patient: PatientProfile,
    pub values: LabPanel,
}

/// A validated, finite, non-negative measurement ready for assessment.
/// Built by `intelligence::normalize_entry` or `RiskAssessor::assess_value`.
#[derive(Debug, Clone, PartialEq)]
pub struct LabInput {
    name: String,
    value: f64,
    unit: String,
}

impl LabInput {
    pub(crate) fn new(name: String, value: f64, unit: String) -> Self {
        Self { name, value, unit }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }
}

/// One graded measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessedResult {
    pub name: String,
    /// Repository key the name resolved to; `None` when no range was found.
    pub test_key: Option<String>,
    pub value: f64,
    pub unit: String,
    pub reference_display: String,
    pub tier: Tier,
    /// 0-100 gauge position; the normal band occupies 30-70.
    pub display_position: f64,
    pub explanation: String,
}
