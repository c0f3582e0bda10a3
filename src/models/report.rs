use serde::{Deserialize, Serialize};

use super::enums::{Priority, SkipReason, Tier};
use super::lab::AssessedResult;

/// A cross-parameter signature found in one batch of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub title: String,
    pub evidence: String,
    pub insight: String,
    pub severity: Tier,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextStep {
    #[serde(rename = "priority_tag")]
    pub priority: Priority,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TierCounts {
    pub normal: usize,
    pub borderline: usize,
    pub abnormal: usize,
}

impl TierCounts {
    pub fn tally(results: &[AssessedResult]) -> Self {
        results.iter().fold(Self::default(), |mut counts, r| {
            match r.tier {
                Tier::Normal => counts.normal += 1,
                Tier::Borderline => counts.borderline += 1,
                Tier::Abnormal => counts.abnormal += 1,
            }
            counts
        })
    }

    pub fn total(&self) -> usize {
        self.normal + self.borderline + self.abnormal
    }
}

/// An input entry left out of the results, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedValue {
    pub name: String,
    pub reason: SkipReason,
}

/// Plain-language background for one test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestDefinition {
    pub test_key: String,
    pub definition: String,
    #[serde(default)]
    pub functions: Vec<String>,
    #[serde(default)]
    pub common_causes_low: Vec<String>,
    #[serde(default)]
    pub common_causes_high: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub results: Vec<AssessedResult>,
    pub patterns: Vec<Pattern>,
    pub counts: TierCounts,
    pub summary: String,
    pub next_steps: Vec<NextStep>,
    #[serde(default)]
    pub skipped: Vec<SkippedValue>,
    #[serde(default)]
    pub glossary: Vec<TestDefinition>,
}
