use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use crate::models::{
    AssessedResult, LabInput, LabPanel, PatientContext, Pattern, Report, SkippedValue,
    TestDefinition,
};

use super::assessment::RiskAssessor;
use super::detection::PatternDetector;
use super::knowledge::KnowledgeBase;
use super::normalize::normalize_entry;
use super::reference::ReferenceRangeRepository;
use super::report::build_report;
use super::types::{InterpretError, LabInterpreter};

/// Default implementation of the interpretation pipeline.
/// Holds only immutable data, so one instance can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct DefaultLabInterpreter {
    pub(crate) assessor: RiskAssessor,
    pub(crate) detector: PatternDetector,
    pub(crate) knowledge: Arc<KnowledgeBase>,
}

impl DefaultLabInterpreter {
    pub fn new(repository: Arc<ReferenceRangeRepository>, knowledge: Arc<KnowledgeBase>) -> Self {
        Self {
            assessor: RiskAssessor::new(repository),
            detector: PatternDetector::standard(),
            knowledge,
        }
    }

    /// Interpreter over the reference data compiled into the binary.
    pub fn bundled() -> Result<Self, InterpretError> {
        Ok(Self::new(
            Arc::new(ReferenceRangeRepository::bundled()?),
            Arc::new(KnowledgeBase::bundled()?),
        ))
    }

    pub fn with_detector(mut self, detector: PatternDetector) -> Self {
        self.detector = detector;
        self
    }

    pub fn assessor(&self) -> &RiskAssessor {
        &self.assessor
    }

    /// Split a panel into validated inputs and skipped entries.
    fn normalize_panel(&self, panel: &LabPanel) -> (Vec<LabInput>, Vec<SkippedValue>) {
        let mut inputs = Vec::with_capacity(panel.len());
        let mut skipped = Vec::new();

        for (name, value) in panel.iter() {
            match normalize_entry(name, value) {
                Ok(input) => inputs.push(input),
                Err(reason) => {
                    tracing::debug!(test = %name, reason = %reason, "Skipping lab value");
                    skipped.push(SkippedValue {
                        name: name.trim().to_string(),
                        reason,
                    });
                }
            }
        }

        (inputs, skipped)
    }

    /// Definitions for the analyzed tests, in result order, each at most once.
    fn glossary(&self, results: &[AssessedResult]) -> Vec<TestDefinition> {
        let mut seen = HashSet::new();
        results
            .iter()
            .filter_map(|r| {
                let key = r.test_key.as_deref().unwrap_or(&r.name);
                self.knowledge.describe(key)
            })
            .filter(|definition| seen.insert(definition.test_key.clone()))
            .cloned()
            .collect()
    }
}

impl LabInterpreter for DefaultLabInterpreter {
    fn assess(&self, input: &LabInput, patient: &PatientContext) -> AssessedResult {
        self.assessor.assess(input, patient)
    }

    fn detect(&self, results: &[AssessedResult]) -> Vec<Pattern> {
        self.detector.detect(results)
    }

    fn build_report(&self, results: Vec<AssessedResult>, patterns: Vec<Pattern>) -> Report {
        build_report(results, patterns)
    }

    fn analyze(&self, panel: &LabPanel, patient: &PatientContext) -> Report {
        let start = Instant::now();

        let (inputs, skipped) = self.normalize_panel(panel);
        let results: Vec<AssessedResult> = inputs
            .iter()
            .map(|input| self.assess(input, patient))
            .collect();
        let patterns = self.detect(&results);
        let glossary = self.glossary(&results);
        let report = self.build_report(results, patterns);

        tracing::info!(
            analyzed = report.results.len(),
            skipped = skipped.len(),
            normal = report.counts.normal,
            borderline = report.counts.borderline,
            abnormal = report.counts.abnormal,
            patterns = report.patterns.len(),
            processing_ms = start.elapsed().as_millis() as u64,
            "Lab analysis complete"
        );

        Report {
            skipped,
            glossary,
            ..report
        }
    }
}
