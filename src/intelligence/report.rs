use crate::models::{AssessedResult, NextStep, Pattern, Priority, Report, Tier, TierCounts};

use super::messages::{MessageTemplates, EDUCATIONAL_DISCLAIMER};

pub const MAX_URGENT_STEPS: usize = 2;
pub const MAX_CONSULT_STEPS: usize = 2;
pub const MAX_PATTERN_STEPS: usize = 2;
pub const MAX_NEXT_STEPS: usize = 5;
pub const MAX_KEY_FINDINGS: usize = 3;
pub const MAX_SUMMARY_PATTERNS: usize = 3;

/// Merge graded results and detected patterns into a report.
///
/// Never fails: an empty batch yields zero counts, an explanatory
/// summary and a single prompt to re-check the input.
pub fn build_report(results: Vec<AssessedResult>, patterns: Vec<Pattern>) -> Report {
    let counts = TierCounts::tally(&results);
    let summary = build_summary(&results, &patterns, &counts);
    let next_steps = if results.is_empty() {
        vec![NextStep {
            priority: Priority::Monitor,
            text: MessageTemplates::recheck_input_step(),
        }]
    } else {
        build_next_steps(&results, &patterns)
    };

    Report {
        results,
        patterns,
        counts,
        summary,
        next_steps,
        skipped: Vec::new(),
        glossary: Vec::new(),
    }
}

/// Deterministic narrative: tier counts, key findings, pattern titles,
/// then the disclaimer.
pub fn build_summary(
    results: &[AssessedResult],
    patterns: &[Pattern],
    counts: &TierCounts,
) -> String {
    if results.is_empty() {
        return format!(
            "{}\n\n{}",
            MessageTemplates::no_values_summary(),
            EDUCATIONAL_DISCLAIMER
        );
    }

    let overview = [
        MessageTemplates::abnormal_count(counts.abnormal),
        MessageTemplates::borderline_count(counts.borderline),
        MessageTemplates::normal_count(counts.normal),
    ];
    let mut sections = vec![overview.join(" ")];

    let findings: Vec<String> = results
        .iter()
        .filter(|r| !r.tier.is_normal())
        .take(MAX_KEY_FINDINGS)
        .map(|r| MessageTemplates::key_finding(&r.name, r.value, &r.unit, r.tier.label()))
        .collect();
    if !findings.is_empty() {
        sections.push(format!("Key Findings:\n{}", findings.join("\n")));
    }

    let titles: Vec<String> = patterns
        .iter()
        .take(MAX_SUMMARY_PATTERNS)
        .map(|p| format!("- {}", p.title))
        .collect();
    if !titles.is_empty() {
        sections.push(format!("Detected Patterns:\n{}", titles.join("\n")));
    }

    sections.push(EDUCATIONAL_DISCLAIMER.to_string());
    sections.join("\n\n")
}

/// Ranked actions: urgent, then consult, then monitor.
pub fn build_next_steps(results: &[AssessedResult], patterns: &[Pattern]) -> Vec<NextStep> {
    let by_tier = |tier: Tier| results.iter().filter(move |r| r.tier == tier);

    let urgent = by_tier(Tier::Abnormal)
        .take(MAX_URGENT_STEPS)
        .map(|r| NextStep {
            priority: Priority::Urgent,
            text: MessageTemplates::urgent_step(&r.name),
        });
    let consult = by_tier(Tier::Borderline)
        .take(MAX_CONSULT_STEPS)
        .map(|r| NextStep {
            priority: Priority::Consult,
            text: MessageTemplates::consult_step(&r.name),
        });
    let monitor = patterns.iter().take(MAX_PATTERN_STEPS).map(|p| NextStep {
        priority: Priority::Monitor,
        text: MessageTemplates::pattern_step(&p.title, &p.insight),
    });

    let mut steps: Vec<NextStep> = urgent
        .chain(consult)
        .chain(monitor)
        .take(MAX_NEXT_STEPS)
        .collect();
    if steps.is_empty() {
        steps.push(NextStep {
            priority: Priority::Monitor,
            text: MessageTemplates::healthy_step(),
        });
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, value: f64, tier: Tier) -> AssessedResult {
        AssessedResult {
            name: name.into(),
            test_key: None,
            value,
            unit: "u".into(),
            reference_display: String::new(),
            tier,
            display_position: 50.0,
            explanation: String::new(),
        }
    }

    fn pattern(title: &str) -> Pattern {
        Pattern {
            title: title.into(),
            evidence: String::new(),
            insight: format!("{} insight", title),
            severity: Tier::Borderline,
        }
    }

    fn priorities(steps: &[NextStep]) -> Vec<Priority> {
        steps.iter().map(|s| s.priority).collect()
    }

    #[test]
    fn empty_batch_is_well_formed() {
        let report = build_report(Vec::new(), Vec::new());
        assert_eq!(report.counts, TierCounts::default());
        assert!(report.summary.contains("No lab values could be analyzed"));
        assert!(report.summary.contains(EDUCATIONAL_DISCLAIMER));
        assert_eq!(report.next_steps.len(), 1);
        assert_eq!(report.next_steps[0].priority, Priority::Monitor);
        assert!(report.results.is_empty());
        assert!(report.patterns.is_empty());
    }

    #[test]
    fn counts_match_results() {
        let results = vec![
            result("A", 1.0, Tier::Normal),
            result("B", 1.0, Tier::Borderline),
            result("C", 1.0, Tier::Abnormal),
            result("D", 1.0, Tier::Normal),
        ];
        let report = build_report(results, Vec::new());
        assert_eq!(report.counts.normal, 2);
        assert_eq!(report.counts.borderline, 1);
        assert_eq!(report.counts.abnormal, 1);
        assert_eq!(report.counts.total(), report.results.len());
    }

    #[test]
    fn all_normal_gets_single_healthy_step() {
        let steps = build_next_steps(&[result("A", 1.0, Tier::Normal)], &[]);
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].priority, Priority::Monitor);
        assert_eq!(steps[0].text, MessageTemplates::healthy_step());
    }

    #[test]
    fn steps_are_capped_per_kind_and_in_total() {
        let results = vec![
            result("A1", 1.0, Tier::Abnormal),
            result("B1", 1.0, Tier::Borderline),
            result("A2", 1.0, Tier::Abnormal),
            result("B2", 1.0, Tier::Borderline),
            result("A3", 1.0, Tier::Abnormal),
            result("B3", 1.0, Tier::Borderline),
        ];
        let patterns = vec![pattern("P1"), pattern("P2"), pattern("P3")];
        let steps = build_next_steps(&results, &patterns);

        assert_eq!(steps.len(), MAX_NEXT_STEPS);
        assert_eq!(
            priorities(&steps),
            vec![
                Priority::Urgent,
                Priority::Urgent,
                Priority::Consult,
                Priority::Consult,
                Priority::Monitor,
            ]
        );
        assert!(steps[0].text.contains("A1"));
        assert!(steps[1].text.contains("A2"));
        assert!(steps[2].text.contains("B1"));
        assert_eq!(steps[4].text, "P1: P1 insight");
    }

    #[test]
    fn patterns_fill_monitor_slots() {
        let steps = build_next_steps(
            &[result("A", 1.0, Tier::Normal)],
            &[pattern("P1"), pattern("P2"), pattern("P3")],
        );
        assert_eq!(priorities(&steps), vec![Priority::Monitor, Priority::Monitor]);
    }

    #[test]
    fn priorities_never_go_backwards() {
        let results = vec![
            result("B1", 1.0, Tier::Borderline),
            result("A1", 1.0, Tier::Abnormal),
        ];
        let steps = build_next_steps(&results, &[pattern("P1")]);
        let p = priorities(&steps);
        assert!(p.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(p, vec![Priority::Urgent, Priority::Consult, Priority::Monitor]);
    }

    #[test]
    fn summary_lists_counts_findings_and_patterns() {
        let results = vec![
            result("Hemoglobin", 11.2, Tier::Borderline),
            result("WBC Count", 9800.0, Tier::Normal),
            result("Platelets", 45000.0, Tier::Abnormal),
        ];
        let patterns = vec![pattern("Bleeding Risk: Low Platelets")];
        let counts = TierCounts::tally(&results);
        let summary = build_summary(&results, &patterns, &counts);

        assert!(summary.contains(&MessageTemplates::abnormal_count(1)));
        assert!(summary.contains(&MessageTemplates::borderline_count(1)));
        assert!(summary.contains(&MessageTemplates::normal_count(1)));
        assert!(summary.contains("- Hemoglobin: 11.2 u (Borderline)"));
        assert!(summary.contains("- Platelets: 45,000.0 u (Abnormal)"));
        assert!(!summary.contains("WBC Count:"));
        assert!(summary.contains("- Bleeding Risk: Low Platelets"));
        assert!(summary.ends_with(EDUCATIONAL_DISCLAIMER));
    }

    #[test]
    fn summary_caps_findings_and_patterns() {
        let results: Vec<_> = (0..5)
            .map(|i| result(&format!("T{}", i), 1.0, Tier::Abnormal))
            .collect();
        let patterns: Vec<_> = (0..5).map(|i| pattern(&format!("P{}", i))).collect();
        let counts = TierCounts::tally(&results);
        let summary = build_summary(&results, &patterns, &counts);

        assert!(summary.contains("- T2:"));
        assert!(!summary.contains("- T3:"));
        assert!(summary.contains("- P2\n"));
        assert!(!summary.contains("- P3"));
    }

    #[test]
    fn all_normal_summary_has_no_findings_section() {
        let results = vec![result("A", 1.0, Tier::Normal)];
        let summary = build_summary(&results, &[], &TierCounts::tally(&results));
        assert!(summary.contains(&MessageTemplates::abnormal_count(0)));
        assert!(summary.contains(&MessageTemplates::borderline_count(0)));
        assert!(summary.contains(&MessageTemplates::normal_count(1)));
        assert!(!summary.contains("Key Findings"));
        assert!(!summary.contains("Detected Patterns"));
        assert!(summary.ends_with(EDUCATIONAL_DISCLAIMER));
    }

    #[test]
    fn report_is_deterministic() {
        let results = vec![result("Hemoglobin", 11.2, Tier::Borderline)];
        let patterns = vec![pattern("Low Hemoglobin Detected")];
        let a = build_report(results.clone(), patterns.clone());
        let b = build_report(results, patterns);
        assert_eq!(a, b);
    }
}
