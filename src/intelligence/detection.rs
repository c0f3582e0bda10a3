use std::sync::LazyLock;

use regex::Regex;

use crate::models::{AssessedResult, Pattern, Tier};

use super::messages::format_value;

// ---------------------------------------------------------------------------
// Clinical thresholds. These are fixed cut-offs, independent of the
// reference-range deviation rule used for single results.
// ---------------------------------------------------------------------------

pub const LOW_HEMOGLOBIN: f64 = 12.0;
pub const LOW_MCV: f64 = 80.0;
pub const PREDIABETIC_GLUCOSE: f64 = 100.0;
pub const DIABETIC_GLUCOSE: f64 = 126.0;
pub const ELEVATED_CREATININE: f64 = 1.3;
pub const HIGH_CREATININE: f64 = 2.0;
pub const HIGH_CHOLESTEROL: f64 = 200.0;
pub const HIGH_WBC: f64 = 11_000.0;
pub const LOW_PLATELETS: f64 = 100_000.0;
pub const HIGH_PLATELETS: f64 = 500_000.0;

// Parameter matchers: case-insensitive, anchored at a word start so that
// "ast" does not match "Fasting Glucose".
static RE_HEMOGLOBIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bhemoglobin").unwrap());
static RE_MCV: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bmcv").unwrap());
static RE_GLUCOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bglucose").unwrap());
static RE_CREATININE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bcreatinine").unwrap());
static RE_ALT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\balt").unwrap());
static RE_AST: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bast").unwrap());
static RE_CHOLESTEROL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bcholesterol").unwrap());
static RE_WBC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bwbc").unwrap());
static RE_PLATELET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bplatelet").unwrap());

/// Read-only view of one batch, used by rules to find parameters.
pub struct ResultBatch<'a> {
    results: &'a [AssessedResult],
}

impl<'a> ResultBatch<'a> {
    pub fn new(results: &'a [AssessedResult]) -> Self {
        Self { results }
    }

    /// First result (in batch order) whose display name matches.
    pub fn find(&self, matcher: &Regex) -> Option<&'a AssessedResult> {
        self.results.iter().find(|r| matcher.is_match(&r.name))
    }
}

/// One independent predicate -> Pattern rule.
#[derive(Clone, Copy)]
pub struct PatternRule {
    pub name: &'static str,
    evaluate: fn(&ResultBatch<'_>) -> Option<Pattern>,
}

impl PatternRule {
    pub const fn new(name: &'static str, evaluate: fn(&ResultBatch<'_>) -> Option<Pattern>) -> Self {
        Self { name, evaluate }
    }

    pub fn evaluate(&self, batch: &ResultBatch<'_>) -> Option<Pattern> {
        (self.evaluate)(batch)
    }
}

impl std::fmt::Debug for PatternRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternRule").field("name", &self.name).finish()
    }
}

/// Runs an ordered rule set over a batch of assessed results.
#[derive(Debug, Clone)]
pub struct PatternDetector {
    rules: Vec<PatternRule>,
}

impl Default for PatternDetector {
    fn default() -> Self {
        Self::standard()
    }
}

impl PatternDetector {
    /// The built-in clinical rule set, in evaluation order.
    pub fn standard() -> Self {
        Self::with_rules(vec![
            PatternRule::new("hemoglobin", detect_hemoglobin),
            PatternRule::new("glucose", detect_glucose),
            PatternRule::new("kidney", detect_kidney),
            PatternRule::new("liver", detect_liver),
            PatternRule::new("lipid", detect_lipid),
            PatternRule::new("wbc", detect_wbc),
            PatternRule::new("platelets", detect_platelets),
        ])
    }

    pub fn with_rules(rules: Vec<PatternRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    /// Evaluate every rule; output follows rule order and no rule
    /// suppresses another.
    pub fn detect(&self, results: &[AssessedResult]) -> Vec<Pattern> {
        let batch = ResultBatch::new(results);
        self.rules
            .iter()
            .filter_map(|rule| {
                let pattern = rule.evaluate(&batch);
                if let Some(p) = &pattern {
                    tracing::debug!(rule = rule.name, title = %p.title, "Pattern detected");
                }
                pattern
            })
            .collect()
    }
}

fn measured(result: &AssessedResult) -> String {
    if result.unit.is_empty() {
        format!("{} {}", result.name, format_value(result.value))
    } else {
        format!("{} {} {}", result.name, format_value(result.value), result.unit)
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Low hemoglobin; with small red cells it reads as iron deficiency.
pub fn detect_hemoglobin(batch: &ResultBatch<'_>) -> Option<Pattern> {
    let hb = batch.find(&RE_HEMOGLOBIN)?;
    if hb.value >= LOW_HEMOGLOBIN {
        return None;
    }

    if let Some(mcv) = batch.find(&RE_MCV).filter(|m| m.value < LOW_MCV) {
        return Some(Pattern {
            title: "Possible Iron Deficiency Pattern".into(),
            evidence: format!("{} with {} (small red blood cells)", measured(hb), measured(mcv)),
            insight: "Low hemoglobin together with small red blood cells is commonly seen \
                      in iron deficiency. Ask your doctor about iron studies such as \
                      ferritin and serum iron."
                .into(),
            severity: Tier::Borderline,
        });
    }

    Some(Pattern {
        title: "Low Hemoglobin Detected".into(),
        evidence: format!("{} is below {}", measured(hb), format_value(LOW_HEMOGLOBIN)),
        insight: "Possible anemia. Consider iron studies, B12 and folate levels.".into(),
        severity: Tier::Borderline,
    })
}

pub fn detect_glucose(batch: &ResultBatch<'_>) -> Option<Pattern> {
    let glucose = batch.find(&RE_GLUCOSE)?;
    if glucose.value >= DIABETIC_GLUCOSE {
        Some(Pattern {
            title: "Fasting Glucose in Diabetic Range".into(),
            evidence: format!(
                "{} is at or above {}",
                measured(glucose),
                format_value(DIABETIC_GLUCOSE)
            ),
            insight: "Fasting glucose in the diabetic range. HbA1c testing is recommended.".into(),
            severity: Tier::Abnormal,
        })
    } else if glucose.value > PREDIABETIC_GLUCOSE {
        Some(Pattern {
            title: "Pre-Diabetic Glucose Range".into(),
            evidence: format!(
                "{} is above {}",
                measured(glucose),
                format_value(PREDIABETIC_GLUCOSE)
            ),
            insight: "Fasting glucose is elevated into the pre-diabetic range. Lifestyle \
                      modifications are recommended."
                .into(),
            severity: Tier::Borderline,
        })
    } else {
        None
    }
}

pub fn detect_kidney(batch: &ResultBatch<'_>) -> Option<Pattern> {
    let creatinine = batch
        .find(&RE_CREATININE)
        .filter(|c| c.value > ELEVATED_CREATININE)?;
    let severity = if creatinine.value > HIGH_CREATININE {
        Tier::Abnormal
    } else {
        Tier::Borderline
    };
    Some(Pattern {
        title: "Reduced Kidney Function Indicator".into(),
        evidence: format!(
            "{} is above {}",
            measured(creatinine),
            format_value(ELEVATED_CREATININE)
        ),
        insight: "Elevated creatinine may indicate reduced kidney function. Additional \
                  kidney function tests are recommended."
            .into(),
        severity,
    })
}

pub fn detect_liver(batch: &ResultBatch<'_>) -> Option<Pattern> {
    let elevated: Vec<&AssessedResult> = [batch.find(&RE_ALT), batch.find(&RE_AST)]
        .into_iter()
        .flatten()
        .filter(|r| !r.tier.is_normal())
        .collect();
    if elevated.is_empty() {
        return None;
    }

    let evidence = elevated
        .iter()
        .map(|r| format!("{} ({})", measured(r), r.tier.label()))
        .collect::<Vec<_>>()
        .join(", ");
    Some(Pattern {
        title: "Liver Enzyme Elevation".into(),
        evidence,
        insight: "Liver enzymes are outside the normal range. Avoid alcohol and medications \
                  that strain the liver, and consult your physician."
            .into(),
        severity: Tier::Borderline,
    })
}

pub fn detect_lipid(batch: &ResultBatch<'_>) -> Option<Pattern> {
    let chol = batch
        .find(&RE_CHOLESTEROL)
        .filter(|c| c.value > HIGH_CHOLESTEROL)?;
    Some(Pattern {
        title: "Elevated Cholesterol".into(),
        evidence: format!("{} is above {}", measured(chol), format_value(HIGH_CHOLESTEROL)),
        insight: "Elevated cholesterol. Dietary changes (less saturated fat) and regular \
                  exercise are recommended."
            .into(),
        severity: Tier::Borderline,
    })
}

pub fn detect_wbc(batch: &ResultBatch<'_>) -> Option<Pattern> {
    let wbc = batch.find(&RE_WBC).filter(|w| w.value > HIGH_WBC)?;
    Some(Pattern {
        title: "Elevated White Blood Cell Count".into(),
        evidence: format!("{} is above {}", measured(wbc), format_value(HIGH_WBC)),
        insight: "An elevated WBC count may indicate infection or inflammation.".into(),
        severity: Tier::Borderline,
    })
}

pub fn detect_platelets(batch: &ResultBatch<'_>) -> Option<Pattern> {
    let platelets = batch.find(&RE_PLATELET)?;
    if platelets.value < LOW_PLATELETS {
        Some(Pattern {
            title: "Bleeding Risk: Low Platelets".into(),
            evidence: format!(
                "{} is below {}",
                measured(platelets),
                format_value(LOW_PLATELETS)
            ),
            insight: "A low platelet count increases bleeding risk. Avoid NSAIDs and \
                      contact sports until you have spoken with your doctor."
                .into(),
            severity: Tier::Abnormal,
        })
    } else if platelets.value > HIGH_PLATELETS {
        Some(Pattern {
            title: "Clotting Risk: High Platelets".into(),
            evidence: format!(
                "{} is above {}",
                measured(platelets),
                format_value(HIGH_PLATELETS)
            ),
            insight: "An elevated platelet count may increase clotting risk.".into(),
            severity: Tier::Borderline,
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, value: f64, tier: Tier) -> AssessedResult {
        AssessedResult {
            name: name.into(),
            test_key: None,
            value,
            unit: String::new(),
            reference_display: String::new(),
            tier,
            display_position: 50.0,
            explanation: String::new(),
        }
    }

    fn titles(patterns: &[Pattern]) -> Vec<&str> {
        patterns.iter().map(|p| p.title.as_str()).collect()
    }

    fn detect(results: &[AssessedResult]) -> Vec<Pattern> {
        PatternDetector::standard().detect(results)
    }

    #[test]
    fn iron_deficiency_needs_low_hb_and_low_mcv() {
        let patterns = detect(&[
            result("Hemoglobin", 11.2, Tier::Borderline),
            result("MCV", 78.0, Tier::Borderline),
        ]);
        assert_eq!(titles(&patterns), vec!["Possible Iron Deficiency Pattern"]);
        assert_eq!(patterns[0].severity, Tier::Borderline);
        assert!(patterns[0].evidence.contains("MCV 78.0"));
    }

    #[test]
    fn low_hb_alone_is_its_own_pattern() {
        let patterns = detect(&[result("Hemoglobin", 11.2, Tier::Borderline)]);
        assert_eq!(titles(&patterns), vec!["Low Hemoglobin Detected"]);

        // Normal MCV falls through to the same branch.
        let patterns = detect(&[
            result("Hemoglobin", 11.2, Tier::Borderline),
            result("MCV", 90.0, Tier::Normal),
        ]);
        assert_eq!(titles(&patterns), vec!["Low Hemoglobin Detected"]);
    }

    #[test]
    fn normal_hb_with_low_mcv_fires_nothing() {
        let patterns = detect(&[
            result("Hemoglobin", 13.0, Tier::Normal),
            result("MCV", 70.0, Tier::Abnormal),
        ]);
        assert!(patterns.is_empty());
    }

    #[test]
    fn glucose_thresholds() {
        let p = detect(&[result("Fasting Glucose", 130.0, Tier::Abnormal)]);
        assert_eq!(titles(&p), vec!["Fasting Glucose in Diabetic Range"]);
        assert_eq!(p[0].severity, Tier::Abnormal);

        let p = detect(&[result("Fasting Glucose", 126.0, Tier::Abnormal)]);
        assert_eq!(p[0].severity, Tier::Abnormal);

        let p = detect(&[result("Glucose", 108.0, Tier::Borderline)]);
        assert_eq!(titles(&p), vec!["Pre-Diabetic Glucose Range"]);
        assert_eq!(p[0].severity, Tier::Borderline);

        assert!(detect(&[result("Fasting Glucose", 100.0, Tier::Normal)]).is_empty());
    }

    #[test]
    fn creatinine_severity_scales() {
        let p = detect(&[result("Creatinine", 1.6, Tier::Abnormal)]);
        assert_eq!(p[0].severity, Tier::Borderline);
        let p = detect(&[result("Creatinine", 2.4, Tier::Abnormal)]);
        assert_eq!(p[0].severity, Tier::Abnormal);
        assert!(detect(&[result("Creatinine", 1.3, Tier::Normal)]).is_empty());
    }

    #[test]
    fn liver_pattern_follows_alt_or_ast_tier() {
        let p = detect(&[result("ALT (SGPT)", 45.0, Tier::Borderline)]);
        assert_eq!(titles(&p), vec!["Liver Enzyme Elevation"]);

        let p = detect(&[
            result("ALT (SGPT)", 30.0, Tier::Normal),
            result("AST (SGOT)", 60.0, Tier::Abnormal),
        ]);
        assert_eq!(titles(&p), vec!["Liver Enzyme Elevation"]);
        assert!(p[0].evidence.contains("AST (SGOT)"));
        assert!(!p[0].evidence.contains("ALT"));

        assert!(detect(&[result("ALT (SGPT)", 30.0, Tier::Normal)]).is_empty());
    }

    #[test]
    fn ast_does_not_match_inside_other_words() {
        // "Fasting" contains "ast"; only a real AST result may trigger the liver rule.
        let p = detect(&[result("Fasting Glucose", 95.0, Tier::Borderline)]);
        assert!(p.is_empty());
    }

    #[test]
    fn fused_names_do_not_match_mid_word() {
        assert!(detect(&[result("TotalCholesterol", 260.0, Tier::Abnormal)]).is_empty());
        assert!(detect(&[result("Glycohemoglobin", 9.0, Tier::Abnormal)]).is_empty());
        let p = detect(&[result("Total Cholesterol", 260.0, Tier::Abnormal)]);
        assert_eq!(titles(&p), vec!["Elevated Cholesterol"]);
    }

    #[test]
    fn matching_is_case_insensitive_substring() {
        let p = detect(&[result("hemoglobin (hb)", 10.0, Tier::Abnormal)]);
        assert_eq!(titles(&p), vec!["Low Hemoglobin Detected"]);
        let p = detect(&[result("PLATELETS", 45_000.0, Tier::Abnormal)]);
        assert_eq!(titles(&p), vec!["Bleeding Risk: Low Platelets"]);
    }

    #[test]
    fn first_match_in_batch_order_wins() {
        let p = detect(&[
            result("Hemoglobin", 13.0, Tier::Normal),
            result("Hemoglobin A1c", 6.5, Tier::Borderline),
        ]);
        assert!(p.is_empty());
    }

    #[test]
    fn lipid_wbc_and_platelet_rules() {
        let p = detect(&[
            result("Total Cholesterol", 240.0, Tier::Abnormal),
            result("WBC Count", 12_500.0, Tier::Abnormal),
            result("Platelets", 650_000.0, Tier::Abnormal),
        ]);
        assert_eq!(
            titles(&p),
            vec![
                "Elevated Cholesterol",
                "Elevated White Blood Cell Count",
                "Clotting Risk: High Platelets",
            ]
        );
        assert_eq!(p[2].severity, Tier::Borderline);
    }

    #[test]
    fn bleeding_risk_is_abnormal() {
        let p = detect(&[result("Platelets", 45_000.0, Tier::Abnormal)]);
        assert_eq!(p[0].severity, Tier::Abnormal);
        assert!(p[0].evidence.contains("45,000.0"));
    }

    #[test]
    fn rules_fire_independently_in_fixed_order() {
        let batch = vec![
            result("Platelets", 45_000.0, Tier::Abnormal),
            result("WBC Count", 15_000.0, Tier::Abnormal),
            result("Creatinine", 2.5, Tier::Abnormal),
            result("Fasting Glucose", 130.0, Tier::Abnormal),
            result("Hemoglobin", 11.0, Tier::Borderline),
        ];
        let expected = vec![
            "Low Hemoglobin Detected",
            "Fasting Glucose in Diabetic Range",
            "Reduced Kidney Function Indicator",
            "Elevated White Blood Cell Count",
            "Bleeding Risk: Low Platelets",
        ];
        assert_eq!(titles(&detect(&batch)), expected);

        let mut reversed = batch.clone();
        reversed.reverse();
        assert_eq!(detect(&reversed), detect(&batch));
    }

    #[test]
    fn empty_batch_has_no_patterns() {
        assert!(detect(&[]).is_empty());
    }

    #[test]
    fn custom_rule_sets_are_plain_data() {
        fn always(_: &ResultBatch<'_>) -> Option<Pattern> {
            Some(Pattern {
                title: "Always".into(),
                evidence: String::new(),
                insight: String::new(),
                severity: Tier::Normal,
            })
        }
        let detector = PatternDetector::with_rules(vec![PatternRule::new("always", always)]);
        assert_eq!(detector.rules().len(), 1);
        assert_eq!(titles(&detector.detect(&[])), vec!["Always"]);
        assert_eq!(PatternDetector::default().rules().len(), 7);
    }
}
