/// Message template builder for every sentence the engine shows a reader.
/// Plain language, second person, no jargon beyond the test name.
pub struct MessageTemplates;

/// Appended to every summary.
pub const EDUCATIONAL_DISCLAIMER: &str = "Important: This analysis is for educational purposes only. \
     Always consult a qualified healthcare provider for medical advice.";

impl MessageTemplates {
    // -----------------------------------------------------------------
    // Single-result explanations
    // -----------------------------------------------------------------

    pub fn range_unavailable(test: &str) -> String {
        format!(
            "Unable to find a reference range for {}. \
             Ask your doctor how to interpret this value.",
            test,
        )
    }

    pub fn critically_low(test: &str) -> String {
        format!(
            "CRITICALLY LOW: {} is dangerously below the normal range. \
             Seek immediate medical attention.",
            test,
        )
    }

    pub fn critically_high(test: &str) -> String {
        format!(
            "CRITICALLY HIGH: {} is dangerously above the normal range. \
             Seek immediate medical attention.",
            test,
        )
    }

    pub fn within_range(test: &str, reference: &str) -> String {
        format!("Your {} is within the normal range ({}).", test, reference)
    }

    pub fn slightly_below(test: &str, reference: &str) -> String {
        format!(
            "Your {} is slightly below normal ({}). Consider monitoring.",
            test, reference,
        )
    }

    pub fn significantly_below(test: &str, reference: &str) -> String {
        format!(
            "Your {} is significantly below normal ({}). Please consult your doctor.",
            test, reference,
        )
    }

    pub fn slightly_above(test: &str, reference: &str) -> String {
        format!(
            "Your {} is slightly above normal ({}). Lifestyle modifications may help.",
            test, reference,
        )
    }

    pub fn significantly_above(test: &str, reference: &str) -> String {
        format!(
            "Your {} is significantly above normal ({}). Please consult your doctor.",
            test, reference,
        )
    }

    // -----------------------------------------------------------------
    // Next steps
    // -----------------------------------------------------------------

    pub fn urgent_step(test: &str) -> String {
        format!(
            "Consult a physician urgently about your {} level. \
             This requires medical evaluation.",
            test,
        )
    }

    pub fn consult_step(test: &str) -> String {
        format!(
            "Schedule a follow-up for {}. Your doctor may recommend \
             lifestyle changes or further testing.",
            test,
        )
    }

    pub fn pattern_step(title: &str, insight: &str) -> String {
        format!("{}: {}", title, insight)
    }

    pub fn healthy_step() -> String {
        "All values are within normal range. Maintain a healthy lifestyle \
         and routine check-ups."
            .to_string()
    }

    pub fn recheck_input_step() -> String {
        "Check that your report lists test names with numeric values, \
         then try the analysis again."
            .to_string()
    }

    // -----------------------------------------------------------------
    // Summary
    // -----------------------------------------------------------------

    pub fn no_values_summary() -> String {
        "No lab values could be analyzed. Please check your input format.".to_string()
    }

    pub fn abnormal_count(count: usize) -> String {
        format!(
            "{} parameter(s) are outside the normal range and require medical attention.",
            count,
        )
    }

    pub fn borderline_count(count: usize) -> String {
        format!(
            "{} parameter(s) are borderline and should be monitored.",
            count,
        )
    }

    pub fn normal_count(count: usize) -> String {
        format!("{} parameter(s) are within the normal range.", count)
    }

    pub fn key_finding(test: &str, value: f64, unit: &str, tier_label: &str) -> String {
        let unit = unit.trim();
        if unit.is_empty() {
            format!("- {}: {} ({})", test, format_value(value), tier_label)
        } else {
            format!("- {}: {} {} ({})", test, format_value(value), unit, tier_label)
        }
    }
}

/// One decimal place with thousands separators: `45000.0 -> "45,000.0"`.
pub fn format_value(value: f64) -> String {
    let fixed = format!("{:.1}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "0"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}
