use std::sync::Arc;

use crate::models::{AssessedResult, LabInput, PatientContext, Tier};

use super::messages::MessageTemplates;
use super::normalize::title_case;
use super::reference::{Band, ReferenceRangeRepository};
use super::types::InterpretError;

/// Deviation (percent of the violated bound) below which an out-of-range
/// value is Borderline rather than Abnormal.
pub const BORDERLINE_DEVIATION_PCT: f64 = 10.0;

/// Gauge layout: the normal band always renders between 30 and 70.
pub const GAUGE_NORMAL_LOW: f64 = 30.0;
pub const GAUGE_NORMAL_HIGH: f64 = 70.0;
pub const GAUGE_FLOOR: f64 = 10.0;
pub const GAUGE_CEILING: f64 = 90.0;
pub const GAUGE_CENTER: f64 = 50.0;

const RANGE_UNAVAILABLE: &str = "Reference range not available";

/// Where a value sits relative to a band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangePosition {
    Within,
    Below { deviation_pct: f64 },
    Above { deviation_pct: f64 },
}

pub fn locate(value: f64, band: Band) -> RangePosition {
    if band.contains(value) {
        RangePosition::Within
    } else if value < band.min {
        RangePosition::Below {
            deviation_pct: relative_deviation(band.min - value, band.min),
        }
    } else {
        RangePosition::Above {
            deviation_pct: relative_deviation(value - band.max, band.max),
        }
    }
}

/// `distance / bound` as a percentage. A non-positive bound cannot scale a
/// deviation, so any distance from it counts as unbounded.
fn relative_deviation(distance: f64, bound: f64) -> f64 {
    if bound > 0.0 {
        distance / bound * 100.0
    } else {
        f64::INFINITY
    }
}

pub fn deviation_tier(deviation_pct: f64) -> Tier {
    if deviation_pct < BORDERLINE_DEVIATION_PCT {
        Tier::Borderline
    } else {
        Tier::Abnormal
    }
}

/// 0-100 gauge value for rendering. Emphasizes direction and magnitude of a
/// deviation; it is not a percentile.
pub fn display_position(value: f64, band: Band) -> f64 {
    if band.is_degenerate() {
        return GAUGE_CENTER;
    }

    let position = match locate(value, band) {
        RangePosition::Within => {
            GAUGE_NORMAL_LOW
                + (value - band.min) / (band.max - band.min) * (GAUGE_NORMAL_HIGH - GAUGE_NORMAL_LOW)
        }
        RangePosition::Below { .. } if band.min > 0.0 => {
            (value / band.min * GAUGE_NORMAL_LOW).clamp(GAUGE_FLOOR, GAUGE_NORMAL_LOW)
        }
        RangePosition::Below { .. } => GAUGE_FLOOR,
        RangePosition::Above { .. } if band.max > 0.0 => {
            (GAUGE_NORMAL_HIGH + value / band.max * (GAUGE_CEILING - GAUGE_NORMAL_HIGH))
                .min(GAUGE_CEILING)
        }
        RangePosition::Above { .. } => GAUGE_CEILING,
    };

    position.clamp(0.0, 100.0)
}

/// Grades single measurements against the shared reference repository.
#[derive(Debug, Clone)]
pub struct RiskAssessor {
    repository: Arc<ReferenceRangeRepository>,
}

impl RiskAssessor {
    pub fn new(repository: Arc<ReferenceRangeRepository>) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &ReferenceRangeRepository {
        &self.repository
    }

    /// Assess a raw number. The value must already have passed sanity
    /// filtering; a NaN or infinity here is a caller bug and is returned as
    /// an error.
    pub fn assess_value(
        &self,
        test_name: &str,
        value: f64,
        unit: &str,
        patient: &PatientContext,
    ) -> Result<AssessedResult, InterpretError> {
        if !value.is_finite() {
            return Err(InterpretError::NonFiniteValue {
                test: test_name.to_string(),
            });
        }
        let input = LabInput::new(test_name.trim().to_string(), value, unit.trim().to_string());
        Ok(self.assess(&input, patient))
    }

    /// Grade one measurement. Unknown tests come back Borderline with a
    /// "range unavailable" explanation; this never fails.
    pub fn assess(&self, input: &LabInput, patient: &PatientContext) -> AssessedResult {
        let value = input.value();

        let Some(resolved) =
            self.repository
                .lookup(input.name(), patient.gender, patient.age_group)
        else {
            tracing::debug!(test = %input.name(), "No reference range; reporting as unavailable");
            let name = title_case(input.name());
            return AssessedResult {
                explanation: MessageTemplates::range_unavailable(&name),
                name,
                test_key: None,
                value,
                unit: input.unit().to_string(),
                reference_display: RANGE_UNAVAILABLE.to_string(),
                tier: Tier::Borderline,
                display_position: GAUGE_CENTER,
            };
        };

        let range = resolved.range;
        let name = range.display_name.clone();
        let unit = if input.unit().is_empty() {
            range.unit.clone()
        } else {
            input.unit().to_string()
        };
        let reference_display = resolved.display(&unit);
        let band = resolved.band;

        // Critical limits outrank the normal band.
        if let Some(critical) = range.critical {
            let critical_side = if value < critical.low {
                Some((MessageTemplates::critically_low(&name), GAUGE_FLOOR))
            } else if value > critical.high {
                Some((MessageTemplates::critically_high(&name), GAUGE_CEILING))
            } else {
                None
            };

            if let Some((explanation, display_position)) = critical_side {
                tracing::debug!(test = %name, value, "Critical limit breached");
                return AssessedResult {
                    name,
                    test_key: Some(range.test_key.clone()),
                    value,
                    unit,
                    reference_display,
                    tier: Tier::Abnormal,
                    display_position,
                    explanation,
                };
            }
        }

        let (tier, explanation) = match locate(value, band) {
            RangePosition::Within => (
                Tier::Normal,
                MessageTemplates::within_range(&name, &reference_display),
            ),
            RangePosition::Below { deviation_pct } => {
                let tier = deviation_tier(deviation_pct);
                let explanation = if tier == Tier::Borderline {
                    MessageTemplates::slightly_below(&name, &reference_display)
                } else {
                    MessageTemplates::significantly_below(&name, &reference_display)
                };
                (tier, explanation)
            }
            RangePosition::Above { deviation_pct } => {
                let tier = deviation_tier(deviation_pct);
                let explanation = if tier == Tier::Borderline {
                    MessageTemplates::slightly_above(&name, &reference_display)
                } else {
                    MessageTemplates::significantly_above(&name, &reference_display)
                };
                (tier, explanation)
            }
        };

        AssessedResult {
            test_key: Some(range.test_key.clone()),
            display_position: display_position(value, band),
            name,
            value,
            unit,
            reference_display,
            tier,
            explanation,
        }
    }
}
