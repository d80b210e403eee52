//! Bounded display scale for raw risk scores.
//!
//! The regressor is unbounded, so scores outside `[0, 100]` are squashed
//! back into range before display:
//!
//! - non-finite scores read as 50
//! - scores in `[0, 100]` pass through
//! - scores above 100 follow `100 / (1 + e^(-raw / 1e6))`
//! - scores below 0 follow `50 · (1 - e^(raw / 1e6))`, floored at 0

use std::fmt;

use serde::Serialize;

const SQUASH_SCALE: f64 = 1e6;

/// Discrete risk band of a normalized score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RiskCategory {
    Low,
    Medium,
    High,
    VeryHigh,
    Critical,
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::VeryHigh => "Very High",
            Self::Critical => "Critical",
        })
    }
}

/// A normalized score with its band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub display_score: f32,
    pub category: RiskCategory,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RiskScoreNormalizer;

impl RiskScoreNormalizer {
    /// Map a raw score into `[0, 100]`.
    pub fn normalize(raw: f32) -> f32 {
        if !raw.is_finite() {
            return 50.0;
        }
        if (0.0..=100.0).contains(&raw) {
            return raw;
        }
        let x = raw as f64 / SQUASH_SCALE;
        let squashed = if raw > 100.0 {
            100.0 / (1.0 + (-x).exp())
        } else {
            50.0 * (1.0 - x.exp())
        };
        (squashed as f32).clamp(0.0, 100.0)
    }

    /// Band of a normalized score; lower bounds are inclusive.
    pub fn categorize(display: f32) -> RiskCategory {
        match display {
            s if s < 25.0 => RiskCategory::Low,
            s if s < 45.0 => RiskCategory::Medium,
            s if s < 65.0 => RiskCategory::High,
            s if s < 80.0 => RiskCategory::VeryHigh,
            _ => RiskCategory::Critical,
        }
    }

    pub fn assess(raw: f32) -> RiskAssessment {
        let display_score = Self::normalize(raw);
        RiskAssessment {
            display_score,
            category: Self::categorize(display_score),
        }
    }
}
