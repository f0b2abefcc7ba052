//! Weighted score aggregation and cap enforcement.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::caps::ScoreCaps;
use crate::tier::{ModifiedSectionScores, RevenueTier};
use crate::validator::ReviewMetrics;

const REVENUE_WEIGHT: f64 = 0.35;
const REVIEW_QUALITY_WEIGHT: f64 = 0.25;
const REVIEW_VOLUME_WEIGHT: f64 = 0.15;
const SECTION_WEIGHT: f64 = 0.25;

/// Presentation tier selected from the final capped score.
///
/// Its boundaries are independent from the cap tables in [`crate::caps`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportTier {
    /// Final score under 40.
    Crisis,
    /// Final score 40-65.
    Struggling,
    /// Final score 66-80.
    Solid,
    /// Final score 81 and above.
    Exceptional,
}

impl ReportTier {
    /// Tier for an unrounded final score.
    pub fn from_score(score: f64) -> Self {
        if score < 40.0 {
            ReportTier::Crisis
        } else if score < 66.0 {
            ReportTier::Struggling
        } else if score < 81.0 {
            ReportTier::Solid
        } else {
            ReportTier::Exceptional
        }
    }

    /// Tier for a score held down at `maximum`.
    ///
    /// A pinned score never reaches the tier that starts at its own ceiling,
    /// so a revenue ceiling of 40 keeps the report in Crisis.
    pub fn from_ceiling(maximum: u8) -> Self {
        match maximum {
            0..=40 => ReportTier::Crisis,
            41..=66 => ReportTier::Struggling,
            67..=81 => ReportTier::Solid,
            _ => ReportTier::Exceptional,
        }
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            ReportTier::Crisis => "Crisis",
            ReportTier::Struggling => "Struggling",
            ReportTier::Solid => "Solid",
            ReportTier::Exceptional => "Exceptional",
        }
    }

    /// Whether the tier calls for recovery-focused content.
    pub fn needs_recovery(&self) -> bool {
        matches!(self, ReportTier::Crisis | ReportTier::Struggling)
    }
}

impl fmt::Display for ReportTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The weighted inputs of the overall score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponents {
    /// Revenue tier ordinal times 20.
    pub revenue: f64,
    /// Positive review percentage.
    pub review_quality: f64,
    /// Stepwise review volume score.
    pub review_volume: f64,
    /// Mean of the modified section scores.
    pub section_average: f64,
}

/// The capped final score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalScore {
    /// Rounded score, never above the cap.
    pub overall_score: u8,
    /// Weighted score before capping.
    pub weighted_score: f64,
    /// Cap that was enforced.
    pub maximum_score: u8,
    /// Whether the weighted score exceeded the cap.
    pub was_capped: bool,
    /// Weighted score, recorded only when capped.
    pub original_score: Option<f64>,
    /// Why the score was capped and how to lift the ceiling.
    pub cap_explanation: Option<String>,
    /// Presentation tier.
    pub report_tier: ReportTier,
    /// Weighted inputs.
    pub components: ScoreComponents,
}

/// Score for the number of reviews, from 0 to 95.
pub fn review_volume_component(review_count_total: u64) -> f64 {
    match review_count_total {
        0 => 0.0,
        1..=49 => 30.0,
        50..=99 => 50.0,
        100..=499 => 70.0,
        500..=999 => 85.0,
        _ => 95.0,
    }
}

/// Combine modified section scores, the revenue tier and review totals into
/// a final score held under `caps.maximum_score`.
pub fn aggregate(
    sections: &ModifiedSectionScores,
    tier: RevenueTier,
    reviews: &ReviewMetrics,
    caps: &ScoreCaps,
) -> FinalScore {
    let components = ScoreComponents {
        revenue: f64::from(tier.ordinal()) * 20.0,
        review_quality: reviews.percentage,
        review_volume: review_volume_component(reviews.total),
        section_average: sections.average(),
    };
    let weighted_score = components.revenue * REVENUE_WEIGHT
        + components.review_quality * REVIEW_QUALITY_WEIGHT
        + components.review_volume * REVIEW_VOLUME_WEIGHT
        + components.section_average * SECTION_WEIGHT;

    let maximum = f64::from(caps.maximum_score);
    let was_capped = weighted_score > maximum;
    let capped = weighted_score.min(maximum).clamp(0.0, 100.0);
    let overall_score = (capped.round() as u8).min(caps.maximum_score);

    let cap_explanation = was_capped.then(|| explain_cap(caps, weighted_score));
    let report_tier = if was_capped {
        ReportTier::from_ceiling(caps.maximum_score)
    } else {
        ReportTier::from_score(capped)
    };

    FinalScore {
        overall_score,
        weighted_score,
        maximum_score: caps.maximum_score,
        was_capped,
        original_score: was_capped.then_some(weighted_score),
        cap_explanation,
        report_tier,
        components,
    }
}

fn explain_cap(caps: &ScoreCaps, weighted_score: f64) -> String {
    let limiting = caps.limiting();
    let mut explanation = format!(
        "Score capped at {} (calculated {:.1}) by {}: {}.",
        caps.maximum_score, weighted_score, limiting.dimension, limiting.reason
    );
    if let Some(hint) = limiting.unlock_hint() {
        explanation.push_str(&format!(" To raise the ceiling, {hint}."));
    }
    explanation
}
