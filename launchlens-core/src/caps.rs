//! Reality caps: ceilings on the achievable score.
//!
//! Each dimension is an ordered table of exclusive upper bounds. The first
//! row whose bound exceeds the observed value decides the cap.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::validator::ValidatedMetrics;

/// Evidence category a cap is derived from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapDimension {
    /// Daily revenue.
    Revenue,
    /// Number of reviews.
    ReviewVolume,
    /// Share of positive reviews.
    ReviewQuality,
}

impl CapDimension {
    /// Human-readable name.
    pub fn label(&self) -> &'static str {
        match self {
            CapDimension::Revenue => "daily revenue",
            CapDimension::ReviewVolume => "review volume",
            CapDimension::ReviewQuality => "review quality",
        }
    }

    fn format_value(&self, value: f64) -> String {
        match self {
            CapDimension::Revenue => format!("${value:.0}/day"),
            CapDimension::ReviewVolume => format!("{value:.0} reviews"),
            CapDimension::ReviewQuality => format!("{value:.0}% positive reviews"),
        }
    }
}

impl fmt::Display for CapDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Copy, Clone)]
struct CapStep {
    upper_bound: f64,
    cap: u8,
    reason: &'static str,
}

const REVENUE_STEPS: [CapStep; 5] = [
    CapStep {
        upper_bound: 100.0,
        cap: 40,
        reason: "daily revenue under $100 indicates a launch in commercial crisis",
    },
    CapStep {
        upper_bound: 500.0,
        cap: 60,
        reason: "daily revenue under $500 indicates a struggling launch",
    },
    CapStep {
        upper_bound: 2000.0,
        cap: 75,
        reason: "daily revenue under $2,000 indicates a viable but modest launch",
    },
    CapStep {
        upper_bound: 10_000.0,
        cap: 90,
        reason: "daily revenue under $10,000 indicates a strong launch",
    },
    CapStep {
        upper_bound: f64::INFINITY,
        cap: 100,
        reason: "daily revenue of $10,000 or more places no ceiling on the score",
    },
];

const REVIEW_VOLUME_STEPS: [CapStep; 5] = [
    CapStep {
        upper_bound: 10.0,
        cap: 45,
        reason: "fewer than 10 reviews is too little evidence for a high score",
    },
    CapStep {
        upper_bound: 50.0,
        cap: 65,
        reason: "fewer than 50 reviews limits confidence in audience reception",
    },
    CapStep {
        upper_bound: 100.0,
        cap: 80,
        reason: "fewer than 100 reviews shows limited market reach",
    },
    CapStep {
        upper_bound: 500.0,
        cap: 90,
        reason: "fewer than 500 reviews shows solid but not broad reach",
    },
    CapStep {
        upper_bound: f64::INFINITY,
        cap: 100,
        reason: "500 or more reviews places no ceiling on the score",
    },
];

const REVIEW_QUALITY_STEPS: [CapStep; 4] = [
    CapStep {
        upper_bound: 70.0,
        cap: 50,
        reason: "under 70% positive reviews signals a reception problem",
    },
    CapStep {
        upper_bound: 80.0,
        cap: 70,
        reason: "under 80% positive reviews signals a mixed reception",
    },
    CapStep {
        upper_bound: 90.0,
        cap: 85,
        reason: "under 90% positive reviews keeps the product out of the top tier",
    },
    CapStep {
        upper_bound: f64::INFINITY,
        cap: 100,
        reason: "90% or more positive reviews places no ceiling on the score",
    },
];

/// The threshold that would raise a cap to the next row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextThreshold {
    /// Value that must be reached.
    pub value: f64,
    /// Cap unlocked at that value.
    pub cap: u8,
}

/// A single dimension's cap with its explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapDecision {
    /// Dimension the cap was derived from.
    pub dimension: CapDimension,
    /// Value observed for the dimension.
    pub observed: f64,
    /// Ceiling score.
    pub cap: u8,
    /// Why this ceiling applies.
    pub reason: String,
    /// The next threshold, absent when the cap is already 100.
    pub next_threshold: Option<NextThreshold>,
}

impl CapDecision {
    /// Advice on how to raise this cap, e.g. "reach $500/day to unlock a ceiling of 75".
    pub fn unlock_hint(&self) -> Option<String> {
        self.next_threshold.as_ref().map(|next| {
            format!(
                "reach {} to unlock a ceiling of {}",
                self.dimension.format_value(next.value),
                next.cap
            )
        })
    }
}

/// Independent ceilings and their minimum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCaps {
    /// Cap from daily revenue.
    pub revenue_cap: CapDecision,
    /// Cap from the number of reviews.
    pub review_volume_cap: CapDecision,
    /// Cap from the positive review share.
    pub review_quality_cap: CapDecision,
    /// Lowest of the three caps.
    pub maximum_score: u8,
    /// Dimension that produced the lowest cap.
    pub limiting_factor: CapDimension,
}

impl ScoreCaps {
    /// The decision that produced the maximum score.
    pub fn limiting(&self) -> &CapDecision {
        match self.limiting_factor {
            CapDimension::Revenue => &self.revenue_cap,
            CapDimension::ReviewVolume => &self.review_volume_cap,
            CapDimension::ReviewQuality => &self.review_quality_cap,
        }
    }

    /// The three decisions in precedence order.
    pub fn decisions(&self) -> [&CapDecision; 3] {
        [
            &self.revenue_cap,
            &self.review_volume_cap,
            &self.review_quality_cap,
        ]
    }
}

/// Compute every cap for validated metrics.
pub fn compute_caps(metrics: &ValidatedMetrics) -> ScoreCaps {
    combine_caps(
        revenue_cap(metrics.daily_revenue()),
        review_volume_cap(metrics.review_count_total()),
        review_quality_cap(metrics.review_percentage()),
    )
}

/// Cap from daily revenue.
pub fn revenue_cap(daily_revenue: f64) -> CapDecision {
    decide(CapDimension::Revenue, &REVENUE_STEPS, daily_revenue)
}

/// Cap from the total number of reviews.
pub fn review_volume_cap(review_count_total: u64) -> CapDecision {
    decide(
        CapDimension::ReviewVolume,
        &REVIEW_VOLUME_STEPS,
        review_count_total as f64,
    )
}

/// Cap from the positive review percentage.
pub fn review_quality_cap(review_percentage: f64) -> CapDecision {
    decide(
        CapDimension::ReviewQuality,
        &REVIEW_QUALITY_STEPS,
        review_percentage,
    )
}

pub(crate) fn combine_caps(
    revenue_cap: CapDecision,
    review_volume_cap: CapDecision,
    review_quality_cap: CapDecision,
) -> ScoreCaps {
    let maximum_score = revenue_cap
        .cap
        .min(review_volume_cap.cap)
        .min(review_quality_cap.cap);
    // Ties resolve to revenue, then volume, then quality.
    let limiting_factor = [&revenue_cap, &review_volume_cap, &review_quality_cap]
        .into_iter()
        .find(|decision| decision.cap == maximum_score)
        .map(|decision| decision.dimension)
        .unwrap_or(CapDimension::Revenue);

    ScoreCaps {
        revenue_cap,
        review_volume_cap,
        review_quality_cap,
        maximum_score,
        limiting_factor,
    }
}

fn decide(dimension: CapDimension, steps: &[CapStep], observed: f64) -> CapDecision {
    let index = steps
        .iter()
        .position(|step| observed < step.upper_bound)
        .unwrap_or(steps.len() - 1);
    let step = steps[index];
    let next_threshold = steps.get(index + 1).map(|next| NextThreshold {
        value: step.upper_bound,
        cap: next.cap,
    });

    CapDecision {
        dimension,
        observed,
        cap: step.cap,
        reason: format!(
            "{} (observed {}): ceiling {}",
            step.reason,
            dimension.format_value(observed),
            step.cap
        ),
        next_threshold,
    }
}
