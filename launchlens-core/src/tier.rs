//! Revenue tier classification and section score modifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{Section, SectionScores};

/// Ceiling applied to modified section scores in reality-check tiers.
pub const REALITY_CHECK_CEILING: f64 = 65.0;
/// Reduction above which a strong warning is attached.
pub const STRONG_REDUCTION: f64 = 15.0;
/// Reduction above which a mild warning is attached.
pub const MILD_REDUCTION: f64 = 5.0;

/// Discrete classification of daily revenue.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevenueTier {
    /// Under $100/day.
    Crisis,
    /// Under $500/day.
    Struggling,
    /// Under $2,000/day.
    Viable,
    /// Under $10,000/day.
    Strong,
    /// $10,000/day or more.
    Exceptional,
}

impl RevenueTier {
    /// Classify a daily revenue figure.
    pub fn from_daily_revenue(daily_revenue: f64) -> Self {
        if daily_revenue < 100.0 {
            RevenueTier::Crisis
        } else if daily_revenue < 500.0 {
            RevenueTier::Struggling
        } else if daily_revenue < 2000.0 {
            RevenueTier::Viable
        } else if daily_revenue < 10_000.0 {
            RevenueTier::Strong
        } else {
            RevenueTier::Exceptional
        }
    }

    /// Position from 1 (crisis) to 5 (exceptional).
    pub fn ordinal(&self) -> u8 {
        match self {
            RevenueTier::Crisis => 1,
            RevenueTier::Struggling => 2,
            RevenueTier::Viable => 3,
            RevenueTier::Strong => 4,
            RevenueTier::Exceptional => 5,
        }
    }

    /// Multiplier applied to raw section scores.
    pub fn modifier(&self) -> f64 {
        match self {
            RevenueTier::Crisis => 0.40,
            RevenueTier::Struggling => 0.65,
            RevenueTier::Viable => 0.85,
            RevenueTier::Strong => 0.95,
            RevenueTier::Exceptional => 1.0,
        }
    }

    /// Whether section scores are additionally held under the reality-check ceiling.
    pub fn reality_check(&self) -> bool {
        matches!(self, RevenueTier::Crisis | RevenueTier::Struggling)
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            RevenueTier::Crisis => "Crisis",
            RevenueTier::Struggling => "Struggling",
            RevenueTier::Viable => "Viable",
            RevenueTier::Strong => "Strong",
            RevenueTier::Exceptional => "Exceptional",
        }
    }
}

impl fmt::Display for RevenueTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A revenue tier with the figures it was derived from.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierClassification {
    /// Resolved tier.
    pub tier: RevenueTier,
    /// Revenue per day since launch.
    pub daily_revenue: f64,
    /// Daily revenue projected over 30 days.
    pub monthly_equivalent: f64,
}

/// Classify total revenue earned over `days_since_launch` days.
pub fn classify(revenue: f64, days_since_launch: i64) -> TierClassification {
    let daily_revenue = revenue / days_since_launch.max(1) as f64;
    TierClassification {
        tier: RevenueTier::from_daily_revenue(daily_revenue),
        daily_revenue,
        monthly_equivalent: daily_revenue * 30.0,
    }
}

/// How much the modifier reduced a section score.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReductionSeverity {
    /// More than five points.
    Mild,
    /// More than fifteen points.
    Strong,
}

/// One section's score before and after the tier modifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionAdjustment {
    /// Section adjusted.
    pub section: Section,
    /// Score supplied by the analyzer.
    pub raw: u8,
    /// Score after the modifier and ceiling.
    pub modified: f64,
    /// `raw - modified`.
    pub reduction: f64,
    /// Severity of the reduction, if any warning applies.
    pub severity: Option<ReductionSeverity>,
}

impl SectionAdjustment {
    /// Warning text for the reduction, if it is large enough to mention.
    pub fn warning(&self) -> Option<String> {
        let severity = self.severity?;
        let text = match severity {
            ReductionSeverity::Strong => format!(
                "{} score reduced from {} to {:.0} ({:.0} points) because revenue does not support it.",
                self.section.label(),
                self.raw,
                self.modified,
                self.reduction
            ),
            ReductionSeverity::Mild => format!(
                "{} score adjusted from {} to {:.0} for revenue performance.",
                self.section.label(),
                self.raw,
                self.modified
            ),
        };
        Some(text)
    }
}

/// Section scores after the revenue modifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifiedSectionScores {
    /// Tier whose modifier was applied.
    pub tier: RevenueTier,
    /// Adjustments in canonical section order.
    pub adjustments: Vec<SectionAdjustment>,
}

impl ModifiedSectionScores {
    /// Arithmetic mean of the modified scores, 0 when none were supplied.
    pub fn average(&self) -> f64 {
        if self.adjustments.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.adjustments.iter().map(|a| a.modified).sum();
        sum / self.adjustments.len() as f64
    }

    /// Modified score for one section.
    pub fn get(&self, section: Section) -> Option<f64> {
        self.adjustments
            .iter()
            .find(|adjustment| adjustment.section == section)
            .map(|adjustment| adjustment.modified)
    }

    /// Warnings for every noticeably reduced section.
    pub fn warnings(&self) -> Vec<String> {
        self.adjustments
            .iter()
            .filter_map(SectionAdjustment::warning)
            .collect()
    }

    /// Reality-check banner, present when any section was noticeably reduced.
    pub fn reality_check_banner(&self) -> Option<String> {
        let warnings = self.warnings();
        if warnings.is_empty() {
            return None;
        }
        let mut banner = format!(
            "Reality check: {} revenue tier (modifier {:.2}) lowered section scores.",
            self.tier.name(),
            self.tier.modifier()
        );
        for warning in warnings {
            banner.push(' ');
            banner.push_str(&warning);
        }
        Some(banner)
    }
}

/// Apply a revenue tier's modifier to raw section scores.
pub fn apply_modifier(scores: &SectionScores, tier: RevenueTier) -> ModifiedSectionScores {
    let adjustments = scores
        .iter()
        .map(|(section, raw)| {
            let mut modified = f64::from(raw) * tier.modifier();
            if tier.reality_check() && modified > REALITY_CHECK_CEILING {
                modified = REALITY_CHECK_CEILING;
            }
            let reduction = f64::from(raw) - modified;
            let severity = if reduction > STRONG_REDUCTION {
                Some(ReductionSeverity::Strong)
            } else if reduction > MILD_REDUCTION {
                Some(ReductionSeverity::Mild)
            } else {
                None
            };
            SectionAdjustment {
                section,
                raw,
                modified,
                reduction,
                severity,
            }
        })
        .collect();

    ModifiedSectionScores { tier, adjustments }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(values: &[(Section, i64)]) -> SectionScores {
        let mut scores = SectionScores::new();
        for (section, value) in values {
            scores.insert(*section, *value).expect("valid score");
        }
        scores
    }

    #[test]
    fn classifies_daily_revenue_at_boundaries() {
        let cases = [
            (99.99, RevenueTier::Crisis),
            (100.0, RevenueTier::Struggling),
            (499.99, RevenueTier::Struggling),
            (500.0, RevenueTier::Viable),
            (1999.99, RevenueTier::Viable),
            (2000.0, RevenueTier::Strong),
            (9999.99, RevenueTier::Strong),
            (10_000.0, RevenueTier::Exceptional),
        ];
        for (daily, expected) in cases {
            assert_eq!(RevenueTier::from_daily_revenue(daily), expected, "{daily}");
        }
    }

    #[test]
    fn classify_guards_days_and_projects_month() {
        let classification = classify(700.0, 7);
        assert_eq!(classification.daily_revenue, 100.0);
        assert_eq!(classification.monthly_equivalent, 3000.0);
        assert_eq!(classification.tier, RevenueTier::Struggling);

        let zero_days = classify(50.0, 0);
        assert_eq!(zero_days.daily_revenue, 50.0);
    }

    #[test]
    fn tier_properties_follow_table() {
        assert_eq!(RevenueTier::Crisis.ordinal(), 1);
        assert_eq!(RevenueTier::Exceptional.ordinal(), 5);
        assert_eq!(RevenueTier::Struggling.modifier(), 0.65);
        assert!(RevenueTier::Crisis.reality_check());
        assert!(RevenueTier::Struggling.reality_check());
        assert!(!RevenueTier::Viable.reality_check());
        assert!(!RevenueTier::Exceptional.reality_check());
    }

    #[test]
    fn crisis_tier_scales_scores() {
        let modified = apply_modifier(&scores(&[(Section::StorePage, 90)]), RevenueTier::Crisis);
        let adjustment = &modified.adjustments[0];
        assert_eq!(adjustment.modified, 36.0);
        assert_eq!(adjustment.reduction, 54.0);
        assert_eq!(adjustment.severity, Some(ReductionSeverity::Strong));
    }

    #[test]
    fn reality_check_ceiling_applies_after_modifier() {
        // 100 * 0.65 = 65, exactly at the ceiling.
        let at_ceiling =
            apply_modifier(&scores(&[(Section::PricingFit, 100)]), RevenueTier::Struggling);
        assert_eq!(at_ceiling.get(Section::PricingFit), Some(65.0));
        assert!(at_ceiling.adjustments[0].modified <= REALITY_CHECK_CEILING);
    }

    #[test]
    fn non_reality_tiers_are_not_clamped() {
        let modified = apply_modifier(&scores(&[(Section::StorePage, 100)]), RevenueTier::Viable);
        assert_eq!(modified.get(Section::StorePage), Some(85.0));
    }

    #[test]
    fn reduction_thresholds_pick_severity() {
        let modified = apply_modifier(
            &scores(&[
                (Section::StorePage, 100),
                (Section::PricingFit, 40),
                (Section::CommunityReach, 60),
            ]),
            RevenueTier::Viable,
        );
        // 100 -> 85 reduces by exactly 15: mild, not strong.
        assert_eq!(
            modified.adjustments[0].severity,
            Some(ReductionSeverity::Mild)
        );
        // 60 -> 51 reduces by 9: mild.
        assert_eq!(
            modified.adjustments[2].severity,
            Some(ReductionSeverity::Mild)
        );
        // 40 -> 34 reduces by 6: mild.
        assert_eq!(
            modified.adjustments[1].severity,
            Some(ReductionSeverity::Mild)
        );

        let gentle = apply_modifier(&scores(&[(Section::StorePage, 80)]), RevenueTier::Strong);
        // 80 -> 76 reduces by 4: no warning.
        assert_eq!(gentle.adjustments[0].severity, None);
        assert!(gentle.reality_check_banner().is_none());
    }

    #[test]
    fn average_is_zero_without_sections() {
        let modified = apply_modifier(&SectionScores::new(), RevenueTier::Crisis);
        assert_eq!(modified.average(), 0.0);
        assert!(modified.reality_check_banner().is_none());
    }

    #[test]
    fn banner_lists_reduced_sections() {
        let modified = apply_modifier(
            &scores(&[(Section::StorePage, 80), (Section::CommunityReach, 50)]),
            RevenueTier::Crisis,
        );
        assert_eq!(modified.average(), (32.0 + 20.0) / 2.0);
        let banner = modified.reality_check_banner().expect("banner");
        assert!(banner.starts_with("Reality check: Crisis revenue tier"));
        assert!(banner.contains("Store page score reduced from 80 to 32"));
        assert!(banner.contains("Community reach"));
    }
}
