//! Report components and the tier-based content plan.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::aggregate::ReportTier;

/// Report artifacts, from shortest to longest.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactDepth {
    /// One-page brief.
    Brief,
    /// Overview: the brief plus supporting analysis.
    Overview,
    /// Deep dive: everything.
    #[serde(rename = "deepdive")]
    DeepDive,
}

impl ArtifactDepth {
    /// Every depth, shortest first.
    pub const ALL: [ArtifactDepth; 3] = [
        ArtifactDepth::Brief,
        ArtifactDepth::Overview,
        ArtifactDepth::DeepDive,
    ];

    /// Human-readable title.
    pub fn title(&self) -> &'static str {
        match self {
            ArtifactDepth::Brief => "Brief",
            ArtifactDepth::Overview => "Overview",
            ArtifactDepth::DeepDive => "Deep dive",
        }
    }

    /// Stable identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactDepth::Brief => "brief",
            ArtifactDepth::Overview => "overview",
            ArtifactDepth::DeepDive => "deepdive",
        }
    }
}

/// Externally generated text blocks assembled into the report.
///
/// Declaration order is the canonical order within an artifact depth.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    /// Headline verdict.
    ExecutiveSummary,
    /// Confidence in the underlying data.
    ConfidenceScorecard,
    /// Immediate next steps.
    QuickStartActions,
    /// Whether a failing launch can be recovered.
    SalvageabilityAssessment,
    /// Core numbers at a glance.
    KeyMetrics,
    /// Position in the market.
    MarketPositioning,
    /// Revenue trajectory.
    RevenuePerformance,
    /// Strategic recommendations.
    StrategicRecommendations,
    /// What negative reviews have in common.
    NegativeReviewAnalysis,
    /// Store page improvements.
    StoreOptimization,
    /// Similar products for comparison.
    ComparableGames,
    /// Thirty-day action plan.
    ActionPlan30Day,
    /// New markets and audiences.
    MarketExpansion,
    /// Whether additional content would sell.
    DlcViability,
    /// Detailed competitor comparison.
    DetailedCompetitive,
    /// Performance by region.
    RegionalBreakdown,
}

impl ComponentKind {
    /// Every component, in canonical order.
    pub const ALL: [ComponentKind; 16] = [
        ComponentKind::ExecutiveSummary,
        ComponentKind::ConfidenceScorecard,
        ComponentKind::QuickStartActions,
        ComponentKind::SalvageabilityAssessment,
        ComponentKind::KeyMetrics,
        ComponentKind::MarketPositioning,
        ComponentKind::RevenuePerformance,
        ComponentKind::StrategicRecommendations,
        ComponentKind::NegativeReviewAnalysis,
        ComponentKind::StoreOptimization,
        ComponentKind::ComparableGames,
        ComponentKind::ActionPlan30Day,
        ComponentKind::MarketExpansion,
        ComponentKind::DlcViability,
        ComponentKind::DetailedCompetitive,
        ComponentKind::RegionalBreakdown,
    ];

    /// Components requested for every tier.
    pub const UNIVERSAL: [ComponentKind; 9] = [
        ComponentKind::ExecutiveSummary,
        ComponentKind::ConfidenceScorecard,
        ComponentKind::QuickStartActions,
        ComponentKind::KeyMetrics,
        ComponentKind::MarketPositioning,
        ComponentKind::ComparableGames,
        ComponentKind::RevenuePerformance,
        ComponentKind::StrategicRecommendations,
        ComponentKind::ActionPlan30Day,
    ];

    /// Additional components for crisis and struggling reports.
    pub const RECOVERY: [ComponentKind; 2] = [
        ComponentKind::NegativeReviewAnalysis,
        ComponentKind::SalvageabilityAssessment,
    ];

    /// Additional components for solid and exceptional reports.
    pub const GROWTH: [ComponentKind; 5] = [
        ComponentKind::MarketExpansion,
        ComponentKind::DlcViability,
        ComponentKind::DetailedCompetitive,
        ComponentKind::RegionalBreakdown,
        ComponentKind::StoreOptimization,
    ];

    /// Stable identifier.
    pub fn id(&self) -> &'static str {
        match self {
            ComponentKind::ExecutiveSummary => "executive_summary",
            ComponentKind::ConfidenceScorecard => "confidence_scorecard",
            ComponentKind::QuickStartActions => "quick_start_actions",
            ComponentKind::SalvageabilityAssessment => "salvageability_assessment",
            ComponentKind::KeyMetrics => "key_metrics",
            ComponentKind::MarketPositioning => "market_positioning",
            ComponentKind::RevenuePerformance => "revenue_performance",
            ComponentKind::StrategicRecommendations => "strategic_recommendations",
            ComponentKind::NegativeReviewAnalysis => "negative_review_analysis",
            ComponentKind::StoreOptimization => "store_optimization",
            ComponentKind::ComparableGames => "comparable_games",
            ComponentKind::ActionPlan30Day => "action_plan_30_day",
            ComponentKind::MarketExpansion => "market_expansion",
            ComponentKind::DlcViability => "dlc_viability",
            ComponentKind::DetailedCompetitive => "detailed_competitive",
            ComponentKind::RegionalBreakdown => "regional_breakdown",
        }
    }

    /// Parse an identifier, accepting dashes in place of underscores.
    pub fn from_id(id: &str) -> Option<Self> {
        let normalized = id.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.id() == normalized)
    }

    /// Section heading.
    pub fn title(&self) -> &'static str {
        match self {
            ComponentKind::ExecutiveSummary => "Executive Summary",
            ComponentKind::ConfidenceScorecard => "Confidence Scorecard",
            ComponentKind::QuickStartActions => "Quick-Start Actions",
            ComponentKind::SalvageabilityAssessment => "Salvageability Assessment",
            ComponentKind::KeyMetrics => "Key Metrics",
            ComponentKind::MarketPositioning => "Market Positioning",
            ComponentKind::RevenuePerformance => "Revenue Performance",
            ComponentKind::StrategicRecommendations => "Strategic Recommendations",
            ComponentKind::NegativeReviewAnalysis => "Negative Review Analysis",
            ComponentKind::StoreOptimization => "Store Optimization",
            ComponentKind::ComparableGames => "Comparable Games",
            ComponentKind::ActionPlan30Day => "30-Day Action Plan",
            ComponentKind::MarketExpansion => "Market Expansion",
            ComponentKind::DlcViability => "DLC Viability",
            ComponentKind::DetailedCompetitive => "Detailed Competitive Analysis",
            ComponentKind::RegionalBreakdown => "Regional Breakdown",
        }
    }

    /// Shortest artifact the component appears in.
    pub fn depth(&self) -> ArtifactDepth {
        match self {
            ComponentKind::ExecutiveSummary
            | ComponentKind::ConfidenceScorecard
            | ComponentKind::QuickStartActions
            | ComponentKind::SalvageabilityAssessment => ArtifactDepth::Brief,
            ComponentKind::KeyMetrics
            | ComponentKind::MarketPositioning
            | ComponentKind::RevenuePerformance
            | ComponentKind::StrategicRecommendations
            | ComponentKind::NegativeReviewAnalysis
            | ComponentKind::StoreOptimization => ArtifactDepth::Overview,
            ComponentKind::ComparableGames
            | ComponentKind::ActionPlan30Day
            | ComponentKind::MarketExpansion
            | ComponentKind::DlcViability
            | ComponentKind::DetailedCompetitive
            | ComponentKind::RegionalBreakdown => ArtifactDepth::DeepDive,
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Components requested for one report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentPlan {
    /// Tier the plan was built for.
    pub tier: ReportTier,
    /// Requested components, ordered by depth then canonical order.
    pub components: Vec<ComponentKind>,
    /// Components not requested for this tier.
    pub skipped: Vec<ComponentKind>,
}

impl ContentPlan {
    /// Build the plan for a report tier.
    pub fn for_tier(tier: ReportTier) -> Self {
        let extra: &[ComponentKind] = if tier.needs_recovery() {
            &ComponentKind::RECOVERY
        } else {
            &ComponentKind::GROWTH
        };
        let mut components: Vec<ComponentKind> = ComponentKind::UNIVERSAL
            .iter()
            .chain(extra.iter())
            .copied()
            .collect();
        components.sort_by_key(|kind| (kind.depth(), *kind));
        let skipped = ComponentKind::ALL
            .into_iter()
            .filter(|kind| !components.contains(kind))
            .collect();

        Self {
            tier,
            components,
            skipped,
        }
    }

    /// Whether a component was requested.
    pub fn includes(&self, kind: ComponentKind) -> bool {
        self.components.contains(&kind)
    }

    /// Requested components that belong in an artifact of the given depth.
    pub fn components_for(&self, depth: ArtifactDepth) -> impl Iterator<Item = ComponentKind> + '_ {
        self.components
            .iter()
            .copied()
            .filter(move |kind| kind.depth() <= depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_parser() {
        for kind in ComponentKind::ALL {
            assert_eq!(ComponentKind::from_id(kind.id()), Some(kind));
        }
        assert_eq!(
            ComponentKind::from_id(" Action-Plan-30-Day "),
            Some(ComponentKind::ActionPlan30Day)
        );
        assert_eq!(ComponentKind::from_id("poetry"), None);
    }

    #[test]
    fn universal_components_are_always_planned() {
        for tier in [
            ReportTier::Crisis,
            ReportTier::Struggling,
            ReportTier::Solid,
            ReportTier::Exceptional,
        ] {
            let plan = ContentPlan::for_tier(tier);
            for kind in ComponentKind::UNIVERSAL {
                assert!(plan.includes(kind), "{kind} missing for {tier}");
            }
            assert_eq!(
                plan.components.len() + plan.skipped.len(),
                ComponentKind::ALL.len()
            );
        }
    }

    #[test]
    fn recovery_tiers_add_salvage_components() {
        let plan = ContentPlan::for_tier(ReportTier::Crisis);
        assert!(plan.includes(ComponentKind::NegativeReviewAnalysis));
        assert!(plan.includes(ComponentKind::SalvageabilityAssessment));
        assert!(!plan.includes(ComponentKind::MarketExpansion));
        assert_eq!(plan.components.len(), 11);
        assert_eq!(plan.skipped.len(), 5);
    }

    #[test]
    fn growth_tiers_add_expansion_components() {
        let plan = ContentPlan::for_tier(ReportTier::Solid);
        for kind in ComponentKind::GROWTH {
            assert!(plan.includes(kind));
        }
        assert!(!plan.includes(ComponentKind::SalvageabilityAssessment));
        assert_eq!(plan.components.len(), 14);
    }

    #[test]
    fn artifacts_nest_by_depth() {
        let plan = ContentPlan::for_tier(ReportTier::Exceptional);
        let brief: Vec<_> = plan.components_for(ArtifactDepth::Brief).collect();
        let overview: Vec<_> = plan.components_for(ArtifactDepth::Overview).collect();
        let deepdive: Vec<_> = plan.components_for(ArtifactDepth::DeepDive).collect();

        assert!(brief.len() < overview.len());
        assert!(overview.len() < deepdive.len());
        assert_eq!(&overview[..brief.len()], &brief[..]);
        assert_eq!(&deepdive[..overview.len()], &overview[..]);
        assert_eq!(deepdive, plan.components);
    }

    #[test]
    fn depth_serializes_with_report_keys() {
        let json = serde_json::to_string(&ArtifactDepth::DeepDive).expect("json");
        assert_eq!(json, "\"deepdive\"");
    }
}
