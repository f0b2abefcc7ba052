//! Built-in component generators that write short fact sheets.

use std::fmt::Write;

use crate::collaborator::{ComponentContext, ComponentGenerator};
use crate::domain::Section;
use crate::error::{LaunchLensError, Result};
use crate::plan::ComponentKind;
use crate::report::Confidence;

/// Build generators from a list of component IDs.
///
/// An empty list, or the ID `all`, selects every component.
pub fn build_generators(ids: &[String]) -> Result<Vec<Box<dyn ComponentGenerator + Send + Sync>>> {
    let all = ids.is_empty() || ids.iter().any(|id| id.trim().eq_ignore_ascii_case("all"));
    if all {
        return Ok(ComponentKind::ALL
            .into_iter()
            .map(|kind| Box::new(FactSheetGenerator::new(kind)) as Box<_>)
            .collect());
    }

    let mut generators: Vec<Box<dyn ComponentGenerator + Send + Sync>> = Vec::new();
    for id in ids {
        let Some(kind) = ComponentKind::from_id(id) else {
            return Err(LaunchLensError::Config(format!("unknown generator: {id}")));
        };
        generators.push(Box::new(FactSheetGenerator::new(kind)));
    }
    Ok(generators)
}

/// Writes a component from the figures already in the context.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FactSheetGenerator {
    kind: ComponentKind,
}

impl FactSheetGenerator {
    /// Create a generator for one component.
    pub fn new(kind: ComponentKind) -> Self {
        Self { kind }
    }
}

impl ComponentGenerator for FactSheetGenerator {
    fn kind(&self) -> ComponentKind {
        self.kind
    }

    fn generate(&self, context: &ComponentContext) -> Result<String> {
        let mut output = String::new();
        match self.kind {
            ComponentKind::ExecutiveSummary => executive_summary(&mut output, context),
            ComponentKind::ConfidenceScorecard => confidence_scorecard(&mut output, context),
            ComponentKind::QuickStartActions => quick_start_actions(&mut output, context),
            ComponentKind::SalvageabilityAssessment => salvageability(&mut output, context),
            ComponentKind::KeyMetrics => key_metrics(&mut output, context),
            ComponentKind::MarketPositioning => market_positioning(&mut output, context),
            ComponentKind::RevenuePerformance => revenue_performance(&mut output, context),
            ComponentKind::StrategicRecommendations => recommendations(&mut output, context),
            ComponentKind::NegativeReviewAnalysis => negative_reviews(&mut output, context),
            ComponentKind::StoreOptimization => {
                section_note(&mut output, context, Section::StorePage)
            }
            ComponentKind::ComparableGames => comparable_games(&mut output, context),
            ComponentKind::ActionPlan30Day => action_plan(&mut output, context),
            ComponentKind::MarketExpansion => market_expansion(&mut output, context),
            ComponentKind::DlcViability => dlc_viability(&mut output, context),
            ComponentKind::DetailedCompetitive => {
                section_note(&mut output, context, Section::CompetitivePositioning)
            }
            ComponentKind::RegionalBreakdown => regional_breakdown(&mut output, context),
        }
        Ok(output)
    }
}

fn executive_summary(output: &mut String, context: &ComponentContext) {
    let score = &context.score;
    let _ = writeln!(
        output,
        "{} scores {}/100, a {} launch. Revenue averages ${:.2}/day ({} revenue tier).",
        context.metrics.name(),
        score.overall_score,
        score.report_tier.name().to_lowercase(),
        context.revenue.daily_revenue,
        context.revenue.tier.name()
    );
    if score.was_capped {
        let _ = writeln!(
            output,
            "The score is held at a ceiling of {} set by {}.",
            score.maximum_score, context.caps.limiting_factor
        );
    }
}

fn confidence_scorecard(output: &mut String, context: &ComponentContext) {
    let metrics = &context.metrics;
    let _ = writeln!(output, "- Confidence: {}", Confidence::assess(metrics));
    let _ = writeln!(output, "- Reviews analysed: {}", metrics.review_count_total());
    let _ = writeln!(output, "- Estimated owners: {}", metrics.owner_count());
    let _ = writeln!(output, "- Advisories: {}", metrics.warnings().len());
    for warning in metrics.warnings() {
        let _ = writeln!(output, "  - {}", warning.message);
    }
}

fn quick_start_actions(output: &mut String, context: &ComponentContext) {
    let mut actions = Vec::new();
    if let Some(hint) = context.caps.limiting().unlock_hint() {
        actions.push(format!("Lift the score ceiling: {hint}."));
    }
    if let Some((section, score)) = weakest_section(context) {
        actions.push(format!(
            "Improve {} first (currently {score:.0}).",
            section.label().to_lowercase()
        ));
    }
    if context.metrics.review_percentage() < 70.0 {
        actions.push("Answer the most common complaint in recent reviews.".to_string());
    }
    if actions.is_empty() {
        actions.push("Keep the current cadence of updates and community posts.".to_string());
    }
    for (index, action) in actions.iter().enumerate() {
        let _ = writeln!(output, "{}. {action}", index + 1);
    }
}

fn salvageability(output: &mut String, context: &ComponentContext) {
    let percentage = context.metrics.review_percentage();
    let verdict = if percentage >= 70.0 {
        "Players who buy it mostly like it, so visibility is the lever to pull."
    } else if percentage >= 50.0 {
        "Mixed sentiment: fix the top complaints before spending on visibility."
    } else {
        "Sentiment is the main obstacle; a substantial update is needed before a relaunch."
    };
    let _ = writeln!(output, "{percentage:.0}% positive reviews. {verdict}");
}

fn key_metrics(output: &mut String, context: &ComponentContext) {
    let metrics = &context.metrics;
    let _ = writeln!(output, "| Metric | Value |\n| --- | --- |");
    let _ = writeln!(output, "| Revenue | ${:.2} |", metrics.revenue());
    let _ = writeln!(output, "| Days since launch | {} |", metrics.days_since_launch());
    let _ = writeln!(output, "| Daily revenue | ${:.2} |", metrics.daily_revenue());
    let _ = writeln!(output, "| Monthly equivalent | ${:.2} |", context.revenue.monthly_equivalent);
    let _ = writeln!(output, "| Owners | {} |", metrics.owner_count());
    let _ = writeln!(
        output,
        "| Reviews | {} ({} positive, {} negative) |",
        metrics.review_count_total(),
        metrics.review_count_positive(),
        metrics.review_count_negative()
    );
    let _ = writeln!(output, "| Price | ${:.2} |", metrics.price());
    let _ = writeln!(output, "| Revenue per owner | ${:.2} |", metrics.revenue_per_owner());
}

fn market_positioning(output: &mut String, context: &ComponentContext) {
    let metrics = &context.metrics;
    let genres = genre_list(context);
    let _ = writeln!(output, "Listed as {genres} at ${:.2}.", metrics.price());
    for section in [Section::CompetitivePositioning, Section::PricingFit] {
        if let Some(score) = context.sections.get(section) {
            let _ = writeln!(output, "- {}: {score:.0}/100", section.label());
        }
    }
}

fn revenue_performance(output: &mut String, context: &ComponentContext) {
    let revenue = &context.revenue;
    let _ = writeln!(
        output,
        "${:.2}/day (about ${:.0} per month) places the launch in the {} tier, which scales section scores by {:.2}.",
        revenue.daily_revenue,
        revenue.monthly_equivalent,
        revenue.tier.name(),
        revenue.tier.modifier()
    );
    if let Some(hint) = context.caps.revenue_cap.unlock_hint() {
        let _ = writeln!(output, "Next milestone: {hint}.");
    }
}

fn recommendations(output: &mut String, context: &ComponentContext) {
    for decision in context.caps.decisions() {
        let _ = write!(output, "- {} (ceiling {}): {}", decision.dimension, decision.cap, decision.reason);
        match decision.unlock_hint() {
            Some(hint) => {
                let _ = writeln!(output, "; {hint}.");
            }
            None => {
                let _ = writeln!(output, ".");
            }
        }
    }
}

fn negative_reviews(output: &mut String, context: &ComponentContext) {
    let metrics = &context.metrics;
    let share = 100.0 - metrics.review_percentage();
    let _ = writeln!(
        output,
        "{} of {} reviews ({share:.0}%) are negative.",
        metrics.review_count_negative(),
        metrics.review_count_total()
    );
}

fn section_note(output: &mut String, context: &ComponentContext, section: Section) {
    match context
        .sections
        .adjustments
        .iter()
        .find(|adjustment| adjustment.section == section)
    {
        Some(adjustment) => {
            let _ = writeln!(
                output,
                "{} scored {} before and {:.0} after the revenue adjustment.",
                section.label(),
                adjustment.raw,
                adjustment.modified
            );
        }
        None => {
            let _ = writeln!(output, "{} was not scored for this report.", section.label());
        }
    }
}

fn comparable_games(output: &mut String, context: &ComponentContext) {
    let _ = writeln!(
        output,
        "Compare against {} titles priced between ${:.2} and ${:.2}.",
        genre_list(context),
        context.metrics.price() * 0.75,
        context.metrics.price() * 1.25
    );
}

fn action_plan(output: &mut String, context: &ComponentContext) {
    let focus = weakest_section(context)
        .map(|(section, _)| section.label().to_lowercase())
        .unwrap_or_else(|| "the store page".to_string());
    let _ = writeln!(output, "- Week 1: review the audit and fix {focus}.");
    let _ = writeln!(output, "- Week 2: respond to recent reviews and ship a patch.");
    let _ = writeln!(output, "- Week 3: announce the update to existing owners.");
    let _ = writeln!(output, "- Week 4: re-run the audit and compare scores.");
}

fn market_expansion(output: &mut String, context: &ComponentContext) {
    let metrics = &context.metrics;
    let _ = writeln!(
        output,
        "{} owners leave {:.1} reviews per 100; audiences beyond {} are the next step.",
        metrics.owner_count(),
        metrics.review_rate(),
        genre_list(context)
    );
}

fn dlc_viability(output: &mut String, context: &ComponentContext) {
    let metrics = &context.metrics;
    let verdict = if metrics.review_percentage() >= 80.0 && metrics.owner_count() >= 5_000 {
        "an engaged base large enough to support paid content"
    } else {
        "not yet enough engaged owners to justify paid content"
    };
    let _ = writeln!(
        output,
        "${:.2} revenue per owner and {:.0}% positive reviews suggest {verdict}.",
        metrics.revenue_per_owner(),
        metrics.review_percentage()
    );
}

fn regional_breakdown(output: &mut String, context: &ComponentContext) {
    let _ = writeln!(
        output,
        "No regional split was supplied; all {} owners are reported as one market.",
        context.metrics.owner_count()
    );
}

fn weakest_section(context: &ComponentContext) -> Option<(Section, f64)> {
    context
        .sections
        .adjustments
        .iter()
        .map(|adjustment| (adjustment.section, adjustment.modified))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

fn genre_list(context: &ComponentContext) -> String {
    let genres = context.metrics.genres();
    if genres.is_empty() {
        "uncategorised".to_string()
    } else {
        genres.join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::caps::compute_caps;
    use crate::domain::SectionScores;
    use crate::tier::{apply_modifier, classify};
    use crate::validator::tests::{raw, valid};

    fn context() -> ComponentContext {
        let metrics = valid(&raw(379.0, 7, 5, 80.0, 100));
        let caps = compute_caps(&metrics);
        let revenue = classify(metrics.revenue(), 7);
        let mut scores = SectionScores::new();
        scores.insert(Section::StorePage, 95).expect("score");
        scores.insert(Section::PricingFit, 90).expect("score");
        let sections = apply_modifier(&scores, revenue.tier);
        let score = aggregate(&sections, revenue.tier, &metrics.review_metrics(), &caps);
        ComponentContext {
            metrics,
            caps,
            revenue,
            sections,
            score,
        }
    }

    #[test]
    fn builds_all_generators_by_default() {
        let generators = build_generators(&[]).expect("generators");
        assert_eq!(generators.len(), ComponentKind::ALL.len());
        let generators = build_generators(&["ALL".to_string()]).expect("generators");
        assert_eq!(generators.len(), ComponentKind::ALL.len());
    }

    #[test]
    fn builds_selected_generators() {
        let ids = vec!["key-metrics".to_string(), "executive_summary".to_string()];
        let generators = build_generators(&ids).expect("generators");
        let kinds: Vec<_> = generators.iter().map(|g| g.kind()).collect();
        assert_eq!(
            kinds,
            vec![ComponentKind::KeyMetrics, ComponentKind::ExecutiveSummary]
        );
    }

    #[test]
    fn rejects_unknown_ids() {
        let result = build_generators(&["haiku".to_string()]);
        assert!(matches!(result, Err(LaunchLensError::Config(message)) if message.contains("haiku")));
    }

    #[test]
    fn every_generator_writes_text() {
        let context = context();
        for kind in ComponentKind::ALL {
            let text = FactSheetGenerator::new(kind)
                .generate(&context)
                .expect("text");
            assert!(!text.trim().is_empty(), "{kind} produced no text");
        }
    }

    #[test]
    fn summary_mentions_score_and_cap() {
        let context = context();
        let text = FactSheetGenerator::new(ComponentKind::ExecutiveSummary)
            .generate(&context)
            .expect("text");
        assert!(text.contains("Test Product scores 40/100"));
        assert!(text.contains("ceiling of 40 set by daily revenue"));
    }

    #[test]
    fn quick_start_targets_weakest_section() {
        let context = context();
        let text = FactSheetGenerator::new(ComponentKind::QuickStartActions)
            .generate(&context)
            .expect("text");
        assert!(text.starts_with("1. Lift the score ceiling: reach $100/day"));
        assert!(text.contains("Improve pricing fit first"));
    }
}
