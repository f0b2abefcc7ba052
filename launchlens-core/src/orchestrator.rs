//! The scoring pipeline: validation through report assembly.
//!
//! [`TierOrchestrator::run`] never fails. Contradictory or thin input ends in
//! a terminal bundle, and collaborator failures degrade only the section or
//! component they affect.

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::aggregate::aggregate;
use crate::caps::compute_caps;
use crate::collaborator::{
    CollaboratorDigest, ComponentContext, ComponentGenerator, ComponentStatus, SectionAnalyzer,
};
use crate::config::PipelineConfig;
use crate::domain::{RawMetrics, SectionScores};
use crate::error::{LaunchLensError, Result};
use crate::plan::{ArtifactDepth, ComponentKind, ContentPlan};
use crate::report::{
    ArtifactFrame, BundleMetadata, BundleOutcome, Confidence, ReportBundle, RevenueTierSummary,
    WordCounts, assemble_artifact, word_count,
};
use crate::tier::{apply_modifier, classify};
use crate::validator::{
    CriticalDataError, InsufficientDataError, ValidatedMetrics, ValidationOutcome,
    validate_metrics,
};

/// Steps of a pipeline run, recorded in the order they are entered.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Run started.
    Init,
    /// Checking the raw metrics.
    Validating,
    /// Input contradicted itself; terminal.
    DataError,
    /// Too little data; terminal.
    InsufficientData,
    /// Collecting section scores.
    Scoring,
    /// Computing caps, revenue tier and final score.
    Capping,
    /// Report tier resolved and content planned.
    TierAssigned,
    /// Requesting component text.
    ComponentGeneration,
    /// Building the artifacts.
    Assembly,
    /// Run finished.
    Done,
}

type BoxedAnalyzer = Box<dyn SectionAnalyzer + Send + Sync>;
type BoxedGenerator = Box<dyn ComponentGenerator + Send + Sync>;

/// Runs metrics through validation, scoring, capping, tiering and assembly.
pub struct TierOrchestrator {
    analyzers: Vec<BoxedAnalyzer>,
    generators: BTreeMap<ComponentKind, BoxedGenerator>,
    config: PipelineConfig,
}

impl Default for TierOrchestrator {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl TierOrchestrator {
    /// Create an orchestrator with no collaborators.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            analyzers: Vec::new(),
            generators: BTreeMap::new(),
            config,
        }
    }

    /// Register a section analyzer.
    pub fn with_analyzer(mut self, analyzer: impl SectionAnalyzer + Send + Sync + 'static) -> Self {
        self.analyzers.push(Box::new(analyzer));
        self
    }

    /// Register a component generator, replacing any for the same component.
    pub fn with_generator(
        mut self,
        generator: impl ComponentGenerator + Send + Sync + 'static,
    ) -> Self {
        self.generators.insert(generator.kind(), Box::new(generator));
        self
    }

    /// Register boxed component generators.
    pub fn with_generators(mut self, generators: Vec<BoxedGenerator>) -> Self {
        for generator in generators {
            self.generators.insert(generator.kind(), generator);
        }
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Produce a report bundle for one product.
    pub fn run(&self, raw: &RawMetrics) -> ReportBundle {
        let mut run = RunState::new(display_name(raw));
        run.enter(PipelineStage::Init);
        run.enter(PipelineStage::Validating);

        let metrics = match validate_metrics(raw) {
            ValidationOutcome::Valid(metrics) => metrics,
            ValidationOutcome::DataError(error) => {
                run.enter(PipelineStage::DataError);
                log::info!("{}: {error}", run.name);
                return data_error_bundle(run, &error);
            }
            ValidationOutcome::Insufficient(error) => {
                run.enter(PipelineStage::InsufficientData);
                log::info!("{}: {error}", run.name);
                return insufficient_bundle(run, &error);
            }
        };

        run.enter(PipelineStage::Scoring);
        let scores = self.score_sections(&metrics, &mut run.digest);

        run.enter(PipelineStage::Capping);
        let caps = compute_caps(&metrics);
        let revenue = classify(metrics.revenue(), metrics.days_since_launch() as i64);
        let sections = apply_modifier(&scores, revenue.tier);
        let score = aggregate(&sections, revenue.tier, &metrics.review_metrics(), &caps);

        run.enter(PipelineStage::TierAssigned);
        let plan = ContentPlan::for_tier(score.report_tier);
        run.digest.record_skipped(plan.skipped.len());
        let context = ComponentContext {
            metrics,
            caps,
            revenue,
            sections,
            score,
        };

        run.enter(PipelineStage::ComponentGeneration);
        let mut texts = BTreeMap::new();
        let mut statuses = BTreeMap::new();
        for kind in &plan.components {
            let (text, status) = self.generate_component(*kind, &context, &mut run.digest);
            texts.insert(*kind, text);
            statuses.insert(*kind, status);
        }

        run.enter(PipelineStage::Assembly);
        complete_bundle(run, &context, &plan, &texts, statuses)
    }

    fn score_sections(
        &self,
        metrics: &ValidatedMetrics,
        digest: &mut CollaboratorDigest,
    ) -> SectionScores {
        let mut scores = SectionScores::new();
        for analyzer in &self.analyzers {
            let section = analyzer.section();
            let result = match panic::catch_unwind(AssertUnwindSafe(|| analyzer.analyze(metrics))) {
                Ok(result) => result,
                Err(payload) => Err(LaunchLensError::collaborator(
                    format!("{section} analyzer"),
                    panic_message(payload.as_ref()),
                )),
            };
            match result.and_then(|value| scores.insert(section, value)) {
                Ok(()) => digest.record_success(),
                Err(err) => {
                    log::warn!("{section} analyzer failed, using neutral score: {err}");
                    digest.record_failure();
                    let neutral = i64::from(self.config.neutral_section_score);
                    if let Err(err) = scores.insert(section, neutral) {
                        log::warn!("neutral score rejected for {section}: {err}");
                    }
                }
            }
        }
        scores
    }

    fn generate_component(
        &self,
        kind: ComponentKind,
        context: &ComponentContext,
        digest: &mut CollaboratorDigest,
    ) -> (String, ComponentStatus) {
        let Some(generator) = self.generators.get(&kind) else {
            digest.record_not_configured();
            return (placeholder(kind), ComponentStatus::PlaceholderUsed);
        };

        let started = Instant::now();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| generator.generate(context)));
        let elapsed = started.elapsed();
        let limit = self.config.component_timeout();

        match outcome {
            Ok(Ok(_)) if elapsed > limit => {
                log::warn!("{kind} generator overran its budget ({elapsed:?} > {limit:?})");
                digest.record_failure();
                (placeholder(kind), ComponentStatus::Failed)
            }
            Ok(Ok(text)) if text.trim().is_empty() => {
                log::warn!("{kind} generator returned no text");
                digest.record_failure();
                (placeholder(kind), ComponentStatus::PlaceholderUsed)
            }
            Ok(Ok(text)) => {
                digest.record_success();
                (text, ComponentStatus::Ok)
            }
            Ok(Err(err)) => {
                log::warn!("{kind} generator failed: {err}");
                digest.record_failure();
                (placeholder(kind), ComponentStatus::Failed)
            }
            Err(payload) => {
                log::warn!(
                    "{kind} generator panicked: {}",
                    panic_message(payload.as_ref())
                );
                digest.record_failure();
                (placeholder(kind), ComponentStatus::Failed)
            }
        }
    }
}

struct RunState {
    name: String,
    stages: Vec<PipelineStage>,
    digest: CollaboratorDigest,
}

impl RunState {
    fn new(name: String) -> Self {
        Self {
            name,
            stages: Vec::new(),
            digest: CollaboratorDigest::default(),
        }
    }

    fn enter(&mut self, stage: PipelineStage) {
        log::debug!("{}: {stage:?}", self.name);
        self.stages.push(stage);
    }

    fn finish(
        mut self,
        mut metadata: BundleMetadata,
        artifacts: [String; 3],
        component_status: BTreeMap<ComponentKind, ComponentStatus>,
    ) -> ReportBundle {
        self.enter(PipelineStage::Done);
        let [brief, overview, deepdive] = artifacts;
        metadata.word_counts = WordCounts {
            brief: word_count(&brief),
            overview: word_count(&overview),
            deepdive: word_count(&deepdive),
        };
        ReportBundle {
            name: self.name,
            brief,
            overview,
            deepdive,
            metadata,
            component_status,
            collaborators: self.digest,
            stages: self.stages,
        }
    }
}

fn complete_bundle(
    run: RunState,
    context: &ComponentContext,
    plan: &ContentPlan,
    texts: &BTreeMap<ComponentKind, String>,
    statuses: BTreeMap<ComponentKind, ComponentStatus>,
) -> ReportBundle {
    let score = &context.score;
    let confidence = Confidence::assess(&context.metrics);
    let reality_check = context.sections.reality_check_banner();
    let warnings: Vec<String> = context
        .metrics
        .warnings()
        .iter()
        .map(|warning| warning.message.clone())
        .collect();

    let mut banners = Vec::new();
    banners.extend(score.cap_explanation.clone());
    banners.extend(reality_check.clone());
    banners.extend(warnings.iter().cloned());

    let summary = format!(
        "Overall score: {}/100 ({}). Confidence: {}.",
        score.overall_score,
        score.report_tier.name(),
        confidence
    );
    let frame = ArtifactFrame {
        name: &run.name,
        summary: &summary,
        banners: &banners,
    };
    let artifacts = ArtifactDepth::ALL.map(|depth| {
        let blocks: Vec<(&str, &str)> = plan
            .components_for(depth)
            .filter_map(|kind| texts.get(&kind).map(|text| (kind.title(), text.as_str())))
            .collect();
        assemble_artifact(&frame, depth, &blocks)
    });

    let metadata = BundleMetadata {
        outcome: BundleOutcome::Complete,
        overall_score: Some(score.overall_score),
        tier: Some(score.report_tier),
        tier_name: score.report_tier.name().to_string(),
        confidence,
        word_counts: WordCounts::default(),
        was_capped: score.was_capped,
        original_score: score.original_score,
        cap_explanation: score.cap_explanation.clone(),
        revenue_tier: Some(RevenueTierSummary {
            name: context.revenue.tier.name().to_string(),
            daily_revenue: context.revenue.daily_revenue,
            modifier: context.revenue.tier.modifier(),
        }),
        reality_check,
        warnings,
        data_issues: Vec::new(),
        retry_guidance: None,
    };
    log::info!(
        "{}: scored {}/100 ({})",
        run.name,
        score.overall_score,
        score.report_tier
    );
    run.finish(metadata, artifacts, statuses)
}

fn data_error_bundle(run: RunState, error: &CriticalDataError) -> ReportBundle {
    let mut metadata = BundleMetadata::terminal(BundleOutcome::DataError, "Data error");
    metadata.data_issues = error
        .issues
        .iter()
        .map(|issue| issue.message.clone())
        .collect();

    let mut body = String::new();
    for issue in &metadata.data_issues {
        body.push_str("- ");
        body.push_str(issue);
        body.push('\n');
    }
    body.push_str("\nNo score was computed. Correct the input metrics and run the audit again.");

    let frame = ArtifactFrame {
        name: &run.name,
        summary: "No score: the input metrics contradict each other.",
        banners: &[],
    };
    let blocks = [("Data contradictions", body.as_str())];
    let artifacts = ArtifactDepth::ALL.map(|depth| assemble_artifact(&frame, depth, &blocks));
    run.finish(metadata, artifacts, BTreeMap::new())
}

fn insufficient_bundle(run: RunState, error: &InsufficientDataError) -> ReportBundle {
    let mut metadata =
        BundleMetadata::terminal(BundleOutcome::InsufficientData, "Insufficient data");
    metadata.retry_guidance = Some(error.guidance.clone());

    let body = format!(
        "Not enough data to score yet: {}.\n\n{}",
        error.reason, error.guidance
    );
    let frame = ArtifactFrame {
        name: &run.name,
        summary: "No score yet: more launch data is needed.",
        banners: &[],
    };
    let blocks = [("Check back later", body.as_str())];
    let artifacts = ArtifactDepth::ALL.map(|depth| assemble_artifact(&frame, depth, &blocks));
    run.finish(metadata, artifacts, BTreeMap::new())
}

fn display_name(raw: &RawMetrics) -> String {
    if !raw.name.trim().is_empty() {
        raw.name.trim().to_string()
    } else if !raw.app_id.trim().is_empty() {
        format!("App {}", raw.app_id.trim())
    } else {
        "Unnamed product".to_string()
    }
}

fn placeholder(kind: ComponentKind) -> String {
    format!("_{} is unavailable for this report._", kind.title())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Check that a bundle's artifacts nest: each artifact's component headings
/// start with every heading of the shorter one.
pub fn artifacts_nest(bundle: &ReportBundle) -> Result<()> {
    let headings = |text: &str| -> Vec<String> {
        text.lines()
            .filter(|line| line.starts_with("## "))
            .map(str::to_string)
            .collect()
    };
    let brief = headings(&bundle.brief);
    let overview = headings(&bundle.overview);
    let deepdive = headings(&bundle.deepdive);
    if overview.starts_with(&brief) && deepdive.starts_with(&overview) {
        Ok(())
    } else {
        Err(LaunchLensError::Other(format!(
            "artifacts of {} do not nest",
            bundle.name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::ReportTier;
    use crate::collaborator::{MockComponentGenerator, MockSectionAnalyzer};
    use crate::domain::Section;
    use crate::generators::build_generators;
    use crate::report::render_json;
    use crate::validator::tests::raw;

    fn analyzer(section: Section, value: i64) -> MockSectionAnalyzer {
        let mut mock = MockSectionAnalyzer::new();
        mock.expect_section().return_const(section);
        mock.expect_analyze().returning(move |_| Ok(value));
        mock
    }

    fn failing_analyzer(section: Section) -> MockSectionAnalyzer {
        let mut mock = MockSectionAnalyzer::new();
        mock.expect_section().return_const(section);
        mock.expect_analyze()
            .returning(|_| Err(LaunchLensError::collaborator("store", "offline")));
        mock
    }

    fn generator(kind: ComponentKind, text: &'static str) -> MockComponentGenerator {
        let mut mock = MockComponentGenerator::new();
        mock.expect_kind().return_const(kind);
        mock.expect_generate().returning(move |_| Ok(text.to_string()));
        mock
    }

    fn full_orchestrator() -> TierOrchestrator {
        let generators = build_generators(&[]).expect("generators");
        TierOrchestrator::default()
            .with_analyzer(analyzer(Section::StorePage, 80))
            .with_analyzer(analyzer(Section::CompetitivePositioning, 70))
            .with_analyzer(analyzer(Section::PricingFit, 75))
            .with_analyzer(analyzer(Section::CommunityReach, 65))
            .with_generators(generators)
    }

    fn healthy_launch() -> RawMetrics {
        raw(600_000.0, 90, 3500, 88.0, 60_000)
    }

    #[test]
    fn repeated_runs_are_identical() {
        let orchestrator = full_orchestrator();
        let first = orchestrator.run(&healthy_launch());
        let second = orchestrator.run(&healthy_launch());
        assert_eq!(first, second);
        assert_eq!(
            render_json(&first).expect("json"),
            render_json(&second).expect("json")
        );
    }

    #[test]
    fn complete_run_records_every_stage() {
        let bundle = full_orchestrator().run(&healthy_launch());
        assert_eq!(
            bundle.stages,
            vec![
                PipelineStage::Init,
                PipelineStage::Validating,
                PipelineStage::Scoring,
                PipelineStage::Capping,
                PipelineStage::TierAssigned,
                PipelineStage::ComponentGeneration,
                PipelineStage::Assembly,
                PipelineStage::Done,
            ]
        );
        assert_eq!(bundle.metadata.outcome, BundleOutcome::Complete);
        assert!(
            bundle
                .component_status
                .values()
                .all(|status| *status == ComponentStatus::Ok)
        );
    }

    #[test]
    fn reviews_exceeding_owners_is_a_data_error() {
        let bundle = full_orchestrator().run(&raw(5000.0, 10, 200, 80.0, 100));
        assert_eq!(bundle.metadata.outcome, BundleOutcome::DataError);
        assert_eq!(bundle.metadata.overall_score, None);
        assert_eq!(bundle.metadata.tier, None);
        assert!(bundle.component_status.is_empty());
        assert!(bundle.stages.contains(&PipelineStage::DataError));
        assert!(!bundle.stages.contains(&PipelineStage::Scoring));
        for depth in ArtifactDepth::ALL {
            assert!(bundle.artifact(depth).contains("200 reviews exceed 100 estimated owners"));
        }
    }

    #[test]
    fn negative_revenue_is_a_data_error() {
        let bundle = full_orchestrator().run(&raw(-10.0, 10, 20, 80.0, 1000));
        assert_eq!(bundle.metadata.outcome, BundleOutcome::DataError);
        assert!(
            bundle
                .metadata
                .data_issues
                .iter()
                .any(|issue| issue.contains("revenue is negative"))
        );
        assert_eq!(bundle.collaborators.successful, 0);
    }

    #[test]
    fn overflowing_review_counts_are_a_data_error() {
        let mut input = raw(5000.0, 10, 20, 80.0, 1000);
        input.review_count_positive = Some(i64::MAX);
        input.review_count_negative = Some(1);
        let bundle = full_orchestrator().run(&input);
        assert_eq!(bundle.metadata.outcome, BundleOutcome::DataError);
        assert_eq!(bundle.metadata.overall_score, None);
    }

    #[test]
    fn thin_launch_is_insufficient_not_failed() {
        let bundle = full_orchestrator().run(&raw(120.0, 3, 0, 0.0, 20));
        assert_eq!(bundle.metadata.outcome, BundleOutcome::InsufficientData);
        assert_eq!(bundle.metadata.overall_score, None);
        let guidance = bundle.metadata.retry_guidance.clone().expect("guidance");
        assert!(bundle.brief.contains(&guidance));
        assert_eq!(bundle.stages.last(), Some(&PipelineStage::Done));
    }

    #[test]
    fn crisis_launch_is_capped_by_revenue() {
        let bundle = full_orchestrator().run(&raw(379.0, 7, 5, 80.0, 100));
        let metadata = &bundle.metadata;
        assert_eq!(metadata.tier, Some(ReportTier::Crisis));
        assert!(metadata.overall_score.expect("score") <= 40);
        assert!(
            bundle
                .component_status
                .contains_key(&ComponentKind::SalvageabilityAssessment)
        );
        assert!(!bundle.component_status.contains_key(&ComponentKind::MarketExpansion));
        assert_eq!(bundle.collaborators.skipped, 5);
        let revenue_tier = metadata.revenue_tier.as_ref().expect("revenue tier");
        assert_eq!(revenue_tier.name, "Crisis");
        assert!(metadata.reality_check.is_some());
        assert!(bundle.brief.contains("> Reality check: Crisis revenue tier"));
    }

    #[test]
    fn healthy_launch_is_capped_by_review_quality() {
        let orchestrator = TierOrchestrator::default()
            .with_analyzer(analyzer(Section::StorePage, 100))
            .with_analyzer(analyzer(Section::CompetitivePositioning, 100))
            .with_analyzer(analyzer(Section::PricingFit, 100))
            .with_analyzer(analyzer(Section::CommunityReach, 100));
        let bundle = orchestrator.run(&healthy_launch());
        let metadata = &bundle.metadata;

        // 80*.35 + 88*.25 + 95*.15 + 95*.25 = 88, over the 85 ceiling.
        assert!(metadata.was_capped);
        assert_eq!(metadata.overall_score, Some(85));
        assert_eq!(metadata.tier, Some(ReportTier::Exceptional));
        let explanation = metadata.cap_explanation.as_ref().expect("explanation");
        assert!(explanation.contains("review quality"));
        assert!(bundle.brief.contains(explanation.as_str()));
    }

    #[test]
    fn artifacts_nest_and_grow() {
        let bundle = full_orchestrator().run(&healthy_launch());
        artifacts_nest(&bundle).expect("nested");
        let counts = &bundle.metadata.word_counts;
        assert!(counts.brief < counts.overview);
        assert!(counts.overview < counts.deepdive);
        assert_eq!(counts.deepdive, word_count(&bundle.deepdive));
        for text in [&bundle.brief, &bundle.overview, &bundle.deepdive] {
            assert!(text.trim_end().ends_with(crate::report::REPORT_FOOTER));
        }
    }

    #[test]
    fn failing_generator_gets_placeholder() {
        let mut broken = MockComponentGenerator::new();
        broken
            .expect_kind()
            .return_const(ComponentKind::ExecutiveSummary);
        broken
            .expect_generate()
            .returning(|_| Err(LaunchLensError::collaborator("writer", "quota exceeded")));
        let orchestrator = TierOrchestrator::default()
            .with_generator(broken)
            .with_generator(generator(ComponentKind::KeyMetrics, "Numbers."));

        let bundle = orchestrator.run(&healthy_launch());

        assert_eq!(
            bundle.component_status[&ComponentKind::ExecutiveSummary],
            ComponentStatus::Failed
        );
        assert_eq!(
            bundle.component_status[&ComponentKind::KeyMetrics],
            ComponentStatus::Ok
        );
        assert_eq!(
            bundle.component_status[&ComponentKind::QuickStartActions],
            ComponentStatus::PlaceholderUsed
        );
        assert!(bundle.brief.contains("_Executive Summary is unavailable for this report._"));
        assert!(bundle.overview.contains("Numbers."));
        assert_eq!(bundle.collaborators.successful, 1);
        assert_eq!(bundle.collaborators.failed, 1);
        assert_eq!(
            bundle.collaborators.not_configured,
            bundle.component_status.len() - 2
        );
    }

    struct PanickingGenerator;

    impl ComponentGenerator for PanickingGenerator {
        fn kind(&self) -> ComponentKind {
            ComponentKind::KeyMetrics
        }

        fn generate(&self, _context: &ComponentContext) -> Result<String> {
            panic!("generator crashed")
        }
    }

    #[test]
    fn panicking_generator_is_isolated() {
        let orchestrator = TierOrchestrator::default().with_generator(PanickingGenerator);

        let bundle = orchestrator.run(&healthy_launch());

        assert_eq!(bundle.metadata.outcome, BundleOutcome::Complete);
        assert_eq!(
            bundle.component_status[&ComponentKind::KeyMetrics],
            ComponentStatus::Failed
        );
    }

    #[test]
    fn empty_text_uses_placeholder() {
        let orchestrator =
            TierOrchestrator::default().with_generator(generator(ComponentKind::KeyMetrics, "  "));
        let bundle = orchestrator.run(&healthy_launch());
        assert_eq!(
            bundle.component_status[&ComponentKind::KeyMetrics],
            ComponentStatus::PlaceholderUsed
        );
    }

    #[test]
    fn slow_generator_is_marked_failed() {
        let mut slow = MockComponentGenerator::new();
        slow.expect_kind().return_const(ComponentKind::KeyMetrics);
        slow.expect_generate().returning(|_| {
            std::thread::sleep(std::time::Duration::from_millis(20));
            Ok("tardy output".to_string())
        });
        let config = PipelineConfig {
            component_timeout_ms: 1,
            ..PipelineConfig::default()
        };
        let bundle = TierOrchestrator::new(config)
            .with_generator(slow)
            .run(&healthy_launch());

        assert_eq!(
            bundle.component_status[&ComponentKind::KeyMetrics],
            ComponentStatus::Failed
        );
        assert!(!bundle.overview.contains("tardy output"));
    }

    #[test]
    fn failing_analyzers_fall_back_to_neutral_score() {
        let mut out_of_range = MockSectionAnalyzer::new();
        out_of_range
            .expect_section()
            .return_const(Section::PricingFit);
        out_of_range.expect_analyze().returning(|_| Ok(150));
        let orchestrator = TierOrchestrator::default()
            .with_analyzer(failing_analyzer(Section::StorePage))
            .with_analyzer(out_of_range)
            .with_analyzer(analyzer(Section::CommunityReach, 90));

        let metrics = match validate_metrics(&healthy_launch()) {
            ValidationOutcome::Valid(metrics) => metrics,
            other => panic!("unexpected outcome {other:?}"),
        };
        let mut digest = CollaboratorDigest::default();
        let scores = orchestrator.score_sections(&metrics, &mut digest);

        assert_eq!(scores.get(Section::StorePage), Some(50));
        assert_eq!(scores.get(Section::PricingFit), Some(50));
        assert_eq!(scores.get(Section::CommunityReach), Some(90));
        assert_eq!(scores.get(Section::CompetitivePositioning), None);
        assert_eq!(digest.failed, 2);
        assert_eq!(digest.successful, 1);
    }

    #[test]
    fn unnamed_products_get_a_display_name() {
        let mut input = healthy_launch();
        input.name = "  ".to_string();
        assert_eq!(display_name(&input), "App 1000");
        input.app_id.clear();
        assert_eq!(display_name(&input), "Unnamed product");
    }
}
