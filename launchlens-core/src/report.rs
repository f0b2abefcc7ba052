//! Report bundles and their Markdown/JSON renderings.

use std::collections::BTreeMap;
use std::fmt::{self, Write};

use serde::{Deserialize, Serialize};

use crate::aggregate::ReportTier;
use crate::collaborator::{CollaboratorDigest, ComponentStatus};
use crate::orchestrator::PipelineStage;
use crate::plan::{ArtifactDepth, ComponentKind};
use crate::validator::ValidatedMetrics;

/// Closing line of every artifact.
pub const REPORT_FOOTER: &str = "Generated by LaunchLens. Overall scores are capped by observed \
revenue and reviews, and section scores are adjusted for the revenue tier.";

/// How a pipeline run ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BundleOutcome {
    /// A full scored report was produced.
    Complete,
    /// The input contradicted itself; no score was computed.
    DataError,
    /// Too little data exists yet; the caller should retry later.
    InsufficientData,
}

/// How far the report's conclusions can be trusted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// Small sample or several advisories.
    Low,
    /// Moderate sample or at least one advisory.
    Medium,
    /// Large sample and no advisories.
    High,
}

impl Confidence {
    /// Rate validated metrics by review sample size and advisory count.
    pub fn assess(metrics: &ValidatedMetrics) -> Self {
        let reviews = metrics.review_count_total();
        let warnings = metrics.warnings().len();
        if reviews < 10 || warnings >= 3 {
            Confidence::Low
        } else if reviews < 100 || warnings > 0 {
            Confidence::Medium
        } else {
            Confidence::High
        }
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            Confidence::Low => "Low",
            Confidence::Medium => "Medium",
            Confidence::High => "High",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whitespace-delimited word counts per artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCounts {
    /// Words in the brief.
    pub brief: usize,
    /// Words in the overview.
    pub overview: usize,
    /// Words in the deep dive.
    pub deepdive: usize,
}

/// Revenue tier details carried in the metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueTierSummary {
    /// Tier name.
    pub name: String,
    /// Revenue per day since launch.
    pub daily_revenue: f64,
    /// Section score modifier of the tier.
    pub modifier: f64,
}

/// Summary fields describing a bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleMetadata {
    /// How the run ended.
    pub outcome: BundleOutcome,
    /// Final capped score, absent for terminal outcomes.
    pub overall_score: Option<u8>,
    /// Presentation tier, absent for terminal outcomes.
    pub tier: Option<ReportTier>,
    /// Display name of the tier or terminal outcome.
    pub tier_name: String,
    /// Trust in the conclusions.
    pub confidence: Confidence,
    /// Words per artifact.
    pub word_counts: WordCounts,
    /// Whether the score hit its cap.
    pub was_capped: bool,
    /// Weighted score before capping, when capped.
    pub original_score: Option<f64>,
    /// Cap explanation, when capped.
    pub cap_explanation: Option<String>,
    /// Revenue tier, absent for terminal outcomes.
    pub revenue_tier: Option<RevenueTierSummary>,
    /// Reality-check banner, when any section was noticeably reduced.
    pub reality_check: Option<String>,
    /// Advisory messages from validation.
    pub warnings: Vec<String>,
    /// Contradictions found in the input, for data errors.
    pub data_issues: Vec<String>,
    /// When to try again, for insufficient data.
    pub retry_guidance: Option<String>,
}

impl BundleMetadata {
    /// Metadata for a run that stopped before scoring.
    pub fn terminal(outcome: BundleOutcome, tier_name: impl Into<String>) -> Self {
        Self {
            outcome,
            overall_score: None,
            tier: None,
            tier_name: tier_name.into(),
            confidence: Confidence::Low,
            word_counts: WordCounts::default(),
            was_capped: false,
            original_score: None,
            cap_explanation: None,
            revenue_tier: None,
            reality_check: None,
            warnings: Vec::new(),
            data_issues: Vec::new(),
            retry_guidance: None,
        }
    }
}

/// The three nested report artifacts with their metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportBundle {
    /// Product name.
    pub name: String,
    /// Shortest artifact.
    pub brief: String,
    /// Brief plus supporting analysis.
    pub overview: String,
    /// Everything.
    pub deepdive: String,
    /// Summary fields.
    pub metadata: BundleMetadata,
    /// Outcome of every planned component.
    pub component_status: BTreeMap<ComponentKind, ComponentStatus>,
    /// Collaborator call counts.
    pub collaborators: CollaboratorDigest,
    /// Stages entered, in order.
    pub stages: Vec<PipelineStage>,
}

impl ReportBundle {
    /// Artifact text for a depth.
    pub fn artifact(&self, depth: ArtifactDepth) -> &str {
        match depth {
            ArtifactDepth::Brief => &self.brief,
            ArtifactDepth::Overview => &self.overview,
            ArtifactDepth::DeepDive => &self.deepdive,
        }
    }
}

/// Count whitespace-delimited words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Pieces shared by every artifact of one bundle.
pub(crate) struct ArtifactFrame<'a> {
    pub(crate) name: &'a str,
    pub(crate) summary: &'a str,
    pub(crate) banners: &'a [String],
}

/// Build one artifact from its frame and body blocks.
pub(crate) fn assemble_artifact(
    frame: &ArtifactFrame<'_>,
    depth: ArtifactDepth,
    blocks: &[(&str, &str)],
) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# {} launch audit: {}\n", frame.name, depth.title());
    let _ = writeln!(output, "{}\n", frame.summary);
    for banner in frame.banners {
        let _ = writeln!(output, "> {banner}\n");
    }
    for (title, text) in blocks {
        let _ = writeln!(output, "## {title}\n");
        let _ = writeln!(output, "{}\n", text.trim_end());
    }
    let _ = writeln!(output, "---\n{REPORT_FOOTER}");
    output
}

/// Render bundles as one Markdown document built from their deep dives.
pub fn render_bundle_markdown(bundles: &[ReportBundle]) -> String {
    let mut output = String::new();
    for bundle in bundles {
        output.push_str(&bundle.deepdive);
        let _ = writeln!(output);
        append_component_status(&mut output, &bundle.component_status);
        append_digest(&mut output, &bundle.collaborators);
    }
    output
}

/// Render any serializable report payload as JSON.
pub fn render_json<T: Serialize + ?Sized>(payload: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(payload)
}

fn append_component_status(
    output: &mut String,
    statuses: &BTreeMap<ComponentKind, ComponentStatus>,
) {
    if statuses.is_empty() {
        let _ = writeln!(output, "### Components\nNo components requested.\n");
        return;
    }
    let _ = writeln!(output, "### Components");
    for (kind, status) in statuses {
        let _ = writeln!(output, "- {}: {}", kind.title(), status.as_str());
    }
    let _ = writeln!(output);
}

fn append_digest(output: &mut String, digest: &CollaboratorDigest) {
    let _ = writeln!(output, "### Collaborators");
    let _ = writeln!(
        output,
        "- Successful: {}\n- Failed: {}\n- Skipped: {}\n- Not configured: {}",
        digest.successful, digest.failed, digest.skipped, digest.not_configured
    );
    let _ = writeln!(output, "- Data quality: {:?}\n", digest.data_quality);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::WarningKind;
    use crate::validator::tests::{raw, valid};

    fn sample_bundle() -> ReportBundle {
        let frame = ArtifactFrame {
            name: "Starfall",
            summary: "Overall score: 72/100 (Solid).",
            banners: &["Only 8 reviews so far.".to_string()],
        };
        let brief = assemble_artifact(&frame, ArtifactDepth::Brief, &[("Executive Summary", "Good.")]);
        let mut statuses = BTreeMap::new();
        statuses.insert(ComponentKind::ExecutiveSummary, ComponentStatus::Ok);
        statuses.insert(ComponentKind::KeyMetrics, ComponentStatus::Failed);
        ReportBundle {
            name: "Starfall".to_string(),
            overview: brief.clone(),
            deepdive: brief.clone(),
            brief,
            metadata: BundleMetadata::terminal(BundleOutcome::Complete, "Solid"),
            component_status: statuses,
            collaborators: CollaboratorDigest::default(),
            stages: vec![PipelineStage::Init, PipelineStage::Done],
        }
    }

    #[test]
    fn artifacts_have_header_banners_and_footer() {
        let bundle = sample_bundle();
        let brief = bundle.artifact(ArtifactDepth::Brief);
        assert!(brief.starts_with("# Starfall launch audit: Brief\n"));
        assert!(brief.contains("> Only 8 reviews so far."));
        assert!(brief.contains("## Executive Summary\n\nGood.\n"));
        assert!(brief.trim_end().ends_with(REPORT_FOOTER));
    }

    #[test]
    fn counts_words_on_whitespace() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("  one\ttwo\nthree  "), 3);
    }

    #[test]
    fn confidence_follows_sample_and_warnings() {
        let thin = valid(&raw(5000.0, 10, 3, 85.0, 1000));
        assert!(thin.has_warning(WarningKind::LowReviewSample));
        assert_eq!(Confidence::assess(&thin), Confidence::Low);

        let moderate = valid(&raw(5000.0, 10, 50, 85.0, 1000));
        assert_eq!(Confidence::assess(&moderate), Confidence::Medium);
    }

    #[test]
    fn renders_markdown_with_statuses() {
        let output = render_bundle_markdown(&[sample_bundle()]);
        assert!(output.contains("# Starfall launch audit"));
        assert!(output.contains("- Key Metrics: failed"));
        assert!(output.contains("- Data quality: Poor"));
    }

    #[test]
    fn renders_json_with_snake_case_keys() {
        let json = render_json(&vec![sample_bundle()]).expect("json");
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("parse");
        assert_eq!(parsed[0]["metadata"]["outcome"], "complete");
        assert_eq!(parsed[0]["component_status"]["key_metrics"], "failed");
        assert_eq!(parsed[0]["component_status"]["executive_summary"], "ok");
        assert_eq!(parsed[0]["stages"][0], "init");
        assert!(parsed[0]["metadata"]["overall_score"].is_null());
    }
}
