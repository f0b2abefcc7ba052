//! External collaborator seams: section analyzers and component generators.

use serde::{Deserialize, Serialize};

use crate::aggregate::{FinalScore, ReportTier};
use crate::caps::ScoreCaps;
use crate::domain::Section;
use crate::error::Result;
use crate::plan::ComponentKind;
use crate::tier::{ModifiedSectionScores, TierClassification};
use crate::validator::ValidatedMetrics;

/// Produces a 0-100 score for one report section.
#[cfg_attr(test, mockall::automock)]
pub trait SectionAnalyzer {
    /// Section this analyzer scores.
    fn section(&self) -> Section;
    /// Score the section. Values outside `0..=100` are rejected by the pipeline.
    fn analyze(&self, metrics: &ValidatedMetrics) -> Result<i64>;
}

/// Produces the pre-formatted text of one report component.
#[cfg_attr(test, mockall::automock)]
pub trait ComponentGenerator {
    /// Component this generator writes.
    fn kind(&self) -> ComponentKind;
    /// Generate the component text.
    fn generate(&self, context: &ComponentContext) -> Result<String>;
}

/// Everything the pipeline knows when components are generated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentContext {
    /// Validated input metrics.
    pub metrics: ValidatedMetrics,
    /// Reality caps.
    pub caps: ScoreCaps,
    /// Revenue tier classification.
    pub revenue: TierClassification,
    /// Section scores after the revenue modifier.
    pub sections: ModifiedSectionScores,
    /// Final capped score.
    pub score: FinalScore,
}

impl ComponentContext {
    /// Presentation tier of the report.
    pub fn report_tier(&self) -> ReportTier {
        self.score.report_tier
    }
}

/// Outcome of one component request.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentStatus {
    /// Generated text was used.
    Ok,
    /// No generator was available or it returned nothing; a placeholder was used.
    PlaceholderUsed,
    /// The generator failed or overran its time budget; a placeholder was used.
    Failed,
}

impl ComponentStatus {
    /// Stable label.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentStatus::Ok => "ok",
            ComponentStatus::PlaceholderUsed => "placeholder_used",
            ComponentStatus::Failed => "failed",
        }
    }
}

/// Coarse rating of how much collaborator output the report is based on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataQuality {
    /// At least 80% of calls succeeded.
    Excellent,
    /// At least 60% of calls succeeded.
    Good,
    /// At least 40% of calls succeeded.
    Limited,
    /// Fewer than 40% of calls succeeded.
    Poor,
}

impl DataQuality {
    /// Rating for a success ratio between 0 and 1.
    pub fn from_success_rate(rate: f64) -> Self {
        if rate >= 0.8 {
            DataQuality::Excellent
        } else if rate >= 0.6 {
            DataQuality::Good
        } else if rate >= 0.4 {
            DataQuality::Limited
        } else {
            DataQuality::Poor
        }
    }
}

/// Counts of collaborator calls made while building one report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollaboratorDigest {
    /// Calls that returned usable output.
    pub successful: usize,
    /// Calls that failed, overran or returned invalid output.
    pub failed: usize,
    /// Components deliberately not requested for the report tier.
    pub skipped: usize,
    /// Requests with no collaborator registered.
    pub not_configured: usize,
    /// Rating derived from the counts.
    pub data_quality: DataQuality,
}

impl Default for CollaboratorDigest {
    fn default() -> Self {
        Self {
            successful: 0,
            failed: 0,
            skipped: 0,
            not_configured: 0,
            data_quality: DataQuality::Poor,
        }
    }
}

impl CollaboratorDigest {
    /// Record a successful call.
    pub fn record_success(&mut self) {
        self.successful += 1;
        self.refresh();
    }

    /// Record a failed call.
    pub fn record_failure(&mut self) {
        self.failed += 1;
        self.refresh();
    }

    /// Record skipped requests.
    pub fn record_skipped(&mut self, count: usize) {
        self.skipped += count;
    }

    /// Record a request with no collaborator.
    pub fn record_not_configured(&mut self) {
        self.not_configured += 1;
        self.refresh();
    }

    /// Share of attempted requests that succeeded, 0 when nothing was attempted.
    pub fn success_rate(&self) -> f64 {
        let attempted = self.successful + self.failed + self.not_configured;
        if attempted == 0 {
            return 0.0;
        }
        self.successful as f64 / attempted as f64
    }

    fn refresh(&mut self) {
        self.data_quality = DataQuality::from_success_rate(self.success_rate());
    }
}
