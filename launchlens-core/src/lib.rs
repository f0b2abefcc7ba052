#![deny(missing_docs)]
//! LaunchLens core library.
//!
//! Scores a product launch from raw commercial metrics: validation, reality
//! caps, revenue tiers, weighted aggregation and the tiered report bundle.

pub mod aggregate;
pub mod cache;
pub mod caps;
pub mod collaborator;
pub mod config;
pub mod domain;
pub mod error;
/// Built-in component generators.
pub mod generators;
pub mod orchestrator;
pub mod plan;
pub mod pool;
pub mod report;
pub mod tier;
pub mod validator;

pub use aggregate::{FinalScore, ReportTier, ScoreComponents, aggregate, review_volume_component};
pub use cache::{CachingAnalyzer, SharedCache, TtlCache, shared_cache};
pub use caps::{
    CapDecision, CapDimension, NextThreshold, ScoreCaps, compute_caps, review_quality_cap,
    review_volume_cap, revenue_cap,
};
pub use collaborator::{
    CollaboratorDigest, ComponentContext, ComponentGenerator, ComponentStatus, DataQuality,
    SectionAnalyzer,
};
pub use config::PipelineConfig;
pub use domain::{RawMetrics, Section, SectionScores};
pub use error::{LaunchLensError, Result};
pub use generators::{FactSheetGenerator, build_generators};
pub use orchestrator::{PipelineStage, TierOrchestrator, artifacts_nest};
pub use plan::{ArtifactDepth, ComponentKind, ContentPlan};
pub use pool::{PoolError, WorkerPool};
pub use report::{
    BundleMetadata, BundleOutcome, Confidence, ReportBundle, WordCounts, render_bundle_markdown,
    render_json, word_count,
};
pub use tier::{ModifiedSectionScores, RevenueTier, TierClassification, apply_modifier, classify};
pub use validator::{
    CriticalDataError, InsufficientDataError, ValidatedMetrics, ValidationOutcome,
    ValidationWarning, validate_metrics,
};
