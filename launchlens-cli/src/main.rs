#![deny(missing_docs)]
//! LaunchLens command-line interface.
//!
//! Scores product launches from JSON metrics files, one at a time or in
//! batches, and writes the tiered report bundles as text, Markdown or JSON.

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use launchlens_core::cache::DEFAULT_MAX_ENTRIES;
use launchlens_core::config::DEFAULT_COMPONENT_TIMEOUT_MS;
use launchlens_core::pool::{DEFAULT_CONCURRENCY, DEFAULT_ITEM_TIMEOUT};
use launchlens_core::{
    ArtifactDepth, BundleOutcome, CachingAnalyzer, ComponentStatus, LaunchLensError,
    PipelineConfig, RawMetrics, ReportBundle, Section, SectionAnalyzer, SharedCache, TierOrchestrator, ValidatedMetrics,
    WorkerPool, build_generators, render_bundle_markdown, render_json, shared_cache,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub(crate) type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

const DEFAULT_CACHE_TTL_SECS: u64 = 300;

#[derive(Parser)]
#[command(name = "launchlens", version, about = "LaunchLens CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
#[command(group(
    ArgGroup::new("source")
        .required(true)
        .args(&["file", "dir"])
))]
struct InputSourceArgs {
    /// File listing product metrics files (one per line).
    #[arg(short, long)]
    file: Option<PathBuf>,
    /// Directory containing product metrics files (*.json).
    #[arg(long)]
    dir: Option<PathBuf>,
}

#[derive(Args, Clone)]
struct WorkerArgs {
    /// Maximum number of products audited at once.
    #[arg(short = 'j', long, env = "LAUNCHLENS_CONCURRENCY", default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,
    /// Time budget per product, in seconds.
    #[arg(long = "item-timeout", env = "LAUNCHLENS_ITEM_TIMEOUT_SECS", default_value_t = DEFAULT_ITEM_TIMEOUT.as_secs())]
    item_timeout: u64,
}

#[derive(Args, Clone)]
struct PipelineArgs {
    /// Time budget per report component, in milliseconds.
    #[arg(
        long = "component-timeout-ms",
        env = "LAUNCHLENS_COMPONENT_TIMEOUT_MS",
        default_value_t = DEFAULT_COMPONENT_TIMEOUT_MS
    )]
    component_timeout_ms: u64,
    /// Lifetime of cached section scores, in seconds.
    #[arg(long = "cache-ttl", env = "LAUNCHLENS_CACHE_TTL_SECS", default_value_t = DEFAULT_CACHE_TTL_SECS)]
    cache_ttl: u64,
    /// Maximum number of cached section scores.
    #[arg(long = "cache-capacity", env = "LAUNCHLENS_CACHE_CAPACITY", default_value_t = DEFAULT_MAX_ENTRIES)]
    cache_capacity: usize,
    /// Component generator IDs to run (repeatable or comma-separated). Defaults to all.
    #[arg(long, value_delimiter = ',')]
    generator: Vec<String>,
}

#[derive(Args, Clone)]
struct OutputArgs {
    /// Output format for report data.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Write the report to a file instead of stdout.
    #[arg(long = "report-output")]
    report_output: Option<PathBuf>,
    /// Artifact printed by the text format.
    #[arg(long, value_enum, default_value_t = ArtifactChoice::Brief)]
    artifact: ArtifactChoice,
}

#[derive(ValueEnum, Copy, Clone, Debug, Eq, PartialEq)]
enum OutputFormat {
    Text,
    Json,
    Markdown,
}

#[derive(ValueEnum, Copy, Clone, Debug, Eq, PartialEq)]
enum ArtifactChoice {
    Brief,
    Overview,
    Deepdive,
}

impl ArtifactChoice {
    fn depth(self) -> ArtifactDepth {
        match self {
            ArtifactChoice::Brief => ArtifactDepth::Brief,
            ArtifactChoice::Overview => ArtifactDepth::Overview,
            ArtifactChoice::Deepdive => ArtifactDepth::DeepDive,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Audit a single product metrics file.
    Audit {
        /// Product metrics file (JSON).
        #[arg(short, long)]
        input: PathBuf,
        #[command(flatten)]
        pipeline: PipelineArgs,
        #[command(flatten)]
        report: OutputArgs,
    },
    /// Audit every product listed in a file or found in a directory.
    Batch {
        #[command(flatten)]
        source: InputSourceArgs,
        #[command(flatten)]
        workers: WorkerArgs,
        #[command(flatten)]
        pipeline: PipelineArgs,
        #[command(flatten)]
        report: OutputArgs,
    },
}

#[cfg(not(test))]
#[tokio::main]
async fn main() -> CliResult<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Audit {
            input,
            pipeline,
            report,
        } => {
            let settings = AuditSettings::from_args(&pipeline)?;
            run_audit(input, settings, report).await?
        }
        Commands::Batch {
            source,
            workers,
            pipeline,
            report,
        } => {
            let source = resolve_source_args(&source)?;
            let settings = AuditSettings::from_args(&pipeline)?;
            run_batch(source, workers, settings, report).await?
        }
    }

    Ok(())
}

#[cfg(test)]
fn main() {}

/// One product file as read from disk.
#[derive(Debug, Clone, Deserialize)]
struct ProductInput {
    metrics: RawMetrics,
    #[serde(default)]
    section_scores: BTreeMap<Section, i64>,
}

/// Serves a section score supplied in the input file.
struct StaticAnalyzer {
    section: Section,
    score: i64,
}

impl SectionAnalyzer for StaticAnalyzer {
    fn section(&self) -> Section {
        self.section
    }

    fn analyze(&self, _metrics: &ValidatedMetrics) -> launchlens_core::Result<i64> {
        Ok(self.score)
    }
}

struct AuditSettings {
    config: PipelineConfig,
    generator_ids: Vec<String>,
    cache: SharedCache<i64>,
}

impl AuditSettings {
    fn from_args(args: &PipelineArgs) -> CliResult<Self> {
        let config = PipelineConfig {
            component_timeout_ms: args.component_timeout_ms,
            ..PipelineConfig::default()
        };
        Self::new(
            config,
            args.generator.clone(),
            Duration::from_secs(args.cache_ttl),
            args.cache_capacity,
        )
    }

    fn new(
        config: PipelineConfig,
        generator_ids: Vec<String>,
        cache_ttl: Duration,
        cache_capacity: usize,
    ) -> CliResult<Self> {
        config.validate()?;
        build_generators(&generator_ids)?;
        Ok(Self {
            config,
            generator_ids,
            cache: shared_cache(cache_ttl, cache_capacity),
        })
    }

    /// Build an orchestrator for one input file. Cached scores are scoped to
    /// `source` because the analyzers answer from that file.
    fn orchestrator(
        &self,
        source: &Path,
        input: &ProductInput,
    ) -> launchlens_core::Result<TierOrchestrator> {
        let scope = source.display().to_string();
        let generators = build_generators(&self.generator_ids)?;
        let mut orchestrator =
            TierOrchestrator::new(self.config.clone()).with_generators(generators);
        for (section, score) in &input.section_scores {
            let analyzer = StaticAnalyzer {
                section: *section,
                score: *score,
            };
            orchestrator = orchestrator.with_analyzer(CachingAnalyzer::new(
                analyzer,
                self.cache.clone(),
                scope.as_str(),
            ));
        }
        Ok(orchestrator)
    }
}

/// Result of auditing one input file.
#[derive(Debug, Clone, Serialize)]
struct AuditEntry {
    source: PathBuf,
    bundle: Option<ReportBundle>,
    error: Option<String>,
}

impl AuditEntry {
    fn completed(source: PathBuf, bundle: ReportBundle) -> Self {
        Self {
            source,
            bundle: Some(bundle),
            error: None,
        }
    }

    fn failed(source: PathBuf, error: impl Into<String>) -> Self {
        Self {
            source,
            bundle: None,
            error: Some(error.into()),
        }
    }
}

enum BatchSource {
    File(PathBuf),
    Dir(PathBuf),
}

async fn run_audit(input: PathBuf, settings: AuditSettings, report: OutputArgs) -> CliResult<()> {
    let bundle = audit_file(&input, &settings).await?;
    emit_entries(&[AuditEntry::completed(input, bundle)], &report).await
}

async fn run_batch(
    source: BatchSource,
    workers: WorkerArgs,
    settings: AuditSettings,
    report: OutputArgs,
) -> CliResult<()> {
    let paths = load_input_paths(source).await?;
    if paths.is_empty() {
        println!("No product files found to audit.");
        return Ok(());
    }

    let pool = WorkerPool::new(workers.concurrency, Duration::from_secs(workers.item_timeout));
    log::info!(
        "auditing {} product files ({} at a time)",
        paths.len(),
        pool.concurrency()
    );
    let entries = audit_paths(&pool, paths, Arc::new(settings)).await;
    let failed = entries.iter().filter(|entry| entry.bundle.is_none()).count();
    if failed > 0 {
        log::warn!("{failed} of {} product files could not be audited", entries.len());
    }
    emit_entries(&entries, &report).await
}

async fn audit_paths(
    pool: &WorkerPool,
    paths: Vec<PathBuf>,
    settings: Arc<AuditSettings>,
) -> Vec<AuditEntry> {
    let results = pool
        .run(paths.clone(), move |path: PathBuf| {
            let settings = settings.clone();
            async move { audit_file(&path, &settings).await }
        })
        .await;

    paths
        .into_iter()
        .zip(results)
        .map(|(path, result)| match result {
            Ok(bundle) => AuditEntry::completed(path, bundle),
            Err(err) => AuditEntry::failed(path, err.to_string()),
        })
        .collect()
}

async fn audit_file(path: &Path, settings: &AuditSettings) -> launchlens_core::Result<ReportBundle> {
    let contents = tokio::fs::read_to_string(path).await?;
    let input: ProductInput = serde_json::from_str(&contents)?;
    let orchestrator = settings.orchestrator(path, &input)?;
    run_orchestrator(orchestrator, input.metrics, path).await
}

/// Run a pipeline on the blocking pool so the caller's timeout stays live.
async fn run_orchestrator(
    orchestrator: TierOrchestrator,
    metrics: RawMetrics,
    source: &Path,
) -> launchlens_core::Result<ReportBundle> {
    tokio::task::spawn_blocking(move || orchestrator.run(&metrics))
        .await
        .map_err(|err| {
            LaunchLensError::Other(format!("audit of {} aborted: {err}", source.display()))
        })
}

fn resolve_source_args(source: &InputSourceArgs) -> CliResult<BatchSource> {
    if let Some(file) = source.file.clone() {
        return Ok(BatchSource::File(file));
    }
    if let Some(dir) = source.dir.clone() {
        return Ok(BatchSource::Dir(dir));
    }
    Err("no input source provided".into())
}

async fn load_input_paths(source: BatchSource) -> CliResult<Vec<PathBuf>> {
    match source {
        BatchSource::File(file) => load_input_list(&file).await,
        BatchSource::Dir(dir) => load_input_paths_from_dir(&dir).await,
    }
}

async fn load_input_list(path: &Path) -> CliResult<Vec<PathBuf>> {
    let contents = tokio::fs::read_to_string(path).await?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let paths = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| {
            let entry = PathBuf::from(line);
            if entry.is_absolute() {
                entry
            } else {
                base.join(entry)
            }
        })
        .collect();
    Ok(paths)
}

async fn load_input_paths_from_dir(path: &Path) -> CliResult<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(path).await?;
    let mut inputs = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let file_type = entry.file_type().await?;
        if !file_type.is_file() {
            continue;
        }
        let entry_path = entry.path();
        if is_hidden_path(&entry_path) || !is_json_path(&entry_path) {
            continue;
        }
        inputs.push(entry_path);
    }
    inputs.sort();
    Ok(inputs)
}

fn is_hidden_path(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn is_json_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

async fn emit_entries(entries: &[AuditEntry], output: &OutputArgs) -> CliResult<()> {
    let contents = match output.format {
        OutputFormat::Text => render_text(entries, output.artifact.depth()),
        OutputFormat::Markdown => render_markdown(entries),
        OutputFormat::Json => render_json(entries)?,
    };
    emit_output(output, contents).await
}

async fn emit_output(output: &OutputArgs, contents: String) -> CliResult<()> {
    if let Some(path) = &output.report_output {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, contents).await?;
    } else {
        print!("{contents}");
    }
    Ok(())
}

fn render_text(entries: &[AuditEntry], depth: ArtifactDepth) -> String {
    let mut output = String::new();
    for entry in entries {
        let _ = writeln!(output, "Source: {}", entry.source.display());
        let Some(bundle) = &entry.bundle else {
            let error = entry.error.as_deref().unwrap_or("unknown error");
            let _ = writeln!(output, "Status: failed ({error})");
            let _ = writeln!(output);
            continue;
        };

        let metadata = &bundle.metadata;
        match metadata.outcome {
            BundleOutcome::Complete => {
                let _ = writeln!(output, "Status: scored");
            }
            BundleOutcome::DataError => {
                let _ = writeln!(output, "Status: data error");
            }
            BundleOutcome::InsufficientData => {
                let _ = writeln!(output, "Status: insufficient data");
            }
        }
        match metadata.overall_score {
            Some(score) => {
                let _ = writeln!(output, "Score: {score}/100 ({})", metadata.tier_name);
                let _ = writeln!(output, "Confidence: {}", metadata.confidence);
            }
            None => {
                let _ = writeln!(output, "Score: none");
            }
        }
        if !bundle.component_status.is_empty() {
            let count = |wanted: ComponentStatus| {
                bundle
                    .component_status
                    .values()
                    .filter(|status| **status == wanted)
                    .count()
            };
            let _ = writeln!(
                output,
                "Components: {} ok, {} placeholder, {} failed",
                count(ComponentStatus::Ok),
                count(ComponentStatus::PlaceholderUsed),
                count(ComponentStatus::Failed)
            );
        }
        let _ = writeln!(output);
        output.push_str(bundle.artifact(depth));
        let _ = writeln!(output);
    }
    output
}

fn render_markdown(entries: &[AuditEntry]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# LaunchLens Audit Report\n");
    let failures: Vec<&AuditEntry> = entries.iter().filter(|e| e.bundle.is_none()).collect();
    if !failures.is_empty() {
        let _ = writeln!(output, "## Failed inputs\n");
        for entry in failures {
            let _ = writeln!(
                output,
                "- `{}`: {}",
                entry.source.display(),
                entry.error.as_deref().unwrap_or("unknown error")
            );
        }
        let _ = writeln!(output);
    }
    let bundles: Vec<ReportBundle> = entries
        .iter()
        .filter_map(|entry| entry.bundle.clone())
        .collect();
    output.push_str(&render_bundle_markdown(&bundles));
    output
}
