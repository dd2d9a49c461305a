mod display;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use codeguard_core::analyzer::FileAnalyzer;
use codeguard_core::client::{ModelClient, OpenAiBackend};
use codeguard_core::config::AppConfig;
use codeguard_core::model::AnalysisMode;
use codeguard_core::report::{self, kt, ReportFormat, ReportType};
use codeguard_core::{discovery, AnalysisAggregator};
use colored::*;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "code-guard",
    version,
    about = "Code Guard: LLM-driven code quality analysis",
    long_about = "Score source files on code quality, SOLID, design patterns, security and likely bugs \
                  using an OpenAI-compatible model, then write technical and executive reports.\n\n\
                  Requires the OPENAI_API_KEY environment variable."
)]
struct Cli {
    /// Files or directories to analyze
    files: Vec<PathBuf>,

    /// Directory to scan recursively for source and build files
    #[arg(long, value_name = "DIR")]
    scan: Option<PathBuf>,

    /// Directory the reports are written to
    #[arg(short, long, default_value = "./reports")]
    output: PathBuf,

    /// Minimum overall score for the quality gate
    #[arg(short, long, default_value_t = 70.0)]
    threshold: f64,

    /// Analysis mode
    #[arg(short, long, value_enum, default_value_t = ModeArg::Standard)]
    mode: ModeArg,

    /// Audience of the HTML reports
    #[arg(short = 'r', long, value_enum, default_value_t = ReportTypeArg::Both)]
    report_type: ReportTypeArg,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = FormatArg::Html)]
    format: FormatArg,

    /// Also generate knowledge-transfer documentation
    #[arg(long)]
    kt: bool,

    /// Configuration file (defaults to ./codeguard.toml when present)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Number of files analyzed at the same time
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,

    /// Show debug logs
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only show errors
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    #[value(alias = "STANDARD")]
    Standard,
    #[value(alias = "QA_AUTOMATION")]
    QaAutomation,
    #[value(alias = "DEVOPS_TESTING")]
    DevopsTesting,
    #[value(alias = "DEVELOPER_REVIEW")]
    DeveloperReview,
}

impl From<ModeArg> for AnalysisMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Standard => AnalysisMode::Standard,
            ModeArg::QaAutomation => AnalysisMode::QaAutomation,
            ModeArg::DevopsTesting => AnalysisMode::DevopsTesting,
            ModeArg::DeveloperReview => AnalysisMode::DeveloperReview,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportTypeArg {
    #[value(alias = "TECHNICAL")]
    Technical,
    #[value(alias = "NON_TECHNICAL")]
    NonTechnical,
    #[value(alias = "BOTH")]
    Both,
}

impl From<ReportTypeArg> for ReportType {
    fn from(report_type: ReportTypeArg) -> Self {
        match report_type {
            ReportTypeArg::Technical => ReportType::Technical,
            ReportTypeArg::NonTechnical => ReportType::NonTechnical,
            ReportTypeArg::Both => ReportType::Both,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    #[value(alias = "HTML")]
    Html,
    #[value(alias = "JSON")]
    Json,
}

impl From<FormatArg> for ReportFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Html => ReportFormat::Html,
            FormatArg::Json => ReportFormat::Json,
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut config =
        AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(concurrency) = cli.concurrency {
        config = config.with_concurrency(concurrency);
    }
    tracing::debug!("configuration: {:?}", config);

    let mut roots = cli.files.clone();
    roots.extend(cli.scan.clone());
    if roots.is_empty() {
        anyhow::bail!("No input given. Pass files or directories, or --scan <DIR>.");
    }

    let files = discovery::discover_files(&roots).context("Failed to collect input files")?;
    if files.is_empty() {
        eprintln!(
            "{} No analyzable files found in the given paths.",
            "error:".red().bold()
        );
        return Ok(ExitCode::FAILURE);
    }

    let mode = AnalysisMode::from(cli.mode);
    let backend =
        OpenAiBackend::new(config.model.clone()).context("Failed to create the model client")?;
    let client = ModelClient::new(Arc::new(backend), config.retry.clone());
    let analyzer = FileAnalyzer::new(client, mode).with_knowledge_transfer(cli.kt);
    let aggregator = AnalysisAggregator::new(analyzer).with_concurrency(config.concurrency);

    display::print_banner(files.len(), mode);
    let result = aggregator.run(&files).await;
    display::print_analysis_summary(&result);

    let mut written = report::write_reports(
        &result,
        &cli.output,
        cli.report_type.into(),
        cli.format.into(),
    )
    .with_context(|| format!("Failed to write reports to {}", cli.output.display()))?;

    if cli.kt {
        let summaries = kt::summarize(aggregator.analyzer().client(), &result).await;
        written.extend(
            kt::write_kt_docs(&summaries, &cli.output)
                .context("Failed to write knowledge transfer documentation")?,
        );
    }
    display::print_written(&cli.output, &written);

    display::print_quality_gate(&result, cli.threshold, mode);
    if !result.passes_gate(cli.threshold) && mode.enforces_quality_gate() {
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}
