//! batch-classifier - resumable dataset classification
//!
//! Classifies every record of a dataset through a chat-completions service,
//! batch by batch, and writes a final report.

#![allow(missing_docs)]

use anyhow::Context;
use batch_classifier::core::classifier::{ChatCompletionClient, RecordClassifier};
use batch_classifier::core::{Dataset, Orchestrator, RunContext, StartPoint, render_summary};
use batch_classifier::storage::PersistenceManager;
use batch_classifier::utils::error::RetryPolicy;
use batch_classifier::utils::logging::init_logging;
use batch_classifier::{Config, build_info};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

const DEFAULT_CONFIG_PATH: &str = "config/classifier.yaml";

#[derive(Debug, Parser)]
#[command(name = "batch-classifier", version, about = "Classify dataset records in resumable batches")]
struct Cli {
    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Classify the dataset, continuing after the checkpoint if one exists
    Run {
        /// Ignore and reset any existing checkpoint
        #[arg(long)]
        fresh: bool,
    },
    /// Continue a previous run
    Resume {
        /// Start at this batch instead of after the checkpoint
        #[arg(long)]
        from: Option<usize>,
    },
    /// Print the effective configuration as YAML
    ShowConfig,
}

/// Settings that override the configuration file and environment
#[derive(Debug, Default, Args)]
struct Overrides {
    /// YAML configuration file
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Input dataset (.parquet, .csv, .jsonl)
    #[arg(long, short = 'i', global = true)]
    input: Option<PathBuf>,

    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    #[arg(long, global = true)]
    report_path: Option<PathBuf>,

    #[arg(long, global = true)]
    batch_size: Option<usize>,

    #[arg(long, global = true)]
    concurrency: Option<usize>,

    /// Attempts per record, including the first
    #[arg(long, global = true)]
    max_retries: Option<u32>,

    /// Batch to start at when no checkpoint exists
    #[arg(long, global = true)]
    start_batch: Option<usize>,

    #[arg(long, global = true)]
    model: Option<String>,

    #[arg(long, global = true)]
    base_url: Option<String>,

    #[arg(long, global = true, env = "CLASSIFIER_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long, global = true)]
    temperature: Option<f32>,

    #[arg(long, global = true)]
    max_tokens: Option<u32>,

    /// Do not ask the service for reasoning output
    #[arg(long, global = true)]
    no_thinking: bool,

    /// Skip the correctness questions
    #[arg(long, global = true)]
    no_mislabel_analysis: bool,

    #[arg(long, global = true)]
    log_level: Option<String>,

    #[arg(long, global = true)]
    log_json: bool,

    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

impl Overrides {
    fn apply(&self, config: &mut Config) {
        if let Some(input) = &self.input {
            config.input = Some(input.clone());
        }
        if let Some(dir) = &self.output_dir {
            config.output.output_dir = dir.clone();
        }
        if let Some(path) = &self.report_path {
            config.output.report_path = path.clone();
        }
        if let Some(size) = self.batch_size {
            config.batch.batch_size = size;
        }
        if let Some(concurrency) = self.concurrency {
            config.batch.concurrency = concurrency;
        }
        if let Some(retries) = self.max_retries {
            config.batch.max_retries = retries;
        }
        if let Some(start) = self.start_batch {
            config.start_batch = start;
        }
        if let Some(model) = &self.model {
            config.service.model = model.clone();
        }
        if let Some(url) = &self.base_url {
            config.service.base_url = url.clone();
        }
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.is_empty()) {
            config.service.api_key = Some(key.clone());
        }
        if let Some(temperature) = self.temperature {
            config.service.temperature = temperature;
        }
        if let Some(tokens) = self.max_tokens {
            config.service.max_tokens = tokens;
        }
        if self.no_thinking {
            config.service.enable_thinking = false;
        }
        if self.no_mislabel_analysis {
            config.analysis.mislabel_analysis = false;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if self.log_json {
            config.logging.json = true;
        }
        if let Some(file) = &self.log_file {
            config.logging.file = Some(file.clone());
        }
    }
}

impl Command {
    fn start_point(&self) -> StartPoint {
        match self {
            Command::Run { fresh: true } => StartPoint::Fresh,
            Command::Resume { from: Some(batch) } => StartPoint::ResumeFrom(*batch),
            _ => StartPoint::Resume,
        }
    }
}

/// Defaults, then the YAML file, then the environment, then the command line
async fn load_config(overrides: &Overrides) -> anyhow::Result<Config> {
    let mut config = match &overrides.config {
        Some(path) => Config::from_file(path)
            .await
            .with_context(|| format!("loading {}", path.display()))?,
        None if tokio::fs::try_exists(DEFAULT_CONFIG_PATH).await.unwrap_or(false) => {
            Config::from_file(DEFAULT_CONFIG_PATH).await?
        }
        None => Config::default(),
    };
    config.apply_env();
    overrides.apply(&mut config);
    config.validate()?;
    Ok(config)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let command = cli.command.unwrap_or(Command::Run { fresh: false });
    let config = load_config(&cli.overrides).await?;

    if let Command::ShowConfig = command {
        print!("{}", config.to_yaml()?);
        return Ok(());
    }

    init_logging(&config.logging)?;
    info!(build = %build_info(), "starting");

    let input = config
        .input
        .clone()
        .context("no input dataset; pass --input or set `input` in the config file")?;
    let dataset = Dataset::load(&input)
        .await
        .with_context(|| format!("reading {}", input.display()))?;
    info!(records = dataset.len(), source = %input.display(), "dataset loaded");

    let client = ChatCompletionClient::new(config.service.clone())?;
    let classifier = RecordClassifier::new(
        Arc::new(client),
        RetryPolicy::new(config.batch.retry_config()),
        config.analysis.mislabel_analysis,
    );
    let store = PersistenceManager::new(&config.output.output_dir).await?;

    let mut orchestrator = Orchestrator::new(RunContext::from_config(&config), classifier, store);
    let report = orchestrator
        .run(dataset.records(), command.start_point())
        .await?;

    println!("{}", render_summary(&report));
    println!("Report written to {}", config.output.report_path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
