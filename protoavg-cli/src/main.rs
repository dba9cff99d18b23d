use anyhow::bail;
use clap::{Parser, Subcommand};
use protoavg_cli::config::ProfileConfig;
use protoavg_cli::output::RunReport;
use protoavg_core::Pipeline;
use schemars::schema_for;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// protoavg: per-batch averages of H2/H3 latency benchmark runs
///
/// Reads `files/h2/metrics-<n>.csv` and `files/h3/metrics-<n>.csv` for every
/// scenario and writes `files/averages/c<n>-p<k>-averages.csv`, one file per
/// experiment.
///
/// Example usage:
///   protoavg
///   protoavg run -P profiles/default.toml
///   protoavg run --set run.scenarios=3 --set paths.base_dir=/data/bench
///   protoavg schema
#[derive(Parser)]
#[command(name = "protoavg")]
#[command(version, about = "H2/H3 batch average summarizer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate all scenarios (default command)
    Run {
        /// Path to TOML profile; built-in defaults are used when omitted
        #[arg(short = 'P', long)]
        profile: Option<PathBuf>,

        /// Override any configuration value using dot notation (can be specified multiple times)
        ///
        /// Examples:
        ///   --set run.scenarios=3
        ///   --set batching.parallel_executions=10
        ///   --set run.failure_policy=isolate
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },

    /// Generate JSON Schema for profile files
    Schema,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command.unwrap_or(Commands::Run { profile: None, set: Vec::new() }) {
        Commands::Schema => {
            let schema = schema_for!(ProfileConfig);
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(())
        }
        Commands::Run { profile, set } => run(profile, set),
    }
}

fn run(profile: Option<PathBuf>, set: Vec<String>) -> anyhow::Result<()> {
    let config = match &profile {
        Some(path) => {
            tracing::info!("Loading profile: {}", path.display());
            if set.is_empty() {
                let config = ProfileConfig::from_file(path)?;
                config.validate()?;
                config
            } else {
                ProfileConfig::from_file_with_overrides(path, &set)?
            }
        }
        None => ProfileConfig::default_with_overrides(&set)?,
    };

    let settings = config.to_settings();
    tracing::info!("=== Aggregation Configuration ===");
    tracing::info!("Base directory: {}", settings.base_dir.display());
    tracing::info!(
        "Batch size: {}, repetitions per experiment: {}",
        settings.batch_size,
        settings.repetitions
    );
    tracing::info!("Scenarios: 1..={}", settings.scenarios);
    tracing::info!("Drop first row of each group: {}", settings.drop_first_of_group);
    tracing::info!("Failure policy: {:?}", settings.failure_policy);
    tracing::info!("=================================");

    let pipeline = Pipeline::new(settings)?;
    let outcome = pipeline.run()?;

    let report = RunReport::from_outcome(&pipeline.settings().base_dir, &outcome);
    report.print_human();

    if let Some(path) = config.summary_path() {
        report.write_json(&path)?;
        tracing::info!("Summary written to: {}", path.display());
    }

    if !outcome.is_success() {
        bail!("{} of {} scenarios failed", outcome.failures.len(), pipeline.settings().scenarios);
    }
    Ok(())
}
