//! Configuration file support for protoavg
//!
//! Profiles are TOML files. Every field has a default, so an empty profile
//! (or no profile at all) reproduces the stock layout: batches of 20
//! readings, 11 repetitions per experiment, scenarios 1 to 5, first row of
//! each group dropped. Individual values can be overridden with
//! `--set section.key=value`.

use anyhow::{bail, Context, Result};
use protoavg_core::settings::{DEFAULT_BATCH_SIZE, DEFAULT_REPETITIONS, DEFAULT_SCENARIOS};
use protoavg_core::{AggregationSettings, FailurePolicy};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level profile configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ProfileConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub batching: BatchingConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Input/output locations
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    /// Directory containing `files/h2`, `files/h3` and `files/averages`
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self { base_dir: default_base_dir() }
    }
}

/// Batch geometry of the raw metrics files
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct BatchingConfig {
    /// Readings per batch (parallel executions per repetition)
    #[serde(default = "default_parallel_executions")]
    pub parallel_executions: usize,
    /// Batches per experiment run, and rows per summary file
    #[serde(default = "default_repetitions")]
    pub repetitions_per_experiment: usize,
}

fn default_parallel_executions() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_repetitions() -> usize {
    DEFAULT_REPETITIONS
}

impl Default for BatchingConfig {
    fn default() -> Self {
        Self {
            parallel_executions: default_parallel_executions(),
            repetitions_per_experiment: default_repetitions(),
        }
    }
}

/// Run behaviour
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Number of scenarios, processed as 1..=scenarios
    #[serde(default = "default_scenarios")]
    pub scenarios: usize,
    /// Drop the first (warm-up) row of each experiment group
    #[serde(default = "default_true")]
    pub drop_first_of_group: bool,
    /// Scale `s` / `m` suffixed durations
    #[serde(default = "default_true")]
    pub output_in_milliseconds: bool,
    /// Fail when H2 and H3 yield a different number of batch averages
    #[serde(default)]
    pub strict_alignment: bool,
    /// fail-fast or isolate
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

fn default_scenarios() -> usize {
    DEFAULT_SCENARIOS
}

fn default_true() -> bool {
    true
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            scenarios: default_scenarios(),
            drop_first_of_group: true,
            output_in_milliseconds: true,
            strict_alignment: false,
            failure_policy: FailurePolicy::FailFast,
        }
    }
}

/// Run summary output
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Optional JSON file receiving the run summary; relative paths resolve
    /// under `paths.base_dir`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_file: Option<PathBuf>,
}

impl ProfileConfig {
    /// Load profile from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: ProfileConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load profile from TOML file with --set style overrides
    pub fn from_file_with_overrides<P: AsRef<Path>>(path: P, overrides: &[String]) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let value: toml::Value = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Self::from_value_with_overrides(value, overrides)
    }

    /// Built-in defaults with --set style overrides
    pub fn default_with_overrides(overrides: &[String]) -> Result<Self> {
        let value = toml::Value::try_from(Self::default())
            .context("Failed to serialize default configuration")?;
        Self::from_value_with_overrides(value, overrides)
    }

    fn from_value_with_overrides(mut value: toml::Value, overrides: &[String]) -> Result<Self> {
        for override_str in overrides {
            let (key, val) = parse_key_value(override_str)
                .with_context(|| format!("Invalid override format: {}", override_str))?;

            set_toml_path(&mut value, &key, &val)
                .with_context(|| format!("Failed to apply override: {}", override_str))?;
        }

        let config: ProfileConfig =
            value.try_into().context("Failed to deserialize modified configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.batching.parallel_executions == 0 {
            bail!("batching.parallel_executions must be > 0");
        }
        if self.batching.repetitions_per_experiment == 0 {
            bail!("batching.repetitions_per_experiment must be > 0");
        }
        if self.run.scenarios == 0 {
            bail!("run.scenarios must be > 0");
        }
        if self.paths.base_dir.as_os_str().is_empty() {
            bail!("paths.base_dir cannot be empty");
        }
        if let Some(file) = &self.output.summary_file {
            if file.as_os_str().is_empty() {
                bail!("output.summary_file cannot be empty");
            }
        }
        Ok(())
    }

    /// Location of the JSON run summary, if one is configured
    pub fn summary_path(&self) -> Option<PathBuf> {
        self.output.summary_file.as_ref().map(|file| self.paths.base_dir.join(file))
    }

    /// Runtime settings for the aggregation pipeline
    pub fn to_settings(&self) -> AggregationSettings {
        AggregationSettings {
            base_dir: self.paths.base_dir.clone(),
            batch_size: self.batching.parallel_executions,
            repetitions: self.batching.repetitions_per_experiment,
            scenarios: self.run.scenarios,
            drop_first_of_group: self.run.drop_first_of_group,
            output_in_milliseconds: self.run.output_in_milliseconds,
            strict_alignment: self.run.strict_alignment,
            failure_policy: self.run.failure_policy,
        }
    }
}

/// Parse a "key=value" string into (key, value) tuple
fn parse_key_value(override_str: &str) -> Result<(String, String)> {
    let Some((key, value)) = override_str.split_once('=') else {
        bail!("Invalid override format '{}'. Expected 'key=value'", override_str);
    };
    Ok((key.trim().to_string(), value.to_string()))
}

/// Set a value in TOML using dot-notation path, creating intermediate tables
fn set_toml_path(root: &mut toml::Value, path: &str, value_str: &str) -> Result<()> {
    let parts: Vec<&str> = path.split('.').filter(|part| !part.is_empty()).collect();
    let Some((last, parents)) = parts.split_last() else {
        bail!("Empty path");
    };

    let mut current = root;
    for key in parents {
        let toml::Value::Table(table) = current else {
            bail!("Cannot navigate through non-table value at key '{}'", key);
        };
        current = table
            .entry(key.to_string())
            .or_insert_with(|| toml::Value::Table(Default::default()));
    }

    let toml::Value::Table(table) = current else {
        bail!("Cannot set key '{}' on non-table value", last);
    };
    table.insert(last.to_string(), parse_value(value_str));
    Ok(())
}

/// Parse a string value with type inference
fn parse_value(value_str: &str) -> toml::Value {
    let trimmed = value_str.trim();

    if trimmed == "true" {
        return toml::Value::Boolean(true);
    }
    if trimmed == "false" {
        return toml::Value::Boolean(false);
    }

    if let Ok(int_val) = trimmed.parse::<i64>() {
        return toml::Value::Integer(int_val);
    }

    if let Ok(float_val) = trimmed.parse::<f64>() {
        return toml::Value::Float(float_val);
    }

    // String (everything else, strip quotes if present)
    let string_val = if trimmed.len() >= 2
        && ((trimmed.starts_with('"') && trimmed.ends_with('"'))
            || (trimmed.starts_with('\'') && trimmed.ends_with('\'')))
    {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };

    toml::Value::String(string_val.to_string())
}
