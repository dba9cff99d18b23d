//! Runtime settings shared by every pipeline stage

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Readings per batch (parallel executions per repetition)
pub const DEFAULT_BATCH_SIZE: usize = 20;
/// Repetitions (batches) per experiment run
pub const DEFAULT_REPETITIONS: usize = 11;
/// Number of scenarios, processed as `1..=scenarios`
pub const DEFAULT_SCENARIOS: usize = 5;

/// What the driver does when a scenario fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Abort the whole run on the first error
    #[default]
    FailFast,
    /// Log the failure and continue with the next scenario
    Isolate,
}

/// Aggregation settings
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationSettings {
    /// Directory holding `files/h2`, `files/h3` and `files/averages`
    pub base_dir: PathBuf,
    pub batch_size: usize,
    pub repetitions: usize,
    pub scenarios: usize,
    /// Discard the first row of each experiment group before writing
    pub drop_first_of_group: bool,
    /// Scale unit-suffixed durations to milliseconds
    pub output_in_milliseconds: bool,
    /// Treat differing H2/H3 sequence lengths as an error
    pub strict_alignment: bool,
    pub failure_policy: FailurePolicy,
}

impl Default for AggregationSettings {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            batch_size: DEFAULT_BATCH_SIZE,
            repetitions: DEFAULT_REPETITIONS,
            scenarios: DEFAULT_SCENARIOS,
            drop_first_of_group: true,
            output_in_milliseconds: true,
            strict_alignment: false,
            failure_policy: FailurePolicy::FailFast,
        }
    }
}

impl AggregationSettings {
    /// Default settings rooted at `base_dir`
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into(), ..Self::default() }
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::Config("batch size must be > 0".to_string()));
        }
        if self.repetitions == 0 {
            return Err(Error::Config("repetitions per experiment must be > 0".to_string()));
        }
        if self.scenarios == 0 {
            return Err(Error::Config("scenario count must be > 0".to_string()));
        }
        Ok(())
    }

    /// Directory of raw input files, `<base>/files`
    pub fn files_dir(&self) -> PathBuf {
        self.base_dir.join("files")
    }

    /// Directory of summary files, `<base>/files/averages`
    pub fn averages_dir(&self) -> PathBuf {
        self.files_dir().join("averages")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = AggregationSettings::default();
        assert_eq!(settings.batch_size, 20);
        assert_eq!(settings.repetitions, 11);
        assert_eq!(settings.scenarios, 5);
        assert!(settings.drop_first_of_group);
        assert!(settings.output_in_milliseconds);
        assert!(!settings.strict_alignment);
        assert_eq!(settings.failure_policy, FailurePolicy::FailFast);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_zero_sizes_rejected() {
        let settings = AggregationSettings { batch_size: 0, ..Default::default() };
        assert!(matches!(settings.validate(), Err(Error::Config(_))));

        let settings = AggregationSettings { repetitions: 0, ..Default::default() };
        assert!(settings.validate().is_err());

        let settings = AggregationSettings { scenarios: 0, ..Default::default() };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_directory_layout() {
        let settings = AggregationSettings::with_base_dir("/data/bench");
        assert_eq!(settings.files_dir(), PathBuf::from("/data/bench/files"));
        assert_eq!(settings.averages_dir(), PathBuf::from("/data/bench/files/averages"));
    }
}
