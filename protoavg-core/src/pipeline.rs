//! Scenario driver
//!
//! Runs scenarios `1..=N` in order, extracting batch averages and writing
//! the experiment group files for each. Under [`FailurePolicy::FailFast`] the
//! first error ends the run; files already written for earlier scenarios are
//! left in place.

use crate::error::Result;
use crate::report::ReportWriter;
use crate::scenario::ScenarioProcessor;
use crate::settings::{AggregationSettings, FailurePolicy};
use crate::stats::Summary;
use std::path::PathBuf;

/// Result of one processed scenario
#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    pub scenario: usize,
    pub h2: Summary,
    pub h3: Summary,
    pub files: Vec<PathBuf>,
}

/// Scenario that failed under [`FailurePolicy::Isolate`]
#[derive(Debug, Clone)]
pub struct ScenarioFailure {
    pub scenario: usize,
    pub message: String,
}

/// Outcome of a full run
#[derive(Debug, Clone, Default)]
pub struct RunOutcome {
    pub completed: Vec<ScenarioOutcome>,
    pub failures: Vec<ScenarioFailure>,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn files_written(&self) -> usize {
        self.completed.iter().map(|s| s.files.len()).sum()
    }
}

/// The aggregation pipeline
pub struct Pipeline {
    settings: AggregationSettings,
    processor: ScenarioProcessor,
    writer: ReportWriter,
}

impl Pipeline {
    /// Build a pipeline, validating the settings first
    pub fn new(settings: AggregationSettings) -> Result<Self> {
        settings.validate()?;
        let processor = ScenarioProcessor::new(&settings);
        let writer = ReportWriter::new(&settings);
        Ok(Self { settings, processor, writer })
    }

    pub fn settings(&self) -> &AggregationSettings {
        &self.settings
    }

    /// Process and write a single scenario
    pub fn run_scenario(&self, scenario: usize) -> Result<ScenarioOutcome> {
        tracing::info!("Processing scenario {}", scenario);

        let averages = self.processor.process(scenario)?;
        let h2 = Summary::from_values(&averages.h2);
        let h3 = Summary::from_values(&averages.h3);
        tracing::debug!(
            "Scenario {}: H2 mean {:.3} (sd {:.3}), H3 mean {:.3} (sd {:.3})",
            scenario,
            h2.mean,
            h2.std_dev,
            h3.mean,
            h3.std_dev
        );

        let files = self.writer.write_scenario(&averages, self.settings.drop_first_of_group)?;
        Ok(ScenarioOutcome { scenario, h2, h3, files })
    }

    /// Run every scenario in ascending order
    pub fn run(&self) -> Result<RunOutcome> {
        let mut outcome = RunOutcome::default();

        for scenario in 1..=self.settings.scenarios {
            match self.run_scenario(scenario) {
                Ok(done) => outcome.completed.push(done),
                Err(e) => match self.settings.failure_policy {
                    FailurePolicy::FailFast => return Err(e),
                    FailurePolicy::Isolate => {
                        tracing::error!("Scenario {} failed: {}", scenario, e);
                        outcome
                            .failures
                            .push(ScenarioFailure { scenario, message: e.to_string() });
                    }
                },
            }
        }

        tracing::info!(
            "Processed {} scenarios, wrote {} files",
            outcome.completed.len(),
            outcome.files_written()
        );
        Ok(outcome)
    }
}
