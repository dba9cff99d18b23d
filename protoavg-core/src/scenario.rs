//! Per-scenario extraction of batch averages
//!
//! Each scenario owns one raw metrics file per protocol variant:
//! `<base>/files/h2/metrics-<n>.csv` and `<base>/files/h3/metrics-<n>.csv`.
//! One header row is skipped and only the last column of each data row, the
//! total elapsed time, is read.

use crate::batch::BatchAverager;
use crate::duration::parse_duration;
use crate::error::{Error, Result};
use crate::settings::AggregationSettings;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Protocol variant under comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    H2,
    H3,
}

impl Variant {
    /// Directory name under `files/`
    pub fn dir_name(self) -> &'static str {
        match self {
            Variant::H2 => "h2",
            Variant::H3 => "h3",
        }
    }

    /// Column label in summary files
    pub fn label(self) -> &'static str {
        match self {
            Variant::H2 => "H2",
            Variant::H3 => "H3",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Batch averages of both variants for one scenario
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioAverages {
    pub scenario: usize,
    pub h2: Vec<f64>,
    pub h3: Vec<f64>,
}

impl ScenarioAverages {
    pub fn get(&self, variant: Variant) -> &[f64] {
        match variant {
            Variant::H2 => &self.h2,
            Variant::H3 => &self.h3,
        }
    }
}

/// Reads and averages the raw metrics of a scenario
#[derive(Debug, Clone)]
pub struct ScenarioProcessor {
    files_dir: PathBuf,
    batch_size: usize,
    repetitions: usize,
    output_in_milliseconds: bool,
}

impl ScenarioProcessor {
    pub fn new(settings: &AggregationSettings) -> Self {
        Self {
            files_dir: settings.files_dir(),
            batch_size: settings.batch_size,
            repetitions: settings.repetitions,
            output_in_milliseconds: settings.output_in_milliseconds,
        }
    }

    /// Path of the raw metrics file for a variant and scenario
    pub fn metrics_path(&self, variant: Variant, scenario: usize) -> PathBuf {
        self.files_dir.join(variant.dir_name()).join(format!("metrics-{scenario}.csv"))
    }

    /// Extract both variants' batch averages.
    ///
    /// The two sequences are expected to have the same length; this is not
    /// checked here.
    pub fn process(&self, scenario: usize) -> Result<ScenarioAverages> {
        let h2 = self.extract(&self.metrics_path(Variant::H2, scenario))?;
        let h3 = self.extract(&self.metrics_path(Variant::H3, scenario))?;

        tracing::debug!(
            "Scenario {}: {} H2 and {} H3 batch averages",
            scenario,
            h2.len(),
            h3.len()
        );

        Ok(ScenarioAverages { scenario, h2, h3 })
    }

    /// Batch averages of a single raw metrics file
    pub fn extract(&self, path: &Path) -> Result<Vec<f64>> {
        let file = File::open(path)
            .map_err(|source| Error::Open { path: path.to_path_buf(), source })?;

        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(file);

        let headers = reader
            .headers()
            .map_err(|source| Error::Csv { path: path.to_path_buf(), source })?;
        if headers.is_empty() {
            return Err(Error::MissingHeader(path.to_path_buf()));
        }

        let mut averager = BatchAverager::new(self.batch_size, self.repetitions)?;
        for result in reader.records() {
            let record = result.map_err(|source| Error::Csv { path: path.to_path_buf(), source })?;
            let line = record.position().map(|pos| pos.line()).unwrap_or_default();

            let total_time = record
                .iter()
                .last()
                .ok_or_else(|| Error::EmptyRecord { path: path.to_path_buf(), line })?;

            let reading = parse_duration(total_time, self.output_in_milliseconds)
                .map_err(|e| e.at_record(path, line))?;
            averager.push(reading);
        }

        Ok(averager.finish())
    }
}
