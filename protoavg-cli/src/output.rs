//! Run summary formatting

use anyhow::{Context, Result};
use protoavg_core::{RunOutcome, Summary};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Summary of a full aggregation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub base_dir: PathBuf,
    pub scenarios: Vec<ScenarioReport>,
    pub failures: Vec<FailureReport>,
    pub files_written: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub scenario: usize,
    pub h2: Summary,
    pub h3: Summary,
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureReport {
    pub scenario: usize,
    pub error: String,
}

impl RunReport {
    /// Create a report from a pipeline outcome
    pub fn from_outcome(base_dir: &Path, outcome: &RunOutcome) -> Self {
        Self {
            base_dir: base_dir.to_path_buf(),
            scenarios: outcome
                .completed
                .iter()
                .map(|s| ScenarioReport {
                    scenario: s.scenario,
                    h2: s.h2,
                    h3: s.h3,
                    files: s.files.clone(),
                })
                .collect(),
            failures: outcome
                .failures
                .iter()
                .map(|f| FailureReport { scenario: f.scenario, error: f.message.clone() })
                .collect(),
            files_written: outcome.files_written(),
        }
    }

    /// Print results to stdout in human-readable format
    pub fn print_human(&self) {
        println!("\n{}", "=".repeat(60));
        println!("H2/H3 Batch Average Summary");
        println!("{}", "=".repeat(60));
        println!();
        println!("Base directory:    {}", self.base_dir.display());
        println!("Files written:     {}", self.files_written);
        println!();
        println!(
            "{:<10} {:>8} {:>12} {:>12} {:>8}",
            "Scenario", "Batches", "H2 mean", "H3 mean", "Files"
        );
        for s in &self.scenarios {
            println!(
                "{:<10} {:>8} {:>12.3} {:>12.3} {:>8}",
                s.scenario,
                s.h2.count,
                s.h2.mean,
                s.h3.mean,
                s.files.len()
            );
        }
        if !self.failures.is_empty() {
            println!();
            println!("Failed scenarios:");
            for f in &self.failures {
                println!("  {}: {}", f.scenario, f.error);
            }
        }
        println!();
        println!("{}", "=".repeat(60));
    }

    /// Write the report as pretty JSON
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)
            .with_context(|| format!("Failed to create summary file: {}", path.display()))?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protoavg_core::{ScenarioFailure, ScenarioOutcome};

    fn outcome() -> RunOutcome {
        RunOutcome {
            completed: vec![ScenarioOutcome {
                scenario: 1,
                h2: Summary::from_values(&[10.0; 11]),
                h3: Summary::from_values(&[12.0; 11]),
                files: vec![PathBuf::from("files/averages/c1-p1-averages.csv")],
            }],
            failures: vec![ScenarioFailure {
                scenario: 2,
                message: "Error while opening file".to_string(),
            }],
        }
    }

    #[test]
    fn test_report_from_outcome() {
        let report = RunReport::from_outcome(Path::new("."), &outcome());
        assert_eq!(report.files_written, 1);
        assert_eq!(report.scenarios.len(), 1);
        assert_eq!(report.scenarios[0].h3.mean, 12.0);
        assert_eq!(report.failures[0].scenario, 2);
    }

    #[test]
    fn test_json_serialization() {
        let report = RunReport::from_outcome(Path::new("."), &outcome());
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"files_written\":1"));
        assert!(json.contains("c1-p1-averages.csv"));
    }

    #[test]
    fn test_write_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        RunReport::from_outcome(dir.path(), &outcome()).write_json(&path).unwrap();

        let parsed: RunReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.scenarios[0].scenario, 1);
    }
}
