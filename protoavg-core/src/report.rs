//! Per-experiment summary files
//!
//! H2 and H3 batch averages are paired by index and cut into experiment
//! groups of `repetitions` rows. Each completed group is written to
//! `<base>/files/averages/c<scenario>-p<group>-averages.csv` with an `H2,H3`
//! header. A trailing group shorter than `repetitions` is never written.

use crate::error::{Error, Result};
use crate::scenario::{ScenarioAverages, Variant};
use crate::settings::AggregationSettings;
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Writes experiment group files for a scenario
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
    repetitions: usize,
    strict_alignment: bool,
}

impl ReportWriter {
    pub fn new(settings: &AggregationSettings) -> Self {
        Self {
            output_dir: settings.averages_dir(),
            repetitions: settings.repetitions,
            strict_alignment: settings.strict_alignment,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Summary file path for a scenario and 1-based experiment group
    pub fn group_path(&self, scenario: usize, experiment: usize) -> PathBuf {
        self.output_dir.join(format!("c{scenario}-p{experiment}-averages.csv"))
    }

    /// Convenience wrapper over [`ReportWriter::write`]
    pub fn write_scenario(
        &self,
        averages: &ScenarioAverages,
        drop_first_of_group: bool,
    ) -> Result<Vec<PathBuf>> {
        self.write(averages.scenario, &averages.h2, &averages.h3, drop_first_of_group)
    }

    /// Write one file per completed experiment group and return their paths.
    ///
    /// Rows are paired by index over the H2 sequence. Extra H3 averages are
    /// ignored; an H2 average with no H3 partner ends the write with
    /// [`Error::LengthMismatch`], leaving groups flushed before it on disk.
    /// With strict alignment any length difference is rejected up front.
    pub fn write(
        &self,
        scenario: usize,
        h2: &[f64],
        h3: &[f64],
        drop_first_of_group: bool,
    ) -> Result<Vec<PathBuf>> {
        if self.repetitions == 0 {
            return Err(Error::Config("repetitions per experiment must be > 0".to_string()));
        }
        if self.strict_alignment && h2.len() != h3.len() {
            return Err(Error::LengthMismatch { scenario, h2: h2.len(), h3: h3.len() });
        }

        let mut written = Vec::new();
        let mut group: Vec<[String; 2]> = Vec::with_capacity(self.repetitions);

        for (index, a) in h2.iter().enumerate() {
            let Some(b) = h3.get(index) else {
                tracing::warn!(
                    "Scenario {}: H3 has no average for H2 row {} ({} files written)",
                    scenario,
                    index + 1,
                    written.len()
                );
                return Err(Error::LengthMismatch { scenario, h2: h2.len(), h3: h3.len() });
            };
            group.push([format!("{a:.6}"), format!("{b:.6}")]);

            let count = index + 1;
            if count % self.repetitions == 0 {
                let experiment = count / self.repetitions;
                tracing::info!("Scenario {}: {} averages paired", scenario, count);

                let rows = if drop_first_of_group { &group[1..] } else { &group[..] };
                let path = self.group_path(scenario, experiment);
                self.flush_group(&path, rows)?;
                tracing::info!("Wrote {} rows to {}", rows.len(), path.display());

                written.push(path);
                group.clear();
            }
        }

        if !group.is_empty() {
            tracing::debug!(
                "Scenario {}: dropping {} rows of an incomplete experiment group",
                scenario,
                group.len()
            );
        }
        if h3.len() > h2.len() {
            tracing::debug!(
                "Scenario {}: ignoring {} unpaired H3 averages",
                scenario,
                h3.len() - h2.len()
            );
        }

        Ok(written)
    }

    fn flush_group(&self, path: &Path, rows: &[[String; 2]]) -> Result<()> {
        ensure_dir(&self.output_dir)?;

        let file = File::create(path)
            .map_err(|source| Error::Create { path: path.to_path_buf(), source })?;
        let mut writer = csv::Writer::from_writer(file);

        let write_err = |source: csv::Error| Error::Write { path: path.to_path_buf(), source };
        writer.write_record([Variant::H2.label(), Variant::H3.label()]).map_err(write_err)?;
        for row in rows {
            writer.write_record(row).map_err(write_err)?;
        }
        writer.flush().map_err(|e| write_err(e.into()))?;
        Ok(())
    }
}

/// Create a single directory level, reusing it if it already exists
fn ensure_dir(dir: &Path) -> Result<()> {
    match fs::create_dir(dir) {
        Ok(()) => {
            tracing::debug!("Created output directory {}", dir.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        Err(source) => Err(Error::CreateDir { path: dir.to_path_buf(), source }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    fn writer_in(dir: &TempDir) -> ReportWriter {
        fs::create_dir_all(dir.path().join("files")).unwrap();
        ReportWriter::new(&AggregationSettings::with_base_dir(dir.path()))
    }

    fn lines(path: &Path) -> Vec<String> {
        fs::read_to_string(path).unwrap().lines().map(str::to_string).collect()
    }

    #[test]
    fn test_one_file_per_group() {
        let dir = tempdir().unwrap();
        let writer = writer_in(&dir);
        let h2: Vec<f64> = (0..33).map(|i| i as f64).collect();
        let h3: Vec<f64> = (0..33).map(|i| i as f64 * 2.0).collect();

        let paths = writer.write(2, &h2, &h3, false).unwrap();
        assert_eq!(paths.len(), 3);
        assert_eq!(paths[0], dir.path().join("files/averages/c2-p1-averages.csv"));
        assert_eq!(paths[2], dir.path().join("files/averages/c2-p3-averages.csv"));

        for path in &paths {
            let content = lines(path);
            assert_eq!(content.len(), 12);
            assert_eq!(content[0], "H2,H3");
        }
        assert_eq!(lines(&paths[1])[1], "11.000000,22.000000");
    }

    #[test]
    fn test_drop_first_of_group() {
        let dir = tempdir().unwrap();
        let writer = writer_in(&dir);
        let h2: Vec<f64> = (0..22).map(|i| i as f64).collect();

        let paths = writer.write(1, &h2, &h2, true).unwrap();
        assert_eq!(paths.len(), 2);

        let first = lines(&paths[0]);
        assert_eq!(first.len(), 11);
        assert_eq!(first[1], "1.000000,1.000000");
        assert_eq!(first[10], "10.000000,10.000000");

        let second = lines(&paths[1]);
        assert_eq!(second[1], "12.000000,12.000000");
    }

    #[test]
    fn test_trailing_partial_group_not_written() {
        let dir = tempdir().unwrap();
        let writer = writer_in(&dir);
        let values = vec![5.0; 15];

        let paths = writer.write(4, &values, &values, true).unwrap();
        assert_eq!(paths.len(), 1);
        assert!(!writer.group_path(4, 2).exists());
    }

    #[test]
    fn test_no_groups_creates_nothing() {
        let dir = tempdir().unwrap();
        let writer = writer_in(&dir);

        let paths = writer.write(1, &[1.0; 3], &[1.0; 3], true).unwrap();
        assert!(paths.is_empty());
        assert!(!writer.output_dir().exists());
    }

    #[test]
    fn test_existing_output_dir_reused() {
        let dir = tempdir().unwrap();
        let writer = writer_in(&dir);
        fs::create_dir(writer.output_dir()).unwrap();
        fs::write(writer.group_path(1, 1), "stale").unwrap();

        writer.write(1, &[2.5; 11], &[3.5; 11], false).unwrap();
        let content = lines(&writer.group_path(1, 1));
        assert_eq!(content.len(), 12);
        assert_eq!(content[1], "2.500000,3.500000");
    }

    #[test]
    fn test_missing_parent_dir_is_error() {
        let dir = tempdir().unwrap();
        // No `files` directory: only a single level is created
        let writer = ReportWriter::new(&AggregationSettings::with_base_dir(dir.path()));

        let err = writer.write(1, &[1.0; 11], &[1.0; 11], true).unwrap_err();
        assert!(matches!(err, Error::CreateDir { .. }));
    }

    #[test]
    fn test_short_h3_fails_after_flushing_paired_groups() {
        let dir = tempdir().unwrap();
        let writer = writer_in(&dir);

        let err = writer.write(1, &[1.0; 22], &[2.0; 12], false).unwrap_err();
        assert!(matches!(err, Error::LengthMismatch { scenario: 1, h2: 22, h3: 12 }));
        assert_eq!(lines(&writer.group_path(1, 1)).len(), 12);
        assert!(!writer.group_path(1, 2).exists());
    }

    #[test]
    fn test_short_h3_inside_trailing_partial_group_still_fails() {
        let dir = tempdir().unwrap();
        let writer = writer_in(&dir);

        let err = writer.write(1, &[1.0; 15], &[2.0; 12], false).unwrap_err();
        assert!(matches!(err, Error::LengthMismatch { h2: 15, h3: 12, .. }));
        assert!(writer.group_path(1, 1).exists());
    }

    #[test]
    fn test_extra_h3_averages_ignored() {
        let dir = tempdir().unwrap();
        let writer = writer_in(&dir);

        let paths = writer.write(1, &[1.0; 11], &[2.0; 20], true).unwrap();
        assert_eq!(paths, vec![writer.group_path(1, 1)]);
        assert_eq!(lines(&paths[0])[1], "1.000000,2.000000");
    }

    #[test]
    fn test_length_mismatch_strict() {
        let dir = tempdir().unwrap();
        let settings = AggregationSettings {
            strict_alignment: true,
            ..AggregationSettings::with_base_dir(dir.path())
        };
        let writer = ReportWriter::new(&settings);

        let err = writer.write(3, &[1.0; 22], &[2.0; 12], false).unwrap_err();
        assert!(matches!(err, Error::LengthMismatch { scenario: 3, h2: 22, h3: 12 }));
        assert!(!writer.output_dir().exists());

        // Longer H3 is also rejected
        let err = writer.write(3, &[1.0; 11], &[2.0; 12], false).unwrap_err();
        assert!(matches!(err, Error::LengthMismatch { h2: 11, h3: 12, .. }));
    }

    #[test]
    fn test_zero_repetitions_rejected() {
        let dir = tempdir().unwrap();
        let settings = AggregationSettings {
            repetitions: 0,
            ..AggregationSettings::with_base_dir(dir.path())
        };
        let err = ReportWriter::new(&settings).write(1, &[1.0], &[1.0], true).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_write_scenario() {
        let dir = tempdir().unwrap();
        let writer = writer_in(&dir);
        let averages = ScenarioAverages { scenario: 5, h2: vec![1.0; 11], h3: vec![2.0; 11] };

        let paths = writer.write_scenario(&averages, true).unwrap();
        assert_eq!(paths, vec![writer.group_path(5, 1)]);
        assert_eq!(lines(&paths[0]).len(), 11);
    }
}
