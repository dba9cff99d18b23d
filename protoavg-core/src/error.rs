//! Error types for reading metrics files and writing summary files

use std::fmt;
use std::num::ParseFloatError;
use std::path::PathBuf;

/// Result type alias for protoavg core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for protoavg core operations
#[derive(Debug)]
pub enum Error {
    /// A raw metrics file could not be opened
    Open { path: PathBuf, source: std::io::Error },

    /// The CSV reader rejected a row
    Csv { path: PathBuf, source: csv::Error },

    /// The input file has no header row
    MissingHeader(PathBuf),

    /// A data row carried no fields at all
    EmptyRecord { path: PathBuf, line: u64 },

    /// Duration text whose numeric part is not a float literal
    InvalidDuration { value: String, source: ParseFloatError },

    /// A field error located inside an input file
    Record { path: PathBuf, line: u64, source: Box<Error> },

    /// Output directory creation failed
    CreateDir { path: PathBuf, source: std::io::Error },

    /// Output file creation failed
    Create { path: PathBuf, source: std::io::Error },

    /// Writing rows to an output file failed
    Write { path: PathBuf, source: csv::Error },

    /// H2 has an average without an H3 partner, or any length difference under strict alignment
    LengthMismatch { scenario: usize, h2: usize, h3: usize },

    /// Settings rejected by validation
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Open { path, source } => {
                write!(f, "Error while opening file {}: {source}", path.display())
            }
            Error::Csv { path, source } => {
                write!(f, "Error while reading file {}: {source}", path.display())
            }
            Error::MissingHeader(path) => {
                write!(f, "Error while reading file {}: missing header row", path.display())
            }
            Error::EmptyRecord { path, line } => {
                write!(f, "Empty record at line {line} in file {}", path.display())
            }
            Error::InvalidDuration { value, source } => {
                write!(f, "Error while converting '{value}' to float: {source}")
            }
            Error::Record { path, line, source } => {
                write!(f, "{source} (line {line} in file {})", path.display())
            }
            Error::CreateDir { path, source } => {
                write!(f, "Failed to create directory {}: {source}", path.display())
            }
            Error::Create { path, source } => {
                write!(f, "Failed to create file {}: {source}", path.display())
            }
            Error::Write { path, source } => {
                write!(f, "Failed to write file {}: {source}", path.display())
            }
            Error::LengthMismatch { scenario, h2, h3 } => write!(
                f,
                "Scenario {scenario}: H2 produced {h2} batch averages but H3 produced {h3}"
            ),
            Error::Config(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Open { source, .. }
            | Error::CreateDir { source, .. }
            | Error::Create { source, .. } => Some(source),
            Error::Csv { source, .. } | Error::Write { source, .. } => Some(source),
            Error::InvalidDuration { source, .. } => Some(source),
            Error::Record { source, .. } => Some(source.as_ref()),
            Error::MissingHeader(_)
            | Error::EmptyRecord { .. }
            | Error::LengthMismatch { .. }
            | Error::Config(_) => None,
        }
    }
}

impl Error {
    /// Attach the file position a field error came from
    pub fn at_record(self, path: impl Into<PathBuf>, line: u64) -> Self {
        Error::Record { path: path.into(), line, source: Box::new(self) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_record_context_in_message() {
        let inner = Error::InvalidDuration {
            value: "abc".to_string(),
            source: "abc".parse::<f64>().unwrap_err(),
        };
        let err = inner.at_record("files/h2/metrics-1.csv", 7);

        let msg = err.to_string();
        assert!(msg.contains("'abc'"));
        assert!(msg.contains("line 7"));
        assert!(msg.contains("metrics-1.csv"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_length_mismatch_message() {
        let err = Error::LengthMismatch { scenario: 3, h2: 11, h3: 10 };
        assert_eq!(
            err.to_string(),
            "Scenario 3: H2 produced 11 batch averages but H3 produced 10"
        );
    }
}
