use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the cohort report pipeline.
#[derive(Error, Debug)]
pub enum CohortError {
    /// The input file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output file could not be created, written or moved into place.
    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The delimited input is structurally malformed.
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// The header row lacks one of the required columns.
    #[error("Missing required column '{column}' in {path}")]
    MissingColumn { path: PathBuf, column: String },

    /// A timestamp cell did not match any recognised date format.
    #[error("Invalid timestamp on line {line}: {value}")]
    TimestampParse { line: u64, value: String },

    /// A value cell is not numeric.
    #[error("Invalid value on line {line}: {value}")]
    ValueParse { line: u64, value: String },

    /// The first-seen join did not produce a one-to-many relationship.
    #[error("Merge cardinality violated: {0}")]
    MergeCardinality(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the cohort crates.
pub type Result<T> = std::result::Result<T, CohortError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = CohortError::FileRead {
            path: PathBuf::from("data_for_testing/variant55.csv"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("data_for_testing/variant55.csv"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_missing_column() {
        let err = CohortError::MissingColumn {
            path: PathBuf::from("events.tsv"),
            column: "action".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Missing required column 'action' in events.tsv"
        );
    }

    #[test]
    fn test_error_display_timestamp_parse() {
        let err = CohortError::TimestampParse {
            line: 7,
            value: "yesterday".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid timestamp on line 7: yesterday");
    }

    #[test]
    fn test_error_display_value_parse() {
        let err = CohortError::ValueParse {
            line: 3,
            value: "ten".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid value on line 3: ten");
    }

    #[test]
    fn test_error_display_merge_cardinality() {
        let err = CohortError::MergeCardinality("user 42 has no rows".to_string());
        assert_eq!(
            err.to_string(),
            "Merge cardinality violated: user 42 has no rows"
        );
    }

    #[test]
    fn test_error_display_config() {
        let err = CohortError::Config("unknown label mode".to_string());
        assert_eq!(err.to_string(), "Configuration error: unknown label mode");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: CohortError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_error_file_write_keeps_source() {
        use std::error::Error as _;

        let err = CohortError::FileWrite {
            path: PathBuf::from("output.csv"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("output.csv"));
    }
}
