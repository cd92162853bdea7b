// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Fatal failures while building a dataset from its source file.
///
/// Anything else that can go wrong in the pipeline (a dirty cell, an empty
/// query) is absorbed locally and never surfaces as an error.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to read ZIP archive {path:?}: {source}")]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("no .csv entry found in {0:?}")]
    NoCsvInArchive(PathBuf),

    #[error("required column `{0}` missing from header")]
    MissingColumn(&'static str),

    #[error("no `<YYYY> Population` columns found in header")]
    NoYearColumns,
}

pub type Result<T, E = LoadError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LoadError::MissingColumn("Continent");
        assert_eq!(
            err.to_string(),
            "required column `Continent` missing from header"
        );

        let err = LoadError::NoYearColumns;
        assert_eq!(
            err.to_string(),
            "no `<YYYY> Population` columns found in header"
        );
    }

    #[test]
    fn test_io_error_keeps_source() {
        use std::error::Error as _;

        let err = LoadError::Io {
            path: PathBuf::from("missing.csv"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("missing.csv"));
    }
}
