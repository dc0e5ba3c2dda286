//! Error handling for kicad-fab
//!
//! Library operations return [`FabError`] so callers can tell a schema mismatch
//! from a broken adjustment string or an I/O failure. The orchestration layer
//! wraps them in anyhow for context-rich reporting.

use anyhow::Context;
use std::path::{Path, PathBuf};

use crate::adjust::Axis;

pub type Result<T> = anyhow::Result<T>;

/// Extension trait for Results to add context with file paths
pub trait ResultExt<T> {
    /// Add context with file path information
    fn with_path_context<P: AsRef<Path>>(self, operation: &str, path: P) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<anyhow::Error> + Send + Sync + 'static,
{
    fn with_path_context<P: AsRef<Path>>(self, operation: &str, path: P) -> Result<T> {
        self.map_err(|e| e.into())
            .with_context(|| format!("Failed to {} file: {}", operation, path.as_ref().display()))
    }
}

/// Specific error types for kicad-fab operations
#[derive(Debug, thiserror::Error)]
pub enum FabError {
    #[error("Header mismatch: expected {expected:?}, found {found:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Error parsing {axis} adjustments: {detail}. Format should be: 'C1:+1.5,R2:-2.0'")]
    AdjustmentParse { axis: Axis, detail: String },

    #[error("Invalid {field} value {value:?} for {designator}")]
    InvalidValue {
        designator: String,
        field: &'static str,
        value: String,
    },

    #[error("Row {line} has {found} fields, expected {expected}")]
    MalformedRow {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Required XSLT stylesheet not found: {}", path.display())]
    StylesheetNotFound { path: PathBuf },

    #[error("XSLT processor '{program}' could not be started: {source}")]
    ToolUnavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("XSLT processor '{program}' failed ({status}): {stderr}")]
    TransformFailed {
        program: String,
        status: String,
        stderr: String,
    },
}

impl FabError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FabError::Io {
            path: path.into(),
            source,
        }
    }

    /// Turn a csv error into the most specific variant available
    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        let path = path.into();
        match source.kind() {
            csv::ErrorKind::UnequalLengths {
                pos,
                expected_len,
                len,
            } => FabError::MalformedRow {
                line: pos.as_ref().map(|p| p.line()).unwrap_or_default(),
                expected: *expected_len as usize,
                found: *len as usize,
            },
            _ => FabError::Csv { path, source },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_mismatch_message_lists_both_headers() {
        let err = FabError::SchemaMismatch {
            expected: vec!["Ref".to_string()],
            found: vec!["Designator".to_string()],
        };

        let message = err.to_string();
        assert!(message.contains("\"Ref\""));
        assert!(message.contains("\"Designator\""));
    }

    #[test]
    fn test_adjustment_parse_message_has_format_hint() {
        let err = FabError::AdjustmentParse {
            axis: Axis::Rotation,
            detail: "missing ':'".to_string(),
        };

        let message = err.to_string();
        assert!(message.starts_with("Error parsing rotation adjustments"));
        assert!(message.contains("'C1:+1.5,R2:-2.0'"));
    }

    #[test]
    fn test_path_context() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "gone",
        ));

        let err = result
            .with_path_context("read", "input/board.csv")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to read file: input/board.csv"
        );
    }
}
