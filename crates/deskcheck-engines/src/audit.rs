//! Optional append-only audit trail for mark classification runs.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use deskcheck_core::EnrichedMark;

/// Failure while appending to the audit trail.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit write failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("audit record could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Append-only JSONL audit log. One line per enriched mark; the file is
/// never rewritten or truncated.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_owned(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one line per mark. Callers treat failures as log-and-continue;
    /// auditing never fails a classification run.
    pub fn append(&self, marks: &[EnrichedMark]) -> Result<(), AuditError> {
        let io_err = |source| AuditError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(&io_err)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(&io_err)?;
        for mark in marks {
            let line = serde_json::to_string(mark)?;
            writeln!(file, "{line}").map_err(&io_err)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use deskcheck_core::{Classification, Mark};

    use super::*;

    fn enriched(ticker: &str) -> EnrichedMark {
        EnrichedMark {
            mark: Mark {
                ticker: ticker.into(),
                internal_mark: 100.0,
                as_of_date: "2024-06-05".into(),
                notes: None,
                source: None,
                position_id: None,
                portfolio_id: None,
                instrument_type: None,
                currency: None,
            },
            market_price: Some(100.0),
            deviation_absolute: Some(0.0),
            deviation_percentage: Some(0.0),
            classification: Classification::Ok,
            market_data_date: Some("2024-06-05".into()),
            tolerance_override_applied: None,
            error: None,
            explanation: "AAPL within tolerance.".into(),
        }
    }

    #[test]
    fn appends_one_line_per_mark() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("audit.jsonl"));

        log.append(&[enriched("AAPL"), enriched("MSFT")]).unwrap();
        log.append(&[enriched("GOOG")]).unwrap();

        let contents = fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["ticker"], "AAPL");
        assert_eq!(first["classification"], "OK");
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("nested/deep/audit.jsonl"));
        log.append(&[enriched("AAPL")]).unwrap();
        assert!(log.path().exists());
    }
}
