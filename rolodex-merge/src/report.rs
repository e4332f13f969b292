//! Merge run report
//!
//! Collects per-table statistics and every dropped conflicting value.
//! Written as JSON on request and summarized in the log.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::MergeResult;
use crate::table::Conflict;

/// Statistics for one ingested source table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableSummary {
    /// Chronological label of the table
    pub label: String,
    /// Source file, when the table came from disk
    pub path: Option<PathBuf>,
    /// Data rows in the source
    pub rows_read: usize,
    /// Person observations after row expansion
    pub observations: usize,
    /// New records this table introduced
    pub records_created: usize,
    /// Values dropped because both slots were taken
    pub conflicts: usize,
}

/// Report of a complete merge run
#[derive(Debug, Clone, Serialize)]
pub struct MergeReport {
    pub generated_at: DateTime<Utc>,
    /// Records loaded from a seed file before ingestion
    pub records_seeded: usize,
    /// Tables in ingestion order
    pub tables: Vec<TableSummary>,
    /// Every dropped value, in the order it was seen
    pub conflicts: Vec<Conflict>,
    pub records_before_prune: usize,
    pub records_pruned: usize,
    pub records_written: usize,
}

impl Default for MergeReport {
    fn default() -> Self {
        Self::new()
    }
}

impl MergeReport {
    pub fn new() -> Self {
        Self {
            generated_at: Utc::now(),
            records_seeded: 0,
            tables: Vec::new(),
            conflicts: Vec::new(),
            records_before_prune: 0,
            records_pruned: 0,
            records_written: 0,
        }
    }

    /// Write the report as pretty-printed JSON
    pub fn write_json(&self, path: &Path) -> MergeResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        info!("Merge report written to {}", path.display());
        Ok(())
    }

    /// Log a one-screen summary of the run
    pub fn log_summary(&self) {
        let observations: usize = self.tables.iter().map(|t| t.observations).sum();
        info!(
            "Merged {} tables ({} observations) into {} records",
            self.tables.len(),
            observations,
            self.records_written
        );
        if self.records_pruned > 0 {
            info!("Dropped {} records holding only a name", self.records_pruned);
        }
        if !self.conflicts.is_empty() {
            warn!(
                "{} values were dropped because both slots were already taken",
                self.conflicts.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Channel;
    use tempfile::TempDir;

    #[test]
    fn test_report_json_shape() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("report.json");

        let mut report = MergeReport::new();
        report.tables.push(TableSummary {
            label: "2019".to_string(),
            rows_read: 3,
            observations: 4,
            records_created: 2,
            ..Default::default()
        });
        report.conflicts.push(Conflict {
            first: "Ann".to_string(),
            last: "Lee".to_string(),
            channel: Channel::Email,
            value: "c@x.com".to_string(),
        });
        report.write_json(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["tables"][0]["label"], "2019");
        assert_eq!(value["tables"][0]["observations"], 4);
        assert_eq!(value["conflicts"][0]["channel"], "email");
        assert_eq!(value["conflicts"][0]["value"], "c@x.com");
        assert!(value["generated_at"].is_string());
    }
}
