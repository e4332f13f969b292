//! Ingestion pipeline
//!
//! Feeds source tables, oldest first, through normalization and address
//! grouping into the contact table. Each table runs to completion before
//! the next starts; a fatal error stops the whole run.

use std::path::Path;
use tracing::{debug, info};

use crate::error::MergeResult;
use crate::normalize::FieldNormalizer;
use crate::report::{MergeReport, TableSummary};
use crate::sources::{read_source_table, SourceFile, SourceTable};
use crate::table::{ContactTable, Observation};

/// Sequential merge of source tables into one contact table
pub struct IngestionPipeline {
    table: ContactTable,
    report: MergeReport,
}

impl Default for IngestionPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl IngestionPipeline {
    /// Start from an empty contact table
    pub fn new() -> Self {
        Self::with_table(ContactTable::new())
    }

    /// Start from previously consolidated records
    pub fn with_table(table: ContactTable) -> Self {
        let mut report = MergeReport::new();
        report.records_seeded = table.len();
        Self { table, report }
    }

    /// Current contact table
    pub fn table(&self) -> &ContactTable {
        &self.table
    }

    /// Read and ingest one source file
    pub fn ingest_file(&mut self, file: &SourceFile) -> MergeResult<TableSummary> {
        info!("{}", file.path.display());
        let source = read_source_table(&file.path, &file.label)?;
        self.ingest_table(&source, Some(&file.path))
    }

    /// Ingest source files in the order given
    ///
    /// The order must be chronological (see
    /// [`crate::sources::SourceScanner::scan`]).
    pub fn ingest_all(&mut self, files: &[SourceFile]) -> MergeResult<()> {
        for file in files {
            self.ingest_file(file)?;
        }
        Ok(())
    }

    /// Ingest one table
    ///
    /// **Algorithm:**
    /// 1. Normalize the header and cells (fatal if no name column)
    /// 2. Expand rows into observations
    /// 3. For each observation: one `add` with name, email, and phone, then
    ///    one `add` per address group with the name and that address only
    pub fn ingest_table(
        &mut self,
        source: &SourceTable,
        path: Option<&Path>,
    ) -> MergeResult<TableSummary> {
        let normalized = FieldNormalizer::normalize(source)?;
        let rows = normalized.normalized_rows();

        let mut summary = TableSummary {
            label: source.label.clone(),
            path: path.map(Path::to_path_buf),
            rows_read: source.rows.len(),
            observations: rows.len(),
            ..Default::default()
        };

        for row in rows {
            let contact = Observation::new(&row.first_name, &row.last_name)
                .with_email(&row.email)
                .with_phone(&row.phone);
            let outcome = self.table.add(contact)?;
            if outcome.created {
                summary.records_created += 1;
            }
            summary.conflicts += outcome.conflicts.len();
            self.report.conflicts.extend(outcome.conflicts);

            for group in &row.address_groups {
                let Some(address) = group.to_address() else {
                    continue;
                };
                let located =
                    Observation::new(&row.first_name, &row.last_name).with_address(address);
                self.table.add(located)?;
            }
        }

        debug!(
            table = %summary.label,
            rows = summary.rows_read,
            observations = summary.observations,
            created = summary.records_created,
            conflicts = summary.conflicts,
            "Table merged"
        );

        self.report.tables.push(summary.clone());
        Ok(summary)
    }

    /// Finish the run: optionally prune name-only records, fill in totals
    pub fn finish(mut self, drop_name_only: bool) -> (ContactTable, MergeReport) {
        self.report.records_before_prune = self.table.len();
        if drop_name_only {
            self.report.records_pruned = self.table.prune_name_only();
        }
        self.report.records_written = self.table.len();
        (self.table, self.report)
    }
}
