//! rolodex-merge library
//!
//! Consolidates contact records from many differently formatted source
//! tables into one deduplicated table:
//! - [`normalize`]: header rewrite rules and row expansion
//! - [`phone`]: phone canonicalization and two-number cells
//! - [`address`]: address group discovery
//! - [`table`]: identity matching and slot merge
//! - [`pipeline`]: chronological ingestion
//! - [`sources`], [`output`], [`report`]: file handling around the merge

pub mod address;
pub mod error;
pub mod normalize;
pub mod output;
pub mod phone;
pub mod pipeline;
pub mod report;
pub mod sources;
pub mod table;

pub use crate::error::{MergeError, MergeResult};
pub use crate::pipeline::IngestionPipeline;
pub use crate::report::MergeReport;
pub use crate::table::{Address, ContactRecord, ContactTable, Observation};

use std::path::PathBuf;
use tracing::info;

use crate::sources::SourceScanner;

/// Everything one merge run needs
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Directory holding the source tables
    pub input_dir: PathBuf,
    /// Consolidated CSV to write
    pub output: PathBuf,
    /// Extension of source tables, without the dot
    pub extension: String,
    /// Earlier consolidated table to continue from
    pub seed: Option<PathBuf>,
    /// JSON report destination
    pub report: Option<PathBuf>,
    /// Drop records that hold nothing but a name
    pub drop_name_only: bool,
}

/// Run a complete merge: list, ingest, prune, write
///
/// Nothing is written when a fatal error occurs.
pub fn run_merge(options: &MergeOptions) -> MergeResult<MergeReport> {
    let files = SourceScanner::new(&options.extension).scan(&options.input_dir)?;
    info!(
        "Found {} source tables in {}",
        files.len(),
        options.input_dir.display()
    );

    let table = match &options.seed {
        Some(seed) => {
            let records = output::read_contacts(seed)?;
            info!("Seeded {} records from {}", records.len(), seed.display());
            ContactTable::from_records(records)
        }
        None => ContactTable::new(),
    };

    let mut pipeline = IngestionPipeline::with_table(table);
    pipeline.ingest_all(&files)?;
    let (table, report) = pipeline.finish(options.drop_name_only);

    output::write_contacts(&options.output, &table)?;
    info!(
        "Wrote {} records to {}",
        table.len(),
        options.output.display()
    );

    if let Some(path) = &options.report {
        report.write_json(path)?;
    }
    report.log_summary();

    Ok(report)
}
