//! Source table discovery and reading
//!
//! Source tables are CSV files in one directory. File names carry a year
//! label after the first underscore (`1_Donors2018-19.csv`), and tables must
//! be merged oldest first so that later addresses win.

use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

use crate::error::{MergeError, MergeResult};

/// Source directory scanning errors
#[derive(Debug, Error)]
pub enum ScanError {
    /// Specified path does not exist
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Directory entry could not be read
    #[error("Directory access error {0}: {1}")]
    AccessError(PathBuf, String),
}

/// A source file with its chronological key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Year label used for ordering, e.g. `2018-19`
    pub label: String,
}

/// Raw tabular data of one source: a header plus rows of cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTable {
    /// Label of the table (its chronological key, or file name)
    pub label: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SourceTable {
    pub fn new(label: &str, header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            label: label.to_string(),
            header,
            rows,
        }
    }
}

/// Chronological key of a source file name
///
/// Takes the stem's token after the first `_` (the whole stem when there is
/// none), deletes ASCII letters, and trims `-` and whitespace from the ends.
/// Plain string ordering of these keys puts `2019` before `2019-20`.
///
/// ```
/// use rolodex_merge::sources::chronological_key;
///
/// assert_eq!(chronological_key("1_Donors2018-19.csv"), "2018-19");
/// assert_eq!(chronological_key("2_2019members.csv"), "2019");
/// ```
pub fn chronological_key(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let token = match stem.split_once('_') {
        Some((_, rest)) => rest.split('_').next().unwrap_or(rest).to_string(),
        None => stem,
    };

    token
        .chars()
        .filter(|c| !c.is_ascii_alphabetic())
        .collect::<String>()
        .trim_matches(|c: char| c == '-' || c.is_whitespace())
        .to_string()
}

/// Source directory scanner
pub struct SourceScanner {
    extension: String,
    ignore_prefixes: Vec<String>,
}

impl SourceScanner {
    /// Create scanner for files with the given extension (no dot)
    ///
    /// Ignores hidden files and office lock files (`~$…`).
    pub fn new(extension: &str) -> Self {
        Self {
            extension: extension.trim_start_matches('.').to_lowercase(),
            ignore_prefixes: vec![".".to_string(), "~$".to_string()],
        }
    }

    /// List source files oldest first
    ///
    /// Only the top level of `dir` is scanned. Files are ordered by
    /// chronological key, then by file name.
    pub fn scan(&self, dir: &Path) -> Result<Vec<SourceFile>, ScanError> {
        if !dir.exists() {
            return Err(ScanError::PathNotFound(dir.to_path_buf()));
        }

        if !dir.is_dir() {
            return Err(ScanError::NotADirectory(dir.to_path_buf()));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| ScanError::AccessError(dir.to_path_buf(), e.to_string()))?;
            if !self.is_source(&entry) {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            files.push(SourceFile {
                label: chronological_key(&name),
                path: entry.into_path(),
            });
        }

        files.sort_by(|a, b| {
            a.label
                .cmp(&b.label)
                .then_with(|| a.path.file_name().cmp(&b.path.file_name()))
        });

        tracing::debug!("Found {} source tables in {}", files.len(), dir.display());

        Ok(files)
    }

    fn is_source(&self, entry: &DirEntry) -> bool {
        if !entry.file_type().is_file() {
            return false;
        }

        let name = entry.file_name().to_string_lossy();
        if self.ignore_prefixes.iter().any(|p| name.starts_with(p.as_str())) {
            return false;
        }

        entry
            .path()
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase() == self.extension)
            .unwrap_or(false)
    }
}

/// Read a CSV source table
///
/// The first record is the header. Rows shorter than the header are padded
/// with empty cells, longer rows are cut to the header width, and invalid
/// UTF-8 is decoded lossily.
pub fn read_source_table(path: &Path, label: &str) -> MergeResult<SourceTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| MergeError::csv(path, e))?;

    let mut records = reader.byte_records();

    let header: Vec<String> = match records.next() {
        Some(record) => decode(&record.map_err(|e| MergeError::csv(path, e))?),
        None => Vec::new(),
    };

    let mut rows = Vec::new();
    for record in records {
        let mut cells = decode(&record.map_err(|e| MergeError::csv(path, e))?);
        cells.resize(header.len(), String::new());
        rows.push(cells);
    }

    Ok(SourceTable::new(label, header, rows))
}

fn decode(record: &csv::ByteRecord) -> Vec<String> {
    let mut cells: Vec<String> = record
        .iter()
        .map(|field| String::from_utf8_lossy(field).into_owned())
        .collect();

    // Excel writes a byte-order mark in front of the first header cell
    if let Some(first) = cells.first_mut() {
        if let Some(stripped) = first.strip_prefix('\u{feff}') {
            *first = stripped.to_string();
        }
    }

    cells
}
