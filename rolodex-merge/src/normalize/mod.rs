//! Field normalization
//!
//! Maps a source table's free-form header onto the canonical columns
//! (`first name`, `last name`, `email`, `phone`, `zipcode`, address groups),
//! cleans email cells, and expands every source row into one or more
//! [`NormalizedRow`]s.
//!
//! Columns the rules do not touch keep their (cleaned) name and position.

pub mod header;

use tracing::debug;

use crate::address::{AddressGroup, AddressGrouper};
use crate::error::{MergeError, MergeResult};
use crate::phone::split_phone_cell;
use crate::sources::SourceTable;

pub use header::{clean_header, HeaderRule, EMAIL, FIRST_NAME, LAST_NAME, PHONE, ZIPCODE};

/// Known mis-encoding of `@` produced by some spreadsheet exports (UTF-7)
const MANGLED_AT: &str = "+AEA-";

/// A source table rewritten onto canonical column names
#[derive(Debug, Clone)]
pub struct NormalizedTable {
    /// Label of the source table (its chronological key)
    pub label: String,
    /// Canonical header
    pub header: Vec<String>,
    /// Cells, one `Vec` per row, same width as `header`
    pub rows: Vec<Vec<String>>,
}

/// One person observation produced from a source row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedRow {
    pub first_name: String,
    pub last_name: String,
    /// Cleaned email, empty if none
    pub email: String,
    /// Formatted phone, empty if none
    pub phone: String,
    /// Address groups found in the row, in header order
    pub address_groups: Vec<AddressGroup>,
}

/// Where first and last names come from
enum NameSource {
    /// Separate `first name` / `last name` columns
    Columns,
    /// One full-name column, split on the first space
    Split(usize),
}

/// Header rewrite and cell cleanup for source tables
pub struct FieldNormalizer;

impl FieldNormalizer {
    /// Normalize a source table
    ///
    /// **Algorithm:**
    /// 1. Clean every header cell (lowercase, trim, strip `*`)
    /// 2. Fold `given`/`family` synonyms
    /// 3. Resolve name columns: keep `first name`, strip a `donor ` prefix,
    ///    or split a single `name`/`donor` column
    /// 4. Fold email, phone, and zip/postal columns
    /// 5. Clean email cells
    ///
    /// # Errors
    /// `MissingName` when no first-name column can be found.
    pub fn normalize(table: &SourceTable) -> MergeResult<NormalizedTable> {
        let cleaned: Vec<String> = table.header.iter().map(|h| clean_header(h)).collect();
        let mut header = HeaderRule::Synonyms.apply(&cleaned);

        let name_source = if contains(&header, FIRST_NAME) {
            NameSource::Columns
        } else if header.iter().any(|c| c == "donor first name") {
            header = HeaderRule::StripDonorPrefix.apply(&header);
            NameSource::Columns
        } else if let Some(idx) = full_name_column(&header) {
            NameSource::Split(idx)
        } else {
            return Err(MergeError::MissingName {
                table: table.label.clone(),
            });
        };

        for rule in [HeaderRule::Email, HeaderRule::Phone, HeaderRule::Zipcode] {
            header = rule.apply(&header);
        }

        let width = header.len();
        let mut rows: Vec<Vec<String>> = table
            .rows
            .iter()
            .map(|row| {
                let mut cells = row.clone();
                cells.resize(width, String::new());
                cells
            })
            .collect();

        if let NameSource::Split(idx) = name_source {
            debug!(
                table = %table.label,
                column = %header[idx],
                "Splitting full-name column into first and last name"
            );
            header.push(FIRST_NAME.to_string());
            header.push(LAST_NAME.to_string());
            for cells in &mut rows {
                let (first, last) = split_full_name(&cells[idx]);
                cells.push(first);
                cells.push(last);
            }
        }

        let email_columns = indices_of(&header, EMAIL);
        for cells in &mut rows {
            for &idx in &email_columns {
                cells[idx] = clean_email(&cells[idx]);
            }
        }

        Ok(NormalizedTable {
            label: table.label.clone(),
            header,
            rows,
        })
    }
}

fn full_name_column(header: &[String]) -> Option<usize> {
    header::FULL_NAME_COLUMNS
        .iter()
        .find_map(|name| header.iter().position(|c| c == name))
}

fn contains(header: &[String], name: &str) -> bool {
    header.iter().any(|c| c == name)
}

fn indices_of(header: &[String], name: &str) -> Vec<usize> {
    header
        .iter()
        .enumerate()
        .filter(|(_, c)| c.as_str() == name)
        .map(|(i, _)| i)
        .collect()
}

/// Split a full name on the first space: `"Mary Ann Smith"` → (`Mary`, `Ann Smith`)
pub fn split_full_name(full: &str) -> (String, String) {
    let full = full.trim();
    match full.split_once(' ') {
        Some((first, rest)) => (first.to_string(), rest.trim().to_string()),
        None => (full.to_string(), String::new()),
    }
}

/// Trim, repair a mangled `@`, and blank anything that is not an address
pub fn clean_email(raw: &str) -> String {
    let email = raw.trim().replace(MANGLED_AT, "@");
    if email.contains('@') {
        email
    } else {
        String::new()
    }
}

impl NormalizedTable {
    /// Index of the first column with this canonical name
    pub fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|c| c == name)
    }

    /// Expand every row into person observations, in row order
    ///
    /// A row yields one observation carrying its first email and first phone.
    /// Extra distinct emails or phones (a second email column, or a phone cell
    /// holding two numbers) yield additional observations right after it,
    /// paired by position. An extra observation carries only the remaining
    /// values, never the first ones again, so each value is offered to the
    /// table once. Name and address groups are unchanged. Rows without any
    /// name are skipped.
    pub fn normalized_rows(&self) -> Vec<NormalizedRow> {
        let grouper = AddressGrouper::from_header(&self.header);
        if !grouper.is_empty() {
            debug!(table = %self.label, groups = ?grouper.prefixes(), "Address groups");
        }
        let first_idx = self.column(FIRST_NAME);
        let last_idx = self.column(LAST_NAME);
        let email_columns = indices_of(&self.header, EMAIL);
        let phone_columns = indices_of(&self.header, PHONE);

        let cell = |row: &[String], idx: Option<usize>| -> String {
            idx.and_then(|i| row.get(i))
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        };

        let mut out = Vec::new();
        for (row_number, row) in self.rows.iter().enumerate() {
            let row = row.as_slice();
            let first_name = cell(row, first_idx);
            let last_name = cell(row, last_idx);
            if first_name.is_empty() && last_name.is_empty() {
                debug!(table = %self.label, row = row_number, "Skipping row without a name");
                continue;
            }

            let emails = distinct(
                email_columns
                    .iter()
                    .filter_map(|&i| row.get(i))
                    .map(|e| e.trim().to_string()),
            );
            let phones = distinct(
                phone_columns
                    .iter()
                    .filter_map(|&i| row.get(i))
                    .flat_map(|p| split_phone_cell(p)),
            );
            let address_groups = grouper.extract(row);

            let fan_out = emails.len().max(phones.len()).max(1);
            for i in 0..fan_out {
                out.push(NormalizedRow {
                    first_name: first_name.clone(),
                    last_name: last_name.clone(),
                    email: emails.get(i).cloned().unwrap_or_default(),
                    phone: phones.get(i).cloned().unwrap_or_default(),
                    address_groups: address_groups.clone(),
                });
            }
        }

        out
    }
}

/// Non-empty values, first occurrence wins
fn distinct(values: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for value in values {
        if !value.is_empty() && !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}
