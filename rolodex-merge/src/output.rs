//! Consolidated table output
//!
//! Writes the canonical column set in fixed order, with empty strings for
//! missing values. The same format is read back to seed a later run.

use rolodex_common::columns::{self, canonical_output_column, OUTPUT_COLUMNS};
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use crate::error::{MergeError, MergeResult};
use crate::table::{Address, ContactRecord, ContactTable};

/// Write the table to a CSV file
pub fn write_contacts(path: &Path, table: &ContactTable) -> MergeResult<()> {
    let file = std::fs::File::create(path)?;
    write_contacts_to(file, table).map_err(|e| match e {
        MergeError::Csv { source, .. } => MergeError::csv(path, source),
        other => other,
    })
}

/// Write the table as CSV to any writer
pub fn write_contacts_to<W: Write>(writer: W, table: &ContactTable) -> MergeResult<()> {
    let mut out = csv::Writer::from_writer(writer);
    let to_err = |e: csv::Error| MergeError::csv("<output>", e);

    out.write_record(OUTPUT_COLUMNS).map_err(to_err)?;
    for record in table.records() {
        out.write_record(output_row(record)).map_err(to_err)?;
    }
    out.flush()?;

    Ok(())
}

fn output_row(record: &ContactRecord) -> [String; 11] {
    let opt = |v: &Option<String>| v.clone().unwrap_or_default();
    let address = record.address.clone().unwrap_or_default();

    [
        record.first_name.clone(),
        record.last_name.clone(),
        opt(&record.email_primary),
        opt(&record.phone_primary),
        address.street,
        address.city,
        address.state,
        address.zip,
        opt(&record.alternate_name),
        opt(&record.email_alternate),
        opt(&record.phone_alternate),
    ]
}

/// Read a previously written consolidated table
///
/// Columns are matched by name, so reordered files and the older
/// `Name - First` spelling are accepted. Unknown columns are ignored.
pub fn read_contacts(path: &Path) -> MergeResult<Vec<ContactRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| MergeError::csv(path, e))?;

    let positions: HashMap<&'static str, usize> = reader
        .headers()
        .map_err(|e| MergeError::csv(path, e))?
        .iter()
        .enumerate()
        .filter_map(|(i, h)| canonical_output_column(h.trim_start_matches('\u{feff}')).map(|c| (c, i)))
        .collect();

    if !positions.contains_key(columns::NAME_FIRST) {
        return Err(MergeError::MissingName {
            table: path.display().to_string(),
        });
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| MergeError::csv(path, e))?;
        let get = |column: &str| -> String {
            positions
                .get(column)
                .and_then(|&i| row.get(i))
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        };
        let opt = |column: &str| -> Option<String> { Some(get(column)).filter(|s| !s.is_empty()) };

        let street = get(columns::MAILING_ADDRESS);
        records.push(ContactRecord {
            first_name: get(columns::NAME_FIRST),
            last_name: get(columns::NAME_LAST),
            email_primary: opt(columns::EMAIL),
            email_alternate: opt(columns::ALT_EMAIL),
            phone_primary: opt(columns::PHONE),
            phone_alternate: opt(columns::ALT_PHONE),
            address: (!street.is_empty()).then(|| Address {
                street,
                city: get(columns::CITY),
                state: get(columns::STATE),
                zip: get(columns::ZIP),
            }),
            alternate_name: opt(columns::ALTERNATE_NAME),
        });
    }

    Ok(records)
}
