//! Canonical columns of the consolidated contact table
//!
//! The writer emits exactly these columns, in this order.

pub const NAME_FIRST: &str = "Name-First";
pub const NAME_LAST: &str = "Name-Last";
pub const EMAIL: &str = "Email Address";
pub const PHONE: &str = "Phone Number";
pub const MAILING_ADDRESS: &str = "Mailing Address";
pub const CITY: &str = "City";
pub const STATE: &str = "State";
pub const ZIP: &str = "Zip";
pub const ALTERNATE_NAME: &str = "Alternate name";
pub const ALT_EMAIL: &str = "Alt email";
pub const ALT_PHONE: &str = "Alt phone";

/// Output header, in order
pub const OUTPUT_COLUMNS: [&str; 11] = [
    NAME_FIRST,
    NAME_LAST,
    EMAIL,
    PHONE,
    MAILING_ADDRESS,
    CITY,
    STATE,
    ZIP,
    ALTERNATE_NAME,
    ALT_EMAIL,
    ALT_PHONE,
];

/// Fold a header cell to its canonical output column, if it names one
///
/// Older consolidated files spell the name columns `Name - First`, so
/// whitespace around the hyphen and letter case are ignored.
pub fn canonical_output_column(header: &str) -> Option<&'static str> {
    let folded: String = header
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();

    OUTPUT_COLUMNS.iter().copied().find(|column| {
        let candidate: String = column.chars().filter(|c| !c.is_whitespace()).collect();
        candidate.to_lowercase() == folded
    })
}
