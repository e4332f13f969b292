//! Header cleanup and column rewrite rules
//!
//! Each rule is a pure per-column rewrite applied to a copy of the header.
//! The order rules run in matters: synonyms must be folded before the name
//! columns are looked up, and email columns must be folded before address
//! columns are grouped ("email address" is not a postal address).

/// Canonical first-name column
pub const FIRST_NAME: &str = "first name";
/// Canonical last-name column
pub const LAST_NAME: &str = "last name";
/// Canonical email column
pub const EMAIL: &str = "email";
/// Canonical phone column
pub const PHONE: &str = "phone";
/// Canonical zip / postal code column
pub const ZIPCODE: &str = "zipcode";

/// Single-column full-name headers, in order of preference
pub const FULL_NAME_COLUMNS: [&str; 2] = ["name", "donor"];

const DONOR_PREFIX: &str = "donor ";

/// Lowercase, trim, and strip the `*` used to mark required columns
pub fn clean_header(raw: &str) -> String {
    raw.to_lowercase()
        .trim()
        .trim_matches('*')
        .trim()
        .to_string()
}

/// Column rewrite rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderRule {
    /// `given` → `first`, `family` → `last`, token-wise
    Synonyms,
    /// `donor first name` → `first name`
    StripDonorPrefix,
    /// Any column mentioning email → `email`
    Email,
    /// Any column mentioning phone → `phone`
    Phone,
    /// Zip and postal code variants → `zipcode`, `/province` dropped
    Zipcode,
}

impl HeaderRule {
    /// Rewrite a single (already cleaned) column name
    pub fn rewrite(self, column: &str) -> String {
        match self {
            HeaderRule::Synonyms => column
                .split(' ')
                .map(|token| match token {
                    "given" => "first",
                    "family" => "last",
                    other => other,
                })
                .collect::<Vec<_>>()
                .join(" "),
            HeaderRule::StripDonorPrefix => column
                .strip_prefix(DONOR_PREFIX)
                .unwrap_or(column)
                .to_string(),
            HeaderRule::Email => {
                if column.contains("email") || column.contains("e-mail") {
                    EMAIL.to_string()
                } else {
                    column.to_string()
                }
            }
            HeaderRule::Phone => {
                if column.contains("phone") {
                    PHONE.to_string()
                } else {
                    column.to_string()
                }
            }
            HeaderRule::Zipcode => rewrite_zipcode(column),
        }
    }

    /// Apply the rule to every column of a header
    pub fn apply(self, header: &[String]) -> Vec<String> {
        header.iter().map(|column| self.rewrite(column)).collect()
    }
}

fn rewrite_zipcode(column: &str) -> String {
    let folded = column
        .replace("/postal code", "")
        .replace("/province", "")
        .replace("postal code", ZIPCODE)
        .replace("zip code", ZIPCODE);

    folded
        .split(' ')
        .map(|token| if token == "zip" { ZIPCODE } else { token })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_header() {
        assert_eq!(clean_header("  *First Name "), "first name");
        assert_eq!(clean_header("* Email *"), "email");
        assert_eq!(clean_header("CITY"), "city");
    }

    #[test]
    fn test_synonyms() {
        assert_eq!(HeaderRule::Synonyms.rewrite("given name"), "first name");
        assert_eq!(HeaderRule::Synonyms.rewrite("family name"), "last name");
        assert_eq!(HeaderRule::Synonyms.rewrite("forgiven"), "forgiven");
    }

    #[test]
    fn test_strip_donor_prefix() {
        assert_eq!(HeaderRule::StripDonorPrefix.rewrite("donor first name"), "first name");
        assert_eq!(HeaderRule::StripDonorPrefix.rewrite("donor"), "donor");
        assert_eq!(HeaderRule::StripDonorPrefix.rewrite("city"), "city");
    }

    #[test]
    fn test_email_and_phone() {
        assert_eq!(HeaderRule::Email.rewrite("email address"), "email");
        assert_eq!(HeaderRule::Email.rewrite("primary e-mail"), "email");
        assert_eq!(HeaderRule::Email.rewrite("address 1"), "address 1");
        assert_eq!(HeaderRule::Phone.rewrite("home phone number"), "phone");
    }

    #[test]
    fn test_zipcode_variants() {
        assert_eq!(HeaderRule::Zipcode.rewrite("zip"), "zipcode");
        assert_eq!(HeaderRule::Zipcode.rewrite("zip code"), "zipcode");
        assert_eq!(HeaderRule::Zipcode.rewrite("zipcode"), "zipcode");
        assert_eq!(HeaderRule::Zipcode.rewrite("postal code"), "zipcode");
        assert_eq!(HeaderRule::Zipcode.rewrite("zip/postal code"), "zipcode");
        assert_eq!(HeaderRule::Zipcode.rewrite("billing zip"), "billing zipcode");
        assert_eq!(HeaderRule::Zipcode.rewrite("state/province"), "state");
    }
}
