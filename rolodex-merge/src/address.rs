//! Address group discovery
//!
//! A table may carry several addresses per row ("Billing Address 1",
//! "Home Address", plain "Address"). Columns are grouped by the prefix left
//! once the `address` / `line` tokens and the trailing line number are
//! removed. Each group reads its city, state, and zip from the columns
//! qualified by the same prefix.

use crate::normalize::ZIPCODE;
use crate::table::Address;

/// One address found in a row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressGroup {
    /// Column prefix (`billing`, `home`, or empty for unqualified)
    pub prefix: String,
    /// Address lines joined with a space
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl AddressGroup {
    /// Convert to a mergeable address; `None` when there is no street
    pub fn to_address(&self) -> Option<Address> {
        if self.street.is_empty() {
            return None;
        }
        Some(Address {
            street: self.street.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            zip: self.zip.clone(),
        })
    }
}

/// Column positions making up one address group
#[derive(Debug, Clone)]
struct GroupColumns {
    prefix: String,
    /// (line number, column index), sorted by line number
    lines: Vec<(u32, usize)>,
    city: Option<usize>,
    state: Option<usize>,
    zip: Option<usize>,
}

/// Address group layout of one normalized header
#[derive(Debug, Clone)]
pub struct AddressGrouper {
    groups: Vec<GroupColumns>,
}

impl AddressGrouper {
    /// Discover address groups from a normalized header
    ///
    /// Groups are ordered by the first appearance of their address columns.
    /// When a table has a single address group and the prefixed city/state/zip
    /// column does not exist, the unqualified one is used instead (tables
    /// with "Mailing Address" next to a plain "City").
    pub fn from_header(header: &[String]) -> Self {
        let mut groups: Vec<GroupColumns> = Vec::new();

        for (idx, column) in header.iter().enumerate() {
            let Some((prefix, line)) = parse_address_column(column) else {
                continue;
            };
            match groups.iter_mut().find(|g| g.prefix == prefix) {
                Some(group) => group.lines.push((line, idx)),
                None => groups.push(GroupColumns {
                    prefix,
                    lines: vec![(line, idx)],
                    city: None,
                    state: None,
                    zip: None,
                }),
            }
        }

        let single = groups.len() == 1;
        for group in &mut groups {
            group.lines.sort_by_key(|&(line, _)| line);
            group.city = part_column(header, &group.prefix, "city", single);
            group.state = part_column(header, &group.prefix, "state", single);
            group.zip = part_column(header, &group.prefix, ZIPCODE, single);
        }

        Self { groups }
    }

    /// Prefixes of the discovered groups, in order
    pub fn prefixes(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.prefix.as_str()).collect()
    }

    /// True when the header has no address columns
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Read every address group from a row
    pub fn extract(&self, row: &[String]) -> Vec<AddressGroup> {
        let cell = |idx: Option<usize>| -> String {
            idx.and_then(|i| row.get(i))
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        };

        self.groups
            .iter()
            .map(|group| {
                let street = group
                    .lines
                    .iter()
                    .map(|&(_, idx)| cell(Some(idx)))
                    .filter(|line| !line.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ");

                AddressGroup {
                    prefix: group.prefix.clone(),
                    street,
                    city: cell(group.city),
                    state: cell(group.state),
                    zip: cell(group.zip),
                }
            })
            .collect()
    }
}

/// Split an address column into (prefix, line number)
///
/// `billing address 1` → (`billing`, 1), `address line 2` → (``, 2),
/// `home address` → (`home`, 0). Returns `None` for non-address columns.
pub fn parse_address_column(column: &str) -> Option<(String, u32)> {
    if !column.contains("address") {
        return None;
    }

    let body = column.trim_end_matches(|c: char| c.is_ascii_digit());
    let line = column[body.len()..].parse::<u32>().unwrap_or(0);

    let prefix = body
        .split_whitespace()
        .map(|token| token.strip_suffix("address").unwrap_or(token))
        .filter(|token| !token.is_empty() && *token != "line")
        .collect::<Vec<_>>()
        .join(" ");

    Some((prefix, line))
}

fn part_column(header: &[String], prefix: &str, part: &str, single_group: bool) -> Option<usize> {
    let position = |name: &str| header.iter().position(|c| c == name);

    if prefix.is_empty() {
        return position(part);
    }

    position(&format!("{} {}", prefix, part)).or_else(|| {
        if single_group {
            position(part)
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|s| s.to_string()).collect()
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_address_column() {
        assert_eq!(parse_address_column("address"), Some((String::new(), 0)));
        assert_eq!(parse_address_column("address 1"), Some((String::new(), 1)));
        assert_eq!(parse_address_column("address1"), Some((String::new(), 1)));
        assert_eq!(parse_address_column("address line 2"), Some((String::new(), 2)));
        assert_eq!(
            parse_address_column("billing address 1"),
            Some(("billing".to_string(), 1))
        );
        assert_eq!(parse_address_column("home address"), Some(("home".to_string(), 0)));
        assert_eq!(parse_address_column("city"), None);
    }

    #[test]
    fn test_address_lines_concatenated() {
        let grouper = AddressGrouper::from_header(&header(&[
            "address 1", "address 2", "city", "state", "zipcode",
        ]));
        let groups = grouper.extract(&row(&["12 Elm St", "Apt 4", "Reno", "NV", "89501"]));

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].street, "12 Elm St Apt 4");
        assert_eq!(groups[0].city, "Reno");
        assert_eq!(groups[0].state, "NV");
        assert_eq!(groups[0].zip, "89501");
    }

    #[test]
    fn test_empty_second_line_has_no_trailing_space() {
        let grouper = AddressGrouper::from_header(&header(&["address 1", "address 2"]));
        let groups = grouper.extract(&row(&["12 Elm St", ""]));
        assert_eq!(groups[0].street, "12 Elm St");
    }

    #[test]
    fn test_line_order_follows_number_not_column_order() {
        let grouper = AddressGrouper::from_header(&header(&["address 2", "address 1"]));
        let groups = grouper.extract(&row(&["Apt 4", "12 Elm St"]));
        assert_eq!(groups[0].street, "12 Elm St Apt 4");
    }

    #[test]
    fn test_multiple_prefixed_groups() {
        let grouper = AddressGrouper::from_header(&header(&[
            "billing address 1",
            "billing city",
            "billing state",
            "billing zipcode",
            "home address",
            "home city",
            "home state",
            "home zipcode",
        ]));
        assert_eq!(grouper.prefixes(), vec!["billing", "home"]);

        let groups = grouper.extract(&row(&[
            "1 Bill Rd", "Austin", "TX", "73301", "2 Home Ln", "Dallas", "TX", "75001",
        ]));
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].prefix, "billing");
        assert_eq!(groups[0].city, "Austin");
        assert_eq!(groups[1].street, "2 Home Ln");
        assert_eq!(groups[1].zip, "75001");
    }

    #[test]
    fn test_single_prefixed_group_falls_back_to_plain_city() {
        let grouper =
            AddressGrouper::from_header(&header(&["mailing address", "city", "state", "zipcode"]));
        let groups = grouper.extract(&row(&["9 Oak Ct", "Boise", "ID", "83702"]));
        assert_eq!(groups[0].city, "Boise");
        assert_eq!(groups[0].zip, "83702");
    }

    #[test]
    fn test_no_address_columns() {
        let grouper = AddressGrouper::from_header(&header(&["first name", "city"]));
        assert!(grouper.is_empty());
        assert!(grouper.extract(&row(&["Ann", "Reno"])).is_empty());
    }

    #[test]
    fn test_group_without_street_is_not_an_address() {
        let group = AddressGroup {
            city: "Reno".to_string(),
            ..Default::default()
        };
        assert!(group.to_address().is_none());
    }
}
