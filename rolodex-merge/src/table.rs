//! Contact table: identity matching and field merge
//!
//! Records are matched on the case-insensitive, trimmed `(first, last)` pair
//! and nothing else. Each contact channel (email, phone) has a primary and an
//! alternate slot; a slot is filled when empty and never cleared. A third
//! distinct value is reported as a [`Conflict`] and dropped. Addresses are
//! replaced as a whole by the latest observation.
//!
//! Callers must feed observations in chronological order: the address
//! overwrite rule only yields the most recent address if they do.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

use crate::error::{MergeError, MergeResult};

/// Postal address, always replaced as one unit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

/// Case-insensitive, trimmed `(first, last)` pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    first: String,
    last: String,
}

impl IdentityKey {
    pub fn new(first: &str, last: &str) -> Self {
        Self {
            first: first.trim().to_lowercase(),
            last: last.trim().to_lowercase(),
        }
    }
}

/// One consolidated person
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactRecord {
    pub first_name: String,
    pub last_name: String,
    pub email_primary: Option<String>,
    pub email_alternate: Option<String>,
    pub phone_primary: Option<String>,
    pub phone_alternate: Option<String>,
    pub address: Option<Address>,
    /// Maintained by hand; never written by the merge
    pub alternate_name: Option<String>,
}

impl ContactRecord {
    pub fn key(&self) -> IdentityKey {
        IdentityKey::new(&self.first_name, &self.last_name)
    }

    /// True when nothing but the name is populated
    pub fn is_name_only(&self) -> bool {
        self.email_primary.is_none()
            && self.email_alternate.is_none()
            && self.phone_primary.is_none()
            && self.phone_alternate.is_none()
            && self.address.is_none()
            && self.alternate_name.is_none()
    }

    /// True when both name fields are blank
    pub fn is_nameless(&self) -> bool {
        self.first_name.trim().is_empty() && self.last_name.trim().is_empty()
    }

    /// Turn empty strings into `None` so that blank cells count as empty slots
    fn normalized(mut self) -> Self {
        for slot in [
            &mut self.email_primary,
            &mut self.email_alternate,
            &mut self.phone_primary,
            &mut self.phone_alternate,
            &mut self.alternate_name,
        ] {
            *slot = slot.take().and_then(|v| non_empty(&v));
        }
        if self.address.as_ref().is_some_and(|a| a.street.trim().is_empty()) {
            self.address = None;
        }
        self.first_name = self.first_name.trim().to_string();
        self.last_name = self.last_name.trim().to_string();
        self
    }
}

/// A single observation of a person, fed to [`ContactTable::add`]
///
/// Empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Observation {
    pub first: String,
    pub last: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<Address>,
}

impl Observation {
    pub fn new(first: &str, last: &str) -> Self {
        Self {
            first: first.trim().to_string(),
            last: last.trim().to_string(),
            ..Default::default()
        }
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.email = non_empty(email);
        self
    }

    pub fn with_phone(mut self, phone: &str) -> Self {
        self.phone = non_empty(phone);
        self
    }

    /// Attach an address; ignored when its street is blank
    pub fn with_address(mut self, address: Address) -> Self {
        if !address.street.trim().is_empty() {
            self.address = Some(address);
        }
        self
    }
}

/// Contact channel with primary/alternate slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Phone,
}

/// A third distinct value for a channel whose two slots are taken
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub first: String,
    pub last: String,
    pub channel: Channel,
    /// The dropped value
    pub value: String,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.channel {
            Channel::Email => "emails",
            Channel::Phone => "phone numbers",
        };
        write!(
            f,
            "Two {} already exist for {} {}, cannot add {}",
            what, self.first, self.last, self.value
        )
    }
}

/// Result of one [`ContactTable::add`] call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddOutcome {
    /// A new record was created
    pub created: bool,
    /// Values that could not be stored
    pub conflicts: Vec<Conflict>,
}

/// What happened to a value offered to a two-slot channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotMerge {
    Primary,
    Alternate,
    AlreadyHeld,
    Full,
}

fn merge_slot(primary: &mut Option<String>, alternate: &mut Option<String>, value: &str) -> SlotMerge {
    if primary.is_none() {
        *primary = Some(value.to_string());
        return SlotMerge::Primary;
    }
    if primary.as_deref() == Some(value) {
        return SlotMerge::AlreadyHeld;
    }
    if alternate.is_none() {
        *alternate = Some(value.to_string());
        return SlotMerge::Alternate;
    }
    if alternate.as_deref() == Some(value) {
        return SlotMerge::AlreadyHeld;
    }
    SlotMerge::Full
}

/// The consolidated record set
///
/// Records keep first-observation order; the identity index maps each key to
/// the positions holding it. More than one position per key can only come
/// from seeding and is rejected as soon as that key is touched.
#[derive(Debug, Clone, Default)]
pub struct ContactTable {
    records: Vec<ContactRecord>,
    index: HashMap<IdentityKey, Vec<usize>>,
}

impl ContactTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from previously consolidated records
    ///
    /// Duplicate identity keys are accepted here (hand-edited files may
    /// contain them) and reported by [`ContactTable::add`] when touched.
    pub fn from_records(records: Vec<ContactRecord>) -> Self {
        let mut table = Self {
            records: records.into_iter().map(ContactRecord::normalized).collect(),
            index: HashMap::new(),
        };
        table.rebuild_index();
        table
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ContactRecord] {
        &self.records
    }

    /// Look up a record by name, case-insensitively
    pub fn get(&self, first: &str, last: &str) -> Option<&ContactRecord> {
        self.index
            .get(&IdentityKey::new(first, last))
            .and_then(|positions| positions.first())
            .map(|&i| &self.records[i])
    }

    /// Merge one observation
    ///
    /// **Algorithm:**
    /// 1. No record with this identity: create one from the observation
    /// 2. More than one record: `DuplicateIdentity` (fatal)
    /// 3. Exactly one: merge email and phone into their slots, replace the
    ///    address if the observation carries one
    pub fn add(&mut self, obs: Observation) -> MergeResult<AddOutcome> {
        let key = IdentityKey::new(&obs.first, &obs.last);

        let positions = self.index.get(&key).cloned().unwrap_or_default();
        let position = match positions.as_slice() {
            [] => {
                debug!(first = %obs.first, last = %obs.last, "New contact");
                self.index.insert(key, vec![self.records.len()]);
                self.records.push(ContactRecord {
                    first_name: obs.first,
                    last_name: obs.last,
                    email_primary: obs.email,
                    phone_primary: obs.phone,
                    address: obs.address,
                    ..Default::default()
                });
                return Ok(AddOutcome {
                    created: true,
                    conflicts: Vec::new(),
                });
            }
            [position] => *position,
            _ => {
                return Err(MergeError::DuplicateIdentity {
                    first: obs.first,
                    last: obs.last,
                });
            }
        };

        let record = &mut self.records[position];
        let mut conflicts = Vec::new();

        let channels = [
            (Channel::Email, obs.email.as_deref()),
            (Channel::Phone, obs.phone.as_deref()),
        ];
        for (channel, value) in channels {
            let Some(value) = value else { continue };
            let (primary, alternate) = match channel {
                Channel::Email => (&mut record.email_primary, &mut record.email_alternate),
                Channel::Phone => (&mut record.phone_primary, &mut record.phone_alternate),
            };
            match merge_slot(primary, alternate, value) {
                SlotMerge::Full => {
                    let conflict = Conflict {
                        first: obs.first.clone(),
                        last: obs.last.clone(),
                        channel,
                        value: value.to_string(),
                    };
                    warn!("{}", conflict);
                    conflicts.push(conflict);
                }
                outcome => {
                    debug!(
                        first = %record.first_name,
                        last = %record.last_name,
                        ?channel,
                        ?outcome,
                        "Merged contact value"
                    );
                }
            }
        }

        if let Some(address) = obs.address {
            debug!(
                first = %record.first_name,
                last = %record.last_name,
                street = %address.street,
                "Replacing address"
            );
            record.address = Some(address);
        }

        Ok(AddOutcome {
            created: false,
            conflicts,
        })
    }

    /// Drop records carrying nothing but a name, and records with no name
    ///
    /// Run once after every table is merged: a record may pick up contact
    /// details from a later table. Returns the number of records removed.
    pub fn prune_name_only(&mut self) -> usize {
        let before = self.records.len();
        self.records
            .retain(|record| !record.is_name_only() && !record.is_nameless());
        self.rebuild_index();
        before - self.records.len()
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (i, record) in self.records.iter().enumerate() {
            self.index.entry(record.key()).or_default().push(i);
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(street: &str, city: &str) -> Address {
        Address {
            street: street.to_string(),
            city: city.to_string(),
            state: "NV".to_string(),
            zip: "89501".to_string(),
        }
    }

    #[test]
    fn test_identity_is_case_insensitive_and_trimmed() {
        let mut table = ContactTable::new();
        table.add(Observation::new("John", "Smith").with_email("a@x.com")).unwrap();
        let outcome = table
            .add(Observation::new(" JOHN ", "SMITH").with_phone("555-000-0001"))
            .unwrap();

        assert!(!outcome.created);
        assert_eq!(table.len(), 1);
        let record = table.get("john", "smith").unwrap();
        assert_eq!(record.first_name, "John");
        assert_eq!(record.email_primary.as_deref(), Some("a@x.com"));
        assert_eq!(record.phone_primary.as_deref(), Some("555-000-0001"));
    }

    #[test]
    fn test_new_record_fills_primary_slots_only() {
        let mut table = ContactTable::new();
        let outcome = table
            .add(
                Observation::new("Ann", "Lee")
                    .with_email("ann@x.com")
                    .with_phone("555-123-4567")
                    .with_address(address("1 Main St", "Reno")),
            )
            .unwrap();

        assert!(outcome.created);
        let record = table.get("Ann", "Lee").unwrap();
        assert_eq!(record.email_alternate, None);
        assert_eq!(record.phone_alternate, None);
        assert_eq!(record.alternate_name, None);
        assert_eq!(record.address, Some(address("1 Main St", "Reno")));
    }

    #[test]
    fn test_primary_then_alternate_then_conflict() {
        let mut table = ContactTable::new();
        for email in ["a@x.com", "b@x.com"] {
            let outcome = table.add(Observation::new("Ann", "Lee").with_email(email)).unwrap();
            assert!(outcome.conflicts.is_empty());
        }
        let outcome = table
            .add(Observation::new("Ann", "Lee").with_email("c@x.com"))
            .unwrap();

        let record = table.get("Ann", "Lee").unwrap();
        assert_eq!(record.email_primary.as_deref(), Some("a@x.com"));
        assert_eq!(record.email_alternate.as_deref(), Some("b@x.com"));
        assert_eq!(outcome.conflicts.len(), 1);
        assert_eq!(outcome.conflicts[0].channel, Channel::Email);
        assert_eq!(outcome.conflicts[0].value, "c@x.com");
        assert_eq!(
            outcome.conflicts[0].to_string(),
            "Two emails already exist for Ann Lee, cannot add c@x.com"
        );
    }

    #[test]
    fn test_phone_conflict_message() {
        let mut table = ContactTable::new();
        for phone in ["555-000-0001", "555-000-0002", "555-000-0003"] {
            table.add(Observation::new("Ann", "Lee").with_phone(phone)).unwrap();
        }
        let outcome = table
            .add(Observation::new("Ann", "Lee").with_phone("555-000-0004"))
            .unwrap();
        assert_eq!(
            outcome.conflicts[0].to_string(),
            "Two phone numbers already exist for Ann Lee, cannot add 555-000-0004"
        );
        let record = table.get("Ann", "Lee").unwrap();
        assert_eq!(record.phone_alternate.as_deref(), Some("555-000-0002"));
    }

    #[test]
    fn test_repeated_value_is_idempotent() {
        let mut table = ContactTable::new();
        table.add(Observation::new("Ann", "Lee").with_email("a@x.com")).unwrap();
        let before = table.records().to_vec();

        let outcome = table.add(Observation::new("Ann", "Lee").with_email("a@x.com")).unwrap();
        assert!(outcome.conflicts.is_empty());
        assert_eq!(table.records(), before.as_slice());
    }

    #[test]
    fn test_alternate_repeat_is_not_a_conflict() {
        let mut table = ContactTable::new();
        for email in ["a@x.com", "b@x.com", "b@x.com", "a@x.com"] {
            let outcome = table.add(Observation::new("Ann", "Lee").with_email(email)).unwrap();
            assert!(outcome.conflicts.is_empty());
        }
    }

    #[test]
    fn test_empty_values_are_absent() {
        let mut table = ContactTable::new();
        table.add(Observation::new("Ann", "Lee").with_email("a@x.com")).unwrap();
        table
            .add(Observation::new("Ann", "Lee").with_email("  ").with_phone(""))
            .unwrap();
        let record = table.get("Ann", "Lee").unwrap();
        assert_eq!(record.email_alternate, None);
        assert_eq!(record.phone_primary, None);
    }

    #[test]
    fn test_address_is_replaced_as_a_unit() {
        let mut table = ContactTable::new();
        table
            .add(Observation::new("Ann", "Lee").with_address(address("1 Old Rd", "Reno")))
            .unwrap();
        table
            .add(Observation::new("Ann", "Lee").with_address(Address {
                street: "2 New Rd".to_string(),
                ..Default::default()
            }))
            .unwrap();

        let record = table.get("Ann", "Lee").unwrap();
        let current = record.address.as_ref().unwrap();
        assert_eq!(current.street, "2 New Rd");
        assert_eq!(current.city, "");
        assert_eq!(current.zip, "");
    }

    #[test]
    fn test_address_only_call_leaves_channels_alone() {
        let mut table = ContactTable::new();
        table
            .add(Observation::new("Ann", "Lee").with_email("a@x.com").with_phone("555-123-4567"))
            .unwrap();
        table
            .add(Observation::new("Ann", "Lee").with_address(address("1 Main St", "Reno")))
            .unwrap();

        let record = table.get("Ann", "Lee").unwrap();
        assert_eq!(record.email_primary.as_deref(), Some("a@x.com"));
        assert_eq!(record.phone_primary.as_deref(), Some("555-123-4567"));
        assert!(record.address.is_some());
    }

    #[test]
    fn test_blank_street_does_not_clear_address() {
        let mut table = ContactTable::new();
        table
            .add(Observation::new("Ann", "Lee").with_address(address("1 Main St", "Reno")))
            .unwrap();
        table
            .add(Observation::new("Ann", "Lee").with_address(address("", "Elko")))
            .unwrap();
        let record = table.get("Ann", "Lee").unwrap();
        assert_eq!(record.address.as_ref().unwrap().city, "Reno");
    }

    #[test]
    fn test_duplicate_seeded_identity_is_fatal() {
        let seeded = vec![
            ContactRecord {
                first_name: "Ann".to_string(),
                last_name: "Lee".to_string(),
                email_primary: Some("a@x.com".to_string()),
                ..Default::default()
            },
            ContactRecord {
                first_name: "ANN".to_string(),
                last_name: "lee".to_string(),
                email_primary: Some("b@x.com".to_string()),
                ..Default::default()
            },
        ];
        let mut table = ContactTable::from_records(seeded);

        match table.add(Observation::new("Ann", "Lee").with_email("c@x.com")) {
            Err(MergeError::DuplicateIdentity { first, last }) => {
                assert_eq!(first, "Ann");
                assert_eq!(last, "Lee");
            }
            other => panic!("Expected DuplicateIdentity, got {:?}", other),
        }
    }

    #[test]
    fn test_seeded_blank_slots_count_as_empty() {
        let seeded = vec![ContactRecord {
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            email_primary: Some(String::new()),
            alternate_name: Some("Annie Lee".to_string()),
            ..Default::default()
        }];
        let mut table = ContactTable::from_records(seeded);
        table.add(Observation::new("Ann", "Lee").with_email("a@x.com")).unwrap();

        let record = table.get("Ann", "Lee").unwrap();
        assert_eq!(record.email_primary.as_deref(), Some("a@x.com"));
        assert_eq!(record.alternate_name.as_deref(), Some("Annie Lee"));
    }

    #[test]
    fn test_prune_name_only() {
        let mut table = ContactTable::new();
        table.add(Observation::new("Total", "Donations")).unwrap();
        table.add(Observation::new("Ann", "Lee").with_email("a@x.com")).unwrap();
        table.add(Observation::new("Bo", "Po")).unwrap();
        table.add(Observation::new("Bo", "Po").with_phone("555-123-4567")).unwrap();

        let removed = table.prune_name_only();

        assert_eq!(removed, 1);
        assert_eq!(table.len(), 2);
        assert!(table.get("Total", "Donations").is_none());
        assert!(table.get("Bo", "Po").is_some());
    }

    #[test]
    fn test_prune_drops_nameless_records() {
        let mut table = ContactTable::new();
        table.add(Observation::new("", "").with_email("x@x.com")).unwrap();
        assert_eq!(table.prune_name_only(), 1);
        assert!(table.is_empty());
    }

    #[test]
    fn test_records_keep_first_observation_order() {
        let mut table = ContactTable::new();
        for (first, last) in [("Cy", "Z"), ("Ann", "A"), ("Bo", "M")] {
            table.add(Observation::new(first, last).with_email("e@x.com")).unwrap();
        }
        let names: Vec<&str> = table.records().iter().map(|r| r.first_name.as_str()).collect();
        assert_eq!(names, vec!["Cy", "Ann", "Bo"]);
    }
}
