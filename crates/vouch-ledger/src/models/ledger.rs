//! The full user → record mapping.

use super::{UserId, VouchRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Every user's vouch record, ordered by user id.
///
/// Persisted as a single snapshot: loaded fully before a mutation and saved
/// fully after. The ordering gives leaderboards their tie-break.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Ledger {
    records: BTreeMap<UserId, VouchRecord>,
}

impl Ledger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a user's record.
    pub fn get(&self, user: UserId) -> Option<&VouchRecord> {
        self.records.get(&user)
    }

    /// Get a user's record, creating an empty one on first reference.
    pub fn entry(&mut self, user: UserId) -> &mut VouchRecord {
        self.records.entry(user).or_default()
    }

    /// Remove a user's record.
    pub fn remove(&mut self, user: UserId) -> Option<VouchRecord> {
        self.records.remove(&user)
    }

    /// Whether the user has a record.
    pub fn contains(&self, user: UserId) -> bool {
        self.records.contains_key(&user)
    }

    /// Number of users with a record.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no user has a record.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate records in ascending user id order.
    pub fn iter(&self) -> impl Iterator<Item = (UserId, &VouchRecord)> {
        self.records.iter().map(|(id, record)| (*id, record))
    }
}

impl FromIterator<(UserId, VouchRecord)> for Ledger {
    fn from_iter<I: IntoIterator<Item = (UserId, VouchRecord)>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
