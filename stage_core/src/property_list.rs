//! Editable list of configuration properties.
//!
//! Each row carries an [`EntryId`] handed out from a monotonic counter, so a
//! row can be addressed while its key is blank, duplicated or being renamed.
//! Because ids only ever grow, ordering the table by id is insertion order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// A plain string-to-string configuration mapping, in iteration order.
pub type ConfigMap = IndexMap<String, String>;

/// Stable identity of one row in a [`PropertyListStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntryId(u64);

impl EntryId {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "key{}", self.0)
    }
}

/// Which half of a row an update targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyField {
    Key,
    Value,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub key: String,
    pub value: String,
}

impl Property {
    fn blank() -> Self {
        Self::default()
    }
}

/// A row as exposed to views: `(identity, key, value)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyEntry<'a> {
    pub id: EntryId,
    pub key: &'a str,
    pub value: &'a str,
}

#[derive(Debug, Clone, Default)]
pub struct PropertyListStore {
    entries: BTreeMap<EntryId, Property>,
    next_id: u64,
}

impl PropertyListStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store already seeded from `mapping`.
    pub fn from_mapping(mapping: &ConfigMap) -> Self {
        let mut store = Self::new();
        store.seed(mapping);
        store
    }

    fn allocate(&mut self) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Replace every row with one row per mapping entry, in mapping order.
    ///
    /// An empty mapping leaves exactly one blank row. The id counter is not
    /// rewound, so ids from before the seed are never handed out again.
    pub fn seed(&mut self, mapping: &ConfigMap) {
        self.entries.clear();
        for (key, value) in mapping {
            let id = self.allocate();
            self.entries.insert(
                id,
                Property {
                    key: key.clone(),
                    value: value.clone(),
                },
            );
        }
        if self.entries.is_empty() {
            let id = self.allocate();
            self.entries.insert(id, Property::blank());
        }
        debug!(entries = self.entries.len(), "seeded property list");
    }

    /// Append a blank row and return its id.
    pub fn add(&mut self) -> EntryId {
        let id = self.allocate();
        self.entries.insert(id, Property::blank());
        debug!(%id, "added property");
        id
    }

    /// Remove a row. Unknown ids are ignored.
    pub fn remove(&mut self, id: EntryId) {
        if self.entries.remove(&id).is_some() {
            debug!(%id, "removed property");
        }
    }

    /// Overwrite the key or value of a row. Unknown ids are ignored.
    pub fn update(&mut self, id: EntryId, field: PropertyField, new_value: impl Into<String>) {
        let Some(property) = self.entries.get_mut(&id) else {
            return;
        };
        match field {
            PropertyField::Key => property.key = new_value.into(),
            PropertyField::Value => property.value = new_value.into(),
        }
    }

    /// Collapse the rows into a mapping.
    ///
    /// Blank keys are kept. When keys repeat, the later row wins.
    pub fn to_mapping(&self) -> ConfigMap {
        let mut mapping = ConfigMap::with_capacity(self.entries.len());
        for property in self.entries.values() {
            mapping.insert(property.key.clone(), property.value.clone());
        }
        mapping
    }

    pub fn entries(&self) -> impl Iterator<Item = PropertyEntry<'_>> + '_ {
        self.entries.iter().map(|(id, property)| PropertyEntry {
            id: *id,
            key: &property.key,
            value: &property.value,
        })
    }

    pub fn get(&self, id: EntryId) -> Option<&Property> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: EntryId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Ids of every row whose key equals `key`, in order.
    pub fn identities_for_key(&self, key: &str) -> Vec<EntryId> {
        self.entries
            .iter()
            .filter(|(_, property)| property.key == key)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
