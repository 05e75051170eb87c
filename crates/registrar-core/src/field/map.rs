//! Accumulated form data.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::key::FieldKey;

/// A single field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    /// Storage path returned by the asset store.
    Asset(String),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) | FieldValue::Asset(s) => Some(s),
            FieldValue::Integer(_) => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) | FieldValue::Asset(s) => f.write_str(s),
            FieldValue::Integer(n) => write!(f, "{}", n),
        }
    }
}

/// Field values keyed by [`FieldKey`], iterated in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap(BTreeMap<FieldKey, FieldValue>);

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: FieldKey) -> Option<&FieldValue> {
        self.0.get(&key)
    }

    /// Stores a value and returns the one it replaced.
    pub fn set(&mut self, key: FieldKey, value: FieldValue) -> Option<FieldValue> {
        self.0.insert(key, value)
    }

    pub fn contains(&self, key: FieldKey) -> bool {
        self.0.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = FieldKey> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldKey, &FieldValue)> {
        self.0.iter().map(|(k, v)| (*k, v))
    }

    /// Copies every entry of `other` over this map.
    pub fn merge(&mut self, other: FieldMap) {
        self.0.extend(other.0);
    }

    pub fn full_name(&self) -> Option<&str> {
        self.get(FieldKey::FullName).and_then(FieldValue::as_str)
    }

    /// Keys from `required` that have no value.
    pub fn missing<'a>(&'a self, required: &'a [FieldKey]) -> impl Iterator<Item = FieldKey> + 'a {
        required.iter().copied().filter(|k| !self.contains(*k))
    }
}

impl FromIterator<(FieldKey, FieldValue)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (FieldKey, FieldValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for FieldMap {
    type Item = (FieldKey, FieldValue);
    type IntoIter = std::collections::btree_map::IntoIter<FieldKey, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
