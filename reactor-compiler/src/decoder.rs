//! Ordered-key JSON decoding
//!
//! An atom may carry the same quark kind more than once (two `"copy"` keys in
//! one object). A key-unique map would drop all but one of them, so objects
//! are decoded straight into an ordered list of `(key, value)` pairs.

use crate::error::{CompileError, Result};
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde_json::Value;
use std::fmt;

/// JSON object members in source order, repeated keys preserved
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderedObject {
    entries: Vec<(String, Value)>,
}

impl OrderedObject {
    pub fn new(entries: Vec<(String, Value)>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[(String, Value)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Members whose key matches `key`, ignoring ASCII case
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.entries
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    }

    pub fn into_entries(self) -> Vec<(String, Value)> {
        self.entries
    }
}

impl IntoIterator for OrderedObject {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

struct OrderedObjectVisitor;

impl<'de> Visitor<'de> for OrderedObjectVisitor {
    type Value = OrderedObject;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON object")
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, Value>()? {
            entries.push((key, value));
        }
        Ok(OrderedObject { entries })
    }
}

impl<'de> Deserialize<'de> for OrderedObject {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(OrderedObjectVisitor)
    }
}

/// Decode the atom definitions file: a top-level array of objects
pub fn decode_atom_definitions(source: &str) -> Result<Vec<OrderedObject>> {
    serde_json::from_str(source)
        .map_err(|e| CompileError::MalformedInput(format!("atom definitions: {e}")))
}
