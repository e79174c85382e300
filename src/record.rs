use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Filter,
    Tag,
}

impl RecordKind {
    /// Field holding the natural key.
    pub fn key_field(self) -> &'static str {
        match self {
            RecordKind::Filter => "title",
            RecordKind::Tag => "name",
        }
    }

    pub fn plural(self) -> &'static str {
        match self {
            RecordKind::Filter => "filters",
            RecordKind::Tag => "tags",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Filter => write!(f, "filter"),
            RecordKind::Tag => write!(f, "tag"),
        }
    }
}

/// A filter or tag as a JSON object, checked to carry its natural key.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    kind: RecordKind,
    fields: Map<String, Value>,
}

impl Record {
    pub fn from_value(kind: RecordKind, value: Value) -> Result<Record> {
        let fields = match value {
            Value::Object(fields) => fields,
            other => {
                return Err(Error::malformed(
                    kind,
                    format!("expected a JSON object, found {}", json_type(&other)),
                ))
            }
        };
        match fields.get(kind.key_field()) {
            Some(Value::String(key)) if key.trim().is_empty() => {
                return Err(Error::malformed(
                    kind,
                    format!("`{}` is empty", kind.key_field()),
                ))
            }
            Some(Value::String(_)) => {}
            Some(_) => {
                return Err(Error::malformed(
                    kind,
                    format!("`{}` is not a string", kind.key_field()),
                ))
            }
            None => {
                return Err(Error::malformed(
                    kind,
                    format!("missing `{}`", kind.key_field()),
                ))
            }
        }
        Ok(Record { kind, fields })
    }

    pub fn key(&self) -> &str {
        self.fields
            .get(self.kind.key_field())
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

/// Strips server-assigned ids and volatile fields so records from different
/// sources compare by content.
///
/// Filters lose `id` at the top level and on every keyword entry; tags lose
/// `id` and `history`. Filters must carry a `keywords` array of objects.
pub fn normalize(mut record: Record) -> Result<Record> {
    record.fields.remove("id");
    match record.kind {
        RecordKind::Filter => {
            let title = record.key().to_string();
            let keywords = match record.fields.get_mut("keywords") {
                Some(Value::Array(keywords)) => keywords,
                Some(_) => {
                    return Err(Error::malformed(
                        RecordKind::Filter,
                        format!("`keywords` of \"{}\" is not an array", title),
                    ))
                }
                None => {
                    return Err(Error::malformed(
                        RecordKind::Filter,
                        format!("\"{}\" has no `keywords`", title),
                    ))
                }
            };
            for keyword in keywords.iter_mut() {
                match keyword {
                    Value::Object(entry) => {
                        entry.remove("id");
                    }
                    other => {
                        let found = json_type(other);
                        return Err(Error::malformed(
                            RecordKind::Filter,
                            format!("keyword entry is {}, not an object", found),
                        ));
                    }
                }
            }
        }
        RecordKind::Tag => {
            record.fields.remove("history");
        }
    }
    Ok(record)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Records of one kind keyed by natural key, iterated in key order.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSet {
    kind: RecordKind,
    records: BTreeMap<String, Record>,
}

impl RecordSet {
    pub fn new(kind: RecordKind) -> Self {
        RecordSet {
            kind,
            records: BTreeMap::new(),
        }
    }

    /// Parses and normalizes raw JSON values. Malformed entries are logged
    /// and skipped, on key collision the later value wins.
    pub fn from_values<I>(kind: RecordKind, values: I, origin: &str) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        let mut set = RecordSet::new(kind);
        for value in values {
            let record = match Record::from_value(kind, value).and_then(normalize) {
                Ok(record) => record,
                Err(e) => {
                    warn!("Skipping record from {}: {}", origin, e);
                    continue;
                }
            };
            if let Some(previous) = set.insert(record) {
                warn!(
                    "Duplicate {} \"{}\" in {}, keeping the later entry",
                    kind,
                    previous.key(),
                    origin
                );
            }
        }
        set
    }

    /// Inserts a record, returning the one it replaced.
    pub fn insert(&mut self, record: Record) -> Option<Record> {
        self.records.insert(record.key().to_string(), record)
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Record> {
        self.records.get(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Values<'_, String, Record> {
        self.records.values()
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = btree_map::Values<'a, String, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
