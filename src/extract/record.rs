//! Output records
//!
//! Records keep their fields in pipeline order so the JSON written for a
//! human reader lists `id`, `url`, `Creator`, ... in the declared sequence.

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// Key of the reward list inside an item record
pub const REWARDS_KEY: &str = "rewards";

/// Key of each reward entry inside the reward list
pub const REWARD_KEY: &str = "reward";

/// A single extracted value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Short rendering for log lines; long text is cut at 60 characters
    pub fn summary(&self) -> String {
        match self {
            Self::Text(v) if v.chars().count() > 60 => {
                let head: String = v.chars().take(60).collect();
                format!("{}... ({} chars)", head, v.chars().count())
            }
            Self::Text(v) => v.clone(),
            Self::Bool(v) => v.to_string(),
            Self::Int(v) => v.to_string(),
            Self::Float(v) => v.to_string(),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Ordered field → value mapping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(&'static str, FieldValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field, or overwrites it in place if the name already exists
    pub fn insert(&mut self, name: &'static str, value: FieldValue) {
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|(n, _)| *n).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.fields.iter().map(|(n, v)| (*n, v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// `{"reward": [...]}` wrapper
struct RewardList<'a>(&'a [Record]);

impl Serialize for RewardList<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(REWARD_KEY, self.0)?;
        map.end()
    }
}

/// One harvested project: its fields followed by its rewards
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemRecord {
    pub fields: Record,
    pub rewards: Vec<Record>,
}

impl ItemRecord {
    pub fn new(fields: Record, rewards: Vec<Record>) -> Self {
        Self { fields, rewards }
    }

    pub fn id(&self) -> Option<i64> {
        self.fields.get("id").and_then(FieldValue::as_i64)
    }

    pub fn url(&self) -> Option<&str> {
        self.fields.get("url").and_then(FieldValue::as_str)
    }
}

impl Serialize for ItemRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        for (name, value) in self.fields.iter() {
            map.serialize_entry(name, value)?;
        }
        map.serialize_entry(REWARDS_KEY, &RewardList(&self.rewards))?;
        map.end()
    }
}
