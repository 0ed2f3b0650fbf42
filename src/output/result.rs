//! The ordered collection of harvested records

use crate::extract::ItemRecord;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Key of the top-level collection
pub const RECORDS_KEY: &str = "records";

/// Key of each record inside the collection
pub const RECORD_KEY: &str = "record";

/// Records in emission order
///
/// Serializes as `{"records": {"record": [...]}}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlResult {
    records: Vec<ItemRecord>,
}

impl CrawlResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ItemRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ItemRecord] {
        &self.records
    }
}

/// `{"record": [...]}` wrapper
struct RecordList<'a>(&'a [ItemRecord]);

impl Serialize for RecordList<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(RECORD_KEY, self.0)?;
        map.end()
    }
}

impl Serialize for CrawlResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(RECORDS_KEY, &RecordList(&self.records))?;
        map.end()
    }
}
