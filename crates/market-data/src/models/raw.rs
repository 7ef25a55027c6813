use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A provider row as delivered, keyed by the provider's own column names.
pub type RawRow = Map<String, Value>;

/// Untyped daily table returned by a provider before normalization.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub rows: Vec<RawRow>,
}

impl RawTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from JSON objects; non-object values are skipped.
    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Self {
        let rows = values
            .into_iter()
            .filter_map(|v| match v {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();
        Self { rows }
    }

    pub fn push(&mut self, row: RawRow) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<RawRow> for RawTable {
    fn from_iter<I: IntoIterator<Item = RawRow>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}
