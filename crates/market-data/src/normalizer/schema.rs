//! Provider column mappings onto the canonical daily schema.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A column of the canonical daily table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    Date,
    Open,
    High,
    Low,
    Close,
    /// Adjusted close, preferred over `Close` when present.
    AdjClose,
    Volume,
    Amount,
    PercentChange,
}

impl CanonicalField {
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::Date => "date",
            CanonicalField::Open => "open",
            CanonicalField::High => "high",
            CanonicalField::Low => "low",
            CanonicalField::Close => "close",
            CanonicalField::AdjClose => "adj_close",
            CanonicalField::Volume => "volume",
            CanonicalField::Amount => "amount",
            CanonicalField::PercentChange => "pct_chg",
        }
    }
}

/// How one provider names its daily columns.
///
/// Columns without a mapping are dropped during normalization.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProviderSchema {
    columns: HashMap<String, CanonicalField>,
}

impl ProviderSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a provider column onto a canonical field.
    pub fn map(mut self, column: impl Into<String>, field: CanonicalField) -> Self {
        self.columns.insert(column.into(), field);
        self
    }

    pub fn field_for(&self, column: &str) -> Option<CanonicalField> {
        self.columns.get(column).copied()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Columns already named after the canonical fields.
    pub fn canonical() -> Self {
        [
            CanonicalField::Date,
            CanonicalField::Open,
            CanonicalField::High,
            CanonicalField::Low,
            CanonicalField::Close,
            CanonicalField::AdjClose,
            CanonicalField::Volume,
            CanonicalField::Amount,
            CanonicalField::PercentChange,
        ]
        .into_iter()
        .fold(Self::new(), |schema, field| schema.map(field.as_str(), field))
    }

    /// Yahoo-style chart export.
    pub fn yahoo() -> Self {
        Self::new()
            .map("Date", CanonicalField::Date)
            .map("Open", CanonicalField::Open)
            .map("High", CanonicalField::High)
            .map("Low", CanonicalField::Low)
            .map("Close", CanonicalField::Close)
            .map("Adj Close", CanonicalField::AdjClose)
            .map("Volume", CanonicalField::Volume)
    }

    /// AkShare A-share history with Chinese headers.
    pub fn akshare() -> Self {
        Self::new()
            .map("日期", CanonicalField::Date)
            .map("开盘", CanonicalField::Open)
            .map("收盘", CanonicalField::Close)
            .map("最高", CanonicalField::High)
            .map("最低", CanonicalField::Low)
            .map("成交量", CanonicalField::Volume)
            .map("成交额", CanonicalField::Amount)
            .map("涨跌幅", CanonicalField::PercentChange)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_schema_maps_every_field() {
        let schema = ProviderSchema::canonical();
        assert_eq!(schema.len(), 9);
        assert_eq!(schema.field_for("adj_close"), Some(CanonicalField::AdjClose));
        assert_eq!(schema.field_for("pct_chg"), Some(CanonicalField::PercentChange));
    }

    #[test]
    fn test_presets() {
        assert_eq!(
            ProviderSchema::yahoo().field_for("Adj Close"),
            Some(CanonicalField::AdjClose)
        );
        assert_eq!(
            ProviderSchema::akshare().field_for("收盘"),
            Some(CanonicalField::Close)
        );
        assert_eq!(ProviderSchema::yahoo().field_for("Dividends"), None);
    }
}
