use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::market::Market;

/// One canonical daily row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    /// Traded value; volume x close when the provider omits it
    pub amount: Decimal,
    /// Change versus the previous close, in percent, 2 decimals
    pub pct_change: Decimal,
}

/// Canonical daily history for one symbol, ascending by date.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTable {
    pub symbol: String,
    pub market: Market,
    pub currency: String,
    pub bars: Vec<DailyBar>,
}

impl DailyTable {
    pub fn new(symbol: impl Into<String>, market: Market, bars: Vec<DailyBar>) -> Self {
        Self {
            symbol: symbol.into(),
            market,
            currency: market.currency().to_string(),
            bars,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&DailyBar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&DailyBar> {
        self.bars.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn bar(day: u32, close: Decimal) -> DailyBar {
        DailyBar {
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: dec!(100),
            amount: close * dec!(100),
            pct_change: dec!(0),
        }
    }

    #[test]
    fn test_table_takes_market_currency() {
        let table = DailyTable::new(
            "600519",
            Market::ChinaA,
            vec![bar(4, dec!(10)), bar(5, dec!(11)), bar(6, dec!(12))],
        );
        assert_eq!(table.currency, "CNY");
        assert_eq!(table.len(), 3);
        assert_eq!(table.first().unwrap().close, dec!(10));
        assert_eq!(table.last().unwrap().close, dec!(12));
    }
}
