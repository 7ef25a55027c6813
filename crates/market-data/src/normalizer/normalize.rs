//! Raw provider tables into canonical daily bars.

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate};
use log::debug;
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::models::{DailyBar, RawRow, RawTable};

use super::schema::{CanonicalField, ProviderSchema};

/// A cell that is present but unusable.
#[derive(Debug)]
struct BadCell(CanonicalField);

/// Normalize a provider table into ascending canonical bars.
///
/// - unmapped columns are dropped
/// - adjusted close wins over close
/// - rows missing a required field, or with an unparseable cell, are excluded
/// - rows with negative values or `high < low` are excluded
/// - a duplicated date keeps the last row
/// - absent percent change is derived from consecutive closes, first row 0
/// - absent amount is `volume * close`; rows where that overflows are excluded
pub fn normalize(raw: &RawTable, schema: &ProviderSchema) -> Vec<DailyBar> {
    normalize_recent(raw, schema, None)
}

/// [`normalize`], keeping only the most recent `days` dates when given.
///
/// Rows are cut before percent change is derived, so the first returned
/// row's derived change is 0 as well.
pub fn normalize_recent(
    raw: &RawTable,
    schema: &ProviderSchema,
    days: Option<usize>,
) -> Vec<DailyBar> {
    let mut by_date: BTreeMap<NaiveDate, (PartialBar, Decimal)> = BTreeMap::new();

    for (index, row) in raw.rows.iter().enumerate() {
        match map_row(row, schema) {
            Ok(Some(bar)) => {
                if let Some(reason) = bar.sanity_issue() {
                    debug!("Dropping row {} ({}): {}", index, bar.date, reason);
                    continue;
                }
                let Some(amount) = bar.amount.or_else(|| bar.volume.checked_mul(bar.close)) else {
                    debug!("Dropping row {} ({}): amount overflows", index, bar.date);
                    continue;
                };
                by_date.insert(bar.date, (bar, amount));
            }
            Ok(None) => debug!("Dropping row {}: missing required column", index),
            Err(BadCell(field)) => {
                debug!("Dropping row {}: unparseable '{}'", index, field.as_str())
            }
        }
    }

    let skip = days.map_or(0, |days| by_date.len().saturating_sub(days));
    let mut bars = Vec::with_capacity(by_date.len() - skip);
    let mut prev_close: Option<Decimal> = None;
    for (bar, amount) in by_date.into_values().skip(skip) {
        let pct_change = match bar.pct_change {
            Some(pct) => pct,
            None => percent_change(prev_close, bar.close),
        };
        prev_close = Some(bar.close);
        bars.push(DailyBar {
            date: bar.date,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            amount,
            pct_change,
        });
    }

    if bars.len() + skip < raw.len() {
        debug!(
            "Normalized {} of {} raw rows",
            bars.len() + skip,
            raw.len()
        );
    }
    bars
}

/// `(close / prev - 1) * 100`, rounded to 2 places. Zero without a usable
/// previous close or when the change overflows.
fn percent_change(prev_close: Option<Decimal>, close: Decimal) -> Decimal {
    match prev_close {
        Some(prev) if !prev.is_zero() => close
            .checked_div(prev)
            .and_then(|ratio| ratio.checked_sub(Decimal::ONE))
            .and_then(|change| change.checked_mul(Decimal::ONE_HUNDRED))
            .map(|pct| pct.round_dp(2))
            .unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    }
}

struct PartialBar {
    date: NaiveDate,
    open: Decimal,
    high: Decimal,
    low: Decimal,
    close: Decimal,
    volume: Decimal,
    amount: Option<Decimal>,
    pct_change: Option<Decimal>,
}

impl PartialBar {
    fn sanity_issue(&self) -> Option<&'static str> {
        if [self.open, self.high, self.low, self.close, self.volume]
            .iter()
            .any(|v| v.is_sign_negative() && !v.is_zero())
        {
            return Some("negative value");
        }
        if self.high < self.low {
            return Some("high below low");
        }
        None
    }
}

/// Map one raw row. `Ok(None)` means a required field is absent.
fn map_row(row: &RawRow, schema: &ProviderSchema) -> Result<Option<PartialBar>, BadCell> {
    let mut cells: HashMap<CanonicalField, &Value> = HashMap::new();
    for (column, value) in row {
        if let Some(field) = schema.field_for(column) {
            cells.insert(field, value);
        }
    }

    let number = |field: CanonicalField| -> Result<Option<Decimal>, BadCell> {
        match cells.get(&field) {
            Some(value) => parse_decimal(value).map_err(|_| BadCell(field)),
            None => Ok(None),
        }
    };

    let date = match cells.get(&CanonicalField::Date) {
        Some(value) if is_blank(value) => None,
        Some(value) => Some(parse_date(value).ok_or(BadCell(CanonicalField::Date))?),
        None => None,
    };
    let open = number(CanonicalField::Open)?;
    let high = number(CanonicalField::High)?;
    let low = number(CanonicalField::Low)?;
    let close = number(CanonicalField::AdjClose)?.or(number(CanonicalField::Close)?);
    let volume = number(CanonicalField::Volume)?;
    let amount = number(CanonicalField::Amount)?;
    let pct_change = number(CanonicalField::PercentChange)?;

    let (Some(date), Some(open), Some(high), Some(low), Some(close), Some(volume)) =
        (date, open, high, low, close, volume)
    else {
        return Ok(None);
    };

    Ok(Some(PartialBar {
        date,
        open,
        high,
        low,
        close,
        volume,
        amount,
        pct_change,
    }))
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => matches!(s.trim(), "" | "-"),
        _ => false,
    }
}

/// Parse a numeric cell. Blank cells are `Ok(None)`.
pub(crate) fn parse_decimal(value: &Value) -> Result<Option<Decimal>, ()> {
    if is_blank(value) {
        return Ok(None);
    }
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(Some(Decimal::from(i)));
            }
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
                .or_else(|| n.as_f64().and_then(Decimal::from_f64))
                .map(Some)
                .ok_or(())
        }
        Value::String(s) => {
            let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
            Decimal::from_str(&cleaned)
                .or_else(|_| Decimal::from_scientific(&cleaned))
                .map(Some)
                .map_err(|_| ())
        }
        _ => Err(()),
    }
}

/// Parse a date cell: `YYYY-MM-DD` (optionally followed by a time),
/// `YYYYMMDD`, or epoch seconds/milliseconds.
pub(crate) fn parse_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => parse_date_str(s.trim()),
        Value::Number(n) => {
            let raw = n.as_i64()?;
            if (19000101..=29991231).contains(&raw) {
                return parse_date_str(&raw.to_string());
            }
            let secs = if raw.abs() >= 100_000_000_000 {
                raw / 1000
            } else {
                raw
            };
            DateTime::from_timestamp(secs, 0).map(|dt| dt.date_naive())
        }
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<NaiveDate> {
    if s.len() == 8 && s.chars().all(|c| c.is_ascii_digit()) {
        return NaiveDate::parse_from_str(s, "%Y%m%d").ok();
    }
    let day = match s.char_indices().nth(10) {
        Some((idx, 'T')) | Some((idx, ' ')) => &s[..idx],
        _ => s,
    };
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}
