use serde::{Deserialize, Serialize};
use time::Date;

/// Fully-typed equity trade record.
///
/// The typed entry point to trade validation: `TradeValidator::run_trade`
/// serializes a `Trade` and runs the same check battery as the untyped
/// JSON path, so typed callers skip hand-building records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub ticker: String,
    pub quantity: f64,
    pub price: f64,
    pub currency: String,
    pub counterparty: String,
    #[serde(with = "iso_date")]
    pub trade_dt: Date,
    #[serde(with = "iso_date")]
    pub settle_dt: Date,
}

/// ISO `YYYY-MM-DD` (de)serialization for trade dates.
mod iso_date {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    use crate::domain::calendar::{format_iso_date, parse_iso_date};

    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_iso_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_iso_date(&raw).map_err(serde::de::Error::custom)
    }
}
