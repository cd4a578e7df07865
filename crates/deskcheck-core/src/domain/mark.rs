use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Internal end-of-day pricing mark submitted for classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    pub ticker: String,
    pub internal_mark: f64,
    /// ISO `YYYY-MM-DD`; kept as the submitted string so malformed records
    /// can be echoed back in per-record rejections.
    pub as_of_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portfolio_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instrument_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

/// Verdict assigned to a mark, exactly one per `EnrichedMark`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    Ok,
    ReviewNeeded,
    OutOfTolerance,
    StaleMark,
    NoMarketData,
}

impl Classification {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::ReviewNeeded => "REVIEW_NEEDED",
            Self::OutOfTolerance => "OUT_OF_TOLERANCE",
            Self::StaleMark => "STALE_MARK",
            Self::NoMarketData => "NO_MARKET_DATA",
        }
    }
}

impl Display for Classification {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mark augmented with the market comparison. Produced once per mark per
/// classification run; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedMark {
    #[serde(flatten)]
    pub mark: Mark,
    pub market_price: Option<f64>,
    pub deviation_absolute: Option<f64>,
    pub deviation_percentage: Option<f64>,
    pub classification: Classification,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_data_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance_override_applied: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub explanation: String,
}

/// Aggregate summary over one classification run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkSummary {
    pub counts: BTreeMap<String, usize>,
    pub total_marks: usize,
    pub average_deviation: Option<f64>,
    pub max_deviation: Option<f64>,
    pub top_tickers: Vec<String>,
}

impl MarkSummary {
    /// Build the aggregate view: classification counts, deviation stats,
    /// and the sorted set of tickers that need attention.
    pub fn from_marks(marks: &[EnrichedMark]) -> Self {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut deviations: Vec<f64> = Vec::new();
        let mut flagged: Vec<String> = Vec::new();

        for mark in marks {
            *counts
                .entry(mark.classification.as_str().to_owned())
                .or_insert(0) += 1;
            if let Some(dev) = mark.deviation_percentage {
                deviations.push(dev.abs());
            }
            if mark.classification != Classification::Ok {
                flagged.push(mark.mark.ticker.clone());
            }
        }

        flagged.sort();
        flagged.dedup();

        let average_deviation = if deviations.is_empty() {
            None
        } else {
            Some(deviations.iter().sum::<f64>() / deviations.len() as f64)
        };
        let max_deviation = deviations.iter().copied().fold(None, |acc: Option<f64>, d| {
            Some(acc.map_or(d, |m| m.max(d)))
        });

        Self {
            counts,
            total_marks: marks.len(),
            average_deviation,
            max_deviation,
            top_tickers: flagged,
        }
    }
}

/// Batch result: the enriched marks plus their aggregate summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkReport {
    pub enriched_marks: Vec<EnrichedMark>,
    pub summary: MarkSummary,
}
