//! Market price source contract.
//!
//! The single I/O boundary of the system: everything else is local, pure
//! computation. Implementations may sit on HTTP, files, or fixtures; the
//! engines never inspect the transport.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::domain::calendar::format_iso_date;
use crate::Symbol;

/// Close price returned by a market price lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub price: f64,
    /// Date the price actually corresponds to; may differ from the requested
    /// date when the source rolls back to the last trading day.
    #[serde(with = "quote_date")]
    pub as_of: Date,
    pub source: String,
}

impl PriceQuote {
    pub fn new(price: f64, as_of: Date, source: impl Into<String>) -> Self {
        Self {
            price,
            as_of,
            source: source.into(),
        }
    }

    pub fn as_of_str(&self) -> String {
        format_iso_date(self.as_of)
    }
}

mod quote_date {
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

/// Source-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Unavailable,
    RateLimited,
    InvalidRequest,
    NotFound,
    Internal,
}

/// Structured error from a price source. The `retryable` flag drives the
/// fetch retry loop; nothing else in the system retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::NotFound,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::NotFound => "source.not_found",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Market price lookup contract.
///
/// Implementations must be `Send + Sync`; they are shared across the
/// validation engine and concurrent mark enrichment workers.
pub trait PriceSource: Send + Sync {
    /// Fetch the close price for `(symbol, date)`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the lookup fails; callers degrade
    /// (warning issue or `NO_MARKET_DATA`) rather than propagate.
    fn close_price<'a>(
        &'a self,
        symbol: &'a Symbol,
        date: Date,
    ) -> Pin<Box<dyn Future<Output = Result<PriceQuote, SourceError>> + Send + 'a>>;
}
