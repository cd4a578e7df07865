//! Mark classification engine.
//!
//! Compares internal price marks to fetched market prices and classifies
//! each deviation under per-instrument tolerances, with staleness and
//! data-availability overrides. Fetches go through an instance-owned price
//! cache with bounded retries; batch enrichment runs marks concurrently
//! with a bounded worker count, and a failure inside one record never
//! aborts the batch.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use time::{Date, OffsetDateTime};
use tokio::sync::Semaphore;

use deskcheck_core::domain::calendar::parse_iso_date;
use deskcheck_core::{
    Classification, ConfigError, EnrichedMark, Mark, MarkConfig, MarkReport, MarkSummary,
    PriceCache, PriceQuote, PriceSource, SourceError, Symbol,
};

use crate::audit::AuditLog;
use crate::normalizer::IdentifierNormalizer;

/// Deterministic mark grading engine.
pub struct MarkEngine {
    price_source: Arc<dyn PriceSource>,
    cache: PriceCache,
    config: MarkConfig,
    normalizer: Option<IdentifierNormalizer>,
    audit: Option<AuditLog>,
}

impl MarkEngine {
    pub fn new(price_source: Arc<dyn PriceSource>, config: MarkConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let audit = config.audit_path.as_ref().map(AuditLog::new);
        Ok(Self {
            price_source,
            cache: PriceCache::new(),
            config,
            normalizer: None,
            audit,
        })
    }

    /// Enable the unknown-ticker pre-check: marks whose ticker the
    /// normalizer rejects are classified NO_MARKET_DATA without a fetch.
    pub fn with_normalizer(mut self, normalizer: IdentifierNormalizer) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    pub fn cache(&self) -> &PriceCache {
        &self.cache
    }

    /// Classify a batch and attach the aggregate summary. Logged and
    /// audited (when configured); auditing never fails the run.
    pub async fn run(&self, records: &[Value]) -> MarkReport {
        let started = Instant::now();
        let enriched_marks = self.enrich(records).await;
        let summary = MarkSummary::from_marks(&enriched_marks);
        log::info!(
            "mark classification complete count={} duration_ms={:.2}",
            enriched_marks.len(),
            started.elapsed().as_secs_f64() * 1000.0
        );
        if let Some(audit) = &self.audit {
            if let Err(err) = audit.append(&enriched_marks) {
                log::warn!("audit write failed: {err}");
            }
        }
        MarkReport {
            enriched_marks,
            summary,
        }
    }

    /// Enrich marks concurrently, preserving input order. The price cache is
    /// the only shared mutable state; inserts are idempotent so racing
    /// workers are safe.
    pub async fn enrich(&self, records: &[Value]) -> Vec<EnrichedMark> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_workers));
        let valuation_date = self.valuation_date();

        let futures: Vec<_> = records
            .iter()
            .map(|record| {
                let semaphore = Arc::clone(&semaphore);
                async move {
                    // Acquire only fails on close, which never happens here.
                    let _permit = semaphore.acquire().await.ok();
                    self.enrich_one(record, valuation_date).await
                }
            })
            .collect();

        futures::future::join_all(futures).await
    }

    fn valuation_date(&self) -> Date {
        self.config
            .valuation_date
            .unwrap_or_else(|| OffsetDateTime::now_utc().date())
    }

    async fn enrich_one(&self, record: &Value, valuation_date: Date) -> EnrichedMark {
        let mark = match coerce_mark(record) {
            Ok(mark) => mark,
            Err(reason) => {
                // Malformed record: reject this mark, keep the batch going.
                let mark = best_effort_mark(record);
                return self.finish(mark, Err(reason), valuation_date);
            }
        };

        let as_of = match parse_iso_date(&mark.as_of_date) {
            Ok(date) => date,
            Err(_) => {
                let reason = format!("invalid as_of_date '{}'", mark.as_of_date);
                return self.finish(mark, Err(reason), valuation_date);
            }
        };

        let symbol = match Symbol::parse(&mark.ticker) {
            Ok(symbol) => symbol,
            Err(err) => {
                return self.finish(mark, Err(format!("invalid ticker: {err}")), valuation_date);
            }
        };

        if let Some(normalizer) = &self.normalizer {
            if normalizer.normalize(symbol.as_str(), 1).is_empty() {
                return self.finish(
                    mark,
                    Err(format!("ticker {symbol} not recognized")),
                    valuation_date,
                );
            }
        }

        let fetched = self.fetch_cached(&symbol, as_of).await;
        self.finish(mark, fetched.map_err(|e| e.to_string()), valuation_date)
    }

    /// Cache-first fetch with bounded retries; only successful quotes are
    /// cached.
    async fn fetch_cached(&self, symbol: &Symbol, date: Date) -> Result<PriceQuote, SourceError> {
        if let Some(quote) = self.cache.get(symbol, date).await {
            return Ok(quote);
        }

        let mut attempt: u32 = 0;
        loop {
            match self.price_source.close_price(symbol, date).await {
                Ok(quote) => {
                    self.cache.put(symbol.clone(), date, quote.clone()).await;
                    return Ok(quote);
                }
                Err(err) if err.retryable() && attempt < self.config.retry.max_retries => {
                    let delay = self.config.retry.delay_for_attempt(attempt);
                    log::warn!(
                        "price fetch retry symbol={symbol} attempt={} delay_ms={}",
                        attempt + 1,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Apply the fixed classification precedence and build the explanation.
    fn finish(
        &self,
        mark: Mark,
        fetched: Result<PriceQuote, String>,
        valuation_date: Date,
    ) -> EnrichedMark {
        let stale = parse_iso_date(&mark.as_of_date)
            .map(|as_of| (valuation_date - as_of).whole_days() > i64::from(self.config.stale_days))
            .unwrap_or(false);

        let (ok_threshold, review_threshold, override_applied) =
            self.config.tolerances_for(&mark.ticker);

        let mut market_price = None;
        let mut deviation_absolute = None;
        let mut deviation_percentage = None;
        let mut market_data_date = None;
        let mut error = None;

        let classification = match fetched {
            Err(reason) => {
                error = Some(reason);
                Classification::NoMarketData
            }
            Ok(quote) if quote.price <= 0.0 => {
                error = Some(format!("market price {} is not usable", quote.price));
                Classification::NoMarketData
            }
            Ok(quote) => {
                let abs = mark.internal_mark - quote.price;
                let pct = abs.abs() / quote.price;
                market_price = Some(quote.price);
                deviation_absolute = Some(abs);
                deviation_percentage = Some(pct);
                market_data_date = Some(quote.as_of_str());

                // Staleness beats the tolerance verdict but never beats a
                // failed fetch.
                if stale {
                    Classification::StaleMark
                } else if pct > review_threshold {
                    Classification::OutOfTolerance
                } else if pct > ok_threshold {
                    Classification::ReviewNeeded
                } else {
                    Classification::Ok
                }
            }
        };

        let explanation = explain(
            &mark,
            classification,
            market_price,
            deviation_percentage,
            error.as_deref(),
        );

        EnrichedMark {
            mark,
            market_price,
            deviation_absolute,
            deviation_percentage,
            classification,
            market_data_date,
            tolerance_override_applied: override_applied.then_some(true),
            error,
            explanation,
        }
    }
}

/// Coerce an untyped record into a typed `Mark`, uppercasing and trimming
/// the ticker. Failure yields a rejection reason, never a panic.
fn coerce_mark(record: &Value) -> Result<Mark, String> {
    let map = record
        .as_object()
        .ok_or_else(|| "mark record must be a JSON object".to_owned())?;

    let ticker = map
        .get("ticker")
        .and_then(Value::as_str)
        .map(|s| s.trim().to_ascii_uppercase())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "missing ticker".to_owned())?;

    let internal_mark = map
        .get("internal_mark")
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
        .ok_or_else(|| "missing or non-numeric internal_mark".to_owned())?;

    let as_of_date = map
        .get("as_of_date")
        .and_then(Value::as_str)
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "missing as_of_date".to_owned())?;

    let opt_string = |key: &str| {
        map.get(key)
            .and_then(Value::as_str)
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
    };

    Ok(Mark {
        ticker,
        internal_mark,
        as_of_date,
        notes: opt_string("notes"),
        source: opt_string("source"),
        position_id: opt_string("position_id"),
        portfolio_id: opt_string("portfolio_id"),
        instrument_type: opt_string("instrument_type"),
        currency: opt_string("currency").map(|c| c.to_ascii_uppercase()),
    })
}

/// Echo back whatever identifies a rejected record.
fn best_effort_mark(record: &Value) -> Mark {
    let ticker = record
        .get("ticker")
        .and_then(Value::as_str)
        .map(|s| s.trim().to_ascii_uppercase())
        .unwrap_or_default();
    let as_of_date = record
        .get("as_of_date")
        .and_then(Value::as_str)
        .map(|s| s.trim().to_owned())
        .unwrap_or_default();
    Mark {
        ticker,
        internal_mark: record
            .get("internal_mark")
            .and_then(Value::as_f64)
            .unwrap_or(f64::NAN),
        as_of_date,
        notes: None,
        source: None,
        position_id: None,
        portfolio_id: None,
        instrument_type: None,
        currency: None,
    }
}

fn explain(
    mark: &Mark,
    classification: Classification,
    market_price: Option<f64>,
    deviation_percentage: Option<f64>,
    error: Option<&str>,
) -> String {
    let pct = deviation_percentage.map(|p| p * 100.0);
    match classification {
        Classification::OutOfTolerance => format!(
            "{} mark {} vs market {} ({:.2}% off); check for stale data, corporate actions, or input error.",
            mark.ticker,
            mark.internal_mark,
            market_price.unwrap_or(f64::NAN),
            pct.unwrap_or(f64::NAN)
        ),
        Classification::ReviewNeeded => format!(
            "{} mark {} vs market {} ({:.2}% off); moderate variance, verify source.",
            mark.ticker,
            mark.internal_mark,
            market_price.unwrap_or(f64::NAN),
            pct.unwrap_or(f64::NAN)
        ),
        Classification::NoMarketData => match error {
            Some(reason) => format!(
                "{} missing market data; investigate data source or ticker mapping. {reason}",
                mark.ticker
            ),
            None => format!(
                "{} missing market data; investigate data source or ticker mapping.",
                mark.ticker
            ),
        },
        Classification::StaleMark => format!(
            "{} mark dated {} exceeds stale threshold; refresh required.",
            mark.ticker, mark.as_of_date
        ),
        Classification::Ok => format!("{} within tolerance.", mark.ticker),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerces_a_full_mark() {
        let mark = coerce_mark(&json!({
            "ticker": " aapl ",
            "internal_mark": 101.5,
            "as_of_date": "2024-06-05",
            "portfolio_id": "PB-1",
            "currency": "usd"
        }))
        .unwrap();
        assert_eq!(mark.ticker, "AAPL");
        assert_eq!(mark.internal_mark, 101.5);
        assert_eq!(mark.currency.as_deref(), Some("USD"));
    }

    #[test]
    fn rejects_marks_missing_core_fields() {
        assert!(coerce_mark(&json!({ "internal_mark": 1.0, "as_of_date": "2024-06-05" })).is_err());
        assert!(coerce_mark(&json!({ "ticker": "AAPL", "as_of_date": "2024-06-05" })).is_err());
        assert!(coerce_mark(&json!({ "ticker": "AAPL", "internal_mark": 1.0 })).is_err());
        assert!(coerce_mark(&json!("not an object")).is_err());
    }

    #[test]
    fn explanation_mentions_next_steps_when_out_of_tolerance() {
        let mark = coerce_mark(&json!({
            "ticker": "AAPL",
            "internal_mark": 106.0,
            "as_of_date": "2024-06-05"
        }))
        .unwrap();
        let text = explain(
            &mark,
            Classification::OutOfTolerance,
            Some(100.0),
            Some(0.06),
            None,
        );
        assert!(text.contains("6.00% off"));
        assert!(text.contains("corporate actions"));
    }
}
