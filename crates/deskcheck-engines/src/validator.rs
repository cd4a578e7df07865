//! Trade validation engine.
//!
//! Runs a fixed battery of checks against a loosely-typed trade record and
//! reports severity-ranked issues. The engine collects every issue it can
//! find (it is not fail-fast) and never panics on malformed input: coercion
//! failures become `missing_field`/`schema_validation` issues and the
//! remaining checks run on whatever fields did coerce.

use std::sync::Arc;

use serde_json::Value;
use time::Date;

use deskcheck_core::domain::calendar::{add_business_days, format_iso_date, is_weekend, parse_iso_date};
use deskcheck_core::{
    ConfigError, Issue, IssueType, PriceSource, Symbol, Trade, ValidationConfig, ValidationReport,
    ValidationStatus,
};

use crate::normalizer::IdentifierNormalizer;

const REQUIRED_FIELDS: [&str; 7] = [
    "ticker",
    "quantity",
    "price",
    "currency",
    "counterparty",
    "trade_dt",
    "settle_dt",
];

/// Trade record after coercion. Every field is optional; checks run on what
/// survived and the coercion issues carry the rest of the story.
#[derive(Debug, Clone, Default)]
struct CoercedTrade {
    ticker: Option<String>,
    price: Option<f64>,
    currency: Option<String>,
    counterparty: Option<String>,
    trade_dt: Option<Date>,
    settle_dt: Option<Date>,
}

/// Severity-graded trade validator.
pub struct TradeValidator {
    normalizer: IdentifierNormalizer,
    price_source: Arc<dyn PriceSource>,
    config: ValidationConfig,
}

impl TradeValidator {
    pub fn new(
        normalizer: IdentifierNormalizer,
        price_source: Arc<dyn PriceSource>,
        config: ValidationConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            normalizer,
            price_source,
            config,
        })
    }

    /// Validate a trade supplied as JSON text.
    ///
    /// Unparseable text becomes a single `schema_validation` ERROR report
    /// rather than an error return.
    pub async fn run_json(&self, raw: &str) -> ValidationReport {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => self.run(&value).await,
            Err(err) => schema_failure(format!("Trade record is not valid JSON: {err}")),
        }
    }

    /// Validate an already-typed trade through the same check battery.
    pub async fn run_trade(&self, trade: &Trade) -> ValidationReport {
        match serde_json::to_value(trade) {
            Ok(record) => self.run(&record).await,
            Err(err) => schema_failure(format!("Trade record could not be encoded: {err}")),
        }
    }

    /// Run the full check battery against one trade record.
    pub async fn run(&self, record: &Value) -> ValidationReport {
        let (trade, mut issues) = coerce(record);

        issues.extend(self.check_identifier(&trade));
        issues.extend(self.check_currency(&trade));
        issues.extend(self.check_price(&trade).await);
        issues.extend(self.check_counterparty(&trade));
        issues.extend(self.check_settlement(&trade));

        let status = ValidationStatus::from_issues(&issues);
        let explanation = explain(status, &issues);
        log::info!(
            "trade validation ticker={} status={} issues={}",
            trade.ticker.as_deref().unwrap_or("?"),
            status,
            issues.len()
        );
        ValidationReport {
            status,
            issues,
            explanation,
        }
    }

    fn check_identifier(&self, trade: &CoercedTrade) -> Vec<Issue> {
        let Some(ticker) = trade.ticker.as_deref() else {
            return Vec::new();
        };
        let results = self.normalizer.normalize(ticker, 3);
        let Some(top) = results.first() else {
            return vec![Issue::error(
                IssueType::IdentifierMismatch,
                "Ticker not recognized",
                "ticker",
            )];
        };
        let mut issues = Vec::new();
        if top.ambiguous {
            issues.push(Issue::warning(
                IssueType::IdentifierMismatch,
                "Ticker ambiguous",
                "ticker",
            ));
        }
        if top.confidence < self.normalizer.thresholds().high {
            issues.push(Issue::warning(
                IssueType::IdentifierMismatch,
                "Low-confidence match",
                "ticker",
            ));
        }
        issues
    }

    fn check_currency(&self, trade: &CoercedTrade) -> Vec<Issue> {
        let Some(currency) = trade.currency.as_deref() else {
            return Vec::new();
        };
        if currency != self.config.reference_currency {
            return vec![Issue::warning(
                IssueType::CurrencyMismatch,
                format!(
                    "Trade currency {currency} differs from reference currency {}",
                    self.config.reference_currency
                ),
                "currency",
            )];
        }
        Vec::new()
    }

    async fn check_price(&self, trade: &CoercedTrade) -> Vec<Issue> {
        let (Some(ticker), Some(price), Some(trade_dt)) =
            (trade.ticker.as_deref(), trade.price, trade.trade_dt)
        else {
            return Vec::new();
        };
        let Ok(symbol) = Symbol::parse(ticker) else {
            return Vec::new();
        };

        // Data-source outages degrade to a warning; they never fail a trade.
        let quote = match self.price_source.close_price(&symbol, trade_dt).await {
            Ok(quote) => quote,
            Err(err) => {
                return vec![Issue::warning(
                    IssueType::PriceTolerance,
                    format!("Market data unavailable: {err}"),
                    "price",
                )];
            }
        };
        if quote.price <= 0.0 {
            return vec![Issue::warning(
                IssueType::PriceTolerance,
                format!("Market price {} is not usable", quote.price),
                "price",
            )];
        }

        let deviation = (price - quote.price).abs() / quote.price;
        if deviation > self.config.error_threshold {
            vec![Issue::error(
                IssueType::PriceTolerance,
                format!("Price deviates {:.2}% from market", deviation * 100.0),
                "price",
            )]
        } else if deviation > self.config.warning_threshold {
            vec![Issue::warning(
                IssueType::PriceTolerance,
                format!("Price deviates {:.2}% from market", deviation * 100.0),
                "price",
            )]
        } else {
            Vec::new()
        }
    }

    fn check_counterparty(&self, trade: &CoercedTrade) -> Vec<Issue> {
        let Some(counterparty) = trade.counterparty.as_deref() else {
            return Vec::new();
        };
        if !self.config.counterparty_approved(counterparty) {
            return vec![Issue::warning(
                IssueType::Counterparty,
                "Counterparty not in approved list",
                "counterparty",
            )];
        }
        Vec::new()
    }

    /// Settlement rules, first match wins: before trade date, weekend,
    /// earlier than T+N, later than T+N by more than one day.
    fn check_settlement(&self, trade: &CoercedTrade) -> Vec<Issue> {
        let (Some(trade_dt), Some(settle_dt)) = (trade.trade_dt, trade.settle_dt) else {
            return Vec::new();
        };

        if settle_dt < trade_dt {
            return vec![Issue::error(
                IssueType::SettlementDate,
                "Settlement before trade date",
                "settle_dt",
            )];
        }
        if is_weekend(settle_dt) {
            return vec![Issue::error(
                IssueType::SettlementDate,
                format!("Settlement {} falls on a weekend", format_iso_date(settle_dt)),
                "settle_dt",
            )];
        }

        let expected = add_business_days(trade_dt, self.config.settlement_days);
        if settle_dt < expected {
            return vec![Issue::error(
                IssueType::SettlementDate,
                format!(
                    "Settlement {} earlier than expected T+{} ({})",
                    format_iso_date(settle_dt),
                    self.config.settlement_days,
                    format_iso_date(expected)
                ),
                "settle_dt",
            )];
        }
        if (settle_dt - expected).whole_days() > 1 {
            return vec![Issue::warning(
                IssueType::SettlementDate,
                format!(
                    "Settlement {} later than expected T+{} ({})",
                    format_iso_date(settle_dt),
                    self.config.settlement_days,
                    format_iso_date(expected)
                ),
                "settle_dt",
            )];
        }
        Vec::new()
    }
}

/// Convert an untyped record into a `CoercedTrade`, collecting
/// `missing_field` and `schema_validation` issues instead of failing.
fn coerce(record: &Value) -> (CoercedTrade, Vec<Issue>) {
    let mut issues = Vec::new();
    let mut trade = CoercedTrade::default();

    let Some(map) = record.as_object() else {
        issues.push(Issue::error(
            IssueType::SchemaValidation,
            "Trade record must be a JSON object",
            "record",
        ));
        return (trade, issues);
    };

    for field in REQUIRED_FIELDS {
        let missing = match map.get(field) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        };
        if missing {
            issues.push(Issue::error(
                IssueType::MissingField,
                format!("Missing {field}"),
                field,
            ));
        }
    }

    trade.ticker = coerce_string(map.get("ticker")).map(|s| s.to_ascii_uppercase());
    trade.counterparty = coerce_string(map.get("counterparty"));

    // Quantity only has to be a positive number; no later check reads it.
    coerce_positive_number(map.get("quantity"), "quantity", &mut issues);
    trade.price = coerce_positive_number(map.get("price"), "price", &mut issues);

    if let Some(currency) = coerce_string(map.get("currency")) {
        let upper = currency.to_ascii_uppercase();
        if upper.len() == 3 && upper.chars().all(|c| c.is_ascii_alphabetic()) {
            trade.currency = Some(upper);
        } else {
            issues.push(Issue::error(
                IssueType::SchemaValidation,
                format!("currency must be a 3-letter ISO code, got '{currency}'"),
                "currency",
            ));
        }
    }

    trade.trade_dt = coerce_date(map.get("trade_dt"), "trade_dt", &mut issues);
    trade.settle_dt = coerce_date(map.get("settle_dt"), "settle_dt", &mut issues);

    (trade, issues)
}

fn coerce_string(value: Option<&Value>) -> Option<String> {
    let raw = value?.as_str()?.trim();
    (!raw.is_empty()).then(|| raw.to_owned())
}

fn coerce_positive_number(
    value: Option<&Value>,
    field: &'static str,
    issues: &mut Vec<Issue>,
) -> Option<f64> {
    let value = match value {
        None | Some(Value::Null) => return None,
        Some(v) => v,
    };
    let number = match value.as_f64() {
        Some(n) if n.is_finite() => n,
        _ => {
            issues.push(Issue::error(
                IssueType::SchemaValidation,
                format!("{field} must be a number"),
                field,
            ));
            return None;
        }
    };
    if number <= 0.0 {
        issues.push(Issue::error(
            IssueType::SchemaValidation,
            format!("{field} must be positive"),
            field,
        ));
        return None;
    }
    Some(number)
}

fn coerce_date(value: Option<&Value>, field: &'static str, issues: &mut Vec<Issue>) -> Option<Date> {
    let raw = match value {
        None | Some(Value::Null) => return None,
        Some(Value::String(s)) if s.trim().is_empty() => return None,
        Some(v) => v,
    };
    let Some(text) = raw.as_str() else {
        issues.push(Issue::error(
            IssueType::SchemaValidation,
            format!("{field} must be an ISO date string"),
            field,
        ));
        return None;
    };
    match parse_iso_date(text) {
        Ok(date) => Some(date),
        Err(_) => {
            issues.push(Issue::error(
                IssueType::SchemaValidation,
                format!("{field} is not a valid ISO date: '{text}'"),
                field,
            ));
            None
        }
    }
}

/// Report for input that never reached the check battery.
fn schema_failure(message: String) -> ValidationReport {
    let issues = vec![Issue::error(IssueType::SchemaValidation, message, "record")];
    let status = ValidationStatus::from_issues(&issues);
    let explanation = explain(status, &issues);
    ValidationReport {
        status,
        issues,
        explanation,
    }
}

/// Deterministic explanation string: status, issue count, then each issue in
/// emission order.
fn explain(status: ValidationStatus, issues: &[Issue]) -> String {
    if issues.is_empty() {
        return "All checks passed.".to_owned();
    }
    let mut parts = vec![format!("{status}: {} issue(s).", issues.len())];
    for issue in issues {
        parts.push(format!(
            "{} {} on {}: {}",
            issue.severity, issue.issue_type, issue.field, issue.message
        ));
    }
    parts.join(" ")
}
