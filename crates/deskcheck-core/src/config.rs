//! Engine configuration.
//!
//! Defaults live here and are merged with caller overrides at construction
//! time; engines never read process-wide state at call time. Invalid
//! thresholds fail construction (`ConfigError`), not the call.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use time::Date;

use crate::{ConfigError, RetryConfig};

fn check_unit_interval(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) || !value.is_finite() {
        return Err(ConfigError::ThresholdOutOfRange { name, value });
    }
    Ok(())
}

fn check_order(
    low_name: &'static str,
    low: f64,
    high_name: &'static str,
    high: f64,
) -> Result<(), ConfigError> {
    if low > high {
        return Err(ConfigError::ThresholdOrder {
            low_name,
            low,
            high_name,
            high,
        });
    }
    Ok(())
}

/// Confidence thresholds for the identifier normalizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizerThresholds {
    /// Confidence for an exact ISIN match.
    pub exact: f64,
    /// Confidence for exact CUSIP/CIK/symbol matches.
    pub high: f64,
    /// Lower edge of the ambiguity window.
    pub ambiguous_low: f64,
    /// Upper edge of the ambiguity window; results above it are never
    /// flagged ambiguous.
    pub ambiguous_high: f64,
    /// Best-match floor below which normalization returns nothing.
    pub reject: f64,
}

impl Default for NormalizerThresholds {
    fn default() -> Self {
        Self {
            exact: 1.0,
            high: 0.9,
            ambiguous_low: 0.6,
            ambiguous_high: 0.85,
            reject: 0.4,
        }
    }
}

impl NormalizerThresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unit_interval("exact", self.exact)?;
        check_unit_interval("high", self.high)?;
        check_unit_interval("ambiguous_low", self.ambiguous_low)?;
        check_unit_interval("ambiguous_high", self.ambiguous_high)?;
        check_unit_interval("reject", self.reject)?;
        check_order(
            "ambiguous_low",
            self.ambiguous_low,
            "ambiguous_high",
            self.ambiguous_high,
        )?;
        check_order("high", self.high, "exact", self.exact)?;
        Ok(())
    }
}

/// Configuration for the trade validation engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationConfig {
    /// Price deviation above which a WARNING issue fires.
    pub warning_threshold: f64,
    /// Price deviation above which an ERROR issue fires.
    pub error_threshold: f64,
    /// Reference currency trades are expected to settle in.
    pub reference_currency: String,
    /// Approved counterparty codes, matched case-insensitively.
    pub approved_counterparties: HashSet<String>,
    /// Expected settlement window in business days (T+N).
    pub settlement_days: u32,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        let approved = ["MS", "GS", "JPM", "BAML", "BARC", "CITI"]
            .into_iter()
            .map(str::to_owned)
            .collect();
        Self {
            warning_threshold: 0.02,
            error_threshold: 0.05,
            reference_currency: "USD".to_owned(),
            approved_counterparties: approved,
            settlement_days: 2,
        }
    }
}

impl ValidationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unit_interval("warning_threshold", self.warning_threshold)?;
        check_unit_interval("error_threshold", self.error_threshold)?;
        check_order(
            "warning_threshold",
            self.warning_threshold,
            "error_threshold",
            self.error_threshold,
        )?;
        Ok(())
    }

    pub fn counterparty_approved(&self, counterparty: &str) -> bool {
        let wanted = counterparty.trim().to_ascii_uppercase();
        self.approved_counterparties
            .iter()
            .any(|cp| cp.eq_ignore_ascii_case(&wanted))
    }
}

/// Per-instrument tolerance pair superseding the global thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToleranceOverride {
    pub ok_threshold: f64,
    pub review_threshold: f64,
}

impl ToleranceOverride {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unit_interval("override.ok_threshold", self.ok_threshold)?;
        check_unit_interval("override.review_threshold", self.review_threshold)?;
        check_order(
            "override.ok_threshold",
            self.ok_threshold,
            "override.review_threshold",
            self.review_threshold,
        )?;
        Ok(())
    }
}

/// Configuration for the mark classification engine.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkConfig {
    /// Deviation at or below this is OK.
    pub ok_threshold: f64,
    /// Deviation above this is OUT_OF_TOLERANCE; in between is REVIEW_NEEDED.
    pub review_threshold: f64,
    /// Marks older than this many days are STALE_MARK.
    pub stale_days: u32,
    /// Per-ticker tolerance overrides keyed by uppercase symbol.
    pub overrides: HashMap<String, ToleranceOverride>,
    /// Retry policy for market price fetches.
    pub retry: RetryConfig,
    /// Bounded worker count for batch enrichment.
    pub max_workers: usize,
    /// Reference date for staleness; `None` means today (UTC). Injectable so
    /// staleness is deterministic under test.
    pub valuation_date: Option<Date>,
    /// Append-only JSONL audit log destination, if any.
    pub audit_path: Option<PathBuf>,
}

impl Default for MarkConfig {
    fn default() -> Self {
        Self {
            ok_threshold: 0.02,
            review_threshold: 0.05,
            stale_days: 5,
            overrides: HashMap::new(),
            retry: RetryConfig::default(),
            max_workers: 4,
            valuation_date: None,
            audit_path: None,
        }
    }
}

impl MarkConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unit_interval("ok_threshold", self.ok_threshold)?;
        check_unit_interval("review_threshold", self.review_threshold)?;
        check_order(
            "ok_threshold",
            self.ok_threshold,
            "review_threshold",
            self.review_threshold,
        )?;
        for over in self.overrides.values() {
            over.validate()?;
        }
        if self.max_workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        Ok(())
    }

    /// Resolve the tolerance pair for a ticker: override first, global
    /// fallback otherwise. The bool reports whether an override applied.
    pub fn tolerances_for(&self, ticker: &str) -> (f64, f64, bool) {
        match self.overrides.get(&ticker.trim().to_ascii_uppercase()) {
            Some(over) => (over.ok_threshold, over.review_threshold, true),
            None => (self.ok_threshold, self.review_threshold, false),
        }
    }
}
