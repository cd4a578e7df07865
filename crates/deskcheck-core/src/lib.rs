//! # Deskcheck Core
//!
//! Core contracts and domain types for the deskcheck trading-desk grading
//! toolkit.
//!
//! ## Overview
//!
//! This crate provides the foundations shared by the three decision engines
//! in `deskcheck-engines`:
//!
//! - **Canonical domain models** for securities, trades, issues, and marks
//! - **Security directory** loaded once and shared read-only
//! - **Price source trait**: the single I/O boundary of the system
//! - **Retry and caching** for resilient, bounded market data fetches
//! - **Explicit configuration** validated at construction time
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cache`] | Close-price cache keyed by `(symbol, date)` |
//! | [`config`] | Engine configuration with validated defaults |
//! | [`domain`] | Domain models (Security, Trade, Issue, Mark) |
//! | [`error`] | Core error types |
//! | [`price_source`] | Market price lookup contract |
//! | [`retry`] | Bounded retry with fixed/linear backoff |
//!
//! ## Error Handling
//!
//! Input errors become issues or empty results so callers always obtain a
//! report; upstream data errors degrade rather than abort; configuration
//! errors are fatal at construction:
//!
//! ```rust
//! use deskcheck_core::{ConfigError, SecurityDirectory};
//!
//! let err = SecurityDirectory::new(Vec::new()).unwrap_err();
//! assert_eq!(err, ConfigError::EmptyDirectory);
//! ```

pub mod cache;
pub mod config;
pub mod domain;
pub mod error;
pub mod price_source;
pub mod retry;

// Re-export commonly used types at crate root for convenience

// Caching
pub use cache::PriceCache;

// Configuration
pub use config::{MarkConfig, NormalizerThresholds, ToleranceOverride, ValidationConfig};

// Domain models
pub use domain::{
    Classification, EnrichedMark, Issue, IssueType, Mark, MarkReport, MarkSummary, MatchReason,
    NormalizationResult, Security, SecurityDirectory, Severity, Symbol, Trade, ValidationReport,
    ValidationStatus,
};

// Error types
pub use error::{ConfigError, ValidationError};

// Price source contract
pub use price_source::{PriceQuote, PriceSource, SourceError, SourceErrorKind};

// Retry logic
pub use retry::{Backoff, RetryConfig};
