//! # Deskcheck Engines
//!
//! The three deterministic decision engines of the deskcheck toolkit. Each
//! converts uncertain input into an explainable verdict with bounded
//! latency, degrading gracefully when upstream data is unavailable.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`normalizer`] | Free-form identifier resolution against the security directory |
//! | [`validator`] | Severity-graded trade validation check battery |
//! | [`marks`] | Mark-vs-market deviation classification with caching/retries |
//! | [`audit`] | Append-only JSONL audit trail |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use deskcheck_core::{NormalizerThresholds, SecurityDirectory};
//! use deskcheck_engines::IdentifierNormalizer;
//!
//! let directory = Arc::new(SecurityDirectory::new(load_securities())?);
//! let normalizer = IdentifierNormalizer::with_defaults(directory)?;
//! for candidate in normalizer.normalize("US0378331005", 5) {
//!     println!("{} ({:.2})", candidate.symbol(), candidate.confidence);
//! }
//! ```
//!
//! ## Failure semantics
//!
//! Malformed input yields issues or empty results, never panics; a market
//! data outage becomes a WARNING issue (trade validation) or a
//! `NO_MARKET_DATA` classification (mark classification); configuration
//! problems fail engine construction, not calls.

pub mod audit;
pub mod marks;
pub mod normalizer;
pub mod validator;

pub use audit::{AuditError, AuditLog};
pub use marks::MarkEngine;
pub use normalizer::extract::{extract_identifiers, ExtractedIdentifiers};
pub use normalizer::IdentifierNormalizer;
pub use validator::TradeValidator;
