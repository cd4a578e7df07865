//! Domain models: securities, normalization results, trades, issues, marks.

pub mod calendar;
pub mod issue;
pub mod mark;
pub mod normalization;
pub mod security;
pub mod symbol;
pub mod trade;

pub use issue::{Issue, IssueType, Severity, ValidationReport, ValidationStatus};
pub use mark::{Classification, EnrichedMark, Mark, MarkReport, MarkSummary};
pub use normalization::{MatchReason, NormalizationResult};
pub use security::{Security, SecurityDirectory};
pub use symbol::Symbol;
pub use trade::Trade;
