use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Severity grading for a validation issue. ERROR always dominates the
/// aggregate status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of a trade validation issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    MissingField,
    SchemaValidation,
    IdentifierMismatch,
    CurrencyMismatch,
    PriceTolerance,
    Counterparty,
    SettlementDate,
}

impl IssueType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::SchemaValidation => "schema_validation",
            Self::IdentifierMismatch => "identifier_mismatch",
            Self::CurrencyMismatch => "currency_mismatch",
            Self::PriceTolerance => "price_tolerance",
            Self::Counterparty => "counterparty",
            Self::SettlementDate => "settlement_date",
        }
    }
}

impl Display for IssueType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single finding emitted by a trade validation check. Pure value type;
/// issues from one run are aggregated and never merged across runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub severity: Severity,
    pub message: String,
    pub field: String,
}

impl Issue {
    pub fn warning(
        issue_type: IssueType,
        message: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self {
            issue_type,
            severity: Severity::Warning,
            message: message.into(),
            field: field.into(),
        }
    }

    pub fn error(
        issue_type: IssueType,
        message: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self {
            issue_type,
            severity: Severity::Error,
            message: message.into(),
            field: field.into(),
        }
    }
}

/// Aggregate status of a validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValidationStatus {
    Ok,
    Warning,
    Error,
}

impl ValidationStatus {
    /// A single ERROR issue anywhere dominates; WARNING beats OK.
    pub fn from_issues(issues: &[Issue]) -> Self {
        if issues.iter().any(|i| i.severity == Severity::Error) {
            Self::Error
        } else if issues.iter().any(|i| i.severity == Severity::Warning) {
            Self::Warning
        } else {
            Self::Ok
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }
}

impl Display for ValidationStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a trade validation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub status: ValidationStatus,
    pub issues: Vec<Issue>,
    pub explanation: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_dominates_status() {
        let issues = vec![
            Issue::warning(IssueType::Counterparty, "not approved", "counterparty"),
            Issue::error(IssueType::SettlementDate, "settle before trade", "settle_dt"),
            Issue::warning(IssueType::CurrencyMismatch, "non-USD", "currency"),
        ];
        assert_eq!(ValidationStatus::from_issues(&issues), ValidationStatus::Error);
    }

    #[test]
    fn warnings_without_errors_yield_warning() {
        let issues = vec![Issue::warning(
            IssueType::PriceTolerance,
            "market data unavailable",
            "price",
        )];
        assert_eq!(
            ValidationStatus::from_issues(&issues),
            ValidationStatus::Warning
        );
    }

    #[test]
    fn no_issues_is_ok() {
        assert_eq!(ValidationStatus::from_issues(&[]), ValidationStatus::Ok);
    }

    #[test]
    fn issue_serializes_with_expected_field_names() {
        let issue = Issue::error(IssueType::MissingField, "Missing ticker", "ticker");
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["type"], "missing_field");
        assert_eq!(json["severity"], "ERROR");
        assert_eq!(json["field"], "ticker");
    }
}
