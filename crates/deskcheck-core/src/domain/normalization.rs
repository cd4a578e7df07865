use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::Security;

/// Reason tag justifying a normalization score.
///
/// Serialized as the snake_case tags downstream report consumers expect
/// (`isin_exact`, `symbol_in_text`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchReason {
    IsinExact,
    CusipExact,
    CikExact,
    SymbolExact,
    ExchangeMatch,
    CountryMatch,
    SymbolInText,
    ExchangeOnly,
}

impl MatchReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IsinExact => "isin_exact",
            Self::CusipExact => "cusip_exact",
            Self::CikExact => "cik_exact",
            Self::SymbolExact => "symbol_exact",
            Self::ExchangeMatch => "exchange_match",
            Self::CountryMatch => "country_match",
            Self::SymbolInText => "symbol_in_text",
            Self::ExchangeOnly => "exchange_only",
        }
    }
}

impl Display for MatchReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ranked candidate produced by the identifier normalizer.
///
/// Invariants: `confidence` lies in `[0, 1]` and `reasons` is non-empty
/// whenever `confidence > 0`. Results are never mutated after a
/// normalization call returns them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationResult {
    pub security: Security,
    pub confidence: f64,
    pub reasons: Vec<MatchReason>,
    pub ambiguous: bool,
}

impl NormalizationResult {
    pub fn new(security: Security, confidence: f64, reasons: Vec<MatchReason>) -> Self {
        Self {
            security,
            confidence: confidence.clamp(0.0, 1.0),
            reasons,
            ambiguous: false,
        }
    }

    pub fn symbol(&self) -> &str {
        self.security.symbol.as_str()
    }
}
