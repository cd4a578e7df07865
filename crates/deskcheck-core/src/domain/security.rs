use serde::{Deserialize, Serialize};

use crate::{ConfigError, Symbol};

/// Canonical security record from the reference master.
///
/// Loaded once per process and treated as read-only by every consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Security {
    pub symbol: Symbol,
    pub isin: String,
    pub cusip: String,
    #[serde(default)]
    pub cik: String,
    pub currency: String,
    pub exchange: String,
    pub pricing_source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl Security {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        symbol: Symbol,
        isin: impl Into<String>,
        cusip: impl Into<String>,
        cik: impl Into<String>,
        currency: impl Into<String>,
        exchange: impl Into<String>,
        pricing_source: impl Into<String>,
    ) -> Self {
        Self {
            symbol,
            isin: isin.into().to_ascii_uppercase(),
            cusip: cusip.into().to_ascii_uppercase(),
            cik: cik.into(),
            currency: currency.into().to_ascii_uppercase(),
            exchange: exchange.into().to_ascii_uppercase(),
            pricing_source: pricing_source.into(),
            name: None,
            country: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into().to_ascii_uppercase());
        self
    }
}

/// Flat, insertion-ordered directory of canonical securities.
///
/// Construction is the single point where reference data enters the system;
/// an empty directory is a configuration error, not a runtime condition.
/// The directory is immutable after construction and safe to share across
/// threads behind an `Arc` without locking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityDirectory {
    securities: Vec<Security>,
}

impl SecurityDirectory {
    pub fn new(securities: Vec<Security>) -> Result<Self, ConfigError> {
        if securities.is_empty() {
            return Err(ConfigError::EmptyDirectory);
        }
        Ok(Self { securities })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Security> {
        self.securities.iter()
    }

    pub fn len(&self) -> usize {
        self.securities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.securities.is_empty()
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.securities
            .iter()
            .map(|sec| sec.symbol.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Security {
        Security::new(
            Symbol::parse("AAPL").unwrap(),
            "US0378331005",
            "037833100",
            "0000320193",
            "USD",
            "NASDAQ",
            "primary",
        )
    }

    #[test]
    fn empty_directory_is_a_config_error() {
        let err = SecurityDirectory::new(Vec::new()).expect_err("must fail");
        assert_eq!(err, ConfigError::EmptyDirectory);
    }

    #[test]
    fn preserves_insertion_order() {
        let mut second = sample();
        second.symbol = Symbol::parse("MSFT").unwrap();
        let dir = SecurityDirectory::new(vec![sample(), second]).unwrap();
        assert_eq!(dir.symbols(), vec!["AAPL", "MSFT"]);
    }
}
