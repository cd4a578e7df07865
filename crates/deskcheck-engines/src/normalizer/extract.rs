//! Identifier extraction from free-form text.
//!
//! Extraction is a declarative, ordered table of independent extractor
//! functions. Each extractor inspects the uppercased input and fills at most
//! one field of [`ExtractedIdentifiers`]; order only matters where a guard
//! says so (CUSIP yields to ISIN, since every ISIN body is also nine
//! alphanumerics).

use std::sync::LazyLock;

use regex::Regex;

static ISIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z]{2}[A-Z0-9]{9}[0-9])\b").expect("valid regex"));
static CUSIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z0-9]{9})\b").expect("valid regex"));
static CIK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(0{0,6}[0-9]{4,10})\b").expect("valid regex"));
static TICKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z]{1,5}(?:\.[A-Z])?)\b").expect("valid regex"));

const EXCHANGE_KEYWORDS: [&str; 4] = ["NASDAQ", "NYSE", "AMEX", "OTC"];

/// Candidate identifiers pulled out of one input string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedIdentifiers {
    pub isin: Option<String>,
    pub cusip: Option<String>,
    pub cik: Option<String>,
    pub symbol: Option<String>,
    pub exchange: Option<String>,
    pub country: Option<String>,
}

type Extractor = fn(&str, &mut ExtractedIdentifiers);

/// The extractor table, applied in order.
const EXTRACTORS: [Extractor; 6] = [
    extract_isin,
    extract_cusip,
    extract_cik,
    extract_ticker,
    extract_exchange,
    extract_country,
];

/// Run every extractor over the input. The input is uppercased once here;
/// extractors see the normalized text.
pub fn extract_identifiers(input: &str) -> ExtractedIdentifiers {
    let text = input.trim().to_ascii_uppercase();
    let mut out = ExtractedIdentifiers::default();
    for extract in EXTRACTORS {
        extract(&text, &mut out);
    }
    out
}

fn extract_isin(text: &str, out: &mut ExtractedIdentifiers) {
    if let Some(caps) = ISIN_RE.captures(text) {
        out.isin = Some(caps[1].to_owned());
    }
}

fn extract_cusip(text: &str, out: &mut ExtractedIdentifiers) {
    // Only attempted when no ISIN matched; an ISIN body would also match.
    if out.isin.is_some() {
        return;
    }
    if let Some(caps) = CUSIP_RE.captures(text) {
        out.cusip = Some(caps[1].to_owned());
    }
}

fn extract_cik(text: &str, out: &mut ExtractedIdentifiers) {
    if let Some(caps) = CIK_RE.captures(text) {
        out.cik = Some(format!("{:0>10}", &caps[1]));
    }
}

fn extract_ticker(text: &str, out: &mut ExtractedIdentifiers) {
    if let Some(caps) = TICKER_RE.captures(text) {
        let token = &caps[1];
        // Dot-suffix (share class) is discarded for directory matching.
        let symbol = token.split('.').next().unwrap_or(token);
        out.symbol = Some(symbol.to_owned());
    }
}

fn extract_exchange(text: &str, out: &mut ExtractedIdentifiers) {
    for keyword in EXCHANGE_KEYWORDS {
        if text.contains(keyword) {
            out.exchange = Some(keyword.to_owned());
            break;
        }
    }
}

fn extract_country(text: &str, out: &mut ExtractedIdentifiers) {
    if text.contains(" US ") || text.ends_with(" US") {
        out.country = Some("US".to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_isin_and_suppresses_cusip() {
        let out = extract_identifiers("US0378331005");
        assert_eq!(out.isin.as_deref(), Some("US0378331005"));
        assert!(out.cusip.is_none());
    }

    #[test]
    fn extracts_cusip_when_no_isin() {
        let out = extract_identifiers("037833100");
        assert!(out.isin.is_none());
        assert_eq!(out.cusip.as_deref(), Some("037833100"));
    }

    #[test]
    fn pads_cik_to_ten_digits() {
        let out = extract_identifiers("320193");
        assert_eq!(out.cik.as_deref(), Some("0000320193"));
    }

    #[test]
    fn extracts_ticker_and_discards_dot_suffix() {
        let out = extract_identifiers("brk.b");
        assert_eq!(out.symbol.as_deref(), Some("BRK"));
    }

    #[test]
    fn extracts_exchange_keyword() {
        let out = extract_identifiers("Apple Inc NASDAQ");
        assert_eq!(out.exchange.as_deref(), Some("NASDAQ"));
    }

    #[test]
    fn extracts_country_suffix() {
        let out = extract_identifiers("AAPL US");
        assert_eq!(out.country.as_deref(), Some("US"));
        assert_eq!(out.symbol.as_deref(), Some("AAPL"));
    }

    #[test]
    fn empty_input_extracts_nothing() {
        assert_eq!(extract_identifiers("   "), ExtractedIdentifiers::default());
    }
}
