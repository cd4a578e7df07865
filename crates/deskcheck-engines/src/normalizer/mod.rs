//! Identifier normalization against the security directory.
//!
//! Resolves free-form ticker/ISIN/CUSIP/CIK text to ranked canonical
//! securities with a confidence score, reason tags, and an ambiguity flag.
//! Deterministic: for a fixed directory and thresholds, the same input text
//! always yields the same ordered results.

pub mod extract;

use std::sync::Arc;

use deskcheck_core::{
    ConfigError, MatchReason, NormalizationResult, NormalizerThresholds, Security,
    SecurityDirectory,
};

use extract::{extract_identifiers, ExtractedIdentifiers};

// Scores below the exact/high thresholds are fixed by the grading model,
// not caller-tunable: corroborated and partial matches rank between the
// ambiguity window and an exact hit.
const SYMBOL_EXACT_SCORE: f64 = 0.9;
const SYMBOL_EXCHANGE_SCORE: f64 = 0.95;
const SYMBOL_COUNTRY_SCORE: f64 = 0.92;
const SYMBOL_IN_TEXT_SCORE: f64 = 0.7;
const EXCHANGE_ONLY_SCORE: f64 = 0.3;

/// Deterministic resolver from free text to canonical securities.
#[derive(Debug, Clone)]
pub struct IdentifierNormalizer {
    directory: Arc<SecurityDirectory>,
    thresholds: NormalizerThresholds,
}

impl IdentifierNormalizer {
    /// Build a normalizer over a shared directory. Threshold validation is
    /// fatal here so calls can never observe a bad configuration.
    pub fn new(
        directory: Arc<SecurityDirectory>,
        thresholds: NormalizerThresholds,
    ) -> Result<Self, ConfigError> {
        thresholds.validate()?;
        Ok(Self {
            directory,
            thresholds,
        })
    }

    pub fn with_defaults(directory: Arc<SecurityDirectory>) -> Result<Self, ConfigError> {
        Self::new(directory, NormalizerThresholds::default())
    }

    pub fn thresholds(&self) -> &NormalizerThresholds {
        &self.thresholds
    }

    /// Resolve free text to ranked candidates.
    ///
    /// Never errors: empty or unscoreable input yields an empty list.
    /// Ambiguity is computed over the full scored set before the `top_k`
    /// slice, so a runner-up outside `top_k` still flags returned results.
    pub fn normalize(&self, text: &str, top_k: usize) -> Vec<NormalizationResult> {
        let input = text.trim();
        if input.is_empty() {
            return Vec::new();
        }

        let extracted = extract_identifiers(input);
        let mut scored: Vec<NormalizationResult> = self
            .directory
            .iter()
            .filter_map(|security| {
                let (confidence, reasons) = self.score(security, &extracted, input);
                (confidence > 0.0).then(|| {
                    NormalizationResult::new(security.clone(), confidence, reasons)
                })
            })
            .collect();

        // Stable sort: ties keep directory insertion order.
        scored.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        match scored.first() {
            None => {
                log::info!("normalize input={input} result=unknown");
                return Vec::new();
            }
            Some(best) if best.confidence < self.thresholds.reject => {
                log::info!("normalize input={input} result=unknown");
                return Vec::new();
            }
            Some(_) => {}
        }

        self.flag_ambiguous(&mut scored);

        let top = &scored[0];
        log::info!(
            "normalize input={input} top={} conf={:.2} ambiguous={}",
            top.symbol(),
            top.confidence,
            top.ambiguous
        );

        scored.truncate(top_k);
        scored
    }

    /// Flag every in-band result when the top two straddle the ambiguity
    /// window. An exact match above `ambiguous_high` is never flagged.
    fn flag_ambiguous(&self, scored: &mut [NormalizationResult]) {
        if scored.len() < 2 {
            return;
        }
        let top_in_band = scored[0].confidence <= self.thresholds.ambiguous_high;
        let runner_up_in_band = scored[1].confidence >= self.thresholds.ambiguous_low;
        if top_in_band && runner_up_in_band {
            for result in scored.iter_mut() {
                if result.confidence >= self.thresholds.ambiguous_low {
                    result.ambiguous = true;
                }
            }
        }
    }

    /// Score one security against the extracted fields and the raw text.
    ///
    /// Exact identifier matches short-circuit; everything else merges via
    /// max so corroborating evidence can only raise the score. Reasons
    /// accumulate and are non-empty whenever the score is positive.
    fn score(
        &self,
        security: &Security,
        extracted: &ExtractedIdentifiers,
        input: &str,
    ) -> (f64, Vec<MatchReason>) {
        if let Some(isin) = &extracted.isin {
            if !security.isin.is_empty() && security.isin.eq_ignore_ascii_case(isin) {
                return (self.thresholds.exact, vec![MatchReason::IsinExact]);
            }
        }
        if let Some(cusip) = &extracted.cusip {
            if !security.cusip.is_empty() && security.cusip.eq_ignore_ascii_case(cusip) {
                return (self.thresholds.high, vec![MatchReason::CusipExact]);
            }
        }
        if let Some(cik) = &extracted.cik {
            if !security.cik.is_empty() && security.cik == *cik {
                return (self.thresholds.high, vec![MatchReason::CikExact]);
            }
        }

        let mut score: f64 = 0.0;
        let mut reasons: Vec<MatchReason> = Vec::new();
        let upper_input = input.to_ascii_uppercase();

        let exchange_matches = extracted
            .exchange
            .as_deref()
            .is_some_and(|ex| security.exchange.contains(ex));

        if extracted
            .symbol
            .as_deref()
            .is_some_and(|sym| security.symbol.as_str() == sym)
        {
            score = score.max(SYMBOL_EXACT_SCORE);
            reasons.push(MatchReason::SymbolExact);
            if exchange_matches {
                score = score.max(SYMBOL_EXCHANGE_SCORE);
                reasons.push(MatchReason::ExchangeMatch);
            }
            if let (Some(want), Some(have)) = (&extracted.country, &security.country) {
                if want == have {
                    score = score.max(SYMBOL_COUNTRY_SCORE);
                    reasons.push(MatchReason::CountryMatch);
                }
            }
        }

        if upper_input.contains(security.symbol.as_str()) {
            score = score.max(SYMBOL_IN_TEXT_SCORE);
            reasons.push(MatchReason::SymbolInText);
        }

        if exchange_matches {
            score = score.max(EXCHANGE_ONLY_SCORE);
            reasons.push(MatchReason::ExchangeOnly);
        }

        (score, reasons)
    }
}

#[cfg(test)]
mod tests {
    use deskcheck_core::Symbol;

    use super::*;

    fn security(symbol: &str, isin: &str, cusip: &str, cik: &str, exchange: &str) -> Security {
        Security::new(
            Symbol::parse(symbol).unwrap(),
            isin,
            cusip,
            cik,
            "USD",
            exchange,
            "primary",
        )
        .with_country("US")
    }

    fn directory() -> Arc<SecurityDirectory> {
        Arc::new(
            SecurityDirectory::new(vec![
                security("AAPL", "US0378331005", "037833100", "0000320193", "NASDAQ"),
                security("MSFT", "US5949181045", "594918104", "0000789019", "NASDAQ"),
                security("ABCD", "US1111111116", "111111111", "0001111111", "NYSE"),
                security("ABCE", "US2222222229", "222222222", "0002222222", "NYSE"),
            ])
            .unwrap(),
        )
    }

    fn normalizer() -> IdentifierNormalizer {
        IdentifierNormalizer::with_defaults(directory()).unwrap()
    }

    #[test]
    fn isin_match_is_exact_and_unambiguous() {
        let results = normalizer().normalize("US0378331005", 5);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].symbol(), "AAPL");
        assert_eq!(results[0].confidence, 1.0);
        assert_eq!(results[0].reasons, vec![MatchReason::IsinExact]);
        assert!(!results[0].ambiguous);
    }

    #[test]
    fn cusip_match_scores_high() {
        let results = normalizer().normalize("594918104", 5);
        assert_eq!(results[0].symbol(), "MSFT");
        assert_eq!(results[0].confidence, 0.9);
        assert_eq!(results[0].reasons, vec![MatchReason::CusipExact]);
    }

    #[test]
    fn cik_match_scores_high() {
        let results = normalizer().normalize("320193", 5);
        assert_eq!(results[0].symbol(), "AAPL");
        assert_eq!(results[0].confidence, 0.9);
        assert_eq!(results[0].reasons, vec![MatchReason::CikExact]);
    }

    #[test]
    fn symbol_with_exchange_gets_corroboration_bonus() {
        let results = normalizer().normalize("AAPL NASDAQ", 5);
        assert_eq!(results[0].symbol(), "AAPL");
        assert_eq!(results[0].confidence, 0.95);
        assert!(results[0].reasons.contains(&MatchReason::SymbolExact));
        assert!(results[0].reasons.contains(&MatchReason::ExchangeMatch));
        // The plain exchange tag is recorded alongside the corroboration tag.
        assert!(results[0].reasons.contains(&MatchReason::ExchangeOnly));
    }

    #[test]
    fn symbol_with_country_gets_smaller_bonus() {
        let results = normalizer().normalize("AAPL US", 5);
        assert_eq!(results[0].confidence, 0.92);
        assert!(results[0].reasons.contains(&MatchReason::CountryMatch));
    }

    #[test]
    fn empty_input_yields_empty_list() {
        assert!(normalizer().normalize("", 5).is_empty());
        assert!(normalizer().normalize("   ", 5).is_empty());
    }

    #[test]
    fn garbage_input_yields_empty_list() {
        assert!(normalizer().normalize("!!!???", 5).is_empty());
    }

    #[test]
    fn exchange_only_score_is_rejected_by_floor() {
        // 0.3 exchange-only score sits below the 0.4 reject floor.
        assert!(normalizer().normalize("NYSE", 5).is_empty());
    }

    #[test]
    fn exact_symbol_above_window_is_not_flagged() {
        // ABCD alone is a 0.9 symbol_exact hit, above ambiguous_high.
        let results = normalizer().normalize("ABCD", 5);
        assert_eq!(results.len(), 1);
        assert!(!results[0].ambiguous);
    }

    #[test]
    fn ambiguity_flags_in_band_results() {
        // Both four-letter roots appear as substrings only: each scores 0.7,
        // inside [0.6, 0.85], so both get flagged.
        let results = normalizer().normalize("ABCDABCE holdings", 5);
        assert!(results.len() >= 2);
        assert!(results[0].ambiguous);
        assert!(results[1].ambiguous);
    }

    #[test]
    fn exact_match_never_flagged_despite_runner_up() {
        // AAPL ISIN plus MSFT substring: top is exact (1.0 > ambiguous_high).
        let results = normalizer().normalize("US0378331005 MSFT", 5);
        assert_eq!(results[0].confidence, 1.0);
        assert!(!results[0].ambiguous);
    }

    #[test]
    fn ambiguity_survives_top_k_truncation() {
        let results = normalizer().normalize("ABCDABCE holdings", 1);
        assert_eq!(results.len(), 1);
        assert!(results[0].ambiguous);
    }

    #[test]
    fn normalization_is_deterministic() {
        let normalizer = normalizer();
        let first = normalizer.normalize("AAPL NASDAQ", 3);
        let second = normalizer.normalize("AAPL NASDAQ", 3);
        assert_eq!(first, second);
    }

    #[test]
    fn reasons_never_empty_for_positive_confidence() {
        for input in ["AAPL", "US0378331005", "MSFT NASDAQ", "ABCDABCE"] {
            for result in normalizer().normalize(input, 10) {
                assert!(result.confidence > 0.0);
                assert!(!result.reasons.is_empty(), "input {input}");
            }
        }
    }
}
