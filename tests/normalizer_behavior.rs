//! Behavioral coverage for the identifier normalizer: determinism,
//! confidence bounds, and ambiguity consistency.

use deskcheck_tests::{directory, normalizer, IdentifierNormalizer, NormalizerThresholds};

#[test]
fn isin_resolves_to_single_exact_result() {
    let results = normalizer().normalize("US0378331005", 5);

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].symbol(), "AAPL");
    assert_eq!(results[0].confidence, 1.0);
    assert_eq!(results[0].reasons.len(), 1);
    assert_eq!(results[0].reasons[0].as_str(), "isin_exact");
    assert!(!results[0].ambiguous);
}

#[test]
fn combined_ticker_and_exchange_text_resolves() {
    let results = normalizer().normalize("AAPL US NASDAQ", 5);
    assert_eq!(results[0].symbol(), "AAPL");
    assert!(results[0].confidence >= 0.9);
}

#[test]
fn same_input_always_yields_identical_ordered_results() {
    let normalizer = normalizer();
    for input in ["AAPL", "US0378331005", "ABCDABCE", "MSFT NASDAQ", "594918104"] {
        let first = normalizer.normalize(input, 5);
        let second = normalizer.normalize(input, 5);
        assert_eq!(first, second, "input {input}");
    }
}

#[test]
fn confidence_always_within_unit_interval() {
    let normalizer = normalizer();
    let inputs = [
        "AAPL",
        "aapl nasdaq",
        "US0378331005",
        "037833100",
        "320193",
        "ABCDABCE holdings",
        "completely unrelated text",
        "NYSE",
    ];
    for input in inputs {
        for result in normalizer.normalize(input, 10) {
            assert!(
                (0.0..=1.0).contains(&result.confidence),
                "input {input} produced confidence {}",
                result.confidence
            );
            assert!(!result.reasons.is_empty());
        }
    }
}

#[test]
fn empty_and_garbage_input_yield_empty_lists() {
    let normalizer = normalizer();
    assert!(normalizer.normalize("", 5).is_empty());
    assert!(normalizer.normalize("   \t ", 5).is_empty());
    assert!(normalizer.normalize("@@@@ ???", 5).is_empty());
}

#[test]
fn straddling_results_are_both_flagged_ambiguous() {
    // ABCD and ABCE each appear only as substrings: both score 0.7, inside
    // the [0.6, 0.85] window.
    let results = normalizer().normalize("ABCDABCE holdings", 5);
    assert!(results.len() >= 2);
    assert!(results[0].confidence <= 0.85);
    assert!(results[1].confidence >= 0.6);
    assert!(results[0].ambiguous);
    assert!(results[1].ambiguous);
}

#[test]
fn exact_top_result_is_never_ambiguous() {
    // Top is an exact ISIN hit at 1.0; the MSFT runner-up scores 0.9.
    let results = normalizer().normalize("US0378331005 MSFT", 5);
    assert_eq!(results[0].confidence, 1.0);
    assert!(!results[0].ambiguous);
}

#[test]
fn ambiguity_is_computed_before_top_k_truncation() {
    // With top_k = 1 the runner-up is not returned, but it must still flag
    // the result that is.
    let results = normalizer().normalize("ABCDABCE holdings", 1);
    assert_eq!(results.len(), 1);
    assert!(results[0].ambiguous);
}

#[test]
fn reject_threshold_is_caller_overridable() {
    let strict = IdentifierNormalizer::new(
        directory(),
        NormalizerThresholds {
            reject: 0.95,
            ..NormalizerThresholds::default()
        },
    )
    .expect("valid thresholds");

    // Plain symbol match scores 0.9, below the raised floor.
    assert!(strict.normalize("AAPL", 5).is_empty());
    // Exact ISIN still clears it.
    assert_eq!(strict.normalize("US0378331005", 5).len(), 1);
}

#[test]
fn invalid_thresholds_fail_construction() {
    let err = IdentifierNormalizer::new(
        directory(),
        NormalizerThresholds {
            reject: 2.0,
            ..NormalizerThresholds::default()
        },
    );
    assert!(err.is_err());
}

#[test]
fn top_k_limits_result_count() {
    let results = normalizer().normalize("NASDAQ AAPL", 1);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].symbol(), "AAPL");
}
