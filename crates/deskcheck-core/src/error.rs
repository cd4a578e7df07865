use thiserror::Error;

/// Validation and contract errors exposed by `deskcheck-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol root length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter: '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },
    #[error("symbol share-class suffix must be a single letter: '.{suffix}'")]
    SymbolBadClassSuffix { suffix: String },

    #[error("date must be ISO YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },
}

/// Construction-time configuration errors. These are fatal: an engine with an
/// invalid configuration is never handed out.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("security directory is empty")]
    EmptyDirectory,
    #[error("threshold '{name}' = {value} is outside [0, 1]")]
    ThresholdOutOfRange { name: &'static str, value: f64 },
    #[error("threshold '{low_name}' ({low}) must not exceed '{high_name}' ({high})")]
    ThresholdOrder {
        low_name: &'static str,
        low: f64,
        high_name: &'static str,
        high: f64,
    },
    #[error("max_workers must be at least 1")]
    ZeroWorkers,
}
