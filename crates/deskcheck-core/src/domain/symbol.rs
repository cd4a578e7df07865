use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_ROOT_LEN: usize = 5;

/// Normalized exchange ticker: one to five letters, optionally followed by
/// a dot and a single-letter share class ("BRK.B"). This is the same
/// grammar the identifier extraction applies to free text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Parse and normalize a ticker to uppercase.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let normalized = input.trim().to_ascii_uppercase();
        if normalized.is_empty() {
            return Err(ValidationError::EmptySymbol);
        }

        let (root, class) = match normalized.split_once('.') {
            Some((root, class)) => (root, Some(class)),
            None => (normalized.as_str(), None),
        };

        if root.is_empty() {
            return Err(ValidationError::SymbolInvalidStart { ch: '.' });
        }
        let root_len = root.chars().count();
        if root_len > MAX_ROOT_LEN {
            return Err(ValidationError::SymbolTooLong {
                len: root_len,
                max: MAX_ROOT_LEN,
            });
        }
        for (index, ch) in root.char_indices() {
            if !ch.is_ascii_alphabetic() {
                return Err(if index == 0 {
                    ValidationError::SymbolInvalidStart { ch }
                } else {
                    ValidationError::SymbolInvalidChar { ch, index }
                });
            }
        }

        if let Some(class) = class {
            let mut chars = class.chars();
            let single_letter = matches!(
                (chars.next(), chars.next()),
                (Some(ch), None) if ch.is_ascii_alphabetic()
            );
            if !single_letter {
                return Err(ValidationError::SymbolBadClassSuffix {
                    suffix: class.to_owned(),
                });
            }
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Symbol {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Symbol {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_normalizes_ticker() {
        let parsed = Symbol::parse(" aapl ").expect("ticker should parse");
        assert_eq!(parsed.as_str(), "AAPL");
    }

    #[test]
    fn keeps_share_class_suffix() {
        let parsed = Symbol::parse("brk.b").expect("ticker should parse");
        assert_eq!(parsed.as_str(), "BRK.B");
    }

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(
            Symbol::parse("   "),
            Err(ValidationError::EmptySymbol)
        ));
    }

    #[test]
    fn rejects_root_longer_than_five_letters() {
        let err = Symbol::parse("ABCDEF").expect_err("must fail");
        assert!(matches!(
            err,
            ValidationError::SymbolTooLong { len: 6, max: 5 }
        ));
    }

    #[test]
    fn rejects_non_letter_start() {
        let err = Symbol::parse("1AAPL").expect_err("must fail");
        assert!(matches!(err, ValidationError::SymbolInvalidStart { .. }));
    }

    #[test]
    fn rejects_non_letter_root_chars() {
        let err = Symbol::parse("AA4L").expect_err("must fail");
        assert!(matches!(
            err,
            ValidationError::SymbolInvalidChar { ch: '4', index: 2 }
        ));
    }

    #[test]
    fn rejects_multi_letter_class_suffix() {
        let err = Symbol::parse("BRK.BB").expect_err("must fail");
        assert!(matches!(
            err,
            ValidationError::SymbolBadClassSuffix { .. }
        ));
    }

    #[test]
    fn rejects_dangling_or_leading_dot() {
        assert!(matches!(
            Symbol::parse("BRK."),
            Err(ValidationError::SymbolBadClassSuffix { .. })
        ));
        assert!(matches!(
            Symbol::parse(".B"),
            Err(ValidationError::SymbolInvalidStart { ch: '.' })
        ));
    }
}
