use serde::Deserialize;
use std::fmt::Debug;
use std::sync::Arc;

const ASCII_LETTERS: &str = "abcdefghijklmnopqrstuvwxyz";
const ASCII_DIGITS: &str = "0123456789";

/// Supplies the alphabet an insertion or substitution may draw from.
///
/// An empty return value means no change is possible for that input.
pub trait CharSetProvider: Debug + Send + Sync {
    fn charset(&self, value: &str) -> String;
}

/// Picks lower-case ASCII letters, digits or both depending on what the value
/// itself contains, adding a space when the value contains whitespace.
#[derive(Debug, Default, Clone, Copy)]
pub struct AsciiCharSet;

impl CharSetProvider for AsciiCharSet {
    fn charset(&self, value: &str) -> String {
        if value.is_empty() {
            return String::new();
        }
        let has_space = value.chars().any(char::is_whitespace);
        let compact: Vec<char> = value.chars().filter(|c| !c.is_whitespace()).collect();

        let mut set = if !compact.is_empty() && compact.iter().all(|c| c.is_ascii_alphabetic()) {
            ASCII_LETTERS.to_string()
        } else if !compact.is_empty() && compact.iter().all(|c| c.is_ascii_digit()) {
            ASCII_DIGITS.to_string()
        } else if !compact.is_empty() && compact.iter().all(|c| c.is_ascii_alphanumeric()) {
            format!("{ASCII_LETTERS}{ASCII_DIGITS}")
        } else {
            // Punctuation or non-ASCII content: offer the full set.
            return format!("{ASCII_LETTERS}{ASCII_DIGITS} ");
        };
        if has_space {
            set.push(' ');
        }
        set
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CharSetKind {
    #[default]
    Ascii,
}

impl CharSetKind {
    pub fn build(self) -> Arc<dyn CharSetProvider> {
        match self {
            CharSetKind::Ascii => Arc::new(AsciiCharSet),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_charset_follows_value_content() {
        let provider = AsciiCharSet;
        assert_eq!(provider.charset("Peter"), ASCII_LETTERS);
        assert_eq!(provider.charset("2912"), ASCII_DIGITS);
        assert_eq!(provider.charset("a1b2"), format!("{ASCII_LETTERS}{ASCII_DIGITS}"));
        assert_eq!(provider.charset("mary ann"), format!("{ASCII_LETTERS} "));
        assert_eq!(provider.charset("12 34"), format!("{ASCII_DIGITS} "));
    }

    #[test]
    fn ascii_charset_is_empty_only_for_empty_input() {
        let provider = AsciiCharSet;
        assert_eq!(provider.charset(""), "");
        assert!(!provider.charset("o'neil").is_empty());
        assert!(!provider.charset("   ").is_empty());
    }
}
