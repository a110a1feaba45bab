//! Text normalization and tokenization

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Lower-case `text` and strip diacritics.
///
/// Decomposes to NFD and drops combining marks, so `"Pagamento Cartão"`
/// becomes `"pagamento cartao"`. Characters without a decomposition pass
/// through unchanged.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// Normalize and split on whitespace.
pub fn whitespace_tokens(text: &str) -> Vec<String> {
    normalize(text)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Normalize and extract word tokens of at least two characters.
///
/// Words are runs of alphanumerics, `_` and `-`; leading hyphens are dropped.
pub fn word_tokens(text: &str) -> Vec<String> {
    normalize(text)
        .split(|c: char| !(c.is_alphanumeric() || c == '_' || c == '-'))
        .map(|word| word.trim_start_matches('-'))
        .filter(|word| word.chars().count() >= 2)
        .map(str::to_string)
        .collect()
}
