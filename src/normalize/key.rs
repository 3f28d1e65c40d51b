//! Stable lookup key for place/city names.
//!
//! The offline place database is keyed by this exact folding; equality of
//! keys is the only matching criterion. No fuzzy or edit-distance matching
//! happens anywhere downstream.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Fold a place name into its lookup key.
///
/// Casefolds, NFKD-decomposes and strips combining marks, drops non-ASCII,
/// maps remaining ASCII punctuation to spaces, and collapses whitespace.
/// Total and idempotent; empty input yields an empty key.
///
/// `normalize_key("Zürich") == "zurich"`, `normalize_key("St. Gallen") ==
/// "st gallen"`.
pub fn normalize_key(s: &str) -> String {
    let lowered = s.trim().to_lowercase();

    let mut ascii = String::with_capacity(lowered.len());
    for c in lowered.nfkd().filter(|c| !is_combining_mark(*c)) {
        match c {
            // Code points that full casefolding would expand but
            // `to_lowercase` leaves alone. The import tooling folds them,
            // so the key must too.
            'ß' => ascii.push_str("ss"),
            'æ' => ascii.push_str("ae"),
            'œ' => ascii.push_str("oe"),
            'ð' => ascii.push('d'),
            'þ' => ascii.push_str("th"),
            'a'..='z' | '0'..='9' => ascii.push(c),
            // ASCII punctuation separates tokens; anything non-ASCII left
            // after decomposition is dropped outright.
            c if c.is_ascii() => ascii.push(' '),
            _ => {}
        }
    }

    ascii.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diacritics_fold() {
        assert_eq!(normalize_key("Zürich"), "zurich");
        assert_eq!(normalize_key("zurich"), "zurich");
        assert_eq!(normalize_key("München"), "munchen");
        assert_eq!(normalize_key("Neuchâtel"), "neuchatel");
    }

    #[test]
    fn test_punctuation_separates() {
        assert_eq!(normalize_key("St. Gallen"), "st gallen");
        assert_eq!(normalize_key("Aix-en-Provence"), "aix en provence");
        assert_eq!(normalize_key("L'Aquila"), "l aquila");
    }

    #[test]
    fn test_casefold_expansions() {
        assert_eq!(normalize_key("Straße"), "strasse");
        assert_eq!(normalize_key("Œrlikon"), "oerlikon");
    }

    #[test]
    fn test_whitespace_collapse() {
        assert_eq!(normalize_key("  Le   Grand -Saconnex "), "le grand saconnex");
    }

    #[test]
    fn test_non_ascii_dropped() {
        assert_eq!(normalize_key("東京"), "");
        assert_eq!(normalize_key("東京 Tokyo"), "tokyo");
    }

    #[test]
    fn test_empty_and_idempotence() {
        assert_eq!(normalize_key(""), "");
        for s in ["Zürich", "St. Gallen", "  a b  ", "8001", "Straße"] {
            let once = normalize_key(s);
            assert_eq!(normalize_key(&once), once);
        }
    }
}
