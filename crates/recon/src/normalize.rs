//! Establishment-name canonicalization.
//!
//! Both sources spell the same school differently ("École Polytechnique",
//! "ECOLE-POLYTECHNIQUE", "ecole polytechnique"). The normalized key folds case,
//! strips accents and drops everything but ASCII letters and digits, and the
//! reconciler joins on exact key equality.
//!
//! Two different names that fold to the same key are treated as the same
//! establishment. There is no edit-distance matching.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Join key derived from an establishment name. Only compared, never shown.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedKey(String);

impl NormalizedKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for NormalizedKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Lowercase, NFD, strip combining marks, keep `[a-z0-9]`.
pub fn normalize(name: &str) -> NormalizedKey {
    let key: String = fold_accents(&name.to_lowercase())
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    NormalizedKey(key.trim().to_string())
}

/// Decompose and drop combining marks, leaving everything else in place.
///
/// Shared with the catalog suggestions, which compare accent-insensitively but
/// keep spaces and punctuation.
pub fn fold_accents(s: &str) -> String {
    s.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accents_case_and_punctuation_fold_together() {
        let a = normalize("École Polytechnique");
        let b = normalize("ecole polytechnique");
        let c = normalize("ÉCOLE-POLYTECHNIQUE");
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.as_str(), "ecolepolytechnique");
    }

    #[test]
    fn apostrophes_and_digits() {
        assert_eq!(normalize("Université Paris 8 - Vincennes").as_str(), "universiteparis8vincennes");
        assert_eq!(normalize("Lycée d'Arsonval").as_str(), "lyceedarsonval");
    }

    #[test]
    fn non_latin_letters_are_dropped() {
        // ß lowercases to itself and is not ASCII after decomposition
        assert_eq!(normalize("Straße").as_str(), "strae");
        assert!(normalize("东京大学").is_empty());
    }

    #[test]
    fn empty_and_blank() {
        assert!(normalize("").is_empty());
        assert!(normalize("  -- ").is_empty());
    }

    #[test]
    fn fold_accents_keeps_spaces() {
        assert_eq!(fold_accents("île-de-france"), "ile-de-france");
        assert_eq!(fold_accents("Côte d'Or"), "Cote d'Or");
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(s in "\\PC*") {
            let once = normalize(&s);
            let twice = normalize(once.as_str());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn normalized_key_is_ascii_alphanumeric(s in "\\PC*") {
            let key = normalize(&s);
            prop_assert!(key.as_str().chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        }
    }
}
