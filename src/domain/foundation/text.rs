//! Text normalization shared by parsing, filtering, and deduplication.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Latin letters with diacritics mapped to their base letter.
static ACCENT_FOLDS: Lazy<HashMap<char, char>> = Lazy::new(|| {
    let pairs: &[(&str, char)] = &[
        ("áàâäãåā", 'a'),
        ("ÁÀÂÄÃÅĀ", 'A'),
        ("éèêëē", 'e'),
        ("ÉÈÊËĒ", 'E'),
        ("íìîïī", 'i'),
        ("ÍÌÎÏĪ", 'I'),
        ("óòôöõøō", 'o'),
        ("ÓÒÔÖÕØŌ", 'O'),
        ("úùûüū", 'u'),
        ("ÚÙÛÜŪ", 'U'),
        ("ñ", 'n'),
        ("Ñ", 'N'),
        ("ç", 'c'),
        ("Ç", 'C'),
        ("ýÿ", 'y'),
        ("Ý", 'Y'),
    ];
    pairs
        .iter()
        .flat_map(|(accented, base)| accented.chars().map(move |c| (c, *base)))
        .collect()
});

/// Replaces accented Latin letters with their unaccented base letter.
pub fn fold_accents(text: &str) -> String {
    text.chars()
        .map(|c| ACCENT_FOLDS.get(&c).copied().unwrap_or(c))
        .collect()
}

/// Case- and whitespace-insensitive form used for metadata comparisons.
///
/// Trims, lowercases, and collapses internal whitespace runs to one space.
pub fn normalize_key(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Canonical form of a recommendation used solely for deduplication.
///
/// Case-folded, accents stripped, punctuation removed, whitespace collapsed.
pub fn canonicalize(text: &str) -> String {
    let folded = fold_accents(&text.to_lowercase());
    let without_punctuation: String = folded
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    without_punctuation
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
