//! Canonical form for ingredient text.
//!
//! Ingredient search compares a user's term against the ingredient names
//! stored with each recipe. Both sides go through [`normalize_ingredient`]
//! so "2 cups Flour" and "flour" end up comparable.
//!
//! The PostgreSQL function `normalize_ingredient` (see `migrations/`) must
//! produce the same output as this module.

/// Characters removed from ingredient text.
const PUNCTUATION: &[char] = &[
    '.', ',', '/', '#', '!', '$', '%', '^', '&', '*', ';', ':', '{', '}', '=', '-', '_', '`', '~',
    '(', ')',
];

/// Treated as a plain space. Common in scraped recipe text.
const NO_BREAK_SPACE: char = '\u{a0}';

/// Measurement units dropped when they stand as their own word.
/// A trailing "s" is also accepted ("cups", "lbs").
const UNITS: &[&str] = &[
    "cup", "tbsp", "tsp", "oz", "ounce", "gram", "g", "kg", "ml", "lb", "pound",
];

fn is_unit(token: &str) -> bool {
    if UNITS.contains(&token) {
        return true;
    }
    token
        .strip_suffix('s')
        .is_some_and(|singular| UNITS.contains(&singular))
}

/// Normalize a raw ingredient term or stored ingredient name.
///
/// Lowercases, drops numeric quantities and unit words, strips punctuation
/// and collapses whitespace. Quantities and punctuation are turned into
/// word breaks rather than deleted, so the output never contains a unit
/// word that only appeared after stripping. That makes the function
/// idempotent.
///
/// Only ASCII letters are case-folded and only ASCII whitespace (plus
/// U+00A0) separates words. Both rules are locale-free, which keeps the
/// SQL function in step with this one on any database.
///
/// Returns an empty string when nothing but quantities/units remain.
pub fn normalize_ingredient(raw: &str) -> String {
    let spaced: String = raw
        .to_ascii_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_digit() || c == NO_BREAK_SPACE || PUNCTUATION.contains(&c) {
                ' '
            } else {
                c
            }
        })
        .collect();

    spaced
        .split(|c: char| c.is_ascii_whitespace())
        .filter(|token| !token.is_empty() && !is_unit(token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split a comma-separated ingredient list into normalized search terms.
///
/// Terms that normalize to nothing are dropped, since an empty term would
/// match every recipe. Duplicates are removed, keeping first-seen order.
pub fn parse_ingredient_terms(raw: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for term in raw.split(',').map(normalize_ingredient) {
        if !term.is_empty() && !terms.contains(&term) {
            terms.push(term);
        }
    }
    terms
}
