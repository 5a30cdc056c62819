//! String similarity scores on a 0 to 100 scale.

use std::collections::BTreeSet;

/// Normalized indel similarity: `200 * LCS / (|a| + |b|)`.
///
/// Two empty strings are identical.
pub fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 100.0;
    }
    rapidfuzz::fuzz::ratio(a.chars(), b.chars()) * 100.0
}

/// Order-insensitive similarity of the whitespace-separated tokens.
///
/// Shared tokens count fully; the rest is compared with [`ratio`]. Returns 0
/// when either side has no tokens, and 100 when one token set contains the
/// other.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let common = join(tokens_a.intersection(&tokens_b));
    let only_a = join(tokens_a.difference(&tokens_b));
    let only_b = join(tokens_b.difference(&tokens_a));
    if !common.is_empty() && (only_a.is_empty() || only_b.is_empty()) {
        return 100.0;
    }

    let with_a = combine(&common, &only_a);
    let with_b = combine(&common, &only_b);
    let mut best = ratio(&with_a, &with_b);
    if !common.is_empty() {
        best = best.max(ratio(&common, &with_a)).max(ratio(&common, &with_b));
    }
    best
}

fn join<'a, 'b: 'a>(tokens: impl Iterator<Item = &'a &'b str>) -> String {
    tokens.copied().collect::<Vec<_>>().join(" ")
}

fn combine(common: &str, rest: &str) -> String {
    match (common.is_empty(), rest.is_empty()) {
        (true, _) => rest.to_string(),
        (_, true) => common.to_string(),
        _ => format!("{common} {rest}"),
    }
}
