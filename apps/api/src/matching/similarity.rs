//! Normalized edit-distance similarity used for fuzzy skill and phrase matching.
//!
//! Case-sensitive: callers lower-case both sides first.

/// `1 - levenshtein(a, b) / max(len(a), len(b))`, counted in chars.
/// Two empty strings are identical (1.0); one empty string against a
/// non-empty one scores 0.0.
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b)
}

/// Highest similarity between `needle` and any of `candidates`, or 0.0 when
/// there are none.
pub fn best_similarity<'a, I>(needle: &str, candidates: I) -> f64
where
    I: IntoIterator<Item = &'a str>,
{
    candidates
        .into_iter()
        .map(|c| similarity(needle, c))
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_strings() {
        assert_eq!(similarity("abc", "abc"), 1.0);
    }

    #[test]
    fn test_disjoint_strings_same_length() {
        assert_eq!(similarity("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_both_empty_is_one() {
        assert_eq!(similarity("", ""), 1.0);
    }

    #[test]
    fn test_one_empty_is_zero() {
        assert_eq!(similarity("", "rust"), 0.0);
        assert_eq!(similarity("rust", ""), 0.0);
    }

    #[test]
    fn test_kitten_sitting() {
        // 3 edits over 7 chars
        let s = similarity("kitten", "sitting");
        assert!((s - (1.0 - 3.0 / 7.0)).abs() < 1e-9, "got {s}");
    }

    #[test]
    fn test_case_is_not_normalized() {
        assert!(similarity("Rust", "rust") < 1.0);
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        // one substitution over four chars
        assert!((similarity("café", "cafe") - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_best_similarity_picks_max() {
        let best = best_similarity("postgres", ["mysql", "postgresql", "redis"]);
        assert!((best - similarity("postgres", "postgresql")).abs() < 1e-9);
        assert_eq!(best_similarity("rust", std::iter::empty()), 0.0);
    }
}
