//! Name similarity scoring
//!
//! Similarity is normalized Levenshtein distance over normalized names,
//! taken as the better of a direct comparison and a token-sorted comparison
//! so that word order ("fc arsenal" vs "arsenal fc") does not mask a match.
//! Scores land in `[0, 1]` with 1.0 reserved for an exact normalized match.

use roster_core::normalize_name;

/// Edit distance over Unicode scalar values.
///
/// Two-row dynamic programming: distances between `a[..i]` and `b[..j]`,
/// keeping only the previous and current rows.
pub fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }
    let b_chars: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a.chars().count();
    }

    let n = b_chars.len();
    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr: Vec<usize> = vec![0; n + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for j in 1..=n {
            let cost = usize::from(ca != b_chars[j - 1]);
            let deletion = prev[j] + 1;
            let insertion = curr[j - 1] + 1;
            let substitution = prev[j - 1] + cost;
            curr[j] = deletion.min(insertion).min(substitution);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[n]
}

/// Distance scaled into `[0, 1]`: 1.0 is an exact match, 0.0 shares nothing
/// at the length of the longer string.
pub fn ratio(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / longest as f64
}

/// Rejoin a normalized name with its tokens in sorted order.
pub fn token_sort(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// The query side of a comparison, precomputed once per search and reused
/// across the whole directory scan.
#[derive(Debug, Clone)]
pub struct Scorer {
    query_norm: String,
    query_sorted: String,
    reorders: bool,
}

impl Scorer {
    pub fn new(query: &str) -> Self {
        let query_norm = normalize_name(query);
        let query_sorted = token_sort(&query_norm);
        let reorders = query_sorted != query_norm;
        Scorer {
            query_norm,
            query_sorted,
            reorders,
        }
    }

    /// True when the query normalizes to nothing worth matching.
    pub fn is_empty(&self) -> bool {
        self.query_norm.is_empty()
    }

    pub fn query_norm(&self) -> &str {
        &self.query_norm
    }

    /// Score one already-normalized name against the query.
    pub fn score(&self, name_norm: &str) -> f64 {
        let direct = ratio(&self.query_norm, name_norm);
        // The token-sorted comparison can only differ when one side actually
        // reorders under sorting.
        if !self.reorders && !name_norm.contains(' ') {
            return direct;
        }
        let name_sorted = token_sort(name_norm);
        direct.max(ratio(&self.query_sorted, &name_sorted))
    }
}
