use std::collections::HashSet;

/// Default word-set Jaccard similarity at which two bases are one franchise
pub const DEFAULT_JACCARD_THRESHOLD: f64 = 0.6;

/// Default overlap for the shared-words rule
pub const DEFAULT_MIN_SHARED_WORDS: usize = 2;

/// Candidates examined per requested result before the scan stops
const SCAN_FACTOR: usize = 3;

const SUBTITLE_DELIMITERS: [char; 4] = [':', '-', '–', '('];

/// Franchise base of a title: lowercased, cut at the first subtitle delimiter
///
/// `"Toy Story 2: Woody's Roundup"` → `"toy story 2"`
pub fn franchise_base(title: &str) -> String {
    let lower = title.to_lowercase();
    let cut = lower.find(SUBTITLE_DELIMITERS).unwrap_or(lower.len());
    lower[..cut].trim().to_string()
}

/// Decides whether two franchise bases belong to the same franchise
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FranchiseRule {
    /// Either base contains the other, or their word sets overlap by at least `threshold` (Jaccard)
    SubstringOrJaccard { threshold: f64 },
    /// The word sets share at least `min_shared` words
    SharedWords { min_shared: usize },
}

impl Default for FranchiseRule {
    fn default() -> Self {
        FranchiseRule::SubstringOrJaccard {
            threshold: DEFAULT_JACCARD_THRESHOLD,
        }
    }
}

impl FranchiseRule {
    /// Empty bases never match anything
    pub fn same_franchise(&self, a: &str, b: &str) -> bool {
        if a.is_empty() || b.is_empty() {
            return false;
        }
        if a == b {
            return true;
        }

        let words_a: HashSet<&str> = a.split_whitespace().collect();
        let words_b: HashSet<&str> = b.split_whitespace().collect();
        let shared = words_a.intersection(&words_b).count();

        match *self {
            FranchiseRule::SubstringOrJaccard { threshold } => {
                if a.contains(b) || b.contains(a) {
                    return true;
                }
                let union = words_a.union(&words_b).count();
                union > 0 && shared as f64 / union as f64 >= threshold
            }
            FranchiseRule::SharedWords { min_shared } => shared >= min_shared,
        }
    }
}

/// Keeps the best-ranked member of each franchise
#[derive(Debug, Clone, Copy, Default)]
pub struct Deduplicator {
    rule: FranchiseRule,
}

impl Deduplicator {
    pub fn new(rule: FranchiseRule) -> Self {
        Self { rule }
    }

    pub fn rule(&self) -> FranchiseRule {
        self.rule
    }

    /// Walks `ranked` in order and returns at most `limit` items, one per franchise
    pub fn dedup<'a, T, F>(&self, ranked: &'a [T], title_of: F, limit: usize) -> Vec<T>
    where
        T: Clone,
        F: Fn(&'a T) -> &'a str,
    {
        self.dedup_excluding(ranked, title_of, limit, &[])
    }

    /// Like [`dedup`](Self::dedup), with `seeds` treated as franchises already taken
    ///
    /// The scan stops once `limit * 3` items are collected. If every item is
    /// filtered out, the first `limit` ranked items are returned unfiltered.
    pub fn dedup_excluding<'a, T, F>(
        &self,
        ranked: &'a [T],
        title_of: F,
        limit: usize,
        seeds: &[String],
    ) -> Vec<T>
    where
        T: Clone,
        F: Fn(&'a T) -> &'a str,
    {
        if limit == 0 {
            return Vec::new();
        }

        let scan_limit = limit.saturating_mul(SCAN_FACTOR);
        let mut seen: Vec<String> = seeds.to_vec();
        let mut kept: Vec<T> = Vec::new();

        for candidate in ranked {
            if kept.len() >= scan_limit {
                break;
            }
            let base = franchise_base(title_of(candidate));
            if seen.iter().any(|other| self.rule.same_franchise(&base, other)) {
                continue;
            }
            seen.push(base);
            kept.push(candidate.clone());
        }

        if kept.is_empty() && !ranked.is_empty() {
            tracing::debug!(
                candidates = ranked.len(),
                "Every candidate shared a franchise, returning ranked order without dedup"
            );
            return ranked.iter().take(limit).cloned().collect();
        }

        kept.truncate(limit);
        kept
    }
}
