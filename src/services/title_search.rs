use difflib::sequencematcher::SequenceMatcher;

use crate::{db::CatalogStore, models::normalize_title};

/// Minimum similarity ratio accepted for a fuzzy title match
pub const DEFAULT_FUZZY_CUTOFF: f64 = 0.6;

/// Maps free-text queries onto catalog entries
///
/// Exact case-insensitive matches are O(1). Otherwise every catalog title is
/// compared with a Ratcliff-Obershelp similarity ratio and the single best
/// title is accepted when it reaches the cutoff. Equal ratios resolve to the
/// lexicographically greatest normalized title.
#[derive(Debug, Clone, Copy)]
pub struct TitleResolver {
    cutoff: f64,
}

impl Default for TitleResolver {
    fn default() -> Self {
        Self::new(DEFAULT_FUZZY_CUTOFF)
    }
}

impl TitleResolver {
    pub fn new(cutoff: f64) -> Self {
        Self { cutoff }
    }

    /// Returns the catalog index for `query`, or `None` when nothing is close enough
    pub fn resolve(&self, catalog: &CatalogStore, query: &str) -> Option<usize> {
        let normalized = normalize_title(query);
        if normalized.is_empty() {
            return None;
        }

        if let Some(index) = catalog.lookup(&normalized) {
            return Some(index);
        }

        let query_chars: Vec<char> = normalized.chars().collect();
        let mut best: Option<(f32, &str)> = None;

        for title in catalog.normalized_titles() {
            let title_chars: Vec<char> = title.chars().collect();

            // Skip titles whose length alone rules them out
            let upper_bound = length_bound(title_chars.len(), query_chars.len());
            if (upper_bound as f64) < self.cutoff
                || best.is_some_and(|(score, _)| upper_bound < score)
            {
                continue;
            }

            let score = similarity_ratio(&title_chars, &query_chars);
            if (score as f64) < self.cutoff {
                continue;
            }
            // Equal ratios go to the greater title
            let better = match best {
                None => true,
                Some((best_score, best_title)) => {
                    score > best_score || (score == best_score && title.as_str() > best_title)
                }
            };
            if better {
                best = Some((score, title.as_str()));
            }
        }

        let (score, title) = best?;
        tracing::debug!(
            query = %query,
            matched = %title,
            ratio = score,
            "Fuzzy title match"
        );
        catalog.lookup(title)
    }
}

/// Highest ratio two sequences of these lengths could reach
fn length_bound(a_len: usize, b_len: usize) -> f32 {
    let total = a_len + b_len;
    if total == 0 {
        return 1.0;
    }
    2.0 * a_len.min(b_len) as f32 / total as f32
}

/// Ratcliff-Obershelp ratio `2 * matched / (len(a) + len(b))` over chars
pub fn similarity_ratio(a: &[char], b: &[char]) -> f32 {
    let mut matcher = SequenceMatcher::new(a, b);
    matcher.ratio()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::{item, store};
    use crate::models::ContentType;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn catalog() -> CatalogStore {
        store(vec![
            item("Inception", ContentType::Movie, 0, &[1.0, 0.0]),
            item("Interstellar", ContentType::Movie, 0, &[0.9, 0.1]),
            item("The Dark Knight", ContentType::Movie, 1, &[0.0, 1.0]),
            item("Naruto", ContentType::Anime, 2, &[0.5, 0.5]),
        ])
    }

    #[test]
    fn test_similarity_ratio_known_values() {
        assert_eq!(similarity_ratio(&chars("abcd"), &chars("bcde")), 0.75);
        assert_eq!(similarity_ratio(&chars("naruto"), &chars("naruto")), 1.0);
        assert_eq!(similarity_ratio(&chars("abc"), &chars("xyz")), 0.0);
        assert_eq!(similarity_ratio(&chars(""), &chars("")), 1.0);
    }

    #[test]
    fn test_similarity_ratio_recurses_around_longest_block() {
        // "incept" + "i"/"o" + "n" → 8 matched of 18
        let ratio = similarity_ratio(&chars("inception"), &chars("inceptoin"));
        assert!((ratio - 16.0 / 18.0).abs() < 1e-6);
    }

    #[test]
    fn test_similarity_ratio_counts_unicode_chars() {
        let ratio = similarity_ratio(&chars("pokémon"), &chars("pokemon"));
        assert!((ratio - 12.0 / 14.0).abs() < 1e-6);
    }

    #[test]
    fn test_resolve_exact_case_insensitive() {
        let catalog = catalog();
        let resolver = TitleResolver::default();
        assert_eq!(resolver.resolve(&catalog, "  the DARK knight "), Some(2));
    }

    #[test]
    fn test_resolve_fuzzy_typo() {
        let catalog = catalog();
        let resolver = TitleResolver::default();
        assert_eq!(resolver.resolve(&catalog, "inceptoin"), Some(0));
        assert_eq!(resolver.resolve(&catalog, "dark knight"), Some(2));
    }

    #[test]
    fn test_resolve_below_cutoff_is_none() {
        let catalog = catalog();
        let resolver = TitleResolver::default();
        assert_eq!(resolver.resolve(&catalog, "zzzzzzzz"), None);
        assert_eq!(resolver.resolve(&catalog, "   "), None);
    }

    #[test]
    fn test_resolve_respects_custom_cutoff() {
        let catalog = catalog();
        // "dark knight" vs "the dark knight" scores 22/26 ≈ 0.846
        assert_eq!(TitleResolver::new(0.9).resolve(&catalog, "dark knight"), None);
        assert_eq!(TitleResolver::new(0.8).resolve(&catalog, "dark knight"), Some(2));
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let catalog = catalog();
        let resolver = TitleResolver::default();
        let first = resolver.resolve(&catalog, "intersteller");
        for _ in 0..5 {
            assert_eq!(resolver.resolve(&catalog, "intersteller"), first);
        }
        assert_eq!(first, Some(1));
    }

    #[test]
    fn test_resolve_tie_prefers_greater_title() {
        let catalog = store(vec![
            item("Bat", ContentType::Movie, 0, &[1.0, 0.0]),
            item("Hat", ContentType::Movie, 0, &[0.0, 1.0]),
        ]);
        let resolver = TitleResolver::default();
        assert_eq!(resolver.resolve(&catalog, "cat"), Some(1));

        // Catalog order does not matter
        let reversed = store(vec![
            item("Hat", ContentType::Movie, 0, &[0.0, 1.0]),
            item("Bat", ContentType::Movie, 0, &[1.0, 0.0]),
        ]);
        assert_eq!(resolver.resolve(&reversed, "cat"), Some(0));
    }

    #[test]
    fn test_fuzzy_match_on_duplicate_title_uses_last_row() {
        let catalog = store(vec![
            item("Heat", ContentType::Movie, 0, &[1.0, 0.0]),
            item("heat", ContentType::Movie, 1, &[0.0, 1.0]),
        ]);
        assert_eq!(TitleResolver::default().resolve(&catalog, "heet"), Some(1));
    }
}
