use crate::{
    db::{CatalogStats, CatalogStore},
    models::{SortMode, Weights},
};

/// Score breakdown for one candidate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredCandidate {
    pub index: usize,
    pub similarity: f64,
    pub rating_norm: f64,
    pub pop_norm: f64,
    pub recency_norm: f64,
    pub final_score: f64,
}

/// Cosine similarity from precomputed vector norms
///
/// A zero vector is dissimilar to everything.
pub fn cosine_similarity(a: &[f32], b: &[f32], norm_a: f32, norm_b: f32) -> f32 {
    let norm = norm_a * norm_b;
    if norm == 0.0 {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    dot / norm
}

/// Linear rescale of `year` into `[0, 1]` over the catalog's known years
pub fn recency_norm(year: i32, stats: &CatalogStats) -> f64 {
    if year <= 0 {
        return 0.0;
    }
    if stats.year_max == stats.year_min {
        return 0.5;
    }
    (year - stats.year_min) as f64 / (stats.year_max - stats.year_min) as f64
}

/// Scores every candidate in `pool` against the query item
///
/// Unrated candidates (rating ≤ 0) take the mean normalized rating of the
/// rated candidates in the pool, or of the whole catalog when the pool has
/// none, so a missing rating is not read as a zero rating.
pub fn score_candidates(
    catalog: &CatalogStore,
    query_index: usize,
    pool: &[usize],
    weights: &Weights,
) -> Vec<ScoredCandidate> {
    let stats = catalog.stats();
    let Some(query) = catalog.get(query_index) else {
        return Vec::new();
    };
    let query_norm = catalog.norm(query_index);

    let rated: Vec<f64> = pool
        .iter()
        .filter_map(|&i| catalog.get(i))
        .map(|item| item.rating)
        .filter(|r| *r > 0.0)
        .collect();
    let fill_rating = if rated.is_empty() {
        stats.rating_mean
    } else {
        rated.iter().sum::<f64>() / rated.len() as f64
    };

    pool.iter()
        .filter_map(|&index| catalog.get(index).map(|item| (index, item)))
        .map(|(index, item)| {
            let similarity = cosine_similarity(
                &query.embedding,
                &item.embedding,
                query_norm,
                catalog.norm(index),
            ) as f64;

            let rating = if item.rating > 0.0 { item.rating } else { fill_rating };
            let rating_norm = rating / stats.rating_max;
            let pop_norm = item.popularity / stats.popularity_max;
            let recency_norm = recency_norm(item.year, stats);

            let final_score = weights.sim * similarity
                + weights.rating * rating_norm
                + weights.pop * pop_norm
                + weights.recency * recency_norm;

            ScoredCandidate {
                index,
                similarity,
                rating_norm,
                pop_norm,
                recency_norm,
                final_score,
            }
        })
        .collect()
}

/// Orders scored candidates in place
///
/// `SortMode::Score` sorts by final score, then similarity, then raw rating.
/// The other modes sort by a catalog field and use the final score to break
/// ties. Catalog index is the last tie-breaker in every mode.
pub fn rank(catalog: &CatalogStore, scored: &mut [ScoredCandidate], mode: SortMode) {
    let item_of = |c: &ScoredCandidate| catalog.get(c.index);
    let rating = |c: &ScoredCandidate| item_of(c).map_or(0.0, |i| i.rating);
    let year = |c: &ScoredCandidate| item_of(c).map_or(0, |i| i.year);
    let popularity = |c: &ScoredCandidate| item_of(c).map_or(0.0, |i| i.popularity);

    let by_score = |a: &ScoredCandidate, b: &ScoredCandidate| b.final_score.total_cmp(&a.final_score);

    scored.sort_by(|a, b| {
        let primary = match mode {
            SortMode::Score => by_score(a, b)
                .then_with(|| b.similarity.total_cmp(&a.similarity))
                .then_with(|| rating(b).total_cmp(&rating(a))),
            SortMode::Latest => year(b).cmp(&year(a)).then_with(|| by_score(a, b)),
            SortMode::Oldest => year(a).cmp(&year(b)).then_with(|| by_score(a, b)),
            SortMode::Popular => popularity(b)
                .total_cmp(&popularity(a))
                .then_with(|| by_score(a, b)),
            SortMode::TopRated => rating(b).total_cmp(&rating(a)).then_with(|| by_score(a, b)),
        };
        primary.then_with(|| a.index.cmp(&b.index))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::{item, store};
    use crate::models::{CatalogItem, ContentType};

    fn movie(title: &str, embedding: &[f32], rating: f64, popularity: f64, year: i32) -> CatalogItem {
        CatalogItem {
            rating,
            popularity,
            year,
            ..item(title, ContentType::Movie, 0, embedding)
        }
    }

    fn weights_only_sim() -> Weights {
        Weights {
            sim: 1.0,
            rating: 0.0,
            pop: 0.0,
            recency: 0.0,
        }
    }

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        let norm = |v: &[f32]| v.iter().map(|x| x * x).sum::<f32>().sqrt();
        cosine_similarity(a, b, norm(a), norm(b))
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
        assert!((cosine(&[3.0, 4.0], &[4.0, 3.0]) - 0.96).abs() < 1e-6);
        assert_eq!(cosine(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_zero_embedding_scores_zero_similarity() {
        let catalog = store(vec![
            movie("Query", &[1.0, 0.0], 8.0, 100.0, 2000),
            movie("Blank", &[0.0, 0.0], 8.0, 100.0, 2000),
            movie("Scaled", &[5.0, 0.0], 8.0, 100.0, 2000),
        ]);

        let scored = score_candidates(&catalog, 0, &[1, 2], &weights_only_sim());
        assert_eq!(scored[0].similarity, 0.0);
        assert!((scored[1].similarity - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_score_formula() {
        let catalog = store(vec![
            movie("Query", &[1.0, 0.0], 8.0, 100.0, 2000),
            movie("Twin", &[1.0, 0.0], 10.0, 50.0, 2020),
            movie("Other", &[0.0, 1.0], 5.0, 0.0, 2010),
        ]);

        let scored = score_candidates(&catalog, 0, &[1, 2], &Weights::default());

        let twin = scored[0];
        assert_eq!(twin.index, 1);
        assert!((twin.similarity - 1.0).abs() < 1e-6);
        assert!((twin.rating_norm - 1.0).abs() < 1e-9);
        assert!((twin.pop_norm - 0.5).abs() < 1e-9);
        assert!((twin.recency_norm - 1.0).abs() < 1e-9);
        let expected = 0.5 * 1.0 + 0.25 * 1.0 + 0.15 * 0.5 + 0.10 * 1.0;
        assert!((twin.final_score - expected).abs() < 1e-6);

        let other = scored[1];
        assert!(other.similarity.abs() < 1e-6);
        assert!((other.rating_norm - 0.5).abs() < 1e-9);
        assert!((other.recency_norm - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_unrated_candidate_takes_pool_mean() {
        let catalog = store(vec![
            movie("Query", &[1.0, 0.0], 8.0, 0.0, 2000),
            movie("Rated A", &[1.0, 0.0], 6.0, 0.0, 2000),
            movie("Rated B", &[1.0, 0.0], 10.0, 0.0, 2000),
            movie("Unrated", &[1.0, 0.0], 0.0, 0.0, 2000),
        ]);

        let scored = score_candidates(&catalog, 0, &[1, 2, 3], &Weights::default());
        let unrated = scored.iter().find(|c| c.index == 3).unwrap();

        // mean(6, 10) / 10
        assert!((unrated.rating_norm - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_unrated_pool_falls_back_to_catalog_mean() {
        let catalog = store(vec![
            movie("Query", &[1.0, 0.0], 9.0, 0.0, 2000),
            movie("Elsewhere", &[0.0, 1.0], 3.0, 0.0, 2000),
            movie("Unrated", &[1.0, 0.0], 0.0, 0.0, 2000),
        ]);

        let scored = score_candidates(&catalog, 0, &[2], &Weights::default());

        // catalog mean (9 + 3 + 0) / 3 = 4, max 9
        assert!((scored[0].rating_norm - 4.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_recency_norm_edge_cases() {
        let stats = CatalogStats {
            rating_max: 10.0,
            popularity_max: 1.0,
            year_min: 1990,
            year_max: 2020,
            rating_mean: 5.0,
        };
        assert_eq!(recency_norm(0, &stats), 0.0);
        assert_eq!(recency_norm(1990, &stats), 0.0);
        assert_eq!(recency_norm(2005, &stats), 0.5);
        assert_eq!(recency_norm(2020, &stats), 1.0);

        let flat = CatalogStats {
            year_min: 2001,
            year_max: 2001,
            ..stats
        };
        assert_eq!(recency_norm(2001, &flat), 0.5);
        assert_eq!(recency_norm(0, &flat), 0.0);
    }

    #[test]
    fn test_rank_default_tie_breaks() {
        let catalog = store(vec![
            movie("Query", &[1.0, 0.0], 5.0, 0.0, 2000),
            movie("Low Rated", &[1.0, 0.0], 4.0, 0.0, 2000),
            movie("High Rated", &[1.0, 0.0], 9.0, 0.0, 2000),
            movie("Distant", &[0.0, 1.0], 9.0, 0.0, 2000),
        ]);

        // Similarity only: 1 and 2 tie on score and similarity, rating decides
        let mut scored = score_candidates(&catalog, 0, &[1, 2, 3], &weights_only_sim());
        rank(&catalog, &mut scored, SortMode::Score);

        let order: Vec<usize> = scored.iter().map(|c| c.index).collect();
        assert_eq!(order, vec![2, 1, 3]);
    }

    #[test]
    fn test_rank_alternate_modes() {
        let catalog = store(vec![
            movie("Query", &[1.0, 0.0], 5.0, 0.0, 2000),
            movie("Old Popular", &[1.0, 0.0], 6.0, 900.0, 1980),
            movie("New Niche", &[0.0, 1.0], 7.0, 10.0, 2021),
            movie("Mid Acclaimed", &[0.5, 0.5], 9.5, 300.0, 2001),
        ]);
        let pool = [1, 2, 3];

        let order = |mode| {
            let mut scored = score_candidates(&catalog, 0, &pool, &Weights::default());
            rank(&catalog, &mut scored, mode);
            scored.iter().map(|c| c.index).collect::<Vec<_>>()
        };

        assert_eq!(order(SortMode::Latest), vec![2, 3, 1]);
        assert_eq!(order(SortMode::Oldest), vec![1, 3, 2]);
        assert_eq!(order(SortMode::Popular), vec![1, 3, 2]);
        assert_eq!(order(SortMode::TopRated), vec![3, 2, 1]);
    }

    #[test]
    fn test_raising_similarity_weight_never_demotes_most_similar() {
        let catalog = store(vec![
            movie("Query", &[1.0, 0.0], 5.0, 0.0, 2000),
            movie("Close but unpopular", &[0.95, 0.05], 4.0, 10.0, 1995),
            movie("Far but famous", &[0.2, 0.8], 9.5, 1000.0, 2020),
        ]);

        let position = |sim: f64| {
            let weights = Weights {
                sim,
                ..Weights::default()
            };
            let mut scored = score_candidates(&catalog, 0, &[1, 2], &weights);
            rank(&catalog, &mut scored, SortMode::Score);
            scored.iter().position(|c| c.index == 1).unwrap()
        };

        let mut last = position(0.0);
        for sim in [0.25, 0.5, 1.0, 2.0, 5.0] {
            let current = position(sim);
            assert!(current <= last, "rank dropped at w_sim = {}", sim);
            last = current;
        }
        assert_eq!(last, 0);
    }
}
