use std::{cmp::Ordering, sync::Arc};

use crate::{
    error::AppResult,
    models::{EnrichedRecommendation, Recommendation},
    services::{
        catalog::Catalog,
        providers::{fetch_details_batch, DetailFetcher},
        similarity::SimilarityMatrix,
    },
};

/// Returns up to `count` movies most similar to `title`
///
/// The queried movie's row is ranked by score, highest first, with a stable
/// sort so equal scores keep their row order. The top entry is the movie
/// itself and is always skipped. An unknown title yields an empty list.
pub fn recommend(
    catalog: &Catalog,
    matrix: &SimilarityMatrix,
    title: &str,
    count: usize,
) -> Vec<Recommendation> {
    if count == 0 {
        return Vec::new();
    }

    let Some(row) = catalog
        .find_row_index(title)
        .and_then(|row_index| matrix.row(row_index))
    else {
        return Vec::new();
    };

    let mut ranked: Vec<(usize, f64)> = row.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| by_score_descending(a.1, b.1));

    ranked
        .into_iter()
        .skip(1)
        .take(count)
        .filter_map(|(row_index, _)| catalog.get(row_index).map(Recommendation::from))
        .collect()
}

// NaN ranks below every number.
fn by_score_descending(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// Read-only recommendation engine over a loaded catalog and matrix
#[derive(Debug, Clone)]
pub struct Recommender {
    catalog: Arc<Catalog>,
    matrix: Arc<SimilarityMatrix>,
}

impl Recommender {
    /// Pairs a catalog with its similarity matrix, failing if they disagree on size
    pub fn new(catalog: Arc<Catalog>, matrix: Arc<SimilarityMatrix>) -> AppResult<Self> {
        matrix.ensure_aligned_with(&catalog)?;
        Ok(Self { catalog, matrix })
    }

    pub fn recommend(&self, title: &str, count: usize) -> Vec<Recommendation> {
        recommend(&self.catalog, &self.matrix, title, count)
    }

    /// Whether `title` resolves to a catalog row
    pub fn contains(&self, title: &str) -> bool {
        self.catalog.find_row_index(title).is_some()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn matrix(&self) -> &SimilarityMatrix {
        &self.matrix
    }
}

/// Attaches poster, rating and overview to each recommendation
///
/// Order is preserved. A failed fetch leaves that entry's details empty.
pub async fn enrich_recommendations(
    fetcher: Arc<dyn DetailFetcher>,
    recommendations: Vec<Recommendation>,
) -> Vec<EnrichedRecommendation> {
    let movie_ids = recommendations.iter().map(|r| r.movie_id).collect();
    let details = fetch_details_batch(fetcher, movie_ids).await;

    recommendations
        .into_iter()
        .zip(details)
        .map(|(recommendation, details)| EnrichedRecommendation {
            recommendation,
            details,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::AppError,
        models::{MovieDetails, Rating},
        services::providers::MockDetailFetcher,
    };

    fn rec(title: &str, movie_id: i64) -> Recommendation {
        Recommendation {
            title: title.to_string(),
            movie_id,
        }
    }

    fn abc() -> (Catalog, SimilarityMatrix) {
        let catalog = Catalog::from_movies([(1, "A"), (2, "B"), (3, "C")]);
        let matrix = SimilarityMatrix::from_rows(vec![
            vec![1.0, 0.5, 0.9],
            vec![0.5, 1.0, 0.2],
            vec![0.9, 0.2, 1.0],
        ])
        .unwrap();
        (catalog, matrix)
    }

    fn five() -> (Catalog, SimilarityMatrix) {
        let catalog =
            Catalog::from_movies([(10, "V"), (20, "W"), (30, "X"), (40, "Y"), (50, "Z")]);
        let matrix = SimilarityMatrix::from_rows(vec![
            vec![1.0, 0.3, 0.7, 0.3, 0.1],
            vec![0.3, 1.0, 0.4, 0.4, 0.4],
            vec![0.7, 0.4, 1.0, 0.0, 0.6],
            vec![0.3, 0.4, 0.0, 1.0, 0.8],
            vec![0.1, 0.4, 0.6, 0.8, 1.0],
        ])
        .unwrap();
        (catalog, matrix)
    }

    #[test]
    fn test_reference_example() {
        let (catalog, matrix) = abc();
        assert_eq!(
            recommend(&catalog, &matrix, "A", 2),
            vec![rec("C", 3), rec("B", 2)]
        );
    }

    #[test]
    fn test_unknown_title_is_empty() {
        let (catalog, matrix) = abc();
        assert!(recommend(&catalog, &matrix, "Unknown Title", 5).is_empty());
    }

    #[test]
    fn test_zero_count_is_empty() {
        let (catalog, matrix) = abc();
        assert!(recommend(&catalog, &matrix, "A", 0).is_empty());
    }

    #[test]
    fn test_length_is_clipped_to_remaining_movies() {
        let (catalog, matrix) = five();
        let k = catalog.len();
        for title in catalog.titles() {
            for count in 1..=8 {
                let results = recommend(&catalog, &matrix, title, count);
                assert_eq!(results.len(), count.min(k - 1), "title {title} count {count}");
            }
        }
    }

    #[test]
    fn test_never_returns_queried_movie() {
        let (catalog, matrix) = five();
        for movie in catalog.iter() {
            let results = recommend(&catalog, &matrix, &movie.title, 10);
            assert!(results.iter().all(|r| r.movie_id != movie.id));
        }
    }

    #[test]
    fn test_equal_scores_keep_row_order() {
        let (catalog, matrix) = five();
        // Row W: X, Y and Z all score 0.4; V scores 0.3.
        let results = recommend(&catalog, &matrix, "W", 4);
        assert_eq!(
            results,
            vec![rec("X", 30), rec("Y", 40), rec("Z", 50), rec("V", 10)]
        );

        // Row V: W and Y tie at 0.3.
        let results = recommend(&catalog, &matrix, "V", 4);
        assert_eq!(
            results,
            vec![rec("X", 30), rec("W", 20), rec("Y", 40), rec("Z", 50)]
        );
    }

    #[test]
    fn test_is_idempotent() {
        let (catalog, matrix) = five();
        let first = recommend(&catalog, &matrix, "Y", 3);
        let second = recommend(&catalog, &matrix, "Y", 3);
        assert_eq!(first, second);
    }

    #[test]
    fn test_duplicate_titles_resolve_to_first_row() {
        let catalog = Catalog::from_movies([(1, "Dup"), (2, "Other"), (3, "Dup")]);
        let matrix = SimilarityMatrix::from_rows(vec![
            vec![1.0, 0.8, 0.1],
            vec![0.8, 1.0, 0.3],
            vec![0.1, 0.3, 1.0],
        ])
        .unwrap();
        assert_eq!(
            recommend(&catalog, &matrix, "Dup", 1),
            vec![rec("Other", 2)]
        );
    }

    #[test]
    fn test_nan_scores_rank_last() {
        let catalog = Catalog::from_movies([(1, "A"), (2, "B"), (3, "C")]);
        let matrix = SimilarityMatrix::from_rows(vec![
            vec![1.0, f64::NAN, 0.1],
            vec![0.0, 1.0, 0.0],
            vec![0.1, 0.0, 1.0],
        ])
        .unwrap();
        assert_eq!(
            recommend(&catalog, &matrix, "A", 2),
            vec![rec("C", 3), rec("B", 2)]
        );
    }

    #[test]
    fn test_recommender_rejects_misaligned_data() {
        let (catalog, _) = abc();
        let matrix = SimilarityMatrix::from_rows(vec![vec![1.0]]).unwrap();
        let result = Recommender::new(Arc::new(catalog), Arc::new(matrix));
        assert!(matches!(result, Err(AppError::DataLoad(_))));
    }

    #[test]
    fn test_recommender_delegates() {
        let (catalog, matrix) = abc();
        let recommender = Recommender::new(Arc::new(catalog), Arc::new(matrix)).unwrap();
        assert!(recommender.contains("B"));
        assert!(!recommender.contains("D"));
        assert_eq!(recommender.recommend("B", 1), vec![rec("A", 1)]);
        assert_eq!(recommender.catalog().len(), recommender.matrix().dimension());
    }

    #[tokio::test]
    async fn test_enrich_keeps_order_and_tolerates_failures() {
        let mut fetcher = MockDetailFetcher::new();
        fetcher.expect_fetch_details().returning(|movie_id| {
            if movie_id == 2 {
                Err(AppError::ExternalApi("boom".to_string()))
            } else {
                Ok(MovieDetails {
                    poster_url: Some(format!("https://posters.test/{}.jpg", movie_id)),
                    rating: Rating::Score(7.0),
                    overview: "An overview".to_string(),
                })
            }
        });
        fetcher.expect_name().return_const("mock");

        let enriched = enrich_recommendations(
            Arc::new(fetcher),
            vec![rec("C", 3), rec("B", 2)],
        )
        .await;

        assert_eq!(enriched.len(), 2);
        assert_eq!(enriched[0].recommendation, rec("C", 3));
        assert_eq!(
            enriched[0].details.as_ref().and_then(|d| d.poster_url.as_deref()),
            Some("https://posters.test/3.jpg")
        );
        assert_eq!(enriched[1].recommendation, rec("B", 2));
        assert!(enriched[1].details.is_none());
    }
}
