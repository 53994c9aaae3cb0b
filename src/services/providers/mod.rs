//! Movie detail providers
//!
//! A detail provider turns an external movie id into a poster URL, rating and
//! synopsis. The recommendation core never calls a provider itself; it only
//! hands out ids for the API layer to enrich.
//!
//! Enrichment is best effort: a provider failure for one movie never drops
//! that movie from a recommendation list. The batch helper maps failures to
//! `None` instead of returning an error.

use std::sync::Arc;

use crate::{error::AppResult, models::MovieDetails};

pub mod tmdb;

pub use tmdb::TmdbDetailFetcher;

/// Trait for movie metadata providers
///
/// Implementations must be cheap to share across tasks: the batch helper
/// holds the provider in an `Arc` and calls it from one tokio task per id.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait DetailFetcher: Send + Sync {
    /// Fetch poster, rating and overview for a single movie
    ///
    /// `movie_id` is the external (TMDB) id stored in the catalog. Missing
    /// optional fields are filled with defaults rather than reported as errors.
    async fn fetch_details(&self, movie_id: i64) -> AppResult<MovieDetails>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Fetch details for several movies in parallel
///
/// The output lines up with `movie_ids`. A failed fetch is logged and yields
/// `None` in its slot rather than failing the batch.
pub async fn fetch_details_batch(
    fetcher: Arc<dyn DetailFetcher>,
    movie_ids: Vec<i64>,
) -> Vec<Option<MovieDetails>> {
    let mut tasks = Vec::with_capacity(movie_ids.len());

    for movie_id in movie_ids {
        let fetcher = Arc::clone(&fetcher);
        let task = tokio::spawn(async move { fetcher.fetch_details(movie_id).await });
        tasks.push((movie_id, task));
    }

    let mut results = Vec::with_capacity(tasks.len());
    let mut error_count = 0;

    for (movie_id, task) in tasks {
        match task.await {
            Ok(Ok(details)) => results.push(Some(details)),
            Ok(Err(e)) => {
                tracing::error!(
                    movie_id,
                    provider = fetcher.name(),
                    error = %e,
                    "Detail fetch failed for movie"
                );
                error_count += 1;
                results.push(None);
            }
            Err(e) => {
                tracing::error!(movie_id, error = %e, "Task join error");
                error_count += 1;
                results.push(None);
            }
        }
    }

    if error_count > 0 {
        tracing::warn!(
            success_count = results.len() - error_count,
            error_count,
            "Partial detail fetch failure"
        );
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::AppError, models::Rating};

    fn details(overview: &str) -> MovieDetails {
        MovieDetails {
            poster_url: None,
            rating: Rating::Unavailable,
            overview: overview.to_string(),
        }
    }

    #[tokio::test]
    async fn test_batch_preserves_order() {
        let mut fetcher = MockDetailFetcher::new();
        fetcher
            .expect_fetch_details()
            .returning(|movie_id| Ok(details(&format!("movie {}", movie_id))));
        fetcher.expect_name().return_const("mock");

        let results = fetch_details_batch(Arc::new(fetcher), vec![5, 3, 9]).await;

        let overviews: Vec<_> = results
            .into_iter()
            .map(|d| d.unwrap().overview)
            .collect();
        assert_eq!(overviews, vec!["movie 5", "movie 3", "movie 9"]);
    }

    #[tokio::test]
    async fn test_batch_all_failures_yield_none() {
        let mut fetcher = MockDetailFetcher::new();
        fetcher
            .expect_fetch_details()
            .times(2)
            .returning(|_| Err(AppError::ExternalApi("down".to_string())));
        fetcher.expect_name().return_const("mock");

        let results = fetch_details_batch(Arc::new(fetcher), vec![1, 2]).await;
        assert_eq!(results, vec![None, None]);
    }

    #[tokio::test]
    async fn test_batch_empty() {
        let fetcher = MockDetailFetcher::new();
        let results = fetch_details_batch(Arc::new(fetcher), vec![]).await;
        assert!(results.is_empty());
    }
}
