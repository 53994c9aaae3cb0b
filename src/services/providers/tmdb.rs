//! TMDB (The Movie Database) detail provider
//!
//! Looks up `/movie/{id}` for poster path, average vote and overview. The
//! catalog's `movie_id` values are TMDB ids, so no id translation is needed.
//!
//! The API key travels in the query string. Transport errors therefore have
//! their URL stripped before they become an `AppError`, so the key never
//! reaches logs or HTTP responses.
//!
//! Responses are cached per movie id for a day: metadata changes rarely, and
//! the same titles show up across many recommendation lists.

use crate::{
    cache::{CacheKey, DetailCache},
    cached,
    error::{AppError, AppResult},
    models::{MovieDetails, TmdbMovie},
    services::providers::DetailFetcher,
};
use reqwest::Client as HttpClient;
use tracing::instrument;

const DETAILS_CACHE_TTL: u64 = 86400; // 1 day

#[derive(Clone)]
pub struct TmdbDetailFetcher {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    poster_base_url: String,
    cache: DetailCache,
}

impl TmdbDetailFetcher {
    pub fn new(
        cache: DetailCache,
        api_key: String,
        api_url: String,
        poster_base_url: String,
    ) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            poster_base_url,
            cache,
        }
    }

    /// URL of the `/movie/{id}` resource, without credentials
    fn movie_url(&self, movie_id: i64) -> String {
        format!("{}/movie/{}", self.api_url.trim_end_matches('/'), movie_id)
    }

    fn convert_api_response(&self, movie: TmdbMovie) -> MovieDetails {
        movie.into_details(&self.poster_base_url)
    }
}

#[async_trait::async_trait]
impl DetailFetcher for TmdbDetailFetcher {
    /// Fetch details for a TMDB movie id
    ///
    /// Serves from the cache when possible. On a miss, calls the API and
    /// queues the converted details for caching. A non-2xx status becomes
    /// `ExternalApi`; transport and decode failures become `HttpClient`.
    #[instrument(skip(self), fields(provider = "tmdb"))]
    async fn fetch_details(&self, movie_id: i64) -> AppResult<MovieDetails> {
        cached!(
            self.cache,
            CacheKey::MovieDetails(movie_id),
            DETAILS_CACHE_TTL,
            async move {
                let response = self
                    .http_client
                    .get(self.movie_url(movie_id))
                    .query(&[("api_key", self.api_key.as_str())])
                    .send()
                    .await
                    .map_err(|e| AppError::HttpClient(e.without_url()))?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(AppError::ExternalApi(format!(
                        "TMDB returned status {}: {}",
                        status, body
                    )));
                }

                let movie: TmdbMovie = response
                    .json()
                    .await
                    .map_err(|e| AppError::HttpClient(e.without_url()))?;
                let details = self.convert_api_response(movie);

                tracing::info!(
                    movie_id,
                    rating = %details.rating,
                    has_poster = details.poster_url.is_some(),
                    provider = "tmdb",
                    "Movie details fetched"
                );

                Ok(details)
            }
        )
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
