use serde::{Deserialize, Serialize};

mod movie;

pub use movie::{
    EnrichedRecommendation, Movie, MovieDetails, Rating, Recommendation, OVERVIEW_UNAVAILABLE,
};

// ============================================================================
// Catalog file types
// ============================================================================

/// One row of a record-oriented catalog file
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogRecord {
    pub movie_id: i64,
    pub title: String,
}

/// A column-oriented catalog file, as dumped from a dataframe
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogColumns {
    pub movie_id: Vec<i64>,
    pub title: Vec<String>,
}

// ============================================================================
// TMDB API types
// ============================================================================

/// Raw `/movie/{id}` response from the TMDB API
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub overview: Option<String>,
}

impl TmdbMovie {
    /// Converts the raw response into client-facing details
    ///
    /// Missing rating becomes "N/A" and a missing or blank overview becomes
    /// the default placeholder.
    pub fn into_details(self, poster_base_url: &str) -> MovieDetails {
        let poster_url = self
            .poster_path
            .filter(|path| !path.is_empty())
            .map(|path| join_poster_url(poster_base_url, &path));

        let rating = self
            .vote_average
            .map(Rating::Score)
            .unwrap_or(Rating::Unavailable);

        let overview = self
            .overview
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| OVERVIEW_UNAVAILABLE.to_string());

        MovieDetails {
            poster_url,
            rating,
            overview,
        }
    }
}

fn join_poster_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

// ============================================================================
// API response types
// ============================================================================

/// Catalog entry returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieSummary {
    pub movie_id: i64,
    pub title: String,
}

impl From<&Movie> for MovieSummary {
    fn from(movie: &Movie) -> Self {
        Self {
            movie_id: movie.id,
            title: movie.title.clone(),
        }
    }
}

/// Recommendations for a single query title
#[derive(Debug, Serialize)]
pub struct RecommendationResponse<T> {
    pub title: String,
    pub count: usize,
    pub recommendations: Vec<T>,
}
