use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::Display;

/// Default synopsis when the metadata service has none
pub const OVERVIEW_UNAVAILABLE: &str = "Overview not available";

/// A catalog entry
///
/// `row_index` is the movie's position in the catalog and in the similarity
/// matrix; it is the join key between the two data sources.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub row_index: usize,
}

/// A single similar-movie result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recommendation {
    pub title: String,
    pub movie_id: i64,
}

impl From<&Movie> for Recommendation {
    fn from(movie: &Movie) -> Self {
        Self {
            title: movie.title.clone(),
            movie_id: movie.id,
        }
    }
}

/// Average user rating, or "N/A" when the metadata service has none
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rating {
    Score(f64),
    Unavailable,
}

impl Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rating::Score(score) => write!(f, "{}", score),
            Rating::Unavailable => write!(f, "N/A"),
        }
    }
}

impl Serialize for Rating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Rating::Score(score) => serializer.serialize_f64(*score),
            Rating::Unavailable => serializer.serialize_str("N/A"),
        }
    }
}

impl<'de> Deserialize<'de> for Rating {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Score(f64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Score(score) => Rating::Score(score),
            Raw::Text(_) => Rating::Unavailable,
        })
    }
}

/// Poster, rating and synopsis for a movie
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetails {
    pub poster_url: Option<String>,
    pub rating: Rating,
    pub overview: String,
}

/// A recommendation together with its fetched details
///
/// `details` is `None` when the detail fetch failed; the recommendation
/// itself is still valid.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EnrichedRecommendation {
    #[serde(flatten)]
    pub recommendation: Recommendation,
    pub details: Option<MovieDetails>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_serialization() {
        assert_eq!(serde_json::to_string(&Rating::Score(7.5)).unwrap(), "7.5");
        assert_eq!(serde_json::to_string(&Rating::Unavailable).unwrap(), "\"N/A\"");
    }

    #[test]
    fn test_rating_deserialization() {
        let score: Rating = serde_json::from_str("8.1").unwrap();
        let missing: Rating = serde_json::from_str("\"N/A\"").unwrap();
        assert_eq!(score, Rating::Score(8.1));
        assert_eq!(missing, Rating::Unavailable);
    }

    #[test]
    fn test_enriched_recommendation_is_flattened() {
        let enriched = EnrichedRecommendation {
            recommendation: Recommendation {
                title: "Avatar".to_string(),
                movie_id: 19995,
            },
            details: None,
        };
        let json = serde_json::to_value(&enriched).unwrap();
        assert_eq!(json["title"], "Avatar");
        assert_eq!(json["movie_id"], 19995);
        assert!(json["details"].is_null());
    }
}
