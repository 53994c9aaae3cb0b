use std::path::Path;

use crate::{
    error::{AppError, AppResult},
    models::{CatalogColumns, CatalogRecord, Movie},
};

/// Immutable, ordered table of movies
///
/// Row order is the source order and matches the rows of the similarity
/// matrix. Titles are not assumed to be unique.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    movies: Vec<Movie>,
}

impl Catalog {
    /// Builds a catalog from `(movie_id, title)` pairs in row order
    pub fn from_movies<I, S>(movies: I) -> Self
    where
        I: IntoIterator<Item = (i64, S)>,
        S: Into<String>,
    {
        let movies = movies
            .into_iter()
            .enumerate()
            .map(|(row_index, (id, title))| Movie {
                id,
                title: title.into(),
                row_index,
            })
            .collect();

        Self { movies }
    }

    /// Loads the catalog from a JSON file
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::DataLoad(format!("cannot read catalog {}: {}", path.display(), e))
        })?;

        let catalog = Self::from_json_str(&contents)?;

        tracing::info!(
            path = %path.display(),
            movies = catalog.len(),
            "Catalog loaded"
        );

        Ok(catalog)
    }

    /// Parses a catalog from JSON
    ///
    /// Accepts either an array of `{"movie_id", "title"}` records or an object
    /// holding parallel `movie_id` and `title` columns.
    pub fn from_json_str(contents: &str) -> AppResult<Self> {
        let value: serde_json::Value = serde_json::from_str(contents)
            .map_err(|e| AppError::DataLoad(format!("malformed catalog: {}", e)))?;

        let pairs: Vec<(i64, String)> = match value {
            serde_json::Value::Array(_) => {
                let records: Vec<CatalogRecord> = serde_json::from_value(value)
                    .map_err(|e| AppError::DataLoad(format!("invalid catalog record: {}", e)))?;
                records.into_iter().map(|r| (r.movie_id, r.title)).collect()
            }
            serde_json::Value::Object(_) => {
                let columns: CatalogColumns = serde_json::from_value(value)
                    .map_err(|e| AppError::DataLoad(format!("invalid catalog columns: {}", e)))?;
                if columns.movie_id.len() != columns.title.len() {
                    return Err(AppError::DataLoad(format!(
                        "catalog columns differ in length: {} movie_id, {} title",
                        columns.movie_id.len(),
                        columns.title.len()
                    )));
                }
                columns.movie_id.into_iter().zip(columns.title).collect()
            }
            _ => {
                return Err(AppError::DataLoad(
                    "catalog must be a JSON array or object".to_string(),
                ))
            }
        };

        if pairs.is_empty() {
            return Err(AppError::DataLoad("catalog is empty".to_string()));
        }

        Ok(Self::from_movies(pairs))
    }

    /// Row index of the first movie whose title matches exactly
    pub fn find_row_index(&self, title: &str) -> Option<usize> {
        self.movies
            .iter()
            .position(|movie| movie.title == title)
    }

    /// First movie carrying the given external id
    pub fn find_by_id(&self, movie_id: i64) -> Option<&Movie> {
        self.movies.iter().find(|movie| movie.id == movie_id)
    }

    pub fn get(&self, row_index: usize) -> Option<&Movie> {
        self.movies.get(row_index)
    }

    pub fn title_at(&self, row_index: usize) -> Option<&str> {
        self.get(row_index).map(|movie| movie.title.as_str())
    }

    pub fn id_at(&self, row_index: usize) -> Option<i64> {
        self.get(row_index).map(|movie| movie.id)
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// Movies in row order
    pub fn iter(&self) -> impl Iterator<Item = &Movie> {
        self.movies.iter()
    }

    /// Titles in row order
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.movies.iter().map(|movie| movie.title.as_str())
    }
}
