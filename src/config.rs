use serde::Deserialize;

use crate::services::matrix_source::MatrixSource;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Path to the JSON movie catalog
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    /// Local similarity matrix file (takes precedence over remote sources)
    ///
    /// When no source at all is configured, `data/similarity.json` is used.
    #[serde(default)]
    pub similarity_path: Option<String>,

    /// Remote URL serving the similarity matrix
    #[serde(default)]
    pub similarity_url: Option<String>,

    /// Google Drive file id of the similarity matrix
    #[serde(default)]
    pub similarity_drive_file_id: Option<String>,

    /// TMDB API key; detail enrichment is disabled without it
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Prefix joined with TMDB `poster_path` values
    #[serde(default = "default_tmdb_poster_base_url")]
    pub tmdb_poster_base_url: String,

    /// Upper bound on the number of recommendations per request
    #[serde(default = "default_max_recommendations")]
    pub max_recommendations: usize,

    /// Count used when a request does not specify one
    #[serde(default = "default_recommendations")]
    pub default_recommendations: usize,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_catalog_path() -> String {
    "data/movies.json".to_string()
}

const DEFAULT_SIMILARITY_PATH: &str = "data/similarity.json";

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_poster_base_url() -> String {
    "https://image.tmdb.org/t/p/w154/".to_string()
}

fn default_max_recommendations() -> usize {
    10
}

fn default_recommendations() -> usize {
    5
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from an explicit set of key/value pairs
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::from_iter::<_, Config>(vars)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

        if config.max_recommendations == 0 {
            anyhow::bail!("MAX_RECOMMENDATIONS must be at least 1");
        }
        if config.default_recommendations == 0
            || config.default_recommendations > config.max_recommendations
        {
            anyhow::bail!(
                "DEFAULT_RECOMMENDATIONS must be between 1 and {}",
                config.max_recommendations
            );
        }

        Ok(config)
    }

    /// Resolves where the similarity matrix is loaded from
    ///
    /// A local path wins over a URL, which wins over a Google Drive file id.
    /// With none of them set, the bundled `data/similarity.json` is used.
    pub fn matrix_source(&self) -> MatrixSource {
        if let Some(path) = &self.similarity_path {
            return MatrixSource::Local(path.into());
        }
        if let Some(url) = &self.similarity_url {
            return MatrixSource::Remote(url.clone());
        }
        if let Some(file_id) = &self.similarity_drive_file_id {
            return MatrixSource::google_drive(file_id);
        }
        MatrixSource::Local(DEFAULT_SIMILARITY_PATH.into())
    }

    /// Address the HTTP listener binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_vars(vars(&[])).unwrap();
        assert_eq!(config.catalog_path, "data/movies.json");
        assert_eq!(config.max_recommendations, 10);
        assert_eq!(config.default_recommendations, 5);
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
        assert!(config.tmdb_api_key.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_vars(vars(&[
            ("CATALOG_PATH", "/srv/movies.json"),
            ("TMDB_API_KEY", "secret"),
            ("MAX_RECOMMENDATIONS", "20"),
            ("PORT", "8080"),
        ]))
        .unwrap();
        assert_eq!(config.catalog_path, "/srv/movies.json");
        assert_eq!(config.tmdb_api_key.as_deref(), Some("secret"));
        assert_eq!(config.max_recommendations, 20);
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_rejects_default_above_max() {
        let result = Config::from_vars(vars(&[
            ("MAX_RECOMMENDATIONS", "3"),
            ("DEFAULT_RECOMMENDATIONS", "4"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_matrix_source_precedence() {
        let config = Config::from_vars(vars(&[
            ("SIMILARITY_PATH", "data/similarity.json"),
            ("SIMILARITY_URL", "https://example.com/similarity.json"),
            ("SIMILARITY_DRIVE_FILE_ID", "abc123"),
        ]))
        .unwrap();
        assert_eq!(
            config.matrix_source(),
            MatrixSource::Local(PathBuf::from("data/similarity.json"))
        );

        let config = Config::from_vars(vars(&[
            ("SIMILARITY_URL", "https://example.com/similarity.json"),
            ("SIMILARITY_DRIVE_FILE_ID", "abc123"),
        ]))
        .unwrap();
        assert_eq!(
            config.matrix_source(),
            MatrixSource::Remote("https://example.com/similarity.json".to_string())
        );

        let config =
            Config::from_vars(vars(&[("SIMILARITY_DRIVE_FILE_ID", "abc123")])).unwrap();
        assert_eq!(
            config.matrix_source(),
            MatrixSource::Remote("https://drive.google.com/uc?id=abc123".to_string())
        );
    }

    #[test]
    fn test_matrix_source_defaults_to_bundled_file() {
        let config = Config::from_vars(vars(&[])).unwrap();
        assert_eq!(
            config.matrix_source(),
            MatrixSource::Local(PathBuf::from("data/similarity.json"))
        );
    }
}
