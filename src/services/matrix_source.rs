use reqwest::Client as HttpClient;
use std::{collections::HashMap, fmt::Display, path::PathBuf, sync::Arc};
use tokio::sync::{Mutex, OnceCell};

use crate::{
    error::{AppError, AppResult},
    services::similarity::SimilarityMatrix,
};

const GOOGLE_DRIVE_DOWNLOAD_URL: &str = "https://drive.google.com/uc?id=";

/// Where the similarity matrix is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatrixSource {
    Local(PathBuf),
    Remote(String),
}

impl MatrixSource {
    /// Source for a publicly shared Google Drive file
    pub fn google_drive(file_id: &str) -> Self {
        MatrixSource::Remote(format!("{}{}", GOOGLE_DRIVE_DOWNLOAD_URL, file_id))
    }

    /// Stable key identifying this source
    pub fn identifier(&self) -> String {
        match self {
            MatrixSource::Local(path) => format!("file:{}", path.display()),
            MatrixSource::Remote(url) => format!("url:{}", url),
        }
    }

    async fn read_bytes(&self, http_client: &HttpClient) -> AppResult<Vec<u8>> {
        match self {
            MatrixSource::Local(path) => tokio::fs::read(path).await.map_err(|e| {
                AppError::DataLoad(format!(
                    "cannot read similarity matrix {}: {}",
                    path.display(),
                    e
                ))
            }),
            MatrixSource::Remote(url) => {
                let response = http_client
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| AppError::HttpClient(e.without_url()))?;

                if !response.status().is_success() {
                    let status = response.status();
                    return Err(AppError::ExternalApi(format!(
                        "similarity download returned status {}",
                        status
                    )));
                }

                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| AppError::HttpClient(e.without_url()))?;
                Ok(bytes.to_vec())
            }
        }
    }

    /// Reads and parses the matrix, without memoization
    pub async fn fetch(&self, http_client: &HttpClient) -> AppResult<SimilarityMatrix> {
        let bytes = self.read_bytes(http_client).await?;
        SimilarityMatrix::from_json_slice(&bytes)
    }
}

impl Display for MatrixSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatrixSource::Local(path) => write!(f, "{}", path.display()),
            MatrixSource::Remote(url) => write!(f, "{}", url),
        }
    }
}

type MatrixCell = Arc<OnceCell<Arc<SimilarityMatrix>>>;

/// Process-wide memo of loaded similarity matrices
///
/// Each source is loaded at most once; concurrent first callers wait on the
/// same load and later callers get the shared matrix without re-fetching.
#[derive(Clone, Default)]
pub struct SimilarityStore {
    http_client: HttpClient,
    cells: Arc<Mutex<HashMap<String, MatrixCell>>>,
}

impl SimilarityStore {
    pub fn new(http_client: HttpClient) -> Self {
        Self {
            http_client,
            cells: Arc::default(),
        }
    }

    /// Returns the matrix for `source`, loading it on first access
    pub async fn get_or_load(&self, source: &MatrixSource) -> AppResult<Arc<SimilarityMatrix>> {
        let cell = {
            let mut cells = self.cells.lock().await;
            Arc::clone(cells.entry(source.identifier()).or_default())
        };

        let matrix = cell
            .get_or_try_init(|| async {
                tracing::info!(source = %source, "Loading similarity matrix");
                let matrix = source.fetch(&self.http_client).await?;
                tracing::info!(
                    source = %source,
                    dimension = matrix.dimension(),
                    "Similarity matrix loaded"
                );
                Ok::<_, AppError>(Arc::new(matrix))
            })
            .await?;

        Ok(Arc::clone(matrix))
    }

    /// Whether `source` has already been loaded
    pub async fn is_loaded(&self, source: &MatrixSource) -> bool {
        self.cells
            .lock()
            .await
            .get(&source.identifier())
            .is_some_and(|cell| cell.initialized())
    }
}
