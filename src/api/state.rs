use std::sync::Arc;

use crate::services::{DetailFetcher, Recommender};

/// Bounds on how many recommendations a single request may ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendationLimits {
    pub default_count: usize,
    pub max_count: usize,
}

impl Default for RecommendationLimits {
    fn default() -> Self {
        Self {
            default_count: 5,
            max_count: 10,
        }
    }
}

/// Shared application state
///
/// Everything here is read-only after startup, so handlers share it
/// without locking.
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    pub detail_fetcher: Option<Arc<dyn DetailFetcher>>,
    pub limits: RecommendationLimits,
}

impl AppState {
    /// Creates state without detail enrichment
    pub fn new(recommender: Recommender) -> Self {
        Self {
            recommender: Arc::new(recommender),
            detail_fetcher: None,
            limits: RecommendationLimits::default(),
        }
    }

    pub fn with_detail_fetcher(mut self, fetcher: Arc<dyn DetailFetcher>) -> Self {
        self.detail_fetcher = Some(fetcher);
        self
    }

    pub fn with_limits(mut self, limits: RecommendationLimits) -> Self {
        self.limits = limits;
        self
    }
}
