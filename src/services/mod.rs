pub mod catalog;
pub mod matrix_source;
pub mod providers;
pub mod recommendations;
pub mod similarity;

pub use catalog::Catalog;
pub use matrix_source::{MatrixSource, SimilarityStore};
pub use providers::{DetailFetcher, TmdbDetailFetcher};
pub use recommendations::{enrich_recommendations, recommend, Recommender};
pub use similarity::SimilarityMatrix;
