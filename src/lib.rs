pub mod config;
pub mod dataset;
pub mod derive;
pub mod error;
pub mod export;
pub mod load;
pub mod query;
pub mod reshape;
pub mod types;

pub use dataset::{CanonicalDataset, DatasetCache, DatasetVersion};
pub use error::LoadError;
pub use types::{SeriesPoint, WORLD};
