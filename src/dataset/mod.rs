// src/dataset/mod.rs

mod cache;

pub use cache::{DatasetCache, DatasetVersion};

use std::path::Path;
use tracing::info;

use crate::derive::derive;
use crate::error::Result;
use crate::load::{load_path, RawTable};
use crate::reshape::{reshape, ReshapeStats};
use crate::types::SeriesPoint;

/// The fully derived long-form collection every query reads from.
///
/// Points are in (country, year) order with the `World` series last.
/// There is no way to mutate a dataset once built; share it behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalDataset {
    points: Vec<SeriesPoint>,
    stats: ReshapeStats,
}

impl CanonicalDataset {
    /// Run reshape and derivation over an already loaded table.
    pub fn from_table(table: &RawTable) -> Self {
        let (points, stats) = reshape(table);
        Self::from_points(points, stats)
    }

    /// Derive from unaggregated long-form points (growth rates are recomputed).
    /// Points named `World` are replaced by the aggregate.
    pub fn from_points(points: Vec<SeriesPoint>, stats: ReshapeStats) -> Self {
        Self {
            points: derive(points),
            stats,
        }
    }

    /// Load, reshape and derive in one go. Nothing is returned on a load failure.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let table = load_path(path)?;
        let dataset = Self::from_table(&table);
        info!(points = dataset.len(), "canonical dataset ready");
        Ok(dataset)
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn stats(&self) -> ReshapeStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
