// src/reshape/mod.rs

pub mod columns;
pub mod parse;

use serde::Serialize;
use tracing::{debug, info, trace};

use crate::load::RawTable;
use crate::types::SeriesPoint;

pub use columns::{detect_year_columns, year_of_column, YearColumn};
pub use parse::parse_population;

/// Cell accounting for one reshape run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReshapeStats {
    pub kept: usize,
    pub dropped: usize,
    /// Countries with no valid year cell at all.
    pub empty_countries: usize,
}

/// Melt the wide table into long rows, one per valid (country, year) cell.
/// Missing cells are dropped, never zero-filled. Growth rates are unset.
#[tracing::instrument(level = "info", skip(table), fields(countries = table.records.len()))]
pub fn reshape(table: &RawTable) -> (Vec<SeriesPoint>, ReshapeStats) {
    let mut stats = ReshapeStats::default();
    let mut points = Vec::with_capacity(table.records.len() * table.year_columns.len());

    for record in &table.records {
        let before = points.len();
        for (col, cell) in table.year_columns.iter().zip(&record.cells) {
            match parse_population(cell) {
                Some(population) => {
                    points.push(SeriesPoint::new(
                        record.country.as_str(),
                        record.continent.as_str(),
                        col.year,
                        population,
                    ));
                    stats.kept += 1;
                }
                None => {
                    trace!(country = %record.country, year = col.year, cell = %cell, "missing value");
                    stats.dropped += 1;
                }
            }
        }
        if points.len() == before {
            debug!(country = %record.country, "no valid year cells; country omitted");
            stats.empty_countries += 1;
        }
    }

    info!(kept = stats.kept, dropped = stats.dropped, "reshaped to long form");
    (points, stats)
}
