// src/query/types.rs

use serde::Serialize;
use std::collections::BTreeMap;

/// Population rollup of one continent for one year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContinentTotal {
    pub continent: String,
    pub population: f64,
    /// Share of `ContinentalTotals::total` (real countries only), in percent.
    pub percentage: f64,
    pub countries: usize,
}

/// Continent → rollup for one year, plus the grand total the shares are of.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContinentalTotals {
    pub year: i32,
    pub total: f64,
    pub continents: BTreeMap<String, ContinentTotal>,
}

impl ContinentalTotals {
    pub fn is_empty(&self) -> bool {
        self.continents.is_empty()
    }

    pub fn get(&self, continent: &str) -> Option<&ContinentTotal> {
        self.continents.get(continent)
    }

    /// Rows by population descending, ties by continent name.
    pub fn by_population(&self) -> Vec<&ContinentTotal> {
        let mut rows: Vec<_> = self.continents.values().collect();
        rows.sort_by(|a, b| {
            b.population
                .total_cmp(&a.population)
                .then_with(|| a.continent.cmp(&b.continent))
        });
        rows
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatioPoint {
    pub year: i32,
    /// numerator / denominator * 100
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatioExtremes {
    pub highest: RatioPoint,
    pub latest: RatioPoint,
}

/// Headline metrics for one country over a year range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryOverview {
    pub country: String,
    pub latest_year: i32,
    pub latest_population: f64,
    pub earliest_year: i32,
    pub earliest_population: f64,
    /// Percent change from the earliest to the latest year in range.
    pub total_growth: Option<f64>,
    /// Growth rate of the latest point in range.
    pub recent_growth_rate: Option<f64>,
    pub total_change: f64,
}

/// One row of the comparison summary table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountrySummary {
    pub country: String,
    pub latest_year: i32,
    pub latest_population: f64,
    pub earliest_population: f64,
    pub growth: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalSummary {
    pub year: i32,
    pub world_population: Option<f64>,
    pub countries: usize,
    pub continents: usize,
    /// Unweighted mean over countries with a defined rate.
    pub average_growth_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContinentYearTotal {
    pub year: i32,
    pub continent: String,
    pub population: f64,
}
