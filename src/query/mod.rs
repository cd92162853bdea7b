// src/query/mod.rs
//
// Read-only slices and rollups over the canonical dataset. Nothing here
// fails: an unknown country, an inverted range or a year outside the data
// all come back empty.

mod summary;
pub mod types;

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::dataset::CanonicalDataset;
use crate::types::{SeriesPoint, WORLD};

pub use summary::ratio_extremes;
pub use types::{
    ContinentTotal, ContinentYearTotal, ContinentalTotals, CountryOverview, CountrySummary,
    GlobalSummary, RatioExtremes, RatioPoint,
};

fn in_range(year: i32, year_min: i32, year_max: i32) -> bool {
    year_min <= year && year <= year_max
}

fn country_set<I, S>(countries: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    countries.into_iter().map(|c| c.as_ref().to_string()).collect()
}

impl CanonicalDataset {
    /// One country's series within `[year_min, year_max]`, ordered by year.
    pub fn by_country_and_year_range(
        &self,
        country: &str,
        year_min: i32,
        year_max: i32,
    ) -> Vec<&SeriesPoint> {
        // canonical order already sorts each country's points by year
        self.points()
            .iter()
            .filter(|p| p.country == country && in_range(p.year, year_min, year_max))
            .collect()
    }

    /// Several countries within `[year_min, year_max]`, ordered by year then country.
    pub fn by_countries_and_year_range<I, S>(
        &self,
        countries: I,
        year_min: i32,
        year_max: i32,
    ) -> Vec<&SeriesPoint>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let wanted = country_set(countries);
        let mut out: Vec<&SeriesPoint> = self
            .points()
            .iter()
            .filter(|p| wanted.contains(&p.country) && in_range(p.year, year_min, year_max))
            .collect();
        out.sort_by(|a, b| a.year.cmp(&b.year).then_with(|| a.country.cmp(&b.country)));
        out
    }

    /// Every point for `year`, `World` included, in canonical order.
    pub fn by_year(&self, year: i32) -> Vec<&SeriesPoint> {
        self.points().iter().filter(|p| p.year == year).collect()
    }

    /// The `n` most populous entries of `year`, ties broken by country name.
    pub fn top_n_by_population(
        &self,
        year: i32,
        n: usize,
        exclude_world: bool,
    ) -> Vec<&SeriesPoint> {
        let mut rows: Vec<&SeriesPoint> = self
            .by_year(year)
            .into_iter()
            .filter(|p| !(exclude_world && p.is_world()))
            .collect();
        rows.sort_by(|a, b| {
            b.population
                .total_cmp(&a.population)
                .then_with(|| a.country.cmp(&b.country))
        });
        rows.truncate(n);
        rows
    }

    /// Population per continent for `year`, with each continent's share of
    /// the real-country total and its country count. `World` never counts
    /// toward the total; `exclude_world` only decides whether it is listed.
    pub fn continental_totals(&self, year: i32, exclude_world: bool) -> ContinentalTotals {
        let mut continents: BTreeMap<String, ContinentTotal> = BTreeMap::new();
        let mut total = 0.0;

        for p in self.by_year(year) {
            if p.is_world() {
                if exclude_world {
                    continue;
                }
            } else {
                total += p.population;
            }
            let entry = continents
                .entry(p.continent.clone())
                .or_insert_with(|| ContinentTotal {
                    continent: p.continent.clone(),
                    population: 0.0,
                    percentage: 0.0,
                    countries: 0,
                });
            entry.population += p.population;
            entry.countries += 1;
        }

        if total > 0.0 {
            for c in continents.values_mut() {
                c.percentage = c.population / total * 100.0;
            }
        }

        ContinentalTotals {
            year,
            total,
            continents,
        }
    }

    /// `numerator` as a percentage of `denominator` for each year in range
    /// where both have data. Zero denominators are skipped.
    pub fn ratio(
        &self,
        numerator: &str,
        denominator: &str,
        year_min: i32,
        year_max: i32,
    ) -> Vec<RatioPoint> {
        let denominators: BTreeMap<i32, f64> = self
            .by_country_and_year_range(denominator, year_min, year_max)
            .into_iter()
            .map(|p| (p.year, p.population))
            .collect();

        self.by_country_and_year_range(numerator, year_min, year_max)
            .into_iter()
            .filter_map(|p| {
                let den = *denominators.get(&p.year)?;
                (den != 0.0).then(|| RatioPoint {
                    year: p.year,
                    percentage: p.population / den * 100.0,
                })
            })
            .collect()
    }

    /// Distinct real countries, optionally within one continent, sorted.
    pub fn countries(&self, continent: Option<&str>) -> Vec<&str> {
        let set: BTreeSet<&str> = self
            .points()
            .iter()
            .filter(|p| !p.is_world())
            .filter(|p| continent.map_or(true, |c| p.continent == c))
            .map(|p| p.country.as_str())
            .collect();
        set.into_iter().collect()
    }

    /// Distinct continents of real countries, sorted.
    pub fn continents(&self) -> Vec<&str> {
        let set: BTreeSet<&str> = self
            .points()
            .iter()
            .filter(|p| !p.is_world())
            .map(|p| p.continent.as_str())
            .collect();
        set.into_iter().collect()
    }

    /// Distinct years present, ascending.
    pub fn years(&self) -> Vec<i32> {
        let set: BTreeSet<i32> = self.points().iter().map(|p| p.year).collect();
        set.into_iter().collect()
    }

    /// `(min, max)` year of the dataset, `None` when empty.
    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        let years = self.points().iter().map(|p| p.year);
        let min = years.clone().min()?;
        let max = years.max()?;
        Some((min, max))
    }

    /// The synthetic `World` series in year order.
    pub fn world_series(&self) -> Vec<&SeriesPoint> {
        self.points().iter().filter(|p| p.country == WORLD).collect()
    }
}
