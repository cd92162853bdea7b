// src/query/summary.rs

use std::collections::{BTreeMap, BTreeSet};

use super::types::{
    ContinentYearTotal, CountryOverview, CountrySummary, GlobalSummary, RatioExtremes, RatioPoint,
};
use crate::dataset::CanonicalDataset;
use crate::types::{percent_change, SeriesPoint};

impl CanonicalDataset {
    /// Headline metrics for the single-country view. `None` when the country
    /// has no data in range.
    pub fn country_overview(&self, country: &str, year_min: i32, year_max: i32) -> Option<CountryOverview> {
        let series = self.by_country_and_year_range(country, year_min, year_max);
        let first = *series.first()?;
        let last = *series.last()?;

        Some(CountryOverview {
            country: country.to_string(),
            latest_year: last.year,
            latest_population: last.population,
            earliest_year: first.year,
            earliest_population: first.population,
            total_growth: percent_change(first.population, last.population),
            recent_growth_rate: last.growth_rate,
            total_change: last.population - first.population,
        })
    }

    /// One summary row per requested country that has data in range, in
    /// request order.
    pub fn comparison_summary<I, S>(&self, countries: I, year_min: i32, year_max: i32) -> Vec<CountrySummary>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = BTreeSet::new();
        countries
            .into_iter()
            .filter(|c| seen.insert(c.as_ref().to_string()))
            .filter_map(|c| {
                let o = self.country_overview(c.as_ref(), year_min, year_max)?;
                Some(CountrySummary {
                    country: o.country,
                    latest_year: o.latest_year,
                    latest_population: o.latest_population,
                    earliest_population: o.earliest_population,
                    growth: o.total_growth,
                })
            })
            .collect()
    }

    /// Year → country → population pivot of the comparison view.
    pub fn population_table<I, S>(
        &self,
        countries: I,
        year_min: i32,
        year_max: i32,
    ) -> BTreeMap<i32, BTreeMap<String, f64>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table: BTreeMap<i32, BTreeMap<String, f64>> = BTreeMap::new();
        for p in self.by_countries_and_year_range(countries, year_min, year_max) {
            table
                .entry(p.year)
                .or_default()
                .insert(p.country.clone(), p.population);
        }
        table
    }

    /// Fastest growing real countries in `year`; undefined rates are skipped.
    pub fn top_n_by_growth_rate(&self, year: i32, n: usize) -> Vec<&SeriesPoint> {
        let mut rows: Vec<(&SeriesPoint, f64)> = self
            .by_year(year)
            .into_iter()
            .filter(|p| !p.is_world())
            .filter_map(|p| p.growth_rate.map(|g| (p, g)))
            .collect();
        rows.sort_by(|(a, ga), (b, gb)| gb.total_cmp(ga).then_with(|| a.country.cmp(&b.country)));
        rows.into_iter().take(n).map(|(p, _)| p).collect()
    }

    /// Snapshot metrics for the global view.
    pub fn global_summary(&self, year: i32) -> GlobalSummary {
        let rows = self.by_year(year);
        let world_population = rows.iter().find(|p| p.is_world()).map(|p| p.population);

        let countries: Vec<&&SeriesPoint> = rows.iter().filter(|p| !p.is_world()).collect();
        let continents: BTreeSet<&str> = countries.iter().map(|p| p.continent.as_str()).collect();
        let rates: Vec<f64> = countries.iter().filter_map(|p| p.growth_rate).collect();
        let average_growth_rate = if rates.is_empty() {
            None
        } else {
            Some(rates.iter().sum::<f64>() / rates.len() as f64)
        };

        GlobalSummary {
            year,
            world_population,
            countries: countries.len(),
            continents: continents.len(),
            average_growth_rate,
        }
    }

    /// Continental population for every year, ordered by year then continent.
    pub fn continental_trends(&self) -> Vec<ContinentYearTotal> {
        let mut totals: BTreeMap<(i32, &str), f64> = BTreeMap::new();
        for p in self.points().iter().filter(|p| !p.is_world()) {
            *totals.entry((p.year, p.continent.as_str())).or_insert(0.0) += p.population;
        }
        totals
            .into_iter()
            .map(|((year, continent), population)| ContinentYearTotal {
                year,
                continent: continent.to_string(),
                population,
            })
            .collect()
    }
}

/// Highest ratio (earliest year on ties) and the latest one.
pub fn ratio_extremes(ratio: &[RatioPoint]) -> Option<RatioExtremes> {
    let latest = *ratio.iter().max_by_key(|r| r.year)?;
    let highest = *ratio.iter().reduce(|best, r| {
        if r.percentage > best.percentage {
            r
        } else {
            best
        }
    })?;
    Some(RatioExtremes { highest, latest })
}
