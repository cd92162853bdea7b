// src/derive/mod.rs

use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::types::{percent_change, SeriesPoint, WORLD};

/// Fill `growth_rate` along one year-sorted series.
/// The first point keeps `None`.
fn apply_growth_rates(series: &mut [SeriesPoint]) {
    let mut previous: Option<f64> = None;
    for point in series.iter_mut() {
        point.growth_rate = previous.and_then(|prev| percent_change(prev, point.population));
        previous = Some(point.population);
    }
}

/// Group by country, sort each group by year and compute growth rates.
///
/// Returns the points in (country, year) order. A repeated (country, year)
/// pair keeps its first occurrence.
pub fn with_growth_rates(points: Vec<SeriesPoint>) -> Vec<SeriesPoint> {
    let mut groups: BTreeMap<String, Vec<SeriesPoint>> = BTreeMap::new();
    for point in points {
        groups.entry(point.country.clone()).or_default().push(point);
    }

    let mut out = Vec::new();
    for (country, mut series) in groups {
        // stable sort keeps input order among equal years
        series.sort_by_key(|p| p.year);
        let before = series.len();
        series.dedup_by_key(|p| p.year);
        if series.len() != before {
            warn!(country = %country, dropped = before - series.len(), "duplicate years dropped");
        }
        apply_growth_rates(&mut series);
        out.extend(series);
    }
    out
}

/// Sum population over every country per year into the `World` series,
/// then derive its growth from the totals themselves.
pub fn world_aggregate(points: &[SeriesPoint]) -> Vec<SeriesPoint> {
    let mut totals: BTreeMap<i32, f64> = BTreeMap::new();
    for point in points.iter().filter(|p| !p.is_world()) {
        *totals.entry(point.year).or_insert(0.0) += point.population;
    }

    let mut world: Vec<SeriesPoint> = totals
        .into_iter()
        .map(|(year, population)| SeriesPoint::new(WORLD, WORLD, year, population))
        .collect();
    apply_growth_rates(&mut world);
    debug!(years = world.len(), "built world aggregate");
    world
}

/// Build the canonical collection: per-country points in (country, year)
/// order followed by the `World` series in year order.
///
/// Incoming points named `World` are dropped; the aggregate is the only
/// `World` series in the output.
#[tracing::instrument(level = "info", skip(points), fields(points = points.len()))]
pub fn derive(mut points: Vec<SeriesPoint>) -> Vec<SeriesPoint> {
    let before = points.len();
    points.retain(|p| !p.is_world());
    if points.len() != before {
        warn!(dropped = before - points.len(), "input points named World dropped");
    }

    let mut combined = with_growth_rates(points);
    let world = world_aggregate(&combined);
    combined.extend(world);
    info!(points = combined.len(), "derived canonical series");
    combined
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * b.abs().max(1.0)
    }

    fn sample() -> Vec<SeriesPoint> {
        vec![
            SeriesPoint::new("Uganda", "Africa", 2021, 45_000_000.0),
            SeriesPoint::new("Kenya", "Africa", 2021, 51_000_000.0),
            SeriesPoint::new("Kenya", "Africa", 2020, 50_000_000.0),
            SeriesPoint::new("Uganda", "Africa", 2020, 44_000_000.0),
            SeriesPoint::new("France", "Europe", 2021, 65_000_000.0),
        ]
    }

    #[test]
    fn test_growth_rate_formula() {
        let out = with_growth_rates(sample());
        let kenya: Vec<_> = out.iter().filter(|p| p.country == "Kenya").collect();

        assert_eq!(kenya[0].year, 2020);
        assert_eq!(kenya[0].growth_rate, None);
        assert_eq!(kenya[1].year, 2021);
        assert!(close(kenya[1].growth_rate.unwrap(), 2.0));

        let france: Vec<_> = out.iter().filter(|p| p.country == "France").collect();
        assert_eq!(france.len(), 1);
        assert_eq!(france[0].growth_rate, None);
    }

    #[test]
    fn test_growth_rate_spans_year_gaps() {
        let out = with_growth_rates(vec![
            SeriesPoint::new("Kenya", "Africa", 2010, 100.0),
            SeriesPoint::new("Kenya", "Africa", 2000, 80.0),
        ]);
        assert_eq!(out[0].growth_rate, None);
        assert!(close(out[1].growth_rate.unwrap(), 25.0));
    }

    #[test]
    fn test_zero_base_is_undefined() {
        let out = with_growth_rates(vec![
            SeriesPoint::new("Nowhere", "Ocean", 2020, 0.0),
            SeriesPoint::new("Nowhere", "Ocean", 2021, 10.0),
        ]);
        assert_eq!(out[1].growth_rate, None);
    }

    #[test]
    fn test_canonical_order() {
        let out = derive(sample());
        let keys: Vec<(&str, i32)> = out.iter().map(|p| (p.country.as_str(), p.year)).collect();
        assert_eq!(
            keys,
            vec![
                ("France", 2021),
                ("Kenya", 2020),
                ("Kenya", 2021),
                ("Uganda", 2020),
                ("Uganda", 2021),
                ("World", 2020),
                ("World", 2021),
            ]
        );
    }

    #[test]
    fn test_world_additivity_and_independent_growth() {
        let out = derive(sample());
        let world: Vec<_> = out.iter().filter(|p| p.is_world()).collect();

        for w in &world {
            assert_eq!(w.continent, WORLD);
            let sum: f64 = out
                .iter()
                .filter(|p| !p.is_world() && p.year == w.year)
                .map(|p| p.population)
                .sum();
            assert!(close(w.population, sum));
        }

        // 94M -> 161M: computed from totals, not averaged from country rates
        assert_eq!(world[0].growth_rate, None);
        let expected = (161_000_000.0 - 94_000_000.0) / 94_000_000.0 * 100.0;
        assert!(close(world[1].growth_rate.unwrap(), expected));
    }

    #[test]
    fn test_derive_is_idempotent() {
        assert_eq!(derive(sample()), derive(sample()));
    }

    #[test]
    fn test_world_input_is_replaced_by_aggregate() {
        let out = derive(vec![
            SeriesPoint::new("Kenya", "Africa", 2020, 10.0),
            SeriesPoint::new(WORLD, WORLD, 2020, 999.0),
        ]);

        let world: Vec<_> = out.iter().filter(|p| p.is_world()).collect();
        assert_eq!(world.len(), 1);
        assert_eq!(world[0].year, 2020);
        assert_eq!(world[0].population, 10.0);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_duplicate_year_keeps_first() {
        let out = with_growth_rates(vec![
            SeriesPoint::new("Kenya", "Africa", 2020, 1.0),
            SeriesPoint::new("Kenya", "Africa", 2020, 2.0),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].population, 1.0);
    }
}
