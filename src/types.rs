// src/types.rs

use serde::{Deserialize, Serialize};

/// Country and continent label of the synthetic all-countries aggregate.
pub const WORLD: &str = "World";

/// One (country, year) observation of the canonical long-form dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub country: String,
    pub continent: String,
    pub year: i32,
    pub population: f64,
    /// Percent change from the previous year present for this country.
    /// `None` for the earliest year, never coerced to zero.
    pub growth_rate: Option<f64>,
}

impl SeriesPoint {
    pub fn new(
        country: impl Into<String>,
        continent: impl Into<String>,
        year: i32,
        population: f64,
    ) -> Self {
        Self {
            country: country.into(),
            continent: continent.into(),
            year,
            population,
            growth_rate: None,
        }
    }

    pub fn is_world(&self) -> bool {
        self.country == WORLD
    }
}

/// `100 * (current - previous) / previous`, undefined on a zero base.
pub fn percent_change(previous: f64, current: f64) -> Option<f64> {
    if previous == 0.0 {
        None
    } else {
        Some((current - previous) / previous * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_change() {
        let g = percent_change(50_000_000.0, 51_000_000.0).unwrap();
        assert!((g - 2.0).abs() < 1e-9);
        assert_eq!(percent_change(0.0, 10.0), None);
        assert_eq!(percent_change(10.0, 10.0), Some(0.0));
    }
}
