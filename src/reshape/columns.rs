// src/reshape/columns.rs

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, warn};

/// The sibling share-of-world column that must never be read as a year.
pub const WORLD_PERCENTAGE_COLUMN: &str = "World Population Percentage";

static YEAR_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\D)(\d{4})(?:\D|$)").expect("year token regex is valid"));

/// A header column carrying population for a single year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearColumn {
    /// Position of the column in the header row.
    pub index: usize,
    pub year: i32,
}

/// True for share-of-world fields, decided by name only.
pub fn is_percentage_column(name: &str) -> bool {
    name == WORLD_PERCENTAGE_COLUMN || name.to_ascii_lowercase().contains("percentage")
}

/// Year named by `name` if it is a `<YYYY> Population` style column.
pub fn year_of_column(name: &str) -> Option<i32> {
    let name = name.trim();
    if !name.contains("Population") || is_percentage_column(name) {
        return None;
    }
    YEAR_TOKEN
        .captures(name)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Scan a header row for year-population columns, in header order.
/// When two headers name the same year the first one wins.
pub fn detect_year_columns(headers: &[String]) -> Vec<YearColumn> {
    let mut seen = HashSet::new();
    let mut cols = Vec::new();

    for (index, name) in headers.iter().enumerate() {
        let Some(year) = year_of_column(name) else {
            continue;
        };
        if !seen.insert(year) {
            warn!(column = %name, year, "duplicate year column ignored");
            continue;
        }
        cols.push(YearColumn { index, year });
    }

    debug!(count = cols.len(), "detected year columns");
    cols
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_detects_world_population_csv_header() {
        let h = headers(&[
            "Rank",
            "CCA3",
            "Country",
            "Capital",
            "Continent",
            "2022 Population",
            "2020 Population",
            "2015 Population",
            "1970 Population",
            "Area (km²)",
            "Density (per km²)",
            "Growth Rate",
            "World Population Percentage",
        ]);
        let cols = detect_year_columns(&h);
        assert_eq!(
            cols,
            vec![
                YearColumn { index: 5, year: 2022 },
                YearColumn { index: 6, year: 2020 },
                YearColumn { index: 7, year: 2015 },
                YearColumn { index: 8, year: 1970 },
            ]
        );
    }

    #[test]
    fn test_percentage_column_excluded_even_with_year() {
        assert_eq!(year_of_column("World Population Percentage"), None);
        assert_eq!(year_of_column("2022 World Population Percentage"), None);
        assert_eq!(year_of_column("2022 Population PERCENTAGE"), None);
    }

    #[test]
    fn test_percent_prefix_alone_does_not_exclude() {
        assert_eq!(year_of_column("2022 Population (percentile-adjusted)"), Some(2022));
        let h = headers(&["Country", "2022 Population (percentile-adjusted)", "2020 Population"]);
        assert_eq!(
            detect_year_columns(&h),
            vec![YearColumn { index: 1, year: 2022 }, YearColumn { index: 2, year: 2020 }]
        );
    }

    #[test]
    fn test_requires_population_and_year_token() {
        assert_eq!(year_of_column("2022"), None);
        assert_eq!(year_of_column("Population"), None);
        assert_eq!(year_of_column("12022 Population"), None);
        assert_eq!(year_of_column("Population (2010)"), Some(2010));
        assert_eq!(year_of_column("  1980 Population "), Some(1980));
    }

    #[test]
    fn test_duplicate_year_keeps_first() {
        let h = headers(&["2020 Population", "Population 2020"]);
        let cols = detect_year_columns(&h);
        assert_eq!(cols, vec![YearColumn { index: 0, year: 2020 }]);
    }
}
