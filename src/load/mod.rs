// src/load/mod.rs

use csv::{ByteRecord, ReaderBuilder};
use std::{
    collections::HashSet,
    fs::File,
    io::{BufReader, Read},
    path::Path,
};
use tracing::{debug, info, warn};

use crate::error::{LoadError, Result};
use crate::reshape::columns::{detect_year_columns, YearColumn};
use crate::types::WORLD;

mod archive;

pub use archive::load_zip;

pub const COUNTRY_COLUMN: &str = "Country";
pub const CONTINENT_COLUMN: &str = "Continent";

/// One country row of the wide table.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub country: String,
    pub continent: String,
    /// Raw cell text, aligned with `RawTable::year_columns`.
    pub cells: Vec<String>,
}

/// The wide table as read from disk, before any coercion.
#[derive(Debug, Clone)]
pub struct RawTable {
    /// Header row, trimmed.
    pub headers: Vec<String>,
    /// Year-population columns found in `headers`.
    pub year_columns: Vec<YearColumn>,
    pub records: Vec<RawRecord>,
}

impl RawTable {
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.year_columns.iter().map(|c| c.year)
    }
}

/// Load a wide population table from `path`.
///
/// A `.zip` path is opened as an archive and its first CSV entry is read.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_path<P: AsRef<Path>>(path: P) -> Result<RawTable> {
    let path = path.as_ref();
    let is_zip = path
        .extension()
        .and_then(|s| s.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("zip"));
    if is_zip {
        return load_zip(path);
    }

    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_reader(BufReader::new(file))
}

/// Parse a wide population table from any CSV byte stream.
///
/// Cells are decoded lossily, so a stray non-UTF-8 byte never fails the
/// load. A header with no data rows yields an empty table.
pub fn load_reader<R: Read>(reader: R) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .byte_headers()?
        .iter()
        .map(|h| String::from_utf8_lossy(h).trim().to_string())
        .collect();

    let country_idx = position(&headers, COUNTRY_COLUMN)?;
    let continent_idx = position(&headers, CONTINENT_COLUMN)?;
    let year_columns = detect_year_columns(&headers);
    if year_columns.is_empty() {
        return Err(LoadError::NoYearColumns);
    }

    let mut records = Vec::new();
    let mut seen = HashSet::new();
    let mut rows = 0usize;

    for result in rdr.byte_records() {
        let record = result?;
        rows += 1;

        let country = cell(&record, country_idx);
        let country = country.trim();
        if country.is_empty() {
            debug!(row = rows, "skipping row without a country name");
            continue;
        }
        if country == WORLD {
            warn!(row = rows, "`World` is reserved for the aggregate; row dropped");
            continue;
        }
        if !seen.insert(country.to_string()) {
            warn!(country, row = rows, "duplicate country row dropped");
            continue;
        }

        let continent = cell(&record, continent_idx).trim().to_string();
        let cells = year_columns
            .iter()
            .map(|c| cell(&record, c.index))
            .collect();

        records.push(RawRecord {
            country: country.to_string(),
            continent,
            cells,
        });
    }

    if rows == 0 {
        warn!("source has a header but no data rows");
    }

    info!(
        rows,
        countries = records.len(),
        year_columns = year_columns.len(),
        "loaded wide table"
    );

    Ok(RawTable {
        headers,
        year_columns,
        records,
    })
}

fn cell(record: &ByteRecord, idx: usize) -> String {
    record
        .get(idx)
        .map(|b| String::from_utf8_lossy(b).into_owned())
        .unwrap_or_default()
}

fn position(headers: &[String], name: &'static str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or(LoadError::MissingColumn(name))
}
