// src/export/mod.rs

use anyhow::{Context, Result};
use arrow::{
    array::{ArrayRef, Float64Array, Int32Array, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::{
    fs::{self, File},
    io::BufWriter,
    path::Path,
    sync::Arc,
};
use tracing::info;

use crate::types::SeriesPoint;

/// Arrow schema of the long-form series.
pub fn series_schema() -> Schema {
    Schema::new(vec![
        Field::new("country", DataType::Utf8, false),
        Field::new("continent", DataType::Utf8, false),
        Field::new("year", DataType::Int32, false),
        Field::new("population", DataType::Float64, false),
        Field::new("growth_rate", DataType::Float64, true),
    ])
}

/// Columnar copy of `points`; undefined growth rates become nulls.
pub fn to_record_batch(points: &[SeriesPoint]) -> Result<RecordBatch> {
    let country: StringArray = points.iter().map(|p| Some(p.country.as_str())).collect();
    let continent: StringArray = points.iter().map(|p| Some(p.continent.as_str())).collect();
    let year: Int32Array = points.iter().map(|p| Some(p.year)).collect();
    let population: Float64Array = points.iter().map(|p| Some(p.population)).collect();
    let growth_rate: Float64Array = points.iter().map(|p| p.growth_rate).collect();

    let columns: Vec<ArrayRef> = vec![
        Arc::new(country),
        Arc::new(continent),
        Arc::new(year),
        Arc::new(population),
        Arc::new(growth_rate),
    ];
    RecordBatch::try_new(Arc::new(series_schema()), columns).context("building series record batch")
}

/// Write `points` as a single SNAPPY Parquet file at `path`.
/// The file is written next to `path` first and renamed into place.
pub fn write_parquet(points: &[SeriesPoint], path: &Path) -> Result<()> {
    let batch = to_record_batch(points)?;
    let tmp = path.with_extension("parquet.tmp");

    let file = File::create(&tmp).with_context(|| format!("creating {:?}", tmp))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(BufWriter::new(file), batch.schema(), Some(props))
        .context("creating Arrow writer")?;
    writer.write(&batch).context("writing series batch")?;
    writer.close().context("closing Parquet writer")?;

    fs::rename(&tmp, path).with_context(|| format!("renaming {:?} to {:?}", tmp, path))?;
    info!(path = %path.display(), rows = batch.num_rows(), "wrote parquet");
    Ok(())
}

/// Write `points` as a pretty-printed JSON array at `path`.
pub fn write_json(points: &[SeriesPoint], path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {:?}", path))?;
    serde_json::to_writer_pretty(BufWriter::new(file), points)
        .with_context(|| format!("writing JSON to {:?}", path))?;
    info!(path = %path.display(), rows = points.len(), "wrote json");
    Ok(())
}
