// src/load/archive.rs

use std::{
    fs::File,
    io::{Cursor, Read},
    path::Path,
};
use tracing::debug;
use zip::ZipArchive;

use super::{load_reader, RawTable};
use crate::error::{LoadError, Result};

/// Open `zip_path` and parse the first `.csv` entry, in archive order.
pub fn load_zip(zip_path: &Path) -> Result<RawTable> {
    let io_err = |source| LoadError::Io {
        path: zip_path.to_path_buf(),
        source,
    };
    let zip_err = |source| LoadError::Zip {
        path: zip_path.to_path_buf(),
        source,
    };

    let file = File::open(zip_path).map_err(io_err)?;
    let mut archive = ZipArchive::new(file).map_err(zip_err)?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(zip_err)?;
        let name = entry.name().to_string();
        if !entry.is_file() || !name.to_lowercase().ends_with(".csv") {
            continue;
        }

        debug!(entry = %name, "reading CSV entry from archive");
        let mut buf = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut buf).map_err(io_err)?;
        return load_reader(Cursor::new(buf));
    }

    Err(LoadError::NoCsvInArchive(zip_path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::{load_path, tests::SAMPLE};
    use anyhow::Result;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use zip::write::SimpleFileOptions;
    use zip::CompressionMethod;

    fn write_zip(entries: &[(&str, &str)]) -> Result<NamedTempFile> {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
            for (name, content) in entries {
                zip.start_file(*name, options)?;
                zip.write_all(content.as_bytes())?;
            }
            zip.finish()?;
        }
        let mut tmp = NamedTempFile::with_suffix(".zip")?;
        tmp.write_all(&buf)?;
        Ok(tmp)
    }

    #[test]
    fn test_load_zip_reads_first_csv() -> Result<()> {
        let tmp = write_zip(&[("README.txt", "not data"), ("world_population.csv", SAMPLE)])?;

        let table = load_path(tmp.path())?;
        assert_eq!(table.records.len(), 3);
        assert_eq!(table.records[1].country, "Uganda");
        Ok(())
    }

    #[test]
    fn test_load_zip_without_csv() -> Result<()> {
        let tmp = write_zip(&[("README.txt", "not data")])?;

        let err = load_zip(tmp.path()).unwrap_err();
        assert!(matches!(err, LoadError::NoCsvInArchive(_)));
        Ok(())
    }

    #[test]
    fn test_load_zip_corrupt_archive() -> Result<()> {
        let mut tmp = NamedTempFile::with_suffix(".zip")?;
        tmp.write_all(b"this is not a zip")?;

        let err = load_zip(tmp.path()).unwrap_err();
        assert!(matches!(err, LoadError::Zip { .. }));
        Ok(())
    }
}
