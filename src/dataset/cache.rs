// src/dataset/cache.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, PoisonError, RwLock,
    },
};
use tracing::{debug, info};

use super::CanonicalDataset;
use crate::error::{LoadError, Result};

/// Identity of one version of the source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetVersion {
    pub path: PathBuf,
    pub len: u64,
    pub modified: Option<DateTime<Utc>>,
}

impl DatasetVersion {
    pub fn of(path: &Path) -> Result<Self> {
        let meta = fs::metadata(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            len: meta.len(),
            modified: meta.modified().ok().map(DateTime::<Utc>::from),
        })
    }
}

type Entry = (DatasetVersion, Arc<CanonicalDataset>);

/// Holds the canonical dataset for one source file, keyed by its version.
///
/// Readers get a shared `Arc`; a rebuild runs under the write lock so each
/// version is computed at most once even with concurrent callers.
pub struct DatasetCache {
    path: PathBuf,
    entry: RwLock<Option<Entry>>,
    builds: AtomicUsize,
}

impl DatasetCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entry: RwLock::new(None),
            builds: AtomicUsize::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return the dataset for the file's current version, rebuilding only
    /// when the version changed or the cache was invalidated.
    ///
    /// On failure nothing is published and any previous entry is kept.
    pub fn get_or_load(&self) -> Result<Arc<CanonicalDataset>> {
        let version = DatasetVersion::of(&self.path)?;

        // 1) Fast path under the read lock
        {
            let entry = self.entry.read().unwrap_or_else(PoisonError::into_inner);
            if let Some((cached, dataset)) = entry.as_ref() {
                if *cached == version {
                    return Ok(Arc::clone(dataset));
                }
            }
        }

        // 2) Rebuild under the write lock, double-checking first
        let mut entry = self.entry.write().unwrap_or_else(PoisonError::into_inner);
        if let Some((cached, dataset)) = entry.as_ref() {
            if *cached == version {
                return Ok(Arc::clone(dataset));
            }
        }

        debug!(path = %self.path.display(), len = version.len, "building dataset");
        let dataset = Arc::new(CanonicalDataset::load(&self.path)?);
        self.builds.fetch_add(1, Ordering::Relaxed);
        info!(path = %self.path.display(), points = dataset.len(), "dataset cached");

        *entry = Some((version, Arc::clone(&dataset)));
        Ok(dataset)
    }

    /// The cached dataset, if any, without touching the file system.
    pub fn current(&self) -> Option<Arc<CanonicalDataset>> {
        let entry = self.entry.read().unwrap_or_else(PoisonError::into_inner);
        entry.as_ref().map(|(_, dataset)| Arc::clone(dataset))
    }

    /// Version of the cached dataset, if any.
    pub fn version(&self) -> Option<DatasetVersion> {
        let entry = self.entry.read().unwrap_or_else(PoisonError::into_inner);
        entry.as_ref().map(|(version, _)| version.clone())
    }

    /// Drop the cached entry; the next `get_or_load` rebuilds.
    pub fn invalidate(&self) {
        let mut entry = self.entry.write().unwrap_or_else(PoisonError::into_inner);
        *entry = None;
        debug!(path = %self.path.display(), "dataset cache invalidated");
    }

    /// Number of builds performed so far.
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::{io::Write, thread};
    use tempfile::NamedTempFile;

    const CSV: &str = "Country,Continent,2020 Population,2021 Population\n\
                       Kenya,Africa,\"50,000,000\",\"51,000,000\"\n";

    fn source(content: &str) -> Result<NamedTempFile> {
        let mut tmp = NamedTempFile::with_suffix(".csv")?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        Ok(tmp)
    }

    #[test]
    fn test_cache_serves_same_arc_for_same_version() -> Result<()> {
        let tmp = source(CSV)?;
        let cache = DatasetCache::new(tmp.path());

        let a = cache.get_or_load()?;
        let b = cache.get_or_load()?;
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.builds(), 1);
        assert_eq!(cache.version().map(|v| v.len), Some(CSV.len() as u64));
        Ok(())
    }

    #[test]
    fn test_changed_file_triggers_rebuild() -> Result<()> {
        let mut tmp = source(CSV)?;
        let cache = DatasetCache::new(tmp.path());
        let first = cache.get_or_load()?;

        tmp.write_all(b"Uganda,Africa,\"44,000,000\",\"45,000,000\"\n")?;
        tmp.flush()?;

        let second = cache.get_or_load()?;
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(cache.builds(), 2);
        assert!(second.len() > first.len());
        Ok(())
    }

    #[test]
    fn test_invalidate_forces_rebuild() -> Result<()> {
        let tmp = source(CSV)?;
        let cache = DatasetCache::new(tmp.path());
        let first = cache.get_or_load()?;

        cache.invalidate();
        assert!(cache.current().is_none());

        let second = cache.get_or_load()?;
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
        Ok(())
    }

    #[test]
    fn test_failed_rebuild_keeps_previous_entry() -> Result<()> {
        let tmp = source(CSV)?;
        let cache = DatasetCache::new(tmp.path());
        let first = cache.get_or_load()?;

        // replace with a header lacking required columns
        std::fs::write(tmp.path(), "Name,Region\nKenya,Africa\n")?;

        assert!(cache.get_or_load().is_err());
        let kept = cache.current().expect("previous entry kept");
        assert!(Arc::ptr_eq(&first, &kept));
        Ok(())
    }

    #[test]
    fn test_concurrent_callers_build_once() -> Result<()> {
        let tmp = source(CSV)?;
        let cache = Arc::new(DatasetCache::new(tmp.path()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || cache.get_or_load().map(|d| d.len()))
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().expect("thread panicked")?, 4);
        }
        assert_eq!(cache.builds(), 1);
        Ok(())
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let cache = DatasetCache::new("/no/such/world_population.csv");
        assert!(matches!(cache.get_or_load(), Err(LoadError::Io { .. })));
        assert!(cache.current().is_none());
    }
}
