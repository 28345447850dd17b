//! Uniform result of a successful compilation.
//!
//! Every backend produces its own native analysis (the incremental
//! compilation state); this module defines the queryable wrapper the
//! caller sees, plus a JSON file-backed implementation for backends
//! that have no native store of their own and for tests.
//!
//! An analysis is owned by the caller after `compile` returns. It is
//! written to disk only through an explicit [`Analysis::write_to_file`]
//! call, never automatically.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Queryable compilation result.
pub trait Analysis: Send + std::fmt::Debug {
    /// Compiled output files produced from one source file.
    fn products(&self, source: &Path) -> BTreeSet<PathBuf>;

    /// Compilation timestamp of one source file, milliseconds since the
    /// Unix epoch. `None` when the source is not part of this analysis.
    fn compilation_time(&self, source: &Path) -> Option<i64>;

    /// Update the recorded timestamp of one compiled output file to its
    /// current on-disk modification time. A no-op for backends whose
    /// native analysis does not track product timestamps.
    fn update_product_timestamp(&mut self, product: &Path) -> Result<()>;

    /// Persist the whole analysis to a cache file.
    fn write_to_file(&self, cache_file: &Path) -> Result<()>;
}

/// Reads analyses back from cache files.
pub trait AnalysisStore: Send + Sync {
    /// Whether analyses read by this store track per-product timestamps.
    fn product_timestamps_supported(&self) -> bool;

    fn read_from_file(&self, cache_file: &Path) -> Result<Box<dyn Analysis>>;
}

/// Per-source record inside a [`FileAnalysis`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SourceRecord {
    /// Product file -> recorded modification time (millis).
    products: BTreeMap<PathBuf, i64>,

    /// Compilation start time, millis since the Unix epoch.
    compiled_at: i64,
}

/// JSON file-backed [`Analysis`] implementation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileAnalysis {
    sources: BTreeMap<PathBuf, SourceRecord>,
}

impl FileAnalysis {
    pub fn new() -> Self {
        FileAnalysis::default()
    }

    /// Record one compiled source with its products.
    pub fn record(
        &mut self,
        source: impl Into<PathBuf>,
        products: impl IntoIterator<Item = PathBuf>,
        compiled_at: i64,
    ) {
        let record = SourceRecord {
            products: products.into_iter().map(|p| (p, compiled_at)).collect(),
            compiled_at,
        };
        self.sources.insert(source.into(), record);
    }

    /// Load an analysis previously written with
    /// [`Analysis::write_to_file`].
    pub fn load(cache_file: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(cache_file)
            .with_context(|| format!("failed to read analysis cache: {}", cache_file.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse analysis cache: {}", cache_file.display()))
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl Analysis for FileAnalysis {
    fn products(&self, source: &Path) -> BTreeSet<PathBuf> {
        self.sources
            .get(source)
            .map(|record| record.products.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn compilation_time(&self, source: &Path) -> Option<i64> {
        self.sources.get(source).map(|record| record.compiled_at)
    }

    fn update_product_timestamp(&mut self, product: &Path) -> Result<()> {
        let mtime = std::fs::metadata(product)
            .and_then(|meta| meta.modified())
            .with_context(|| format!("failed to stat product: {}", product.display()))?;
        let millis = mtime
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);

        for record in self.sources.values_mut() {
            if let Some(ts) = record.products.get_mut(product) {
                *ts = millis;
            }
        }
        Ok(())
    }

    fn write_to_file(&self, cache_file: &Path) -> Result<()> {
        if let Some(parent) = cache_file.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create cache directory: {}", parent.display())
            })?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(cache_file, contents)
            .with_context(|| format!("failed to write analysis cache: {}", cache_file.display()))
    }
}

/// [`AnalysisStore`] for [`FileAnalysis`] caches.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileAnalysisStore;

impl AnalysisStore for FileAnalysisStore {
    fn product_timestamps_supported(&self) -> bool {
        true
    }

    fn read_from_file(&self, cache_file: &Path) -> Result<Box<dyn Analysis>> {
        Ok(Box::new(FileAnalysis::load(cache_file)?))
    }
}
