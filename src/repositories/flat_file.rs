use serde::{de::DeserializeOwned, Serialize};
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, Instrument};

use crate::models::{StorageError, StorageResult};
use crate::observability::Metrics;

/// Generic JSON flat-file store holding one collection as a JSON array.
///
/// Reading a file that does not exist yet, is empty, or ends mid-document
/// yields an empty collection. Any other read or decode failure is an error.
pub struct FlatFileStore<T> {
    path: PathBuf,
    collection: String,
    metrics: Option<Arc<Metrics>>,
    _records: PhantomData<fn() -> T>,
}

impl<T> FlatFileStore<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Create a store for `collection` backed by the file at `path`
    pub fn new(path: impl Into<PathBuf>, collection: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            collection: collection.into(),
            metrics: None,
            _records: PhantomData,
        }
    }

    /// Record load/save counts and latencies in `metrics`
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn storage_span(&self, operation: &str) -> tracing::Span {
        tracing::info_span!(
            "storage",
            "storage.operation" = operation,
            "storage.collection" = %self.collection,
            "storage.path" = %self.path.display(),
            "otel.kind" = "client",
            "otel.name" = %format!("storage.{}", operation),
        )
    }

    fn record(&self, operation: &str, success: bool, started: Instant) {
        if let Some(metrics) = &self.metrics {
            metrics.record_storage_operation(
                operation,
                &self.collection,
                success,
                started.elapsed(),
            );
        }
    }

    /// Read and decode the whole collection
    pub async fn load(&self) -> StorageResult<Vec<T>> {
        let started = Instant::now();
        let result = self
            .read_collection()
            .instrument(self.storage_span("load"))
            .await;
        self.record("load", result.is_ok(), started);
        result
    }

    async fn read_collection(&self) -> StorageResult<Vec<T>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Collection file absent, treating as empty");
                return Ok(Vec::new());
            }
            Err(e) => {
                error!(error = %e, "Failed to read collection file");
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };

        if content.trim().is_empty() {
            debug!("Collection file empty, treating as empty");
            return Ok(Vec::new());
        }

        match serde_json::from_str(&content) {
            Ok(items) => Ok(items),
            Err(e) if e.is_eof() => {
                debug!(error = %e, "Collection file truncated, treating as empty");
                Ok(Vec::new())
            }
            Err(e) => {
                error!(error = %e, "Failed to decode collection file");
                Err(e.into())
            }
        }
    }

    /// Encode and write the whole collection.
    ///
    /// The JSON is written to a sibling temporary file that is then renamed
    /// over the target, so concurrent readers see either the old or the new
    /// collection.
    pub async fn save(&self, items: &[T]) -> StorageResult<()> {
        let started = Instant::now();
        let result = self
            .write_collection(items)
            .instrument(self.storage_span("save"))
            .await;
        self.record("save", result.is_ok(), started);
        result
    }

    async fn write_collection(&self, items: &[T]) -> StorageResult<()> {
        let json = serde_json::to_string_pretty(items)?;
        let io_error = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
        }

        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, json).await.map_err(io_error)?;
        if let Err(e) = tokio::fs::rename(&temp_path, &self.path).await {
            error!(error = %e, "Failed to replace collection file");
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(io_error(e));
        }

        debug!(records = items.len(), "Collection written");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
