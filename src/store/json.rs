//! JSON file-backed collection store.
//!
//! A store maps one file to one ordered collection. The whole collection is
//! read on `load` and rewritten on `save`; there is no partial update.

use super::{StoreError, StoreResult};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Shape of the JSON document on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    /// The document is a bare array: `[ {...}, {...} ]`.
    Array,
    /// The document is an object holding the array under one key:
    /// `{ "products": [ ... ] }`.
    Keyed(String),
}

/// What `load` does when the backing file is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingFile {
    /// Treat the collection as empty.
    Empty,
    /// Fail with [`StoreError::Missing`].
    Error,
}

/// A whole-file JSON store for a collection of `T`.
#[derive(Clone)]
pub struct JsonStore<T> {
    path: PathBuf,
    layout: Layout,
    missing: MissingFile,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonStore<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>, layout: Layout, missing: MissingFile) -> Self {
        Self {
            path: path.into(),
            layout,
            missing,
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the full collection, in file order.
    pub async fn load(&self) -> StoreResult<Vec<T>> {
        debug!(path = %self.path.display(), "Loading store");

        match fs::read_to_string(&self.path).await {
            Ok(content) => self.decode(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => match self.missing {
                MissingFile::Empty => Ok(Vec::new()),
                MissingFile::Error => Err(StoreError::Missing(self.path.clone())),
            },
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    /// Overwrite the file with `items`.
    ///
    /// The document is written to a sibling temp file and renamed over the
    /// target, so readers never observe a half-written file.
    pub async fn save(&self, items: &[T]) -> StoreResult<()> {
        debug!(path = %self.path.display(), count = items.len(), "Saving store");

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let content = serde_json::to_string_pretty(&self.encode(items)?)?;

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, &content).await?;
        fs::rename(&temp_path, &self.path).await?;

        Ok(())
    }

    /// Whether the backing file currently exists.
    pub async fn exists(&self) -> bool {
        fs::try_exists(&self.path).await.unwrap_or(false)
    }

    fn decode(&self, content: &str) -> StoreResult<Vec<T>> {
        let records: Vec<Value> = match &self.layout {
            Layout::Array => serde_json::from_str(content)?,
            Layout::Keyed(key) => {
                let mut document: Map<String, Value> = serde_json::from_str(content)?;
                let items = document.remove(key).ok_or_else(|| StoreError::MissingKey {
                    path: self.path.clone(),
                    key: key.clone(),
                })?;
                serde_json::from_value(items)?
            }
        };

        // Decoded one by one so a bad record can be named
        records
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                let id = record_label(&record);
                serde_json::from_value(record).map_err(|source| StoreError::InvalidRecord {
                    path: self.path.clone(),
                    index,
                    id,
                    source,
                })
            })
            .collect()
    }

    fn encode(&self, items: &[T]) -> StoreResult<Value> {
        let items = serde_json::to_value(items)?;
        Ok(match &self.layout {
            Layout::Array => items,
            Layout::Keyed(key) => {
                let mut document = Map::new();
                document.insert(key.clone(), items);
                Value::Object(document)
            }
        })
    }
}

/// The `id` or `name` of a raw record.
fn record_label(record: &Value) -> Option<String> {
    ["id", "name"]
        .iter()
        .find_map(|key| record.get(key).and_then(Value::as_str))
        .map(str::to_string)
}
