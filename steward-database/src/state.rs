//! Per-collection application state with load/mutate/save semantics.
//!
//! Each top-level collection is one JSON document. Writes always overwrite the
//! whole document; `Collection::update` holds the collection lock across the
//! read-modify-write so concurrent flows cannot lose each other's updates.
//!
//! A collection keeps the last document it read or wrote in memory, so reads
//! after the first one never reach the backend. This process is the only
//! writer.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use anyhow::{Context as _, bail};
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use sqlx::types::Json;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::Database;
use crate::model::{CustomMessage, RoleReaction};

const CUSTOM_MESSAGES: &str = "custom_messages";
const ROLE_REACTIONS: &str = "role_reactions";

/// Storage for whole collection documents.
#[async_trait]
pub trait StateBackend: Send + Sync {
    /// Load a collection document, `None` when it was never saved.
    async fn load(&self, collection: &str) -> anyhow::Result<Option<Value>>;

    /// Overwrite a collection document.
    async fn save(&self, collection: &str, document: Value) -> anyhow::Result<()>;
}

#[async_trait]
impl StateBackend for Database {
    async fn load(&self, collection: &str) -> anyhow::Result<Option<Value>> {
        let row = sqlx::query_scalar::<_, Json<Value>>(
            "SELECT data FROM bot_state WHERE collection = $1",
        )
        .bind(collection)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(|Json(document)| document))
    }

    async fn save(&self, collection: &str, document: Value) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO bot_state (collection, data, updated_at) VALUES ($1, $2, now()) \
             ON CONFLICT (collection) DO UPDATE SET data = EXCLUDED.data, updated_at = now()",
        )
        .bind(collection)
        .bind(Json(document))
        .execute(self.pool())
        .await?;

        Ok(())
    }
}

/// Process-local backend used by tests and dry runs.
#[derive(Default)]
pub struct MemoryBackend {
    documents: RwLock<HashMap<String, Value>>,
    saves: RwLock<HashMap<String, usize>>,
    loads: AtomicUsize,
    fail_saves: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times a collection has been written.
    pub async fn save_count(&self, collection: &str) -> usize {
        self.saves
            .read()
            .await
            .get(collection)
            .copied()
            .unwrap_or_default()
    }

    /// Number of document reads across all collections.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    /// Make every write fail, as if the database were unreachable.
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::Relaxed);
    }

    /// Raw stored document, for asserting on the persisted shape.
    pub async fn document(&self, collection: &str) -> Option<Value> {
        self.documents.read().await.get(collection).cloned()
    }
}

#[async_trait]
impl StateBackend for MemoryBackend {
    async fn load(&self, collection: &str) -> anyhow::Result<Option<Value>> {
        self.loads.fetch_add(1, Ordering::Relaxed);
        Ok(self.documents.read().await.get(collection).cloned())
    }

    async fn save(&self, collection: &str, document: Value) -> anyhow::Result<()> {
        if self.fail_saves.load(Ordering::Relaxed) {
            bail!("collection `{collection}` could not be written");
        }
        self.documents
            .write()
            .await
            .insert(collection.to_owned(), document);
        *self
            .saves
            .write()
            .await
            .entry(collection.to_owned())
            .or_default() += 1;
        Ok(())
    }
}

/// A typed, lock-guarded list of records stored under one collection name.
pub struct Collection<T> {
    name: &'static str,
    backend: Arc<dyn StateBackend>,
    /// Records as last read or written; `None` until first access.
    cache: Mutex<Option<Vec<T>>>,
}

impl<T> Collection<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync,
{
    pub fn new(name: &'static str, backend: Arc<dyn StateBackend>) -> Self {
        Self {
            name,
            backend,
            cache: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Read the current records. Missing documents read as an empty list.
    pub async fn load(&self) -> anyhow::Result<Vec<T>> {
        let mut cache = self.cache.lock().await;
        Ok(self.cached(&mut cache).await?.clone())
    }

    /// First record matching `predicate`, without copying the whole list.
    pub async fn find<P>(&self, predicate: P) -> anyhow::Result<Option<T>>
    where
        P: Fn(&T) -> bool + Send,
    {
        let mut cache = self.cache.lock().await;
        let records = self.cached(&mut cache).await?;
        Ok(records.iter().find(|record| predicate(record)).cloned())
    }

    /// Overwrite the collection with `records`.
    pub async fn save(&self, records: &[T]) -> anyhow::Result<()> {
        let mut cache = self.cache.lock().await;
        self.write(records).await?;
        *cache = Some(records.to_vec());
        Ok(())
    }

    /// Load, mutate and save atomically relative to other calls on this
    /// collection. The document is flushed after every mutation; when the
    /// flush fails nothing changes.
    pub async fn update<R, F>(&self, mutate: F) -> anyhow::Result<R>
    where
        F: FnOnce(&mut Vec<T>) -> R + Send,
    {
        let mut cache = self.cache.lock().await;
        let mut records = self.cached(&mut cache).await?.clone();
        let result = mutate(&mut records);
        self.write(&records).await?;
        *cache = Some(records);
        Ok(result)
    }

    /// Append one record.
    pub async fn push(&self, record: T) -> anyhow::Result<usize> {
        self.update(move |records| {
            records.push(record);
            records.len()
        })
        .await
    }

    async fn cached<'c>(&self, cache: &'c mut Option<Vec<T>>) -> anyhow::Result<&'c Vec<T>> {
        if cache.is_none() {
            *cache = Some(self.read().await?);
        }
        Ok(cache.get_or_insert_with(Vec::new))
    }

    async fn read(&self) -> anyhow::Result<Vec<T>> {
        let Some(document) = self.backend.load(self.name).await? else {
            return Ok(Vec::new());
        };

        serde_json::from_value(document)
            .with_context(|| format!("collection `{}` holds malformed records", self.name))
    }

    async fn write(&self, records: &[T]) -> anyhow::Result<()> {
        let document = serde_json::to_value(records)?;
        self.backend.save(self.name, document).await?;
        debug!(collection = self.name, count = records.len(), "collection flushed");
        Ok(())
    }
}

/// All persisted application collections.
pub struct DataStore {
    pub custom_messages: Collection<CustomMessage>,
    pub role_reactions: Collection<RoleReaction>,
}

impl DataStore {
    pub fn new(backend: Arc<dyn StateBackend>) -> Self {
        Self {
            custom_messages: Collection::new(CUSTOM_MESSAGES, Arc::clone(&backend)),
            role_reactions: Collection::new(ROLE_REACTIONS, backend),
        }
    }
}
