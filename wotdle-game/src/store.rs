//! Durable store handle
//!
//! Wraps a [`KeyValueStorage`] and keeps the whole persisted record as one
//! blob under one key. Every write serializes the full record.

use std::cell::RefCell;
use std::collections::HashMap;
use std::convert::Infallible;
use std::rc::Rc;

use thiserror::Error;

use crate::KeyValueStorage;
use crate::persisted::{
    LATEST_VERSION, LegacyStore, ModeField, ModeValue, PersistedDataStore, StateKey, StoredBlob,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Storage(Box::new(err))
    }
}

/// Persisted record bound to its storage slot.
#[derive(Debug)]
pub struct PersistedStore<S: KeyValueStorage> {
    storage: S,
    key: String,
    data: PersistedDataStore,
    /// Blob still in the pre-version-2 layout, waiting for [`Self::migrate`].
    pending: Option<LegacyStore>,
}

impl<S: KeyValueStorage> PersistedStore<S> {
    /// Read the record under `key`.
    ///
    /// An absent record starts out empty at the latest version. A record that
    /// cannot be decoded is logged and replaced by an empty one.
    ///
    /// # Errors
    ///
    /// Returns an error only if the storage itself fails to read.
    pub fn load(storage: S, key: impl Into<String>) -> Result<Self, StoreError> {
        let key = key.into();
        let blob = match storage.load(&key).map_err(StoreError::storage)? {
            None => StoredBlob::Current(PersistedDataStore::default()),
            Some(raw) => StoredBlob::decode(&raw).unwrap_or_else(|err| {
                log::warn!("Discarding unreadable persisted record under '{key}': {err}");
                StoredBlob::Current(PersistedDataStore::default())
            }),
        };
        let (data, pending) = match blob {
            StoredBlob::Current(current) => (current, None),
            StoredBlob::Legacy(legacy) => (PersistedDataStore::default(), Some(legacy)),
        };
        Ok(Self {
            storage,
            key,
            data,
            pending,
        })
    }

    /// Load and migrate in one step. A failed write of the migrated record
    /// is logged; the migrated record is still used.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage fails to read.
    pub fn open(storage: S, key: impl Into<String>) -> Result<Self, StoreError> {
        let mut store = Self::load(storage, key)?;
        if let Err(err) = store.migrate() {
            log::warn!("Migrated record under '{}' was not saved: {err}", store.key);
        }
        Ok(store)
    }

    /// Bring the record to the latest layout, persisting the result.
    /// Returns whether anything changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the migrated record cannot be written. The
    /// in-memory record is migrated regardless.
    pub fn migrate(&mut self) -> Result<bool, StoreError> {
        if !self.migrate_in_memory() {
            return Ok(false);
        }
        self.flush()?;
        Ok(true)
    }

    fn migrate_in_memory(&mut self) -> bool {
        let from = match &self.pending {
            Some(legacy) => legacy.version,
            None if self.data.is_latest() => return false,
            None => self.data.version,
        };
        log::info!(
            "Updating persisted data store from {} to {LATEST_VERSION}",
            from.map_or_else(|| "unversioned".to_string(), |v| v.to_string())
        );
        self.data = match self.pending.take() {
            Some(legacy) => StoredBlob::Legacy(legacy).migrate(),
            None => std::mem::take(&mut self.data).migrate(),
        };
        true
    }

    /// Whether the record is readable at the latest layout.
    #[must_use]
    pub fn is_migrated(&self) -> bool {
        self.pending.is_none() && self.data.is_latest()
    }

    /// The migrated record, `None` until [`Self::migrate`] has run on a legacy blob.
    #[must_use]
    pub fn data(&self) -> Option<&PersistedDataStore> {
        self.pending.is_none().then_some(&self.data)
    }

    /// Version found in storage before any migration.
    #[must_use]
    pub fn stored_version(&self) -> Option<u32> {
        self.pending
            .as_ref()
            .map_or(self.data.version, |legacy| legacy.version)
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Read one field; `None` while the record is not at the latest version.
    #[must_use]
    pub fn get_mode_state(&self, key: StateKey, field: ModeField) -> Option<ModeValue> {
        self.data()?.get_mode_state(key, field)
    }

    /// Write one field and persist the whole record.
    /// Returns `Ok(false)` when the value does not fit the key.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    pub fn set_mode_state(&mut self, key: StateKey, value: ModeValue) -> Result<bool, StoreError> {
        self.update(|data| data.set_mode_state(key, value))
    }

    /// Apply `f` to the record and persist it with a single write.
    ///
    /// A legacy record is migrated first. The in-memory mutation stands even
    /// if the write fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut PersistedDataStore) -> R) -> Result<R, StoreError> {
        if self.pending.is_some() {
            self.migrate_in_memory();
        }
        let result = f(&mut self.data);
        self.flush()?;
        Ok(result)
    }

    /// Like [`Self::update`], but a failed write is logged instead of returned.
    pub fn update_or_warn<R>(&mut self, f: impl FnOnce(&mut PersistedDataStore) -> R) -> R {
        if self.pending.is_some() {
            self.migrate_in_memory();
        }
        let result = f(&mut self.data);
        if let Err(err) = self.flush() {
            log::warn!("Persisted record under '{}' was not saved: {err}", self.key);
        }
        result
    }

    /// Write the current record to storage.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the storage write fails.
    pub fn flush(&self) -> Result<(), StoreError> {
        let Some(data) = self.data() else {
            return Ok(());
        };
        let blob = serde_json::to_string(data)?;
        self.storage
            .save(&self.key, &blob)
            .map_err(StoreError::storage)
    }
}

/// In-process storage; clones share the same slots.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage seeded with one blob.
    #[must_use]
    pub fn with_blob(key: &str, blob: impl Into<String>) -> Self {
        let storage = Self::default();
        storage.slots.borrow_mut().insert(key.to_string(), blob.into());
        storage
    }

    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.slots.borrow().get(key).cloned()
    }
}

impl KeyValueStorage for MemoryStorage {
    type Error = Infallible;

    fn load(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn save(&self, key: &str, blob: &str) -> Result<(), Self::Error> {
        self.slots
            .borrow_mut()
            .insert(key.to_string(), blob.to_string());
        Ok(())
    }
}
