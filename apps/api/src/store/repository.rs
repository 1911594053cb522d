use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("{kind} '{id}' cannot be changed: {reason}")]
    Protected {
        kind: &'static str,
        id: String,
        reason: String,
    },

    #[error("{kind} '{id}' already exists")]
    DuplicateId { kind: &'static str, id: String },
}

/// A domain record owned by a [`Repository`].
pub trait Record: Clone + Send + Sync + 'static {
    /// Human-readable kind, used in errors and logs.
    const KIND: &'static str;
    /// Prefix for generated ids.
    const ID_PREFIX: &'static str;

    fn id(&self) -> &str;
    fn assign_id(&mut self, id: String);

    /// Bumps the update timestamp. Read-only record kinds keep the default no-op.
    fn touch(&mut self, _now: DateTime<Utc>) {}

    /// Sets creation and update timestamps for a freshly created record.
    fn mark_created(&mut self, now: DateTime<Utc>) {
        self.touch(now);
    }

    /// Refuses deletion while the record sits in a protected status.
    fn check_deletable(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Records with a binary enabled/disabled status.
pub trait StatusToggle: Record {
    fn toggle_status(&mut self);
}

/// Records that can be copied into a new, least-privileged record.
pub trait Duplicate: Record {
    /// Returns the copy without an id; the repository assigns one.
    fn duplicate(&self) -> Self;
}

/// Owns the authoritative collection of one record kind. Every operation
/// takes the lock once, so status checks and the mutation they guard are atomic.
#[derive(Debug)]
pub struct Repository<T> {
    records: RwLock<Vec<T>>,
}

impl<T: Record> Default for Repository<T> {
    fn default() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }
}

impl<T: Record> Repository<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a repository from existing records, refusing duplicate ids.
    pub fn from_records(records: Vec<T>) -> Result<Self, StoreError> {
        let repo = Self::new();
        for record in records {
            repo.insert(record)?;
        }
        Ok(repo)
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<T>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<T>> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn not_found(id: &str) -> StoreError {
        StoreError::NotFound {
            kind: T::KIND,
            id: id.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Runs `f` against the collection without cloning it.
    pub fn with_records<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.read())
    }

    pub fn get(&self, id: &str) -> Result<T, StoreError> {
        self.read()
            .iter()
            .find(|r| r.id() == id)
            .cloned()
            .ok_or_else(|| Self::not_found(id))
    }

    /// Appends `record` under a freshly generated id and stamps it as created now.
    pub fn create(&self, mut record: T) -> Result<T, StoreError> {
        let mut records = self.write();
        let id = loop {
            let candidate = format!("{}-{}", T::ID_PREFIX, Uuid::new_v4().simple());
            if !records.iter().any(|r| r.id() == candidate) {
                break candidate;
            }
        };
        record.assign_id(id);
        record.mark_created(Utc::now());
        records.push(record.clone());
        info!("Created {} {}", T::KIND, record.id());
        Ok(record)
    }

    /// Appends `record` keeping its id. Never overwrites an existing record.
    pub fn insert(&self, record: T) -> Result<T, StoreError> {
        let mut records = self.write();
        if records.iter().any(|r| r.id() == record.id()) {
            return Err(StoreError::DuplicateId {
                kind: T::KIND,
                id: record.id().to_string(),
            });
        }
        records.push(record.clone());
        debug!("Inserted {} {}", T::KIND, record.id());
        Ok(record)
    }

    /// Replaces the record with `id` by `record`, keeping the id and bumping
    /// the update timestamp. Unknown ids leave the collection untouched.
    pub fn update(&self, id: &str, mut record: T) -> Result<T, StoreError> {
        let mut records = self.write();
        let slot = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| Self::not_found(id))?;
        record.assign_id(id.to_string());
        record.touch(Utc::now());
        *slot = record.clone();
        info!("Updated {} {}", T::KIND, id);
        Ok(record)
    }

    /// Applies `f` to a copy of the record and stores the result only when `f`
    /// succeeds, so a rejected change leaves the stored record as it was.
    /// The write lock is held from the read through the write-back, so a
    /// partial update never overwrites a change made by another request.
    pub fn modify<E>(
        &self,
        id: &str,
        f: impl FnOnce(&mut T) -> Result<(), E>,
    ) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let mut records = self.write();
        let slot = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| Self::not_found(id))?;
        let mut draft = slot.clone();
        f(&mut draft)?;
        draft.assign_id(id.to_string());
        draft.touch(Utc::now());
        *slot = draft.clone();
        info!("Modified {} {}", T::KIND, id);
        Ok(draft)
    }

    /// Runs `f` over a copy of the whole collection and commits it only on
    /// success. Used for rules that span several records.
    pub fn transact<R>(
        &self,
        f: impl FnOnce(&mut Vec<T>) -> Result<R, StoreError>,
    ) -> Result<R, StoreError> {
        let mut records = self.write();
        let mut draft = records.clone();
        let out = f(&mut draft)?;
        *records = draft;
        Ok(out)
    }

    /// Removes the record with `id` unless its status protects it.
    pub fn delete(&self, id: &str) -> Result<T, StoreError> {
        let mut records = self.write();
        let index = records
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| Self::not_found(id))?;
        if let Err(reason) = records[index].check_deletable() {
            warn!("Refused to delete {} {}: {}", T::KIND, id, reason);
            return Err(StoreError::Protected {
                kind: T::KIND,
                id: id.to_string(),
                reason,
            });
        }
        let removed = records.remove(index);
        info!("Deleted {} {}", T::KIND, id);
        Ok(removed)
    }
}

impl<T: StatusToggle> Repository<T> {
    pub fn toggle(&self, id: &str) -> Result<T, StoreError> {
        self.modify(id, |record| {
            record.toggle_status();
            Ok(())
        })
    }
}

impl<T: Duplicate> Repository<T> {
    /// Appends a copy of the record with `id` and returns the copy.
    pub fn duplicate(&self, id: &str) -> Result<T, StoreError> {
        let source = self.get(id)?;
        let copy = self.create(source.duplicate())?;
        info!("Copied {} {} to {}", T::KIND, id, copy.id());
        Ok(copy)
    }
}
