// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to file storage.
//!
//! Every record kind implements [`Record`] and gets CRUD operations from
//! [`Repository`]; kind-specific queries live next to each record type.

use std::marker::PhantomData;

use serde::{de::DeserializeOwned, Serialize};

use super::{paths::is_valid_id, FileStorage, StorageError, StorageResult};

pub mod comments;
pub mod groups;
pub mod photometry;
pub mod sources;
pub mod spectra;
pub mod users;

pub use comments::{CommentRepository, StoredComment};
pub use groups::{GroupRepository, StoredGroup};
pub use photometry::{MagSys, PhotometryRepository, StoredPhotometry};
pub use sources::{SourceRepository, StoredSource};
pub use spectra::{SpectrumRepository, StoredSpectrum};
pub use users::{StoredUser, UserRepository};

/// A record stored as one JSON file in a named collection.
pub trait Record: Serialize + DeserializeOwned {
    /// Collection directory name.
    const COLLECTION: &'static str;
    /// Human-readable kind used in error messages.
    const LABEL: &'static str;

    /// Unique record identifier (also the file stem).
    fn id(&self) -> &str;
}

/// Typed CRUD access to one collection.
pub struct Repository<'a, T> {
    storage: &'a FileStorage,
    _record: PhantomData<T>,
}

impl<'a, T: Record> Repository<'a, T> {
    /// Create a repository over the given storage.
    pub fn new(storage: &'a FileStorage) -> Self {
        Self {
            storage,
            _record: PhantomData,
        }
    }

    /// Underlying storage.
    pub fn storage(&self) -> &'a FileStorage {
        self.storage
    }

    /// Check if a record exists. Unsafe identifiers never exist.
    pub fn exists(&self, id: &str) -> bool {
        is_valid_id(id)
            && self
                .storage
                .exists(self.storage.paths().record(T::COLLECTION, id))
    }

    /// Get a record by ID.
    pub fn get(&self, id: &str) -> StorageResult<T> {
        if !self.exists(id) {
            return Err(StorageError::NotFound(format!("{} {id}", T::LABEL)));
        }
        self.storage
            .read_json(self.storage.paths().record(T::COLLECTION, id))
    }

    /// Create a new record; fails if the ID is taken.
    pub fn create(&self, record: &T) -> StorageResult<()> {
        let id = record.id();
        if !is_valid_id(id) {
            return Err(StorageError::SerializationError(format!(
                "Invalid {} identifier: {id}",
                T::LABEL
            )));
        }
        if self.exists(id) {
            return Err(StorageError::AlreadyExists(format!("{} {id}", T::LABEL)));
        }

        self.storage
            .write_json(self.storage.paths().record(T::COLLECTION, id), record)
    }

    /// Replace an existing record.
    pub fn update(&self, record: &T) -> StorageResult<()> {
        let id = record.id();
        if !self.exists(id) {
            return Err(StorageError::NotFound(format!("{} {id}", T::LABEL)));
        }

        self.storage
            .write_json(self.storage.paths().record(T::COLLECTION, id), record)
    }

    /// Delete a record.
    pub fn delete(&self, id: &str) -> StorageResult<()> {
        if !self.exists(id) {
            return Err(StorageError::NotFound(format!("{} {id}", T::LABEL)));
        }

        self.storage
            .delete(self.storage.paths().record(T::COLLECTION, id))
    }

    /// List every record in the collection, ordered by ID.
    pub fn list_all(&self) -> StorageResult<Vec<T>> {
        let ids = self
            .storage
            .list_files(self.storage.paths().collection_dir(T::COLLECTION), "json")?;

        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            match self.get(&id) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(collection = T::COLLECTION, id = %id, error = %e, "Skipping unreadable record");
                }
            }
        }
        Ok(records)
    }

    /// Like [`Self::list_all`], but an unreadable record fails the listing.
    ///
    /// Use this wherever the result feeds an access decision.
    pub fn try_list_all(&self) -> StorageResult<Vec<T>> {
        self.storage
            .list_files(self.storage.paths().collection_dir(T::COLLECTION), "json")?
            .iter()
            .map(|id| self.get(id))
            .collect()
    }

    /// List records matching a predicate.
    pub fn list_where(&self, predicate: impl Fn(&T) -> bool) -> StorageResult<Vec<T>> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|record| predicate(record))
            .collect())
    }
}
