//! # Keyed Store Engine
//!
//! A versioned, migrating object store backed by redb.
//!
//! The engine knows nothing about entities. It persists opaque byte records
//! under string ids inside named collections, plus raw blobs under
//! caller-supplied keys. The entity repositories in [`crate::model`] encode
//! and decode records on top of these primitives.
//!
//! ## Schema upgrades
//!
//! `open` applies the additive migration list from [`crate::schema`] once,
//! before the handle is returned. Opening a table in a redb write
//! transaction creates it if absent and is a no-op otherwise, which gives
//! exactly the additive-only, never-destructive creation the schema
//! requires. Re-opening an up-to-date store changes nothing.
//!
//! ## Transactions
//!
//! Each call opens one short-lived transaction scoped to one collection.
//! There is no cross-collection atomicity: a relationship save and its
//! endpoint's save are independent operations. redb serializes writers
//! internally, so no locking appears at this layer.

use crate::schema::{self, BlobCollection, Collection};
use crate::types::KinshipError;
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::path::Path;

/// Record collections: entity id -> serialized record bytes.
const PEOPLE: TableDefinition<&str, &[u8]> = TableDefinition::new("people");
const RELATIONSHIP_TYPES: TableDefinition<&str, &[u8]> = TableDefinition::new("relationship_types");
const RELATIONSHIPS: TableDefinition<&str, &[u8]> = TableDefinition::new("relationships");
const GROUP_NODES: TableDefinition<&str, &[u8]> = TableDefinition::new("group_nodes");

/// Blob collection: caller-supplied key -> raw bytes.
const ORIGINAL_PHOTOS: TableDefinition<&str, &[u8]> = TableDefinition::new("original_photos");

/// Store metadata: key string -> value u32 (currently only `schema_version`).
const META: TableDefinition<&str, u32> = TableDefinition::new("meta");

const fn record_table(collection: Collection) -> TableDefinition<'static, &'static str, &'static [u8]> {
    match collection {
        Collection::People => PEOPLE,
        Collection::RelationshipTypes => RELATIONSHIP_TYPES,
        Collection::Relationships => RELATIONSHIPS,
        Collection::GroupNodes => GROUP_NODES,
    }
}

const fn blob_table(collection: BlobCollection) -> TableDefinition<'static, &'static str, &'static [u8]> {
    match collection {
        BlobCollection::OriginalPhotos => ORIGINAL_PHOTOS,
    }
}

// =============================================================================
// PAGINATION
// =============================================================================

/// One window of a paginated collection walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// The records inside `[offset, offset + limit)`, in native iteration
    /// order.
    pub records: Vec<Vec<u8>>,
    /// The total number of records in the collection, independent of the
    /// requested window.
    pub total_count: usize,
}

// =============================================================================
// KEYED STORE
// =============================================================================

/// A versioned keyed object store over a single redb database file.
pub struct KeyedStore {
    /// The redb database handle.
    db: Database,
}

impl std::fmt::Debug for KeyedStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyedStore").finish_non_exhaustive()
    }
}

impl KeyedStore {
    /// Open or create the store at the given path and bring its schema up
    /// to [`schema::SCHEMA_VERSION`].
    ///
    /// Upgrades are additive only: each pending migration step creates its
    /// collections and the stored version is bumped, all inside one write
    /// transaction. Opening an up-to-date store applies nothing, so
    /// repeated opens never duplicate or drop records.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, KinshipError> {
        let db = Database::create(path.as_ref())
            .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?;

        let store = Self { db };
        store.migrate()?;
        Ok(store)
    }

    /// Apply every migration step above the on-disk schema version.
    fn migrate(&self) -> Result<(), KinshipError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?;

        let from_version;
        let mut applied = 0u32;
        {
            let mut meta = write_txn
                .open_table(META)
                .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?;
            from_version = meta
                .get("schema_version")
                .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?
                .map(|v| v.value())
                .unwrap_or(0);

            for step in schema::MIGRATIONS.iter().filter(|m| m.version > from_version) {
                for collection in step.collections {
                    let _ = write_txn
                        .open_table(record_table(*collection))
                        .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?;
                }
                for blob in step.blobs {
                    let _ = write_txn
                        .open_table(blob_table(*blob))
                        .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?;
                }
                applied = step.version;
            }

            if applied > from_version {
                meta.insert("schema_version", applied)
                    .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?;
            }
        }
        write_txn
            .commit()
            .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?;

        if applied > from_version {
            tracing::info!(from = from_version, to = applied, "schema upgraded");
        }
        Ok(())
    }

    /// The schema version currently recorded on disk.
    pub fn schema_version(&self) -> Result<u32, KinshipError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?;
        let meta = read_txn
            .open_table(META)
            .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?;
        Ok(meta
            .get("schema_version")
            .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?
            .map(|v| v.value())
            .unwrap_or(0))
    }

    // =========================================================================
    // RECORD PRIMITIVES
    // =========================================================================

    /// Insert or replace the record stored under `id`.
    pub fn put(&self, collection: Collection, id: &str, bytes: &[u8]) -> Result<(), KinshipError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?;
        {
            let mut table = write_txn
                .open_table(record_table(collection))
                .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?;
            table
                .insert(id, bytes)
                .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?;
        Ok(())
    }

    /// All records in the collection, in native iteration order.
    pub fn get_all(&self, collection: Collection) -> Result<Vec<Vec<u8>>, KinshipError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?;
        let table = read_txn
            .open_table(record_table(collection))
            .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?;

        let mut records = Vec::new();
        for entry in table
            .iter()
            .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?
        {
            let (_, value) = entry.map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?;
            records.push(value.value().to_vec());
        }
        Ok(records)
    }

    /// The record stored under `id`, if any.
    pub fn get_by_id(&self, collection: Collection, id: &str) -> Result<Option<Vec<u8>>, KinshipError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?;
        let table = read_txn
            .open_table(record_table(collection))
            .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?;
        Ok(table
            .get(id)
            .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?
            .map(|v| v.value().to_vec()))
    }

    /// Remove the record stored under `id`. Removing an absent id is not an
    /// error.
    pub fn delete(&self, collection: Collection, id: &str) -> Result<(), KinshipError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?;
        {
            let mut table = write_txn
                .open_table(record_table(collection))
                .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?;
            table
                .remove(id)
                .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?;
        Ok(())
    }

    /// Number of records in the collection.
    pub fn count(&self, collection: Collection) -> Result<usize, KinshipError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?;
        let table = read_txn
            .open_table(record_table(collection))
            .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?;
        let count = table
            .len()
            .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?;
        Ok(count as usize)
    }

    /// Walk the whole collection, count every record, and return the
    /// `[offset, offset + limit)` window.
    ///
    /// O(collection size) per call by design: there is no secondary index,
    /// which is acceptable at personal-graph scale.
    pub fn paginate(
        &self,
        collection: Collection,
        offset: usize,
        limit: usize,
    ) -> Result<Page, KinshipError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?;
        let table = read_txn
            .open_table(record_table(collection))
            .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?;

        let mut records = Vec::new();
        let mut total_count = 0usize;
        for entry in table
            .iter()
            .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?
        {
            let (_, value) = entry.map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?;
            if total_count >= offset && records.len() < limit {
                records.push(value.value().to_vec());
            }
            total_count += 1;
        }
        Ok(Page {
            records,
            total_count,
        })
    }

    // =========================================================================
    // BLOB PRIMITIVES
    // =========================================================================

    /// Insert or replace the blob stored under `key`.
    pub fn put_blob(
        &self,
        collection: BlobCollection,
        key: &str,
        bytes: &[u8],
    ) -> Result<(), KinshipError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?;
        {
            let mut table = write_txn
                .open_table(blob_table(collection))
                .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?;
            table
                .insert(key, bytes)
                .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?;
        Ok(())
    }

    /// The blob stored under `key`, if any.
    pub fn get_blob(
        &self,
        collection: BlobCollection,
        key: &str,
    ) -> Result<Option<Vec<u8>>, KinshipError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?;
        let table = read_txn
            .open_table(blob_table(collection))
            .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?;
        Ok(table
            .get(key)
            .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?
            .map(|v| v.value().to_vec()))
    }

    /// Remove the blob stored under `key`. Removing an absent key is not an
    /// error.
    pub fn delete_blob(&self, collection: BlobCollection, key: &str) -> Result<(), KinshipError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?;
        {
            let mut table = write_txn
                .open_table(blob_table(collection))
                .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?;
            table
                .remove(key)
                .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?;
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
