//! # Person
//!
//! The central entity of the graph. A person carries its own prior-version
//! snapshots (`histories`, append-only, oldest-first) and a small inline
//! thumbnail; the full-resolution photo lives in the blob collection keyed
//! by the person's id and is never embedded in the record.

use crate::model::{decode_record, encode_record};
use crate::schema::{BlobCollection, Collection};
use crate::store::KeyedStore;
use crate::types::{EntityId, KinshipError, now_millis};
use serde::{Deserialize, Serialize};

// =============================================================================
// PERSON
// =============================================================================

/// A hydrated person.
///
/// Mutation model: build a new value (optionally calling
/// [`Person::archive_current`] first to keep the prior state), then re-save
/// under the same id. There is no partial-field update API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    /// Immutable entity id, assigned at creation.
    pub id: EntityId,
    /// Display name. Required, non-empty.
    pub name: String,
    /// Legacy inline encoded image, carried over from the flat-key era.
    pub photo: Option<String>,
    /// Small inline preview, a base64 data URL produced by
    /// [`crate::thumbnail::create_thumbnail`].
    pub thumbnail_photo: Option<String>,
    /// Free-form birth year text.
    pub birth_year: String,
    /// Free-form contact text.
    pub contact: String,
    /// Free-form notes.
    pub notes: String,
    /// Creation time, epoch milliseconds.
    pub timestamp: u64,
    /// Prior-version snapshots, oldest-first. A snapshot's position in this
    /// list is its version number.
    pub histories: Vec<PersonVersion>,
}

/// One archived prior version of a person.
///
/// Snapshots are flat: they never nest further snapshots, so the history
/// list stays an indexed arena rather than a recursive ownership chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonVersion {
    pub name: String,
    pub photo: Option<String>,
    pub thumbnail_photo: Option<String>,
    pub birth_year: String,
    pub contact: String,
    pub notes: String,
    pub timestamp: u64,
}

impl Person {
    /// Create a new person with a fresh id and creation timestamp.
    ///
    /// Fails with `Validation` if the name is empty.
    pub fn new(name: impl Into<String>) -> Result<Self, KinshipError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(KinshipError::Validation(
                "person name must not be empty".to_string(),
            ));
        }
        Ok(Self {
            id: EntityId::generate(),
            name,
            photo: None,
            thumbnail_photo: None,
            birth_year: String::new(),
            contact: String::new(),
            notes: String::new(),
            timestamp: now_millis(),
            histories: Vec::new(),
        })
    }

    /// Append the current field values to `histories` as a new snapshot.
    /// Call before editing, so the prior state is preserved.
    pub fn archive_current(&mut self) {
        let snapshot = PersonVersion {
            name: self.name.clone(),
            photo: self.photo.clone(),
            thumbnail_photo: self.thumbnail_photo.clone(),
            birth_year: self.birth_year.clone(),
            contact: self.contact.clone(),
            notes: self.notes.clone(),
            timestamp: self.timestamp,
        };
        self.histories.push(snapshot);
    }

    /// Flatten to the persisted record form. History snapshots become
    /// embedded records with empty `histories` of their own.
    #[must_use]
    pub fn to_record(&self) -> PersonRecord {
        PersonRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            photo: self.photo.clone(),
            thumbnail_photo: self.thumbnail_photo.clone(),
            birth_year: self.birth_year.clone(),
            contact: self.contact.clone(),
            notes: self.notes.clone(),
            timestamp: self.timestamp,
            histories: self
                .histories
                .iter()
                .map(|v| PersonRecord {
                    id: self.id.clone(),
                    name: v.name.clone(),
                    photo: v.photo.clone(),
                    thumbnail_photo: v.thumbnail_photo.clone(),
                    birth_year: v.birth_year.clone(),
                    contact: v.contact.clone(),
                    notes: v.notes.clone(),
                    timestamp: v.timestamp,
                    histories: Vec::new(),
                })
                .collect(),
        }
    }

    /// Hydrate from a stored record. Persons hold no foreign references,
    /// so no resolver is involved; nested history records fold back into
    /// flat snapshots.
    #[must_use]
    pub fn from_record(record: PersonRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            photo: record.photo,
            thumbnail_photo: record.thumbnail_photo,
            birth_year: record.birth_year,
            contact: record.contact,
            notes: record.notes,
            timestamp: record.timestamp,
            histories: record
                .histories
                .into_iter()
                .map(|r| PersonVersion {
                    name: r.name,
                    photo: r.photo,
                    thumbnail_photo: r.thumbnail_photo,
                    birth_year: r.birth_year,
                    contact: r.contact,
                    notes: r.notes,
                    timestamp: r.timestamp,
                })
                .collect(),
        }
    }
}

// =============================================================================
// RECORD
// =============================================================================

/// The persisted form of a person. `histories` embeds full prior records,
/// each with its own `histories` left empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRecord {
    pub id: EntityId,
    pub name: String,
    pub photo: Option<String>,
    pub thumbnail_photo: Option<String>,
    pub birth_year: String,
    pub contact: String,
    pub notes: String,
    pub timestamp: u64,
    pub histories: Vec<PersonRecord>,
}

// =============================================================================
// REPOSITORY
// =============================================================================

/// Repository for person records and their original-photo blobs.
#[derive(Debug, Clone, Copy)]
pub struct PersonStore<'a> {
    store: &'a KeyedStore,
}

impl<'a> PersonStore<'a> {
    /// Create a repository over an open store.
    #[must_use]
    pub fn new(store: &'a KeyedStore) -> Self {
        Self { store }
    }

    /// Persist a person under its id, replacing any prior version.
    pub fn save(&self, person: &Person) -> Result<(), KinshipError> {
        let bytes = encode_record(&person.to_record())?;
        self.store
            .put(Collection::People, person.id.as_str(), &bytes)
    }

    /// Persist a list of people, one transaction per element, in order.
    /// A failure partway leaves earlier elements committed.
    pub fn save_all(&self, people: &[Person]) -> Result<(), KinshipError> {
        for person in people {
            self.save(person)?;
        }
        Ok(())
    }

    /// Load every person, in native collection order.
    pub fn load_all(&self) -> Result<Vec<Person>, KinshipError> {
        self.store
            .get_all(Collection::People)?
            .iter()
            .map(|bytes| Ok(Person::from_record(decode_record(bytes)?)))
            .collect()
    }

    /// Load one person by id.
    pub fn load_by_id(&self, id: &EntityId) -> Result<Option<Person>, KinshipError> {
        match self.store.get_by_id(Collection::People, id.as_str())? {
            Some(bytes) => Ok(Some(Person::from_record(decode_record(&bytes)?))),
            None => Ok(None),
        }
    }

    /// Load one window of the people collection. Returns the hydrated
    /// window plus the total person count.
    pub fn load_page(&self, offset: usize, limit: usize) -> Result<(Vec<Person>, usize), KinshipError> {
        let page = self.store.paginate(Collection::People, offset, limit)?;
        let people = page
            .records
            .iter()
            .map(|bytes| Ok(Person::from_record(decode_record(bytes)?)))
            .collect::<Result<Vec<_>, KinshipError>>()?;
        Ok((people, page.total_count))
    }

    /// Delete a person and its original-photo blob.
    ///
    /// Referencing relationships and group nodes are NOT cascaded; their
    /// next hydration fails with `InvalidReference`.
    pub fn delete(&self, id: &EntityId) -> Result<(), KinshipError> {
        self.store.delete(Collection::People, id.as_str())?;
        self.store
            .delete_blob(BlobCollection::OriginalPhotos, id.as_str())
    }

    /// Store the full-resolution photo bytes for a person.
    pub fn save_original_photo(&self, id: &EntityId, bytes: &[u8]) -> Result<(), KinshipError> {
        self.store
            .put_blob(BlobCollection::OriginalPhotos, id.as_str(), bytes)
    }

    /// Load the full-resolution photo bytes for a person, if present.
    pub fn load_original_photo(&self, id: &EntityId) -> Result<Option<Vec<u8>>, KinshipError> {
        self.store
            .get_blob(BlobCollection::OriginalPhotos, id.as_str())
    }
}

// =============================================================================
// TESTS
// =============================================================================
