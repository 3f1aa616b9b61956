//! # Relationship Type
//!
//! A typed label for edges. A type with a target label is directional
//! ("parent" - "child"); a type without one is symmetric and group-forming
//! ("sibling"), and may collapse a person-to-person relationship into a
//! group node at construction time.

use crate::model::{decode_record, encode_record};
use crate::schema::Collection;
use crate::store::KeyedStore;
use crate::types::{EntityId, KinshipError};
use serde::{Deserialize, Serialize};

// =============================================================================
// RELATIONSHIP TYPE
// =============================================================================

/// A hydrated relationship type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipType {
    /// Immutable entity id, assigned at creation.
    pub id: EntityId,
    /// Label seen from the source side. Required, non-empty.
    pub source: String,
    /// Label seen from the target side. Absent for symmetric, group-forming
    /// types.
    pub target: Option<String>,
}

impl RelationshipType {
    /// Create a new relationship type with a fresh id.
    ///
    /// Fails with `Validation` if the source label is empty.
    pub fn new(
        source: impl Into<String>,
        target: Option<String>,
    ) -> Result<Self, KinshipError> {
        let source = source.into();
        if source.trim().is_empty() {
            return Err(KinshipError::Validation(
                "relationship type source label must not be empty".to_string(),
            ));
        }
        Ok(Self {
            id: EntityId::generate(),
            source,
            target,
        })
    }

    /// Whether this type synthesizes group nodes instead of plain
    /// relationships between two people.
    #[must_use]
    pub fn is_group_forming(&self) -> bool {
        self.target.is_none()
    }

    /// Derived display name: `"{source} - {target}"` when directional,
    /// otherwise just the source label.
    #[must_use]
    pub fn name(&self) -> String {
        match &self.target {
            Some(target) => format!("{} - {}", self.source, target),
            None => self.source.clone(),
        }
    }

    /// Flatten to the persisted record form.
    #[must_use]
    pub fn to_record(&self) -> RelationshipTypeRecord {
        RelationshipTypeRecord {
            id: self.id.clone(),
            source: self.source.clone(),
            target: self.target.clone(),
        }
    }

    /// Hydrate from a stored record.
    #[must_use]
    pub fn from_record(record: RelationshipTypeRecord) -> Self {
        Self {
            id: record.id,
            source: record.source,
            target: record.target,
        }
    }
}

// =============================================================================
// RECORD
// =============================================================================

/// The persisted form of a relationship type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipTypeRecord {
    pub id: EntityId,
    pub source: String,
    pub target: Option<String>,
}

// =============================================================================
// REPOSITORY
// =============================================================================

/// Repository for relationship type records.
#[derive(Debug, Clone, Copy)]
pub struct TypeStore<'a> {
    store: &'a KeyedStore,
}

impl<'a> TypeStore<'a> {
    /// Create a repository over an open store.
    #[must_use]
    pub fn new(store: &'a KeyedStore) -> Self {
        Self { store }
    }

    /// Persist a type under its id, replacing any prior version.
    pub fn save(&self, relationship_type: &RelationshipType) -> Result<(), KinshipError> {
        let bytes = encode_record(&relationship_type.to_record())?;
        self.store.put(
            Collection::RelationshipTypes,
            relationship_type.id.as_str(),
            &bytes,
        )
    }

    /// Persist a list of types, one transaction per element, in order.
    pub fn save_all(&self, types: &[RelationshipType]) -> Result<(), KinshipError> {
        for relationship_type in types {
            self.save(relationship_type)?;
        }
        Ok(())
    }

    /// Load every type, in native collection order.
    pub fn load_all(&self) -> Result<Vec<RelationshipType>, KinshipError> {
        self.store
            .get_all(Collection::RelationshipTypes)?
            .iter()
            .map(|bytes| Ok(RelationshipType::from_record(decode_record(bytes)?)))
            .collect()
    }

    /// Load one type by id.
    pub fn load_by_id(&self, id: &EntityId) -> Result<Option<RelationshipType>, KinshipError> {
        match self
            .store
            .get_by_id(Collection::RelationshipTypes, id.as_str())?
        {
            Some(bytes) => Ok(Some(RelationshipType::from_record(decode_record(&bytes)?))),
            None => Ok(None),
        }
    }

    /// Delete a type. Relationships and groups referencing it are left to
    /// fail hydration with `InvalidReference`.
    pub fn delete(&self, id: &EntityId) -> Result<(), KinshipError> {
        self.store.delete(Collection::RelationshipTypes, id.as_str())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn directional_type_name_joins_labels() {
        let ty = RelationshipType::new("parent", Some("child".to_string())).expect("type");
        assert_eq!(ty.name(), "parent - child");
        assert!(!ty.is_group_forming());
    }

    #[test]
    fn untargeted_type_name_is_source() {
        let ty = RelationshipType::new("sibling", None).expect("type");
        assert_eq!(ty.name(), "sibling");
        assert!(ty.is_group_forming());
    }

    #[test]
    fn empty_source_rejected() {
        assert!(RelationshipType::new("", None).is_err());
    }

    #[test]
    fn record_roundtrip() {
        let ty = RelationshipType::new("parent", Some("child".to_string())).expect("type");
        let restored = RelationshipType::from_record(ty.to_record());
        assert_eq!(restored, ty);
    }

    #[test]
    fn save_and_load_through_store() {
        let temp = tempdir().expect("temp dir");
        let store = KeyedStore::open(temp.path().join("test.redb")).expect("open");
        let types = TypeStore::new(&store);

        let ty = RelationshipType::new("friend", None).expect("type");
        types.save(&ty).expect("save");

        assert_eq!(types.load_by_id(&ty.id).expect("load"), Some(ty.clone()));
        assert_eq!(types.load_all().expect("load all"), vec![ty.clone()]);

        types.delete(&ty.id).expect("delete");
        assert_eq!(types.load_by_id(&ty.id).expect("load"), None);
    }
}
