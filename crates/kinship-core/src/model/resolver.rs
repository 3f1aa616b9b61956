//! # Reference Resolution
//!
//! Stored records reference other entities by id. Hydration turns those
//! ids back into entities through an [`EntityResolver`]: either live store
//! lookups ([`StoreResolver`]) or preloaded in-memory sequences
//! ([`MemoryResolver`], the N+1-query avoidance path). The two must
//! produce identical results; they differ only in where resolution data
//! comes from.
//!
//! A resolution miss is always an error. Hydration never constructs a
//! partial entity around a dangling reference.

use crate::model::endpoint::{Endpoint, EndpointRef};
use crate::model::group_node::GroupNode;
use crate::model::person::Person;
use crate::model::relationship_type::RelationshipType;
use crate::model::decode_record;
use crate::schema::Collection;
use crate::store::KeyedStore;
use crate::types::{EndpointKind, EntityId, KinshipError};

// =============================================================================
// RESOLVER TRAIT
// =============================================================================

/// Looks up referenced entities during hydration.
pub trait EntityResolver {
    /// The person stored under `id`, if any.
    fn person(&self, id: &EntityId) -> Result<Option<Person>, KinshipError>;

    /// The group node stored under `id`, if any, fully hydrated.
    fn group(&self, id: &EntityId) -> Result<Option<GroupNode>, KinshipError>;

    /// The relationship type stored under `id`, if any.
    fn relationship_type(&self, id: &EntityId) -> Result<Option<RelationshipType>, KinshipError>;

    /// Resolve a person reference or fail with `InvalidReference`.
    fn resolve_person(&self, id: &EntityId) -> Result<Person, KinshipError> {
        self.person(id)?
            .ok_or_else(|| KinshipError::invalid_reference("person", id))
    }

    /// Resolve a type reference or fail with `InvalidReference`.
    fn resolve_type(&self, id: &EntityId) -> Result<RelationshipType, KinshipError> {
        self.relationship_type(id)?
            .ok_or_else(|| KinshipError::invalid_reference("relationship type", id))
    }

    /// Resolve an endpoint reference through its kind tag: one lookup in
    /// the tagged collection, no cross-collection probing.
    fn resolve_endpoint(&self, reference: &EndpointRef) -> Result<Endpoint, KinshipError> {
        match reference.kind {
            EndpointKind::Person => Ok(Endpoint::Person(self.resolve_person(&reference.id)?)),
            EndpointKind::Group => self
                .group(&reference.id)?
                .map(Endpoint::Group)
                .ok_or_else(|| {
                    KinshipError::invalid_reference(reference.kind.as_str(), &reference.id)
                }),
        }
    }
}

// =============================================================================
// STORE-BACKED RESOLVER
// =============================================================================

/// Resolves references with one store lookup per reference.
#[derive(Debug, Clone, Copy)]
pub struct StoreResolver<'a> {
    store: &'a KeyedStore,
}

impl<'a> StoreResolver<'a> {
    /// Create a resolver over an open store.
    #[must_use]
    pub fn new(store: &'a KeyedStore) -> Self {
        Self { store }
    }
}

impl EntityResolver for StoreResolver<'_> {
    fn person(&self, id: &EntityId) -> Result<Option<Person>, KinshipError> {
        match self.store.get_by_id(Collection::People, id.as_str())? {
            Some(bytes) => Ok(Some(Person::from_record(decode_record(&bytes)?))),
            None => Ok(None),
        }
    }

    fn group(&self, id: &EntityId) -> Result<Option<GroupNode>, KinshipError> {
        match self.store.get_by_id(Collection::GroupNodes, id.as_str())? {
            Some(bytes) => {
                // Member and type references resolve recursively through
                // this same resolver.
                let group = GroupNode::from_record(decode_record(&bytes)?, self)?;
                Ok(Some(group))
            }
            None => Ok(None),
        }
    }

    fn relationship_type(&self, id: &EntityId) -> Result<Option<RelationshipType>, KinshipError> {
        match self
            .store
            .get_by_id(Collection::RelationshipTypes, id.as_str())?
        {
            Some(bytes) => Ok(Some(RelationshipType::from_record(decode_record(&bytes)?))),
            None => Ok(None),
        }
    }
}

// =============================================================================
// IN-MEMORY RESOLVER
// =============================================================================

/// Resolves references against preloaded sequences instead of issuing
/// per-reference store lookups. Lookups are linear scans, which is fine at
/// personal-graph scale.
#[derive(Debug, Clone, Copy)]
pub struct MemoryResolver<'a> {
    /// Candidate people.
    pub people: &'a [Person],
    /// Candidate hydrated groups.
    pub groups: &'a [GroupNode],
    /// Candidate relationship types.
    pub types: &'a [RelationshipType],
}

impl EntityResolver for MemoryResolver<'_> {
    fn person(&self, id: &EntityId) -> Result<Option<Person>, KinshipError> {
        Ok(self.people.iter().find(|p| &p.id == id).cloned())
    }

    fn group(&self, id: &EntityId) -> Result<Option<GroupNode>, KinshipError> {
        Ok(self.groups.iter().find(|g| &g.id == id).cloned())
    }

    fn relationship_type(&self, id: &EntityId) -> Result<Option<RelationshipType>, KinshipError> {
        Ok(self.types.iter().find(|t| &t.id == id).cloned())
    }
}

// =============================================================================
// TESTS
// =============================================================================
