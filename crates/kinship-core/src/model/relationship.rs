//! # Relationship
//!
//! A typed edge between two polymorphic endpoints. The factory is
//! discriminating: an untargeted type applied to two people collapses the
//! pair into a [`GroupNode`] instead, so callers branch on the returned
//! kind.

use crate::model::endpoint::{Endpoint, EndpointRef};
use crate::model::group_node::GroupNode;
use crate::model::person::Person;
use crate::model::relationship_type::RelationshipType;
use crate::model::resolver::{EntityResolver, MemoryResolver, StoreResolver};
use crate::model::{decode_record, encode_record};
use crate::schema::Collection;
use crate::store::KeyedStore;
use crate::types::{EntityId, KinshipError};
use serde::{Deserialize, Serialize};

// =============================================================================
// RELATIONSHIP
// =============================================================================

/// A hydrated relationship.
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    /// Immutable entity id, assigned at creation.
    pub id: EntityId,
    /// The source endpoint.
    pub source: Endpoint,
    /// The target endpoint.
    pub target: Endpoint,
    /// The edge's type.
    pub relationship_type: RelationshipType,
    /// Mirror of `source.id()`, rebuilt on hydration and never persisted.
    /// Consumed directly by force-directed graph rendering.
    pub source_id: EntityId,
    /// Mirror of `target.id()`, rebuilt on hydration and never persisted.
    pub target_id: EntityId,
}

/// What [`Relationship::create`] produced. An untargeted type between two
/// people yields a group; everything else yields a relationship.
#[derive(Debug, Clone, PartialEq)]
pub enum Created {
    /// A plain typed edge.
    Relationship(Relationship),
    /// The endpoint pair collapsed into a group node.
    Group(GroupNode),
}

impl Relationship {
    /// Discriminating factory.
    ///
    /// When the type is group-forming (no target label) and both endpoints
    /// are people, the pair is collapsed into a new [`GroupNode`] with
    /// exactly those two members — a construction-time branch, not a
    /// migration step. Otherwise a plain relationship is created.
    pub fn create(
        source: Endpoint,
        target: Endpoint,
        relationship_type: RelationshipType,
    ) -> Result<Created, KinshipError> {
        if relationship_type.is_group_forming() {
            if let (Endpoint::Person(a), Endpoint::Person(b)) = (&source, &target) {
                let group = GroupNode::new(vec![a.clone(), b.clone()], relationship_type)?;
                return Ok(Created::Group(group));
            }
        }
        Ok(Created::Relationship(Self::assemble(
            EntityId::generate(),
            source,
            target,
            relationship_type,
        )))
    }

    /// Build a relationship and its endpoint-id mirrors.
    fn assemble(
        id: EntityId,
        source: Endpoint,
        target: Endpoint,
        relationship_type: RelationshipType,
    ) -> Self {
        let source_id = source.id().clone();
        let target_id = target.id().clone();
        Self {
            id,
            source,
            target,
            relationship_type,
            source_id,
            target_id,
        }
    }

    /// Flatten to the persisted record form. Endpoints become tagged
    /// references; the `source_id`/`target_id` mirrors are not persisted.
    #[must_use]
    pub fn to_record(&self) -> RelationshipRecord {
        RelationshipRecord {
            id: self.id.clone(),
            source: self.source.reference(),
            target: self.target.reference(),
            relationship_type_id: self.relationship_type.id.clone(),
        }
    }

    /// Hydrate from a stored record, resolving both endpoints and the
    /// type. Any resolution miss fails the whole hydration; a relationship
    /// never materializes with a missing endpoint.
    pub fn from_record<R: EntityResolver + ?Sized>(
        record: RelationshipRecord,
        resolver: &R,
    ) -> Result<Self, KinshipError> {
        let source = resolver.resolve_endpoint(&record.source)?;
        let target = resolver.resolve_endpoint(&record.target)?;
        let relationship_type = resolver.resolve_type(&record.relationship_type_id)?;
        Ok(Self::assemble(record.id, source, target, relationship_type))
    }
}

// =============================================================================
// RECORD
// =============================================================================

/// The persisted form of a relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    pub id: EntityId,
    pub source: EndpointRef,
    pub target: EndpointRef,
    pub relationship_type_id: EntityId,
}

// =============================================================================
// REPOSITORY
// =============================================================================

/// Repository for relationship records.
#[derive(Debug, Clone, Copy)]
pub struct RelationshipStore<'a> {
    store: &'a KeyedStore,
}

impl<'a> RelationshipStore<'a> {
    /// Create a repository over an open store.
    #[must_use]
    pub fn new(store: &'a KeyedStore) -> Self {
        Self { store }
    }

    /// Persist a relationship under its id, replacing any prior version.
    pub fn save(&self, relationship: &Relationship) -> Result<(), KinshipError> {
        let bytes = encode_record(&relationship.to_record())?;
        self.store
            .put(Collection::Relationships, relationship.id.as_str(), &bytes)
    }

    /// Persist a list of relationships, one transaction per element, in
    /// order. A failure partway leaves earlier elements committed.
    pub fn save_all(&self, relationships: &[Relationship]) -> Result<(), KinshipError> {
        for relationship in relationships {
            self.save(relationship)?;
        }
        Ok(())
    }

    /// Load every relationship, resolving references with per-record store
    /// lookups.
    pub fn load_all(&self) -> Result<Vec<Relationship>, KinshipError> {
        let resolver = StoreResolver::new(self.store);
        self.store
            .get_all(Collection::Relationships)?
            .iter()
            .map(|bytes| Relationship::from_record(decode_record(bytes)?, &resolver))
            .collect()
    }

    /// Load every relationship, resolving references against preloaded
    /// sequences. Produces the same results as
    /// [`RelationshipStore::load_all`].
    pub fn load_all_with(
        &self,
        people: &[Person],
        groups: &[GroupNode],
        types: &[RelationshipType],
    ) -> Result<Vec<Relationship>, KinshipError> {
        let resolver = MemoryResolver {
            people,
            groups,
            types,
        };
        self.store
            .get_all(Collection::Relationships)?
            .iter()
            .map(|bytes| Relationship::from_record(decode_record(bytes)?, &resolver))
            .collect()
    }

    /// Load one relationship by id.
    pub fn load_by_id(&self, id: &EntityId) -> Result<Option<Relationship>, KinshipError> {
        match self.store.get_by_id(Collection::Relationships, id.as_str())? {
            Some(bytes) => {
                let resolver = StoreResolver::new(self.store);
                Ok(Some(Relationship::from_record(
                    decode_record(&bytes)?,
                    &resolver,
                )?))
            }
            None => Ok(None),
        }
    }

    /// Delete a relationship.
    pub fn delete(&self, id: &EntityId) -> Result<(), KinshipError> {
        self.store.delete(Collection::Relationships, id.as_str())
    }
}

// =============================================================================
// TESTS
// =============================================================================
