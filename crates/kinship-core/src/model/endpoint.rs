//! # Polymorphic Relationship Endpoints
//!
//! Either side of a relationship is a person or a synthesized group node.
//! The two kinds share only the minimal "has an id and a display name"
//! capability, modeled here as a tagged variant rather than duck typing.
//! References persist the kind tag next to the id, so resolution is a
//! single tagged lookup.

use crate::model::group_node::GroupNode;
use crate::model::person::Person;
use crate::types::{EndpointKind, EntityId};
use serde::{Deserialize, Serialize};

// =============================================================================
// ENDPOINT
// =============================================================================

/// A hydrated relationship endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum Endpoint {
    /// A person.
    Person(Person),
    /// A synthesized group node; groups are themselves valid endpoints,
    /// enabling relationships between a group and a person or another
    /// group.
    Group(GroupNode),
}

impl Endpoint {
    /// The endpoint's entity id.
    #[must_use]
    pub fn id(&self) -> &EntityId {
        match self {
            Self::Person(p) => &p.id,
            Self::Group(g) => &g.id,
        }
    }

    /// The endpoint's display name.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Person(p) => p.name.clone(),
            Self::Group(g) => g.name(),
        }
    }

    /// The persisted kind tag for this endpoint.
    #[must_use]
    pub fn kind(&self) -> EndpointKind {
        match self {
            Self::Person(_) => EndpointKind::Person,
            Self::Group(_) => EndpointKind::Group,
        }
    }

    /// The flat reference persisted in place of this endpoint.
    #[must_use]
    pub fn reference(&self) -> EndpointRef {
        EndpointRef {
            kind: self.kind(),
            id: self.id().clone(),
        }
    }
}

// =============================================================================
// ENDPOINT REFERENCE
// =============================================================================

/// The stored form of an endpoint: an id plus an explicit kind tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointRef {
    /// Which collection the id points into.
    pub kind: EndpointKind,
    /// The referenced entity id.
    pub id: EntityId,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn person_endpoint_exposes_id_name_kind() {
        let person = Person::new("Ada").expect("person");
        let id = person.id.clone();
        let endpoint = Endpoint::Person(person);

        assert_eq!(endpoint.id(), &id);
        assert_eq!(endpoint.name(), "Ada");
        assert_eq!(endpoint.kind(), EndpointKind::Person);

        let reference = endpoint.reference();
        assert_eq!(reference.kind, EndpointKind::Person);
        assert_eq!(reference.id, id);
    }
}
