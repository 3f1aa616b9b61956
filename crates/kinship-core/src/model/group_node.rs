//! # Group Node
//!
//! A synthesized multi-member node representing a symmetric (untargeted)
//! relationship among two or more people. Group nodes satisfy the same
//! minimal endpoint capability as persons (id + display name), so further
//! relationships can attach to a group.

use crate::model::resolver::{EntityResolver, MemoryResolver, StoreResolver};
use crate::model::person::Person;
use crate::model::relationship_type::RelationshipType;
use crate::model::{decode_record, encode_record};
use crate::schema::Collection;
use crate::store::KeyedStore;
use crate::types::{EntityId, KinshipError};
use serde::{Deserialize, Serialize};

// =============================================================================
// GROUP NODE
// =============================================================================

/// A hydrated group node.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupNode {
    /// Immutable entity id, assigned at creation.
    pub id: EntityId,
    /// Ordered member list, always at least two people.
    pub members: Vec<Person>,
    /// The group-forming relationship type; its target is always absent.
    pub relationship_type: RelationshipType,
}

impl GroupNode {
    /// Create a new group node with a fresh id.
    ///
    /// Fails with `Validation` when fewer than two members are given or
    /// when the type is directional (targeted).
    pub fn new(members: Vec<Person>, relationship_type: RelationshipType) -> Result<Self, KinshipError> {
        Self::assemble(EntityId::generate(), members, relationship_type)
    }

    /// Validate invariants and build the node. Shared by creation and
    /// hydration so stored records are held to the same rules.
    fn assemble(
        id: EntityId,
        members: Vec<Person>,
        relationship_type: RelationshipType,
    ) -> Result<Self, KinshipError> {
        if members.len() < 2 {
            return Err(KinshipError::Validation(format!(
                "group node needs at least 2 members, got {}",
                members.len()
            )));
        }
        if !relationship_type.is_group_forming() {
            return Err(KinshipError::Validation(format!(
                "group node type '{}' must be untargeted",
                relationship_type.name()
            )));
        }
        Ok(Self {
            id,
            members,
            relationship_type,
        })
    }

    /// Derived display name: the type name plus the first two member
    /// names, with a trailing ellipsis when members were truncated.
    #[must_use]
    pub fn name(&self) -> String {
        let shown: Vec<&str> = self.members.iter().take(2).map(|p| p.name.as_str()).collect();
        let suffix = if self.members.len() > 2 { ", ..." } else { "" };
        format!("{} [{}{}]", self.relationship_type.name(), shown.join(", "), suffix)
    }

    /// Flatten to the persisted record form: member and type references
    /// become ids.
    #[must_use]
    pub fn to_record(&self) -> GroupNodeRecord {
        GroupNodeRecord {
            id: self.id.clone(),
            members: self.members.iter().map(|p| p.id.clone()).collect(),
            relationship_type_id: self.relationship_type.id.clone(),
        }
    }

    /// Hydrate from a stored record, resolving every member and the type.
    /// Any resolution miss fails the whole hydration.
    pub fn from_record<R: EntityResolver + ?Sized>(
        record: GroupNodeRecord,
        resolver: &R,
    ) -> Result<Self, KinshipError> {
        let members = record
            .members
            .iter()
            .map(|id| resolver.resolve_person(id))
            .collect::<Result<Vec<_>, _>>()?;
        let relationship_type = resolver.resolve_type(&record.relationship_type_id)?;
        Self::assemble(record.id, members, relationship_type)
    }
}

// =============================================================================
// RECORD
// =============================================================================

/// The persisted form of a group node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupNodeRecord {
    pub id: EntityId,
    pub members: Vec<EntityId>,
    pub relationship_type_id: EntityId,
}

// =============================================================================
// REPOSITORY
// =============================================================================

/// Repository for group node records.
#[derive(Debug, Clone, Copy)]
pub struct GroupStore<'a> {
    store: &'a KeyedStore,
}

impl<'a> GroupStore<'a> {
    /// Create a repository over an open store.
    #[must_use]
    pub fn new(store: &'a KeyedStore) -> Self {
        Self { store }
    }

    /// Persist a group under its id, replacing any prior version.
    pub fn save(&self, group: &GroupNode) -> Result<(), KinshipError> {
        let bytes = encode_record(&group.to_record())?;
        self.store
            .put(Collection::GroupNodes, group.id.as_str(), &bytes)
    }

    /// Persist a list of groups, one transaction per element, in order.
    pub fn save_all(&self, groups: &[GroupNode]) -> Result<(), KinshipError> {
        for group in groups {
            self.save(group)?;
        }
        Ok(())
    }

    /// Load every group, resolving references with per-record store
    /// lookups.
    pub fn load_all(&self) -> Result<Vec<GroupNode>, KinshipError> {
        let resolver = StoreResolver::new(self.store);
        self.store
            .get_all(Collection::GroupNodes)?
            .iter()
            .map(|bytes| GroupNode::from_record(decode_record(bytes)?, &resolver))
            .collect()
    }

    /// Load every group, resolving references against preloaded sequences.
    /// Produces the same results as [`GroupStore::load_all`].
    pub fn load_all_with(
        &self,
        people: &[Person],
        types: &[RelationshipType],
    ) -> Result<Vec<GroupNode>, KinshipError> {
        let resolver = MemoryResolver {
            people,
            groups: &[],
            types,
        };
        self.store
            .get_all(Collection::GroupNodes)?
            .iter()
            .map(|bytes| GroupNode::from_record(decode_record(bytes)?, &resolver))
            .collect()
    }

    /// Load one group by id.
    pub fn load_by_id(&self, id: &EntityId) -> Result<Option<GroupNode>, KinshipError> {
        StoreResolver::new(self.store).group(id)
    }

    /// Delete a group. Relationships referencing it are left to fail
    /// hydration with `InvalidReference`.
    pub fn delete(&self, id: &EntityId) -> Result<(), KinshipError> {
        self.store.delete(Collection::GroupNodes, id.as_str())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::model::person::PersonStore;
    use crate::model::relationship_type::TypeStore;
    use tempfile::tempdir;

    fn sibling_type() -> RelationshipType {
        RelationshipType::new("sibling", None).expect("type")
    }

    fn two_people() -> Vec<Person> {
        vec![
            Person::new("Ada").expect("person"),
            Person::new("Byron").expect("person"),
        ]
    }

    #[test]
    fn needs_two_members() {
        let one = vec![Person::new("Ada").expect("person")];
        assert!(GroupNode::new(one, sibling_type()).is_err());
        assert!(GroupNode::new(two_people(), sibling_type()).is_ok());
    }

    #[test]
    fn rejects_directional_type() {
        let ty = RelationshipType::new("parent", Some("child".to_string())).expect("type");
        assert!(GroupNode::new(two_people(), ty).is_err());
    }

    #[test]
    fn name_shows_first_two_members() {
        let group = GroupNode::new(two_people(), sibling_type()).expect("group");
        assert_eq!(group.name(), "sibling [Ada, Byron]");
    }

    #[test]
    fn name_truncates_with_ellipsis() {
        let mut members = two_people();
        members.push(Person::new("Annabella").expect("person"));
        let group = GroupNode::new(members, sibling_type()).expect("group");
        assert_eq!(group.name(), "sibling [Ada, Byron, ...]");
    }

    #[test]
    fn roundtrip_through_store() {
        let temp = tempdir().expect("temp dir");
        let store = KeyedStore::open(temp.path().join("test.redb")).expect("open");

        let members = two_people();
        let ty = sibling_type();
        PersonStore::new(&store).save_all(&members).expect("save people");
        TypeStore::new(&store).save(&ty).expect("save type");

        let group = GroupNode::new(members, ty).expect("group");
        let groups = GroupStore::new(&store);
        groups.save(&group).expect("save group");

        assert_eq!(groups.load_by_id(&group.id).expect("load"), Some(group.clone()));
        assert_eq!(groups.load_all().expect("load all"), vec![group]);
    }

    #[test]
    fn bulk_hydration_matches_store_hydration() {
        let temp = tempdir().expect("temp dir");
        let store = KeyedStore::open(temp.path().join("test.redb")).expect("open");

        let members = two_people();
        let ty = sibling_type();
        PersonStore::new(&store).save_all(&members).expect("save people");
        TypeStore::new(&store).save(&ty).expect("save type");

        let group = GroupNode::new(members.clone(), ty.clone()).expect("group");
        let groups = GroupStore::new(&store);
        groups.save(&group).expect("save group");

        let via_store = groups.load_all().expect("load all");
        let via_memory = groups
            .load_all_with(&members, &[ty])
            .expect("load all with");
        assert_eq!(via_store, via_memory);
    }

    #[test]
    fn deleted_member_fails_hydration() {
        let temp = tempdir().expect("temp dir");
        let store = KeyedStore::open(temp.path().join("test.redb")).expect("open");

        let members = two_people();
        let ty = sibling_type();
        PersonStore::new(&store).save_all(&members).expect("save people");
        TypeStore::new(&store).save(&ty).expect("save type");

        let group = GroupNode::new(members.clone(), ty).expect("group");
        let groups = GroupStore::new(&store);
        groups.save(&group).expect("save group");

        // Deleting a member is not cascaded; the group's next hydration
        // surfaces the dangling reference instead of dropping the member.
        PersonStore::new(&store).delete(&members[0].id).expect("delete");

        let err = groups.load_by_id(&group.id).expect_err("must fail");
        assert!(matches!(err, KinshipError::InvalidReference { kind: "person", .. }));
    }
}
