//! End-to-end tests over a real on-disk store: a full graph written and
//! read back through both hydration paths, dangling-reference surfacing
//! after a delete, schema migration across reopens, and the legacy
//! import feeding the keyed collections.

#![allow(clippy::unwrap_used, clippy::panic)]

use kinship_core::{
    Created, Endpoint, GroupNode, GroupStore, KeyedStore, KinshipError, LegacyPerson,
    LegacyRelationship, LegacyRelationshipType, LegacyStore, Person, PersonStore, Relationship,
    RelationshipStore, RelationshipType, SCHEMA_VERSION, TypeStore,
};
use tempfile::tempdir;

fn person(name: &str) -> Person {
    Person::new(name).expect("person")
}

#[test]
fn full_graph_roundtrip_both_hydration_paths() {
    let temp = tempdir().expect("temp dir");
    let store = KeyedStore::open(temp.path().join("graph.redb")).expect("open");

    let ada = person("Ada");
    let byron = person("Byron");
    let annabella = person("Annabella");
    let all_people = vec![ada.clone(), byron.clone(), annabella.clone()];

    let parent = RelationshipType::new("parent", Some("child".to_string())).expect("type");
    let sibling = RelationshipType::new("sibling", None).expect("type");
    let friend = RelationshipType::new("friend", Some("friend".to_string())).expect("type");
    let all_types = vec![parent.clone(), sibling.clone(), friend.clone()];

    let group = GroupNode::new(vec![byron.clone(), annabella.clone()], sibling.clone())
        .expect("group");

    let Created::Relationship(parent_rel) = Relationship::create(
        Endpoint::Person(byron.clone()),
        Endpoint::Person(ada.clone()),
        parent,
    )
    .expect("create")
    else {
        panic!("expected relationship");
    };
    let Created::Relationship(group_rel) = Relationship::create(
        Endpoint::Group(group.clone()),
        Endpoint::Person(ada.clone()),
        friend,
    )
    .expect("create")
    else {
        panic!("expected relationship");
    };

    PersonStore::new(&store).save_all(&all_people).expect("save people");
    TypeStore::new(&store).save_all(&all_types).expect("save types");
    GroupStore::new(&store).save(&group).expect("save group");
    RelationshipStore::new(&store)
        .save_all(&[parent_rel.clone(), group_rel.clone()])
        .expect("save rels");

    let rels = RelationshipStore::new(&store);
    let mut via_store = rels.load_all().expect("load all");
    via_store.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));

    let groups = GroupStore::new(&store).load_all().expect("load groups");
    let mut via_memory = rels
        .load_all_with(&all_people, &groups, &all_types)
        .expect("load all with");
    via_memory.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));

    assert_eq!(via_store, via_memory);
    assert_eq!(via_store.len(), 2);

    let loaded_group_rel = via_store
        .iter()
        .find(|r| r.id == group_rel.id)
        .expect("group rel present");
    assert!(matches!(loaded_group_rel.source, Endpoint::Group(_)));
    assert_eq!(loaded_group_rel.source.name(), group.name());
}

#[test]
fn person_delete_leaves_dangling_references_to_surface() {
    let temp = tempdir().expect("temp dir");
    let store = KeyedStore::open(temp.path().join("graph.redb")).expect("open");

    let ada = person("Ada");
    let byron = person("Byron");
    let parent = RelationshipType::new("parent", Some("child".to_string())).expect("type");

    let Created::Relationship(rel) = Relationship::create(
        Endpoint::Person(byron.clone()),
        Endpoint::Person(ada.clone()),
        parent.clone(),
    )
    .expect("create")
    else {
        panic!("expected relationship");
    };

    let people = PersonStore::new(&store);
    people.save_all(&[ada.clone(), byron]).expect("save people");
    people
        .save_original_photo(&ada.id, &[0xFF, 0xD8, 0xFF, 0xE0])
        .expect("save photo");
    TypeStore::new(&store).save(&parent).expect("save type");
    RelationshipStore::new(&store).save(&rel).expect("save rel");

    people.delete(&ada.id).expect("delete");

    // The record and its blob are gone.
    assert_eq!(people.load_by_id(&ada.id).expect("load"), None);
    assert_eq!(people.load_original_photo(&ada.id).expect("photo"), None);

    // The relationship record still exists but can no longer hydrate.
    let err = RelationshipStore::new(&store)
        .load_all()
        .expect_err("must fail");
    assert!(matches!(err, KinshipError::InvalidReference { .. }));
}

#[test]
fn schema_version_persists_across_reopens() {
    let temp = tempdir().expect("temp dir");
    let path = temp.path().join("graph.redb");

    {
        let store = KeyedStore::open(&path).expect("open");
        assert_eq!(store.schema_version().expect("version"), SCHEMA_VERSION);
        PersonStore::new(&store)
            .save(&person("Ada"))
            .expect("save");
    }

    // Reopening re-runs migration, which must be a no-op at the current
    // version and leave existing data alone.
    let store = KeyedStore::open(&path).expect("reopen");
    assert_eq!(store.schema_version().expect("version"), SCHEMA_VERSION);
    assert_eq!(PersonStore::new(&store).load_all().expect("load").len(), 1);
}

#[test]
fn legacy_import_end_to_end() {
    let temp = tempdir().expect("temp dir");
    let legacy = LegacyStore::open(temp.path().join("legacy.json"));
    let store = KeyedStore::open(temp.path().join("graph.redb")).expect("open");

    let ada = LegacyPerson {
        name: "Ada".to_string(),
        photo: None,
        birth_year: "1815".to_string(),
        contact: String::new(),
        notes: String::new(),
    };
    let byron = LegacyPerson {
        name: "Byron".to_string(),
        photo: None,
        birth_year: String::new(),
        contact: String::new(),
        notes: String::new(),
    };
    legacy
        .save_people(&[ada.clone(), byron.clone()])
        .expect("save people");
    legacy
        .save_relationships(&[LegacyRelationship {
            person1: byron,
            person2: ada,
            relationship_type: LegacyRelationshipType {
                source: "parent".to_string(),
                target: Some("child".to_string()),
            },
        }])
        .expect("save rels");

    let summary = legacy.import_into(&store).expect("import");
    assert_eq!(summary.people, 2);
    assert_eq!(summary.relationship_types, 1);
    assert_eq!(summary.relationships, 1);
    assert_eq!(summary.group_nodes, 0);

    // Imported people keep their legacy fields under fresh ids.
    let people = PersonStore::new(&store).load_all().expect("load people");
    let imported_ada = people
        .iter()
        .find(|p| p.name == "Ada")
        .expect("ada imported");
    assert_eq!(imported_ada.birth_year, "1815");

    // The rebuilt relationship hydrates against the imported records.
    let rels = RelationshipStore::new(&store).load_all().expect("load rels");
    assert_eq!(rels.len(), 1);
    assert_eq!(rels[0].target.name(), "Ada");
}
