//! Property-based tests for the keyed store and domain model.
//!
//! Each property pins an invariant the rest of the system leans on:
//! record round-trips lose nothing, pagination windows are exact,
//! thumbnail bounds hold for any input size, and the discriminating
//! relationship factory branches only on the documented condition.

#![allow(clippy::unwrap_used, clippy::panic)]

use kinship_core::{
    Created, Endpoint, KeyedStore, Person, PersonStore, Relationship, RelationshipType,
    bounded_dimensions,
};
use proptest::prelude::*;
use tempfile::tempdir;

fn person_with(
    name: String,
    birth_year: String,
    contact: String,
    notes: String,
) -> Person {
    let mut person = Person::new(name).expect("person");
    person.birth_year = birth_year;
    person.contact = contact;
    person.notes = notes;
    person
}

proptest! {
    /// Any person survives the flatten/hydrate cycle unchanged, including
    /// archived history snapshots.
    #[test]
    fn person_record_roundtrip(
        name in "[^\\s][\\PC]{0,40}",
        birth_year in "\\PC{0,10}",
        contact in "\\PC{0,40}",
        notes in "\\PC{0,80}",
        edits in proptest::collection::vec("[^\\s][\\PC]{0,20}", 0..4),
    ) {
        let mut person = person_with(name, birth_year, contact, notes);
        for edit in edits {
            person.archive_current();
            person.name = edit;
        }

        let restored = Person::from_record(person.to_record());
        prop_assert_eq!(restored, person);
    }

    /// A pagination window always has length `min(limit, count - offset)`
    /// (saturating) and reports the full collection size as its total.
    #[test]
    fn pagination_window_is_exact(
        count in 0usize..12,
        offset in 0usize..16,
        limit in 0usize..16,
    ) {
        let temp = tempdir().expect("temp dir");
        let store = KeyedStore::open(temp.path().join("test.redb")).expect("open");
        let people = PersonStore::new(&store);

        for i in 0..count {
            people.save(&Person::new(format!("P{i}")).expect("person")).expect("save");
        }

        let (window, total) = people.load_page(offset, limit).expect("page");
        prop_assert_eq!(total, count);
        prop_assert_eq!(window.len(), limit.min(count.saturating_sub(offset)));
    }

    /// Thumbnail target dimensions never exceed the cap, never collapse to
    /// zero, and only shrink.
    #[test]
    fn thumbnail_bounds_hold(width in 1u32..20_000, height in 1u32..20_000) {
        let (w, h) = bounded_dimensions(width, height);
        prop_assert!(w.max(h) <= 200 || width.max(height) <= 200);
        prop_assert!(w >= 1 && h >= 1);
        prop_assert!(w <= width && h <= height);
        if width.max(height) > 200 {
            prop_assert_eq!(w.max(h), 200);
        }
    }

    /// The factory collapses into a group exactly when the type is
    /// untargeted, for any pair of person endpoints.
    #[test]
    fn group_collapse_iff_untargeted(
        source_label in "[^\\s][\\PC]{0,20}",
        target_label in proptest::option::of("[^\\s][\\PC]{0,20}"),
    ) {
        let a = Person::new("Ada").expect("person");
        let b = Person::new("Byron").expect("person");
        let ty = RelationshipType::new(source_label, target_label.clone()).expect("type");

        let created = Relationship::create(
            Endpoint::Person(a),
            Endpoint::Person(b),
            ty,
        ).expect("create");

        match created {
            Created::Group(_) => prop_assert!(target_label.is_none()),
            Created::Relationship(_) => prop_assert!(target_label.is_some()),
        }
    }
}
