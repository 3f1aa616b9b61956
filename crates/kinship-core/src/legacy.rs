//! # Legacy Flat-Key Bridge
//!
//! Before the keyed engine, collections lived as whole-collection JSON
//! arrays under single string keys (`people`, `relationshipTypes`,
//! `relationships`) in a flat key/value area. Records from that era have
//! no ids: relationships embed full copies of their endpoints and type.
//!
//! This module keeps that format readable and writable as an
//! import/export escape hatch — whole-collection only, no partial update —
//! and provides the one-way import into the keyed store.

use crate::model::endpoint::Endpoint;
use crate::model::group_node::GroupStore;
use crate::model::person::{Person, PersonStore};
use crate::model::relationship::{Created, Relationship, RelationshipStore};
use crate::model::relationship_type::{RelationshipType, TypeStore};
use crate::store::KeyedStore;
use crate::types::KinshipError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// =============================================================================
// LEGACY RECORDS
// =============================================================================

/// A person in the flat-key era: no id, camelCase field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyPerson {
    pub name: String,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub birth_year: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub notes: String,
}

/// A relationship type in the flat-key era.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyRelationshipType {
    pub source: String,
    #[serde(default)]
    pub target: Option<String>,
}

/// A relationship in the flat-key era: endpoints and type embedded whole,
/// not referenced by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyRelationship {
    pub person1: LegacyPerson,
    pub person2: LegacyPerson,
    pub relationship_type: LegacyRelationshipType,
}

/// Counts of what an import wrote into the keyed store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Distinct people written.
    pub people: usize,
    /// Distinct relationship types written.
    pub relationship_types: usize,
    /// Plain relationships written.
    pub relationships: usize,
    /// Relationships that collapsed into group nodes (untargeted type
    /// between two people).
    pub group_nodes: usize,
}

// =============================================================================
// LEGACY STORE
// =============================================================================

/// The flat key/value area: one JSON document on disk mapping string keys
/// to JSON-encoded whole-collection strings.
#[derive(Debug, Clone)]
pub struct LegacyStore {
    path: PathBuf,
}

impl LegacyStore {
    /// Point at a legacy key/value file. The file need not exist yet; a
    /// missing file reads as an empty area.
    #[must_use]
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn read_area(&self) -> Result<BTreeMap<String, String>, KinshipError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = std::fs::read_to_string(&self.path)
            .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?;
        serde_json::from_str(&raw).map_err(|e| KinshipError::Serialization(e.to_string()))
    }

    fn write_area(&self, area: &BTreeMap<String, String>) -> Result<(), KinshipError> {
        let raw = serde_json::to_string_pretty(area)
            .map_err(|e| KinshipError::Serialization(e.to_string()))?;
        std::fs::write(&self.path, raw).map_err(|e| KinshipError::StoreUnavailable(e.to_string()))
    }

    fn read_collection<T: serde::de::DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Vec<T>, KinshipError> {
        match self.read_area()?.get(key) {
            Some(raw) => {
                serde_json::from_str(raw).map_err(|e| KinshipError::Serialization(e.to_string()))
            }
            None => Ok(Vec::new()),
        }
    }

    fn write_collection<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), KinshipError> {
        let raw =
            serde_json::to_string(items).map_err(|e| KinshipError::Serialization(e.to_string()))?;
        let mut area = self.read_area()?;
        area.insert(key.to_string(), raw);
        self.write_area(&area)
    }

    /// Read the whole `people` collection.
    pub fn load_people(&self) -> Result<Vec<LegacyPerson>, KinshipError> {
        self.read_collection("people")
    }

    /// Replace the whole `people` collection.
    pub fn save_people(&self, people: &[LegacyPerson]) -> Result<(), KinshipError> {
        self.write_collection("people", people)
    }

    /// Read the whole `relationshipTypes` collection.
    pub fn load_relationship_types(&self) -> Result<Vec<LegacyRelationshipType>, KinshipError> {
        self.read_collection("relationshipTypes")
    }

    /// Replace the whole `relationshipTypes` collection.
    pub fn save_relationship_types(
        &self,
        types: &[LegacyRelationshipType],
    ) -> Result<(), KinshipError> {
        self.write_collection("relationshipTypes", types)
    }

    /// Read the whole `relationships` collection.
    pub fn load_relationships(&self) -> Result<Vec<LegacyRelationship>, KinshipError> {
        self.read_collection("relationships")
    }

    /// Replace the whole `relationships` collection.
    pub fn save_relationships(
        &self,
        relationships: &[LegacyRelationship],
    ) -> Result<(), KinshipError> {
        self.write_collection("relationships", relationships)
    }

    // =========================================================================
    // IMPORT
    // =========================================================================

    /// Import the legacy area into the keyed store.
    ///
    /// Legacy records carry no ids, so fresh ids are assigned; people are
    /// deduplicated by name and types by (source, target) while embedded
    /// references are rebuilt. Untargeted types between two people collapse
    /// into group nodes, exactly as live construction would.
    pub fn import_into(&self, store: &KeyedStore) -> Result<ImportSummary, KinshipError> {
        let legacy_people = self.load_people()?;
        let legacy_types = self.load_relationship_types()?;
        let legacy_relationships = self.load_relationships()?;

        let mut people: BTreeMap<String, Person> = BTreeMap::new();
        let mut types: BTreeMap<(String, Option<String>), RelationshipType> = BTreeMap::new();

        let mut adopt_person = |legacy: &LegacyPerson| -> Result<Person, KinshipError> {
            if let Some(existing) = people.get(&legacy.name) {
                return Ok(existing.clone());
            }
            let mut person = Person::new(legacy.name.clone())?;
            person.photo = legacy.photo.clone();
            person.birth_year = legacy.birth_year.clone();
            person.contact = legacy.contact.clone();
            person.notes = legacy.notes.clone();
            people.insert(legacy.name.clone(), person.clone());
            Ok(person)
        };

        let mut adopt_type =
            |legacy: &LegacyRelationshipType| -> Result<RelationshipType, KinshipError> {
                let key = (legacy.source.clone(), legacy.target.clone());
                if let Some(existing) = types.get(&key) {
                    return Ok(existing.clone());
                }
                let ty = RelationshipType::new(legacy.source.clone(), legacy.target.clone())?;
                types.insert(key, ty.clone());
                Ok(ty)
            };

        for legacy in &legacy_people {
            adopt_person(legacy)?;
        }
        for legacy in &legacy_types {
            adopt_type(legacy)?;
        }

        let mut relationships = Vec::new();
        let mut groups = Vec::new();
        for legacy in &legacy_relationships {
            let a = adopt_person(&legacy.person1)?;
            let b = adopt_person(&legacy.person2)?;
            let ty = adopt_type(&legacy.relationship_type)?;
            match Relationship::create(Endpoint::Person(a), Endpoint::Person(b), ty)? {
                Created::Relationship(rel) => relationships.push(rel),
                Created::Group(group) => groups.push(group),
            }
        }

        let people: Vec<Person> = people.into_values().collect();
        let types: Vec<RelationshipType> = types.into_values().collect();

        PersonStore::new(store).save_all(&people)?;
        TypeStore::new(store).save_all(&types)?;
        RelationshipStore::new(store).save_all(&relationships)?;
        GroupStore::new(store).save_all(&groups)?;

        let summary = ImportSummary {
            people: people.len(),
            relationship_types: types.len(),
            relationships: relationships.len(),
            group_nodes: groups.len(),
        };
        tracing::info!(
            people = summary.people,
            types = summary.relationship_types,
            relationships = summary.relationships,
            groups = summary.group_nodes,
            "legacy import complete"
        );
        Ok(summary)
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

    fn legacy_person(name: &str) -> LegacyPerson {
        LegacyPerson {
            name: name.to_string(),
            photo: None,
            birth_year: String::new(),
            contact: String::new(),
            notes: String::new(),
        }
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let temp = tempdir().expect("temp dir");
        let legacy = LegacyStore::open(temp.path().join("legacy.json"));
        assert!(legacy.load_people().expect("load").is_empty());
    }

    #[test]
    fn whole_collection_roundtrip() {
        let temp = tempdir().expect("temp dir");
        let legacy = LegacyStore::open(temp.path().join("legacy.json"));

        let people = vec![legacy_person("Ada"), legacy_person("Byron")];
        legacy.save_people(&people).expect("save");
        assert_eq!(legacy.load_people().expect("load"), people);

        // Writing one collection leaves the others intact.
        let types = vec![LegacyRelationshipType {
            source: "sibling".to_string(),
            target: None,
        }];
        legacy.save_relationship_types(&types).expect("save types");
        assert_eq!(legacy.load_people().expect("load"), people);
        assert_eq!(legacy.load_relationship_types().expect("load types"), types);
    }

    #[test]
    fn camel_case_field_names_on_disk() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("legacy.json");
        let legacy = LegacyStore::open(&path);

        let mut ada = legacy_person("Ada");
        ada.birth_year = "1815".to_string();
        legacy.save_people(&[ada]).expect("save");

        let raw = std::fs::read_to_string(&path).expect("read file");
        assert!(raw.contains("birthYear"));
    }

    #[test]
    fn import_dedupes_and_collapses_groups() {
        let temp = tempdir().expect("temp dir");
        let legacy = LegacyStore::open(temp.path().join("legacy.json"));
        let store = KeyedStore::open(temp.path().join("test.redb")).expect("open");

        // "Ada" appears both standalone and embedded in relationships.
        legacy.save_people(&[legacy_person("Ada")]).expect("save");
        let sibling = LegacyRelationshipType {
            source: "sibling".to_string(),
            target: None,
        };
        let parent = LegacyRelationshipType {
            source: "parent".to_string(),
            target: Some("child".to_string()),
        };
        legacy
            .save_relationships(&[
                LegacyRelationship {
                    person1: legacy_person("Ada"),
                    person2: legacy_person("Allegra"),
                    relationship_type: sibling,
                },
                LegacyRelationship {
                    person1: legacy_person("Byron"),
                    person2: legacy_person("Ada"),
                    relationship_type: parent,
                },
            ])
            .expect("save rels");

        let summary = legacy.import_into(&store).expect("import");
        assert_eq!(summary.people, 3);
        assert_eq!(summary.relationship_types, 2);
        assert_eq!(summary.relationships, 1);
        assert_eq!(summary.group_nodes, 1);

        // Everything hydrates cleanly out of the keyed store.
        assert_eq!(PersonStore::new(&store).load_all().expect("people").len(), 3);
        assert_eq!(
            RelationshipStore::new(&store).load_all().expect("rels").len(),
            1
        );
        assert_eq!(GroupStore::new(&store).load_all().expect("groups").len(), 1);
    }
}
