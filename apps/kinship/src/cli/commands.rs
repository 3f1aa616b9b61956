//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use kinship_core::{
    Created, EndpointKind, EndpointRef, EntityId, EntityResolver, GroupStore, KeyedStore,
    KinshipError, LegacyStore, Person, PersonStore, Relationship, RelationshipStore,
    RelationshipType, StoreResolver, TypeStore, create_thumbnail,
};
use std::path::{Path, PathBuf};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum file size for photo attachment (25 MB).
///
/// This prevents memory exhaustion from accidental large files.
const MAX_PHOTO_FILE_SIZE: u64 = 25 * 1024 * 1024;

/// Maximum file size for legacy import (100 MB).
const MAX_IMPORT_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), KinshipError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| KinshipError::StoreUnavailable(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(KinshipError::Validation(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

// =============================================================================
// SHARED HELPERS
// =============================================================================

fn open_store(db_path: &PathBuf) -> Result<KeyedStore, KinshipError> {
    KeyedStore::open(db_path)
}

fn parse_kind(raw: &str) -> Result<EndpointKind, KinshipError> {
    match raw {
        "person" => Ok(EndpointKind::Person),
        "group" => Ok(EndpointKind::Group),
        other => Err(KinshipError::Validation(format!(
            "unknown endpoint kind '{}', expected person or group",
            other
        ))),
    }
}

fn person_json(person: &Person) -> serde_json::Value {
    serde_json::json!({
        "id": person.id.as_str(),
        "name": person.name,
        "birth_year": person.birth_year,
        "contact": person.contact,
        "notes": person.notes,
        "timestamp": person.timestamp,
        "has_thumbnail": person.thumbnail_photo.is_some(),
        "versions": person.histories.len()
    })
}

fn type_json(ty: &RelationshipType) -> serde_json::Value {
    serde_json::json!({
        "id": ty.id.as_str(),
        "name": ty.name(),
        "source": ty.source,
        "target": ty.target,
        "group_forming": ty.is_group_forming()
    })
}

fn relationship_json(rel: &Relationship) -> serde_json::Value {
    serde_json::json!({
        "id": rel.id.as_str(),
        "source_id": rel.source_id.as_str(),
        "source_name": rel.source.name(),
        "target_id": rel.target_id.as_str(),
        "target_name": rel.target.name(),
        "type": rel.relationship_type.name()
    })
}

fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_default()
    );
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Initialize a new empty database.
pub fn cmd_init(db_path: &PathBuf, json_mode: bool, force: bool) -> Result<(), KinshipError> {
    if db_path.exists() && !force {
        return Err(KinshipError::Validation(format!(
            "database {:?} already exists (use --force to re-initialize)",
            db_path
        )));
    }
    if db_path.exists() {
        std::fs::remove_file(db_path)
            .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?;
    }

    let store = open_store(db_path)?;
    let version = store.schema_version()?;

    if json_mode {
        print_json(&serde_json::json!({
            "database": db_path.to_string_lossy(),
            "schema_version": version
        }));
        return Ok(());
    }

    println!("Initialized database {:?} at schema version {}", db_path, version);
    Ok(())
}

// =============================================================================
// PERSON COMMANDS
// =============================================================================

/// Add a person.
pub fn cmd_add_person(
    db_path: &PathBuf,
    json_mode: bool,
    name: &str,
    birth_year: &str,
    contact: &str,
    notes: &str,
) -> Result<(), KinshipError> {
    let store = open_store(db_path)?;

    let mut person = Person::new(name)?;
    person.birth_year = birth_year.to_string();
    person.contact = contact.to_string();
    person.notes = notes.to_string();
    PersonStore::new(&store).save(&person)?;

    if json_mode {
        print_json(&person_json(&person));
        return Ok(());
    }

    println!("Added person {} ({})", person.name, person.id);
    Ok(())
}

/// List people, one window at a time.
pub fn cmd_list_people(
    db_path: &PathBuf,
    json_mode: bool,
    offset: usize,
    limit: usize,
) -> Result<(), KinshipError> {
    let store = open_store(db_path)?;
    let (people, total) = PersonStore::new(&store).load_page(offset, limit)?;

    if json_mode {
        print_json(&serde_json::json!({
            "total": total,
            "offset": offset,
            "people": people.iter().map(person_json).collect::<Vec<_>>()
        }));
        return Ok(());
    }

    println!("People ({} of {} total)", people.len(), total);
    println!("========================");
    for person in &people {
        println!("{}  {}", person.id, person.name);
    }
    Ok(())
}

/// Show one person, including archived versions.
pub fn cmd_show_person(db_path: &PathBuf, json_mode: bool, id: &str) -> Result<(), KinshipError> {
    let store = open_store(db_path)?;
    let id = EntityId::from_raw(id);
    let person = PersonStore::new(&store)
        .load_by_id(&id)?
        .ok_or_else(|| KinshipError::invalid_reference("person", &id))?;

    if json_mode {
        let mut value = person_json(&person);
        value["histories"] = serde_json::json!(
            person
                .histories
                .iter()
                .map(|v| serde_json::json!({
                    "name": v.name,
                    "birth_year": v.birth_year,
                    "contact": v.contact,
                    "notes": v.notes,
                    "timestamp": v.timestamp
                }))
                .collect::<Vec<_>>()
        );
        print_json(&value);
        return Ok(());
    }

    println!("Person {}", person.id);
    println!("==========");
    println!("Name:       {}", person.name);
    println!("Birth Year: {}", person.birth_year);
    println!("Contact:    {}", person.contact);
    println!("Notes:      {}", person.notes);
    println!("Thumbnail:  {}", if person.thumbnail_photo.is_some() { "yes" } else { "no" });
    if !person.histories.is_empty() {
        println!();
        println!("Archived versions (oldest first):");
        for (i, version) in person.histories.iter().enumerate() {
            println!("  v{}: {} ({})", i, version.name, version.timestamp);
        }
    }
    Ok(())
}

/// Edit a person, archiving the current state first.
pub fn cmd_edit_person(
    db_path: &PathBuf,
    json_mode: bool,
    id: &str,
    name: Option<String>,
    birth_year: Option<String>,
    contact: Option<String>,
    notes: Option<String>,
) -> Result<(), KinshipError> {
    let store = open_store(db_path)?;
    let people = PersonStore::new(&store);
    let id = EntityId::from_raw(id);
    let mut person = people
        .load_by_id(&id)?
        .ok_or_else(|| KinshipError::invalid_reference("person", &id))?;

    person.archive_current();
    if let Some(name) = name {
        if name.trim().is_empty() {
            return Err(KinshipError::Validation(
                "person name must not be empty".to_string(),
            ));
        }
        person.name = name;
    }
    if let Some(birth_year) = birth_year {
        person.birth_year = birth_year;
    }
    if let Some(contact) = contact {
        person.contact = contact;
    }
    if let Some(notes) = notes {
        person.notes = notes;
    }
    people.save(&person)?;

    if json_mode {
        print_json(&person_json(&person));
        return Ok(());
    }

    println!(
        "Updated person {} ({} archived versions)",
        person.name,
        person.histories.len()
    );
    Ok(())
}

/// Delete a person and its original photo.
pub fn cmd_delete_person(db_path: &PathBuf, json_mode: bool, id: &str) -> Result<(), KinshipError> {
    let store = open_store(db_path)?;
    let id = EntityId::from_raw(id);
    PersonStore::new(&store).delete(&id)?;

    if json_mode {
        print_json(&serde_json::json!({ "deleted": id.as_str() }));
        return Ok(());
    }

    println!("Deleted person {}", id);
    Ok(())
}

// =============================================================================
// RELATIONSHIP TYPE COMMANDS
// =============================================================================

/// Add a relationship type.
pub fn cmd_add_type(
    db_path: &PathBuf,
    json_mode: bool,
    source: &str,
    target: Option<String>,
) -> Result<(), KinshipError> {
    let store = open_store(db_path)?;

    let ty = RelationshipType::new(source, target)?;
    TypeStore::new(&store).save(&ty)?;

    if json_mode {
        print_json(&type_json(&ty));
        return Ok(());
    }

    println!("Added relationship type {} ({})", ty.name(), ty.id);
    Ok(())
}

/// List relationship types.
pub fn cmd_list_types(db_path: &PathBuf, json_mode: bool) -> Result<(), KinshipError> {
    let store = open_store(db_path)?;
    let types = TypeStore::new(&store).load_all()?;

    if json_mode {
        print_json(&serde_json::json!(
            types.iter().map(type_json).collect::<Vec<_>>()
        ));
        return Ok(());
    }

    println!("Relationship Types");
    println!("==================");
    for ty in &types {
        let marker = if ty.is_group_forming() { " [group-forming]" } else { "" };
        println!("{}  {}{}", ty.id, ty.name(), marker);
    }
    Ok(())
}

// =============================================================================
// LINK COMMAND
// =============================================================================

/// Link two entities with a typed relationship. An untargeted type between
/// two people synthesizes a group node instead.
pub fn cmd_link(
    db_path: &PathBuf,
    json_mode: bool,
    source: &str,
    source_kind: &str,
    target: &str,
    target_kind: &str,
    type_id: &str,
) -> Result<(), KinshipError> {
    let store = open_store(db_path)?;
    let resolver = StoreResolver::new(&store);

    let source = resolver.resolve_endpoint(&EndpointRef {
        kind: parse_kind(source_kind)?,
        id: EntityId::from_raw(source),
    })?;
    let target = resolver.resolve_endpoint(&EndpointRef {
        kind: parse_kind(target_kind)?,
        id: EntityId::from_raw(target),
    })?;
    let ty = resolver.resolve_type(&EntityId::from_raw(type_id))?;

    match Relationship::create(source, target, ty)? {
        Created::Relationship(rel) => {
            RelationshipStore::new(&store).save(&rel)?;
            if json_mode {
                let mut value = relationship_json(&rel);
                value["kind"] = serde_json::json!("relationship");
                print_json(&value);
            } else {
                println!(
                    "Linked {} -> {} ({})",
                    rel.source.name(),
                    rel.target.name(),
                    rel.relationship_type.name()
                );
            }
        }
        Created::Group(group) => {
            GroupStore::new(&store).save(&group)?;
            if json_mode {
                print_json(&serde_json::json!({
                    "kind": "group_node",
                    "id": group.id.as_str(),
                    "name": group.name(),
                    "members": group.members.iter().map(|p| p.id.as_str()).collect::<Vec<_>>()
                }));
            } else {
                println!("Synthesized group node {} ({})", group.name(), group.id);
            }
        }
    }
    Ok(())
}

// =============================================================================
// GRAPH COMMAND
// =============================================================================

/// Dump the whole graph: people, types, groups, relationships.
///
/// Each collection is loaded once and relationships hydrate against the
/// preloaded sequences, so a full dump issues no per-record lookups.
pub fn cmd_graph(db_path: &PathBuf, json_mode: bool) -> Result<(), KinshipError> {
    let store = open_store(db_path)?;

    let people = PersonStore::new(&store).load_all()?;
    let types = TypeStore::new(&store).load_all()?;
    let groups = GroupStore::new(&store).load_all_with(&people, &types)?;
    let relationships =
        RelationshipStore::new(&store).load_all_with(&people, &groups, &types)?;

    if json_mode {
        print_json(&serde_json::json!({
            "people": people.iter().map(person_json).collect::<Vec<_>>(),
            "relationship_types": types.iter().map(type_json).collect::<Vec<_>>(),
            "group_nodes": groups.iter().map(|g| serde_json::json!({
                "id": g.id.as_str(),
                "name": g.name(),
                "members": g.members.iter().map(|p| p.id.as_str()).collect::<Vec<_>>()
            })).collect::<Vec<_>>(),
            "relationships": relationships.iter().map(relationship_json).collect::<Vec<_>>()
        }));
        return Ok(());
    }

    println!("Kinship Graph");
    println!("=============");
    println!("Database: {:?}", db_path);
    println!();
    println!("People:        {}", people.len());
    println!("Types:         {}", types.len());
    println!("Group Nodes:   {}", groups.len());
    println!("Relationships: {}", relationships.len());
    println!();
    for rel in &relationships {
        println!(
            "{} -> {} ({})",
            rel.source.name(),
            rel.target.name(),
            rel.relationship_type.name()
        );
    }
    for group in &groups {
        println!("{}", group.name());
    }
    Ok(())
}

// =============================================================================
// PHOTO COMMANDS
// =============================================================================

/// Attach a photo to a person: the original bytes go to blob storage and a
/// bounded thumbnail is derived into the person record.
pub fn cmd_set_photo(
    db_path: &PathBuf,
    json_mode: bool,
    id: &str,
    file: &Path,
) -> Result<(), KinshipError> {
    let store = open_store(db_path)?;
    let people = PersonStore::new(&store);
    let id = EntityId::from_raw(id);
    let mut person = people
        .load_by_id(&id)?
        .ok_or_else(|| KinshipError::invalid_reference("person", &id))?;

    validate_file_size(file, MAX_PHOTO_FILE_SIZE)?;
    let bytes =
        std::fs::read(file).map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?;

    // Derive the thumbnail first so an unreadable image leaves the store
    // untouched.
    let thumbnail = create_thumbnail(&bytes)?;

    people.save_original_photo(&id, &bytes)?;
    person.thumbnail_photo = Some(thumbnail);
    people.save(&person)?;

    if json_mode {
        print_json(&person_json(&person));
        return Ok(());
    }

    println!("Attached photo to {} ({} bytes)", person.name, bytes.len());
    Ok(())
}

/// Write a person's original photo bytes to a file.
pub fn cmd_get_photo(db_path: &PathBuf, id: &str, output: &Path) -> Result<(), KinshipError> {
    let store = open_store(db_path)?;
    let id = EntityId::from_raw(id);
    let bytes = PersonStore::new(&store)
        .load_original_photo(&id)?
        .ok_or_else(|| KinshipError::invalid_reference("original photo", &id))?;

    std::fs::write(output, &bytes)
        .map_err(|e| KinshipError::StoreUnavailable(e.to_string()))?;

    println!("Wrote {} bytes to {:?}", bytes.len(), output);
    Ok(())
}

// =============================================================================
// IMPORT COMMAND
// =============================================================================

/// Import a legacy flat-key JSON file into the keyed store.
pub fn cmd_import_legacy(
    db_path: &PathBuf,
    json_mode: bool,
    file: &Path,
) -> Result<(), KinshipError> {
    validate_file_size(file, MAX_IMPORT_FILE_SIZE)?;

    let store = open_store(db_path)?;
    let summary = LegacyStore::open(file).import_into(&store)?;

    if json_mode {
        print_json(&serde_json::json!({
            "people": summary.people,
            "relationship_types": summary.relationship_types,
            "relationships": summary.relationships,
            "group_nodes": summary.group_nodes
        }));
        return Ok(());
    }

    println!("Legacy import complete");
    println!("======================");
    println!("People:        {}", summary.people);
    println!("Types:         {}", summary.relationship_types);
    println!("Relationships: {}", summary.relationships);
    println!("Group Nodes:   {}", summary.group_nodes);
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
