//! # kinship-core
//!
//! The versioned object store for Kinship - THE DATA.
//!
//! This crate implements the storage substrate for a personal relationship
//! graph: people, relationship types, typed relationships between
//! polymorphic endpoints, and synthesized group nodes, all persisted as
//! keyed records in an embedded database.
//!
//! ## Layering
//!
//! - `store` is the raw keyed engine: collections of id-keyed byte
//!   records, blob storage, pagination, and additive schema migration
//! - `model` holds the domain entities and their repositories; hydration
//!   rebuilds object references from stored ids through a resolver
//! - `thumbnail` derives bounded inline previews from uploaded photos
//! - `legacy` bridges the pre-keyed whole-collection JSON format
//!
//! ## Architectural Constraints
//!
//! - The store is client-local and single-process; there is no server
//! - Writes are record-granular; saving an entity replaces its record
//! - Deletes do not cascade; dangling references surface at hydration
//! - No async and no network dependencies (pure Rust)

// =============================================================================
// MODULES
// =============================================================================

pub mod legacy;
pub mod model;
pub mod schema;
pub mod store;
pub mod thumbnail;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{EndpointKind, EntityId, KinshipError};

// =============================================================================
// RE-EXPORTS: Keyed Store
// =============================================================================

pub use schema::{
    BlobCollection, Collection, MIGRATIONS, Migration, SCHEMA_VERSION, THUMBNAIL_MAX_EDGE,
};
pub use store::{KeyedStore, Page};

// =============================================================================
// RE-EXPORTS: Domain Model
// =============================================================================

pub use model::endpoint::{Endpoint, EndpointRef};
pub use model::group_node::{GroupNode, GroupNodeRecord, GroupStore};
pub use model::person::{Person, PersonRecord, PersonStore, PersonVersion};
pub use model::relationship::{Created, Relationship, RelationshipRecord, RelationshipStore};
pub use model::relationship_type::{RelationshipType, RelationshipTypeRecord, TypeStore};
pub use model::resolver::{EntityResolver, MemoryResolver, StoreResolver};

// =============================================================================
// RE-EXPORTS: Derived Assets and Legacy Bridge
// =============================================================================

pub use legacy::{
    ImportSummary, LegacyPerson, LegacyRelationship, LegacyRelationshipType, LegacyStore,
};
pub use thumbnail::{bounded_dimensions, create_thumbnail};
