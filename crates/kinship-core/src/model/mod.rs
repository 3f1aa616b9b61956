//! # Entity Model
//!
//! The domain objects stored in the graph and their repositories:
//!
//! - [`person::Person`] — a person, with history snapshots and photos
//! - [`relationship_type::RelationshipType`] — a typed label, directional
//!   or group-forming
//! - [`group_node::GroupNode`] — a synthesized multi-member node
//! - [`relationship::Relationship`] — a typed edge between two endpoints
//!
//! Each entity kind splits into three pieces:
//!
//! 1. a plain hydrated struct (fields, construction validation, naming),
//! 2. a flat `*Record` struct — the persisted form, where every foreign
//!    reference is an id — with `to_record` / `from_record` conversion,
//! 3. a `*Store` repository borrowing the [`crate::store::KeyedStore`],
//!    exposing save / load_all / load_by_id / delete.
//!
//! Hydration goes through an [`resolver::EntityResolver`], either backed by
//! live store lookups or by preloaded in-memory sequences. Both paths must
//! produce identical entities.

pub mod endpoint;
pub mod group_node;
pub mod person;
pub mod relationship;
pub mod relationship_type;
pub mod resolver;

use crate::types::KinshipError;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Encode a record for storage.
pub(crate) fn encode_record<T: Serialize>(record: &T) -> Result<Vec<u8>, KinshipError> {
    postcard::to_allocvec(record).map_err(|e| KinshipError::Serialization(e.to_string()))
}

/// Decode a stored record.
pub(crate) fn decode_record<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, KinshipError> {
    postcard::from_bytes(bytes).map_err(|e| KinshipError::Serialization(e.to_string()))
}
