//! # Core Type Definitions
//!
//! This module contains the types shared by every layer of the store:
//! - Opaque entity identifiers (`EntityId`)
//! - The persisted endpoint discriminant (`EndpointKind`)
//! - Creation timestamps (epoch milliseconds)
//! - Error types (`KinshipError`)
//!
//! ## Identity Guarantees
//!
//! Entity ids are generated exactly once, at creation, and are immutable
//! thereafter. Mutation is modeled as re-persisting a new value under the
//! same id; there is no partial-field update API anywhere in the crate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use uuid::Uuid;

// =============================================================================
// ENTITY IDENTIFIER
// =============================================================================

/// Globally-unique opaque identifier for a stored entity.
///
/// Every entity kind (Person, RelationshipType, GroupNode, Relationship)
/// shares this id shape. Records reference each other exclusively through
/// these ids; hydration resolves them back into full entities.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(String);

impl EntityId {
    /// Generate a fresh id. Called exactly once per entity, by its factory.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap an existing raw id (hydration, tests, CLI input).
    #[must_use]
    pub fn from_raw(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// ENDPOINT KIND
// =============================================================================

/// Discriminant persisted alongside every endpoint reference.
///
/// A relationship endpoint is either a person or a synthesized group node.
/// Storing the kind next to the id makes endpoint resolution a single tagged
/// lookup instead of a try-one-collection-then-the-other probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EndpointKind {
    /// The reference points into the `people` collection.
    Person,
    /// The reference points into the `group_nodes` collection.
    Group,
}

impl EndpointKind {
    /// Human-readable kind label, used in error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Group => "group node",
        }
    }
}

// =============================================================================
// TIMESTAMPS
// =============================================================================

/// Current wall-clock time as milliseconds since the Unix epoch.
///
/// A clock before the epoch yields 0 rather than failing; creation
/// timestamps are informational, not ordering-critical.
#[must_use]
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors surfaced by the Kinship store and entity layer.
///
/// - No silent failures: every fallible operation returns `Result`
/// - Hydration never yields a partially-constructed entity; a missing
///   reference fails the whole entity with `InvalidReference`
/// - No operation retries automatically
#[derive(Debug, Error)]
pub enum KinshipError {
    /// The storage engine failed to open, or a transaction failed.
    /// Callers must not assume partial writes are visible.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// A record could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Hydration found no record for a referenced id. The whole entity
    /// hydration fails; nothing partial is returned.
    #[error("unresolved {kind} reference: {id}")]
    InvalidReference {
        /// What kind of record the reference expected to find.
        kind: &'static str,
        /// The dangling id.
        id: EntityId,
    },

    /// Thumbnail derivation was given bytes it could not decode.
    /// No fallback image is substituted.
    #[error("image decode failure: {0}")]
    DecodeFailure(String),

    /// An entity failed its construction-time validation rules.
    #[error("validation failed: {0}")]
    Validation(String),
}

impl KinshipError {
    /// Shorthand for a dangling-reference error.
    #[must_use]
    pub fn invalid_reference(kind: &'static str, id: &EntityId) -> Self {
        Self::InvalidReference {
            kind,
            id: id.clone(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
