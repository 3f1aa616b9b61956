//! # Schema Constants & Migration Steps
//!
//! The on-disk layout is versioned. Each schema version adds collections;
//! no version ever removes or rewrites one, so upgrading can never lose
//! existing records.
//!
//! ## Version history
//!
//! - v1: `people`, `relationship_types`, `relationships`
//! - v2: + `original_photos` (binary blob collection)
//! - v3: + `group_nodes`
//!
//! The migration list below is applied once, synchronously, by
//! [`crate::store::KeyedStore::open`]. No operation ever observes a
//! partially-upgraded schema.

// =============================================================================
// SCHEMA VERSION
// =============================================================================

/// The schema version this build of the crate declares.
///
/// Opening a store whose on-disk version is lower applies every migration
/// step above it, in order.
pub const SCHEMA_VERSION: u32 = 3;

/// Maximum edge length of a derived thumbnail, in pixels.
///
/// Thumbnails are shrink-only: images already within this bound keep their
/// dimensions unchanged.
pub const THUMBNAIL_MAX_EDGE: u32 = 200;

// =============================================================================
// COLLECTIONS
// =============================================================================

/// The named record collections, each keyed by entity id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    /// Person records.
    People,
    /// RelationshipType records.
    RelationshipTypes,
    /// Relationship records.
    Relationships,
    /// GroupNode records.
    GroupNodes,
}

impl Collection {
    /// Stable on-disk collection name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::People => "people",
            Self::RelationshipTypes => "relationship_types",
            Self::Relationships => "relationships",
            Self::GroupNodes => "group_nodes",
        }
    }
}

/// The unkeyed blob collections. Keys are caller-supplied (the owning
/// person's id for original photos).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobCollection {
    /// Full-resolution photo bytes, keyed by person id. Never embedded in
    /// the person record itself.
    OriginalPhotos,
}

impl BlobCollection {
    /// Stable on-disk collection name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::OriginalPhotos => "original_photos",
        }
    }
}

// =============================================================================
// MIGRATIONS
// =============================================================================

/// One additive schema upgrade step.
///
/// A step only ever creates collections. Steps are applied in ascending
/// version order; a store at version N skips every step with
/// `version <= N`.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    /// The schema version this step upgrades the store to.
    pub version: u32,
    /// Record collections created by this step.
    pub collections: &'static [Collection],
    /// Blob collections created by this step.
    pub blobs: &'static [BlobCollection],
}

/// The full, ordered migration list from an empty store to
/// [`SCHEMA_VERSION`].
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        collections: &[
            Collection::People,
            Collection::RelationshipTypes,
            Collection::Relationships,
        ],
        blobs: &[],
    },
    Migration {
        version: 2,
        collections: &[],
        blobs: &[BlobCollection::OriginalPhotos],
    },
    Migration {
        version: 3,
        collections: &[Collection::GroupNodes],
        blobs: &[],
    },
];

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn migrations_end_at_declared_version() {
        let last = MIGRATIONS.last().unwrap();
        assert_eq!(last.version, SCHEMA_VERSION);
    }

    #[test]
    fn migrations_strictly_ascending() {
        for pair in MIGRATIONS.windows(2) {
            assert!(pair[0].version < pair[1].version);
        }
    }

    #[test]
    fn every_collection_created_exactly_once() {
        let all: Vec<&str> = MIGRATIONS
            .iter()
            .flat_map(|m| m.collections.iter().map(|c| c.name()))
            .collect();
        for c in [
            Collection::People,
            Collection::RelationshipTypes,
            Collection::Relationships,
            Collection::GroupNodes,
        ] {
            assert_eq!(all.iter().filter(|n| **n == c.name()).count(), 1);
        }
    }
}
