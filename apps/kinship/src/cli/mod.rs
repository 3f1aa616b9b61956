//! # Kinship CLI Module
//!
//! This module implements the CLI interface for Kinship.
//!
//! ## Available Commands
//!
//! - `init` - Initialize a new database
//! - `add-person` - Add a person
//! - `list-people` - List people (paginated)
//! - `show-person` - Show one person with version history
//! - `edit-person` - Edit a person, archiving the prior version
//! - `delete-person` - Delete a person and its photo blob
//! - `add-type` - Add a relationship type
//! - `list-types` - List relationship types
//! - `link` - Link two entities (may synthesize a group node)
//! - `graph` - Dump the whole graph
//! - `set-photo` - Attach a photo and derive its thumbnail
//! - `get-photo` - Write the original photo bytes to a file
//! - `import-legacy` - Import a legacy flat-key JSON file

mod commands;

use clap::{Parser, Subcommand};
use kinship_core::KinshipError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Kinship - Personal Relationship Graph
///
/// A client-local versioned object store for people, typed relationships,
/// and synthesized group nodes.
#[derive(Parser, Debug)]
#[command(name = "kinship")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the graph database
    #[arg(short = 'D', long, global = true, env = "KINSHIP_DB", default_value = "kinship.db")]
    pub database: PathBuf,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new empty database
    Init {
        /// Force initialization even if the database exists
        #[arg(short, long)]
        force: bool,
    },

    /// Add a person
    AddPerson {
        /// Display name (required, non-empty)
        #[arg(short, long)]
        name: String,

        /// Birth year (free-form text)
        #[arg(short, long, default_value = "")]
        birth_year: String,

        /// Contact information
        #[arg(short, long, default_value = "")]
        contact: String,

        /// Free-form notes
        #[arg(long, default_value = "")]
        notes: String,
    },

    /// List people, one window at a time
    ListPeople {
        /// Number of records to skip
        #[arg(short, long, default_value = "0")]
        offset: usize,

        /// Maximum records to return
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },

    /// Show one person, including archived versions
    ShowPerson {
        /// Person id
        id: String,
    },

    /// Edit a person, archiving the current state first
    EditPerson {
        /// Person id
        id: String,

        /// New display name
        #[arg(short, long)]
        name: Option<String>,

        /// New birth year
        #[arg(short, long)]
        birth_year: Option<String>,

        /// New contact information
        #[arg(short, long)]
        contact: Option<String>,

        /// New notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// Delete a person and its original photo
    DeletePerson {
        /// Person id
        id: String,
    },

    /// Add a relationship type
    AddType {
        /// Source-side label (e.g. "parent")
        #[arg(short, long)]
        source: String,

        /// Target-side label (e.g. "child"); omit for a symmetric
        /// group-forming type
        #[arg(short, long)]
        target: Option<String>,
    },

    /// List relationship types
    ListTypes,

    /// Link two entities with a typed relationship
    ///
    /// An untargeted type between two people synthesizes a group node
    /// instead of a relationship.
    Link {
        /// Source entity id
        #[arg(short, long)]
        source: String,

        /// Source entity kind (person, group)
        #[arg(long, default_value = "person")]
        source_kind: String,

        /// Target entity id
        #[arg(short, long)]
        target: String,

        /// Target entity kind (person, group)
        #[arg(long, default_value = "person")]
        target_kind: String,

        /// Relationship type id
        #[arg(short = 'T', long)]
        type_id: String,
    },

    /// Dump the whole graph: people, types, groups, relationships
    Graph,

    /// Attach a photo to a person and derive its thumbnail
    SetPhoto {
        /// Person id
        id: String,

        /// Path to the image file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Write a person's original photo bytes to a file
    GetPhoto {
        /// Person id
        id: String,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Import a legacy flat-key JSON file
    ImportLegacy {
        /// Path to the legacy key/value JSON file
        #[arg(short, long)]
        file: PathBuf,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), KinshipError> {
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Init { force }) => cmd_init(&cli.database, json_mode, force),
        Some(Commands::AddPerson {
            name,
            birth_year,
            contact,
            notes,
        }) => cmd_add_person(&cli.database, json_mode, &name, &birth_year, &contact, &notes),
        Some(Commands::ListPeople { offset, limit }) => {
            cmd_list_people(&cli.database, json_mode, offset, limit)
        }
        Some(Commands::ShowPerson { id }) => cmd_show_person(&cli.database, json_mode, &id),
        Some(Commands::EditPerson {
            id,
            name,
            birth_year,
            contact,
            notes,
        }) => cmd_edit_person(&cli.database, json_mode, &id, name, birth_year, contact, notes),
        Some(Commands::DeletePerson { id }) => cmd_delete_person(&cli.database, json_mode, &id),
        Some(Commands::AddType { source, target }) => {
            cmd_add_type(&cli.database, json_mode, &source, target)
        }
        Some(Commands::ListTypes) => cmd_list_types(&cli.database, json_mode),
        Some(Commands::Link {
            source,
            source_kind,
            target,
            target_kind,
            type_id,
        }) => cmd_link(
            &cli.database,
            json_mode,
            &source,
            &source_kind,
            &target,
            &target_kind,
            &type_id,
        ),
        Some(Commands::Graph) => cmd_graph(&cli.database, json_mode),
        Some(Commands::SetPhoto { id, file }) => {
            cmd_set_photo(&cli.database, json_mode, &id, &file)
        }
        Some(Commands::GetPhoto { id, output }) => cmd_get_photo(&cli.database, &id, &output),
        Some(Commands::ImportLegacy { file }) => {
            cmd_import_legacy(&cli.database, json_mode, &file)
        }
        None => {
            // No subcommand - show the graph summary by default
            cmd_graph(&cli.database, json_mode)
        }
    }
}
