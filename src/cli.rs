// src/cli.rs
//! CLI definitions for depsolv
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.

use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "depsolv")]
#[command(author = "Depsolv Project")]
#[command(version)]
#[command(about = "Dependency graph projection and solve interpretation for package metadata", long_about = None)]
pub struct Cli {
    /// Engine debug verbosity (0 = info, 1 = debug, 2-3 = trace)
    #[arg(long, global = true, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=3))]
    pub debuglevel: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a unit store
    Init {
        /// Path to the store database
        #[arg(short, long, default_value = "/var/lib/depsolv/units.db")]
        db_path: String,
    },

    /// Import a JSON file of unit records into a repo
    Import {
        /// Path to a JSON array of unit documents
        file: String,

        /// Repo to import into
        #[arg(short, long)]
        repo: String,

        /// Path to the store database
        #[arg(short, long, default_value = "/var/lib/depsolv/units.db")]
        db_path: String,
    },

    /// Solve an install for one or more unit names or identities
    Solve {
        /// Unit names or identities to resolve
        #[arg(short, long = "unit", required = true)]
        units: Vec<String>,

        /// Repo providing candidate units
        #[arg(long, default_value = "zoo")]
        source_repo: String,

        /// Repo treated as already installed
        #[arg(long)]
        target_repo: Option<String>,

        /// Skip weak recommends edges while solving
        #[arg(long)]
        ignore_recommends: bool,

        /// Path to the store database
        #[arg(short, long, default_value = "/var/lib/depsolv/units.db")]
        db_path: String,
    },

    /// Print the transitive requirement closure of a unit name
    Closure {
        /// Unit name to resolve
        #[arg(short, long)]
        unit: String,

        /// Repo to load
        #[arg(long, default_value = "zoo")]
        repo: String,

        /// Path to the store database
        #[arg(short, long, default_value = "/var/lib/depsolv/units.db")]
        db_path: String,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate for
        #[arg(value_enum)]
        shell: Shell,
    },
}
