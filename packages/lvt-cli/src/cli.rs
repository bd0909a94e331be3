//! Command-line surface, reduced to the two subcommands this exercise
//! keeps from the teacher's `packages/cli`: scaffolding a new project and
//! formatting a single template file.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "lvt", about = "Scaffolding for lvt live-view apps", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a new project directory from the embedded template.
    New {
        /// Project name, also used as the directory name under the current directory.
        name: String,
    },
    /// Validate and normalize whitespace in a `.lvt` template file.
    Fmt {
        /// Path to the template file to format in place.
        path: PathBuf,
    },
}
