//! Command-line interface for the cookbook backend.

use clap::{Parser, Subcommand};

/// Cookbook - recipe management backend
#[derive(Parser)]
#[command(name = "cookbook")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API server
    #[command(alias = "s")]
    Serve,

    /// Bulk-load ingredients from a CSV file with a `name` column
    ImportCsv {
        /// Path to the CSV file
        path: String,
    },
}
