//! Command line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Cartograph map file tool.
#[derive(Parser, Debug)]
#[command(
    name = "cartograph",
    version,
    about = "Inspect and process Cartograph map files",
    long_about = "Inspect and process Cartograph map files.\n\n\
                  Maps are RON-encoded document snapshots. Set RUST_LOG to \
                  override the log filter from the config file."
)]
pub struct Args {
    /// Editor configuration file.
    #[arg(long, global = true, default_value = "cartograph.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: MapCommand,
}

#[derive(Subcommand, Debug)]
pub enum MapCommand {
    /// Write an empty map laid out on the configured grid.
    New {
        output: PathBuf,
        /// Map title stored in the metadata.
        #[arg(long, default_value = "Untitled")]
        title: String,
    },
    /// Print entity counts.
    Stats { map: PathBuf },
    /// Detect enclosed rooms, split disconnected ones and save the result.
    Detect {
        map: PathBuf,
        /// Where to write the result. Defaults to overwriting the input.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Report what would change without writing anything.
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the bounding box of all authored content.
    Bounds { map: PathBuf },
}
