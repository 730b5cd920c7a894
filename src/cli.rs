// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Every option has a default, so running `album-dl` with no arguments reads
// new_links.txt and downloads into ./albums with 5 albums at a time and a
// one second pause between images.
//
// Rust concepts:
// - Structs: Custom data types that group related data
// - Derive macros: Automatically generate code for our types
// - Option<T>: For arguments that may be left out entirely
// =============================================================================

use clap::Parser;
use std::path::PathBuf;

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to automatically generate parsing code
// The #[command(...)] attributes configure how the CLI behaves
#[derive(Parser, Debug)]
#[command(
    name = "album-dl",
    version = "0.1.0",
    about = "Bulk-download image albums from a list of page URLs",
    long_about = "album-dl reads album page URLs (one per line), finds every <img src=\"...\"> \
                  link on each page and saves the images into one directory per album."
)]
pub struct Cli {
    /// File with one album URL per line (blank lines are ignored)
    #[arg(long, default_value = "new_links.txt")]
    pub input: PathBuf,

    /// Directory that receives one sub-directory per album
    #[arg(long, default_value = "albums")]
    pub output_dir: PathBuf,

    /// How many albums may download at the same time
    // The ranged value_parser rejects 0
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u16).range(1..))]
    pub max_concurrent: u16,

    /// Pause after every image download, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub pacing_ms: u64,

    /// Size of each read when scanning an album page, in bytes
    #[arg(long, default_value_t = 1024, value_parser = clap::value_parser!(u32).range(1..))]
    pub chunk_size: u32,

    /// Match every read chunk on its own (tags split between chunks are missed)
    #[arg(long)]
    pub per_chunk_scan: bool,

    /// Give up on any single HTTP request after this many seconds
    ///
    /// Without it a stuck server can hold an album slot forever
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Print the final report as JSON instead of a table (logs go to stderr)
    #[arg(long)]
    pub json: bool,

    /// Show debug logs (RUST_LOG takes precedence when set)
    #[arg(short, long)]
    pub verbose: bool,
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. default_value vs default_value_t?
//    - default_value takes a string that clap parses (handy for paths)
//    - default_value_t takes an already-typed Rust value
//
// 2. Why u16 for max_concurrent instead of usize?
//    - clap's ranged value parsers work on fixed-size integers
//    - We convert to usize when building the scheduler config
// -----------------------------------------------------------------------------
