// src/download/mod.rs
// =============================================================================
// This module holds the download side of the program.
//
// Submodules:
// - image: Saves one image URL into a directory
// - album: Runs a whole album (directory, page, links, images)
// =============================================================================

mod album;
mod image;

pub use album::{run_album, AlbumJob, AlbumOutcome, AlbumSettings, AlbumStatus};
