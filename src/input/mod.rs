// src/input/mod.rs
// =============================================================================
// This module reads the list of album URLs we are asked to download.
//
// The input is a plain text file with one URL per line. Blank lines are
// skipped, nothing else is interpreted (no comments, no escaping).
// =============================================================================

mod links;

// Re-export the main function from links.rs
pub use links::read_links;
