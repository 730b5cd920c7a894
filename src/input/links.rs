// src/input/links.rs
// =============================================================================
// This module loads album URLs from a newline-delimited text file.
//
// Rules:
// - Every line is trimmed (leading/trailing spaces, tabs, \r from Windows files)
// - Lines that are empty after trimming are ignored
// - Everything else is kept as-is, in file order
//
// A failure here is fatal for the whole run: without the list there is
// nothing to schedule.
//
// Rust concepts:
// - BufReader: Buffered reading so we don't hit the disk for every byte
// - Context: anyhow's way to attach a human-readable message to an error
// =============================================================================

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

// Reads all non-blank lines from a file
//
// Parameters:
//   path: the file to read (e.g., "new_links.txt")
//
// Returns: Vec of trimmed URLs, or an error if the file can't be read
pub fn read_links(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path)
        .with_context(|| format!("can not open link list {}", path.display()))?;

    let mut links = Vec::new();
    for line in BufReader::new(file).lines() {
        let line =
            line.with_context(|| format!("can not read link list {}", path.display()))?;

        let link = line.trim();
        if !link.is_empty() {
            links.push(link.to_string());
        }
    }

    Ok(links)
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why &Path instead of &str?
//    - Path is the standard type for file system paths
//    - It handles platform differences (/ vs \) for us
//    - A &str or String converts to &Path with Path::new() or .as_ref()
//
// 2. What does .lines() return?
//    - An iterator of io::Result<String>, one per line
//    - Each line can fail separately (e.g., invalid UTF-8), so we use ?
//    - The trailing '\n' is removed, but a '\r' may remain; trim() handles it
//
// 3. What is with_context?
//    - Wraps the error with an extra message, lazily (only on failure)
//    - The final error prints as "can not open link list x: No such file..."
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_list(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        // 6 lines, 3 of them blank or whitespace-only
        let file = write_list(
            "https://site/a/1\n\nhttps://site/a/2\n   \n\t\nhttps://site/a/3",
        );
        let links = read_links(file.path()).unwrap();
        assert_eq!(
            links,
            vec!["https://site/a/1", "https://site/a/2", "https://site/a/3"]
        );
    }

    #[test]
    fn test_lines_are_trimmed() {
        let file = write_list("  https://site/a/1  \r\nhttps://site/a/2\r\n");
        let links = read_links(file.path()).unwrap();
        assert_eq!(links, vec!["https://site/a/1", "https://site/a/2"]);
    }

    #[test]
    fn test_empty_file() {
        let file = write_list("");
        assert!(read_links(file.path()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_links(&dir.path().join("nope.txt"));
        let err = result.unwrap_err();
        assert!(err.to_string().contains("can not open link list"));
    }
}
