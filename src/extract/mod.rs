// src/extract/mod.rs
// =============================================================================
// This module finds image links inside album pages.
//
// There is no HTML parser here on purpose: a page is scanned for a single
// pattern, <img ... src="URL">, and only absolute http(s) links are kept.
//
// Submodules:
// - scanner: the chunk-by-chunk pattern matcher (ImageLinkScanner stays
//   private; callers go through extract_image_links)
// =============================================================================

mod scanner;

pub use scanner::{extract_image_links, ScanMode, DEFAULT_CHUNK_SIZE};
