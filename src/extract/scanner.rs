// src/extract/scanner.rs
// =============================================================================
// This module scans an album page body for <img src="..."> links.
//
// How it works:
// 1. The body arrives as a stream of byte chunks (straight from reqwest)
// 2. Chunks are cut down to at most `chunk_size` bytes
// 3. Each piece is fed to an ImageLinkScanner, which runs the regex
//    <img[^>]+src="([^"]+)"
// 4. Captured values that start with http:// or https:// are kept, in the
//    order they appear, duplicates included
//
// Chunk boundaries:
// Matching each chunk on its own (ScanMode::PerChunk) misses any tag that is
// cut in half by a chunk boundary. ScanMode::Streaming (the default) fixes
// that: the unfinished end of the buffer is carried into the next chunk.
// This is a deliberate change from the per-chunk behavior, which is still
// available for comparison.
//
// Rust concepts:
// - regex::bytes: Regexes over &[u8], so we never decode partial UTF-8
// - OnceLock: Compile each regex once and share it
// - Streams: The async version of iterators
// =============================================================================

use futures::{Stream, StreamExt};
use regex::bytes::Regex;
use std::fmt::Display;
use std::sync::OnceLock;
use tracing::debug;

/// Default size of a single read, in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

// Upper bound for the unfinished tail carried between chunks.
// A tag that never closes would otherwise grow the buffer forever.
const MAX_CARRY: usize = 64 * 1024;

// (?-u) switches off Unicode mode so [^>] matches any single byte
const IMG_SRC_PATTERN: &str = r#"(?-u)<img[^>]+src="([^"]+)""#;

// Matches the end of a buffer that could still turn into an img match:
// an open <img tag (before or inside its src value), or a cut-off "<img"
const OPEN_TAIL_PATTERN: &str = r#"(?-u)(?:<img(?:[^>]*|[^>]+src="[^"]*)|<im|<i|<)\z"#;

fn img_src_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // The pattern is a constant, so compiling it can only fail on a typo
    RE.get_or_init(|| Regex::new(IMG_SRC_PATTERN).expect("img src pattern is valid"))
}

fn open_tail_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(OPEN_TAIL_PATTERN).expect("open tail pattern is valid"))
}

/// How chunk boundaries are handled while scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    /// Carry unfinished tags across chunk boundaries.
    #[default]
    Streaming,
    /// Match every chunk in isolation. Tags split by a boundary are lost.
    PerChunk,
}

/// Incremental image link matcher.
///
/// Feed it chunks in order with [`feed`](Self::feed), then call
/// [`finish`](Self::finish) once the body ends.
#[derive(Debug)]
pub struct ImageLinkScanner {
    mode: ScanMode,
    pending: Vec<u8>,
}

impl ImageLinkScanner {
    pub fn new(mode: ScanMode) -> Self {
        Self {
            mode,
            pending: Vec::new(),
        }
    }

    /// Scans one chunk and returns the links that are now complete.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        match self.mode {
            ScanMode::PerChunk => {
                let mut links = Vec::new();
                for caps in img_src_regex().captures_iter(chunk) {
                    push_if_absolute(&mut links, &caps[1]);
                }
                links
            }
            ScanMode::Streaming => {
                self.pending.extend_from_slice(chunk);
                let (links, keep_from) = scan_settled(&self.pending);
                self.pending.drain(..keep_from);

                if self.pending.len() > MAX_CARRY {
                    debug!(bytes = self.pending.len(), "dropping oversized unfinished tag");
                    self.pending.clear();
                }
                links
            }
        }
    }

    /// Flushes whatever is left once the body has ended.
    ///
    /// A tag missing its closing `>` at the very end of the page still
    /// counts, the same as when matching the whole body at once.
    pub fn finish(&mut self) -> Vec<String> {
        let mut links = Vec::new();
        for caps in img_src_regex().captures_iter(&self.pending) {
            push_if_absolute(&mut links, &caps[1]);
        }
        self.pending.clear();
        links
    }
}

// Scans the buffer and splits it into settled links and an unfinished tail
//
// A match only counts once a '>' follows it: until the tag closes, the greedy
// [^>]+ could still reach a later src="..." in the same tag.
//
// Returns: (links, index where the kept tail starts)
fn scan_settled(buffer: &[u8]) -> (Vec<String>, usize) {
    let mut links = Vec::new();
    let mut consumed = 0;

    for caps in img_src_regex().captures_iter(buffer) {
        let whole = match caps.get(0) {
            Some(m) => m,
            None => continue,
        };

        if !buffer[whole.end()..].contains(&b'>') {
            // Tag still open, wait for more data
            return (links, whole.start());
        }

        push_if_absolute(&mut links, &caps[1]);
        consumed = whole.end();
    }

    let rest = &buffer[consumed..];
    let keep_from = match open_tail_regex().find(rest) {
        Some(tail) => consumed + tail.start(),
        None => buffer.len(),
    };

    (links, keep_from)
}

fn push_if_absolute(links: &mut Vec<String>, raw: &[u8]) {
    let link = String::from_utf8_lossy(raw);
    if is_valid_image_link(&link) {
        links.push(link.into_owned());
    }
}

// Relative, protocol-relative (//host/x.png) and data: links are dropped
fn is_valid_image_link(link: &str) -> bool {
    link.starts_with("http://") || link.starts_with("https://")
}

// Extracts image links from a streamed body
//
// Parameters:
//   body: stream of byte chunks (e.g., reqwest's Response::bytes_stream())
//   chunk_size: maximum number of bytes handed to the scanner at once
//   mode: how chunk boundaries are handled
//
// Returns: all absolute image links, in page order
//
// The first read error simply ends the scan. Whatever was found until then
// is returned and the error is not reported to the caller.
pub async fn extract_image_links<S, B, E>(body: S, chunk_size: usize, mode: ScanMode) -> Vec<String>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    let chunk_size = chunk_size.max(1);
    let mut scanner = ImageLinkScanner::new(mode);
    let mut links = Vec::new();

    futures::pin_mut!(body);
    while let Some(next) = body.next().await {
        match next {
            Ok(bytes) => {
                for chunk in bytes.as_ref().chunks(chunk_size) {
                    links.extend(scanner.feed(chunk));
                }
            }
            Err(e) => {
                debug!(error = %e, "page body read stopped");
                break;
            }
        }
    }

    links.extend(scanner.finish());
    links
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why regex instead of an HTML parser?
//    - We only need one attribute from one kind of tag
//    - A regex works on partial input, a DOM parser needs the whole page
//
// 2. What does drain(..n) do?
//    - Removes the first n bytes of the Vec in place
//    - The remaining bytes shift to the front, ready for the next chunk
//
// 3. What is pin_mut!?
//    - Streams must not move in memory while being polled
//    - pin_mut! pins the stream on the stack so we can call .next() on it
//
// 4. Why String::from_utf8_lossy?
//    - The captured bytes may not be valid UTF-8
//    - Invalid sequences become U+FFFD instead of failing the whole page
// -----------------------------------------------------------------------------
