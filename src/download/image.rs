// src/download/image.rs
// =============================================================================
// This module downloads a single image into an album directory.
//
// Rules:
// - Anything but HTTP 200 is a failure (even 2xx codes like 204 or 206)
// - The file is named after the last '/'-separated piece of the URL
//   (query strings and fragments stay in the name)
// - An existing file with the same name is overwritten
// - If writing fails halfway, the partial file is left on disk
//
// Every failure is logged here, then returned so the album worker can count it.
//
// Rust concepts:
// - thiserror: Derive a proper error enum with Display messages
// - tokio::fs: Async file I/O that doesn't block the runtime threads
// =============================================================================

use reqwest::{Client, StatusCode};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{error, info};

/// Why a single image could not be saved.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http get failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("http status code not ok: {0}")]
    Status(u16),

    #[error("can not create file {}: {source}", .path.display())]
    CreateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("can not copy body into {}: {reason}", .path.display())]
    Write { path: PathBuf, reason: String },
}

// Downloads one image into `dir`
//
// Parameters:
//   client: shared reqwest client (connection pool)
//   dir: album directory, must already exist
//   url: absolute image URL
//
// Returns: path of the saved file, or why it wasn't saved
pub async fn fetch_image(client: &Client, dir: &Path, url: &str) -> Result<PathBuf, FetchError> {
    let result = download_to(client, dir, url).await;

    match &result {
        Ok(path) => info!(path = %path.display(), "img saved"),
        Err(e) => error!(url, error = %e, "img download failed"),
    }

    result
}

async fn download_to(client: &Client, dir: &Path, url: &str) -> Result<PathBuf, FetchError> {
    let mut response = client
        .get(url)
        .send()
        .await
        .map_err(FetchError::Transport)?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(FetchError::Status(status.as_u16()));
    }

    let path = dir.join(filename_from_url(url));
    let mut file = File::create(&path)
        .await
        .map_err(|source| FetchError::CreateFile {
            path: path.clone(),
            source,
        })?;

    // Stream the body so large images never sit fully in memory
    loop {
        let chunk = match response.chunk().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(e) => {
                // Keep what arrived so far on disk, the partial file stays
                let _ = file.flush().await;
                return Err(FetchError::Write {
                    path,
                    reason: e.to_string(),
                })
            }
        };

        if let Err(e) = file.write_all(&chunk).await {
            return Err(FetchError::Write {
                path,
                reason: e.to_string(),
            });
        }
    }

    if let Err(e) = file.flush().await {
        return Err(FetchError::Write {
            path,
            reason: e.to_string(),
        });
    }

    Ok(path)
}

/// Returns everything after the last `/` of the URL.
///
/// `https://host/a/b.png?size=big` becomes `b.png?size=big`.
pub fn filename_from_url(url: &str) -> &str {
    match url.rfind('/') {
        Some(idx) => &url[idx + 1..],
        None => url,
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why return Result if we already log the error?
//    - The caller still wants to know *that* it failed (to count failures)
//    - Logging in one place keeps every failure reported the same way
//
// 2. What is #[source]?
//    - Marks the underlying error so tools can walk the error chain
//    - thiserror wires it into std::error::Error::source()
//
// 3. Why response.chunk() in a loop?
//    - Each call returns the next piece of the body (or None at the end)
//    - We write each piece right away instead of buffering the whole image
// -----------------------------------------------------------------------------
