// src/download/album.rs
// =============================================================================
// This module runs one album from start to finish.
//
// Steps:
// 1. Create the album directory (and any missing parents)
// 2. Fetch the album page
// 3. Scan the page body for image links
// 4. Download each image in order, sleeping `pacing` after every attempt
// 5. Log that the album is done
//
// Nothing in here returns an error. Each failure is logged and turned into an
// AlbumOutcome, so the scheduler always gets a result back and one broken
// album never affects the others.
//
// The album page's HTTP status is NOT checked: an error page is scanned like
// any other page. Image downloads, on the other hand, require a 200.
// =============================================================================

use super::image::fetch_image;
use crate::extract::{extract_image_links, ScanMode, DEFAULT_CHUNK_SIZE};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn};

/// Default pause after each image download.
pub const DEFAULT_PACING: Duration = Duration::from_secs(1);

// One unit of work: a single album page and where its images go
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumJob {
    pub source_url: String,
    pub album_id: String,
    pub output_dir: PathBuf,
}

impl AlbumJob {
    // Builds a job for `source_url`, placing its directory under `output_root`
    //
    // Example:
    //   source_url = "https://site/albums/1234", output_root = "albums"
    //   -> album_id = "1234", output_dir = "albums/1234"
    pub fn new(source_url: &str, output_root: &Path) -> Self {
        let album_id = album_id_from_url(source_url).to_string();
        let output_dir = output_root.join(&album_id);
        Self {
            source_url: source_url.to_string(),
            album_id,
            output_dir,
        }
    }
}

/// Final path segment of an album URL (the text after the last `/`).
pub fn album_id_from_url(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

/// Per-album knobs shared by every worker.
#[derive(Debug, Clone, Copy)]
pub struct AlbumSettings {
    pub pacing: Duration,
    pub chunk_size: usize,
    pub scan_mode: ScanMode,
}

impl Default for AlbumSettings {
    fn default() -> Self {
        Self {
            pacing: DEFAULT_PACING,
            chunk_size: DEFAULT_CHUNK_SIZE,
            scan_mode: ScanMode::default(),
        }
    }
}

// Where an album stopped early
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlbumStage {
    CreateDir,
    FetchPage,
}

// How an album run ended
//
// #[serde(tag = "status")] produces {"status": "completed", ...} in JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AlbumStatus {
    /// The page was scanned and every link was attempted
    Completed {
        found: usize,
        saved: usize,
        failed: usize,
    },
    /// The album stopped before any image was attempted
    Failed { stage: AlbumStage, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlbumOutcome {
    pub album_id: String,
    pub source_url: String,
    #[serde(flatten)]
    pub status: AlbumStatus,
}

impl AlbumOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self.status, AlbumStatus::Completed { .. })
    }

    fn failed(job: &AlbumJob, stage: AlbumStage, reason: String) -> Self {
        Self {
            album_id: job.album_id.clone(),
            source_url: job.source_url.clone(),
            status: AlbumStatus::Failed { stage, reason },
        }
    }
}

// Runs a whole album
//
// Parameters:
//   client: shared HTTP client
//   job: the album to process
//   settings: pacing delay and scanner options
//
// Returns: what happened, never an error
pub async fn run_album(client: &Client, job: &AlbumJob, settings: &AlbumSettings) -> AlbumOutcome {
    if let Err(e) = tokio::fs::create_dir_all(&job.output_dir).await {
        error!(
            album_id = %job.album_id,
            dir = %job.output_dir.display(),
            error = %e,
            "can not create dir"
        );
        return AlbumOutcome::failed(job, AlbumStage::CreateDir, e.to_string());
    }

    let response = match client.get(&job.source_url).send().await {
        Ok(response) => response,
        Err(e) => {
            error!(album_id = %job.album_id, url = %job.source_url, error = %e, "can not get page");
            return AlbumOutcome::failed(job, AlbumStage::FetchPage, e.to_string());
        }
    };

    if response.status() != StatusCode::OK {
        // Error pages may still carry markup, so keep going
        warn!(
            album_id = %job.album_id,
            status = response.status().as_u16(),
            "album page status not ok, scanning body anyway"
        );
    }

    let links = extract_image_links(
        response.bytes_stream(),
        settings.chunk_size,
        settings.scan_mode,
    )
    .await;
    info!(album_id = %job.album_id, count = links.len(), "image links found");

    let mut saved = 0;
    let mut failed = 0;
    for link in &links {
        match fetch_image(client, &job.output_dir, link).await {
            Ok(_) => saved += 1,
            Err(_) => failed += 1,
        }

        // Applied after every image, including failed ones and the last one
        tokio::time::sleep(settings.pacing).await;
    }

    info!(album_id = %job.album_id, saved, failed, "downloading imgs done");

    AlbumOutcome {
        album_id: job.album_id.clone(),
        source_url: job.source_url.clone(),
        status: AlbumStatus::Completed {
            found: links.len(),
            saved,
            failed,
        },
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why does run_album return AlbumOutcome instead of Result?
//    - A failing album is an expected, reportable event, not a crash
//    - The scheduler collects one outcome per album either way
//
// 2. What is #[serde(flatten)]?
//    - Merges the fields of `status` into the outer JSON object
//    - {"album_id": "1", "source_url": "...", "status": "completed", "found": 3, ...}
//
// 3. Why is sleep() awaited instead of std::thread::sleep?
//    - tokio::time::sleep only pauses this task
//    - std::thread::sleep would freeze a whole runtime thread
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_settings() -> AlbumSettings {
        AlbumSettings {
            pacing: Duration::from_millis(5),
            ..AlbumSettings::default()
        }
    }

    fn file_count(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn test_album_id_from_url() {
        assert_eq!(album_id_from_url("https://site/albums/1234"), "1234");
        assert_eq!(album_id_from_url("https://site/albums/"), "");
        assert_eq!(album_id_from_url("plain"), "plain");
    }

    #[test]
    fn test_job_paths() {
        let job = AlbumJob::new("https://site/albums/1234", Path::new("/tmp/out"));
        assert_eq!(job.album_id, "1234");
        assert_eq!(job.output_dir, Path::new("/tmp/out/1234"));
    }

    #[tokio::test]
    async fn test_page_transport_error_keeps_empty_dir() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();

        let root = tempfile::tempdir().unwrap();
        let job = AlbumJob::new(&format!("http://127.0.0.1:{}/albums/77", port), root.path());
        let outcome = run_album(&Client::new(), &job, &quick_settings()).await;

        assert!(job.output_dir.is_dir());
        assert_eq!(file_count(&job.output_dir), 0);
        assert!(matches!(
            outcome.status,
            AlbumStatus::Failed { stage: AlbumStage::FetchPage, .. }
        ));
    }

    #[tokio::test]
    async fn test_create_dir_failure() {
        let root = tempfile::tempdir().unwrap();
        // A regular file where the album root should be
        let blocker = root.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();

        let job = AlbumJob::new("http://127.0.0.1:1/albums/5", &blocker);
        let outcome = run_album(&Client::new(), &job, &quick_settings()).await;

        assert!(matches!(
            outcome.status,
            AlbumStatus::Failed { stage: AlbumStage::CreateDir, .. }
        ));
    }

    #[tokio::test]
    async fn test_downloads_every_link_in_order() {
        let mut server = mockito::Server::new_async().await;
        let page = format!(
            r#"<html><img src="{0}/img/a.png"><img src="/img/relative.png"><img alt="b" src="{0}/img/b.png"><img src="{0}/img/gone.png"></html>"#,
            server.url()
        );
        let _page = server
            .mock("GET", "/albums/42")
            .with_status(200)
            .with_body(page)
            .create_async()
            .await;
        let _a = server
            .mock("GET", "/img/a.png")
            .with_status(200)
            .with_body("AAA")
            .create_async()
            .await;
        let _b = server
            .mock("GET", "/img/b.png")
            .with_status(200)
            .with_body("BBB")
            .create_async()
            .await;
        let _gone = server
            .mock("GET", "/img/gone.png")
            .with_status(404)
            .create_async()
            .await;

        let root = tempfile::tempdir().unwrap();
        let job = AlbumJob::new(&format!("{}/albums/42", server.url()), root.path());
        let outcome = run_album(&Client::new(), &job, &quick_settings()).await;

        assert_eq!(
            outcome.status,
            AlbumStatus::Completed {
                found: 3,
                saved: 2,
                failed: 1
            }
        );
        assert_eq!(std::fs::read(job.output_dir.join("a.png")).unwrap(), b"AAA");
        assert_eq!(std::fs::read(job.output_dir.join("b.png")).unwrap(), b"BBB");
        assert_eq!(file_count(&job.output_dir), 2);
    }

    #[tokio::test]
    async fn test_error_page_is_still_scanned() {
        let mut server = mockito::Server::new_async().await;
        let page = format!(r#"<img src="{}/img/c.png">"#, server.url());
        let _page = server
            .mock("GET", "/albums/9")
            .with_status(500)
            .with_body(page)
            .create_async()
            .await;
        let _c = server
            .mock("GET", "/img/c.png")
            .with_status(200)
            .with_body("CCC")
            .create_async()
            .await;

        let root = tempfile::tempdir().unwrap();
        let job = AlbumJob::new(&format!("{}/albums/9", server.url()), root.path());
        let outcome = run_album(&Client::new(), &job, &quick_settings()).await;

        assert!(outcome.is_completed());
        assert!(job.output_dir.join("c.png").exists());
    }

    #[tokio::test]
    async fn test_pacing_follows_every_image() {
        let mut server = mockito::Server::new_async().await;
        let page = format!(
            r#"<img src="{0}/img/x.png"><img src="{0}/img/y.png">"#,
            server.url()
        );
        let _page = server
            .mock("GET", "/albums/p")
            .with_status(200)
            .with_body(page)
            .create_async()
            .await;
        let images = server
            .mock("GET", mockito::Matcher::Regex(r"^/img/".to_string()))
            .with_status(404)
            .expect(2)
            .create_async()
            .await;

        let settings = AlbumSettings {
            pacing: Duration::from_millis(150),
            ..AlbumSettings::default()
        };
        let root = tempfile::tempdir().unwrap();
        let job = AlbumJob::new(&format!("{}/albums/p", server.url()), root.path());

        let started = std::time::Instant::now();
        run_album(&Client::new(), &job, &settings).await;

        // Two failed images, two pauses (the last one included)
        assert!(started.elapsed() >= Duration::from_millis(300));
        images.assert_async().await;
    }
}
