// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging
// 3. Read the album URLs from the input file
// 4. Hand them to the scheduler, which downloads every album
// 5. Print a report (table or JSON; with JSON the logs go to stderr)
//
// The exit code is always 0. Failed albums and images are reported in the
// log and in the report; a missing input file is logged and ends the run.
//
// Rust concepts used:
// - async/await: Because we need to make many network requests concurrently
// - Result<T, E>: For error handling (T = success type, E = error type)
// - Modules: Each component lives in its own file or directory
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli;           // src/cli.rs - command-line parsing
mod download;      // src/download/ - album worker and image fetcher
mod extract;       // src/extract/ - <img src> link scanning
mod input;         // src/input/ - reading the URL list
mod logging;       // src/logging.rs - tracing setup
mod scheduler;     // src/scheduler/ - bounded-concurrency fan-out

#[cfg(test)]
mod test_support;

use clap::Parser;  // Parser trait enables the parse() method
use cli::Cli;
use download::{AlbumOutcome, AlbumSettings, AlbumStatus};
use extract::ScanMode;
use scheduler::{DownloadScheduler, SchedulerConfig};
use std::time::Duration;
use tracing::{error, info};

// anyhow::Result is like std::result::Result but simpler for applications
// It lets us return any error type with the ? operator
use anyhow::Result;

// The #[tokio::main] attribute transforms our async main into a real main function
// It creates a tokio runtime and runs our async code inside it
#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, logging::LogTarget::for_report(cli.json));

    if let Err(e) = run(cli).await {
        // {:#} prints the whole context chain on one line
        error!("{:#}", e);
    }
}

// This is the main application logic
// Only setup problems (unreadable input, unusable config) end up as Err
async fn run(cli: Cli) -> Result<()> {
    let links = input::read_links(&cli.input)?;

    info!(count = links.len(), "input links:");
    for link in &links {
        info!("{}", link);
    }

    let scheduler = DownloadScheduler::new(build_config(&cli))?;
    let outcomes = scheduler.run(&links).await;

    print_results(&outcomes, cli.json)
}

// Turns command-line options into the scheduler's configuration
fn build_config(cli: &Cli) -> SchedulerConfig {
    let mut config = SchedulerConfig::new(&cli.output_dir);
    config.max_concurrent = usize::from(cli.max_concurrent);
    config.request_timeout = cli.timeout_secs.map(Duration::from_secs);
    config.album = AlbumSettings {
        pacing: Duration::from_millis(cli.pacing_ms),
        chunk_size: cli.chunk_size as usize,
        scan_mode: if cli.per_chunk_scan {
            ScanMode::PerChunk
        } else {
            ScanMode::Streaming
        },
    };
    config
}

// Prints the outcomes either as a table or JSON
fn print_results(outcomes: &[AlbumOutcome], json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(outcomes)?;
        println!("{}", json_output);
    } else {
        print_table(outcomes);
    }
    Ok(())
}

// Prints outcomes as a human-readable table in the terminal
fn print_table(outcomes: &[AlbumOutcome]) {
    println!("{:<30} {:<12} {:>6} {:>6} {:>7}  {}", "ALBUM", "STATUS", "FOUND", "SAVED", "FAILED", "MESSAGE");
    println!("{}", "=".repeat(90));

    for outcome in outcomes {
        // Truncate long album ids so the columns stay aligned
        let album_display = if outcome.album_id.chars().count() > 27 {
            format!("{}...", outcome.album_id.chars().take(27).collect::<String>())
        } else {
            outcome.album_id.clone()
        };

        match &outcome.status {
            AlbumStatus::Completed { found, saved, failed } => {
                println!(
                    "{:<30} {:<12} {:>6} {:>6} {:>7}",
                    album_display, "done", found, saved, failed
                );
            }
            AlbumStatus::Failed { stage, reason } => {
                println!(
                    "{:<30} {:<12} {:>6} {:>6} {:>7}  {:?}: {}",
                    album_display, "failed", "-", "-", "-", stage, reason
                );
            }
        }
    }

    println!();

    let completed = outcomes.iter().filter(|o| o.is_completed()).count();
    let images: usize = outcomes
        .iter()
        .map(|o| match o.status {
            AlbumStatus::Completed { saved, .. } => saved,
            AlbumStatus::Failed { .. } => 0,
        })
        .sum();

    println!("Summary:");
    println!("   Albums done: {}", completed);
    println!("   Albums failed: {}", outcomes.len() - completed);
    println!("   Images saved: {}", images);
}
