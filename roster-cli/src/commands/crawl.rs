use std::path::PathBuf;
use std::time::Duration;

use colored::Colorize;
use roster_client::HttpEntryClient;
use roster_crawl::{CancelFlag, CheckpointFile, CrawlConfig, CrawlStats, Crawler, StoreWriter};
use roster_store::Storage;

use crate::error::CliResult;
use crate::output::format_with_commas;

pub struct CrawlOpts {
    pub base_url: String,
    pub start: u64,
    pub end: u64,
    pub output: PathBuf,
    pub concurrency: usize,
    pub checkpoint: Option<PathBuf>,
    pub batch_size: u64,
    pub max_attempts: u32,
    pub batch_pause_ms: u64,
    pub timeout_secs: u64,
}

pub async fn run(opts: CrawlOpts) -> CliResult<()> {
    let config = CrawlConfig {
        start: opts.start,
        end: opts.end,
        concurrency: opts.concurrency,
        batch_size: opts.batch_size,
        max_attempts: opts.max_attempts,
        batch_pause: Duration::from_millis(opts.batch_pause_ms),
        ..CrawlConfig::default()
    };

    let client = HttpEntryClient::new(&opts.base_url, Duration::from_secs(opts.timeout_secs))?;
    let crawler = Crawler::new(client, config)?;
    let mut writer = StoreWriter::new(Storage::open_at(&opts.output)?);
    let mut checkpoint = opts.checkpoint.map(CheckpointFile::new);
    if checkpoint.is_none() {
        tracing::warn!("no --checkpoint file configured; an interrupted run restarts from --start");
    }

    // First Ctrl-C finishes the current batch and checkpoints it; the crawl
    // then exits cleanly.
    let cancel = CancelFlag::new();
    let watcher = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\ninterrupt received, finishing the current batch");
            watcher.cancel();
        }
    });

    let stats = crawler
        .run(&mut writer, checkpoint.as_mut(), &cancel)
        .await?;
    print_summary(&stats);
    Ok(())
}

fn print_summary(stats: &CrawlStats) {
    let status = if stats.interrupted {
        "interrupted".yellow().bold()
    } else {
        "complete".green().bold()
    };
    let secs = stats.elapsed.as_secs_f64();
    let rate = if secs > 0.0 {
        stats.resolved() as f64 / secs
    } else {
        0.0
    };

    println!(
        "\nCrawl {status}: {} IDs resolved in {secs:.1}s ({rate:.0} ids/s)",
        format_with_commas(stats.resolved())
    );
    println!("    {:>12}  found", format_with_commas(stats.found));
    println!("    {:>12}  not found", format_with_commas(stats.not_found));
    println!("    {:>12}  dropped", format_with_commas(stats.dropped()));
    println!("    {:>12}  retries", format_with_commas(stats.retries));
    println!(
        "    {:>12}  rows written",
        format_with_commas(stats.rows_written)
    );
    println!(
        "    {:>12}  batches completed",
        format_with_commas(stats.batches_completed)
    );
    if let Some(boundary) = stats.resumed_from {
        println!(
            "    {:>12}  resumed from checkpoint",
            format_with_commas(boundary)
        );
    }
}
