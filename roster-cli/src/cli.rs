use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "roster", about = "Bulk roster ingestion and fuzzy name lookup", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output (also respects NO_COLOR env var)
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Crawl the remote directory into the local store
    Crawl {
        /// Base URL of the read endpoint, e.g. https://api.example.com
        #[arg(long)]
        base_url: String,

        /// First ID to fetch (inclusive)
        #[arg(long, default_value_t = 1)]
        start: u64,

        /// Last ID to fetch (inclusive)
        #[arg(long, default_value_t = 12_000_000)]
        end: u64,

        /// Store file to write
        #[arg(long, default_value = "roster.db")]
        output: PathBuf,

        /// Maximum in-flight requests
        #[arg(long, default_value_t = 100)]
        concurrency: usize,

        /// Checkpoint file for crash-safe resume (created if absent)
        #[arg(long)]
        checkpoint: Option<PathBuf>,

        /// IDs per batch; the store flushes and the checkpoint advances once
        /// per batch
        #[arg(long, default_value_t = 100_000)]
        batch_size: u64,

        /// Attempts per ID before it is dropped for this run
        #[arg(long, default_value_t = 4)]
        max_attempts: u32,

        /// Pause between batches, in milliseconds
        #[arg(long, default_value_t = 0)]
        batch_pause_ms: u64,

        /// Per-request timeout, in seconds
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,
    },

    /// Fuzzy-search crawled entries by display name
    Search {
        /// Name to look up
        query: String,

        /// Store file to search
        #[arg(long, default_value = "roster.db")]
        output: PathBuf,

        /// Maximum number of hits
        #[arg(long, default_value_t = 10)]
        limit: usize,

        /// Drop hits scoring below this similarity (0 to 1)
        #[arg(long, default_value_t = 0.4)]
        min_similarity: f64,
    },
}
