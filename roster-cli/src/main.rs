mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use cli::{Cli, Commands};
use error::exit_with_error;
use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn init_tracing(cli: &Cli) {
    // CLI tracing policy:
    //   --quiet   → always "off" (no logs, no matter what)
    //   --verbose → honour RUST_LOG if set, otherwise debug for roster crates
    //   default   → info for roster crates; batch progress and index build
    //               status arrive as info lines on stderr
    let filter = if cli.quiet {
        tracing_subscriber::EnvFilter::new("off")
    } else if cli.verbose {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "roster_cli=debug,roster_client=debug,roster_crawl=debug,roster_search=debug,roster_store=debug".into()
        })
    } else {
        tracing_subscriber::EnvFilter::new(
            "roster_cli=info,roster_client=info,roster_crawl=info,roster_search=info,roster_store=info",
        )
    };

    let ansi = !(cli.no_color || std::env::var_os("NO_COLOR").is_some());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(ansi)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Disable color when --no-color or the NO_COLOR env var is set. Errors
    // and logs go to stderr, so piping stdout keeps its color handling.
    if cli.no_color || std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    }

    init_tracing(&cli);

    if let Err(e) = run(cli).await {
        exit_with_error(e);
    }
}

async fn run(cli: Cli) -> error::CliResult<()> {
    match cli.command {
        Commands::Crawl {
            base_url,
            start,
            end,
            output,
            concurrency,
            checkpoint,
            batch_size,
            max_attempts,
            batch_pause_ms,
            timeout_secs,
        } => {
            commands::crawl::run(commands::crawl::CrawlOpts {
                base_url,
                start,
                end,
                output,
                concurrency,
                checkpoint,
                batch_size,
                max_attempts,
                batch_pause_ms,
                timeout_secs,
            })
            .await
        }

        Commands::Search {
            query,
            output,
            limit,
            min_similarity,
        } => {
            commands::search::run(commands::search::SearchOpts {
                query,
                output,
                limit,
                min_similarity,
            })
            .await
        }
    }
}
