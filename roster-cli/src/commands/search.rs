use std::path::PathBuf;

use comfy_table::{ContentArrangement, Table};
use roster_core::Error;
use roster_search::{SearchConfig, SearchEngine};

use crate::error::{CliError, CliResult};

pub struct SearchOpts {
    pub query: String,
    pub output: PathBuf,
    pub limit: usize,
    pub min_similarity: f64,
}

pub async fn run(opts: SearchOpts) -> CliResult<()> {
    if !(0.0..=1.0).contains(&opts.min_similarity) {
        return Err(CliError::Usage(format!(
            "--min-similarity must be between 0 and 1, got {}",
            opts.min_similarity
        )));
    }
    if !opts.output.exists() {
        return Err(CliError::NoStore(opts.output));
    }

    let engine = SearchEngine::open(
        &opts.output,
        SearchConfig {
            min_similarity: opts.min_similarity,
            ..SearchConfig::default()
        },
    );

    // The first search may build the directory index, which blocks on store
    // I/O and on the locked-store retry schedule.
    let query = opts.query.clone();
    let limit = opts.limit;
    let hits = tokio::task::spawn_blocking(move || engine.search(&query, limit))
        .await
        .map_err(|e| CliError::Pipeline(Error::other(format!("search task failed: {e}"))))??;

    if hits.is_empty() {
        println!("No matches for '{}'", opts.query);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["ID", "NAME", "SIMILARITY"]);
    for hit in &hits {
        table.add_row(vec![
            hit.id.to_string(),
            hit.display_name.clone(),
            format!("{:.3}", hit.similarity),
        ]);
    }
    println!("{table}");
    Ok(())
}
