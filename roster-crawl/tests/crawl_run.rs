//! Driver behavior against a scripted in-process fetcher: batching, retry
//! policy, checkpoint discipline, and cancellation.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use roster_client::{EntryFetcher, FetchOutcome};
use roster_core::{EntryRecord, Error, Result};
use roster_crawl::{BatchWriter, CancelFlag, CheckpointFile, CrawlConfig, Crawler};

type Script = Box<dyn Fn(u64, u32) -> FetchOutcome + Send + Sync>;

/// Replays a scripted outcome per (id, attempt) pair and counts attempts.
struct ScriptedFetcher {
    attempts: Mutex<HashMap<u64, u32>>,
    script: Script,
}

impl ScriptedFetcher {
    fn new(script: impl Fn(u64, u32) -> FetchOutcome + Send + Sync + 'static) -> Self {
        ScriptedFetcher {
            attempts: Mutex::new(HashMap::new()),
            script: Box::new(script),
        }
    }
}

#[async_trait]
impl EntryFetcher for ScriptedFetcher {
    async fn fetch(&self, id: u64) -> FetchOutcome {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            let slot = attempts.entry(id).or_insert(0);
            *slot += 1;
            *slot
        };
        (self.script)(id, attempt)
    }
}

/// Records every flush; optionally raises a cancel flag after each one.
#[derive(Default)]
struct MemoryWriter {
    flushes: Vec<Vec<EntryRecord>>,
    cancel_after_flush: Option<CancelFlag>,
}

impl BatchWriter for MemoryWriter {
    fn flush(&mut self, records: &[EntryRecord]) -> Result<usize> {
        self.flushes.push(records.to_vec());
        if let Some(flag) = &self.cancel_after_flush {
            flag.cancel();
        }
        Ok(records.len())
    }
}

struct FailingWriter {
    flushes: usize,
    fail_at: usize,
}

impl BatchWriter for FailingWriter {
    fn flush(&mut self, records: &[EntryRecord]) -> Result<usize> {
        self.flushes += 1;
        if self.flushes >= self.fail_at {
            return Err(Error::store("disk full"));
        }
        Ok(records.len())
    }
}

fn record(id: u64) -> EntryRecord {
    EntryRecord::new(id, format!("Entry {id}"), format!("Owner {id}"))
}

fn config(start: u64, end: u64, batch_size: u64) -> CrawlConfig {
    CrawlConfig {
        start,
        end,
        batch_size,
        concurrency: 8,
        max_attempts: 4,
        retry_base_ms: 5,
        retry_max_ms: 20,
        ..CrawlConfig::default()
    }
}

#[tokio::test]
async fn even_ids_found_odd_ids_missing_yields_half_the_rows() {
    let fetcher = ScriptedFetcher::new(|id, _| {
        if id % 2 == 0 {
            FetchOutcome::Found(record(id))
        } else {
            FetchOutcome::NotFound
        }
    });
    let crawler = Crawler::new(
        fetcher,
        CrawlConfig {
            concurrency: 50,
            ..config(1, 1000, 100)
        },
    )
    .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let mut checkpoint = CheckpointFile::new(dir.path().join("crawl.checkpoint"));
    let mut writer = MemoryWriter::default();
    let cancel = CancelFlag::new();

    let stats = crawler
        .run(&mut writer, Some(&mut checkpoint), &cancel)
        .await
        .unwrap();

    assert_eq!(stats.found, 500);
    assert_eq!(stats.not_found, 500);
    assert_eq!(stats.dropped(), 0);
    assert_eq!(stats.resolved(), 1000);
    assert_eq!(stats.rows_written, 500);
    assert_eq!(stats.batches_completed, 10);
    assert!(!stats.interrupted);

    // One flush per batch, found IDs only, nothing lost or duplicated.
    assert_eq!(writer.flushes.len(), 10);
    let mut ids: Vec<u64> = writer
        .flushes
        .iter()
        .flatten()
        .map(|r| r.id)
        .collect();
    ids.sort_unstable();
    assert_eq!(ids.len(), 500);
    assert!(ids.iter().all(|id| id % 2 == 0));
    assert_eq!(ids.first(), Some(&2));
    assert_eq!(ids.last(), Some(&1000));

    assert_eq!(checkpoint.last(), Some(1000));
    let mut reread = CheckpointFile::new(checkpoint.path());
    assert_eq!(reread.load().unwrap(), Some(1000));
}

#[tokio::test]
async fn transient_failures_retry_within_budget() {
    // ID 3 needs three attempts; everything else succeeds first try.
    let fetcher = ScriptedFetcher::new(|id, attempt| {
        if id == 3 && attempt < 3 {
            FetchOutcome::TransientError("boom".into())
        } else {
            FetchOutcome::Found(record(id))
        }
    });
    let crawler = Crawler::new(fetcher, config(1, 5, 5)).unwrap();

    let mut writer = MemoryWriter::default();
    let stats = crawler
        .run(&mut writer, None, &CancelFlag::new())
        .await
        .unwrap();

    assert_eq!(stats.found, 5);
    assert_eq!(stats.retries, 2);
    assert_eq!(stats.dropped(), 0);
    let mut ids: Vec<u64> = writer.flushes[0].iter().map(|r| r.id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn exhausted_budget_drops_the_id_and_the_run_continues() {
    let fetcher = ScriptedFetcher::new(|id, _| {
        if id == 2 {
            FetchOutcome::TransientError("still down".into())
        } else {
            FetchOutcome::Found(record(id))
        }
    });
    let crawler = Crawler::new(
        fetcher,
        CrawlConfig {
            max_attempts: 3,
            ..config(1, 3, 3)
        },
    )
    .unwrap();

    let mut writer = MemoryWriter::default();
    let stats = crawler
        .run(&mut writer, None, &CancelFlag::new())
        .await
        .unwrap();

    assert_eq!(stats.found, 2);
    assert_eq!(stats.transient_dropped, 1);
    assert_eq!(stats.retries, 2);
    assert_eq!(stats.resolved(), 3);
    let mut ids: Vec<u64> = writer.flushes[0].iter().map(|r| r.id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 3]);
}

#[tokio::test]
async fn rate_limited_ids_are_requeued_after_a_delay() {
    let fetcher = ScriptedFetcher::new(|id, attempt| {
        if attempt == 1 {
            FetchOutcome::RateLimited
        } else {
            FetchOutcome::Found(record(id))
        }
    });
    let crawler = Crawler::new(fetcher, config(1, 4, 4)).unwrap();

    let mut writer = MemoryWriter::default();
    let stats = crawler
        .run(&mut writer, None, &CancelFlag::new())
        .await
        .unwrap();

    assert_eq!(stats.found, 4);
    assert_eq!(stats.retries, 4);
    assert_eq!(stats.rate_limited_dropped, 0);
    assert_eq!(writer.flushes[0].len(), 4);
}

#[tokio::test]
async fn persistent_rate_limiting_exhausts_the_shared_budget() {
    let fetcher = ScriptedFetcher::new(|_, _| FetchOutcome::RateLimited);
    let crawler = Crawler::new(
        fetcher,
        CrawlConfig {
            max_attempts: 2,
            ..config(1, 1, 1)
        },
    )
    .unwrap();

    let mut writer = MemoryWriter::default();
    let stats = crawler
        .run(&mut writer, None, &CancelFlag::new())
        .await
        .unwrap();

    assert_eq!(stats.rate_limited_dropped, 1);
    assert_eq!(stats.retries, 1);
    assert_eq!(stats.found, 0);
    // The batch still flushes (empty) and completes.
    assert_eq!(writer.flushes.len(), 1);
    assert!(writer.flushes[0].is_empty());
    assert_eq!(stats.batches_completed, 1);
}

#[tokio::test]
async fn malformed_responses_are_retried_not_treated_as_absent() {
    let fetcher = ScriptedFetcher::new(|id, attempt| {
        if attempt == 1 {
            FetchOutcome::MalformedResponse("body is not a JSON object".into())
        } else {
            FetchOutcome::Found(record(id))
        }
    });
    let crawler = Crawler::new(fetcher, config(1, 2, 2)).unwrap();

    let mut writer = MemoryWriter::default();
    let stats = crawler
        .run(&mut writer, None, &CancelFlag::new())
        .await
        .unwrap();

    assert_eq!(stats.found, 2);
    assert_eq!(stats.not_found, 0);
    assert_eq!(stats.malformed_dropped, 0);
    assert_eq!(stats.retries, 2);
}

#[tokio::test]
async fn flush_failure_aborts_without_advancing_the_checkpoint() {
    let fetcher = ScriptedFetcher::new(|id, _| FetchOutcome::Found(record(id)));
    let crawler = Crawler::new(fetcher, config(1, 200, 100)).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let mut checkpoint = CheckpointFile::new(dir.path().join("crawl.checkpoint"));
    let mut writer = FailingWriter {
        flushes: 0,
        fail_at: 2,
    };

    let err = crawler
        .run(&mut writer, Some(&mut checkpoint), &CancelFlag::new())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("disk full"));

    // Batch 1 was durable before the failure; batch 2 never advanced.
    let mut reread = CheckpointFile::new(checkpoint.path());
    assert_eq!(reread.load().unwrap(), Some(100));
}

#[tokio::test]
async fn resume_skips_everything_already_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crawl.checkpoint");

    {
        let fetcher = ScriptedFetcher::new(|id, _| FetchOutcome::Found(record(id)));
        let crawler = Crawler::new(fetcher, config(1, 300, 100)).unwrap();
        let mut checkpoint = CheckpointFile::new(&path);
        let mut writer = MemoryWriter::default();
        let stats = crawler
            .run(&mut writer, Some(&mut checkpoint), &CancelFlag::new())
            .await
            .unwrap();
        assert_eq!(stats.batches_completed, 3);
    }

    // A fresh run over the same range finds nothing left to do.
    let fetcher = ScriptedFetcher::new(|_, _| panic!("resumed run must not fetch"));
    let crawler = Crawler::new(fetcher, config(1, 300, 100)).unwrap();
    let mut checkpoint = CheckpointFile::new(&path);
    let mut writer = MemoryWriter::default();
    let stats = crawler
        .run(&mut writer, Some(&mut checkpoint), &CancelFlag::new())
        .await
        .unwrap();

    assert_eq!(stats.resumed_from, Some(300));
    assert_eq!(stats.batches_completed, 0);
    assert!(writer.flushes.is_empty());
}

#[tokio::test]
async fn resume_restarts_at_the_batch_after_the_boundary() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crawl.checkpoint");
    CheckpointFile::new(&path).advance(100).unwrap();

    let fetcher = ScriptedFetcher::new(|id, _| {
        assert!(id > 100, "ID {id} was already covered by the checkpoint");
        FetchOutcome::Found(record(id))
    });
    let crawler = Crawler::new(fetcher, config(1, 300, 100)).unwrap();
    let mut checkpoint = CheckpointFile::new(&path);
    let mut writer = MemoryWriter::default();
    let stats = crawler
        .run(&mut writer, Some(&mut checkpoint), &CancelFlag::new())
        .await
        .unwrap();

    assert_eq!(stats.resumed_from, Some(100));
    assert_eq!(stats.found, 200);
    assert_eq!(stats.batches_completed, 2);
    assert_eq!(checkpoint.last(), Some(300));
}

#[tokio::test]
async fn cancellation_stops_after_the_current_batch_with_no_partial_advance() {
    let cancel = CancelFlag::new();
    let fetcher = ScriptedFetcher::new(|id, _| FetchOutcome::Found(record(id)));
    let crawler = Crawler::new(fetcher, config(1, 500, 100)).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let mut checkpoint = CheckpointFile::new(dir.path().join("crawl.checkpoint"));
    let mut writer = MemoryWriter {
        cancel_after_flush: Some(cancel.clone()),
        ..MemoryWriter::default()
    };

    let stats = crawler
        .run(&mut writer, Some(&mut checkpoint), &cancel)
        .await
        .unwrap();

    assert!(stats.interrupted);
    assert_eq!(stats.batches_completed, 1);
    assert_eq!(writer.flushes.len(), 1);
    assert_eq!(checkpoint.last(), Some(100));
}

#[tokio::test]
async fn cancellation_mid_batch_abandons_the_batch() {
    let cancel = CancelFlag::new();
    let trigger = cancel.clone();
    // Raise the flag while batch 2 is in flight; batch 1 already checkpointed.
    let fetcher = ScriptedFetcher::new(move |id, _| {
        if id == 150 {
            trigger.cancel();
        }
        FetchOutcome::Found(record(id))
    });
    let crawler = Crawler::new(fetcher, config(1, 300, 100)).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let mut checkpoint = CheckpointFile::new(dir.path().join("crawl.checkpoint"));
    let mut writer = MemoryWriter::default();

    let stats = crawler
        .run(&mut writer, Some(&mut checkpoint), &cancel)
        .await
        .unwrap();

    assert!(stats.interrupted);
    assert_eq!(stats.batches_completed, 1);
    assert_eq!(writer.flushes.len(), 1);
    assert_eq!(checkpoint.last(), Some(100));
}

#[tokio::test]
async fn runs_without_a_checkpoint_file() {
    let fetcher = ScriptedFetcher::new(|id, _| FetchOutcome::Found(record(id)));
    let crawler = Crawler::new(fetcher, config(1, 50, 25)).unwrap();

    let mut writer = MemoryWriter::default();
    let stats = crawler
        .run(&mut writer, None, &CancelFlag::new())
        .await
        .unwrap();

    assert_eq!(stats.found, 50);
    assert_eq!(stats.resumed_from, None);
    assert_eq!(writer.flushes.len(), 2);
}
