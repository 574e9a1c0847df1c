//! Full-path crawl: live stub endpoint, HTTP client, SQLite store,
//! checkpoint file.

use axum::{extract::Path, http::StatusCode, routing::get, Router};
use roster_client::HttpEntryClient;
use roster_crawl::{CancelFlag, CheckpointFile, CrawlConfig, Crawler, StoreWriter};
use roster_store::Storage;

async fn entry(Path(id): Path<u64>) -> (StatusCode, String) {
    if id % 2 == 0 {
        let body = format!(
            r#"{{"id":{id},"display_name":"Entry {id}","owner_name":"Owner {id}","region":null,"metric_a":{id},"metric_b":null}}"#
        );
        (StatusCode::OK, body)
    } else {
        (StatusCode::NOT_FOUND, String::new())
    }
}

async fn spawn_stub() -> String {
    let app = Router::new().route("/entries/{id}", get(entry));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn config(start: u64, end: u64) -> CrawlConfig {
    CrawlConfig {
        start,
        end,
        concurrency: 10,
        batch_size: 20,
        ..CrawlConfig::default()
    }
}

#[tokio::test]
async fn crawl_persists_found_records_and_checkpoints_the_range() {
    let base = spawn_stub().await;
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("roster.db");
    let cp_path = dir.path().join("roster.db.checkpoint");

    let client = HttpEntryClient::with_default_timeout(&base).unwrap();
    let crawler = Crawler::new(client, config(1, 60)).unwrap();
    let mut writer = StoreWriter::new(Storage::open_at(&db_path).unwrap());
    let mut checkpoint = CheckpointFile::new(&cp_path);

    let stats = crawler
        .run(&mut writer, Some(&mut checkpoint), &CancelFlag::new())
        .await
        .unwrap();

    assert_eq!(stats.found, 30);
    assert_eq!(stats.not_found, 30);
    assert_eq!(stats.rows_written, 30);
    assert_eq!(stats.batches_completed, 3);
    assert_eq!(checkpoint.last(), Some(60));

    let storage = Storage::open_at(&db_path).unwrap();
    assert_eq!(roster_store::entries::count(storage.connection()).unwrap(), 30);
    let rec = roster_store::entries::get(storage.connection(), 42)
        .unwrap()
        .unwrap();
    assert_eq!(rec.display_name, "Entry 42");
    assert_eq!(rec.metric_a, Some(42));
    assert!(roster_store::entries::get(storage.connection(), 43)
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn rerunning_a_finished_crawl_is_a_noop() {
    let base = spawn_stub().await;
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("roster.db");
    let cp_path = dir.path().join("roster.db.checkpoint");

    for _ in 0..2 {
        let client = HttpEntryClient::with_default_timeout(&base).unwrap();
        let crawler = Crawler::new(client, config(1, 40)).unwrap();
        let mut writer = StoreWriter::new(Storage::open_at(&db_path).unwrap());
        let mut checkpoint = CheckpointFile::new(&cp_path);
        crawler
            .run(&mut writer, Some(&mut checkpoint), &CancelFlag::new())
            .await
            .unwrap();
    }

    let storage = Storage::open_at(&db_path).unwrap();
    assert_eq!(roster_store::entries::count(storage.connection()).unwrap(), 20);
}

#[tokio::test]
async fn recrawling_without_a_checkpoint_upserts_instead_of_duplicating() {
    let base = spawn_stub().await;
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("roster.db");

    for _ in 0..2 {
        let client = HttpEntryClient::with_default_timeout(&base).unwrap();
        let crawler = Crawler::new(client, config(1, 40)).unwrap();
        let mut writer = StoreWriter::new(Storage::open_at(&db_path).unwrap());
        crawler
            .run(&mut writer, None, &CancelFlag::new())
            .await
            .unwrap();
    }

    let storage = Storage::open_at(&db_path).unwrap();
    assert_eq!(roster_store::entries::count(storage.connection()).unwrap(), 20);
}
