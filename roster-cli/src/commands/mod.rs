pub mod crawl;
pub mod search;
