#![allow(dead_code)]

use chrono::{DateTime, Utc};
use nano_link::application::services::LinkService;
use nano_link::domain::visit_event::VisitEvent;
use nano_link::infrastructure::persistence::SqliteLinkStore;
use nano_link::state::AppState;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::mpsc;

pub const TEST_BASE_URL: &str = "http://s.test";

pub async fn insert_link(pool: &SqlitePool, code: &str, url: &str) -> i64 {
    insert_link_at(pool, code, url, Utc::now()).await
}

pub async fn insert_link_at(
    pool: &SqlitePool,
    code: &str,
    url: &str,
    created_at: DateTime<Utc>,
) -> i64 {
    sqlx::query("INSERT INTO short_links (code, original_url, created_at) VALUES (?, ?, ?)")
        .bind(code)
        .bind(url)
        .bind(created_at)
        .execute(pool)
        .await
        .unwrap()
        .last_insert_rowid()
}

pub async fn visits_of(pool: &SqlitePool, code: &str) -> i64 {
    sqlx::query_scalar("SELECT visits FROM short_links WHERE code = ?")
        .bind(code)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn count_links(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM short_links")
        .fetch_one(pool)
        .await
        .unwrap()
}

pub fn create_test_store(pool: SqlitePool) -> Arc<SqliteLinkStore> {
    Arc::new(SqliteLinkStore::new(Arc::new(pool)))
}

pub fn create_test_state(pool: SqlitePool) -> (AppState, mpsc::Receiver<VisitEvent>) {
    let (tx, rx) = mpsc::channel(100);

    let store = create_test_store(pool);
    let link_service = Arc::new(LinkService::new(store.clone()));

    let state = AppState::new(store, link_service, tx, TEST_BASE_URL);

    (state, rx)
}
