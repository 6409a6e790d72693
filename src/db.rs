use crate::auth::AuthError;
use crate::models::review::{Review, Sentiment};
use async_trait::async_trait;
use leptos::logging::log;
use rusqlite::Connection;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),
    #[error("{reason} (status {status})")]
    Status { status: u16, reason: String },
    #[error("{0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("could not decode stored document: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),
}

/// Append-only document store holding the reviews.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Creates the database or schema when it does not exist yet.
    async fn ensure_database(&self) -> Result<(), StoreError>;

    /// Persists a new review and returns the id it was stored under.
    async fn insert_review(&self, review: &Review) -> Result<String, StoreError>;

    /// Returns at most `limit` reviews in key order.
    async fn list_reviews(&self, limit: usize) -> Result<Vec<Review>, StoreError>;
}

// Local SQLite-backed document store
#[derive(Debug)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    // Create a new database connection
    pub fn new(db_path: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(db_path)?;
        log!("[DB] Database connection established at: {}", db_path);
        Ok(Database {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    // Create the database schema
    pub async fn create_schema(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS reviews (
                id TEXT PRIMARY KEY,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                movie TEXT NOT NULL,
                review TEXT NOT NULL,
                sentiment TEXT,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            );",
        )
        .map_err(|e| {
            log!("[DB] Failed creating reviews table: {}", e);
            e
        })?;
        Ok(())
    }
}

fn insert_row(conn: &Connection, review: &Review) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO reviews (id, first_name, last_name, movie, review, sentiment)
        VALUES (?, ?, ?, ?, ?, ?)",
        rusqlite::params![
            &review.id,
            &review.first_name,
            &review.last_name,
            &review.movie,
            &review.review_text,
            review.sentiment.map(|s| s.as_str()),
        ],
    )?;
    Ok(())
}

fn select_rows(conn: &Connection, limit: usize) -> Result<Vec<Review>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT id, first_name, last_name, movie, review, sentiment
        FROM reviews
        ORDER BY id ASC
        LIMIT ?",
    )?;
    // SQLite treats a negative LIMIT as unbounded, so never let a large usize wrap.
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let rows = stmt.query_map([limit], |row| {
        let sentiment: Option<String> = row.get(5)?;
        Ok(Review {
            id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            movie: row.get(3)?,
            review_text: row.get(4)?,
            sentiment: sentiment.and_then(|s| s.parse::<Sentiment>().ok()),
        })
    })?;
    rows.collect()
}

#[async_trait]
impl ReviewStore for Database {
    async fn ensure_database(&self) -> Result<(), StoreError> {
        self.create_schema().await
    }

    async fn insert_review(&self, review: &Review) -> Result<String, StoreError> {
        log!("[DB] Inserting review {}", review.id);
        let conn = self.conn.lock().await;
        insert_row(&conn, review).map_err(|e| {
            log!("[DB] Insert failed for {}: {:?}", review.id, e);
            e
        })?;
        Ok(review.id.clone())
    }

    async fn list_reviews(&self, limit: usize) -> Result<Vec<Review>, StoreError> {
        let conn = self.conn.lock().await;
        let reviews = select_rows(&conn, limit)?;
        log!("[DB] Fetched {} reviews from the database", reviews.len());
        Ok(reviews)
    }
}
