use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::{debug, info};

use super::ReviewStore;
use crate::error::{Error, Result};
use crate::models::{format_timestamp, parse_timestamp, NewReview, Review, Sentiment};

/// SQLite-backed review store for production persistence.
///
/// The pool is opened once and shared by every caller. Id assignment relies
/// on `AUTOINCREMENT`, so ids are never reused even across restarts.
/// Timestamps are stored as fixed-width RFC 3339 text so that ordering on the
/// column is chronological.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database at `database_url` and ensure the schema exists.
    ///
    /// `database_url` is a sqlx SQLite URL such as `sqlite://reviews.db`.
    /// An in-memory URL (`sqlite::memory:`) lives only as long as its
    /// connections, so pooled connections are then never recycled.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| Error::storage("parse database url", e))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let mut pool_options = SqlitePoolOptions::new().max_connections(max_connections.max(1));
        if is_in_memory(database_url) {
            pool_options = pool_options
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| Error::storage("connect to database", e))?;

        info!(url = %database_url, "Connected to SQLite");

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::storage("run database migrations", e))?;

        info!("Database migrations complete");

        Ok(())
    }

    /// Close every pooled connection; used at shutdown
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl ReviewStore for SqliteStore {
    async fn append(&self, review: NewReview) -> Result<Review> {
        // One statement, so id assignment and the timestamp clamp happen atomically
        let row = sqlx::query(
            r#"
            INSERT INTO reviews (text, sentiment, created_at)
            VALUES (
                ?1,
                ?2,
                MAX(?3, COALESCE((SELECT MAX(created_at) FROM reviews), ?3))
            )
            RETURNING id, created_at
            "#,
        )
        .bind(&review.text)
        .bind(review.sentiment.as_str())
        .bind(format_timestamp(review.created_at))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Error::storage("append review", e))?;

        let id: i64 = row
            .try_get("id")
            .map_err(|e| Error::storage("decode review", e))?;
        let created_at: String = row
            .try_get("created_at")
            .map_err(|e| Error::storage("decode review", e))?;
        let created_at =
            parse_timestamp(&created_at).map_err(|e| Error::storage("decode review", e))?;

        debug!(id, sentiment = %review.sentiment, "Saved review to database");

        Ok(Review {
            id,
            text: review.text,
            sentiment: review.sentiment,
            created_at,
        })
    }

    async fn query_by_sentiment(&self, sentiment: Sentiment) -> Result<Vec<Review>> {
        let rows = sqlx::query(
            r#"
            SELECT id, text, sentiment, created_at
            FROM reviews
            WHERE sentiment = ?1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(sentiment.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::storage("query reviews", e))?;

        rows.iter().map(review_from_row).collect()
    }
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

fn review_from_row(row: &SqliteRow) -> Result<Review> {
    let decode = |e: sqlx::Error| Error::storage("decode review", e);

    let id: i64 = row.try_get("id").map_err(decode)?;
    let text: String = row.try_get("text").map_err(decode)?;
    let sentiment: String = row.try_get("sentiment").map_err(decode)?;
    let created_at: String = row.try_get("created_at").map_err(decode)?;

    Ok(Review {
        id,
        text,
        sentiment: Sentiment::from_str(&sentiment)
            .map_err(|e| Error::storage("decode review", e))?,
        created_at: parse_timestamp(&created_at)
            .map_err(|e| Error::storage("decode review", e))?,
    })
}
