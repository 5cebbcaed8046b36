pub mod json;
pub mod memory;
pub mod sqlite;

pub use json::JsonStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{NewReview, Review, Sentiment};

/// Append-only persistence for classified reviews.
///
/// Implementations assign ids atomically: concurrent appends never share an
/// id and ids only grow. The stored `created_at` is never earlier than that
/// of any previously stored review, so id order and time order agree.
/// Reads always go to the backend; nothing is cached.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Store a review and return it with its assigned id
    async fn append(&self, review: NewReview) -> Result<Review>;

    /// All reviews with the given sentiment, newest first (ties: higher id first)
    async fn query_by_sentiment(&self, sentiment: Sentiment) -> Result<Vec<Review>>;
}
