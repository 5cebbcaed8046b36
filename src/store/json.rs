use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::ReviewStore;
use crate::error::{Error, Result};
use crate::models::{sort_newest_first, NewReview, Review, Sentiment};

/// Attempts at claiming an id before giving up; each failed attempt means
/// another writer stored a review in between.
const MAX_CLAIM_ATTEMPTS: usize = 256;

/// JSON file-based review store.
///
/// Each review lives in `<id>.json` and the directory listing is the source
/// of truth. A review is written to a temporary file and then linked into
/// place with no-clobber semantics. The link fails if the id is already
/// taken, so any number of handles or processes sharing the directory never
/// hand out the same id, and readers only ever see complete files.
#[derive(Debug, Clone)]
pub struct JsonStore {
    base_path: PathBuf,
}

impl JsonStore {
    pub fn new(base_path: impl AsRef<Path>) -> Result<Self> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).map_err(|e| {
            Error::storage(
                "create store directory",
                format!("{}: {}", base_path.display(), e),
            )
        })?;

        info!(path = %base_path.display(), "Initialized JSON review store");

        Ok(Self { base_path })
    }

    fn review_path(&self, id: i64) -> PathBuf {
        self.base_path.join(format!("{}.json", id))
    }

    /// Ids of every stored review, ascending
    fn stored_ids(&self) -> Result<Vec<i64>> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| {
            Error::storage("list reviews", format!("{}: {}", self.base_path.display(), e))
        })?;

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::storage("list reviews", e))?;
            if let Some(id) = entry.file_name().to_str().and_then(review_id_from_file_name) {
                ids.push(id);
            }
        }

        ids.sort_unstable();
        Ok(ids)
    }

    fn load_review(&self, id: i64) -> Result<Review> {
        let path = self.review_path(id);
        let content = fs::read_to_string(&path).map_err(|e| {
            Error::storage("read review", format!("{}: {}", path.display(), e))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            Error::storage("parse review", format!("{}: {}", path.display(), e))
        })
    }

    /// Link a fully written review into place. Returns false when the id is taken.
    fn publish(&self, review: &Review) -> Result<bool> {
        let mut tmp = NamedTempFile::new_in(&self.base_path)
            .map_err(|e| Error::storage("write review", e))?;
        serde_json::to_writer_pretty(&mut tmp, review)
            .map_err(|e| Error::storage("encode review", e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| Error::storage("write review", e))?;

        match tmp.persist_noclobber(self.review_path(review.id)) {
            Ok(_) => Ok(true),
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(Error::storage("write review", e.error)),
        }
    }

    fn append_blocking(&self, review: NewReview) -> Result<Review> {
        for _ in 0..MAX_CLAIM_ATTEMPTS {
            // Timestamps never decrease with id, so the highest id holds the latest one
            let (id, created_at) = match self.stored_ids()?.last() {
                Some(&latest) => {
                    let latest_review = self.load_review(latest)?;
                    (latest + 1, review.created_at.max(latest_review.created_at))
                }
                None => (1, review.created_at),
            };

            let candidate = Review {
                id,
                text: review.text.clone(),
                sentiment: review.sentiment,
                created_at,
            };

            if self.publish(&candidate)? {
                debug!(id, "Saved review to store");
                return Ok(candidate);
            }

            debug!(id, "Review id taken by another writer, retrying");
        }

        Err(Error::storage(
            "append review",
            "could not claim a review id, too many concurrent writers",
        ))
    }

    fn query_blocking(&self, sentiment: Sentiment) -> Result<Vec<Review>> {
        let mut reviews = Vec::new();
        for id in self.stored_ids()? {
            let review = self.load_review(id)?;
            if review.sentiment == sentiment {
                reviews.push(review);
            }
        }

        sort_newest_first(&mut reviews);
        Ok(reviews)
    }
}

/// `42.json` -> 42; temporary and unrelated files are skipped
fn review_id_from_file_name(name: &str) -> Option<i64> {
    let stem = name.strip_suffix(".json")?;
    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    stem.parse().ok().filter(|id| *id > 0)
}

#[async_trait]
impl ReviewStore for JsonStore {
    async fn append(&self, review: NewReview) -> Result<Review> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.append_blocking(review))
            .await
            .map_err(|e| Error::storage("append review", e))?
    }

    async fn query_by_sentiment(&self, sentiment: Sentiment) -> Result<Vec<Review>> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.query_blocking(sentiment))
            .await
            .map_err(|e| Error::storage("query reviews", e))?
    }
}
