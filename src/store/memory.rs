//! In-memory `ReviewStore`. Contents are lost when the process exits.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::ReviewStore;
use crate::error::Result;
use crate::models::{sort_newest_first, NewReview, Review, Sentiment};

/// Reviews held in a `Vec` behind a `RwLock`; ids start at 1.
#[derive(Debug, Default)]
pub struct MemoryStore {
    reviews: RwLock<Vec<Review>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReviewStore for MemoryStore {
    async fn append(&self, mut review: NewReview) -> Result<Review> {
        let mut reviews = self.reviews.write().await;

        let id = reviews.last().map_or(1, |last| last.id + 1);
        if let Some(last) = reviews.last() {
            review.created_at = review.created_at.max(last.created_at);
        }

        let review = review.into_review(id);
        reviews.push(review.clone());
        Ok(review)
    }

    async fn query_by_sentiment(&self, sentiment: Sentiment) -> Result<Vec<Review>> {
        let reviews = self.reviews.read().await;
        let mut matching: Vec<Review> = reviews
            .iter()
            .filter(|r| r.sentiment == sentiment)
            .cloned()
            .collect();
        sort_newest_first(&mut matching);
        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    #[tokio::test]
    async fn test_append_assigns_increasing_ids() {
        let store = MemoryStore::new();
        let now = Utc::now();

        let first = store
            .append(NewReview::new("one", Sentiment::Positive, now))
            .await
            .unwrap();
        let second = store
            .append(NewReview::new("two", Sentiment::Negative, now))
            .await
            .unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(second.text, "two");
    }

    #[tokio::test]
    async fn test_query_filters_and_orders() {
        let store = MemoryStore::new();
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        for (i, sentiment) in [
            Sentiment::Positive,
            Sentiment::Negative,
            Sentiment::Positive,
            Sentiment::Positive,
        ]
        .into_iter()
        .enumerate()
        {
            store
                .append(NewReview::new(
                    format!("review {}", i),
                    sentiment,
                    base + Duration::seconds(i as i64),
                ))
                .await
                .unwrap();
        }

        let positive = store.query_by_sentiment(Sentiment::Positive).await.unwrap();
        let ids: Vec<i64> = positive.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![4, 3, 1]);

        let neutral = store.query_by_sentiment(Sentiment::Neutral).await.unwrap();
        assert!(neutral.is_empty());
    }

    #[tokio::test]
    async fn test_timestamp_never_goes_backwards() {
        let store = MemoryStore::new();
        let later = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let earlier = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        store
            .append(NewReview::new("first", Sentiment::Neutral, later))
            .await
            .unwrap();
        let second = store
            .append(NewReview::new("second", Sentiment::Neutral, earlier))
            .await
            .unwrap();

        assert_eq!(second.created_at, later);

        let listed = store.query_by_sentiment(Sentiment::Neutral).await.unwrap();
        assert_eq!(listed[0].id, 2);
        assert_eq!(listed[1].id, 1);
    }

    #[tokio::test]
    async fn test_concurrent_appends_get_distinct_ids() {
        let store = Arc::new(MemoryStore::new());

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .append(NewReview::new(
                            format!("review {}", i),
                            Sentiment::Neutral,
                            Utc::now(),
                        ))
                        .await
                        .unwrap()
                        .id
                })
            })
            .collect();

        let mut ids = HashSet::new();
        for handle in handles {
            assert!(ids.insert(handle.await.unwrap()));
        }
        assert_eq!(ids.len(), 32);
        assert_eq!(ids.iter().max(), Some(&32));
    }
}
