use chrono::Utc;
use tracing::info;

use crate::classifier::SentimentClassifier;
use crate::error::{Error, Result};
use crate::models::{NewReview, Review, Sentiment};
use crate::store::ReviewStore;

/// Classifies incoming feedback and records it in a store
pub struct ReviewService<S: ReviewStore> {
    classifier: SentimentClassifier,
    store: S,
}

impl<S: ReviewStore> ReviewService<S> {
    pub fn new(classifier: SentimentClassifier, store: S) -> Self {
        Self { classifier, store }
    }

    /// Classify `text`, stamp it with the current time and persist it
    pub async fn create(&self, text: &str) -> Result<Review> {
        if text.trim().is_empty() {
            return Err(Error::invalid_input("text must not be empty"));
        }

        let sentiment = self.classifier.classify(text);
        let review = self
            .store
            .append(NewReview::new(text, sentiment, Utc::now()))
            .await?;

        info!(id = review.id, sentiment = %review.sentiment, "Review recorded");

        Ok(review)
    }

    /// Reviews matching an external sentiment filter such as `"positive"`, newest first
    pub async fn list(&self, filter: &str) -> Result<Vec<Review>> {
        let sentiment: Sentiment = filter.parse()?;
        self.list_by_sentiment(sentiment).await
    }

    pub async fn list_by_sentiment(&self, sentiment: Sentiment) -> Result<Vec<Review>> {
        let reviews = self.store.query_by_sentiment(sentiment).await?;
        info!(sentiment = %sentiment, count = reviews.len(), "Listed reviews");
        Ok(reviews)
    }

    /// Label text without storing it
    pub fn classify(&self, text: &str) -> Sentiment {
        self.classifier.classify(text)
    }

    /// Get the store for direct access
    pub fn store(&self) -> &S {
        &self.store
    }
}
