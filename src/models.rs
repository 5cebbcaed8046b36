use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Sentiment label assigned to a review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];

    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(Sentiment::Positive),
            "negative" => Ok(Sentiment::Negative),
            "neutral" => Ok(Sentiment::Neutral),
            "" => Err(Error::invalid_input("Sentiment parameter is required")),
            _ => {
                let valid: Vec<&str> = Sentiment::ALL.iter().map(|s| s.as_str()).collect();
                Err(Error::invalid_input(format!(
                    "Sentiment must be one of: {}",
                    valid.join(", ")
                )))
            }
        }
    }
}

/// A classified, persisted piece of feedback. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub text: String,
    pub sentiment: Sentiment,
    #[serde(with = "timestamp_format")]
    pub created_at: DateTime<Utc>,
}

/// Everything a store needs to append a review; the id is assigned by the store
#[derive(Debug, Clone)]
pub struct NewReview {
    pub text: String,
    pub sentiment: Sentiment,
    pub created_at: DateTime<Utc>,
}

impl NewReview {
    /// Timestamps are truncated to microseconds, the precision every backend persists
    pub fn new(text: impl Into<String>, sentiment: Sentiment, created_at: DateTime<Utc>) -> Self {
        Self {
            text: text.into(),
            sentiment,
            created_at: created_at.trunc_subsecs(6),
        }
    }

    pub fn into_review(self, id: i64) -> Review {
        Review {
            id,
            text: self.text,
            sentiment: self.sentiment,
            created_at: self.created_at,
        }
    }
}

/// Fixed-width RFC 3339 form; lexicographic order equals chronological order
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}

/// Serde adapter that writes timestamps in the same fixed-width form the stores persist
pub mod timestamp_format {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(*ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_timestamp(&s).map_err(serde::de::Error::custom)
    }
}

/// Sort newest first; equal timestamps fall back to the higher id
pub fn sort_newest_first(reviews: &mut [Review]) {
    reviews.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_sentiment() {
        assert_eq!("positive".parse::<Sentiment>().unwrap(), Sentiment::Positive);
        assert_eq!("negative".parse::<Sentiment>().unwrap(), Sentiment::Negative);
        assert_eq!("neutral".parse::<Sentiment>().unwrap(), Sentiment::Neutral);
    }

    #[test]
    fn test_parse_rejects_unknown_value() {
        let err = "good".parse::<Sentiment>().unwrap_err();
        assert!(err.is_invalid_input());
        let message = err.to_string();
        assert!(message.contains("positive"));
        assert!(message.contains("negative"));
        assert!(message.contains("neutral"));

        // Case matters at the boundary
        assert!("Positive".parse::<Sentiment>().is_err());
    }

    #[test]
    fn test_parse_rejects_missing_value() {
        let err = "".parse::<Sentiment>().unwrap_err();
        assert!(err.to_string().contains("required"));
    }

    #[test]
    fn test_review_json_shape() {
        let review = Review {
            id: 7,
            text: "Отличный сервис".to_string(),
            sentiment: Sentiment::Positive,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
        };

        let value = serde_json::to_value(&review).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["text"], "Отличный сервис");
        assert_eq!(value["sentiment"], "positive");
        assert_eq!(value["created_at"], "2024-05-01T12:30:00.000000Z");

        let parsed: Review = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, review);
    }

    #[test]
    fn test_timestamp_format_is_fixed_width() {
        let whole = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let formatted = format_timestamp(whole);
        assert_eq!(formatted, "2024-05-01T12:30:00.000000Z");
        assert_eq!(parse_timestamp(&formatted).unwrap(), whole);
    }

    #[test]
    fn test_sort_newest_first_breaks_ties_by_id() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 5, 2, 12, 0, 0).unwrap();
        let mut reviews = vec![
            NewReview::new("a", Sentiment::Neutral, ts).into_review(1),
            NewReview::new("b", Sentiment::Neutral, ts).into_review(2),
            NewReview::new("c", Sentiment::Neutral, later).into_review(3),
        ];

        sort_newest_first(&mut reviews);
        let ids: Vec<i64> = reviews.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }
}
