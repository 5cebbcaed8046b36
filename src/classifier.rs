use regex::Regex;
use tracing::debug;

use crate::config::{Config, Lexicon};
use crate::models::Sentiment;

/// Sentiments checked in this order; the first match wins, so negative
/// signals always outrank positive ones in the same text.
const PRECEDENCE: [Sentiment; 2] = [Sentiment::Negative, Sentiment::Positive];

/// Deterministic stem-matching sentiment classifier
#[derive(Debug, Clone)]
pub struct SentimentClassifier {
    rules: Vec<StemRule>,
}

#[derive(Debug, Clone)]
struct StemRule {
    sentiment: Sentiment,
    pattern: Regex,
}

impl SentimentClassifier {
    pub fn new(lexicon: &Lexicon) -> Result<Self, regex::Error> {
        let mut rules = Vec::new();

        for sentiment in PRECEDENCE {
            if let Some(pattern) = compile_stems(lexicon.stems(sentiment))? {
                rules.push(StemRule { sentiment, pattern });
            }
        }

        Ok(Self { rules })
    }

    pub fn from_config(config: &Config) -> Result<Self, regex::Error> {
        Self::new(&config.lexicon)
    }

    /// Label a text. Text without any stem match is neutral.
    pub fn classify(&self, text: &str) -> Sentiment {
        let normalized = text.to_lowercase();

        for rule in &self.rules {
            if rule.pattern.is_match(&normalized) {
                debug!(sentiment = %rule.sentiment, "Stem matched");
                return rule.sentiment;
            }
        }

        Sentiment::Neutral
    }
}

/// Build `\b(?:stem1|stem2|...)`, or nothing when there are no usable stems
fn compile_stems(stems: &[String]) -> Result<Option<Regex>, regex::Error> {
    let alternatives: Vec<String> = stems
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .map(|s| regex::escape(&s))
        .collect();

    if alternatives.is_empty() {
        return Ok(None);
    }

    Regex::new(&format!(r"\b(?:{})", alternatives.join("|"))).map(Some)
}
