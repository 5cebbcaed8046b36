pub mod classifier;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod store;

pub use classifier::SentimentClassifier;
pub use config::{Config, Lexicon, StorageBackend, StorageConfig};
pub use error::{Error, Result};
pub use models::*;
pub use service::ReviewService;
pub use store::{JsonStore, MemoryStore, ReviewStore, SqliteStore};
