pub mod config;
pub mod error;
pub mod freshness;
pub mod models;
pub mod pipeline;
pub mod scraping;
pub mod storage;
pub mod types;

pub use config::{Config, Provider};
pub use error::Error;
pub use freshness::{CacheDecision, FreshnessPolicy};
pub use models::TextAnalyzer;
pub use pipeline::Pipeline;
pub use scraping::{ArticleExtractor, PageFetcher};
pub use storage::ResultCache;
pub use types::{
    AnalysisRequest, AnalysisResult, CacheEntry, EntityAnnotation, ReadingDifficulty, Sentiment,
    TextAnalysis,
};

pub type Result<T> = std::result::Result<T, Error>;
