use async_trait::async_trait;
use crate::Result;

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Download the raw page body for a URL
    async fn fetch(&self, url: &str) -> Result<String>;
}

pub trait ArticleExtractor: Send + Sync {
    /// Reduce page markup to the article's plain text
    fn extract(&self, html: &str) -> Result<String>;
}
