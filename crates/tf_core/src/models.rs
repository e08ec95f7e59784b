use async_trait::async_trait;
use crate::types::TextAnalysis;
use crate::Result;

#[async_trait]
pub trait TextAnalyzer: Send + Sync {
    /// Short backend name used in logs
    fn name(&self) -> &str;

    /// Annotate article text. Any error means analysis is unavailable.
    async fn analyze(&self, text: &str) -> Result<TextAnalysis>;
}
