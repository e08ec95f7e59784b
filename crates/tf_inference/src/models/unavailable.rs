use tf_core::{Error, Result, TextAnalysis, TextAnalyzer};

/// Stands in when no credential is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableAnalyzer;

#[async_trait::async_trait]
impl TextAnalyzer for UnavailableAnalyzer {
    fn name(&self) -> &str {
        "none"
    }

    async fn analyze(&self, _text: &str) -> Result<TextAnalysis> {
        Err(Error::Inference(
            "no analysis provider configured, set ANTHROPIC_API_KEY or OPENAI_API_KEY".to_string(),
        ))
    }
}
