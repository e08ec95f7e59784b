use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tf_core::{Config, Provider, Result, TextAnalyzer};

pub mod anthropic;
pub mod openai;
pub mod unavailable;

use anthropic::AnthropicAnalyzer;
use openai::OpenAiAnalyzer;
use unavailable::UnavailableAnalyzer;

/// Builds the analyzer for an already-resolved provider.
pub fn create_analyzer(provider: &Provider, config: &Config) -> Result<Arc<dyn TextAnalyzer>> {
    let analyzer: Arc<dyn TextAnalyzer> = match provider {
        Provider::Anthropic { api_key, model } => Arc::new(AnthropicAnalyzer::new(
            api_key.clone(),
            model.clone(),
            config.analysis_timeout,
        )?),
        Provider::OpenAi { api_key, model } => Arc::new(OpenAiAnalyzer::new(
            api_key.clone(),
            model.clone(),
            config.analysis_timeout,
        )?),
        Provider::None => Arc::new(UnavailableAnalyzer),
    };
    tracing::debug!("Analysis backend: {}", analyzer.name());
    Ok(analyzer)
}

pub(crate) fn build_client(timeout: Option<Duration>) -> Result<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}
