pub mod models;
pub mod prompt;

pub mod prelude {
    pub use super::models::create_analyzer;
    pub use super::models::anthropic::AnthropicAnalyzer;
    pub use super::models::openai::OpenAiAnalyzer;
    pub use super::models::unavailable::UnavailableAnalyzer;
    pub use tf_core::{Config, Error, Provider, Result, TextAnalysis, TextAnalyzer};
}

pub use models::create_analyzer;
