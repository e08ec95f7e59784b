use std::fmt;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tf_core::{Error, Result, TextAnalysis, TextAnalyzer};

use crate::prompt::{self, SYSTEM_PROMPT, TOOL_DESCRIPTION, TOOL_NAME};

pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct Tool<'a> {
    name: &'a str,
    description: &'a str,
    input_schema: Value,
}

#[derive(Serialize)]
struct ToolChoice<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    name: &'a str,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<ChatMessage>,
    tools: Vec<Tool<'a>>,
    tool_choice: ToolChoice<'a>,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    ToolUse { name: String, input: Value },
    #[serde(other)]
    Other,
}

pub struct AnthropicAnalyzer {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl fmt::Debug for AnthropicAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnthropicAnalyzer")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl AnthropicAnalyzer {
    pub fn new(api_key: String, model: String, timeout: Option<Duration>) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::Inference("Anthropic API key is required".to_string()));
        }
        Ok(Self {
            client: super::build_client(timeout)?,
            api_key,
            model,
            base_url: ANTHROPIC_API_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn request<'a>(&'a self, text: &str) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            system: SYSTEM_PROMPT,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt::user_message(text),
            }],
            tools: vec![Tool {
                name: TOOL_NAME,
                description: TOOL_DESCRIPTION,
                input_schema: prompt::output_schema(),
            }],
            tool_choice: ToolChoice {
                kind: "tool",
                name: TOOL_NAME,
            },
        }
    }
}

fn tool_input(response: MessagesResponse) -> Result<Value> {
    response
        .content
        .into_iter()
        .find_map(|block| match block {
            ContentBlock::ToolUse { name, input } if name == TOOL_NAME => Some(input),
            _ => None,
        })
        .ok_or_else(|| Error::Inference("Anthropic response had no analysis tool call".to_string()))
}

#[async_trait::async_trait]
impl TextAnalyzer for AnthropicAnalyzer {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn analyze(&self, text: &str) -> Result<TextAnalysis> {
        if text.trim().is_empty() {
            return Err(Error::Inference("nothing to analyze".to_string()));
        }

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&self.request(text))
            .send()
            .await?
            .error_for_status()?
            .json::<MessagesResponse>()
            .await?;

        let analysis = prompt::parse_output(tool_input(response)?)?;
        tracing::debug!("Anthropic analysis topic: {}", analysis.topic);
        Ok(analysis)
    }
}
