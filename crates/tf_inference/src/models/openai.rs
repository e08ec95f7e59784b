use std::fmt;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tf_core::{Error, Result, TextAnalysis, TextAnalyzer};

use crate::prompt::{self, SYSTEM_PROMPT, TOOL_DESCRIPTION, TOOL_NAME};

pub const OPENAI_API_URL: &str = "https://api.openai.com";

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    tools: Vec<Value>,
    tool_choice: Value,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Deserialize)]
struct ToolCall {
    function: FunctionCall,
}

#[derive(Deserialize)]
struct FunctionCall {
    name: String,
    arguments: String,
}

pub struct OpenAiAnalyzer {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl fmt::Debug for OpenAiAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiAnalyzer")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl OpenAiAnalyzer {
    pub fn new(api_key: String, model: String, timeout: Option<Duration>) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::Inference("OpenAI API key is required".to_string()));
        }
        Ok(Self {
            client: super::build_client(timeout)?,
            api_key,
            model,
            base_url: OPENAI_API_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn request<'a>(&'a self, text: &str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt::user_message(text),
                },
            ],
            tools: vec![json!({
                "type": "function",
                "function": {
                    "name": TOOL_NAME,
                    "description": TOOL_DESCRIPTION,
                    "parameters": prompt::output_schema(),
                }
            })],
            tool_choice: json!({ "type": "function", "function": { "name": TOOL_NAME } }),
        }
    }
}

fn tool_arguments(response: ChatResponse) -> Result<Value> {
    let call = response
        .choices
        .into_iter()
        .flat_map(|choice| choice.message.tool_calls.unwrap_or_default())
        .find(|call| call.function.name == TOOL_NAME)
        .ok_or_else(|| Error::Inference("OpenAI response had no analysis tool call".to_string()))?;
    Ok(serde_json::from_str(&call.function.arguments)?)
}

#[async_trait::async_trait]
impl TextAnalyzer for OpenAiAnalyzer {
    fn name(&self) -> &str {
        "openai"
    }

    async fn analyze(&self, text: &str) -> Result<TextAnalysis> {
        if text.trim().is_empty() {
            return Err(Error::Inference("nothing to analyze".to_string()));
        }

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&self.request(text))
            .send()
            .await?
            .error_for_status()?
            .json::<ChatResponse>()
            .await?;

        let analysis = prompt::parse_output(tool_arguments(response)?)?;
        tracing::debug!("OpenAI analysis topic: {}", analysis.topic);
        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let analyzer = OpenAiAnalyzer::new("key".to_string(), "gpt-4o-mini".to_string(), None).unwrap();
        let body = serde_json::to_value(analyzer.request("Hello world")).unwrap();

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Analyze this text: Hello world...");
        assert_eq!(body["tool_choice"]["function"]["name"], TOOL_NAME);
        assert_eq!(body["tools"][0]["function"]["parameters"]["type"], "object");
    }

    #[test]
    fn test_tool_arguments_are_decoded() {
        let response: ChatResponse = serde_json::from_value(json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": { "name": TOOL_NAME, "arguments": "{\"topic\":\"x\"}" }
                    }]
                }
            }]
        }))
        .unwrap();
        assert_eq!(tool_arguments(response).unwrap()["topic"], "x");
    }

    #[test]
    fn test_missing_or_garbled_tool_call_is_error() {
        let plain: ChatResponse =
            serde_json::from_value(json!({ "choices": [{ "message": { "content": "hi", "tool_calls": null } }] })).unwrap();
        assert!(tool_arguments(plain).is_err());

        let garbled: ChatResponse = serde_json::from_value(json!({
            "choices": [{ "message": { "tool_calls": [
                { "function": { "name": TOOL_NAME, "arguments": "{not json" } }
            ] } }]
        }))
        .unwrap();
        assert!(tool_arguments(garbled).is_err());
    }
}
