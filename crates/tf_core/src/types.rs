use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Upper bound on the number of entities an analysis may carry.
pub const MAX_ENTITIES: usize = 10;

/// One inbound "what is this article about?" call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub url: String,
    pub verbose: bool,
}

impl AnalysisRequest {
    pub fn new(url: impl Into<String>, verbose: bool) -> Self {
        Self {
            url: url.into(),
            verbose,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingDifficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityAnnotation {
    pub entity: String,
    pub entity_type: String,
    pub sentiment: Sentiment,
}

/// Structured annotation produced by an analysis backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextAnalysis {
    pub author: Option<String>,
    pub topic: String,
    pub summary: String,
    pub reading_difficulty: ReadingDifficulty,
    pub estimated_reading_time_minutes: u32,
    pub entities: Vec<EntityAnnotation>,
}

impl TextAnalysis {
    /// Rejects analyses that don't fit the published shape.
    pub fn validate(self) -> Result<Self> {
        if self.entities.len() > MAX_ENTITIES {
            return Err(Error::Inference(format!(
                "analysis returned {} entities, at most {} are allowed",
                self.entities.len(),
                MAX_ENTITIES
            )));
        }
        Ok(self)
    }
}

/// The envelope returned to callers and persisted in the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub url: String,
    pub success: bool,
    pub error: Option<String>,
    pub extracted_text: Option<String>,
    pub analysis: Option<TextAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
}

impl AnalysisResult {
    /// A fresh, not-yet-successful result for `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            success: false,
            error: None,
            extracted_text: None,
            analysis: None,
            updated: None,
        }
    }

    pub fn failed(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new(url)
        }
    }
}

/// A persisted `{url, result, updated}` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub url: String,
    pub result: Option<String>,
    pub updated: Option<String>,
}

impl CacheEntry {
    pub fn new(url: impl Into<String>, result: impl Into<String>, updated: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            result: Some(result.into()),
            updated: Some(updated.into()),
        }
    }

    /// Serializes `result` into an entry stamped with `updated`.
    pub fn from_result(result: &AnalysisResult, updated: &str) -> Result<Self> {
        let json = serde_json::to_string(result)?;
        Ok(Self::new(result.url.clone(), json, updated))
    }

    /// The stored JSON, if there is any.
    pub fn stored_result(&self) -> Option<&str> {
        self.result.as_deref().filter(|r| !r.trim().is_empty())
    }
}

/// ISO-8601 rendering used for every `updated` stamp.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, false)
}
