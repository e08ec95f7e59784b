//! What every backend is asked, and how its answer is read back.

use serde_json::{json, Value};
use tf_core::types::MAX_ENTITIES;
use tf_core::{Error, Result, TextAnalysis};

/// Only this many characters of the article are sent. The rest is dropped.
pub const MAX_INPUT_CHARS: usize = 2000;

pub const TOOL_NAME: &str = "final_result";
pub const TOOL_DESCRIPTION: &str = "Record the structured analysis of the text.";

pub const SYSTEM_PROMPT: &str = "You are a text analysis expert. Analyze the provided text and extract:
1. Author name if mentioned in the text (optional)
2. The main topic/subject
3. A concise summary (2-3 sentences)
4. Reading difficulty (easy/medium/hard)
5. Estimated reading time in minutes (assume 200 words per minute)
6. Identify and analyze key entities mentioned in the text with their sentiment:
   - Entity types can include: person, company, country, city, organization, ticker_symbol, book, movie, song, album, brand, product, technology, programming_language, framework, tool, currency, cryptocurrency, event, concept, industry, university, government_agency, political_party
   - For each entity, provide: entity_type, entity (name), and sentiment (positive/negative/neutral)
   - Focus on the most significant entities (5-10 maximum)";

/// Longest prefix of `text` holding at most `max` characters.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub fn user_message(text: &str) -> String {
    format!("Analyze this text: {}...", truncate_chars(text, MAX_INPUT_CHARS))
}

/// JSON schema of the tool input; mirrors [`TextAnalysis`].
pub fn output_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "author": { "type": ["string", "null"] },
            "topic": { "type": "string" },
            "summary": { "type": "string" },
            "reading_difficulty": { "type": "string", "enum": ["easy", "medium", "hard"] },
            "estimated_reading_time_minutes": { "type": "integer", "minimum": 0 },
            "entities": {
                "type": "array",
                "maxItems": MAX_ENTITIES,
                "items": {
                    "type": "object",
                    "properties": {
                        "entity_type": { "type": "string" },
                        "entity": { "type": "string" },
                        "sentiment": { "type": "string", "enum": ["positive", "negative", "neutral"] }
                    },
                    "required": ["entity_type", "entity", "sentiment"]
                }
            }
        },
        "required": [
            "topic",
            "summary",
            "reading_difficulty",
            "estimated_reading_time_minutes",
            "entities"
        ]
    })
}

pub fn parse_output(value: Value) -> Result<TextAnalysis> {
    serde_json::from_value::<TextAnalysis>(value)
        .map_err(|e| Error::Inference(format!("malformed analysis: {}", e)))?
        .validate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tf_core::ReadingDifficulty;

    #[test]
    fn test_truncation_keeps_prefix() {
        // lossy on purpose: only the first MAX_INPUT_CHARS characters are analyzed
        let text = "a".repeat(MAX_INPUT_CHARS + 500);
        let message = user_message(&text);
        assert_eq!(message.len(), "Analyze this text: ".len() + MAX_INPUT_CHARS + 3);
        assert!(message.ends_with("a..."));
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        let text = "é".repeat(MAX_INPUT_CHARS + 1);
        let prefix = truncate_chars(&text, MAX_INPUT_CHARS);
        assert_eq!(prefix.chars().count(), MAX_INPUT_CHARS);
        assert_eq!(truncate_chars("short", MAX_INPUT_CHARS), "short");
    }

    #[test]
    fn test_parse_output() {
        let analysis = parse_output(json!({
            "author": "Jane Doe",
            "topic": "Compilers",
            "summary": "About compilers.",
            "reading_difficulty": "hard",
            "estimated_reading_time_minutes": 7,
            "entities": [
                { "entity_type": "person", "entity": "Grace Hopper", "sentiment": "positive" }
            ]
        }))
        .unwrap();

        assert_eq!(analysis.author.as_deref(), Some("Jane Doe"));
        assert_eq!(analysis.reading_difficulty, ReadingDifficulty::Hard);
        assert_eq!(analysis.entities[0].entity, "Grace Hopper");
    }

    #[test]
    fn test_parse_output_without_author() {
        let analysis = parse_output(json!({
            "topic": "t", "summary": "s", "reading_difficulty": "easy",
            "estimated_reading_time_minutes": 0, "entities": []
        }))
        .unwrap();
        assert!(analysis.author.is_none());
    }

    #[test]
    fn test_parse_output_rejects_bad_shapes() {
        assert!(parse_output(json!({ "topic": "t" })).is_err());
        assert!(parse_output(json!({
            "topic": "t", "summary": "s", "reading_difficulty": "trivial",
            "estimated_reading_time_minutes": 1, "entities": []
        }))
        .is_err());

        let entity = json!({ "entity_type": "person", "entity": "x", "sentiment": "neutral" });
        let too_many = vec![entity; MAX_ENTITIES + 1];
        assert!(parse_output(json!({
            "topic": "t", "summary": "s", "reading_difficulty": "easy",
            "estimated_reading_time_minutes": 1, "entities": too_many
        }))
        .is_err());
    }
}
