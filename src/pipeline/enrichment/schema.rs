//! The structured payload the model must return, and its JSON schema.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Structured facts extracted from one paper.
///
/// `deny_unknown_fields` mirrors the schema's `additionalProperties: false`;
/// a response with extra keys is rejected rather than silently accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaperInfo {
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub method: String,
    pub objectives: String,
    pub categories: Vec<String>,
    pub summary: String,
}

/// JSON schema enforced on the model response via structured outputs.
/// Every field is required; unknown fields are forbidden.
pub fn response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "title": {
                "type": "string",
                "description": "The full title of the paper"
            },
            "abstract": {
                "type": "string",
                "description": "The abstract of the paper"
            },
            "method": {
                "type": "string",
                "description": "The methodology used in the paper"
            },
            "objectives": {
                "type": "string",
                "description": "The objectives of the study"
            },
            "categories": {
                "type": "array",
                "items": { "type": "string" },
                "description": "Research categories or keywords"
            },
            "summary": {
                "type": "string",
                "description": "A concise summary of the paper"
            }
        },
        "required": ["title", "abstract", "method", "objectives", "categories", "summary"],
        "additionalProperties": false
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_complete_payload() {
        let payload = r#"{
            "title": "Attention Is All You Need",
            "abstract": "We propose the Transformer.",
            "method": "Self-attention architecture",
            "objectives": "Replace recurrence with attention",
            "categories": ["deep learning", "NLP"],
            "summary": "Introduces the Transformer architecture."
        }"#;
        let info: PaperInfo = serde_json::from_str(payload).unwrap();
        assert_eq!(info.title, "Attention Is All You Need");
        assert_eq!(info.categories.len(), 2);
    }

    #[test]
    fn missing_field_is_rejected() {
        let payload = r#"{"title": "t", "abstract": "a"}"#;
        assert!(serde_json::from_str::<PaperInfo>(payload).is_err());
    }

    #[test]
    fn unknown_field_is_rejected() {
        let payload = r#"{
            "title": "t", "abstract": "a", "method": "m",
            "objectives": "o", "categories": [], "summary": "s",
            "confidence": 0.9
        }"#;
        assert!(serde_json::from_str::<PaperInfo>(payload).is_err());
    }

    #[test]
    fn schema_requires_all_six_fields() {
        let schema = response_schema();
        let required = schema["required"].as_array().unwrap();
        assert_eq!(required.len(), 6);
        assert_eq!(schema["additionalProperties"], json!(false));
    }
}
