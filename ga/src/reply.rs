//! Structured reply decoding
//!
//! The model answers every turn with a JSON object whose `type` field picks
//! one of two shapes: a final `result` or a `query` asking for another
//! product search.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Per-dimension sustainability scores, nominally 1-5
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SustainabilityRating {
    pub material: f64,
    pub production: f64,
    pub shipping: f64,
    pub disposability: f64,
}

impl SustainabilityRating {
    pub const MIN: f64 = 1.0;
    pub const MAX: f64 = 5.0;

    /// Mean of the four scores
    pub fn overall(&self) -> f64 {
        (self.material + self.production + self.shipping + self.disposability) / 4.0
    }

    /// Whether every score lies within 1..=5
    pub fn is_nominal(&self) -> bool {
        [self.material, self.production, self.shipping, self.disposability]
            .iter()
            .all(|s| (Self::MIN..=Self::MAX).contains(s))
    }
}

/// Suggested replacement product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sustainability_rating: Option<SustainabilityRating>,
}

/// Final answer for a product
///
/// `new_product` is absent when the original is already the most
/// sustainable reasonable choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SustainResult {
    pub original_sustainability_rating: SustainabilityRating,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_product: Option<NewProduct>,
}

/// A decoded model reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StructuredReply {
    Result(SustainResult),
    Query { query: String },
}

/// Reasons a reply could not be decoded
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("reply is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("reply is not a JSON object")]
    NotAnObject,

    #[error("reply has no \"type\" field")]
    MissingDiscriminant,

    #[error("reply has unknown type {0:?}")]
    UnknownDiscriminant(String),

    #[error("reply does not match the {kind} shape: {source}")]
    Shape {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("query reply has an empty query")]
    EmptyQuery,
}

/// Decode a raw completion into a [`StructuredReply`]
pub fn decode(raw: &str) -> Result<StructuredReply, ParseError> {
    debug!(raw_len = raw.len(), "decode: called");
    let value: Value = serde_json::from_str(strip_code_fence(raw)).map_err(ParseError::InvalidJson)?;

    let Value::Object(fields) = &value else {
        return Err(ParseError::NotAnObject);
    };

    let kind = match fields.get("type") {
        None | Some(Value::Null) => return Err(ParseError::MissingDiscriminant),
        Some(Value::String(s)) if s == "result" => "result",
        Some(Value::String(s)) if s == "query" => "query",
        Some(Value::String(s)) => return Err(ParseError::UnknownDiscriminant(s.clone())),
        Some(other) => return Err(ParseError::UnknownDiscriminant(other.to_string())),
    };

    let reply: StructuredReply =
        serde_json::from_value(value).map_err(|source| ParseError::Shape { kind, source })?;

    match &reply {
        StructuredReply::Query { query } if query.trim().is_empty() => Err(ParseError::EmptyQuery),
        StructuredReply::Query { query } => {
            debug!(%query, "decode: query reply");
            Ok(reply)
        }
        StructuredReply::Result(result) => {
            if !result.original_sustainability_rating.is_nominal() {
                warn!(rating = ?result.original_sustainability_rating, "Rating outside 1-5 range");
            }
            debug!(has_new_product = result.new_product.is_some(), "decode: result reply");
            Ok(reply)
        }
    }
}

/// Drop a surrounding Markdown code fence, if the model added one
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    // Optional language tag, with or without a line break before the JSON
    inner.trim_start().trim_start_matches(|c: char| c.is_ascii_alphabetic()).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULT: &str = r#"{
        "type": "result",
        "originalSustainabilityRating": {"material": 2, "production": 2.5, "shipping": 3, "disposability": 1},
        "newProduct": {
            "id": "B09XYZ1234",
            "sustainabilityRating": {"material": 4, "production": 4, "shipping": 3, "disposability": 4}
        }
    }"#;

    #[test]
    fn test_decode_result() {
        let reply = decode(RESULT).unwrap();
        let StructuredReply::Result(result) = reply else {
            panic!("expected result");
        };

        assert_eq!(result.original_sustainability_rating.production, 2.5);
        let new_product = result.new_product.unwrap();
        assert_eq!(new_product.id, "B09XYZ1234");
        assert_eq!(new_product.sustainability_rating.unwrap().overall(), 3.75);
    }

    #[test]
    fn test_decode_result_without_new_product() {
        let raw = r#"{"type":"result","originalSustainabilityRating":{"material":5,"production":5,"shipping":4,"disposability":5}}"#;
        let StructuredReply::Result(result) = decode(raw).unwrap() else {
            panic!("expected result");
        };
        assert!(result.new_product.is_none());
    }

    #[test]
    fn test_decode_query() {
        let reply = decode(r#"{"type":"query","query":"bamboo cordless drill"}"#).unwrap();
        assert_eq!(
            reply,
            StructuredReply::Query {
                query: "bamboo cordless drill".to_string()
            }
        );
    }

    #[test]
    fn test_result_survives_reencoding() {
        let reply = decode(RESULT).unwrap();
        let encoded = serde_json::to_string(&reply).unwrap();
        assert!(encoded.contains("\"type\":\"result\""));
        assert_eq!(decode(&encoded).unwrap(), reply);
    }

    #[test]
    fn test_missing_discriminant() {
        let err = decode(r#"{"query":"x"}"#).unwrap_err();
        assert!(matches!(err, ParseError::MissingDiscriminant));
    }

    #[test]
    fn test_unknown_discriminant() {
        let err = decode(r#"{"type":"answer","query":"x"}"#).unwrap_err();
        assert!(matches!(err, ParseError::UnknownDiscriminant(t) if t == "answer"));

        let err = decode(r#"{"type":3}"#).unwrap_err();
        assert!(matches!(err, ParseError::UnknownDiscriminant(_)));
    }

    #[test]
    fn test_result_requires_original_rating() {
        let err = decode(r#"{"type":"result","newProduct":{"id":"B0"}}"#).unwrap_err();
        assert!(matches!(err, ParseError::Shape { kind: "result", .. }));
    }

    #[test]
    fn test_result_rating_needs_all_fields() {
        let err = decode(r#"{"type":"result","originalSustainabilityRating":{"material":3}}"#).unwrap_err();
        assert!(matches!(err, ParseError::Shape { .. }));
    }

    #[test]
    fn test_query_requires_non_empty_query() {
        assert!(matches!(decode(r#"{"type":"query"}"#), Err(ParseError::Shape { kind: "query", .. })));
        assert!(matches!(decode(r#"{"type":"query","query":"  "}"#), Err(ParseError::EmptyQuery)));
        assert!(matches!(decode(r#"{"type":"query","query":7}"#), Err(ParseError::Shape { .. })));
    }

    #[test]
    fn test_not_json_or_not_object() {
        assert!(matches!(decode("sure, here you go"), Err(ParseError::InvalidJson(_))));
        assert!(matches!(decode("[1,2]"), Err(ParseError::NotAnObject)));
    }

    #[test]
    fn test_code_fence_is_tolerated() {
        let raw = "```json\n{\"type\":\"query\",\"query\":\"hemp rope\"}\n```";
        assert!(matches!(decode(raw), Ok(StructuredReply::Query { .. })));

        let raw = "```{\"type\":\"query\",\"query\":\"hemp rope\"}```";
        assert!(matches!(decode(raw), Ok(StructuredReply::Query { .. })));

        let raw = "```json{\"type\":\"query\",\"query\":\"hemp rope\"}```";
        assert!(matches!(decode(raw), Ok(StructuredReply::Query { .. })));

        let raw = "```JSON {\"type\":\"query\",\"query\":\"hemp rope\"}\n```";
        assert!(matches!(decode(raw), Ok(StructuredReply::Query { .. })));
    }

    #[test]
    fn test_rating_helpers() {
        let rating = SustainabilityRating {
            material: 1.0,
            production: 2.0,
            shipping: 3.0,
            disposability: 6.0,
        };
        assert_eq!(rating.overall(), 3.0);
        assert!(!rating.is_nominal());
    }
}
