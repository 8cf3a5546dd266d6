//! Knowledge-base records exchanged with the search backend.
//!
//! These mirror the backend's JSON payloads field for field (snake_case),
//! so they deserialize straight off the wire.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ──────────────────────────────────────────────
// Source nodes and responses
// ──────────────────────────────────────────────

/// A candidate question/answer record returned by a search, with its
/// relevance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceNode {
    pub node_id: String,
    pub document_name: String,
    pub product: String,
    pub question: String,
    pub answer: String,
    pub score: f64,
}

/// Response to a product-filtered search.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    /// AI-proposed improvement of the top answer, when the backend produced one.
    #[serde(default)]
    pub suggested_answer: Option<String>,
    #[serde(default)]
    pub source_nodes: Vec<SourceNode>,
}

/// Response to a free-form question answered over the whole knowledge base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    #[serde(default)]
    pub source_nodes: Vec<SourceNode>,
}

// ──────────────────────────────────────────────
// Persistence
// ──────────────────────────────────────────────

/// Request to overwrite the answer stored for `node_id`.
///
/// Produced by [`WorkflowSnapshot::commit_update`](crate::WorkflowSnapshot::commit_update)
/// and executed by whatever collaborator owns the knowledge base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistRequest {
    pub node_id: String,
    pub text: String,
}

/// Acknowledgement returned once an answer has been persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateAck {
    pub node_id: String,
    pub updated_answer: String,
}

// ──────────────────────────────────────────────
// ProductFilter
// ──────────────────────────────────────────────

/// Restricts a search to one product line, or searches all of them.
///
/// Written as the product name on the wire; `"All"` (any case) means no
/// filtering.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProductFilter {
    #[default]
    All,
    Product(String),
}

impl ProductFilter {
    pub const ALL: &'static str = "All";

    pub fn as_str(&self) -> &str {
        match self {
            ProductFilter::All => Self::ALL,
            ProductFilter::Product(name) => name,
        }
    }

    /// Returns true if a node tagged with `product` passes this filter.
    pub fn matches(&self, product: &str) -> bool {
        match self {
            ProductFilter::All => true,
            ProductFilter::Product(name) => name == product,
        }
    }
}

impl From<&str> for ProductFilter {
    fn from(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(Self::ALL) {
            ProductFilter::All
        } else {
            ProductFilter::Product(trimmed.to_string())
        }
    }
}

impl FromStr for ProductFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ProductFilter::from(s))
    }
}

impl fmt::Display for ProductFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ProductFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProductFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(ProductFilter::from(raw.as_str()))
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_filter_all_is_case_insensitive() {
        assert_eq!(ProductFilter::from("All"), ProductFilter::All);
        assert_eq!(ProductFilter::from("all"), ProductFilter::All);
        assert_eq!(ProductFilter::from("  ALL "), ProductFilter::All);
        assert_eq!(ProductFilter::from(""), ProductFilter::All);
    }

    #[test]
    fn product_filter_named() {
        let filter = ProductFilter::from("Product1");
        assert_eq!(filter, ProductFilter::Product("Product1".to_string()));
        assert!(filter.matches("Product1"));
        assert!(!filter.matches("Product2"));
        assert!(ProductFilter::All.matches("anything"));
    }

    #[test]
    fn product_filter_serializes_as_name() {
        let json = serde_json::to_value(ProductFilter::All).unwrap();
        assert_eq!(json, serde_json::json!("All"));
        let json = serde_json::to_value(ProductFilter::from("Product2")).unwrap();
        assert_eq!(json, serde_json::json!("Product2"));
        let back: ProductFilter = serde_json::from_value(serde_json::json!("all")).unwrap();
        assert_eq!(back, ProductFilter::All);
    }

    #[test]
    fn search_response_from_backend_json() {
        let json = serde_json::json!({
            "suggested_answer": null,
            "source_nodes": [{
                "node_id": "n-1",
                "document_name": "SIG Lite 2024",
                "question": "Do you encrypt data at rest?",
                "answer": "Yes, AES-256.",
                "product": "Product1",
                "score": 0.82
            }]
        });
        let response: SearchResponse = serde_json::from_value(json).unwrap();
        assert!(response.suggested_answer.is_none());
        assert_eq!(response.source_nodes.len(), 1);
        assert_eq!(response.source_nodes[0].node_id, "n-1");
        assert!((response.source_nodes[0].score - 0.82).abs() < f64::EPSILON);
    }

    #[test]
    fn search_response_missing_suggestion_defaults_to_none() {
        let response: SearchResponse =
            serde_json::from_value(serde_json::json!({"source_nodes": []})).unwrap();
        assert_eq!(response, SearchResponse::default());
    }
}
