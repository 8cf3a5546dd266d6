//! In-memory knowledge base.
//!
//! [`StaticKnowledgeBase`] serves a fixed record set loaded from a
//! [`Fixture`]. Search ranks records by the share of query words they
//! contain, which is enough to drive the workflow offline and in tests.
//! Failures can be injected one call at a time with
//! [`fail_next`](StaticKnowledgeBase::fail_next).

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use vqs_core::{
    best_answer_text, AskResponse, PersistRequest, ProductFilter, SearchResponse, SourceNode,
    UpdateAck,
};

use crate::error::{Operation, RemoteError};
use crate::KnowledgeBase;

/// Source nodes returned by a search.
pub const SEARCH_TOP_K: usize = 7;
/// Source nodes consulted when answering a question.
pub const ASK_TOP_K: usize = 25;

// ──────────────────────────────────────────────
// Fixture format
// ──────────────────────────────────────────────

/// One stored question/answer record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureNode {
    pub node_id: String,
    #[serde(default)]
    pub document_name: String,
    pub product: String,
    pub question: String,
    pub answer: String,
    /// Improvement offered when this record tops a search.
    #[serde(default)]
    pub suggested_answer: Option<String>,
}

/// JSON document seeding a [`StaticKnowledgeBase`]:
/// `{"nodes": [{"node_id", "product", "question", "answer", ...}]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub nodes: Vec<FixtureNode>,
}

impl Fixture {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Read and parse a fixture file.
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("could not read fixture '{}': {}", path.display(), e))?;
        Fixture::from_json(&text)
            .map_err(|e| format!("could not parse fixture '{}': {}", path.display(), e))
    }
}

// ──────────────────────────────────────────────
// StaticKnowledgeBase
// ──────────────────────────────────────────────

#[derive(Debug, Default)]
struct State {
    nodes: Vec<FixtureNode>,
    pending_failures: Vec<Operation>,
    persisted: Vec<PersistRequest>,
}

/// [`KnowledgeBase`] over an in-memory record set.
#[derive(Debug, Default)]
pub struct StaticKnowledgeBase {
    state: Mutex<State>,
}

impl From<Fixture> for StaticKnowledgeBase {
    fn from(fixture: Fixture) -> Self {
        StaticKnowledgeBase::new(fixture.nodes)
    }
}

impl StaticKnowledgeBase {
    pub fn new(nodes: Vec<FixtureNode>) -> Self {
        StaticKnowledgeBase {
            state: Mutex::new(State {
                nodes,
                ..State::default()
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make the next call of `operation` fail with [`RemoteError::Rejected`].
    /// Injections queue up; each is consumed by one call.
    pub fn fail_next(&self, operation: Operation) {
        self.state().pending_failures.push(operation);
    }

    /// Every request applied by `persist_answer`, oldest first.
    pub fn persisted(&self) -> Vec<PersistRequest> {
        self.state().persisted.clone()
    }

    /// Current stored answer of a record.
    pub fn answer_of(&self, node_id: &str) -> Option<String> {
        self.state()
            .nodes
            .iter()
            .find(|n| n.node_id == node_id)
            .map(|n| n.answer.clone())
    }

    /// Distinct product names, sorted.
    pub fn products(&self) -> Vec<String> {
        let products: BTreeSet<String> =
            self.state().nodes.iter().map(|n| n.product.clone()).collect();
        products.into_iter().collect()
    }

    fn take_failure(&self, operation: Operation) -> Result<(), RemoteError> {
        let mut state = self.state();
        match state.pending_failures.iter().position(|op| *op == operation) {
            Some(idx) => {
                state.pending_failures.remove(idx);
                tracing::debug!(%operation, "injected failure");
                Err(RemoteError::Rejected {
                    operation,
                    message: "injected failure".to_string(),
                })
            }
            None => Ok(()),
        }
    }

    /// Matching records as scored source nodes, best first. Ties keep
    /// fixture order.
    fn rank(&self, query: &str, product: &ProductFilter, limit: usize) -> Vec<(SourceNode, Option<String>)> {
        let terms = words(query);
        if terms.is_empty() {
            return Vec::new();
        }
        let state = self.state();
        let mut ranked: Vec<(SourceNode, Option<String>)> = state
            .nodes
            .iter()
            .filter(|n| product.matches(&n.product))
            .filter_map(|n| {
                let text = words(&format!("{} {}", n.question, n.answer));
                let hits = terms.intersection(&text).count();
                if hits == 0 {
                    return None;
                }
                let node = SourceNode {
                    node_id: n.node_id.clone(),
                    document_name: n.document_name.clone(),
                    product: n.product.clone(),
                    question: n.question.clone(),
                    answer: n.answer.clone(),
                    score: hits as f64 / terms.len() as f64,
                };
                Some((node, n.suggested_answer.clone()))
            })
            .collect();
        ranked.sort_by(|(a, _), (b, _)| b.score.total_cmp(&a.score));
        ranked.truncate(limit);
        ranked
    }
}

impl KnowledgeBase for StaticKnowledgeBase {
    fn search(&self, query: &str, product: &ProductFilter) -> Result<SearchResponse, RemoteError> {
        self.take_failure(Operation::Search)?;
        let ranked = self.rank(query, product, SEARCH_TOP_K);
        let suggested_answer = ranked.first().and_then(|(_, suggested)| suggested.clone());
        Ok(SearchResponse {
            suggested_answer,
            source_nodes: ranked.into_iter().map(|(node, _)| node).collect(),
        })
    }

    fn ask(&self, query: &str) -> Result<AskResponse, RemoteError> {
        self.take_failure(Operation::Ask)?;
        let source_nodes: Vec<SourceNode> = self
            .rank(query, &ProductFilter::All, ASK_TOP_K)
            .into_iter()
            .map(|(node, _)| node)
            .collect();
        Ok(AskResponse {
            answer: best_answer_text(&source_nodes).to_string(),
            source_nodes,
        })
    }

    fn persist_answer(&self, request: &PersistRequest) -> Result<UpdateAck, RemoteError> {
        self.take_failure(Operation::Persist)?;
        let mut state = self.state();
        let node = state
            .nodes
            .iter_mut()
            .find(|n| n.node_id == request.node_id)
            .ok_or_else(|| RemoteError::NotFound {
                node_id: request.node_id.clone(),
            })?;
        node.answer = request.text.clone();
        state.persisted.push(request.clone());
        Ok(UpdateAck {
            node_id: request.node_id.clone(),
            updated_answer: request.text.clone(),
        })
    }
}

/// Lowercased alphanumeric words.
fn words(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, product: &str, question: &str, answer: &str) -> FixtureNode {
        FixtureNode {
            node_id: id.to_string(),
            document_name: format!("{product} questionnaire.xlsx"),
            product: product.to_string(),
            question: question.to_string(),
            answer: answer.to_string(),
            suggested_answer: None,
        }
    }

    fn kb() -> StaticKnowledgeBase {
        let mut encrypted = record(
            "n-1",
            "Product1",
            "Is customer data encrypted at rest?",
            "Yes, AES-256.",
        );
        encrypted.suggested_answer = Some("Yes. All customer data is encrypted at rest with AES-256.".to_string());
        StaticKnowledgeBase::new(vec![
            encrypted,
            record("n-2", "Product2", "Is data encrypted in transit?", "TLS 1.2+."),
            record("n-3", "Product1", "Do you perform background checks?", "Yes."),
        ])
    }

    #[test]
    fn search_ranks_by_word_overlap() {
        let response = kb().search("encrypted at rest", &ProductFilter::All).unwrap();
        let ids: Vec<&str> = response.source_nodes.iter().map(|n| n.node_id.as_str()).collect();
        assert_eq!(ids, vec!["n-1", "n-2"]);
        assert!(response.source_nodes[0].score > response.source_nodes[1].score);
        assert!(response.suggested_answer.unwrap().contains("AES-256"));
    }

    #[test]
    fn search_filters_by_product() {
        let response = kb()
            .search("encrypted", &ProductFilter::from("Product2"))
            .unwrap();
        assert_eq!(response.source_nodes.len(), 1);
        assert_eq!(response.source_nodes[0].node_id, "n-2");
        assert!(response.suggested_answer.is_none());
    }

    #[test]
    fn empty_query_finds_nothing() {
        let response = kb().search("  ", &ProductFilter::All).unwrap();
        assert!(response.source_nodes.is_empty());
    }

    #[test]
    fn ask_answers_from_best_node() {
        let response = kb().ask("background checks").unwrap();
        assert_eq!(response.answer, "Yes.");
        let response = kb().ask("zebra").unwrap();
        assert_eq!(response.answer, vqs_core::NO_ANSWER);
    }

    #[test]
    fn persist_updates_record() {
        let kb = kb();
        let request = PersistRequest {
            node_id: "n-3".to_string(),
            text: "Yes, annually.".to_string(),
        };
        let ack = kb.persist_answer(&request).unwrap();
        assert_eq!(ack.updated_answer, "Yes, annually.");
        assert_eq!(kb.answer_of("n-3").as_deref(), Some("Yes, annually."));
        assert_eq!(kb.persisted(), vec![request]);
    }

    #[test]
    fn persist_unknown_node_is_not_found() {
        let kb = kb();
        let err = kb
            .persist_answer(&PersistRequest {
                node_id: "missing".to_string(),
                text: "x".to_string(),
            })
            .unwrap_err();
        assert_eq!(
            err,
            RemoteError::NotFound {
                node_id: "missing".to_string()
            }
        );
        assert!(kb.persisted().is_empty());
    }

    #[test]
    fn injected_failure_is_one_shot() {
        let kb = kb();
        kb.fail_next(Operation::Persist);
        let request = PersistRequest {
            node_id: "n-1".to_string(),
            text: "No.".to_string(),
        };
        // Other operations are unaffected.
        assert!(kb.search("encrypted", &ProductFilter::All).is_ok());
        assert!(matches!(
            kb.persist_answer(&request),
            Err(RemoteError::Rejected {
                operation: Operation::Persist,
                ..
            })
        ));
        assert_eq!(kb.answer_of("n-1").as_deref(), Some("Yes, AES-256."));
        assert!(kb.persist_answer(&request).is_ok());
    }

    #[test]
    fn fixture_parses_and_lists_products() {
        let fixture = Fixture::from_json(
            r#"{"nodes": [
                {"node_id": "a", "product": "Product2", "question": "q", "answer": "a"},
                {"node_id": "b", "product": "Product1", "question": "q", "answer": "b",
                 "suggested_answer": "better"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(fixture.nodes[1].suggested_answer.as_deref(), Some("better"));
        let kb = StaticKnowledgeBase::from(fixture);
        assert_eq!(kb.products(), vec!["Product1", "Product2"]);
    }
}
