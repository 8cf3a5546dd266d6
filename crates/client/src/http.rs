//! JSON-over-HTTP client for the search backend.
//!
//! Every call is a `POST` with a JSON body:
//!
//! | call            | path      | body                          |
//! |-----------------|-----------|-------------------------------|
//! | search          | `/query`  | `{"query", "product"}`        |
//! | ask             | `/ask`    | `{"query"}`                   |
//! | persist_answer  | `/update` | `{"node_id", "answer"}`       |

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use vqs_core::{AskResponse, PersistRequest, ProductFilter, SearchResponse, UpdateAck};

use crate::config::ClientConfig;
use crate::error::{Operation, RemoteError};
use crate::KnowledgeBase;

// ─── Wire bodies ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct QueryBody<'a> {
    query: &'a str,
    product: &'a ProductFilter,
}

#[derive(Serialize)]
struct AskBody<'a> {
    query: &'a str,
}

#[derive(Serialize)]
struct UpdateBody<'a> {
    node_id: &'a str,
    answer: &'a str,
}

#[derive(Deserialize)]
struct UpdateResponse {
    #[serde(default)]
    message: Option<String>,
    result: UpdateAck,
}

// ─── HttpKnowledgeBase ────────────────────────────────────────────────────────

/// [`KnowledgeBase`] backed by the search service's HTTP API.
#[derive(Clone)]
pub struct HttpKnowledgeBase {
    config: ClientConfig,
    agent: ureq::Agent,
}

impl std::fmt::Debug for HttpKnowledgeBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpKnowledgeBase")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HttpKnowledgeBase {
    pub fn new(config: ClientConfig) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(config.timeout())
            .build()
            .into();
        HttpKnowledgeBase { config, agent }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        operation: Operation,
        path: &str,
        body: &B,
    ) -> Result<T, ureq::Error> {
        let url = self.config.url(path);
        tracing::debug!(%operation, %url, "knowledge base request");
        self.agent
            .post(&url)
            .send_json(body)?
            .into_body()
            .read_json::<T>()
    }
}

impl KnowledgeBase for HttpKnowledgeBase {
    fn search(&self, query: &str, product: &ProductFilter) -> Result<SearchResponse, RemoteError> {
        let operation = Operation::Search;
        let response: SearchResponse = self
            .post(operation, "/query", &QueryBody { query, product })
            .map_err(|e| classify_http_error(e, operation))?;
        tracing::debug!(
            nodes = response.source_nodes.len(),
            suggested = response.suggested_answer.is_some(),
            "search returned"
        );
        Ok(response)
    }

    fn ask(&self, query: &str) -> Result<AskResponse, RemoteError> {
        let operation = Operation::Ask;
        self.post(operation, "/ask", &AskBody { query })
            .map_err(|e| classify_http_error(e, operation))
    }

    fn persist_answer(&self, request: &PersistRequest) -> Result<UpdateAck, RemoteError> {
        let operation = Operation::Persist;
        let body = UpdateBody {
            node_id: &request.node_id,
            answer: &request.text,
        };
        let response: UpdateResponse = self
            .post(operation, "/update", &body)
            .map_err(|e| match e {
                ureq::Error::StatusCode(404) => {
                    tracing::warn!(node_id = %request.node_id, "update target not found");
                    RemoteError::NotFound {
                        node_id: request.node_id.clone(),
                    }
                }
                other => classify_http_error(other, operation),
            })?;
        if let Some(message) = &response.message {
            tracing::info!(node_id = %response.result.node_id, "{message}");
        }
        Ok(response.result)
    }
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn classify_http_error(err: ureq::Error, operation: Operation) -> RemoteError {
    let remote = match err {
        ureq::Error::StatusCode(status) => RemoteError::Status { operation, status },
        ureq::Error::Json(e) => RemoteError::Decode {
            operation,
            message: e.to_string(),
        },
        other => RemoteError::Transport {
            operation,
            message: other.to_string(),
        },
    };
    tracing::warn!(error = %remote, "knowledge base call failed");
    remote
}
