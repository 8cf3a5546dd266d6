//! Integration tests for `HttpKnowledgeBase` against an in-process mock of
//! the search backend.
//!
//! Each test binds an axum router to an ephemeral port on a background
//! tokio runtime, then drives the blocking client from the test thread.

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use vqs_client::{ClientConfig, HttpKnowledgeBase, KnowledgeBase, Operation, RemoteError};
use vqs_core::{PersistRequest, ProductFilter};

type Requests = Arc<Mutex<Vec<(String, Value)>>>;

// ─── Mock backend ─────────────────────────────────────────────────────────────

struct MockBackend {
    endpoint: String,
    requests: Requests,
    _runtime: tokio::runtime::Runtime,
}

impl MockBackend {
    fn start(router: Router<Requests>) -> Self {
        let requests: Requests = Arc::new(Mutex::new(Vec::new()));
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .expect("tokio runtime");
        let listener = runtime
            .block_on(tokio::net::TcpListener::bind("127.0.0.1:0"))
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("local addr");
        let app = router.with_state(requests.clone());
        runtime.spawn(async move {
            axum::serve(listener, app).await.expect("mock backend");
        });
        MockBackend {
            endpoint: format!("http://{addr}/"),
            requests,
            _runtime: runtime,
        }
    }

    fn client(&self) -> HttpKnowledgeBase {
        HttpKnowledgeBase::new(ClientConfig::new(&self.endpoint).with_timeout_secs(Some(10)))
    }

    fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().expect("requests lock").clone()
    }
}

fn record(requests: &Requests, path: &str, body: &Value) {
    requests
        .lock()
        .expect("requests lock")
        .push((path.to_string(), body.clone()));
}

// ─── Handlers ─────────────────────────────────────────────────────────────────

async fn handle_query(State(requests): State<Requests>, Json(body): Json<Value>) -> impl IntoResponse {
    record(&requests, "/query", &body);
    if body["product"] == "Product2" {
        return Json(json!({ "suggested_answer": null, "source_nodes": [] }));
    }
    Json(json!({
        "suggested_answer": "Yes. All customer data is encrypted at rest using AES-256.",
        "source_nodes": [
            {
                "node_id": "n-1",
                "document_name": "SIG Lite 2024.xlsx",
                "product": "Product1",
                "question": "Is customer data encrypted at rest?",
                "answer": "Yes, AES-256.",
                "score": 0.91
            },
            {
                "node_id": "n-2",
                "document_name": "CAIQ v4.xlsx",
                "product": "Product1",
                "question": "Describe your encryption key management.",
                "answer": "Keys are rotated yearly.",
                "score": 0.62
            }
        ]
    }))
}

async fn handle_ask(State(requests): State<Requests>, Json(body): Json<Value>) -> impl IntoResponse {
    record(&requests, "/ask", &body);
    Json(json!({
        "answer": "Background checks are performed for all employees.",
        "source_nodes": []
    }))
}

async fn handle_update(State(requests): State<Requests>, Json(body): Json<Value>) -> impl IntoResponse {
    record(&requests, "/update", &body);
    let node_id = body["node_id"].as_str().unwrap_or_default().to_string();
    if node_id == "missing" {
        let detail = format!("Point with node_id {node_id} not found");
        return (StatusCode::NOT_FOUND, Json(json!({ "detail": detail })));
    }
    let answer = body["answer"].clone();
    (
        StatusCode::OK,
        Json(json!({
            "message": "Document updated successfully",
            "result": { "node_id": node_id, "updated_answer": answer }
        })),
    )
}

async fn handle_server_error() -> impl IntoResponse {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "detail": "service temporarily unavailable" })),
    )
}

async fn handle_not_json() -> impl IntoResponse {
    (StatusCode::OK, "<html>maintenance</html>")
}

fn backend() -> Router<Requests> {
    Router::new()
        .route("/query", post(handle_query))
        .route("/ask", post(handle_ask))
        .route("/update", post(handle_update))
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn search_posts_query_and_product() {
    let mock = MockBackend::start(backend());
    let response = mock
        .client()
        .search("encryption at rest", &ProductFilter::from("Product1"))
        .expect("search");

    assert_eq!(response.source_nodes.len(), 2);
    assert_eq!(response.source_nodes[0].node_id, "n-1");
    assert!(response.suggested_answer.is_some());
    assert_eq!(
        mock.requests(),
        vec![(
            "/query".to_string(),
            json!({ "query": "encryption at rest", "product": "Product1" })
        )]
    );
}

#[test]
fn search_all_products_sends_all() {
    let mock = MockBackend::start(backend());
    mock.client().search("q", &ProductFilter::All).expect("search");
    assert_eq!(mock.requests()[0].1["product"], "All");
}

#[test]
fn search_without_results() {
    let mock = MockBackend::start(backend());
    let response = mock
        .client()
        .search("anything", &ProductFilter::from("Product2"))
        .expect("search");
    assert!(response.source_nodes.is_empty());
    assert!(response.suggested_answer.is_none());
}

#[test]
fn ask_posts_query_only() {
    let mock = MockBackend::start(backend());
    let response = mock.client().ask("Do you run background checks?").expect("ask");
    assert_eq!(
        response.answer,
        "Background checks are performed for all employees."
    );
    assert_eq!(
        mock.requests(),
        vec![(
            "/ask".to_string(),
            json!({ "query": "Do you run background checks?" })
        )]
    );
}

#[test]
fn persist_sends_answer_and_returns_ack() {
    let mock = MockBackend::start(backend());
    let ack = mock
        .client()
        .persist_answer(&PersistRequest {
            node_id: "n-1".to_string(),
            text: "Yes, AES-256-GCM.".to_string(),
        })
        .expect("persist");
    assert_eq!(ack.node_id, "n-1");
    assert_eq!(ack.updated_answer, "Yes, AES-256-GCM.");
    assert_eq!(
        mock.requests()[0].1,
        json!({ "node_id": "n-1", "answer": "Yes, AES-256-GCM." })
    );
}

#[test]
fn persist_missing_node_is_not_found() {
    let mock = MockBackend::start(backend());
    let err = mock
        .client()
        .persist_answer(&PersistRequest {
            node_id: "missing".to_string(),
            text: "x".to_string(),
        })
        .expect_err("404 must fail");
    assert_eq!(
        err,
        RemoteError::NotFound {
            node_id: "missing".to_string()
        }
    );
}

#[test]
fn server_error_maps_to_status() {
    let mock = MockBackend::start(Router::new().route("/ask", post(handle_server_error)));
    let err = mock.client().ask("q").expect_err("500 must fail");
    assert_eq!(
        err,
        RemoteError::Status {
            operation: Operation::Ask,
            status: 500
        }
    );
}

#[test]
fn non_json_body_maps_to_decode() {
    let mock = MockBackend::start(Router::new().route("/query", post(handle_not_json)));
    let err = mock
        .client()
        .search("q", &ProductFilter::All)
        .expect_err("html must fail");
    assert!(
        matches!(
            err,
            RemoteError::Decode {
                operation: Operation::Search,
                ..
            }
        ),
        "unexpected error: {err:?}"
    );
}

#[test]
fn unknown_route_maps_to_status() {
    let mock = MockBackend::start(Router::new());
    let err = mock
        .client()
        .persist_answer(&PersistRequest {
            node_id: "n-1".to_string(),
            text: "x".to_string(),
        })
        .expect_err("404 must fail");
    // The /update 404 is read as a missing node, whatever the cause.
    assert!(matches!(err, RemoteError::NotFound { .. }));

    let err = mock.client().ask("q").expect_err("404 must fail");
    assert_eq!(
        err,
        RemoteError::Status {
            operation: Operation::Ask,
            status: 404
        }
    );
}
