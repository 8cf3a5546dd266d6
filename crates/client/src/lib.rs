//! Knowledge-base collaborators for the questionnaire workflow.
//!
//! [`KnowledgeBase`] is the seam between the workflow and whatever stores
//! the question/answer records. Two implementations ship here:
//! [`HttpKnowledgeBase`] talks to the search backend over JSON/HTTP, and
//! [`StaticKnowledgeBase`] serves an in-memory record set for offline use
//! and tests.

pub mod config;
pub mod error;
pub mod http;
pub mod memory;

pub use config::{ClientConfig, DEFAULT_ENDPOINT};
pub use error::{Operation, RemoteError};
pub use http::HttpKnowledgeBase;
pub use memory::{Fixture, FixtureNode, StaticKnowledgeBase};

use vqs_core::{AskResponse, PersistRequest, ProductFilter, SearchResponse, UpdateAck};

/// Search, question answering and answer persistence over a knowledge base.
///
/// Calls block until the collaborator answers. Callers issue at most one
/// call per user action and wait for it before issuing the next.
pub trait KnowledgeBase {
    /// Candidate answers for `query`, restricted to `product`.
    fn search(&self, query: &str, product: &ProductFilter) -> Result<SearchResponse, RemoteError>;

    /// A generated answer to a free-form question over the whole knowledge base.
    fn ask(&self, query: &str) -> Result<AskResponse, RemoteError>;

    /// Overwrite the stored answer of `request.node_id`.
    fn persist_answer(&self, request: &PersistRequest) -> Result<UpdateAck, RemoteError>;
}

impl<K: KnowledgeBase + ?Sized> KnowledgeBase for &K {
    fn search(&self, query: &str, product: &ProductFilter) -> Result<SearchResponse, RemoteError> {
        (**self).search(query, product)
    }

    fn ask(&self, query: &str) -> Result<AskResponse, RemoteError> {
        (**self).ask(query)
    }

    fn persist_answer(&self, request: &PersistRequest) -> Result<UpdateAck, RemoteError> {
        (**self).persist_answer(request)
    }
}

impl<K: KnowledgeBase + ?Sized> KnowledgeBase for Box<K> {
    fn search(&self, query: &str, product: &ProductFilter) -> Result<SearchResponse, RemoteError> {
        (**self).search(query, product)
    }

    fn ask(&self, query: &str) -> Result<AskResponse, RemoteError> {
        (**self).ask(query)
    }

    fn persist_answer(&self, request: &PersistRequest) -> Result<UpdateAck, RemoteError> {
        (**self).persist_answer(request)
    }
}
