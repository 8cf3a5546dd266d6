//! Drives the edit workflow against a knowledge base.
//!
//! A [`Session`] owns the current [`WorkflowSnapshot`] plus what the user
//! last looked up, and performs the collaborator calls each action needs.
//! Both the interactive shell and the one-shot `update` command go through
//! it.

use vqs_client::{KnowledgeBase, RemoteError};
use vqs_core::{
    AskResponse, DiffEngine, ProductFilter, SearchResponse, SourceNode, TextDiff, UpdateAck,
    WorkflowError, WorkflowSnapshot, WorkflowStep,
};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("query is empty")]
    EmptyQuery,

    #[error("finish or cancel the current update first")]
    UpdateInProgress,

    #[error("no search results to choose from; run a search first")]
    NoResults,

    #[error("result {index} does not exist; choose 1 to {available}")]
    NoSuchResult { index: usize, available: usize },

    #[error("nothing to review; save an update first")]
    NotReviewing,
}

/// What the last lookup returned.
#[derive(Debug, Clone, PartialEq)]
pub enum Results {
    Search {
        query: String,
        response: SearchResponse,
    },
    Ask {
        query: String,
        response: AskResponse,
    },
}

impl Results {
    pub fn query(&self) -> &str {
        match self {
            Results::Search { query, .. } | Results::Ask { query, .. } => query,
        }
    }

    pub fn source_nodes(&self) -> &[SourceNode] {
        match self {
            Results::Search { response, .. } => &response.source_nodes,
            Results::Ask { response, .. } => &response.source_nodes,
        }
    }
}

pub struct Session<K> {
    kb: K,
    snapshot: WorkflowSnapshot,
    results: Option<Results>,
    product: ProductFilter,
    engine: DiffEngine,
}

impl<K: KnowledgeBase> Session<K> {
    pub fn new(kb: K, product: ProductFilter, context: usize) -> Self {
        Session {
            kb,
            snapshot: WorkflowSnapshot::new(),
            results: None,
            product,
            engine: DiffEngine::new(context),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> &WorkflowSnapshot {
        &self.snapshot
    }

    pub fn results(&self) -> Option<&Results> {
        self.results.as_ref()
    }

    pub fn product(&self) -> &ProductFilter {
        &self.product
    }

    pub fn set_product(&mut self, product: ProductFilter) {
        tracing::info!(%product, "product filter changed");
        self.product = product;
    }

    pub fn context(&self) -> usize {
        self.engine.context()
    }

    // ── Lookups ──────────────────────────────────────────────────────────

    /// Product-filtered search. Earlier results are dropped before the
    /// request goes out, so a failure leaves no results rather than stale
    /// ones.
    pub fn search(&mut self, query: &str) -> Result<&Results, SessionError> {
        let query = self.begin_lookup(query)?;
        let response = self.kb.search(&query, &self.product)?;
        Ok(self.results.insert(Results::Search { query, response }))
    }

    /// Free-form question over every product.
    pub fn ask(&mut self, query: &str) -> Result<&Results, SessionError> {
        let query = self.begin_lookup(query)?;
        let response = self.kb.ask(&query)?;
        Ok(self.results.insert(Results::Ask { query, response }))
    }

    fn begin_lookup(&mut self, query: &str) -> Result<String, SessionError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SessionError::EmptyQuery);
        }
        match self.snapshot.step() {
            WorkflowStep::Update => return Err(SessionError::UpdateInProgress),
            WorkflowStep::Review => self.snapshot = self.snapshot.return_home(),
            WorkflowStep::Search => {}
        }
        self.results = None;
        Ok(query.to_string())
    }

    // ── Workflow ─────────────────────────────────────────────────────────

    /// Start editing search result `index` (1-based), carrying the
    /// search's suggested answer along.
    pub fn select(&mut self, index: usize) -> Result<&WorkflowSnapshot, SessionError> {
        let Some(Results::Search { response, .. }) = &self.results else {
            return Err(SessionError::NoResults);
        };
        let available = response.source_nodes.len();
        let node = index
            .checked_sub(1)
            .and_then(|i| response.source_nodes.get(i))
            .ok_or(SessionError::NoSuchResult { index, available })?;
        self.snapshot = self.snapshot.start_update(
            node.node_id.as_str(),
            node.question.as_str(),
            node.answer.as_str(),
            response.suggested_answer.clone(),
        )?;
        Ok(&self.snapshot)
    }

    /// Start editing a node directly, without a prior search.
    pub fn start(
        &mut self,
        node_id: &str,
        question: &str,
        current_answer: &str,
    ) -> Result<&WorkflowSnapshot, SessionError> {
        self.snapshot = self
            .snapshot
            .start_update(node_id, question, current_answer, None)?;
        Ok(&self.snapshot)
    }

    pub fn edit(&mut self, text: &str) -> Result<&WorkflowSnapshot, SessionError> {
        self.snapshot = self.snapshot.edit_draft(text)?;
        Ok(&self.snapshot)
    }

    pub fn use_suggested(&mut self) -> Result<&WorkflowSnapshot, SessionError> {
        self.snapshot = self.snapshot.use_suggested()?;
        Ok(&self.snapshot)
    }

    /// Persist the draft.
    ///
    /// On success the workflow moves to `Review`. On failure it is back in
    /// `Update` with the draft intact and the error is returned.
    pub fn save(&mut self) -> Result<UpdateAck, SessionError> {
        let (saving, request) = self.snapshot.commit_update()?;
        self.snapshot = saving;
        match self.kb.persist_answer(&request) {
            Ok(ack) => {
                self.snapshot = self.snapshot.confirm_persisted()?;
                tracing::info!(node_id = %ack.node_id, "answer saved");
                Ok(ack)
            }
            Err(err) => {
                self.snapshot = self.snapshot.persist_failed()?;
                Err(err.into())
            }
        }
    }

    pub fn cancel(&mut self) -> Result<&WorkflowSnapshot, SessionError> {
        self.snapshot = self.snapshot.cancel_update()?;
        Ok(&self.snapshot)
    }

    pub fn home(&mut self) -> &WorkflowSnapshot {
        self.snapshot = self.snapshot.return_home();
        &self.snapshot
    }

    /// Diff between the original and saved answers.
    pub fn review_diff(&self) -> Result<TextDiff<'_>, SessionError> {
        match (self.snapshot.diff_before(), self.snapshot.diff_after()) {
            (Some(before), Some(after)) => Ok(self.engine.diff(before, after)),
            _ => Err(SessionError::NotReviewing),
        }
    }
}
