use std::fmt;

/// The knowledge-base call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Search,
    Ask,
    Persist,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Search => "search",
            Operation::Ask => "ask",
            Operation::Persist => "update",
        };
        f.write_str(name)
    }
}

/// Errors returned by a [`KnowledgeBase`](crate::KnowledgeBase).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// The request never produced a response (refused, reset, timed out).
    #[error("could not reach the knowledge base ({operation}): {message}")]
    Transport { operation: Operation, message: String },

    /// The backend answered with a non-success status.
    #[error("knowledge base {operation} failed with HTTP {status}")]
    Status { operation: Operation, status: u16 },

    /// The node to update does not exist.
    #[error("node '{node_id}' not found")]
    NotFound { node_id: String },

    /// The response body was not the expected JSON.
    #[error("could not parse {operation} response: {message}")]
    Decode { operation: Operation, message: String },

    /// The collaborator refused the call without contacting any backend.
    #[error("knowledge base {operation} rejected: {message}")]
    Rejected { operation: Operation, message: String },
}

impl RemoteError {
    pub fn operation(&self) -> Operation {
        match self {
            RemoteError::Transport { operation, .. }
            | RemoteError::Status { operation, .. }
            | RemoteError::Decode { operation, .. }
            | RemoteError::Rejected { operation, .. } => *operation,
            RemoteError::NotFound { .. } => Operation::Persist,
        }
    }
}
