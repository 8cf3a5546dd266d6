//! vqs-core: the pure side of the vendor questionnaire client.
//!
//! - [`WorkflowSnapshot`] -- the Search → Update → Review edit workflow as
//!   immutable snapshots and transition functions
//! - [`diff`] -- line-level edit script and unified rendering for the
//!   review step
//! - [`types`] -- knowledge-base records shared with the backend client
//! - [`ranking`] -- selection of the answer shown first in a search
//!
//! Nothing here performs I/O.

pub mod diff;
pub mod error;
pub mod ranking;
pub mod types;
pub mod workflow;

pub use diff::{DiffEngine, DiffReport, DiffStats, Edit, EditKind, Hunk, TextDiff, DEFAULT_CONTEXT};
pub use error::WorkflowError;
pub use ranking::{best_answer, best_answer_text, NO_ANSWER};
pub use types::{
    AskResponse, PersistRequest, ProductFilter, SearchResponse, SourceNode, UpdateAck,
};
pub use workflow::{SnapshotView, WorkflowEvent, WorkflowSnapshot, WorkflowStep};
