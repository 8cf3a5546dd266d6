//! Search → Update → Review edit workflow.
//!
//! A [`WorkflowSnapshot`] is an immutable value: every transition borrows
//! the current snapshot and returns a new one, so a caller can always fall
//! back to the value it held before an action (a failed save, for one).
//!
//! The step-dependent fields live inside the stage variant that owns them:
//!
//! - `Search` carries nothing.
//! - `Update` carries the selected node, its question, the original and
//!   suggested answers, and the working draft.
//! - `Review` carries the selected node and the two texts frozen for the
//!   diff when the save was confirmed.
//!
//! A selected node therefore exists exactly when the step is not `Search`,
//! and the diff texts exist exactly in `Review`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;
use crate::types::PersistRequest;

// ──────────────────────────────────────────────
// Steps and events
// ──────────────────────────────────────────────

/// The screen the workflow is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStep {
    Search,
    Update,
    Review,
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkflowStep::Search => "search",
            WorkflowStep::Update => "update",
            WorkflowStep::Review => "review",
        };
        f.write_str(name)
    }
}

/// A user or collaborator action applied to a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowEvent {
    StartUpdate,
    EditDraft,
    UseSuggested,
    CommitUpdate,
    ConfirmPersisted,
    PersistFailed,
    CancelUpdate,
    ReturnHome,
}

impl fmt::Display for WorkflowEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            WorkflowEvent::StartUpdate => "start an update",
            WorkflowEvent::EditDraft => "edit the draft",
            WorkflowEvent::UseSuggested => "use the suggested answer",
            WorkflowEvent::CommitUpdate => "save the draft",
            WorkflowEvent::ConfirmPersisted => "confirm a save",
            WorkflowEvent::PersistFailed => "report a failed save",
            WorkflowEvent::CancelUpdate => "cancel the update",
            WorkflowEvent::ReturnHome => "return home",
        };
        f.write_str(text)
    }
}

// ──────────────────────────────────────────────
// Snapshot
// ──────────────────────────────────────────────

/// The candidate answer chosen for editing.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Selection {
    node_id: String,
    question: String,
    original_answer: String,
    suggested_answer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Draft {
    selection: Selection,
    working_answer: String,
    /// Set by `commit_update`; cleared by `persist_failed`.
    saving: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Review {
    selection: Selection,
    diff_before: String,
    diff_after: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Stage {
    Search,
    Update(Draft),
    Review(Review),
}

/// One immutable value of the workflow's full state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowSnapshot {
    stage: Stage,
}

impl Default for WorkflowSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowSnapshot {
    /// The session-start snapshot: `Search`, nothing selected.
    pub fn new() -> Self {
        WorkflowSnapshot {
            stage: Stage::Search,
        }
    }

    pub fn step(&self) -> WorkflowStep {
        match self.stage {
            Stage::Search => WorkflowStep::Search,
            Stage::Update(_) => WorkflowStep::Update,
            Stage::Review(_) => WorkflowStep::Review,
        }
    }

    fn selection(&self) -> Option<&Selection> {
        match &self.stage {
            Stage::Search => None,
            Stage::Update(draft) => Some(&draft.selection),
            Stage::Review(review) => Some(&review.selection),
        }
    }

    /// Id of the node being edited or reviewed; `None` in `Search`.
    pub fn selected_node_id(&self) -> Option<&str> {
        self.selection().map(|s| s.node_id.as_str())
    }

    pub fn question(&self) -> Option<&str> {
        self.selection().map(|s| s.question.as_str())
    }

    /// The answer as it was before editing started.
    pub fn original_answer(&self) -> Option<&str> {
        self.selection().map(|s| s.original_answer.as_str())
    }

    pub fn suggested_answer(&self) -> Option<&str> {
        self.selection().and_then(|s| s.suggested_answer.as_deref())
    }

    /// The in-progress draft; only defined in `Update`.
    pub fn working_answer(&self) -> Option<&str> {
        match &self.stage {
            Stage::Update(draft) => Some(draft.working_answer.as_str()),
            _ => None,
        }
    }

    /// Text on the left of the review diff; only defined in `Review`.
    pub fn diff_before(&self) -> Option<&str> {
        match &self.stage {
            Stage::Review(review) => Some(review.diff_before.as_str()),
            _ => None,
        }
    }

    /// Text on the right of the review diff; only defined in `Review`.
    pub fn diff_after(&self) -> Option<&str> {
        match &self.stage {
            Stage::Review(review) => Some(review.diff_after.as_str()),
            _ => None,
        }
    }

    /// True between `commit_update` and its confirmation or failure.
    pub fn is_saving(&self) -> bool {
        matches!(&self.stage, Stage::Update(draft) if draft.saving)
    }

    // ── Transitions ──────────────────────────────────────────────────────

    /// Select a candidate answer for editing and seed the draft from it.
    ///
    /// Legal from `Search` only.
    pub fn start_update(
        &self,
        node_id: impl Into<String>,
        question: impl Into<String>,
        current_answer: impl Into<String>,
        suggested: Option<String>,
    ) -> Result<Self, WorkflowError> {
        let event = WorkflowEvent::StartUpdate;
        if !matches!(self.stage, Stage::Search) {
            return Err(self.invalid(event));
        }
        let node_id = node_id.into();
        if node_id.trim().is_empty() {
            return Err(WorkflowError::EmptyNodeId);
        }
        let original_answer = current_answer.into();
        let draft = Draft {
            working_answer: original_answer.clone(),
            selection: Selection {
                node_id,
                question: question.into(),
                original_answer,
                suggested_answer: suggested,
            },
            saving: false,
        };
        Ok(self.transition(event, Stage::Update(draft)))
    }

    /// Replace the working draft.
    pub fn edit_draft(&self, text: impl Into<String>) -> Result<Self, WorkflowError> {
        let event = WorkflowEvent::EditDraft;
        let mut draft = self.idle_draft(event)?.clone();
        draft.working_answer = text.into();
        Ok(self.transition(event, Stage::Update(draft)))
    }

    /// Copy the suggested answer into the draft. Without a suggestion the
    /// snapshot is returned unchanged.
    pub fn use_suggested(&self) -> Result<Self, WorkflowError> {
        let event = WorkflowEvent::UseSuggested;
        let draft = self.idle_draft(event)?;
        match &draft.selection.suggested_answer {
            Some(suggested) => {
                let mut next = draft.clone();
                next.working_answer = suggested.clone();
                Ok(self.transition(event, Stage::Update(next)))
            }
            None => Ok(self.clone()),
        }
    }

    /// Start saving the draft.
    ///
    /// Returns the saving snapshot and the request the caller must hand to
    /// the persistence collaborator. Exactly one of
    /// [`confirm_persisted`](Self::confirm_persisted) or
    /// [`persist_failed`](Self::persist_failed) must follow.
    pub fn commit_update(&self) -> Result<(Self, PersistRequest), WorkflowError> {
        let event = WorkflowEvent::CommitUpdate;
        let draft = self.idle_draft(event)?;
        let request = PersistRequest {
            node_id: draft.selection.node_id.clone(),
            text: draft.working_answer.clone(),
        };
        let mut next = draft.clone();
        next.saving = true;
        Ok((self.transition(event, Stage::Update(next)), request))
    }

    /// The collaborator stored the draft: freeze both texts and move to
    /// `Review`.
    pub fn confirm_persisted(&self) -> Result<Self, WorkflowError> {
        let event = WorkflowEvent::ConfirmPersisted;
        let draft = match &self.stage {
            Stage::Update(draft) if draft.saving => draft,
            _ => return Err(self.invalid(event)),
        };
        let review = Review {
            selection: draft.selection.clone(),
            diff_before: draft.selection.original_answer.clone(),
            diff_after: draft.working_answer.clone(),
        };
        Ok(self.transition(event, Stage::Review(review)))
    }

    /// The collaborator failed to store the draft: stay in `Update` with the
    /// draft intact so the user can retry.
    pub fn persist_failed(&self) -> Result<Self, WorkflowError> {
        let event = WorkflowEvent::PersistFailed;
        let draft = match &self.stage {
            Stage::Update(draft) if draft.saving => draft,
            _ => return Err(self.invalid(event)),
        };
        let mut next = draft.clone();
        next.saving = false;
        Ok(self.transition(event, Stage::Update(next)))
    }

    /// Abandon the draft and go back to `Search`.
    pub fn cancel_update(&self) -> Result<Self, WorkflowError> {
        let event = WorkflowEvent::CancelUpdate;
        if !matches!(self.stage, Stage::Update(_)) {
            return Err(self.invalid(event));
        }
        Ok(self.transition(event, Stage::Search))
    }

    /// Back to `Search` from anywhere, clearing every carried field.
    pub fn return_home(&self) -> Self {
        self.transition(WorkflowEvent::ReturnHome, Stage::Search)
    }

    // ── Internal ─────────────────────────────────────────────────────────

    fn idle_draft(&self, event: WorkflowEvent) -> Result<&Draft, WorkflowError> {
        match &self.stage {
            Stage::Update(draft) if draft.saving => Err(WorkflowError::SaveInProgress { event }),
            Stage::Update(draft) => Ok(draft),
            _ => Err(self.invalid(event)),
        }
    }

    fn invalid(&self, event: WorkflowEvent) -> WorkflowError {
        tracing::debug!(%event, step = %self.step(), "rejected workflow transition");
        WorkflowError::InvalidTransition {
            event,
            step: self.step(),
        }
    }

    fn transition(&self, event: WorkflowEvent, stage: Stage) -> Self {
        let next = WorkflowSnapshot { stage };
        tracing::debug!(%event, from = %self.step(), to = %next.step(), "workflow transition");
        next
    }

    /// Every field at once; undefined ones are `None` (`null` in JSON).
    pub fn view(&self) -> SnapshotView<'_> {
        SnapshotView {
            step: self.step(),
            saving: self.is_saving(),
            selected_node_id: self.selected_node_id(),
            question: self.question(),
            original_answer: self.original_answer(),
            suggested_answer: self.suggested_answer(),
            working_answer: self.working_answer(),
            diff_before: self.diff_before(),
            diff_after: self.diff_after(),
        }
    }
}

/// Borrowed, serializable copy of a snapshot's fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SnapshotView<'a> {
    pub step: WorkflowStep,
    pub saving: bool,
    pub selected_node_id: Option<&'a str>,
    pub question: Option<&'a str>,
    pub original_answer: Option<&'a str>,
    pub suggested_answer: Option<&'a str>,
    pub working_answer: Option<&'a str>,
    pub diff_before: Option<&'a str>,
    pub diff_after: Option<&'a str>,
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
