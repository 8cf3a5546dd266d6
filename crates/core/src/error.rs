use crate::workflow::{WorkflowEvent, WorkflowStep};

/// Errors returned by workflow transitions.
///
/// A rejected transition never alters the snapshot it was attempted on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    /// The event is not permitted from the current step.
    #[error("cannot {event} while in the {step} step")]
    InvalidTransition {
        event: WorkflowEvent,
        step: WorkflowStep,
    },

    /// The draft is being saved; it cannot change or be saved again until
    /// the save is confirmed or reported failed.
    #[error("cannot {event} while a save is in progress")]
    SaveInProgress { event: WorkflowEvent },

    /// `start_update` was given an empty node id.
    #[error("cannot start an update without a node id")]
    EmptyNodeId,
}

impl WorkflowError {
    /// True for every error caused by the snapshot being in the wrong state
    /// for the attempted event.
    pub fn is_invalid_transition(&self) -> bool {
        matches!(
            self,
            WorkflowError::InvalidTransition { .. } | WorkflowError::SaveInProgress { .. }
        )
    }
}
