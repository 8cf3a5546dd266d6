//! Picks the answer shown at the top of a search result.

use crate::types::SourceNode;

/// Placeholder shown when a search returned no source nodes.
pub const NO_ANSWER: &str = "No answer available";

/// Returns the highest-scored source node.
///
/// Linear scan; on equal scores the earliest node wins. A NaN score never
/// beats a real one. Returns `None` for an empty slice.
pub fn best_answer(nodes: &[SourceNode]) -> Option<&SourceNode> {
    nodes.iter().fold(None, |best, node| match best {
        Some(incumbent) if !outranks(node.score, incumbent.score) => Some(incumbent),
        _ => Some(node),
    })
}

/// The answer text of [`best_answer`], or [`NO_ANSWER`].
pub fn best_answer_text(nodes: &[SourceNode]) -> &str {
    best_answer(nodes).map_or(NO_ANSWER, |node| node.answer.as_str())
}

fn outranks(candidate: f64, incumbent: f64) -> bool {
    if incumbent.is_nan() {
        !candidate.is_nan()
    } else {
        candidate > incumbent
    }
}
