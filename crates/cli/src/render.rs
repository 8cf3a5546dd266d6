//! Text and JSON views of lookups and workflow state, shared by the
//! one-shot commands and the shell.

use vqs_core::{
    best_answer_text, AskResponse, ProductFilter, SearchResponse, SourceNode, WorkflowSnapshot,
    WorkflowStep,
};

/// Prefix every line of `text` with `prefix`.
fn indent(text: &str, prefix: &str) -> String {
    text.split('\n')
        .map(|line| format!("{prefix}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn source_nodes_text(nodes: &[SourceNode]) -> String {
    if nodes.is_empty() {
        return "  no source documents".to_string();
    }
    let mut out = Vec::with_capacity(nodes.len());
    for (i, node) in nodes.iter().enumerate() {
        out.push(format!(
            "  {}. [{}] {} (score {:.2})\n{}\n{}",
            i + 1,
            node.product,
            node.document_name,
            node.score,
            indent(&node.question, "     Q: "),
            indent(&node.answer, "     A: "),
        ));
    }
    out.join("\n")
}

pub fn search_text(response: &SearchResponse) -> String {
    let mut out = String::new();
    out.push_str("Best answer:\n");
    out.push_str(&indent(best_answer_text(&response.source_nodes), "  "));
    out.push('\n');
    if let Some(suggested) = &response.suggested_answer {
        out.push_str("\nSuggested improved answer:\n");
        out.push_str(&indent(suggested, "  "));
        out.push('\n');
    }
    out.push_str("\nSource documents:\n");
    out.push_str(&source_nodes_text(&response.source_nodes));
    out
}

pub fn search_json(query: &str, product: &ProductFilter, response: &SearchResponse) -> serde_json::Value {
    serde_json::json!({
        "best_answer": best_answer_text(&response.source_nodes),
        "product": product,
        "query": query,
        "source_nodes": response.source_nodes,
        "suggested_answer": response.suggested_answer,
    })
}

pub fn ask_text(response: &AskResponse) -> String {
    format!(
        "Answer:\n{}\n\nSource documents:\n{}",
        indent(&response.answer, "  "),
        source_nodes_text(&response.source_nodes)
    )
}

pub fn ask_json(query: &str, response: &AskResponse) -> serde_json::Value {
    serde_json::json!({
        "answer": response.answer,
        "query": query,
        "source_nodes": response.source_nodes,
    })
}

/// Where the workflow stands, with the fields defined at this step.
pub fn status_text(snapshot: &WorkflowSnapshot, product: &ProductFilter) -> String {
    let mut lines = vec![format!("step: {}", snapshot.step())];
    lines.push(format!("product: {product}"));
    if let Some(id) = snapshot.selected_node_id() {
        lines.push(format!("node: {id}"));
    }
    if let Some(question) = snapshot.question() {
        lines.push(format!("question: {question}"));
    }
    match snapshot.step() {
        WorkflowStep::Search => {}
        WorkflowStep::Update => {
            if let Some(original) = snapshot.original_answer() {
                lines.push(format!("original answer:\n{}", indent(original, "  ")));
            }
            if let Some(suggested) = snapshot.suggested_answer() {
                lines.push(format!("suggested answer:\n{}", indent(suggested, "  ")));
            }
            if let Some(draft) = snapshot.working_answer() {
                lines.push(format!("draft:\n{}", indent(draft, "  ")));
            }
            if snapshot.is_saving() {
                lines.push("saving...".to_string());
            }
        }
        WorkflowStep::Review => {
            if let Some(after) = snapshot.diff_after() {
                lines.push(format!("updated answer:\n{}", indent(after, "  ")));
            }
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, answer: &str, score: f64) -> SourceNode {
        SourceNode {
            node_id: id.to_string(),
            document_name: "SIG Lite.xlsx".to_string(),
            product: "Product1".to_string(),
            question: "Encrypted at rest?".to_string(),
            answer: answer.to_string(),
            score,
        }
    }

    #[test]
    fn search_text_shows_best_and_suggestion() {
        let response = SearchResponse {
            suggested_answer: Some("Yes, with AES-256.".to_string()),
            source_nodes: vec![node("a", "Partially.", 0.3), node("b", "Yes.", 0.9)],
        };
        let text = search_text(&response);
        assert!(text.starts_with("Best answer:\n  Yes.\n"));
        assert!(text.contains("Suggested improved answer:\n  Yes, with AES-256."));
        assert!(text.contains("  1. [Product1] SIG Lite.xlsx (score 0.30)"));
        assert!(text.contains("  2. [Product1] SIG Lite.xlsx (score 0.90)"));
    }

    #[test]
    fn empty_search_says_no_answer() {
        let text = search_text(&SearchResponse::default());
        assert!(text.contains("No answer available"));
        assert!(text.contains("no source documents"));
        assert!(!text.contains("Suggested"));
    }

    #[test]
    fn search_json_carries_best_answer() {
        let response = SearchResponse {
            suggested_answer: None,
            source_nodes: vec![node("a", "Yes.", 0.9)],
        };
        let json = search_json("q", &ProductFilter::All, &response);
        assert_eq!(json["best_answer"], "Yes.");
        assert_eq!(json["product"], "All");
        assert!(json["suggested_answer"].is_null());
        assert_eq!(json["source_nodes"][0]["node_id"], "a");
    }

    #[test]
    fn multi_line_answers_are_indented() {
        let text = source_nodes_text(&[node("a", "line one\nline two", 1.0)]);
        assert!(text.contains("     A: line one\n     A: line two"));
    }

    #[test]
    fn status_lists_draft_in_update() {
        let snapshot = WorkflowSnapshot::new()
            .start_update("n-1", "Encrypted?", "Yes.", None)
            .unwrap()
            .edit_draft("Yes, AES-256.")
            .unwrap();
        let text = status_text(&snapshot, &ProductFilter::All);
        assert!(text.starts_with("step: update\nproduct: All\nnode: n-1"));
        assert!(text.contains("draft:\n  Yes, AES-256."));
        assert!(!text.contains("suggested"));
    }
}
