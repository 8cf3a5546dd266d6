//! `vqs shell` -- interactive REPL over the edit workflow.
//!
//! Lets the user search the knowledge base, pick a candidate answer,
//! rework it (by hand or from the suggested answer), save it and review
//! the line diff, all in one session.

use std::io::{self, BufRead, Write};

use vqs_client::KnowledgeBase;
use vqs_core::{best_answer_text, ProductFilter, TextDiff, WorkflowStep};

use crate::render;
use crate::session::{Results, Session};

/// Line that ends multi-line `edit` input.
const END_OF_TEXT: &str = ".";

/// Run the REPL until `quit` or end of input.
///
/// Normal output goes to `out`, errors to `err`. The prompt is only
/// printed when `interactive` is set.
pub fn run_shell<K, R, W, E>(
    session: &mut Session<K>,
    mut input: R,
    out: &mut W,
    err: &mut E,
    interactive: bool,
) -> io::Result<()>
where
    K: KnowledgeBase,
    R: BufRead,
    W: Write,
    E: Write,
{
    if interactive {
        writeln!(out)?;
        writeln!(out, "  Vendor questionnaire shell (product: {})", session.product())?;
        writeln!(out, "  Type 'help' for commands.")?;
        writeln!(out)?;
    }

    let mut line = String::new();
    loop {
        if interactive {
            write!(out, "vqs:{}> ", session.snapshot().step())?;
            out.flush()?;
        }

        line.clear();
        if input.read_line(&mut line)? == 0 {
            if interactive {
                writeln!(out)?;
            }
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let (cmd, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd.to_lowercase(), rest.trim()),
            None => (trimmed.to_lowercase(), ""),
        };
        tracing::debug!(command = %cmd, "shell command");

        match cmd.as_str() {
            "help" | "?" => print_help(out)?,
            "search" => {
                if rest.is_empty() {
                    writeln!(err, "usage: search <query>")?;
                    continue;
                }
                match session.search(rest) {
                    Ok(results) => print_results(out, results)?,
                    Err(e) => writeln!(err, "error: {e}")?,
                }
            }
            "ask" => {
                if rest.is_empty() {
                    writeln!(err, "usage: ask <question>")?;
                    continue;
                }
                match session.ask(rest) {
                    Ok(results) => print_results(out, results)?,
                    Err(e) => writeln!(err, "error: {e}")?,
                }
            }
            "product" => {
                if !rest.is_empty() {
                    session.set_product(ProductFilter::from(rest));
                }
                writeln!(out, "  product: {}", session.product())?;
            }
            "results" => match session.results() {
                Some(results) => {
                    writeln!(out, "  results for: {}", results.query())?;
                    print_results(out, results)?
                }
                None => writeln!(out, "  no results")?,
            },
            "best" => match session.results() {
                Some(Results::Ask { response, .. }) => writeln!(out, "{}", response.answer)?,
                Some(results) => writeln!(out, "{}", best_answer_text(results.source_nodes()))?,
                None => writeln!(out, "  no results")?,
            },
            "update" => {
                let Ok(index) = rest.parse::<usize>() else {
                    writeln!(err, "usage: update <result number>")?;
                    continue;
                };
                match session.select(index) {
                    Ok(_) => writeln!(
                        out,
                        "{}",
                        render::status_text(session.snapshot(), session.product())
                    )?,
                    Err(e) => writeln!(err, "error: {e}")?,
                }
            }
            "draft" => match session.snapshot().working_answer() {
                Some(draft) => writeln!(out, "{draft}")?,
                None => writeln!(err, "error: no draft; pick a result with 'update <n>'")?,
            },
            "edit" => {
                let text = if rest.is_empty() {
                    if session.snapshot().step() != WorkflowStep::Update {
                        writeln!(err, "error: no draft; pick a result with 'update <n>'")?;
                        continue;
                    }
                    if interactive {
                        writeln!(out, "  enter the new answer; end with a line containing only '.'")?;
                    }
                    read_block(&mut input)?
                } else {
                    rest.to_string()
                };
                match session.edit(&text) {
                    Ok(_) => writeln!(out, "  draft updated")?,
                    Err(e) => writeln!(err, "error: {e}")?,
                }
            }
            "suggest" => {
                let had_suggestion = session.snapshot().suggested_answer().is_some();
                match session.use_suggested() {
                    Ok(_) if had_suggestion => writeln!(out, "  draft replaced with the suggested answer")?,
                    Ok(_) => writeln!(out, "  no suggested answer; draft unchanged")?,
                    Err(e) => writeln!(err, "error: {e}")?,
                }
            }
            "save" => match session.save() {
                Ok(ack) => {
                    writeln!(out, "  saved answer for node {}", ack.node_id)?;
                    print_review(out, session)?;
                }
                Err(e) => {
                    writeln!(err, "error: {e}")?;
                    if session.snapshot().step() == WorkflowStep::Update {
                        writeln!(err, "  draft kept; 'save' to retry or 'cancel' to discard")?;
                    }
                }
            },
            "cancel" => match session.cancel() {
                Ok(_) => writeln!(out, "  update cancelled")?,
                Err(e) => writeln!(err, "error: {e}")?,
            },
            "diff" => match session.review_diff() {
                Ok(diff) => print_diff(out, &diff, session.context())?,
                Err(e) => writeln!(err, "error: {e}")?,
            },
            "home" => {
                session.home();
                writeln!(out, "  back to search")?;
            }
            "status" => writeln!(out, "{}", render::status_text(session.snapshot(), session.product()))?,
            "quit" | "exit" => break,
            _ => writeln!(
                err,
                "unknown command: {}. Type 'help' for available commands.",
                cmd
            )?,
        }
    }
    Ok(())
}

fn print_results<W: Write>(out: &mut W, results: &Results) -> io::Result<()> {
    match results {
        Results::Search { response, .. } => writeln!(out, "{}", render::search_text(response)),
        Results::Ask { response, .. } => writeln!(out, "{}", render::ask_text(response)),
    }
}

fn print_review<K: KnowledgeBase, W: Write>(out: &mut W, session: &Session<K>) -> io::Result<()> {
    match session.review_diff() {
        Ok(diff) => print_diff(out, &diff, session.context()),
        Err(_) => Ok(()),
    }
}

fn print_diff<W: Write>(out: &mut W, diff: &TextDiff<'_>, context: usize) -> io::Result<()> {
    if diff.is_identical() {
        writeln!(out, "no differences")
    } else {
        write!(out, "{}", diff.render(context))
    }
}

/// Lines up to a lone `.` (or end of input), joined with `\n`.
fn read_block<R: BufRead>(input: &mut R) -> io::Result<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    loop {
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let content = line.trim_end_matches(['\n', '\r']);
        if content == END_OF_TEXT {
            break;
        }
        lines.push(content.to_string());
    }
    Ok(lines.join("\n"))
}

fn print_help<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "  search <query>     Search answers for the current product")?;
    writeln!(out, "  ask <question>     Ask a question across all products")?;
    writeln!(out, "  product [name]     Show or set the product filter ('All' for every product)")?;
    writeln!(out, "  results            Show the last results again")?;
    writeln!(out, "  best               Show the best answer of the last results")?;
    writeln!(out, "  update <n>         Edit the answer of search result n")?;
    writeln!(out, "  draft              Show the current draft")?;
    writeln!(out, "  edit [text]        Replace the draft (no text: multi-line, end with '.')")?;
    writeln!(out, "  suggest            Replace the draft with the suggested answer")?;
    writeln!(out, "  save               Save the draft and show the diff")?;
    writeln!(out, "  cancel             Discard the draft")?;
    writeln!(out, "  diff               Show the diff of the last save")?;
    writeln!(out, "  home               Return to search")?;
    writeln!(out, "  status             Show where the workflow stands")?;
    writeln!(out, "  quit               Exit the shell")?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vqs_client::{FixtureNode, Operation, StaticKnowledgeBase};

    fn kb() -> StaticKnowledgeBase {
        StaticKnowledgeBase::new(vec![FixtureNode {
            node_id: "n-1".to_string(),
            document_name: "SIG Lite.xlsx".to_string(),
            product: "Product1".to_string(),
            question: "Do you perform background checks?".to_string(),
            answer: "Yes.".to_string(),
            suggested_answer: Some("Yes, for all employees before hire.".to_string()),
        }])
    }

    fn run(kb: &StaticKnowledgeBase, script: &str) -> (String, String) {
        let mut session = Session::new(kb, ProductFilter::All, 3);
        let mut out = Vec::new();
        let mut err = Vec::new();
        run_shell(&mut session, script.as_bytes(), &mut out, &mut err, false).unwrap();
        (
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn search_update_save_shows_diff() {
        let kb = kb();
        let (out, err) = run(&kb, "search background checks\nupdate 1\nsuggest\nsave\nquit\n");
        assert_eq!(err, "");
        assert!(out.contains("Best answer:\n  Yes."));
        assert!(out.contains("step: update"));
        assert!(out.contains("saved answer for node n-1"));
        assert!(out.contains("@@ -1,1 +1,1 @@\n-Yes.\n+Yes, for all employees before hire.\n"));
        assert_eq!(
            kb.answer_of("n-1").as_deref(),
            Some("Yes, for all employees before hire.")
        );
    }

    #[test]
    fn multi_line_edit_ends_at_dot() {
        let kb = kb();
        let (out, err) = run(
            &kb,
            "search background\nupdate 1\nedit\nYes.\nChecks are repeated yearly.\n.\ndraft\n",
        );
        assert_eq!(err, "");
        assert!(out.contains("draft updated"));
        assert!(out.ends_with("Yes.\nChecks are repeated yearly.\n"));
    }

    #[test]
    fn failed_save_keeps_draft() {
        let kb = kb();
        kb.fail_next(Operation::Persist);
        let (out, err) = run(&kb, "search background\nupdate 1\nedit No.\nsave\nstatus\n");
        assert!(err.contains("error: knowledge base update rejected"));
        assert!(err.contains("draft kept"));
        assert!(out.contains("draft:\n  No."));
        assert_eq!(kb.answer_of("n-1").as_deref(), Some("Yes."));
    }

    #[test]
    fn commands_out_of_step_report_errors() {
        let kb = kb();
        let (_, err) = run(&kb, "save\ndiff\nupdate 1\nedit\nbogus\nupdate x\n");
        assert!(err.contains("cannot save the draft while in the search step"));
        assert!(err.contains("nothing to review"));
        assert!(err.contains("no search results"));
        assert!(err.contains("no draft"));
        assert!(err.contains("unknown command: bogus"));
        assert!(err.contains("usage: update <result number>"));
    }

    #[test]
    fn product_switch_and_best() {
        let kb = kb();
        let (out, _) = run(&kb, "product Product2\nsearch background\nbest\nproduct all\n");
        assert!(out.contains("  product: Product2"));
        assert!(out.contains("No answer available"));
        assert!(out.contains("  product: All"));
    }

    #[test]
    fn diff_command_repeats_last_review() {
        let kb = kb();
        let (out, err) = run(&kb, "search background\nupdate 1\nsuggest\nsave\ndiff\n");
        assert_eq!(err, "");
        assert_eq!(out.matches("@@ -1,1 +1,1 @@\n-Yes.\n").count(), 2);
    }
}
