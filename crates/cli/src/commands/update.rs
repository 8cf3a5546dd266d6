use std::path::Path;
use std::process;

use vqs_client::{HttpKnowledgeBase, KnowledgeBase};
use serde::Serialize;
use vqs_core::{DiffReport, SnapshotView, TextDiff, UpdateAck, WorkflowSnapshot};

use super::{print_json, read_answer_file};
use crate::config::Settings;
use crate::session::{Session, SessionError};
use crate::{report_error, OutputFormat};

/// Where the new answer text comes from.
pub(crate) enum AnswerSource<'a> {
    Text(&'a str),
    File(&'a Path),
}

pub(crate) struct UpdateArgs<'a> {
    pub node_id: &'a str,
    pub answer: AnswerSource<'a>,
    pub original_file: Option<&'a Path>,
    pub question: Option<&'a str>,
    pub context: Option<usize>,
}

/// Run the whole edit workflow for one node and print the review diff.
///
/// The diff is only shown when `--original-file` supplies the text being
/// replaced.
pub(crate) fn cmd_update(settings: &Settings, args: UpdateArgs<'_>, output: OutputFormat, quiet: bool) {
    let answer = match args.answer {
        AnswerSource::Text(text) => Ok(text.to_string()),
        AnswerSource::File(path) => read_answer_file(path),
    };
    let original = match args.original_file {
        Some(path) => read_answer_file(path).map(Some),
        None => Ok(None),
    };
    let (answer, original) = match (answer, original) {
        (Ok(a), Ok(o)) => (a, o),
        (Err(msg), _) | (_, Err(msg)) => {
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    let kb = HttpKnowledgeBase::new(settings.client_config());
    let context = args.context.unwrap_or(settings.context);
    let mut session = Session::new(kb, settings.product.clone(), context);

    let question = args.question.unwrap_or_default();
    let current = original.as_deref().unwrap_or_default();
    let ack = match save_answer(&mut session, args.node_id, question, current, &answer) {
        Ok(ack) => ack,
        Err(e) => {
            report_error(&format!("error: {e}"), output, quiet);
            process::exit(1);
        }
    };

    let diff = match original {
        Some(_) => match session.review_diff() {
            Ok(d) => Some(d),
            Err(e) => {
                report_error(&format!("error: {e}"), output, quiet);
                process::exit(1);
            }
        },
        None => None,
    };

    match output {
        OutputFormat::Json => print_json(&update_json(&ack, session.snapshot(), diff.as_ref(), context)),
        OutputFormat::Text => print!("{}", update_text(&ack, diff.as_ref(), context, quiet)),
    }
}

/// JSON output of `vqs update`.
#[derive(Serialize)]
struct UpdateReport<'a> {
    node_id: &'a str,
    updated_answer: &'a str,
    diff: Option<DiffReport<'a>>,
    snapshot: SnapshotView<'a>,
}

fn update_json(
    ack: &UpdateAck,
    snapshot: &WorkflowSnapshot,
    diff: Option<&TextDiff<'_>>,
    context: usize,
) -> serde_json::Value {
    let report = UpdateReport {
        node_id: &ack.node_id,
        updated_answer: &ack.updated_answer,
        diff: diff.map(|d| d.report(context)),
        snapshot: snapshot.view(),
    };
    serde_json::to_value(report).unwrap_or_default()
}

fn update_text(ack: &UpdateAck, diff: Option<&TextDiff<'_>>, context: usize, quiet: bool) -> String {
    let mut out = String::new();
    if !quiet {
        out.push_str(&format!("saved answer for node {}\n", ack.node_id));
    }
    match diff {
        Some(d) if d.is_identical() => out.push_str("no differences\n"),
        Some(d) => out.push_str(&d.render(context)),
        None => {}
    }
    out
}

/// start → edit → commit → persist → confirm.
fn save_answer<K: KnowledgeBase>(
    session: &mut Session<K>,
    node_id: &str,
    question: &str,
    original: &str,
    answer: &str,
) -> Result<UpdateAck, SessionError> {
    session.start(node_id, question, original)?;
    session.edit(answer)?;
    session.save()
}
