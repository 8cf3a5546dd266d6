use std::process;

use vqs_client::{HttpKnowledgeBase, KnowledgeBase};

use super::print_json;
use crate::config::Settings;
use crate::render;
use crate::{report_error, OutputFormat};

pub(crate) fn cmd_ask(settings: &Settings, query: &str, output: OutputFormat, quiet: bool) {
    let query = query.trim();
    if query.is_empty() {
        report_error("error: question is empty", output, quiet);
        process::exit(1);
    }
    let kb = HttpKnowledgeBase::new(settings.client_config());

    let response = match kb.ask(query) {
        Ok(r) => r,
        Err(e) => {
            report_error(&format!("error: {e}"), output, quiet);
            process::exit(1);
        }
    };

    match output {
        OutputFormat::Json => print_json(&render::ask_json(query, &response)),
        OutputFormat::Text => println!("{}", render::ask_text(&response)),
    }
}
