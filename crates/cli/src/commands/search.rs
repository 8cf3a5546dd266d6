use std::process;

use vqs_client::{HttpKnowledgeBase, KnowledgeBase};
use vqs_core::ProductFilter;

use super::print_json;
use crate::config::Settings;
use crate::render;
use crate::{report_error, OutputFormat};

pub(crate) fn cmd_search(
    settings: &Settings,
    query: &str,
    product: Option<ProductFilter>,
    output: OutputFormat,
    quiet: bool,
) {
    let query = query.trim();
    if query.is_empty() {
        report_error("error: query is empty", output, quiet);
        process::exit(1);
    }
    let product = product.unwrap_or_else(|| settings.product.clone());
    let kb = HttpKnowledgeBase::new(settings.client_config());

    let response = match kb.search(query, &product) {
        Ok(r) => r,
        Err(e) => {
            report_error(&format!("error: {e}"), output, quiet);
            process::exit(1);
        }
    };

    match output {
        OutputFormat::Json => print_json(&render::search_json(query, &product, &response)),
        OutputFormat::Text => println!("{}", render::search_text(&response)),
    }
}
