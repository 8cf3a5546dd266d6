use std::path::Path;
use std::process;

use vqs_core::DiffEngine;

use super::print_json;
use crate::{report_error, OutputFormat};

/// Line diff of two text files. Exits 1 when they differ.
pub(crate) fn cmd_diff(before_path: &Path, after_path: &Path, context: usize, output: OutputFormat, quiet: bool) {
    let before = match std::fs::read_to_string(before_path) {
        Ok(s) => s,
        Err(e) => {
            let msg = format!("error reading '{}': {}", before_path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };
    let after = match std::fs::read_to_string(after_path) {
        Ok(s) => s,
        Err(e) => {
            let msg = format!("error reading '{}': {}", after_path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    let engine = DiffEngine::new(context);
    let diff = engine.diff(&before, &after);

    if !quiet {
        match output {
            OutputFormat::Json => print_json(&diff.to_json(engine.context())),
            OutputFormat::Text if diff.is_identical() => println!("no differences"),
            OutputFormat::Text => {
                println!("--- {}", before_path.display());
                println!("+++ {}", after_path.display());
                print!("{}", diff.render(engine.context()));
            }
        }
    }

    if !diff.is_identical() {
        process::exit(1);
    }
}
