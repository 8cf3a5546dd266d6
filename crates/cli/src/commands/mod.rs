pub(crate) mod ask;
pub(crate) mod diff;
pub(crate) mod search;
pub(crate) mod update;

use std::path::Path;

/// Read an answer file, dropping the single trailing newline editors add.
pub(crate) fn read_answer_file(path: &Path) -> Result<String, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("error reading '{}': {}", path.display(), e))?;
    let trimmed = text
        .strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .unwrap_or(&text);
    Ok(trimmed.to_string())
}

/// Print a JSON value to stdout, pretty.
pub(crate) fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_default()
    );
}
