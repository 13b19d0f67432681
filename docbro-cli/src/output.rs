//! ABOUTME: Result rendering — text or JSON, grounded on `llmspell-cli`'s output module
//! ABOUTME: but scoped down to the two formats the CLI surface actually needs

use docbro_core::error::DocBroError;
use serde::Serialize;

use crate::cli::OutputFormat;

/// Renders a successful command result to stdout in the requested format.
pub fn print_ok<T: Serialize>(format: OutputFormat, value: &T, text: impl FnOnce(&T) -> String) {
    match format {
        OutputFormat::Json => {
            let rendered = serde_json::json!({ "success": true, "data": value });
            println!("{}", serde_json::to_string_pretty(&rendered).expect("value is always serializable"));
        }
        OutputFormat::Text => println!("{}", text(value)),
    }
}

/// Renders an error to stderr and returns the process exit code it maps to
/// (spec §6/§7).
pub fn print_err(format: OutputFormat, err: &DocBroError) -> i32 {
    match format {
        OutputFormat::Json => {
            let rendered = serde_json::json!({
                "success": false,
                "error": {
                    "code": err.code(),
                    "message": err.to_string(),
                    "suggestion": err.suggestion(),
                }
            });
            eprintln!("{}", serde_json::to_string_pretty(&rendered).expect("error envelope is always serializable"));
        }
        OutputFormat::Text => {
            eprintln!("error: {err}");
            if let Some(suggestion) = err.suggestion() {
                eprintln!("  suggestion: {suggestion}");
            }
        }
    }
    err.exit_code()
}
