//! Human-readable rendering of a `CommandResult` for the REPL.

use voxa_common::CommandResult;

pub fn render_result(result: &CommandResult) -> String {
    let mut output = String::new();

    let marker = if result.success { "ok" } else { "!!" };
    output.push_str(&format!(
        "[{}] {} {} (confidence {:.2}, {}ms)\n",
        marker,
        result.command_type,
        result.intent.as_deref().unwrap_or("-"),
        result.confidence_score,
        result.response_time_ms,
    ));

    if let Some(message) = &result.message {
        output.push_str(&format!("  {}\n", message));
    }
    if let Some(error) = &result.error {
        output.push_str(&format!("  error: {}\n", error));
    }

    if !result.suggestions.is_empty() {
        output.push_str("  Suggestions:\n");
        for suggestion in &result.suggestions {
            output.push_str(&format!("    - {}\n", suggestion));
        }
    }

    if !result.alternative_commands.is_empty() {
        output.push_str("  You can also try:\n");
        for alternative in &result.alternative_commands {
            output.push_str(&format!("    - {}\n", alternative));
        }
    }

    if !result.help_content.is_empty() {
        output.push_str("  Help:\n");
        for entry in &result.help_content {
            let example = entry
                .example_phrases
                .first()
                .map(String::as_str)
                .unwrap_or("");
            if example.is_empty() {
                output.push_str(&format!("    {} - {}\n", entry.title, entry.description));
            } else {
                output.push_str(&format!(
                    "    {} - {} (e.g. \"{}\")\n",
                    entry.title, entry.description, example
                ));
            }
        }
    }

    output.trim_end().to_string()
}
