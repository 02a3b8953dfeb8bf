//! Structured recovery guidance for every failure path.
//!
//! Each taxonomy entry gets a uniform `Guidance`: a stable error code, a
//! user-facing message, suggested phrasings, alternative commands and the
//! help entries worth showing. Lookups fall back to global help content;
//! a broken help store degrades to guidance without help rather than an
//! error, so recovery itself can never fail the pipeline.

use crate::store::HelpStore;
use std::sync::Arc;
use tracing::warn;
use voxa_common::{CommandStatus, CommandType, HelpContent};
use voxa_core::suggest;

/// Representative phrasings offered whenever a command is not understood.
const ALTERNATIVE_COMMANDS: &[&str] = &[
    "go to dashboard",
    "assess property 1024",
    "show me all properties",
    "start the approval workflow",
    "generate code to export this report",
    "help",
];

/// Uniform recovery payload folded into the final `CommandResult`.
#[derive(Debug, Clone)]
pub struct Guidance {
    /// Stable taxonomy code, e.g. `NOT_RECOGNIZED`.
    pub code: &'static str,
    pub status: CommandStatus,
    pub message: String,
    pub suggestions: Vec<String>,
    pub alternative_commands: Vec<String>,
    pub help_content: Vec<HelpContent>,
}

pub struct Recovery {
    help: Arc<dyn HelpStore>,
    max_suggestions: usize,
    max_help_entries: usize,
}

impl Recovery {
    pub fn new(help: Arc<dyn HelpStore>, max_suggestions: usize, max_help_entries: usize) -> Self {
        Self {
            help,
            max_suggestions,
            max_help_entries,
        }
    }

    async fn contextual_help(&self, context_id: Option<&str>) -> Vec<HelpContent> {
        match self.help.contextual_help(context_id).await {
            Ok(mut entries) => {
                entries.truncate(self.max_help_entries);
                entries
            }
            Err(err) => {
                warn!(error = %err, "help lookup failed during recovery");
                Vec::new()
            }
        }
    }

    async fn help_for(&self, command_type: CommandType) -> Vec<HelpContent> {
        match self.help.help_for_command_type(command_type).await {
            Ok(mut entries) => {
                entries.truncate(self.max_help_entries);
                entries
            }
            Err(err) => {
                warn!(error = %err, "help lookup failed during recovery");
                Vec::new()
            }
        }
    }

    /// No rule matched, confidence fell below the gate, or dispatch found
    /// no handler.
    pub async fn not_recognized(&self, raw: &str, context_id: Option<&str>) -> Guidance {
        let help_content = self.contextual_help(context_id).await;
        let candidates = help_content
            .iter()
            .flat_map(|h| h.example_phrases.iter().cloned())
            .chain(ALTERNATIVE_COMMANDS.iter().map(|s| s.to_string()));
        let suggestions = suggest::rank(raw, candidates, self.max_suggestions);

        Guidance {
            code: "NOT_RECOGNIZED",
            status: CommandStatus::Ambiguous,
            message: "I didn't understand that command. Try one of the suggestions, or say 'help' to see what you can do.".to_string(),
            suggestions,
            alternative_commands: ALTERNATIVE_COMMANDS.iter().map(|s| s.to_string()).collect(),
            help_content,
        }
    }

    /// A required field for the classified intent is absent. Help is
    /// looked up contextually first, then by command type.
    pub async fn missing_parameter(
        &self,
        command_type: CommandType,
        parameter: &str,
        context_id: Option<&str>,
    ) -> Guidance {
        let (message, example) = match parameter {
            "destination" => (
                "Tell me where to go.".to_string(),
                Some("go to dashboard"),
            ),
            "property_id" => (
                "Include the property id so I know which property you mean.".to_string(),
                Some("assess property 1024"),
            ),
            other => (
                format!("The command is missing its '{}' parameter.", other),
                None,
            ),
        };

        let mut help_content = self.contextual_help(context_id).await;
        help_content.retain(|h| h.command_type == command_type);
        if help_content.is_empty() {
            help_content = self.help_for(command_type).await;
        }

        Guidance {
            code: "MISSING_PARAMETER",
            status: CommandStatus::Ambiguous,
            message,
            suggestions: example.into_iter().map(|s| s.to_string()).collect(),
            alternative_commands: Vec::new(),
            help_content,
        }
    }

    /// Handler reported a missing permission.
    pub fn permission_denied(&self, permission: &str) -> Guidance {
        Guidance {
            code: "PERMISSION_DENIED",
            status: CommandStatus::Failed,
            message: format!(
                "You need the '{}' permission to run this command.",
                permission
            ),
            suggestions: vec!["Ask an administrator to grant you access.".to_string()],
            alternative_commands: Vec::new(),
            help_content: Vec::new(),
        }
    }

    /// Handler reported rate limiting. The pipeline never retries on its
    /// own; the user is told to.
    pub fn rate_limited(&self, retry_after_secs: Option<u64>) -> Guidance {
        let message = match retry_after_secs {
            Some(secs) => format!(
                "That command is rate limited right now. Try again in about {} seconds.",
                secs
            ),
            None => "That command is rate limited right now. Wait a moment and try again."
                .to_string(),
        };
        Guidance {
            code: "RATE_LIMITED",
            status: CommandStatus::Failed,
            message,
            suggestions: vec!["Wait a moment, then repeat the command.".to_string()],
            alternative_commands: Vec::new(),
            help_content: Vec::new(),
        }
    }

    /// Handler rejected a parameter value.
    pub fn invalid_parameter(
        &self,
        parameter: &str,
        value: &str,
        valid_values: &[String],
    ) -> Guidance {
        let message = if valid_values.is_empty() {
            format!("'{}' is not a valid value for '{}'.", value, parameter)
        } else {
            format!(
                "'{}' is not a valid value for '{}'. Valid values: {}.",
                value,
                parameter,
                valid_values.join(", ")
            )
        };
        Guidance {
            code: "INVALID_PARAMETER",
            status: CommandStatus::Failed,
            message,
            suggestions: valid_values.iter().take(3).cloned().collect(),
            alternative_commands: Vec::new(),
            help_content: Vec::new(),
        }
    }

    /// Anything unexpected, anywhere in the pipeline. The user never sees
    /// the underlying error text.
    pub fn system_error(&self) -> Guidance {
        Guidance {
            code: "SYSTEM_ERROR",
            status: CommandStatus::Failed,
            message: "Something went wrong while processing that command. Please try again."
                .to_string(),
            suggestions: vec![
                "Repeat the command.".to_string(),
                "Say 'help' to see available commands.".to_string(),
            ],
            alternative_commands: Vec::new(),
            help_content: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::store::NewHelpContent;
    use std::collections::BTreeMap;

    fn help_entry(title: &str, phrases: &[&str], context_id: Option<&str>) -> NewHelpContent {
        NewHelpContent {
            command_type: CommandType::Navigation,
            context_id: context_id.map(|s| s.to_string()),
            title: title.to_string(),
            example_phrases: phrases.iter().map(|s| s.to_string()).collect(),
            description: String::new(),
            parameters: BTreeMap::new(),
            response_example: None,
            priority: 0,
            hidden: false,
        }
    }

    #[tokio::test]
    async fn not_recognized_carries_suggestions_and_contextual_help() {
        let store = Arc::new(MemoryStore::new());
        store
            .create_help(help_entry("Navigation", &["go to dashboard"], None))
            .await
            .unwrap();
        store
            .create_help(help_entry("Valuation", &["assess property 1"], Some("valuation")))
            .await
            .unwrap();

        let recovery = Recovery::new(store, 3, 5);
        let guidance = recovery.not_recognized("go to dashbord", Some("valuation")).await;

        assert_eq!(guidance.code, "NOT_RECOGNIZED");
        assert_eq!(guidance.status, CommandStatus::Ambiguous);
        assert_eq!(guidance.suggestions[0], "go to dashboard");
        assert_eq!(guidance.help_content.len(), 2);
        assert!(!guidance.alternative_commands.is_empty());
    }

    #[tokio::test]
    async fn missing_parameter_names_the_field() {
        let store = Arc::new(MemoryStore::new());
        let recovery = Recovery::new(store, 3, 5);

        let guidance = recovery
            .missing_parameter(CommandType::PropertyAssessment, "property_id", None)
            .await;
        assert_eq!(guidance.code, "MISSING_PARAMETER");
        assert!(guidance.message.contains("property id"));
        assert_eq!(guidance.suggestions, vec!["assess property 1024".to_string()]);
    }

    #[test]
    fn handler_error_guidance() {
        let recovery = Recovery::new(Arc::new(MemoryStore::new()), 3, 5);

        let g = recovery.permission_denied("valuation.run");
        assert_eq!(g.code, "PERMISSION_DENIED");
        assert!(g.message.contains("valuation.run"));
        assert_eq!(g.status, CommandStatus::Failed);

        let g = recovery.rate_limited(Some(30));
        assert!(g.message.contains("30"));

        let valid = vec!["approval".to_string(), "onboarding".to_string()];
        let g = recovery.invalid_parameter("workflow_type", "bogus", &valid);
        assert!(g.message.contains("bogus"));
        assert!(g.message.contains("approval"));
    }
}
