//! Shared request/response types for the command pipeline.
//!
//! Every interpreted phrase enters the pipeline wrapped in a [`CommandContext`]
//! and leaves it as a [`CommandResult`]. Domain handlers sit behind the
//! [`HandlerResponse`]/[`HandlerError`] contract; the pipeline only ever
//! inspects the error *variant*, never a stringly-typed error field.

use crate::model::HelpContent;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Coarse command category used for routing and parameter rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandType {
    Navigation,
    PropertyAssessment,
    DataQuery,
    System,
    Workflow,
    CodingAssistance,
}

impl CommandType {
    /// Stable string form, used for map keys, logs and display ordering.
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandType::Navigation => "navigation",
            CommandType::PropertyAssessment => "property-assessment",
            CommandType::DataQuery => "data-query",
            CommandType::System => "system",
            CommandType::Workflow => "workflow",
            CommandType::CodingAssistance => "coding-assistance",
        }
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal status of one processed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandStatus {
    Success,
    Failed,
    Ambiguous,
}

impl CommandStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandStatus::Success => "SUCCESS",
            CommandStatus::Failed => "FAILED",
            CommandStatus::Ambiguous => "AMBIGUOUS",
        }
    }
}

impl fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied context for one command.
///
/// The coding-assistance fields are only consumed by that path; everything
/// else ignores them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandContext {
    pub user_id: i64,
    pub session_id: String,
    /// Current UI/domain context, used for contextual help lookups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,
    /// Opaque device descriptor, carried through to the command log.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub device_info: HashMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clipboard_content: Option<String>,
}

impl CommandContext {
    pub fn new(user_id: i64, session_id: impl Into<String>) -> Self {
        Self {
            user_id,
            session_id: session_id.into(),
            context_id: None,
            device_info: HashMap::new(),
            current_file: None,
            selected_code: None,
            project_language: None,
            error_message: None,
            clipboard_content: None,
        }
    }

    pub fn with_context_id(mut self, context_id: impl Into<String>) -> Self {
        self.context_id = Some(context_id.into());
        self
    }
}

/// Uniform outcome of one pipeline execution.
///
/// The pipeline entry point never fails: every error condition is folded
/// into one of these, with `error` carrying the taxonomy code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    pub status: CommandStatus,
    pub response_time_ms: u64,
    pub command_type: CommandType,
    pub confidence_score: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternative_commands: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub help_content: Vec<HelpContent>,
}

/// Successful payload returned by a domain handler.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HandlerResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl HandlerResponse {
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }
}

/// Failure reported by a domain handler, one variant per recovery path.
#[derive(Debug, Clone, thiserror::Error)]
pub enum HandlerError {
    #[error("permission '{permission}' required")]
    PermissionDenied { permission: String },

    #[error("rate limited")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("invalid value '{value}' for parameter '{parameter}'")]
    InvalidParameter {
        parameter: String,
        value: String,
        /// Valid set, when the handler knows it.
        valid_values: Vec<String>,
    },

    /// No handler implements this command; routed to the not-recognized path.
    #[error("not supported: {0}")]
    NotSupported(String),

    #[error("{0}")]
    Other(String),
}

impl HandlerError {
    /// Stable taxonomy code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            HandlerError::PermissionDenied { .. } => "PERMISSION_DENIED",
            HandlerError::RateLimited { .. } => "RATE_LIMITED",
            HandlerError::InvalidParameter { .. } => "INVALID_PARAMETER",
            HandlerError::NotSupported(_) => "NOT_RECOGNIZED",
            HandlerError::Other(_) => "SYSTEM_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_type_round_trips_through_serde() {
        let json = serde_json::to_string(&CommandType::PropertyAssessment).unwrap();
        assert_eq!(json, "\"property-assessment\"");
        let back: CommandType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, CommandType::PropertyAssessment);
    }

    #[test]
    fn status_serializes_screaming() {
        assert_eq!(
            serde_json::to_string(&CommandStatus::Ambiguous).unwrap(),
            "\"AMBIGUOUS\""
        );
    }

    #[test]
    fn handler_error_codes() {
        let err = HandlerError::PermissionDenied {
            permission: "valuation.run".into(),
        };
        assert_eq!(err.code(), "PERMISSION_DENIED");
        assert_eq!(HandlerError::NotSupported("x".into()).code(), "NOT_RECOGNIZED");
        assert_eq!(HandlerError::Other("boom".into()).code(), "SYSTEM_ERROR");
    }
}
