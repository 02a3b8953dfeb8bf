//! Persistent data model: shortcuts, help content, command logs and
//! daily rollups.
//!
//! These are the rows the stores own. `CommandLog` is append-only; a
//! `DailyAnalytic` row is always recomputed in full from that day's logs,
//! never patched incrementally.

use crate::protocol::{CommandStatus, CommandType};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use time::{Date, OffsetDateTime};

/// A user- or globally-defined trigger phrase that expands to a longer
/// command before classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shortcut {
    pub id: u64,
    /// None for global shortcuts.
    pub owner_user_id: Option<i64>,
    /// Unique (case-insensitive) among enabled shortcuts of one scope.
    pub phrase: String,
    pub expansion: String,
    pub command_type: CommandType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Higher wins equal-length ties during expansion.
    pub priority: i32,
    pub enabled: bool,
    pub global: bool,
    pub usage_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used: Option<OffsetDateTime>,
}

/// One searchable help entry, optionally scoped to a UI/domain context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelpContent {
    pub id: u64,
    pub command_type: CommandType,
    /// None means the entry is global and shows up in every context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,
    pub title: String,
    pub example_phrases: Vec<String>,
    pub description: String,
    /// Parameter name -> human description.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_example: Option<String>,
    pub priority: i32,
    pub hidden: bool,
}

impl HelpContent {
    /// Display ordering: priority desc, then command type asc, then title asc.
    pub fn display_cmp(a: &HelpContent, b: &HelpContent) -> Ordering {
        b.priority
            .cmp(&a.priority)
            .then_with(|| a.command_type.as_str().cmp(b.command_type.as_str()))
            .then_with(|| a.title.cmp(&b.title))
    }
}

/// One immutable row per processed command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandLog {
    pub id: u64,
    pub session_id: String,
    pub user_id: i64,
    pub raw_command: String,
    /// Post-expansion text; None when expansion changed nothing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_command: Option<String>,
    pub command_type: CommandType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    pub confidence_score: f64,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub parameters: HashMap<String, String>,
    pub status: CommandStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub response_time_ms: u64,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context_data: HashMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub device_info: HashMap<String, serde_json::Value>,
    pub timestamp: OffsetDateTime,
}

/// A ranked (command, count) pair in a rollup top-list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandCount {
    pub command: String,
    pub count: u64,
}

/// Per-(date, user) aggregate recomputed from that day's command logs.
/// `user_id = None` is the global aggregate over all users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyAnalytic {
    pub date: Date,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub total_commands: u64,
    pub successful_commands: u64,
    pub failed_commands: u64,
    pub ambiguous_commands: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_response_time_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_confidence_score: Option<f64>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub command_type_counts: HashMap<CommandType, u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub top_commands: Vec<CommandCount>,
    /// Same shape as `top_commands`, FAILED-status commands only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub top_error_triggers: Vec<CommandCount>,
}
