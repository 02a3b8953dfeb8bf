//! Persistence boundary of the pipeline.
//!
//! The core does not prescribe a storage engine; these traits are the
//! contract it assumes. [`crate::memory::MemoryStore`] is the reference
//! implementation; a database-backed store would implement the same
//! traits.

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use time::{Date, OffsetDateTime};
use voxa_common::{
    CommandLog, CommandStatus, CommandType, DailyAnalytic, HelpContent, Shortcut,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("an enabled shortcut with phrase '{phrase}' already exists in this scope")]
    DuplicatePhrase { phrase: String },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Fields for a shortcut to be created. Global shortcuts have no owner.
#[derive(Debug, Clone)]
pub struct NewShortcut {
    pub owner_user_id: Option<i64>,
    pub phrase: String,
    pub expansion: String,
    pub command_type: CommandType,
    pub description: Option<String>,
    pub priority: i32,
    pub enabled: bool,
    pub global: bool,
}

/// Partial update for a shortcut; `None` fields are left untouched.
/// A phrase change re-validates uniqueness within the shortcut's scope.
#[derive(Debug, Clone, Default)]
pub struct ShortcutPatch {
    pub phrase: Option<String>,
    pub expansion: Option<String>,
    pub description: Option<String>,
    pub priority: Option<i32>,
    pub enabled: Option<bool>,
}

#[async_trait]
pub trait ShortcutStore: Send + Sync {
    async fn create_shortcut(&self, new: NewShortcut) -> Result<Shortcut, StoreError>;

    async fn update_shortcut(&self, id: u64, patch: ShortcutPatch)
        -> Result<Shortcut, StoreError>;

    async fn delete_shortcut(&self, id: u64) -> Result<(), StoreError>;

    /// Personal scope first, global as the fallback. Case-insensitive.
    async fn find_by_phrase(
        &self,
        user_id: i64,
        phrase: &str,
    ) -> Result<Option<Shortcut>, StoreError>;

    /// Everything expansion may consider for this user: their own
    /// shortcuts plus all global ones, enabled or not.
    async fn visible_for(&self, user_id: i64) -> Result<Vec<Shortcut>, StoreError>;

    /// Bump `usage_count` and set `last_used`. The increment must not lose
    /// updates under concurrent expansion of the same shortcut.
    async fn record_usage(&self, id: u64, now: OffsetDateTime) -> Result<(), StoreError>;
}

/// Fields for a help entry to be created.
#[derive(Debug, Clone)]
pub struct NewHelpContent {
    pub command_type: CommandType,
    pub context_id: Option<String>,
    pub title: String,
    pub example_phrases: Vec<String>,
    pub description: String,
    pub parameters: std::collections::BTreeMap<String, String>,
    pub response_example: Option<String>,
    pub priority: i32,
    pub hidden: bool,
}

/// All list/contextual/search results come back in display order:
/// priority desc, command type asc, title asc.
#[async_trait]
pub trait HelpStore: Send + Sync {
    async fn create_help(&self, new: NewHelpContent) -> Result<HelpContent, StoreError>;

    /// Full replace by `entry.id`.
    async fn update_help(&self, entry: HelpContent) -> Result<HelpContent, StoreError>;

    async fn delete_help(&self, id: u64) -> Result<(), StoreError>;

    async fn get_help(&self, id: u64) -> Result<HelpContent, StoreError>;

    async fn list_help(&self, include_hidden: bool) -> Result<Vec<HelpContent>, StoreError>;

    async fn help_for_command_type(
        &self,
        command_type: CommandType,
    ) -> Result<Vec<HelpContent>, StoreError>;

    /// Entries scoped to the given context plus all global entries.
    /// With no context, only global entries are returned.
    async fn contextual_help(
        &self,
        context_id: Option<&str>,
    ) -> Result<Vec<HelpContent>, StoreError>;

    /// Case-insensitive free-text search over title, description and
    /// example phrases.
    async fn search_help(&self, query: &str) -> Result<Vec<HelpContent>, StoreError>;
}

/// One command log entry before it is assigned an id.
#[derive(Debug, Clone)]
pub struct NewCommandLog {
    pub session_id: String,
    pub user_id: i64,
    pub raw_command: String,
    pub processed_command: Option<String>,
    pub command_type: CommandType,
    pub intent: Option<String>,
    pub confidence_score: f64,
    pub parameters: HashMap<String, String>,
    pub status: CommandStatus,
    pub error_message: Option<String>,
    pub response_time_ms: u64,
    pub context_data: HashMap<String, serde_json::Value>,
    pub device_info: HashMap<String, serde_json::Value>,
    pub timestamp: OffsetDateTime,
}

#[async_trait]
pub trait CommandLogStore: Send + Sync {
    /// Append an immutable log row. Logs are never updated.
    async fn append(&self, entry: NewCommandLog) -> Result<CommandLog, StoreError>;

    /// All logs whose timestamp falls on `date`; `user_id = None` spans
    /// every user (used for the global rollup).
    async fn logs_for_day(
        &self,
        date: Date,
        user_id: Option<i64>,
    ) -> Result<Vec<CommandLog>, StoreError>;
}

#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    /// Replace the (date, user) row wholesale with a fresh recompute.
    async fn upsert_daily(&self, analytic: DailyAnalytic) -> Result<(), StoreError>;

    async fn daily(
        &self,
        date: Date,
        user_id: Option<i64>,
    ) -> Result<Option<DailyAnalytic>, StoreError>;
}
