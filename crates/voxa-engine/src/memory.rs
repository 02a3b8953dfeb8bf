//! In-memory reference implementation of the store traits.
//!
//! Tables live behind mutexes; in a deployment these would be database
//! tables. Usage-count updates happen under the shortcut table lock, so
//! concurrent expansions of the same shortcut never lose increments.

use crate::store::{
    AnalyticsStore, CommandLogStore, HelpStore, NewCommandLog, NewHelpContent, NewShortcut,
    ShortcutPatch, ShortcutStore, StoreError,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use time::{Date, OffsetDateTime};
use voxa_common::{CommandLog, CommandType, DailyAnalytic, HelpContent, Shortcut};

#[derive(Default)]
pub struct MemoryStore {
    shortcuts: Mutex<HashMap<u64, Shortcut>>,
    help: Mutex<HashMap<u64, HelpContent>>,
    logs: Mutex<Vec<CommandLog>>,
    analytics: Mutex<HashMap<(Date, Option<i64>), DailyAnalytic>>,
    next_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// Two shortcuts share a scope when both are global, or both belong to
/// the same user.
fn same_scope(a: &Shortcut, owner_user_id: Option<i64>, global: bool) -> bool {
    if global {
        a.global
    } else {
        !a.global && a.owner_user_id == owner_user_id
    }
}

fn phrase_eq(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

fn sorted_for_display(mut entries: Vec<HelpContent>) -> Vec<HelpContent> {
    entries.sort_by(HelpContent::display_cmp);
    entries
}

#[async_trait]
impl ShortcutStore for MemoryStore {
    async fn create_shortcut(&self, new: NewShortcut) -> Result<Shortcut, StoreError> {
        let mut table = self.shortcuts.lock().expect("shortcut table poisoned");

        if new.enabled {
            let duplicate = table.values().any(|existing| {
                existing.enabled
                    && same_scope(existing, new.owner_user_id, new.global)
                    && phrase_eq(&existing.phrase, &new.phrase)
            });
            if duplicate {
                return Err(StoreError::DuplicatePhrase { phrase: new.phrase });
            }
        }

        let shortcut = Shortcut {
            id: self.allocate_id(),
            owner_user_id: if new.global { None } else { new.owner_user_id },
            phrase: new.phrase,
            expansion: new.expansion,
            command_type: new.command_type,
            description: new.description,
            priority: new.priority,
            enabled: new.enabled,
            global: new.global,
            usage_count: 0,
            last_used: None,
        };
        table.insert(shortcut.id, shortcut.clone());
        Ok(shortcut)
    }

    async fn update_shortcut(
        &self,
        id: u64,
        patch: ShortcutPatch,
    ) -> Result<Shortcut, StoreError> {
        let mut table = self.shortcuts.lock().expect("shortcut table poisoned");

        let current = table
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound { entity: "shortcut", id })?;

        let phrase = patch.phrase.unwrap_or_else(|| current.phrase.clone());
        let enabled = patch.enabled.unwrap_or(current.enabled);

        // Re-validate uniqueness when the phrase changes (or the shortcut
        // is being re-enabled under a phrase someone else claimed).
        if enabled {
            let duplicate = table.values().any(|existing| {
                existing.id != id
                    && existing.enabled
                    && same_scope(existing, current.owner_user_id, current.global)
                    && phrase_eq(&existing.phrase, &phrase)
            });
            if duplicate {
                return Err(StoreError::DuplicatePhrase { phrase });
            }
        }

        let entry = table.get_mut(&id).ok_or(StoreError::NotFound {
            entity: "shortcut",
            id,
        })?;
        entry.phrase = phrase;
        if let Some(expansion) = patch.expansion {
            entry.expansion = expansion;
        }
        if let Some(description) = patch.description {
            entry.description = Some(description);
        }
        if let Some(priority) = patch.priority {
            entry.priority = priority;
        }
        entry.enabled = enabled;
        Ok(entry.clone())
    }

    async fn delete_shortcut(&self, id: u64) -> Result<(), StoreError> {
        let mut table = self.shortcuts.lock().expect("shortcut table poisoned");
        table
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound { entity: "shortcut", id })
    }

    async fn find_by_phrase(
        &self,
        user_id: i64,
        phrase: &str,
    ) -> Result<Option<Shortcut>, StoreError> {
        let table = self.shortcuts.lock().expect("shortcut table poisoned");
        let personal = table
            .values()
            .find(|s| s.owner_user_id == Some(user_id) && phrase_eq(&s.phrase, phrase))
            .cloned();
        if personal.is_some() {
            return Ok(personal);
        }
        Ok(table
            .values()
            .find(|s| s.global && phrase_eq(&s.phrase, phrase))
            .cloned())
    }

    async fn visible_for(&self, user_id: i64) -> Result<Vec<Shortcut>, StoreError> {
        let table = self.shortcuts.lock().expect("shortcut table poisoned");
        Ok(table
            .values()
            .filter(|s| s.global || s.owner_user_id == Some(user_id))
            .cloned()
            .collect())
    }

    async fn record_usage(&self, id: u64, now: OffsetDateTime) -> Result<(), StoreError> {
        let mut table = self.shortcuts.lock().expect("shortcut table poisoned");
        let entry = table.get_mut(&id).ok_or(StoreError::NotFound {
            entity: "shortcut",
            id,
        })?;
        entry.usage_count += 1;
        entry.last_used = Some(now);
        Ok(())
    }
}

#[async_trait]
impl HelpStore for MemoryStore {
    async fn create_help(&self, new: NewHelpContent) -> Result<HelpContent, StoreError> {
        let entry = HelpContent {
            id: self.allocate_id(),
            command_type: new.command_type,
            context_id: new.context_id,
            title: new.title,
            example_phrases: new.example_phrases,
            description: new.description,
            parameters: new.parameters,
            response_example: new.response_example,
            priority: new.priority,
            hidden: new.hidden,
        };
        let mut table = self.help.lock().expect("help table poisoned");
        table.insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn update_help(&self, entry: HelpContent) -> Result<HelpContent, StoreError> {
        let mut table = self.help.lock().expect("help table poisoned");
        if !table.contains_key(&entry.id) {
            return Err(StoreError::NotFound {
                entity: "help content",
                id: entry.id,
            });
        }
        table.insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn delete_help(&self, id: u64) -> Result<(), StoreError> {
        let mut table = self.help.lock().expect("help table poisoned");
        table.remove(&id).map(|_| ()).ok_or(StoreError::NotFound {
            entity: "help content",
            id,
        })
    }

    async fn get_help(&self, id: u64) -> Result<HelpContent, StoreError> {
        let table = self.help.lock().expect("help table poisoned");
        table.get(&id).cloned().ok_or(StoreError::NotFound {
            entity: "help content",
            id,
        })
    }

    async fn list_help(&self, include_hidden: bool) -> Result<Vec<HelpContent>, StoreError> {
        let table = self.help.lock().expect("help table poisoned");
        let entries = table
            .values()
            .filter(|e| include_hidden || !e.hidden)
            .cloned()
            .collect();
        Ok(sorted_for_display(entries))
    }

    async fn help_for_command_type(
        &self,
        command_type: CommandType,
    ) -> Result<Vec<HelpContent>, StoreError> {
        let table = self.help.lock().expect("help table poisoned");
        let entries = table
            .values()
            .filter(|e| !e.hidden && e.command_type == command_type)
            .cloned()
            .collect();
        Ok(sorted_for_display(entries))
    }

    async fn contextual_help(
        &self,
        context_id: Option<&str>,
    ) -> Result<Vec<HelpContent>, StoreError> {
        let table = self.help.lock().expect("help table poisoned");
        let entries = table
            .values()
            .filter(|e| !e.hidden)
            .filter(|e| match (&e.context_id, context_id) {
                (None, _) => true,
                (Some(scope), Some(current)) => scope == current,
                (Some(_), None) => false,
            })
            .cloned()
            .collect();
        Ok(sorted_for_display(entries))
    }

    async fn search_help(&self, query: &str) -> Result<Vec<HelpContent>, StoreError> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.list_help(false).await;
        }
        let table = self.help.lock().expect("help table poisoned");
        let entries = table
            .values()
            .filter(|e| !e.hidden)
            .filter(|e| {
                e.title.to_lowercase().contains(&needle)
                    || e.description.to_lowercase().contains(&needle)
                    || e.example_phrases
                        .iter()
                        .any(|p| p.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();
        Ok(sorted_for_display(entries))
    }
}

#[async_trait]
impl CommandLogStore for MemoryStore {
    async fn append(&self, entry: NewCommandLog) -> Result<CommandLog, StoreError> {
        let log = CommandLog {
            id: self.allocate_id(),
            session_id: entry.session_id,
            user_id: entry.user_id,
            raw_command: entry.raw_command,
            processed_command: entry.processed_command,
            command_type: entry.command_type,
            intent: entry.intent,
            confidence_score: entry.confidence_score,
            parameters: entry.parameters,
            status: entry.status,
            error_message: entry.error_message,
            response_time_ms: entry.response_time_ms,
            context_data: entry.context_data,
            device_info: entry.device_info,
            timestamp: entry.timestamp,
        };
        let mut logs = self.logs.lock().expect("log table poisoned");
        logs.push(log.clone());
        Ok(log)
    }

    async fn logs_for_day(
        &self,
        date: Date,
        user_id: Option<i64>,
    ) -> Result<Vec<CommandLog>, StoreError> {
        let logs = self.logs.lock().expect("log table poisoned");
        Ok(logs
            .iter()
            .filter(|l| l.timestamp.date() == date)
            .filter(|l| user_id.map(|u| l.user_id == u).unwrap_or(true))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AnalyticsStore for MemoryStore {
    async fn upsert_daily(&self, analytic: DailyAnalytic) -> Result<(), StoreError> {
        let mut table = self.analytics.lock().expect("analytics table poisoned");
        table.insert((analytic.date, analytic.user_id), analytic);
        Ok(())
    }

    async fn daily(
        &self,
        date: Date,
        user_id: Option<i64>,
    ) -> Result<Option<DailyAnalytic>, StoreError> {
        let table = self.analytics.lock().expect("analytics table poisoned");
        Ok(table.get(&(date, user_id)).cloned())
    }
}
