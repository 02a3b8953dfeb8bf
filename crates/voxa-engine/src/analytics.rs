//! Command logging and daily rollups.
//!
//! `record` appends the immutable log row and kicks the per-user and
//! global recomputes onto a background task: the caller's response never
//! waits on analytics, and an analytics failure never degrades it.
//!
//! A rollup is always rebuilt in full from that day's logs and then
//! upserted. Under concurrent writers for the same (date, user) two
//! recomputes can interleave and the later upsert wins, reflecting only
//! the logs visible at its own read time. That window is inherent to the
//! read-all/recompute/upsert contract and is pinned by a test; switching
//! to incremental counters would change the aggregate semantics.

use crate::store::{AnalyticsStore, CommandLogStore, NewCommandLog, StoreError};
use std::collections::HashMap;
use std::sync::Arc;
use time::Date;
use tracing::warn;
use voxa_common::{CommandCount, CommandLog, CommandStatus, DailyAnalytic};

/// Tuning for the aggregator, normally taken from
/// [`crate::config::AnalyticsConfig`].
#[derive(Clone)]
pub struct AnalyticsAggregator {
    logs: Arc<dyn CommandLogStore>,
    rollups: Arc<dyn AnalyticsStore>,
    enabled: bool,
    top_list_size: usize,
}

impl AnalyticsAggregator {
    pub fn new(
        logs: Arc<dyn CommandLogStore>,
        rollups: Arc<dyn AnalyticsStore>,
        enabled: bool,
        top_list_size: usize,
    ) -> Self {
        Self {
            logs,
            rollups,
            enabled,
            top_list_size,
        }
    }

    /// Fire-and-forget: append the log and trigger the rollups in the
    /// background. Failures are logged and dropped.
    pub fn record(&self, entry: NewCommandLog) {
        if !self.enabled {
            return;
        }
        let aggregator = self.clone();
        tokio::spawn(async move {
            if let Err(err) = aggregator.ingest(entry).await {
                warn!(error = %err, "analytics write failed; entry dropped");
            }
        });
    }

    /// Synchronous variant of [`Self::record`]: append, then recompute the
    /// user's rollup and the global rollup for the entry's day.
    pub async fn ingest(&self, entry: NewCommandLog) -> Result<(), StoreError> {
        let log = self.logs.append(entry).await?;
        let date = log.timestamp.date();
        self.recompute(date, Some(log.user_id)).await?;
        self.recompute(date, None).await?;
        Ok(())
    }

    /// Rebuild one (date, user) rollup from scratch and upsert it.
    /// `user_id = None` recomputes the global aggregate over all users.
    pub async fn recompute(
        &self,
        date: Date,
        user_id: Option<i64>,
    ) -> Result<DailyAnalytic, StoreError> {
        let logs = self.logs.logs_for_day(date, user_id).await?;
        let analytic = build_daily(date, user_id, &logs, self.top_list_size);
        self.rollups.upsert_daily(analytic.clone()).await?;
        Ok(analytic)
    }
}

/// Compute every rollup field from the given day's logs.
pub fn build_daily(
    date: Date,
    user_id: Option<i64>,
    logs: &[CommandLog],
    top_list_size: usize,
) -> DailyAnalytic {
    let total = logs.len() as u64;
    let successful = count_status(logs, CommandStatus::Success);
    let failed = count_status(logs, CommandStatus::Failed);
    let ambiguous = count_status(logs, CommandStatus::Ambiguous);

    let avg_response_time_ms = if logs.is_empty() {
        None
    } else {
        let sum: u64 = logs.iter().map(|l| l.response_time_ms).sum();
        Some(sum as f64 / logs.len() as f64)
    };
    let avg_confidence_score = if logs.is_empty() {
        None
    } else {
        let sum: f64 = logs.iter().map(|l| l.confidence_score).sum();
        Some(sum / logs.len() as f64)
    };

    let mut command_type_counts = HashMap::new();
    for log in logs {
        *command_type_counts.entry(log.command_type).or_insert(0) += 1;
    }

    let top_commands = top_by_count(logs.iter().map(|l| l.raw_command.as_str()), top_list_size);
    let top_error_triggers = top_by_count(
        logs.iter()
            .filter(|l| l.status == CommandStatus::Failed)
            .map(|l| l.raw_command.as_str()),
        top_list_size,
    );

    DailyAnalytic {
        date,
        user_id,
        total_commands: total,
        successful_commands: successful,
        failed_commands: failed,
        ambiguous_commands: ambiguous,
        avg_response_time_ms,
        avg_confidence_score,
        command_type_counts,
        top_commands,
        top_error_triggers,
    }
}

fn count_status(logs: &[CommandLog], status: CommandStatus) -> u64 {
    logs.iter().filter(|l| l.status == status).count() as u64
}

/// Count occurrences and keep the most frequent, count desc with the
/// command text as the deterministic tie-break.
fn top_by_count<'a>(commands: impl Iterator<Item = &'a str>, cap: usize) -> Vec<CommandCount> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for command in commands {
        *counts.entry(command).or_insert(0) += 1;
    }
    let mut ranked: Vec<CommandCount> = counts
        .into_iter()
        .map(|(command, count)| CommandCount {
            command: command.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.command.cmp(&b.command)));
    ranked.truncate(cap);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use time::macros::datetime;
    use voxa_common::CommandType;

    fn log(raw: &str, status: CommandStatus) -> CommandLog {
        CommandLog {
            id: 0,
            session_id: "s".into(),
            user_id: 1,
            raw_command: raw.to_string(),
            processed_command: None,
            command_type: CommandType::DataQuery,
            intent: None,
            confidence_score: 0.8,
            parameters: HashMap::new(),
            status,
            error_message: None,
            response_time_ms: 10,
            context_data: HashMap::new(),
            device_info: HashMap::new(),
            timestamp: datetime!(2026-03-04 12:00 UTC),
        }
    }

    #[test]
    fn empty_day_has_no_averages() {
        let analytic = build_daily(datetime!(2026-03-04 0:00 UTC).date(), Some(1), &[], 10);
        assert_eq!(analytic.total_commands, 0);
        assert!(analytic.avg_response_time_ms.is_none());
        assert!(analytic.avg_confidence_score.is_none());
        assert!(analytic.top_commands.is_empty());
    }

    #[test]
    fn top_lists_rank_and_cap() {
        let mut logs = Vec::new();
        for _ in 0..3 {
            logs.push(log("alpha", CommandStatus::Success));
        }
        logs.push(log("beta", CommandStatus::Failed));
        logs.push(log("beta", CommandStatus::Failed));
        logs.push(log("gamma", CommandStatus::Failed));

        let analytic = build_daily(datetime!(2026-03-04 0:00 UTC).date(), Some(1), &logs, 2);
        assert_eq!(analytic.top_commands.len(), 2);
        assert_eq!(analytic.top_commands[0].command, "alpha");
        assert_eq!(analytic.top_commands[0].count, 3);
        assert_eq!(analytic.top_commands[1].command, "beta");

        // Error triggers only count FAILED commands.
        assert_eq!(analytic.top_error_triggers.len(), 2);
        assert_eq!(analytic.top_error_triggers[0].command, "beta");
        assert_eq!(analytic.top_error_triggers[0].count, 2);
        assert_eq!(analytic.top_error_triggers[1].command, "gamma");
    }

    #[test]
    fn status_breakdown_and_averages() {
        let logs = vec![
            log("a", CommandStatus::Success),
            log("b", CommandStatus::Failed),
            log("c", CommandStatus::Ambiguous),
            log("d", CommandStatus::Success),
        ];
        let analytic = build_daily(datetime!(2026-03-04 0:00 UTC).date(), None, &logs, 10);
        assert_eq!(analytic.total_commands, 4);
        assert_eq!(analytic.successful_commands, 2);
        assert_eq!(analytic.failed_commands, 1);
        assert_eq!(analytic.ambiguous_commands, 1);
        assert_eq!(analytic.avg_response_time_ms, Some(10.0));
        assert_eq!(analytic.command_type_counts.get(&CommandType::DataQuery), Some(&4));
    }
}
