//! The command pipeline orchestrator.
//!
//! One call runs the full pipeline: expand → classify → score →
//! (reject below threshold) → extract → (reject on missing required
//! parameter) → dispatch → complete/fail. Every terminal state yields a
//! structured [`CommandResult`] and a log entry; `process` itself never
//! returns an error and never panics outward. System/help commands are
//! answered in-house from the help repository; everything else goes to
//! the registered domain handler for the command type.

use crate::analytics::AnalyticsAggregator;
use crate::config::{ProcessorConfig, VoxaConfig};
use crate::expand;
use crate::handler::HandlerRegistry;
use crate::recovery::{Guidance, Recovery};
use crate::store::{
    AnalyticsStore, CommandLogStore, HelpStore, NewCommandLog, ShortcutStore, StoreError,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use time::OffsetDateTime;
use tracing::{debug, error};
use voxa_common::{
    CommandContext, CommandResult, CommandStatus, CommandType, HandlerError,
};
use voxa_core::classifier::{classify, Classification};
use voxa_core::extractor::{extract, required_parameters};
use voxa_core::scorer::score;

pub struct CommandProcessor {
    shortcuts: Arc<dyn ShortcutStore>,
    help: Arc<dyn HelpStore>,
    handlers: HandlerRegistry,
    recovery: Recovery,
    analytics: AnalyticsAggregator,
    config: ProcessorConfig,
}

impl CommandProcessor {
    pub fn new(
        shortcuts: Arc<dyn ShortcutStore>,
        help: Arc<dyn HelpStore>,
        logs: Arc<dyn CommandLogStore>,
        rollups: Arc<dyn AnalyticsStore>,
        handlers: HandlerRegistry,
        config: VoxaConfig,
    ) -> Self {
        let recovery = Recovery::new(
            help.clone(),
            config.processor.max_suggestions,
            config.processor.max_help_entries,
        );
        let analytics = AnalyticsAggregator::new(
            logs,
            rollups,
            config.analytics.enabled,
            config.analytics.top_list_size,
        );
        Self {
            shortcuts,
            help,
            handlers,
            recovery,
            analytics,
            config: config.processor,
        }
    }

    /// Access to the aggregator, mainly so callers can run deterministic
    /// rollup recomputes.
    pub fn analytics(&self) -> &AnalyticsAggregator {
        &self.analytics
    }

    /// Run one raw phrase through the pipeline. Infallible: every error
    /// path is folded into the returned result.
    pub async fn process(&self, raw: &str, context: &CommandContext) -> CommandResult {
        let started = Instant::now();
        let now = OffsetDateTime::now_utc();

        let (mut result, processed, parameters) = match self.run(raw, context).await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(error = %err, "pipeline failure");
                let guidance = self.recovery.system_error();
                (
                    result_from_guidance(guidance, CommandType::System, None, 0.0),
                    None,
                    HashMap::new(),
                )
            }
        };
        result.response_time_ms = started.elapsed().as_millis() as u64;

        // Fire-and-forget; the response does not wait for the log write.
        self.analytics.record(NewCommandLog {
            session_id: context.session_id.clone(),
            user_id: context.user_id,
            raw_command: raw.to_string(),
            processed_command: processed,
            command_type: result.command_type,
            intent: result.intent.clone(),
            confidence_score: result.confidence_score,
            parameters,
            status: result.status,
            error_message: result.error.clone(),
            response_time_ms: result.response_time_ms,
            context_data: context_data_of(context),
            device_info: context.device_info.clone(),
            timestamp: now,
        });

        result
    }

    async fn run(
        &self,
        raw: &str,
        context: &CommandContext,
    ) -> Result<(CommandResult, Option<String>, HashMap<String, String>), StoreError> {
        let expansion = expand::expand_command(
            self.shortcuts.as_ref(),
            context.user_id,
            raw,
            OffsetDateTime::now_utc(),
        )
        .await?;
        let text = expansion.text.clone();
        let processed = if expansion.changed {
            Some(text.clone())
        } else {
            None
        };
        if expansion.changed {
            debug!(raw, expanded = %text, "shortcut expansion applied");
        }

        let classification = classify(&text);
        let parameters = extract(&classification);
        let confidence = score(&text, &classification, &parameters);
        debug!(
            command_type = %classification.command_type,
            intent = classification.intent.as_deref().unwrap_or("-"),
            confidence,
            "classified"
        );

        if confidence < self.config.confidence_threshold {
            let guidance = self
                .recovery
                .not_recognized(&text, context.context_id.as_deref())
                .await;
            let result = result_from_guidance(
                guidance,
                classification.command_type,
                classification.intent,
                confidence,
            );
            return Ok((result, processed, parameters));
        }

        if let Some(missing) = first_missing_parameter(&classification, &parameters) {
            let guidance = self
                .recovery
                .missing_parameter(
                    classification.command_type,
                    missing,
                    context.context_id.as_deref(),
                )
                .await;
            let result = result_from_guidance(
                guidance,
                classification.command_type,
                classification.intent,
                confidence,
            );
            return Ok((result, processed, parameters));
        }

        if classification.command_type == CommandType::System {
            let result = self
                .handle_system(&text, &classification, &parameters, context, confidence)
                .await?;
            return Ok((result, processed, parameters));
        }

        let result = self
            .dispatch(&text, &classification, &parameters, context, confidence)
            .await;
        Ok((result, processed, parameters))
    }

    /// System intents are answered by the orchestrator itself.
    async fn handle_system(
        &self,
        text: &str,
        classification: &Classification,
        parameters: &HashMap<String, String>,
        context: &CommandContext,
        confidence: f64,
    ) -> Result<CommandResult, StoreError> {
        match classification.intent.as_deref() {
            Some("system.help") => {
                let entries = match parameters.get("topic").filter(|t| !t.is_empty()) {
                    Some(topic) => self.help.search_help(topic).await?,
                    None => self.help.contextual_help(context.context_id.as_deref()).await?,
                };
                let entries: Vec<_> = entries
                    .into_iter()
                    .take(self.config.max_help_entries)
                    .collect();
                let message = if entries.is_empty() {
                    "No help entries match that topic. Say 'help' on its own to see everything available.".to_string()
                } else {
                    "Here is what you can say.".to_string()
                };
                Ok(CommandResult {
                    success: true,
                    intent: classification.intent.clone(),
                    result: serde_json::to_value(&entries).ok(),
                    message: Some(message),
                    error: None,
                    suggestions: Vec::new(),
                    status: CommandStatus::Success,
                    response_time_ms: 0,
                    command_type: CommandType::System,
                    confidence_score: confidence,
                    alternative_commands: Vec::new(),
                    help_content: entries,
                })
            }
            Some("system.create_shortcut") => Ok(CommandResult {
                success: true,
                intent: classification.intent.clone(),
                result: None,
                message: Some(
                    "Shortcuts are created from the shortcut settings: pick a trigger phrase, the command it expands to, and a priority.".to_string(),
                ),
                error: None,
                suggestions: Vec::new(),
                status: CommandStatus::Success,
                response_time_ms: 0,
                command_type: CommandType::System,
                confidence_score: confidence,
                alternative_commands: Vec::new(),
                help_content: Vec::new(),
            }),
            _ => {
                let guidance = self
                    .recovery
                    .not_recognized(text, context.context_id.as_deref())
                    .await;
                Ok(result_from_guidance(
                    guidance,
                    CommandType::System,
                    classification.intent.clone(),
                    confidence,
                ))
            }
        }
    }

    /// Hand a command to the registered domain handler and fold its
    /// outcome into a result. The handler runs on its own task so a
    /// panicking handler degrades to a SystemError response instead of
    /// tearing down the request.
    async fn dispatch(
        &self,
        text: &str,
        classification: &Classification,
        parameters: &HashMap<String, String>,
        context: &CommandContext,
        confidence: f64,
    ) -> CommandResult {
        let command_type = classification.command_type;
        let intent = classification.intent.clone();

        let Some(handler) = self.handlers.get(command_type) else {
            let guidance = self
                .recovery
                .not_recognized(text, context.context_id.as_deref())
                .await;
            return result_from_guidance(guidance, command_type, intent, confidence);
        };

        let command = text.to_string();
        let handler_intent = intent.clone();
        let handler_params = parameters.clone();
        let handler_context = context.clone();
        let joined = tokio::spawn(async move {
            handler
                .handle(
                    &command,
                    command_type,
                    handler_intent.as_deref(),
                    &handler_params,
                    &handler_context,
                )
                .await
        })
        .await;

        let outcome = match joined {
            Ok(outcome) => outcome,
            Err(join_err) => {
                error!(error = %join_err, command_type = %command_type, "domain handler crashed");
                Err(HandlerError::Other("handler crashed".to_string()))
            }
        };

        match outcome {
            Ok(response) => CommandResult {
                success: true,
                intent,
                result: response.result,
                message: response.message,
                error: None,
                suggestions: response.suggestions,
                status: CommandStatus::Success,
                response_time_ms: 0,
                command_type,
                confidence_score: confidence,
                alternative_commands: Vec::new(),
                help_content: Vec::new(),
            },
            Err(HandlerError::PermissionDenied { permission }) => result_from_guidance(
                self.recovery.permission_denied(&permission),
                command_type,
                intent,
                confidence,
            ),
            Err(HandlerError::RateLimited { retry_after_secs }) => result_from_guidance(
                self.recovery.rate_limited(retry_after_secs),
                command_type,
                intent,
                confidence,
            ),
            Err(HandlerError::InvalidParameter {
                parameter,
                value,
                valid_values,
            }) => result_from_guidance(
                self.recovery.invalid_parameter(&parameter, &value, &valid_values),
                command_type,
                intent,
                confidence,
            ),
            Err(HandlerError::NotSupported(_)) => {
                let guidance = self
                    .recovery
                    .not_recognized(text, context.context_id.as_deref())
                    .await;
                result_from_guidance(guidance, command_type, intent, confidence)
            }
            Err(HandlerError::Other(message)) => {
                error!(%message, command_type = %command_type, "domain handler error");
                result_from_guidance(
                    self.recovery.system_error(),
                    command_type,
                    intent,
                    confidence,
                )
            }
        }
    }
}

/// Required-parameter gate; returns the first missing field, if any.
fn first_missing_parameter(
    classification: &Classification,
    parameters: &HashMap<String, String>,
) -> Option<&'static str> {
    required_parameters(classification.command_type)
        .iter()
        .find(|key| parameters.get(**key).map(|v| v.is_empty()).unwrap_or(true))
        .copied()
}

fn result_from_guidance(
    guidance: Guidance,
    command_type: CommandType,
    intent: Option<String>,
    confidence: f64,
) -> CommandResult {
    CommandResult {
        success: false,
        intent,
        result: None,
        message: Some(guidance.message),
        error: Some(guidance.code.to_string()),
        suggestions: guidance.suggestions,
        status: guidance.status,
        response_time_ms: 0,
        command_type,
        confidence_score: confidence,
        alternative_commands: guidance.alternative_commands,
        help_content: guidance.help_content,
    }
}

/// Opaque context snapshot attached to the command log.
fn context_data_of(context: &CommandContext) -> HashMap<String, serde_json::Value> {
    let mut data = HashMap::new();
    if let Some(context_id) = &context.context_id {
        data.insert("context_id".to_string(), serde_json::Value::from(context_id.clone()));
    }
    if let Some(current_file) = &context.current_file {
        data.insert("current_file".to_string(), serde_json::Value::from(current_file.clone()));
    }
    if let Some(language) = &context.project_language {
        data.insert(
            "project_language".to_string(),
            serde_json::Value::from(language.clone()),
        );
    }
    data
}
