//! Intent classification as an ordered decision list.
//!
//! Classification walks a fixed, priority-ordered table of
//! (pattern, command type, intent) rules and the first match wins. The
//! table is explicit and inspectable so each rule can be tested on its
//! own; there is no fallthrough between rules beyond "try the next one".
//!
//! When nothing matches, the command defaults to [`CommandType::System`]
//! with no intent. That default is never a confident match: the scorer
//! gives it a near-zero score and the processor rejects it.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use voxa_common::CommandType;

/// One entry of the decision list.
pub struct Rule {
    pub command_type: CommandType,
    /// Fine-grained intent label, e.g. `assessment.comparables`.
    pub intent: &'static str,
    pub pattern: Regex,
}

fn rule(command_type: CommandType, intent: &'static str, pattern: &str) -> Rule {
    Rule {
        command_type,
        intent,
        pattern: Regex::new(pattern).expect("static classifier pattern"),
    }
}

lazy_static! {
    /// The decision list, in canonical priority order: navigation,
    /// property assessment, data query, system, workflow, coding.
    pub static ref RULES: Vec<Rule> = vec![
        // Bare navigation verb with nowhere to go still classifies as
        // navigation; the dispatcher reports the missing destination. Must
        // sit above the destination rule, which would otherwise swallow
        // the trailing "to" as a destination.
        rule(
            CommandType::Navigation,
            "navigation.goto",
            r"(?i)^(?:go(?:\s+to)?|navigate\s+to|take\s+me\s+to)\s*$",
        ),
        rule(
            CommandType::Navigation,
            "navigation.goto",
            r"(?i)^(?:go(?:\s+to)?|open|navigate\s+to|take\s+me\s+to|show\s+me\s+the)\s+(?:the\s+)?(?P<destination>.+?)(?:\s+(?:page|screen|view|tab))?\s*$",
        ),
        rule(
            CommandType::PropertyAssessment,
            "assessment.value",
            r"(?i)^(?:assess|appraise|evaluate|value)\s+(?:the\s+)?property(?:\s+(?:id\s+)?(?P<property_id>[\w-]+))?",
        ),
        rule(
            CommandType::PropertyAssessment,
            "assessment.value",
            r"(?i)^what(?:'s|\s+is)\s+(?:the\s+)?(?:value\s+of\s+)?property\s+(?P<property_id>[\w-]+)(?:\s+worth)?\s*\??$",
        ),
        rule(
            CommandType::PropertyAssessment,
            "assessment.comparables",
            r"(?i)^(?:(?:show|find|get|list|pull)\s+(?:me\s+)?)?(?:comparables?|comps)\b(?:\s+for)?(?:\s+property)?(?:\s+(?:id\s+)?(?P<property_id>\d[\w-]*))?",
        ),
        rule(
            CommandType::DataQuery,
            "query.properties",
            r"(?i)^(?:show|list|find|display|get)\s+(?:me\s+)?(?:all\s+)?(?:the\s+)?properties\b(?:\s+(?P<criteria>.*\S))?\s*$",
        ),
        rule(
            CommandType::System,
            "system.help",
            r"(?i)^(?:help|\?)(?:\s+(?:with\s+|on\s+|about\s+)?(?P<topic>.+?))?\s*$",
        ),
        rule(
            CommandType::System,
            "system.help",
            r"(?i)^what\s+can\s+i\s+(?:say|do)(?:\s+here)?\s*\??$",
        ),
        rule(
            CommandType::System,
            "system.help",
            r"(?i)^(?:show\s+)?(?:available\s+)?commands\s*$",
        ),
        rule(
            CommandType::System,
            "system.create_shortcut",
            r"(?i)^(?:create|add|make|new)\s+(?:a\s+)?(?:new\s+)?shortcut\b",
        ),
        rule(
            CommandType::Workflow,
            "workflow.start",
            r"(?i)^(?:start|begin|run|launch|kick\s+off)\s+(?:the\s+|a\s+|an\s+)?(?P<workflow_type>[\w-]+)\s+workflow\b",
        ),
        rule(
            CommandType::Workflow,
            "workflow.start",
            r"(?i)^(?:start|begin|run|launch)\s+workflow\s+(?P<workflow_type>[\w-]+)\s*$",
        ),
        rule(
            CommandType::CodingAssistance,
            "coding.generate",
            r"(?i)^(?:generate|write|create)\s+(?:some\s+)?(?:(?P<code_type>[A-Za-z+#]+)\s+)?code(?:\s+(?:to|for|that)\s+(?P<description>.+?))?\s*$",
        ),
        rule(
            CommandType::CodingAssistance,
            "coding.explain",
            r"(?i)^(?:explain|describe|walk\s+me\s+through)\s+(?:this|the|that|my)?\s*(?:code|function|file|snippet|error)\b(?:\s+(?P<description>.+?))?\s*$",
        ),
        rule(
            CommandType::CodingAssistance,
            "coding.fix",
            r"(?i)^(?:fix|debug|repair)\s+(?:this|the|that|my)?\s*(?:code|error|bug|issue)\b(?:\s+(?P<description>.+?))?\s*$",
        ),
        rule(
            CommandType::CodingAssistance,
            "coding.optimize",
            r"(?i)^(?:optimi[sz]e|refactor|speed\s+up)\s+(?:this|the|that|my)?\s*(?:code|function|query|loop)?(?:\s+(?P<description>.+?))?\s*$",
        ),
    ];
}

/// Outcome of running the decision list over one (expanded) phrase.
#[derive(Debug, Clone)]
pub struct Classification {
    pub command_type: CommandType,
    pub intent: Option<String>,
    /// False when the System default was applied because no rule matched.
    pub matched: bool,
    /// Length of the matched span, for coverage scoring.
    pub match_len: usize,
    /// All named captures of the winning rule, trimmed.
    pub captures: HashMap<String, String>,
}

impl Classification {
    fn unmatched() -> Self {
        Self {
            command_type: CommandType::System,
            intent: None,
            matched: false,
            match_len: 0,
            captures: HashMap::new(),
        }
    }
}

/// Classify an expanded command phrase. First matching rule wins.
pub fn classify(text: &str) -> Classification {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Classification::unmatched();
    }

    for rule in RULES.iter() {
        if let Some(caps) = rule.pattern.captures(trimmed) {
            let match_len = caps.get(0).map(|m| m.end() - m.start()).unwrap_or(0);
            let mut captures = HashMap::new();
            for name in rule.pattern.capture_names().flatten() {
                if let Some(value) = caps.name(name) {
                    captures.insert(name.to_string(), value.as_str().trim().to_string());
                }
            }
            return Classification {
                command_type: rule.command_type,
                intent: Some(rule.intent.to_string()),
                matched: true,
                match_len,
                captures,
            };
        }
    }

    Classification::unmatched()
}
