//! Structured parameter extraction.
//!
//! Pulls the per-command-type fields out of the winning rule's named
//! captures. A capture that did not participate in the match yields an
//! absent key, never an error. Whether absence matters is the
//! dispatcher's call, not ours.

use crate::classifier::Classification;
use std::collections::HashMap;
use voxa_common::CommandType;

/// Parameters that must be present for a command type to be dispatchable.
pub fn required_parameters(command_type: CommandType) -> &'static [&'static str] {
    match command_type {
        CommandType::Navigation => &["destination"],
        CommandType::PropertyAssessment => &["property_id"],
        _ => &[],
    }
}

/// Parameters a command type is allowed to carry.
fn known_parameters(command_type: CommandType) -> &'static [&'static str] {
    match command_type {
        CommandType::Navigation => &["destination"],
        CommandType::PropertyAssessment => &["property_id"],
        CommandType::DataQuery => &["criteria"],
        CommandType::System => &["topic"],
        CommandType::Workflow => &["workflow_type"],
        CommandType::CodingAssistance => &["description", "code_type"],
    }
}

/// Extract the structured parameters for a classification.
pub fn extract(classification: &Classification) -> HashMap<String, String> {
    let mut parameters = HashMap::new();
    if !classification.matched {
        return parameters;
    }

    for key in known_parameters(classification.command_type) {
        if let Some(value) = classification.captures.get(*key) {
            parameters.insert((*key).to_string(), value.clone());
        }
    }

    // "show all properties" carries no filter: for data queries an absent
    // capture is a present-but-empty criteria, which is valid.
    if classification.command_type == CommandType::DataQuery {
        parameters.entry("criteria".to_string()).or_default();
    }

    parameters
}
