//! Demo shortcuts and help content for the REPL.

use anyhow::Result;
use std::collections::BTreeMap;
use voxa_common::CommandType;
use voxa_engine::memory::MemoryStore;
use voxa_engine::store::{HelpStore, NewHelpContent, NewShortcut, ShortcutStore};

pub async fn seed_demo_data(store: &MemoryStore) -> Result<()> {
    for (phrase, expansion, command_type) in [
        (
            "show props",
            "show me all properties in the system",
            CommandType::DataQuery,
        ),
        ("dash", "go to dashboard", CommandType::Navigation),
        ("kick off approvals", "start the approval workflow", CommandType::Workflow),
    ] {
        store
            .create_shortcut(NewShortcut {
                owner_user_id: None,
                phrase: phrase.to_string(),
                expansion: expansion.to_string(),
                command_type,
                description: Some("built-in demo shortcut".to_string()),
                priority: 0,
                enabled: true,
                global: true,
            })
            .await?;
    }

    let entries = [
        (
            CommandType::Navigation,
            "Navigate",
            "Move between screens.",
            vec!["go to dashboard", "open the settings page"],
            vec![("destination", "Screen or page to open")],
            10,
        ),
        (
            CommandType::PropertyAssessment,
            "Assess a property",
            "Estimate a property's value or pull comparables.",
            vec!["assess property 1024", "show comps for property 1024"],
            vec![("property_id", "Identifier of the property")],
            9,
        ),
        (
            CommandType::DataQuery,
            "Query properties",
            "List properties, with optional filter criteria.",
            vec!["show me all properties", "find properties with 3 bedrooms"],
            vec![("criteria", "Free-text filter; empty lists everything")],
            8,
        ),
        (
            CommandType::Workflow,
            "Run a workflow",
            "Start a named workflow.",
            vec!["start the approval workflow"],
            vec![("workflow_type", "Which workflow to start")],
            7,
        ),
        (
            CommandType::CodingAssistance,
            "Coding assistance",
            "Generate, explain, fix or optimize code.",
            vec!["generate python code to sort a list", "explain this code"],
            vec![("description", "What the code should do")],
            6,
        ),
        (
            CommandType::System,
            "Shortcuts",
            "Expand short phrases into full commands.",
            vec!["create a shortcut"],
            vec![],
            5,
        ),
    ];

    for (command_type, title, description, phrases, parameters, priority) in entries {
        store
            .create_help(NewHelpContent {
                command_type,
                context_id: None,
                title: title.to_string(),
                example_phrases: phrases.into_iter().map(|s| s.to_string()).collect(),
                description: description.to_string(),
                parameters: parameters
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect::<BTreeMap<_, _>>(),
                response_example: None,
                priority,
                hidden: false,
            })
            .await?;
    }

    Ok(())
}
