//! The domain-handler seam.
//!
//! Real deployments register one handler per command type (navigation,
//! valuation, workflow orchestration, coding assistance). The pipeline
//! never looks inside a handler; it only interprets the error variant of
//! the result. Handlers are injected at construction time. When one is
//! unavailable the [`NullHandler`] stub stands in and every call routes
//! to the not-recognized recovery path.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use voxa_common::{CommandContext, CommandType, HandlerError, HandlerResponse};

#[async_trait]
pub trait DomainHandler: Send + Sync {
    async fn handle(
        &self,
        command: &str,
        command_type: CommandType,
        intent: Option<&str>,
        parameters: &HashMap<String, String>,
        context: &CommandContext,
    ) -> Result<HandlerResponse, HandlerError>;
}

/// Default stub wired in when a real handler is not available.
pub struct NullHandler;

#[async_trait]
impl DomainHandler for NullHandler {
    async fn handle(
        &self,
        _command: &str,
        command_type: CommandType,
        _intent: Option<&str>,
        _parameters: &HashMap<String, String>,
        _context: &CommandContext,
    ) -> Result<HandlerResponse, HandlerError> {
        Err(HandlerError::NotSupported(command_type.as_str().to_string()))
    }
}

/// Command-type -> handler map assembled at startup.
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<CommandType, Arc<dyn DomainHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, command_type: CommandType, handler: Arc<dyn DomainHandler>) {
        self.handlers.insert(command_type, handler);
    }

    pub fn get(&self, command_type: CommandType) -> Option<Arc<dyn DomainHandler>> {
        self.handlers.get(&command_type).cloned()
    }
}
