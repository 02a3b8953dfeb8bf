pub mod model;
pub mod protocol;

pub use model::{CommandCount, CommandLog, DailyAnalytic, HelpContent, Shortcut};
pub use protocol::{
    CommandContext, CommandResult, CommandStatus, CommandType, HandlerError, HandlerResponse,
};
