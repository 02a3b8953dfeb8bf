pub mod analytics;
pub mod config;
pub mod expand;
pub mod handler;
pub mod memory;
pub mod processor;
pub mod recovery;
pub mod store;

pub use analytics::AnalyticsAggregator;
pub use config::{ConfigLoader, VoxaConfig};
pub use handler::{DomainHandler, HandlerRegistry, NullHandler};
pub use memory::MemoryStore;
pub use processor::CommandProcessor;
pub use store::{
    AnalyticsStore, CommandLogStore, HelpStore, NewCommandLog, NewHelpContent, NewShortcut,
    ShortcutPatch, ShortcutStore, StoreError,
};
