pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod storage;
pub mod ui;
pub mod widget;

pub use api::{ChatBackend, HttpBackend};
pub use error::{Result, ScoutError};
pub use storage::{FilesystemStore, KeyValueStore, MemoryStore};
pub use widget::{ChatWidget, ControlSignal, PanelState, WidgetControl, WidgetEvent, WidgetSettings};
