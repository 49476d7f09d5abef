pub mod markdown;
pub mod output;
pub mod render;

pub use markdown::MarkdownRenderer;
pub use output::{display_notice, log_error, log_verbose};
pub use render::PanelRenderer;
