use crate::models::{ContentPart, Message, MessageContent, MessageState, Sender};
use crate::ui::markdown::MarkdownRenderer;
use crate::widget::{PanelState, WIDGET_SUBTITLE, WIDGET_TITLE};
use colored::*;

pub const TYPING_INDICATOR: &str = "● ● ●";

pub fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(terminal_size::Width(w), _)| w as usize)
        .unwrap_or(80)
        .clamp(40, 100)
}

/// Terminal rendering of the widget chrome and transcript.
pub struct PanelRenderer {
    markdown: MarkdownRenderer,
    width: usize,
}

impl PanelRenderer {
    pub fn new(width: usize) -> Self {
        Self {
            markdown: MarkdownRenderer::new(width.saturating_sub(4)),
            width,
        }
    }

    pub fn header(&self, panel: PanelState) -> String {
        let controls = match panel {
            PanelState::Minimized => "[reset] [expand] [close]",
            _ => "[reset] [minimize] [close]",
        };
        let title = format!("🤖 {} · {}", WIDGET_TITLE, WIDGET_SUBTITLE);
        let gap = self
            .width
            .saturating_sub(title.chars().count() + controls.len() + 2);
        format!(
            "{}\n {}{}{}\n{}",
            "─".repeat(self.width).dimmed(),
            title.bold(),
            " ".repeat(gap),
            controls.dimmed(),
            "─".repeat(self.width).dimmed()
        )
    }

    /// The floating button, as shown when the panel is closed.
    pub fn button(&self) -> String {
        format!("{} {}", "💬".bold(), "Open chat with Scout (/open)".dimmed())
    }

    pub fn message(&self, message: &Message) -> String {
        match message.sender {
            Sender::Bot => {
                let body = match &message.state {
                    MessageState::Pending => TYPING_INDICATOR.dimmed().to_string(),
                    MessageState::Resolved(content) => self.markdown.render(&content.text()),
                };
                format!("{} {}", "Scout ›".cyan().bold(), indent_continuation(&body, 8))
            }
            Sender::User => {
                let mut lines = Vec::new();
                if let Some(url) = &message.image_url {
                    lines.push(format!("{} {}", "[image]".magenta(), url.dimmed()));
                }
                match &message.state {
                    MessageState::Pending => lines.push(TYPING_INDICATOR.dimmed().to_string()),
                    MessageState::Resolved(MessageContent::Text(text)) => lines.push(text.clone()),
                    MessageState::Resolved(MessageContent::Parts(parts)) => {
                        for part in parts {
                            match part {
                                ContentPart::Text { text } => lines.push(text.clone()),
                                ContentPart::Image { image } => lines.push(format!(
                                    "{} {}",
                                    "[image]".magenta(),
                                    image.as_deref().unwrap_or("/placeholder.svg").dimmed()
                                )),
                            }
                        }
                    }
                }
                format!("{} {}", "You ›".green().bold(), indent_continuation(&lines.join("\n"), 6))
            }
        }
    }

    pub fn staged_image(&self, url: &str) -> String {
        format!(
            "{} {} {}",
            "[image]".magenta(),
            url,
            "Ready to send (/discard to remove)".dimmed()
        )
    }

    pub fn transcript(&self, messages: &[Message]) -> String {
        messages
            .iter()
            .map(|m| self.message(m))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn indent_continuation(text: &str, indent: usize) -> String {
    let pad = " ".repeat(indent);
    text.lines()
        .enumerate()
        .map(|(i, line)| if i == 0 { line.to_string() } else { format!("{}{}", pad, line) })
        .collect::<Vec<_>>()
        .join("\n")
}
