use colored::*;
use regex::Regex;
use std::sync::OnceLock;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Style, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::{as_24_bit_terminal_escaped, LinesWithEndings};

fn bold_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\*\*(.+?)\*\*|__(.+?)__").expect("valid bold pattern"))
}

fn inline_code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"`([^`]+)`").expect("valid inline code pattern"))
}

/// Renders bot replies (markdown) for the terminal.
///
/// Paragraphs, bullets, headings, `**bold**` and `inline code` are styled with
/// ANSI colors; fenced code blocks are boxed and syntax highlighted.
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    rule_width: usize,
}

impl MarkdownRenderer {
    pub fn new(rule_width: usize) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            rule_width: rule_width.max(8),
        }
    }

    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let theme = &self.theme_set.themes["Solarized (dark)"];

        let syntax = if let Some(lang) = lang {
            self.syntax_set
                .find_syntax_by_token(lang)
                .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
                .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text())
        } else {
            self.syntax_set.find_syntax_plain_text()
        };

        let mut highlighter = HighlightLines::new(syntax, theme);
        let mut output = String::new();

        for line in LinesWithEndings::from(code) {
            match highlighter.highlight_line(line, &self.syntax_set) {
                Ok(ranges) => {
                    let ranges: Vec<(Style, &str)> = ranges;
                    output.push_str(&as_24_bit_terminal_escaped(&ranges[..], false));
                }
                Err(_) => output.push_str(line),
            }
        }

        // Reset colors so following text is not tinted
        output.push_str("\x1b[0m");
        output
    }

    fn code_header(&self, lang: Option<&str>) -> String {
        let label = lang.unwrap_or("code");
        let fill = self.rule_width.saturating_sub(label.chars().count() + 4);
        format!(
            "{}[{}]{}\n",
            "┌─".dimmed(),
            label.cyan(),
            "─".repeat(fill).dimmed()
        )
    }

    fn code_footer(&self) -> String {
        format!("{}\n", format!("└{}", "─".repeat(self.rule_width - 1)).dimmed())
    }

    /// Style a single line of prose.
    pub fn render_inline(&self, line: &str) -> String {
        let bolded = bold_pattern().replace_all(line, |caps: &regex::Captures| {
            let inner = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str())
                .unwrap_or_default();
            inner.bold().to_string()
        });
        inline_code_pattern()
            .replace_all(&bolded, |caps: &regex::Captures| caps[1].cyan().to_string())
            .into_owned()
    }

    fn render_line(&self, line: &str) -> String {
        let trimmed = line.trim_start();
        if let Some(heading) = trimmed.strip_prefix('#') {
            let heading = heading.trim_start_matches('#').trim();
            return self.render_inline(heading).as_str().bold().underline().to_string();
        }
        if let Some(item) = trimmed
            .strip_prefix("- ")
            .or_else(|| trimmed.strip_prefix("* "))
        {
            let indent = line.len() - trimmed.len();
            return format!("{}• {}", " ".repeat(indent), self.render_inline(item));
        }
        self.render_inline(line)
    }

    /// Render a full markdown document.
    pub fn render(&self, markdown: &str) -> String {
        let mut output = String::new();
        let mut code_lang: Option<Option<String>> = None;
        let mut code_content = String::new();

        for line in markdown.lines() {
            match line.trim_start().strip_prefix("```") {
                Some(info) if code_lang.is_none() => {
                    let info = info.trim();
                    code_lang = Some(if info.is_empty() {
                        None
                    } else {
                        Some(info.to_string())
                    });
                    code_content.clear();
                }
                Some(_) => {
                    let lang = code_lang.take().flatten();
                    output.push_str(&self.code_header(lang.as_deref()));
                    output.push_str(&self.highlight_code(&code_content, lang.as_deref()));
                    output.push_str(&self.code_footer());
                }
                None if code_lang.is_some() => {
                    code_content.push_str(line);
                    code_content.push('\n');
                }
                None => {
                    output.push_str(&self.render_line(line));
                    output.push('\n');
                }
            }
        }

        // Unterminated code block
        if let Some(lang) = code_lang {
            output.push_str(&self.code_header(lang.as_deref()));
            output.push_str(&self.highlight_code(&code_content, lang.as_deref()));
            output.push_str(&self.code_footer());
        }

        output.trim_end_matches('\n').to_string()
    }
}
