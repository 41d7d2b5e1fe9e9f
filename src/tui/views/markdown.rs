//! Markdown to styled, word-wrapped terminal lines for issue descriptions.

use crate::tui::ui::layout::display_width;
use pulldown_cmark::{Event, Options, Parser, Tag};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

const INDENT: &str = "  ";
const CODE_INDENT: &str = "    ";

/// Render markdown into lines no wider than `max_width` (plus indent).
pub fn render_markdown(markdown: &str, max_width: usize) -> Vec<Line<'static>> {
    let options = Options::ENABLE_TASKLISTS | Options::ENABLE_STRIKETHROUGH;
    let mut writer = LineWriter::new(max_width.max(10));

    for event in Parser::new_ext(markdown, options) {
        match event {
            Event::Start(tag) => writer.start(tag),
            Event::End(tag) => writer.end(tag),
            Event::Text(text) => writer.text(&text),
            Event::Code(code) => writer.push_word(format!("`{}`", code), writer.styles.code),
            Event::TaskListMarker(done) => {
                let marker = if done { "[x]" } else { "[ ]" };
                writer.push_word(marker.to_string(), writer.styles.muted);
            }
            Event::SoftBreak => writer.text(" "),
            Event::HardBreak => writer.flush(INDENT),
            Event::Rule => {
                writer.flush(INDENT);
                writer.lines.push(Line::from(Span::styled(
                    format!("{}{}", INDENT, "─".repeat(writer.width.min(40))),
                    writer.styles.muted,
                )));
            }
            _ => {}
        }
    }
    writer.flush(INDENT);

    while writer.lines.last().is_some_and(|l| l.spans.is_empty()) {
        writer.lines.pop();
    }
    writer.lines
}

struct Styles {
    text: Style,
    bold: Style,
    italic: Style,
    code: Style,
    heading: Style,
    link: Style,
    quote: Style,
    muted: Style,
}

impl Default for Styles {
    fn default() -> Self {
        Self {
            text: Style::default().fg(Color::White),
            bold: Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            italic: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::ITALIC),
            code: Style::default().fg(Color::Gray),
            heading: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            link: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::UNDERLINED),
            quote: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
            muted: Style::default().fg(Color::DarkGray),
        }
    }
}

/// Accumulates spans into wrapped lines while walking parser events.
struct LineWriter {
    width: usize,
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    used: usize,
    styles: Styles,
    bold: bool,
    italic: bool,
    heading: bool,
    code_block: bool,
    quote: bool,
    link: bool,
    /// One entry per open list: next number for ordered lists.
    lists: Vec<Option<u64>>,
}

impl LineWriter {
    fn new(width: usize) -> Self {
        Self {
            width,
            lines: Vec::new(),
            spans: Vec::new(),
            used: 0,
            styles: Styles::default(),
            bold: false,
            italic: false,
            heading: false,
            code_block: false,
            quote: false,
            link: false,
            lists: Vec::new(),
        }
    }

    fn flush(&mut self, indent: &str) {
        if self.spans.is_empty() {
            return;
        }
        let mut line = vec![Span::raw(indent.to_string())];
        line.append(&mut self.spans);
        self.lines.push(Line::from(line));
        self.used = 0;
    }

    fn blank(&mut self) {
        if self.lines.last().is_some_and(|l| !l.spans.is_empty()) {
            self.lines.push(Line::from(""));
        }
    }

    fn current_style(&self) -> Style {
        if self.heading {
            self.styles.heading
        } else if self.code_block {
            self.styles.code
        } else if self.quote {
            self.styles.quote
        } else if self.link {
            self.styles.link
        } else if self.bold && self.italic {
            self.styles.bold.add_modifier(Modifier::ITALIC)
        } else if self.bold {
            self.styles.bold
        } else if self.italic {
            self.styles.italic
        } else {
            self.styles.text
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading(..) => {
                self.flush(INDENT);
                self.heading = true;
            }
            Tag::Paragraph => self.flush(INDENT),
            Tag::Strong => self.bold = true,
            Tag::Emphasis => self.italic = true,
            Tag::CodeBlock(_) => {
                self.flush(INDENT);
                self.code_block = true;
            }
            Tag::BlockQuote => {
                self.flush(INDENT);
                self.quote = true;
            }
            Tag::List(start) => {
                self.flush(INDENT);
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush(INDENT);
                let depth = self.lists.len().saturating_sub(1);
                let bullet = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let label = format!("{}. ", n);
                        *n += 1;
                        label
                    }
                    _ => "• ".to_string(),
                };
                let prefix = format!("{}{}", INDENT.repeat(depth), bullet);
                self.used = display_width(&prefix);
                self.spans.push(Span::raw(prefix));
            }
            Tag::Link(..) => self.link = true,
            _ => {}
        }
    }

    fn end(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading(..) => {
                self.flush(INDENT);
                self.blank();
                self.heading = false;
            }
            Tag::Paragraph => {
                self.flush(INDENT);
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            Tag::Strong => self.bold = false,
            Tag::Emphasis => self.italic = false,
            Tag::CodeBlock(_) => {
                self.flush(CODE_INDENT);
                self.blank();
                self.code_block = false;
            }
            Tag::BlockQuote => {
                self.flush(INDENT);
                self.quote = false;
            }
            Tag::List(_) => {
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            Tag::Item => self.flush(INDENT),
            Tag::Link(..) => self.link = false,
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        let style = self.current_style();
        if self.code_block {
            for line in text.lines() {
                self.spans.push(Span::styled(line.to_string(), style));
                self.flush(CODE_INDENT);
            }
            return;
        }
        for word in text.split_whitespace() {
            self.push_word(word.to_string(), style);
        }
    }

    fn push_word(&mut self, word: String, style: Style) {
        let word_width = display_width(&word);
        if self.used > 0 && self.used + word_width + 1 > self.width {
            self.flush(INDENT);
        }
        if self.used > 0 && !self.ends_with_prefix() {
            self.spans.push(Span::raw(" "));
            self.used += 1;
        }
        self.used += word_width;
        self.spans.push(Span::styled(word, style));
    }

    /// True right after a list bullet, which already ends in a space.
    fn ends_with_prefix(&self) -> bool {
        self.spans
            .last()
            .is_some_and(|s| s.content.ends_with(' '))
    }
}
