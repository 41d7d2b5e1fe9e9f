//! Welcome screen shown when no API key is configured.

use super::muted_style;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use std::path::PathBuf;

const CONTENT_WIDTH: u16 = 70;

#[derive(Debug, Clone)]
pub struct SetupView {
    config_path: Option<PathBuf>,
}

impl SetupView {
    pub fn new(config_path: Option<PathBuf>) -> Self {
        Self { config_path }
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let heading = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let code = Style::default().fg(Color::Yellow);
        let text = Style::default().fg(Color::White);
        let path = self
            .config_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "~/.config/lazyliner/config.toml".to_string());

        vec![
            Line::from(Span::styled(
                "Welcome to Lazyliner",
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center),
            Line::from(Span::styled(
                "A keyboard-driven terminal client for Linear",
                muted_style(),
            ))
            .alignment(Alignment::Center),
            Line::from(""),
            Line::from(Span::styled("Step 1: Get your Linear API key", heading)),
            Line::from(Span::styled("  Linear Settings > API:", text)),
            Line::from(Span::styled("    https://linear.app/settings/api", code)),
            Line::from(Span::styled(
                "  Create a personal key (it starts with lin_api_)",
                text,
            )),
            Line::from(""),
            Line::from(Span::styled("Step 2: Configure Lazyliner", heading)),
            Line::from(Span::styled("  Option A: environment variable", text)),
            Line::from(Span::styled(
                "    export LAZYLINER_API_KEY=lin_api_xxxxx",
                code,
            )),
            Line::from(Span::styled(format!("  Option B: config file {}", path), text)),
            Line::from(Span::styled("    [linear]", code)),
            Line::from(Span::styled("    api_key = \"lin_api_xxxxx\"", code)),
            Line::from(Span::styled("  Option C: interactive setup", text)),
            Line::from(Span::styled("    lazyliner --init", code)),
            Line::from(""),
            Line::from(Span::styled("Step 3: Launch Lazyliner", heading)),
            Line::from(Span::styled(
                "  Run lazyliner again and press ? for keyboard shortcuts",
                text,
            )),
            Line::from(""),
            Line::from(Span::styled("Press q to quit", muted_style()))
                .alignment(Alignment::Center),
        ]
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let lines = self.lines();
        let width = CONTENT_WIDTH.min(area.width);
        let height = (lines.len() as u16).min(area.height);
        let rect = Rect {
            x: area.x + (area.width - width) / 2,
            y: area.y + (area.height - height) / 2,
            width,
            height,
        };
        f.render_widget(Paragraph::new(lines), rect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::views::testing::{contains, render_rows};

    #[test]
    fn shows_steps_and_config_path() {
        let view = SetupView::new(Some(PathBuf::from("/tmp/ll/config.toml")));
        let rows = render_rows(100, 30, |f| {
            let area = f.area();
            view.render(f, area)
        });
        assert!(contains(&rows, "Welcome to Lazyliner"));
        assert!(contains(&rows, "LAZYLINER_API_KEY"));
        assert!(contains(&rows, "/tmp/ll/config.toml"));
        assert!(contains(&rows, "Press q to quit"));
    }
}
