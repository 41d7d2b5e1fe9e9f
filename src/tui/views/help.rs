//! Help overlay: keyboard shortcuts and the status legend.

use super::muted_style;
use crate::tui::ui::layout::{fit_line_to_width, popup_rect};
use crate::tui::ui::status::status_legend;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const KEY_WIDTH: usize = 12;
/// Inner width needed to lay the shortcut sections out side by side.
const TWO_COLUMN_WIDTH: u16 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HelpTab {
    #[default]
    Shortcuts,
    Legend,
}

struct Section {
    title: &'static str,
    keys: &'static [(&'static str, &'static str)],
}

const LEFT: &[Section] = &[
    Section {
        title: "Navigation",
        keys: &[
            ("j / ↓", "Move down"),
            ("k / ↑", "Move up"),
            ("gg / Home", "Go to top"),
            ("G / End", "Go to bottom"),
            ("Ctrl+d", "Page down"),
            ("Ctrl+u", "Page up"),
        ],
    },
    Section {
        title: "Tabs",
        keys: &[
            ("Tab", "Next tab"),
            ("Shift+Tab", "Previous tab"),
            ("1-5", "Jump to tab"),
            ("P", "Filter by project"),
        ],
    },
    Section {
        title: "Kanban",
        keys: &[
            ("b", "Open board"),
            ("h / l", "Previous / next column"),
            ("H / L", "Move issue left / right"),
            ("m", "Move mode (then 1-9)"),
        ],
    },
];

const RIGHT: &[Section] = &[
    Section {
        title: "Actions",
        keys: &[
            ("Enter", "View issue"),
            ("/", "Search issues"),
            ("c", "Create issue"),
            ("r", "Refresh"),
            ("L", "Load more issues"),
            ("Esc", "Back / Cancel"),
            ("q", "Quit"),
        ],
    },
    Section {
        title: "Issue Actions",
        keys: &[
            ("s", "Change status"),
            ("a", "Change assignee"),
            ("p", "Change priority"),
            ("e", "Edit issue"),
            ("d", "Delete issue"),
            ("y", "Copy branch name"),
            ("o", "Open in browser"),
            ("w", "Work on issue in opencode"),
            ("Ctrl+g", "AI draft (create form)"),
        ],
    },
];

fn section_lines(sections: &[Section]) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for section in sections {
        lines.push(Line::from(Span::styled(
            section.title,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )));
        for (key, desc) in section.keys {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  {:<width$}", key, width = KEY_WIDTH),
                    Style::default().fg(Color::Yellow),
                ),
                Span::styled(*desc, Style::default().fg(Color::Gray)),
            ]));
        }
        lines.push(Line::from(""));
    }
    lines
}

fn tab_bar(tab: HelpTab) -> Line<'static> {
    let active = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let inactive = Style::default().fg(Color::DarkGray);
    let (first, second) = match tab {
        HelpTab::Shortcuts => (active, inactive),
        HelpTab::Legend => (inactive, active),
    };
    Line::from(vec![
        Span::styled(" [1] Shortcuts ", first),
        Span::raw(" │ "),
        Span::styled("[2] Status Legend ", second),
    ])
}

fn clip(lines: Vec<Line<'static>>, area: Rect) -> Vec<Line<'static>> {
    lines
        .into_iter()
        .take(area.height as usize)
        .map(|line| fit_line_to_width(line, area.width as usize))
        .collect()
}

/// Draw the help popup centered over `area`.
pub fn render(f: &mut Frame, area: Rect, tab: HelpTab) {
    let popup = popup_rect(65, 80, 40, 12, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(inner);

    f.render_widget(Paragraph::new(tab_bar(tab)), chunks[0]);
    f.render_widget(
        Paragraph::new(Span::styled(
            "  Press ? or Esc to close  |  1: Shortcuts  2: Status Legend",
            muted_style(),
        )),
        chunks[2],
    );

    let body = chunks[1];
    match tab {
        HelpTab::Legend => {
            let lines = status_legend().into_iter().map(Line::from).collect();
            f.render_widget(Paragraph::new(clip(lines, body)), body);
        }
        HelpTab::Shortcuts if body.width >= TWO_COLUMN_WIDTH => {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(body);
            f.render_widget(
                Paragraph::new(clip(section_lines(LEFT), columns[0])),
                columns[0],
            );
            f.render_widget(
                Paragraph::new(clip(section_lines(RIGHT), columns[1])),
                columns[1],
            );
        }
        HelpTab::Shortcuts => {
            let mut lines = section_lines(LEFT);
            lines.extend(section_lines(RIGHT));
            f.render_widget(Paragraph::new(clip(lines, body)), body);
        }
    }
}
