//! Icon/style lookup for workflow states and priorities, and the status bar.

use super::icons;
use super::layout::{display_width, truncate_str};
use crate::data::{Priority, StateType};
use crate::tui::app::{App, ViewKind};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Unified status configuration - single source of truth for icon and style.
pub struct StatusConfig {
    pub icon: &'static str,
    pub style: Style,
}

/// Trait for types that can provide their display configuration (icon + style).
pub trait StatusConfigurable {
    fn status_config(&self) -> StatusConfig;
}

impl StatusConfigurable for StateType {
    fn status_config(&self) -> StatusConfig {
        match self {
            StateType::Triage => StatusConfig {
                icon: icons::STATUS_TRIAGE,
                style: Style::default().fg(Color::Rgb(255, 165, 0)), // Orange
            },
            StateType::Backlog => StatusConfig {
                icon: icons::STATUS_BACKLOG,
                style: Style::default().fg(Color::DarkGray),
            },
            StateType::Unstarted => StatusConfig {
                icon: icons::STATUS_UNSTARTED,
                style: Style::default().fg(Color::Cyan),
            },
            StateType::Started => StatusConfig {
                icon: icons::STATUS_STARTED,
                style: Style::default().fg(Color::Green),
            },
            StateType::Completed => StatusConfig {
                icon: icons::STATUS_COMPLETED,
                style: Style::default().fg(Color::Magenta),
            },
            StateType::Canceled => StatusConfig {
                icon: icons::STATUS_CANCELED,
                style: Style::default().fg(Color::DarkGray),
            },
            StateType::Unknown => StatusConfig {
                icon: icons::STATUS_UNKNOWN,
                style: Style::default().fg(Color::Gray),
            },
        }
    }
}

impl StatusConfigurable for Priority {
    fn status_config(&self) -> StatusConfig {
        match self {
            Priority::Urgent => StatusConfig {
                icon: icons::PRIORITY_URGENT,
                style: Style::default()
                    .fg(Color::White)
                    .bg(Color::Red)
                    .add_modifier(Modifier::BOLD),
            },
            Priority::High => StatusConfig {
                icon: icons::PRIORITY_HIGH,
                style: Style::default().fg(Color::Yellow),
            },
            Priority::Medium => StatusConfig {
                icon: icons::PRIORITY_MEDIUM,
                style: Style::default().fg(Color::Cyan),
            },
            Priority::Low => StatusConfig {
                icon: icons::PRIORITY_LOW,
                style: Style::default().fg(Color::DarkGray),
            },
            Priority::NoPriority => StatusConfig {
                icon: icons::PRIORITY_NONE,
                style: Style::default().fg(Color::DarkGray),
            },
        }
    }
}

pub fn state_config(state: StateType) -> StatusConfig {
    state.status_config()
}

pub fn priority_config(priority: Priority) -> StatusConfig {
    priority.status_config()
}

/// Legend lines for the help overlay.
pub fn status_legend() -> Vec<&'static str> {
    vec![
        "  ISSUE STATUS",
        "  ────────────",
        "  ◇  Triage       Needs triage",
        "  ○  Backlog      Not yet prioritized",
        "  ◔  Unstarted    Ready to start",
        "  ◑  Started      Currently being worked on",
        "  ●  Completed    Done",
        "  ⊘  Canceled     No longer needed",
        "",
        "  PRIORITY",
        "  ────────",
        "  ⚠!  Urgent      Highest priority (red bg)",
        "  ▮▮▮ High",
        "  ▮▮╌ Medium",
        "  ▮╌╌ Low",
        "  ╌╌╌ None        No priority set",
    ]
}

/// Key hints for the active view, shown right-aligned in the status bar.
fn hints(app: &App) -> &'static str {
    if app.picker.is_some() {
        return "type: filter  enter: select  esc: cancel";
    }
    if app.search.active {
        return "type: search  enter: keep results  esc: clear";
    }
    match app.view_kind() {
        ViewKind::List => "j/k: move  enter: open  c: create  /: search  b: board  ?: help  q: quit",
        ViewKind::Detail => "s: status  a: assignee  p: priority  e: edit  o: open  esc: back",
        ViewKind::Create => "tab: next field  ctrl+g: AI draft  ctrl+s: create  esc: cancel",
        ViewKind::Edit => "tab: next field  enter: pick  ctrl+s: save  esc: cancel",
        ViewKind::Kanban if app.kanban_move_mode() => "h/l: move  1-9: column  esc: cancel",
        ViewKind::Kanban => "h/l: column  j/k: card  m: move  H/L: shift  enter: open  esc: back",
        ViewKind::Setup => "q: quit",
    }
}

pub fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let width = area.width as usize;
    let (text, style) = match &app.status {
        Some(status) if status.is_error => (
            status.text.clone(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Some(status) => (status.text.clone(), Style::default().fg(Color::Green)),
        None => (String::new(), Style::default()),
    };
    let text = if app.loading_more {
        format!("{} {}", app.spinner(), text)
    } else {
        text
    };

    let left = truncate_str(&format!(" {}", text), width);
    let hint = hints(app);
    let room = width.saturating_sub(display_width(&left) + 2);

    let mut spans = vec![Span::styled(left, style)];
    if display_width(hint) <= room {
        spans.push(Span::raw(" ".repeat(room - display_width(hint) + 1)));
        spans.push(Span::styled(hint, Style::default().fg(Color::DarkGray)));
    }
    f.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Rgb(20, 20, 30))),
        area,
    );
}
