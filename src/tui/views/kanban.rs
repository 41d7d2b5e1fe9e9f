//! Board of issues grouped into workflow-state columns.

use super::{muted_style, selected_style};
use crate::data::{board_states, issues_in_state, Issue, WorkflowState};
use crate::tui::ui::layout::truncate_str;
use crate::tui::ui::status::{priority_config, state_config};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

const MIN_COLUMN_WIDTH: u16 = 30;
const MAX_COLUMN_WIDTH: u16 = 50;
/// Card rows plus the blank separator.
const CARD_HEIGHT: u16 = 4;
const MOVE_HINT: &str = "Move mode: h/l or 1-9 to select column, ESC to cancel";

#[derive(Debug, Clone)]
pub struct Column {
    pub state: WorkflowState,
    pub issues: Vec<Issue>,
    pub cursor: usize,
}

impl Column {
    fn selected(&self) -> Option<&Issue> {
        self.issues.get(self.cursor)
    }

    fn clamp(&mut self) {
        self.cursor = self.cursor.min(self.issues.len().saturating_sub(1));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum KanbanAction {
    None,
    /// Move `issue_id` into the workflow state `state_id`.
    Move { issue_id: String, state_id: String },
}

#[derive(Debug, Clone)]
pub struct KanbanView {
    columns: Vec<Column>,
    active: usize,
    move_mode: bool,
    width: u16,
    height: u16,
}

impl KanbanView {
    pub fn new(states: &[WorkflowState], issues: &[Issue], width: u16, height: u16) -> Self {
        Self {
            columns: build_columns(states, issues),
            active: 0,
            move_mode: false,
            width,
            height,
        }
    }

    /// Rebuild the columns from fresh issues, keeping the active column and
    /// the selected issue where it still exists.
    pub fn set_issues(&mut self, issues: &[Issue]) {
        let selected = self.selected().map(|i| i.id.clone());
        let states: Vec<WorkflowState> = self.columns.iter().map(|c| c.state.clone()).collect();
        let previous: Vec<usize> = self.columns.iter().map(|c| c.cursor).collect();

        self.columns = build_columns(&states, issues);
        for (column, cursor) in self.columns.iter_mut().zip(previous) {
            column.cursor = cursor;
            column.clamp();
        }
        if let Some(id) = selected {
            if let Some(column) = self.columns.get_mut(self.active) {
                if let Some(pos) = column.issues.iter().position(|i| i.id == id) {
                    column.cursor = pos;
                }
            }
        }
        self.active = self.active.min(self.columns.len().saturating_sub(1));
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn active_column(&self) -> usize {
        self.active
    }

    pub fn in_move_mode(&self) -> bool {
        self.move_mode
    }

    pub fn selected(&self) -> Option<&Issue> {
        self.columns.get(self.active).and_then(Column::selected)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> KanbanAction {
        if self.columns.is_empty() {
            return KanbanAction::None;
        }
        if self.move_mode {
            return self.handle_move_key(key);
        }

        match key.code {
            KeyCode::Char('h') | KeyCode::Left => {
                if self.active > 0 {
                    self.active -= 1;
                    self.columns[self.active].clamp();
                }
            }
            KeyCode::Char('l') | KeyCode::Right => {
                if self.active + 1 < self.columns.len() {
                    self.active += 1;
                    self.columns[self.active].clamp();
                }
            }
            KeyCode::Char('j') | KeyCode::Down => {
                let column = &mut self.columns[self.active];
                if column.cursor + 1 < column.issues.len() {
                    column.cursor += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                let column = &mut self.columns[self.active];
                column.cursor = column.cursor.saturating_sub(1);
            }
            KeyCode::Home => self.columns[self.active].cursor = 0,
            KeyCode::Char('G') | KeyCode::End => {
                let column = &mut self.columns[self.active];
                column.cursor = column.issues.len().saturating_sub(1);
            }
            KeyCode::Char('m') => {
                if self.selected().is_some() {
                    self.move_mode = true;
                }
            }
            KeyCode::Char('H') => return self.move_by(-1),
            KeyCode::Char('L') => return self.move_by(1),
            _ => {}
        }
        KanbanAction::None
    }

    fn handle_move_key(&mut self, key: KeyEvent) -> KanbanAction {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.move_mode = false;
                KanbanAction::None
            }
            KeyCode::Char('h') | KeyCode::Left => {
                self.move_mode = false;
                self.move_by(-1)
            }
            KeyCode::Char('l') | KeyCode::Right => {
                self.move_mode = false;
                self.move_by(1)
            }
            KeyCode::Char(c @ '1'..='9') => {
                let target = (c as u8 - b'1') as usize;
                if target < self.columns.len() {
                    self.move_mode = false;
                    self.move_to(target)
                } else {
                    KanbanAction::None
                }
            }
            _ => KanbanAction::None,
        }
    }

    fn move_by(&self, delta: isize) -> KanbanAction {
        match self.active.checked_add_signed(delta) {
            Some(target) if target < self.columns.len() => self.move_to(target),
            _ => KanbanAction::None,
        }
    }

    fn move_to(&self, target: usize) -> KanbanAction {
        if target == self.active {
            return KanbanAction::None;
        }
        match (self.selected(), self.columns.get(target)) {
            (Some(issue), Some(column)) => KanbanAction::Move {
                issue_id: issue.id.clone(),
                state_id: column.state.id.clone(),
            },
            _ => KanbanAction::None,
        }
    }

    fn column_width(&self, available: u16) -> u16 {
        if self.columns.is_empty() {
            return available;
        }
        (available / self.columns.len() as u16).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH)
    }

    /// First column to draw so the active one stays on screen.
    fn first_visible(&self, visible: usize) -> usize {
        let visible = visible.max(1);
        if self.active < visible {
            0
        } else {
            self.active + 1 - visible
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        if self.columns.is_empty() {
            let y = area.y + area.height / 2;
            f.render_widget(
                Paragraph::new(Span::styled("No workflow states available", muted_style()))
                    .alignment(Alignment::Center),
                Rect {
                    y,
                    height: 1.min(area.height),
                    ..area
                },
            );
            return;
        }

        let mut board = area;
        if self.move_mode && area.height > 1 {
            board.height -= 1;
            f.render_widget(
                Paragraph::new(Span::styled(
                    MOVE_HINT,
                    Style::default().fg(Color::Yellow),
                )),
                Rect {
                    y: area.y + board.height,
                    height: 1,
                    ..area
                },
            );
        }

        let col_width = self.column_width(board.width);
        let visible = (board.width / col_width.max(1)).max(1) as usize;
        let first = self.first_visible(visible);

        for (slot, index) in (first..self.columns.len()).take(visible).enumerate() {
            let x = board.x + slot as u16 * col_width;
            let width = col_width.min(board.x + board.width - x);
            let rect = Rect {
                x,
                width,
                ..board
            };
            self.render_column(f, rect, &self.columns[index], index == self.active);
        }
    }

    fn render_column(&self, f: &mut Frame, area: Rect, column: &Column, active: bool) {
        let state = state_config(column.state.state_type);
        let border = if active {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let title_style = if active {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        let block = Block::default()
            .title(Line::from(vec![
                Span::raw(" "),
                Span::styled(format!("{} ", state.icon), state.style),
                Span::styled(
                    format!("{} ({}) ", column.state.name, column.issues.len()),
                    title_style,
                ),
            ]))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border);
        let inner = block.inner(area);
        f.render_widget(block, area);

        let text_width = inner.width.saturating_sub(2) as usize;
        if column.issues.is_empty() {
            f.render_widget(
                Paragraph::new(Span::styled("No issues", muted_style()))
                    .alignment(Alignment::Center),
                Rect {
                    height: 1.min(inner.height),
                    y: inner.y + 1.min(inner.height),
                    ..inner
                },
            );
            return;
        }

        let max_cards = (inner.height / CARD_HEIGHT).max(1) as usize;
        let start = if column.cursor >= max_cards {
            column.cursor + 1 - max_cards
        } else {
            0
        };

        let mut lines = Vec::new();
        for (i, issue) in column.issues.iter().enumerate().skip(start).take(max_cards) {
            let selected = active && i == column.cursor;
            lines.extend(card_lines(issue, selected, text_width));
        }
        f.render_widget(
            Paragraph::new(lines),
            Rect {
                x: inner.x + 1.min(inner.width),
                width: inner.width.saturating_sub(1),
                ..inner
            },
        );
    }
}

fn build_columns(states: &[WorkflowState], issues: &[Issue]) -> Vec<Column> {
    board_states(states)
        .into_iter()
        .map(|state| Column {
            issues: issues_in_state(issues, &state.id)
                .into_iter()
                .cloned()
                .collect(),
            state,
            cursor: 0,
        })
        .collect()
}

fn card_lines(issue: &Issue, selected: bool, width: usize) -> Vec<Line<'static>> {
    let priority = priority_config(issue.priority);
    let base = if selected {
        selected_style()
    } else {
        Style::default()
    };
    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                issue.identifier.clone(),
                base.fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::styled("  ", base),
            Span::styled(priority.icon.to_string(), base.patch(priority.style)),
        ]),
        Line::from(Span::styled(
            truncate_str(&issue.title, width),
            base.fg(Color::White),
        )),
    ];
    let assignee = issue
        .assignee
        .as_ref()
        .map(|u| format!("@{}", truncate_str(&u.name, 15)))
        .unwrap_or_default();
    lines.push(Line::from(Span::styled(assignee, base.fg(Color::DarkGray))));
    lines.push(Line::from(""));
    lines
}
