//! Modal single-select list with type-to-filter.

use super::{muted_style, selected_style};
use crate::tui::ui::layout::{centered_rect, truncate_str};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};

const PICKER_WIDTH: u16 = 46;
const HINT: &str = "↑/↓: navigate  enter: select  esc: cancel";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerItem {
    /// Opaque value handed back on selection; empty means "none".
    pub id: String,
    pub label: String,
    pub icon: Option<String>,
    pub description: Option<String>,
}

impl PickerItem {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            icon: None,
            description: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    fn matches(&self, needle: &str) -> bool {
        self.label.to_lowercase().contains(needle)
            || self
                .description
                .as_ref()
                .is_some_and(|d| d.to_lowercase().contains(needle))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PickerAction {
    None,
    Select(PickerItem),
    Cancel,
}

#[derive(Debug, Clone)]
pub struct PickerView {
    title: String,
    items: Vec<PickerItem>,
    query: String,
    /// Indices into `items` that match `query`, in original order.
    visible: Vec<usize>,
    cursor: usize,
}

impl PickerView {
    pub fn new(title: impl Into<String>, items: Vec<PickerItem>) -> Self {
        let visible = (0..items.len()).collect();
        Self {
            title: title.into(),
            items,
            query: String::new(),
            visible,
            cursor: 0,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn visible_items(&self) -> impl Iterator<Item = &PickerItem> {
        self.visible.iter().map(|&i| &self.items[i])
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn selected(&self) -> Option<&PickerItem> {
        self.visible.get(self.cursor).map(|&i| &self.items[i])
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.refilter();
    }

    fn refilter(&mut self) {
        let needle = self.query.to_lowercase();
        self.visible = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| needle.is_empty() || item.matches(&needle))
            .map(|(i, _)| i)
            .collect();
        self.cursor = 0;
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PickerAction {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return PickerAction::Cancel,
            KeyCode::Enter => {
                return match self.selected() {
                    Some(item) => PickerAction::Select(item.clone()),
                    None => PickerAction::None,
                };
            }
            KeyCode::Up => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Char('p') if ctrl => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Down => self.move_down(),
            KeyCode::Char('n') if ctrl => self.move_down(),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.visible.len().saturating_sub(1),
            KeyCode::Backspace => {
                if self.query.pop().is_some() {
                    self.refilter();
                }
            }
            KeyCode::Char(c) if !ctrl => {
                self.query.push(c);
                self.refilter();
            }
            _ => {}
        }
        PickerAction::None
    }

    fn move_down(&mut self) {
        if self.cursor + 1 < self.visible.len() {
            self.cursor += 1;
        }
    }

    /// Range of visible rows for a window of `rows`, keeping the cursor centered.
    pub fn window(&self, rows: usize) -> std::ops::Range<usize> {
        let len = self.visible.len();
        if rows == 0 {
            return 0..0;
        }
        if len <= rows {
            return 0..len;
        }
        let start = self.cursor.saturating_sub(rows / 2).min(len - rows);
        start..start + rows
    }

    /// Draw centered over `area`.
    pub fn render(&self, f: &mut Frame, area: Rect) {
        // borders, search line, hint line
        let chrome = 4;
        let wanted = self.visible.len().max(1) as u16 + chrome;
        let popup = centered_rect(
            PICKER_WIDTH.min(area.width.saturating_sub(2)),
            wanted.min(area.height.saturating_sub(2)),
            area,
        );
        let rows = popup.height.saturating_sub(chrome) as usize;
        let text_width = popup.width.saturating_sub(6) as usize;

        let mut lines = vec![Line::from(vec![
            Span::styled("> ", Style::default().fg(Color::Cyan)),
            Span::styled(self.query.clone(), Style::default().fg(Color::White)),
            Span::styled("█", Style::default().fg(Color::DarkGray)),
        ])];

        if self.visible.is_empty() {
            lines.push(Line::from(Span::styled("  No matches", muted_style())));
        }
        for pos in self.window(rows) {
            let item = &self.items[self.visible[pos]];
            let is_selected = pos == self.cursor;
            let marker = if is_selected { "> " } else { "  " };
            let label = match &item.icon {
                Some(icon) => format!("{} {}", icon, item.label),
                None => item.label.clone(),
            };
            let style = if is_selected {
                selected_style()
            } else {
                Style::default().fg(Color::Gray)
            };
            lines.push(Line::from(Span::styled(
                format!("{}{}", marker, truncate_str(&label, text_width)),
                style,
            )));
        }
        lines.push(Line::from(Span::styled(HINT, muted_style())));

        let block = Block::default()
            .title(Span::styled(
                format!(" {} ", self.title),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan));

        f.render_widget(Clear, popup);
        f.render_widget(Paragraph::new(lines).block(block), popup);
    }
}
