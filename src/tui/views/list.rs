use super::{muted_style, selected_style, Nav};
use crate::data::Issue;
use crate::tui::ui::icons;
use crate::tui::ui::layout::{pad_to_width, truncate_str};
use crate::tui::ui::status::{priority_config, state_config};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

const ID_WIDTH: usize = 10;
const PRIORITY_WIDTH: usize = 10;
const STATUS_WIDTH: usize = 16;
const MIN_TITLE_WIDTH: usize = 20;

/// Scrollable issue table with a single-row cursor.
#[derive(Debug, Clone, Default)]
pub struct ListView {
    issues: Vec<Issue>,
    cursor: usize,
    offset: usize,
    height: u16,
    show_ids: bool,
}

impl ListView {
    pub fn new(issues: Vec<Issue>, height: u16, show_ids: bool) -> Self {
        Self {
            issues,
            cursor: 0,
            offset: 0,
            height,
            show_ids,
        }
    }

    pub fn resize(&mut self, height: u16) {
        self.height = height;
        self.keep_cursor_visible();
    }

    /// Replace the rows, keeping the selection on the same issue when it survives.
    pub fn set_issues(&mut self, issues: Vec<Issue>) {
        let selected_id = self.selected().map(|i| i.id.clone());
        self.issues = issues;
        self.cursor = selected_id
            .and_then(|id| self.issues.iter().position(|i| i.id == id))
            .unwrap_or_else(|| self.cursor.min(self.issues.len().saturating_sub(1)));
        self.keep_cursor_visible();
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selected(&self) -> Option<&Issue> {
        self.issues.get(self.cursor)
    }

    /// Rows per page: the view height minus the position indicator and a spare line.
    pub fn page_size(&self) -> usize {
        (self.height as usize).saturating_sub(2).max(1)
    }

    /// Apply a navigation key. Returns false for keys the list ignores.
    pub fn handle_nav(&mut self, nav: Nav) -> bool {
        match nav {
            Nav::Up => self.move_up(),
            Nav::Down => self.move_down(),
            Nav::PageUp => self.page_up(),
            Nav::PageDown => self.page_down(),
            Nav::Top => self.top(),
            Nav::Bottom => self.bottom(),
        }
        true
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
        self.keep_cursor_visible();
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.issues.len() {
            self.cursor += 1;
        }
        self.keep_cursor_visible();
    }

    pub fn page_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(self.page_size());
        self.offset = self.cursor;
    }

    pub fn page_down(&mut self) {
        let last = self.issues.len().saturating_sub(1);
        self.cursor = (self.cursor + self.page_size()).min(last);
        self.keep_cursor_visible();
    }

    pub fn top(&mut self) {
        self.cursor = 0;
        self.offset = 0;
    }

    pub fn bottom(&mut self) {
        self.cursor = self.issues.len().saturating_sub(1);
        self.keep_cursor_visible();
    }

    fn keep_cursor_visible(&mut self) {
        let page = self.page_size();
        if self.cursor < self.offset {
            self.offset = self.cursor;
        } else if self.cursor >= self.offset + page {
            self.offset = self.cursor + 1 - page;
        }
        let max_offset = self.issues.len().saturating_sub(page);
        self.offset = self.offset.min(max_offset);
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        if self.issues.is_empty() {
            let y = area.y + area.height / 2;
            let placeholder = Paragraph::new(Line::from(Span::styled(
                "No issues found",
                muted_style(),
            )))
            .alignment(Alignment::Center);
            f.render_widget(placeholder, Rect::new(area.x, y, area.width, 1));
            return;
        }

        let page = self.page_size().min(area.height as usize);
        let width = area.width as usize;
        let id_width = if self.show_ids { ID_WIDTH + 2 } else { 0 };
        let title_width = width
            .saturating_sub(2 + id_width + PRIORITY_WIDTH + STATUS_WIDTH + 4)
            .max(MIN_TITLE_WIDTH);

        let mut lines: Vec<Line> = self
            .issues
            .iter()
            .enumerate()
            .skip(self.offset)
            .take(page)
            .map(|(i, issue)| self.row(issue, i == self.cursor, id_width, title_width))
            .collect();

        if self.issues.len() > page {
            let indicator = format!("{}/{} ", self.cursor + 1, self.issues.len());
            lines.push(
                Line::from(Span::styled(indicator, muted_style())).alignment(Alignment::Right),
            );
        }

        f.render_widget(Paragraph::new(lines), area);
    }

    fn row(&self, issue: &Issue, selected: bool, id_width: usize, title_width: usize) -> Line<'static> {
        let base = if selected {
            selected_style()
        } else {
            Style::default().fg(Color::Gray)
        };
        let cursor = if selected {
            format!("{} ", icons::CURSOR)
        } else {
            "  ".to_string()
        };

        let mut spans = vec![Span::styled(cursor, base.fg(Color::Cyan))];
        if id_width > 0 {
            spans.push(Span::styled(
                pad_to_width(&issue.identifier, id_width, Alignment::Left),
                base.fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ));
        }
        spans.push(Span::styled(
            pad_to_width(&truncate_str(&issue.title, title_width), title_width + 2, Alignment::Left),
            base,
        ));

        let priority = priority_config(issue.priority);
        let priority_text = format!("{} {}", priority.icon, issue.priority.label());
        spans.push(Span::styled(
            pad_to_width(&priority_text, PRIORITY_WIDTH + 2, Alignment::Left),
            base.patch(priority.style),
        ));

        let state = state_config(
            issue
                .state
                .as_ref()
                .map(|s| s.state_type)
                .unwrap_or(crate::data::StateType::Unknown),
        );
        let state_text = format!(
            "{} {}",
            state.icon,
            truncate_str(issue.state_name(), STATUS_WIDTH - 2)
        );
        spans.push(Span::styled(
            pad_to_width(&state_text, STATUS_WIDTH, Alignment::Left),
            base.patch(state.style),
        ));

        Line::from(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Priority, StateType, WorkflowState};
    use crate::tui::views::testing::{contains, render_rows};
    use chrono::{TimeZone, Utc};

    fn issue(n: usize) -> Issue {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        Issue {
            id: format!("id-{n}"),
            identifier: format!("ENG-{n}"),
            title: format!("Issue number {n}"),
            description: String::new(),
            priority: Priority::Medium,
            estimate: None,
            created_at: at,
            updated_at: at,
            due_date: None,
            branch_name: String::new(),
            url: String::new(),
            state: Some(WorkflowState {
                id: "s1".to_string(),
                name: "Todo".to_string(),
                color: String::new(),
                state_type: StateType::Unstarted,
                position: 0.0,
            }),
            assignee: None,
            creator: None,
            team: None,
            project: None,
            labels: vec![],
        }
    }

    fn issues(n: usize) -> Vec<Issue> {
        (1..=n).map(issue).collect()
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let mut list = ListView::new(issues(3), 10, true);
        list.move_up();
        assert_eq!(list.cursor(), 0);
        list.bottom();
        list.move_down();
        assert_eq!(list.cursor(), 2);
        list.page_down();
        assert_eq!(list.cursor(), 2);
        list.page_up();
        assert_eq!(list.cursor(), 0);
    }

    #[test]
    fn paging_scrolls_offset() {
        // height 6 -> 4 rows per page
        let mut list = ListView::new(issues(20), 6, true);
        list.page_down();
        assert_eq!(list.cursor(), 4);
        assert_eq!(list.offset, 1);
        list.bottom();
        assert_eq!(list.cursor(), 19);
        assert_eq!(list.offset, 16);
        list.top();
        assert_eq!(list.offset, 0);
    }

    #[test]
    fn set_issues_keeps_selection_by_id() {
        let mut list = ListView::new(issues(5), 10, true);
        list.move_down();
        list.move_down();
        assert_eq!(list.selected().unwrap().id, "id-3");

        let mut reordered = issues(5);
        reordered.reverse();
        list.set_issues(reordered);
        assert_eq!(list.selected().unwrap().id, "id-3");
        assert_eq!(list.cursor(), 2);

        list.bottom();
        list.set_issues((6..=7).map(issue).collect());
        assert_eq!(list.cursor(), 1);
    }

    #[test]
    fn empty_list_renders_placeholder() {
        let list = ListView::new(vec![], 5, true);
        assert!(list.selected().is_none());
        let rows = render_rows(40, 5, |f| {
            let area = f.area();
            list.render(f, area)
        });
        assert!(contains(&rows, "No issues found"));
    }

    #[test]
    fn rows_show_id_title_and_state() {
        let mut only = issue(7);
        only.state = None;
        let list = ListView::new(vec![issue(1), only], 6, true);
        let rows = render_rows(90, 6, |f| {
            let area = f.area();
            list.render(f, area)
        });
        assert!(contains(&rows, "ENG-1"));
        assert!(contains(&rows, "Issue number 1"));
        assert!(contains(&rows, "Todo"));
        assert!(contains(&rows, "Unknown"));
    }
}
