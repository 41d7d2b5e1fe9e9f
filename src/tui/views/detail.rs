//! Read-only, scrollable view of a single issue.

use super::markdown::render_markdown;
use super::{muted_style, Nav};
use crate::data::Issue;
use crate::tui::ui::layout::wrap_text;
use crate::tui::ui::status::{priority_config, state_config};
use chrono::{DateTime, Utc};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

const PADDING: u16 = 2;

#[derive(Debug, Clone)]
pub struct DetailView {
    issue: Issue,
    scroll: usize,
    width: u16,
    height: u16,
    content_height: usize,
}

impl DetailView {
    pub fn new(issue: Issue, width: u16, height: u16) -> Self {
        let mut view = Self {
            issue,
            scroll: 0,
            width,
            height,
            content_height: 0,
        };
        view.measure();
        view
    }

    pub fn issue(&self) -> &Issue {
        &self.issue
    }

    /// Swap in a newer snapshot of the same issue, keeping the scroll position.
    pub fn set_issue(&mut self, issue: Issue) {
        self.issue = issue;
        self.measure();
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.measure();
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    fn max_scroll(&self) -> usize {
        self.content_height.saturating_sub(self.height as usize)
    }

    fn measure(&mut self) {
        self.content_height = self.lines(Utc::now()).len();
        self.scroll = self.scroll.min(self.max_scroll());
    }

    pub fn handle_nav(&mut self, nav: Nav) {
        let page = (self.height as usize).saturating_sub(2).max(1);
        self.scroll = match nav {
            Nav::Up => self.scroll.saturating_sub(1),
            Nav::Down => self.scroll + 1,
            Nav::PageUp => self.scroll.saturating_sub(page),
            Nav::PageDown => self.scroll + page,
            Nav::Top => 0,
            Nav::Bottom => self.max_scroll(),
        }
        .min(self.max_scroll());
    }

    fn text_width(&self) -> usize {
        self.width.saturating_sub(PADDING * 2).max(20) as usize
    }

    /// All content lines, unscrolled. `now` anchors the relative timestamps.
    pub fn lines(&self, now: DateTime<Utc>) -> Vec<Line<'static>> {
        let issue = &self.issue;
        let label_style = Style::default().fg(Color::DarkGray);
        let value_style = Style::default().fg(Color::White);
        let field = |name: &str, value: String| {
            Line::from(vec![
                Span::styled(format!("{}: ", name), label_style),
                Span::styled(value, value_style),
            ])
        };

        let mut lines = vec![Line::from(Span::styled(
            issue.identifier.clone(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))];
        for chunk in wrap_text(&issue.title, self.text_width()) {
            lines.push(Line::from(Span::styled(
                chunk,
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )));
        }
        lines.push(Line::from(""));

        let state_type = issue
            .state
            .as_ref()
            .map(|s| s.state_type)
            .unwrap_or(crate::data::StateType::Unknown);
        let state = state_config(state_type);
        lines.push(Line::from(vec![
            Span::styled("Status: ", label_style),
            Span::styled(format!("{} ", state.icon), state.style),
            Span::styled(issue.state_name().to_string(), value_style),
        ]));

        let priority = priority_config(issue.priority);
        lines.push(Line::from(vec![
            Span::styled("Priority: ", label_style),
            Span::styled(format!("{} ", priority.icon), priority.style),
            Span::styled(issue.priority.label().to_string(), value_style),
        ]));

        lines.push(field("Assignee", issue.assignee_name().to_string()));
        lines.push(field(
            "Project",
            issue
                .project
                .as_ref()
                .map(|p| p.name.clone())
                .unwrap_or_else(|| "None".to_string()),
        ));
        lines.push(field(
            "Team",
            issue
                .team
                .as_ref()
                .map(|t| t.name.clone())
                .unwrap_or_else(|| "None".to_string()),
        ));
        if let Some(due) = issue.due_date.as_deref().filter(|d| !d.is_empty()) {
            lines.push(field("Due", due.to_string()));
        }
        lines.push(field("Created", relative_time(issue.created_at, now)));
        lines.push(field("Updated", relative_time(issue.updated_at, now)));
        if !issue.labels.is_empty() {
            let names: Vec<&str> = issue.labels.iter().map(|l| l.name.as_str()).collect();
            lines.push(field("Labels", names.join(", ")));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "─".repeat(self.text_width().min(60)),
            muted_style(),
        )));
        lines.push(Line::from(""));

        if issue.description.trim().is_empty() {
            lines.push(Line::from(Span::styled("No description", muted_style())));
        } else {
            lines.extend(render_markdown(&issue.description, self.text_width()));
        }
        lines
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let inner = Rect {
            x: area.x + PADDING.min(area.width),
            width: area.width.saturating_sub(PADDING * 2),
            ..area
        };
        let lines: Vec<Line> = self
            .lines(Utc::now())
            .into_iter()
            .skip(self.scroll)
            .take(inner.height as usize)
            .collect();
        f.render_widget(Paragraph::new(lines), inner);
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", n, unit)
    }
}

/// Human-friendly age of a timestamp, e.g. "3 hours ago" or "Jan 2, 2024".
pub fn relative_time(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now.signed_duration_since(ts);
    let minutes = diff.num_minutes();
    let hours = diff.num_hours();
    let days = diff.num_days();

    if minutes < 1 {
        "just now".to_string()
    } else if hours < 1 {
        plural(minutes, "minute")
    } else if days < 1 {
        plural(hours, "hour")
    } else if days < 7 {
        plural(days, "day")
    } else if days < 30 {
        plural(days / 7, "week")
    } else {
        ts.format("%b %-d, %Y").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{at, issue, label, user};
    use crate::tui::views::testing::{contains, render_rows};
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn text(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn relative_time_buckets() {
        let now = at(12);
        assert_eq!(relative_time(now - Duration::seconds(30), now), "just now");
        assert_eq!(relative_time(now - Duration::minutes(1), now), "1 minute ago");
        assert_eq!(relative_time(now - Duration::minutes(45), now), "45 minutes ago");
        assert_eq!(relative_time(now - Duration::hours(3), now), "3 hours ago");
        assert_eq!(relative_time(now - Duration::days(1), now), "1 day ago");
        assert_eq!(relative_time(now - Duration::days(15), now), "2 weeks ago");
        assert_eq!(relative_time(now - Duration::days(90), now), "Feb 1, 2024");
        assert_eq!(relative_time(now + Duration::hours(1), now), "just now");
    }

    #[test]
    fn missing_relations_use_fallbacks() {
        let mut bare = issue("ABC-12");
        bare.state = None;
        let view = DetailView::new(bare, 80, 30);
        let lines = text(&view.lines(at(12)));
        assert!(lines.contains(&"Status: ◌ Unknown".to_string()));
        assert!(lines.contains(&"Assignee: Unassigned".to_string()));
        assert!(lines.contains(&"Project: None".to_string()));
        assert!(lines.contains(&"No description".to_string()));
    }

    #[test]
    fn shows_labels_and_assignee() {
        let mut full = issue("ABC-12");
        full.assignee = Some(user("u1", "Dana"));
        full.labels = vec![label("l1", "Bug"), label("l2", "UI")];
        full.due_date = Some("2024-06-01".to_string());
        let view = DetailView::new(full, 80, 30);
        let lines = text(&view.lines(at(12)));
        assert!(lines.contains(&"Assignee: Dana".to_string()));
        assert!(lines.contains(&"Labels: Bug, UI".to_string()));
        assert!(lines.contains(&"Due: 2024-06-01".to_string()));
    }

    #[test]
    fn scroll_is_clamped_to_content() {
        let mut long = issue("ABC-1");
        long.description = (0..40).map(|i| format!("line {i}\n\n")).collect();
        let mut view = DetailView::new(long, 60, 10);
        view.handle_nav(Nav::Bottom);
        let max = view.scroll();
        assert!(max > 0);
        view.handle_nav(Nav::Down);
        assert_eq!(view.scroll(), max);
        view.handle_nav(Nav::Top);
        assert_eq!(view.scroll(), 0);
        view.handle_nav(Nav::Up);
        assert_eq!(view.scroll(), 0);
    }

    #[test]
    fn renders_into_frame() {
        let view = DetailView::new(issue("ABC-12"), 60, 20);
        let rows = render_rows(60, 20, |f| {
            let area = f.area();
            view.render(f, area)
        });
        assert!(contains(&rows, "ABC-12"));
        assert!(contains(&rows, "Title of ABC-12"));
        assert!(contains(&rows, "No description"));
    }
}
