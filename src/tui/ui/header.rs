//! Header, tab bar and search bar rendering.

use super::layout::{display_width, truncate_to_width};
use crate::tui::app::App;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(
        " lazyliner ",
        Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::BOLD),
    )];
    if let Some(project) = &app.current_project {
        spans.push(Span::styled("│ ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled(
            project.name.clone(),
            Style::default().fg(Color::Cyan),
        ));
    }

    let viewer = app
        .viewer
        .as_ref()
        .map(|v| {
            let name = if v.display_name.is_empty() {
                &v.name
            } else {
                &v.display_name
            };
            format!("@{} ", name)
        })
        .unwrap_or_default();

    let used: usize = spans.iter().map(|s| display_width(&s.content)).sum();
    let gap = (area.width as usize).saturating_sub(used + display_width(&viewer));
    if gap > 0 {
        spans.push(Span::raw(" ".repeat(gap)));
        spans.push(Span::styled(viewer, Style::default().fg(Color::DarkGray)));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

pub fn draw_tabs(f: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for (i, tab) in app.tabs().iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" │ ", Style::default().fg(Color::DarkGray)));
        }
        let style = if *tab == app.tab {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!("{} {}", i + 1, tab.title()), style));
    }

    if let Some(project) = &app.filter_project {
        let label = format!("  Project: {} ", project.name);
        let used: usize = spans.iter().map(|s| display_width(&s.content)).sum();
        let gap = (area.width as usize).saturating_sub(used + display_width(&label));
        spans.push(Span::raw(" ".repeat(gap)));
        spans.push(Span::styled(label, Style::default().fg(Color::Yellow)));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// One-line search bar shown while typing or while a query is applied.
pub fn draw_search(f: &mut Frame, app: &App, area: Rect) {
    let results = format!(" ({} results)", app.displayed_issues().len());
    let query_width = (area.width as usize)
        .saturating_sub(display_width(&results) + 4)
        .max(1);

    let mut spans = vec![
        Span::styled(" / ", Style::default().fg(Color::Yellow)),
        Span::styled(
            truncate_to_width(&app.search.query, query_width),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
    ];
    if app.search.active {
        spans.push(Span::styled("█", Style::default().fg(Color::DarkGray)));
    }
    if !app.search.query.is_empty() {
        spans.push(Span::styled(results, Style::default().fg(Color::DarkGray)));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
