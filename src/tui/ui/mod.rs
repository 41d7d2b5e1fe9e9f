//! TUI rendering module.
//!
//! Views render themselves; this module lays out the frame around them:
//!
//! - `header` - app header, tab bar and search bar
//! - `status` - state/priority styling and the status bar
//! - `layout` - text measurement and popup geometry
//! - `icons` - glyphs shared by every view

pub mod header;
pub mod icons;
pub mod layout;
pub mod status;

pub use self::draw::draw;

mod draw {
    use super::header::{draw_header, draw_search, draw_tabs};
    use super::layout::centered_rect;
    use super::status::draw_status_bar;
    use crate::tui::app::{App, View};
    use crate::tui::views::help;
    use ratatui::{
        layout::{Alignment, Constraint, Direction, Layout, Rect},
        style::{Color, Style},
        text::{Line, Span},
        widgets::{Block, BorderType, Borders, Clear, Paragraph},
        Frame,
    };

    /// Main draw function - renders the entire TUI.
    pub fn draw(f: &mut Frame, app: &App) {
        let area = f.area();

        if let View::Setup(setup) = &app.view {
            setup.render(f, area);
            return;
        }

        let show_search = app.search.active || !app.search.query.is_empty();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),                      // Header
                Constraint::Length(1),                      // Tab bar
                Constraint::Length(u16::from(show_search)), // Search bar
                Constraint::Min(0),                         // Main content
                Constraint::Length(1),                      // Status bar
            ])
            .split(area);

        draw_header(f, app, chunks[0]);
        draw_tabs(f, app, chunks[1]);
        if show_search {
            draw_search(f, app, chunks[2]);
        }

        let content = chunks[3];
        match &app.view {
            View::List => app.list.render(f, content),
            View::Detail(detail) => detail.render(f, content),
            View::Create(form) => form.render(f, content),
            View::Edit(form) => form.render(f, content),
            View::Kanban(board) => board.render(f, content),
            View::Setup(_) => {}
        }
        draw_status_bar(f, app, chunks[4]);

        // Overlays
        if app.loading && matches!(app.view, View::List) {
            draw_loading(f, app, content);
        }
        if let Some(active) = &app.picker {
            active.picker.render(f, area);
        }
        if app.show_help {
            help::render(f, area, app.help_tab);
        }
    }

    fn draw_loading(f: &mut Frame, app: &App, area: Rect) {
        let popup = centered_rect(24, 3, area);
        f.render_widget(Clear, popup);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan));
        let text = Line::from(vec![
            Span::styled(app.spinner(), Style::default().fg(Color::Cyan)),
            Span::raw(" Loading issues..."),
        ]);
        f.render_widget(
            Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(block),
            popup,
        );
    }
}
