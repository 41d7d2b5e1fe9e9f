//! View models.
//!
//! Each view owns its cursor/scroll/form state, reacts to keys, and renders
//! itself into a frame area. Views never issue I/O: anything that needs the
//! network is returned to the app as an action.

pub mod detail;
pub mod form;
pub mod help;
pub mod kanban;
pub mod list;
pub mod markdown;
pub mod picker;
pub mod setup;

pub use detail::DetailView;
pub use form::{CreateForm, EditForm, FormAction};
pub use help::HelpTab;
pub use kanban::{KanbanAction, KanbanView};
pub use list::ListView;
pub use picker::{PickerAction, PickerItem, PickerView};
pub use setup::SetupView;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::style::{Color, Modifier, Style};

/// Background of the selected row, card or picker entry.
pub const SELECTED_BG: Color = Color::Rgb(30, 40, 60);

pub fn selected_style() -> Style {
    Style::default()
        .bg(SELECTED_BG)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD)
}

pub fn muted_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Logical navigation keys shared by the list-like views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    Up,
    Down,
    PageUp,
    PageDown,
    Top,
    Bottom,
}

impl Nav {
    /// Vim-style and arrow navigation: j/k, g/G, ctrl+d/ctrl+u.
    pub fn from_key(key: &KeyEvent) -> Option<Nav> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Up | KeyCode::Char('k') if !ctrl => Some(Nav::Up),
            KeyCode::Down | KeyCode::Char('j') if !ctrl => Some(Nav::Down),
            KeyCode::PageUp => Some(Nav::PageUp),
            KeyCode::PageDown => Some(Nav::PageDown),
            KeyCode::Char('u') if ctrl => Some(Nav::PageUp),
            KeyCode::Char('d') if ctrl => Some(Nav::PageDown),
            KeyCode::Home => Some(Nav::Top),
            KeyCode::End | KeyCode::Char('G') => Some(Nav::Bottom),
            _ => None,
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};

    /// Render with `draw` into an offscreen terminal and return the rows.
    pub fn render_rows<F>(width: u16, height: u16, draw: F) -> Vec<String>
    where
        F: FnOnce(&mut ratatui::Frame),
    {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(draw).unwrap();
        buffer_rows(terminal.backend().buffer())
    }

    pub fn buffer_rows(buffer: &Buffer) -> Vec<String> {
        let area = buffer.area;
        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect()
    }

    pub fn contains(rows: &[String], needle: &str) -> bool {
        rows.iter().any(|row| row.contains(needle))
    }
}
