//! Drawing. Stateless: everything comes from the console's view model.

mod confirmation;
mod detail;
mod items;
mod menu;
mod shared;
mod tab_bar;

use std::io::{self, Write};

use crossterm::{cursor, queue, style::{Color, SetForegroundColor, ResetColor}};

use crate::app::Detail;
use crate::model::{ResourceKind, StatusMessage, ViewModel};

pub use items::{heading, row_text};
pub use menu::menu_line;
pub use shared::{safe_truncate, truncate_str};

/// Minimum terminal dimensions for usable rendering.
pub const MIN_COLS: u16 = 60;
pub const MIN_ROWS: u16 = 10;

/// Screen rows used by each part of the console.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rows {
    pub columns: u16,
    pub list_top: u16,
    pub list_height: usize,
    pub status: u16,
    pub prompt: u16,
    pub menu: u16,
}

impl Rows {
    pub fn for_height(rows: u16) -> Self {
        let menu = rows.saturating_sub(1);
        let prompt = rows.saturating_sub(2);
        let status = rows.saturating_sub(3);
        let list_top = 3;
        Self {
            columns: 2,
            list_top,
            list_height: status.saturating_sub(list_top) as usize,
            status,
            prompt,
            menu,
        }
    }
}

pub struct Presenter;

impl Presenter {
    /// Check if the terminal is large enough. If not, render a "too small"
    /// message and return `true` (meaning "skip normal rendering").
    pub fn render_size_guard(out: &mut impl Write, cols: u16, rows: u16) -> io::Result<bool> {
        if cols < MIN_COLS || rows < MIN_ROWS {
            let msg = format!(
                "Terminal too small ({}x{}). Resize to at least {}x{}.",
                cols, rows, MIN_COLS, MIN_ROWS
            );
            let y = rows / 2;
            let x = cols.saturating_sub(msg.len() as u16) / 2;
            queue!(out, cursor::MoveTo(x, y), SetForegroundColor(Color::Yellow))?;
            write!(out, "{}", msg)?;
            queue!(out, ResetColor)?;
            out.flush()?;
            return Ok(true);
        }
        Ok(false)
    }

    pub fn render_tab_bar(
        out: &mut impl Write,
        title: &str,
        view: &ViewModel,
        cols: u16,
    ) -> io::Result<()> {
        tab_bar::render_tab_bar(out, title, view, cols)
    }

    pub fn render_items(out: &mut impl Write, view: &ViewModel, rows: Rows, cols: u16) -> io::Result<()> {
        items::render_items(out, view, rows, cols)
    }

    pub fn render_status(
        out: &mut impl Write,
        status: Option<&StatusMessage>,
        rows: Rows,
        cols: u16,
    ) -> io::Result<()> {
        shared::write_status(out, status, rows.status, cols)
    }

    pub fn render_menu(out: &mut impl Write, kind: ResourceKind, rows: Rows, cols: u16) -> io::Result<()> {
        menu::render_menu(out, kind, rows.menu, cols)
    }

    pub fn render_confirmation(out: &mut impl Write, prompt: &str, rows: Rows, cols: u16) -> io::Result<()> {
        confirmation::render_confirmation(out, prompt, rows.prompt, cols)
    }

    pub fn render_detail(out: &mut impl Write, detail: &Detail, cols: u16, rows: u16) -> io::Result<()> {
        detail::render_detail(out, detail, cols, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_leave_room_for_footer() {
        let rows = Rows::for_height(24);
        assert_eq!(rows.menu, 23);
        assert_eq!(rows.prompt, 22);
        assert_eq!(rows.status, 21);
        assert_eq!(rows.list_height, 18);
    }

    #[test]
    fn size_guard_rejects_tiny_terminals() {
        let mut buf = Vec::new();
        assert!(Presenter::render_size_guard(&mut buf, 40, 5).unwrap());
        assert!(String::from_utf8_lossy(&buf).contains("Terminal too small (40x5)"));

        let mut buf = Vec::new();
        assert!(!Presenter::render_size_guard(&mut buf, 120, 40).unwrap());
        assert!(buf.is_empty());
    }
}
