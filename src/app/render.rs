use std::io::{self, Write};

use crossterm::{cursor::MoveTo, queue, terminal::Clear, terminal::ClearType};

use crate::manager::ResourceManager;
use crate::view::{Presenter, Rows};

use super::Console;

pub fn render<W: Write, M: ResourceManager>(
    out: &mut W,
    console: &Console<M>,
    cols: u16,
    rows: u16,
) -> io::Result<()> {
    queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;

    if Presenter::render_size_guard(out, cols, rows)? {
        return Ok(());
    }
    let layout = Rows::for_height(rows);

    Presenter::render_tab_bar(out, console.kind.title(), &console.view, cols)?;

    if let Some(detail) = &console.detail {
        Presenter::render_detail(out, detail, cols, rows)?;
        return out.flush();
    }

    Presenter::render_items(out, &console.view, layout, cols)?;
    Presenter::render_status(out, console.status.get(), layout, cols)?;
    if let Some(pending) = console.pending() {
        Presenter::render_confirmation(out, &pending.prompt, layout, cols)?;
    }
    Presenter::render_menu(out, console.view.current(), layout, cols)?;
    out.flush()
}
