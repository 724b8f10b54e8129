use std::io::{self, Write};
use crossterm::{
    cursor, queue,
    style::{Color, SetForegroundColor, SetBackgroundColor, ResetColor},
};

use crate::model::ViewModel;

pub fn render_tab_bar(
    out: &mut impl Write,
    title: &str,
    view: &ViewModel,
    cols: u16,
) -> io::Result<()> {
    queue!(out, cursor::MoveTo(0, 0))?;
    write!(out, "  ")?;

    for (idx, kind) in view.tabs().iter().enumerate() {
        if *kind == view.current() {
            queue!(out, SetBackgroundColor(Color::DarkBlue), SetForegroundColor(Color::White))?;
            write!(out, " {} {} ({}) ", idx + 1, kind.title(), view.items().len())?;
        } else {
            queue!(out, SetForegroundColor(Color::DarkGrey))?;
            write!(out, " {} {} ", idx + 1, kind.title())?;
        }
        queue!(out, ResetColor)?;
        write!(out, " ")?;
    }

    // Right-align the title
    let title = format!("{} ", title);
    let col = (cols as usize).saturating_sub(title.chars().count());
    queue!(out, cursor::MoveTo(col as u16, 0), SetForegroundColor(Color::DarkGrey))?;
    write!(out, "{}", title)?;
    queue!(out, ResetColor)?;

    write!(out, "\r\n")?;
    let sep: String = "─".repeat(cols as usize);
    queue!(out, SetForegroundColor(Color::DarkGrey))?;
    write!(out, "{}\r\n", sep)?;
    queue!(out, ResetColor)?;

    Ok(())
}
