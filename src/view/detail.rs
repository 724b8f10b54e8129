use std::io::{self, Write};
use crossterm::{cursor, queue, style::{Attribute, Color, ResetColor, SetAttribute, SetForegroundColor}};

use crate::app::Detail;
use super::shared::{safe_truncate, writeln};

/// Inspect output over the list area. Lines beyond the screen are cut off.
pub fn render_detail(out: &mut impl Write, detail: &Detail, cols: u16, rows: u16) -> io::Result<()> {
    queue!(out, cursor::MoveTo(0, 2), SetAttribute(Attribute::Bold))?;
    writeln(out, &format!("  {}", detail.title))?;
    queue!(out, SetAttribute(Attribute::Reset))?;

    let body_rows = (rows as usize).saturating_sub(5);
    let lines: Vec<&str> = detail.body.lines().collect();
    for line in lines.iter().take(body_rows) {
        writeln(out, &format!("  {}", safe_truncate(line, (cols as usize).saturating_sub(2))))?;
    }

    let hidden = lines.len().saturating_sub(body_rows);
    queue!(out, cursor::MoveTo(1, rows.saturating_sub(1)), SetForegroundColor(Color::DarkGrey))?;
    if hidden > 0 {
        write!(out, "({} more lines) any key to close", hidden)?;
    } else {
        write!(out, "any key to close")?;
    }
    queue!(out, ResetColor)?;
    Ok(())
}
