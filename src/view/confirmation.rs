use std::io::{self, Write};
use crossterm::{cursor::MoveTo, queue, style::{Color, SetBackgroundColor, SetForegroundColor, SetAttribute, Attribute, ResetColor}};

pub fn render_confirmation(out: &mut impl Write, prompt: &str, y: u16, cols: u16) -> io::Result<()> {
    let width = cols as usize;

    queue!(out, MoveTo(0, y))?;
    queue!(out, SetBackgroundColor(Color::DarkRed), SetForegroundColor(Color::White), SetAttribute(Attribute::Bold))?;
    let line = format!("  {} (y to confirm, any other key to cancel)  ", prompt);
    write!(out, "{:<width$}", super::truncate_str(&line, width), width = width)?;
    queue!(out, ResetColor, SetAttribute(Attribute::Reset))?;
    Ok(())
}
