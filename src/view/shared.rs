use std::io::{self, Write};
use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Color, SetForegroundColor, SetBackgroundColor, ResetColor},
};

use crate::model::{StatusLevel, StatusMessage};

/// Truncate a string to at most `max_len` characters (not bytes), appending "..."
/// if truncated. Safe for multi-byte UTF-8.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_len {
        s.to_string()
    } else {
        let keep = max_len.saturating_sub(3);
        let truncated: String = s.chars().take(keep).collect();
        format!("{}...", truncated)
    }
}

/// Truncate a string to at most `max_len` bytes for display. Returns a &str
/// slice up to the last valid char boundary within `max_len` bytes.
pub fn safe_truncate(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

pub fn writeln(out: &mut impl Write, text: &str) -> io::Result<()> {
    write!(out, "{}\r\n", text)
}

pub fn write_selectable(out: &mut impl Write, text: &str, selected: bool) -> io::Result<()> {
    if selected {
        queue!(out, SetBackgroundColor(Color::DarkGrey), SetForegroundColor(Color::White))?;
    }
    write!(out, "{}\r\n", text)?;
    if selected {
        queue!(out, ResetColor)?;
    }
    Ok(())
}

/// Draw the status line at row `y`, or nothing.
pub fn write_status(
    out: &mut impl Write,
    status: Option<&StatusMessage>,
    y: u16,
    cols: u16,
) -> io::Result<()> {
    let Some(msg) = status else { return Ok(()) };
    let color = match msg.level {
        StatusLevel::Success => Color::Green,
        StatusLevel::Warn => Color::Yellow,
        StatusLevel::Error => Color::Red,
    };
    let text = truncate_str(&format!("  {}", msg.text), cols as usize);
    queue!(out, MoveTo(0, y), SetForegroundColor(color))?;
    write!(out, "{}", text)?;
    queue!(out, ResetColor)?;
    Ok(())
}
