use std::io::{self, Write};
use crossterm::{cursor, queue, style::{Color, SetForegroundColor, ResetColor, Print}};

use crate::model::ResourceKind;

/// Context menu for a view: the keys that do something there.
pub fn menu_line(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Container => {
            "s start  t stop  r restart  l logs  e shell  i inspect  d rm  S stop all  D rm all  p prune  X nuke  q quit"
        }
        ResourceKind::Image | ResourceKind::Volume => {
            "i inspect  d rm  D rm all  p prune  X nuke  f refresh  ←/→ tabs  q quit"
        }
        ResourceKind::Network => {
            "i inspect  d rm  D rm custom  p prune  X nuke  f refresh  ←/→ tabs  q quit"
        }
        ResourceKind::FtpSetting => "t toggle  i inspect  d disable  f refresh  q quit",
    }
}

pub fn render_menu(out: &mut impl Write, kind: ResourceKind, y: u16, cols: u16) -> io::Result<()> {
    let help = super::truncate_str(menu_line(kind), (cols as usize).saturating_sub(2));
    queue!(
        out,
        cursor::MoveTo(1, y),
        SetForegroundColor(Color::DarkGrey),
        Print(help),
        ResetColor
    )?;
    Ok(())
}
