use crate::error::ManagerError;
use crate::manager::ResourceManager;
use crate::model::StatusMessage;

use super::input::{handle_key, Outcome};
use super::keys::Key;
use super::render;
use super::session::Session;
use super::Console;

/// load -> render -> read one key -> dispatch, until quit.
///
/// Every turn reloads the current view, so nothing shown is older than the
/// last keystroke. Returns `Err` only when the manager is unreachable or the
/// terminal fails.
pub fn run_loop<M: ResourceManager, S: Session>(
    console: &mut Console<M>,
    session: &mut S,
) -> Result<(), ManagerError> {
    loop {
        let (cols, rows) = session.size()?;
        console.refresh_view()?;
        render::render(session.out(), console, cols, rows)?;

        let key = session.next_key()?;

        if console.detail.take().is_some() {
            // Any key closes the detail pane.
            if key == Key::Interrupted {
                break;
            }
            console.status.end_turn();
            continue;
        }

        match handle_key(console, key)? {
            Outcome::Quit => break,
            Outcome::Continue => {}
            Outcome::Handoff(handoff) => {
                if let Err(e) = session.handoff(&handoff) {
                    console
                        .status
                        .set(StatusMessage::error(format!("{} failed: {}", handoff, e)));
                }
            }
        }

        console.status.end_turn();
    }
    Ok(())
}
