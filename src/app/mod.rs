mod event_loop;
mod input;
mod keys;
mod render;
mod session;
mod state;
mod teardown;

#[cfg(test)]
pub(crate) mod fake;

use crate::error::ManagerError;
use crate::manager::ResourceManager;
use crate::model::{ConsoleKind, ResourceKind, StatusMessage, StatusSlot, ViewModel};

pub use event_loop::run_loop;
pub use input::{handle_key, keymap, Outcome};
pub use keys::{classify_escape, from_key_event, ByteKeys, Key, KeySource};
pub use session::{restore_terminal, QuitSignals, Session, TerminalGuard, TtySession};
pub use state::{Action, Detail, DispatchState, PendingConfirmation, Target};
pub use teardown::{bulk, bulk_targets, nuke, NukeReport, NukeStep};

/// Everything the console loop owns between keystrokes.
pub struct Console<M> {
    pub manager: M,
    pub kind: ConsoleKind,
    pub view: ViewModel,
    pub state: DispatchState,
    pub status: StatusSlot,
    pub detail: Option<Detail>,
    /// Skip every confirmation gate (`--yes`).
    pub assume_yes: bool,
}

impl<M: ResourceManager> Console<M> {
    pub fn new(manager: M, kind: ConsoleKind, assume_yes: bool) -> Self {
        Self {
            manager,
            kind,
            view: ViewModel::new(kind.tabs()),
            state: DispatchState::Idle,
            status: StatusSlot::default(),
            detail: None,
            assume_yes,
        }
    }

    /// Pending confirmation, if the dispatcher is waiting for one.
    pub fn pending(&self) -> Option<&PendingConfirmation> {
        match &self.state {
            DispatchState::AwaitingConfirmation(p) => Some(p),
            DispatchState::Idle => None,
        }
    }

    /// Switch tabs; a view switch also drops the status line.
    pub fn switch_view(&mut self, kind: ResourceKind) -> Result<(), ManagerError> {
        self.status.clear();
        let result = self.view.switch_view(kind, &mut self.manager);
        self.absorb(result)
    }

    /// Reload the current view, keeping the cursor where possible.
    pub fn refresh_view(&mut self) -> Result<(), ManagerError> {
        let result = self.view.reload(&mut self.manager);
        self.absorb(result)
    }

    /// Turn the outcome of an executed action into the status line.
    /// Only an unreachable manager escapes as an error.
    pub(crate) fn report(&mut self, result: Result<String, ManagerError>) -> Result<(), ManagerError> {
        match result {
            Ok(msg) => {
                tracing::info!(%msg, "action succeeded");
                self.status.set(StatusMessage::success(msg));
                Ok(())
            }
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                tracing::warn!(error = %e, "action failed");
                self.status.set(StatusMessage::error(e.to_string()));
                Ok(())
            }
        }
    }

    fn absorb(&mut self, result: Result<(), ManagerError>) -> Result<(), ManagerError> {
        match result {
            Ok(()) => Ok(()),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                tracing::warn!(error = %e, "listing failed");
                self.status.set(StatusMessage::error(e.to_string()));
                Ok(())
            }
        }
    }
}

/// Run a console on the real terminal until the operator quits, the input
/// is interrupted, or the manager becomes unreachable.
///
/// The terminal is restored on every exit path, including panics.
pub fn run<M: ResourceManager>(
    manager: M,
    kind: ConsoleKind,
    assume_yes: bool,
    signals: QuitSignals,
) -> Result<(), ManagerError> {
    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore_terminal();
        previous_hook(info);
    }));

    let mut console = Console::new(manager, kind, assume_yes);
    let _guard = TerminalGuard::enter()?;
    let mut session = TtySession::new(signals);

    tracing::info!(console = ?kind, assume_yes, "console started");
    let result = console
        .switch_view(console.view.current())
        .and_then(|()| run_loop(&mut console, &mut session));
    tracing::info!(ok = result.is_ok(), "console stopped");
    result
}
