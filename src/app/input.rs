use crate::error::ManagerError;
use crate::handoff::Handoff;
use crate::manager::{ResourceManager, Verb};
use crate::model::{Direction, ResourceKind, StatusMessage};

use super::keys::Key;
use super::state::{Action, Detail, DispatchState, PendingConfirmation, Target};
use super::teardown;
use super::Console;

/// What the loop should do after a key was handled.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Quit,
    /// Hand the terminal to an external program, then resume.
    Handoff(Handoff),
}

/// Map a key to an action for the given view. `None` means the key does
/// nothing there.
pub fn keymap(kind: ResourceKind, key: Key) -> Option<Action> {
    let global = match key {
        Key::Interrupted | Key::Char('q') => Some(Action::Quit),
        Key::Up | Key::Char('k') => Some(Action::Move(Direction::Up)),
        Key::Down | Key::Char('j') => Some(Action::Move(Direction::Down)),
        Key::Right | Key::Char('\t') => Some(Action::NextTab),
        Key::Left => Some(Action::PrevTab),
        Key::Char(c @ '1'..='4') => Some(Action::JumpTab(c as usize - '1' as usize)),
        Key::Char('f') => Some(Action::Refresh),
        Key::Char('i' | '\r' | '\n') => Some(Action::Inspect),
        _ => None,
    };
    if global.is_some() {
        return global;
    }

    let Key::Char(c) = key else { return None };
    match (kind, c) {
        (ResourceKind::Container, 's') => Some(Action::Apply(Verb::Start)),
        (ResourceKind::Container, 't') => Some(Action::Apply(Verb::Stop)),
        (ResourceKind::Container, 'r') => Some(Action::Apply(Verb::Restart)),
        (ResourceKind::Container, 'l') => Some(Action::Logs),
        (ResourceKind::Container, 'e') => Some(Action::Shell),
        (ResourceKind::Container, 'S') => Some(Action::StopAll),
        (ResourceKind::FtpSetting, 't') => Some(Action::Apply(Verb::Toggle)),
        (ResourceKind::FtpSetting, 'd') => Some(Action::Remove),
        (ResourceKind::FtpSetting, _) => None,
        (_, 'd') => Some(Action::Remove),
        (_, 'D') => Some(Action::RemoveAll),
        (_, 'p') => Some(Action::Prune),
        (_, 'X') => Some(Action::Nuke),
        _ => None,
    }
}

/// Handle one decoded key.
///
/// Only a fatal manager error (unreachable) is returned as `Err`; every other
/// failure ends up in the status line.
pub fn handle_key<M: ResourceManager>(
    console: &mut Console<M>,
    key: Key,
) -> Result<Outcome, ManagerError> {
    if key == Key::Interrupted {
        console.state = DispatchState::Idle;
        return Ok(Outcome::Quit);
    }

    if let DispatchState::AwaitingConfirmation(pending) = std::mem::take(&mut console.state) {
        return answer_confirmation(console, pending, key);
    }

    let kind = console.view.current();
    let Some(action) = keymap(kind, key) else {
        return Ok(Outcome::Continue);
    };

    let target = if action.needs_selection() {
        match console.view.selected_item() {
            Some(item) => Some(Target::of(item)),
            None => {
                console.status.set(StatusMessage::warn("Nothing selected"));
                return Ok(Outcome::Continue);
            }
        }
    } else {
        None
    };

    if action.is_destructive() {
        if console.assume_yes {
            execute_destructive(console, action, kind, target)?;
        } else {
            let pending = PendingConfirmation::new(action, kind, target);
            tracing::debug!(prompt = %pending.prompt, "awaiting confirmation");
            console.state = DispatchState::AwaitingConfirmation(pending);
        }
        return Ok(Outcome::Continue);
    }

    execute_direct(console, action, kind, target)
}

fn answer_confirmation<M: ResourceManager>(
    console: &mut Console<M>,
    pending: PendingConfirmation,
    key: Key,
) -> Result<Outcome, ManagerError> {
    if !matches!(key, Key::Char('y' | 'Y')) {
        tracing::info!(action = ?pending.action, "cancelled");
        console.status.set(StatusMessage::warn("Cancelled"));
        return Ok(Outcome::Continue);
    }
    if let Some(next) = pending.next_stage() {
        console.state = DispatchState::AwaitingConfirmation(next);
        return Ok(Outcome::Continue);
    }
    execute_destructive(console, pending.action, pending.kind, pending.target)?;
    Ok(Outcome::Continue)
}

fn execute_direct<M: ResourceManager>(
    console: &mut Console<M>,
    action: Action,
    kind: ResourceKind,
    target: Option<Target>,
) -> Result<Outcome, ManagerError> {
    match (action, target) {
        (Action::Quit, _) => return Ok(Outcome::Quit),
        (Action::Move(direction), _) => console.view.move_selection(direction),
        (Action::NextTab, _) => {
            let next = console.view.next_tab();
            console.switch_view(next)?;
        }
        (Action::PrevTab, _) => {
            let prev = console.view.prev_tab();
            console.switch_view(prev)?;
        }
        (Action::JumpTab(index), _) => {
            if let Some(tab) = console.view.tab_at(index) {
                console.switch_view(tab)?;
            }
        }
        (Action::Refresh, _) => {
            let result = console.view.reload(&mut console.manager);
            console.report(result.map(|()| "Refreshed".to_string()))?;
        }
        (Action::Apply(verb), Some(t)) => {
            let result = console.manager.mutate(kind, verb, &t.id);
            console.report(result.map(|()| format!("{} {}", verb.past_tense(), t.name)))?;
        }
        (Action::Inspect, Some(t)) => match console.manager.inspect(kind, &t.id) {
            Ok(body) => {
                console.detail = Some(Detail {
                    title: format!("{} {}", kind, t.name),
                    body,
                });
            }
            Err(e) => console.report(Err(e))?,
        },
        (Action::Logs, Some(t)) => return Ok(Outcome::Handoff(Handoff::logs(&t.id))),
        (Action::Shell, Some(t)) => return Ok(Outcome::Handoff(Handoff::shell(&t.id))),
        (other, _) => tracing::warn!(action = ?other, "action has no direct handler"),
    }
    Ok(Outcome::Continue)
}

fn execute_destructive<M: ResourceManager>(
    console: &mut Console<M>,
    action: Action,
    kind: ResourceKind,
    target: Option<Target>,
) -> Result<(), ManagerError> {
    tracing::info!(?action, %kind, target = ?target.as_ref().map(|t| &t.id), "executing");
    let result = match (action, target) {
        (Action::Remove, Some(t)) => console
            .manager
            .mutate(kind, Verb::Remove, &t.id)
            .map(|()| format!("Removed {}", t.name)),
        (Action::StopAll, _) => teardown::bulk(&mut console.manager, ResourceKind::Container, Verb::Stop)
            .and_then(|o| batch_result(o, Verb::Stop, ResourceKind::Container)),
        (Action::RemoveAll, _) => teardown::bulk(&mut console.manager, kind, Verb::Remove)
            .and_then(|o| batch_result(o, Verb::Remove, kind)),
        (Action::Prune, _) => console.manager.prune(kind),
        (Action::Nuke, _) => {
            let report = teardown::nuke(&mut console.manager);
            let summary = report.summary();
            if report.clean_steps() == report.steps.len() {
                Ok(summary)
            } else {
                Err(ManagerError::Rejected(summary))
            }
        }
        (other, _) => {
            tracing::warn!(action = ?other, "destructive action without target");
            return Ok(());
        }
    };
    console.report(result)
}

fn batch_result(
    outcome: crate::manager::BatchOutcome,
    verb: Verb,
    kind: ResourceKind,
) -> Result<String, ManagerError> {
    if let Some(fatal) = outcome.fatal() {
        return Err(ManagerError::Unreachable(fatal.to_string()));
    }
    let summary = outcome.summary(verb, kind);
    if outcome.is_clean() {
        Ok(summary)
    } else {
        Err(ManagerError::Rejected(summary))
    }
}
