use crate::manager::Verb;
use crate::model::{Direction, ResourceItem, ResourceKind};

/// What a key asks the console to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Quit,
    Move(Direction),
    NextTab,
    PrevTab,
    JumpTab(usize),
    Refresh,
    /// Non-destructive verb on the selected item (start, stop, toggle, ...).
    Apply(Verb),
    Inspect,
    Logs,
    Shell,
    /// Remove the selected item.
    Remove,
    StopAll,
    RemoveAll,
    Prune,
    /// Tear down every container, volume, custom network and image.
    Nuke,
}

impl Action {
    /// Destructive actions go through the confirmation gate.
    pub fn is_destructive(self) -> bool {
        matches!(
            self,
            Action::Remove | Action::StopAll | Action::RemoveAll | Action::Prune | Action::Nuke
        )
    }

    /// Actions that work on the row under the cursor.
    pub fn needs_selection(self) -> bool {
        matches!(
            self,
            Action::Apply(_) | Action::Inspect | Action::Logs | Action::Shell | Action::Remove
        )
    }

    /// Sequential "y" answers needed before the action runs.
    pub fn confirmations(self) -> u8 {
        match self {
            Action::Nuke => 2,
            _ => 1,
        }
    }
}

/// A resource captured at keypress time. Never re-resolved afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    pub id: String,
    pub name: String,
}

impl Target {
    pub fn of(item: &ResourceItem) -> Self {
        Self {
            id: item.id().to_string(),
            name: item.display_name().to_string(),
        }
    }
}

/// Destructive action waiting for a yes/no keystroke.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingConfirmation {
    pub action: Action,
    pub kind: ResourceKind,
    /// Single-item actions only. Bulk actions resolve targets when confirmed.
    pub target: Option<Target>,
    pub prompt: String,
    pub confirmations_left: u8,
}

impl PendingConfirmation {
    pub fn new(action: Action, kind: ResourceKind, target: Option<Target>) -> Self {
        let prompt = prompt_for(action, kind, target.as_ref());
        Self {
            action,
            kind,
            target,
            prompt,
            confirmations_left: action.confirmations(),
        }
    }

    /// The follow-up confirmation after a first "y", if one is still needed.
    pub fn next_stage(&self) -> Option<Self> {
        if self.confirmations_left <= 1 {
            return None;
        }
        Some(Self {
            prompt: "This cannot be undone. Really remove everything?".to_string(),
            confirmations_left: self.confirmations_left - 1,
            ..self.clone()
        })
    }
}

/// Dispatcher state between keystrokes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DispatchState {
    #[default]
    Idle,
    AwaitingConfirmation(PendingConfirmation),
}

/// Result of an inspect, shown over the list until the next key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Detail {
    pub title: String,
    pub body: String,
}

fn prompt_for(action: Action, kind: ResourceKind, target: Option<&Target>) -> String {
    let name = target.map(|t| t.name.as_str()).unwrap_or("?");
    match action {
        Action::Remove => format!("Remove {} '{}'?", kind, name),
        Action::StopAll => "Stop ALL running containers?".to_string(),
        Action::RemoveAll if kind == ResourceKind::Network => {
            "Remove ALL custom networks?".to_string()
        }
        Action::RemoveAll => format!("Remove ALL {}s?", kind),
        Action::Prune => format!("Prune unused {}s?", kind),
        Action::Nuke => {
            "NUKE: remove every container, volume, custom network and image?".to_string()
        }
        _ => format!("Run {:?}?", action),
    }
}
