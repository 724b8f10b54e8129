//! The boundary to whatever owns the resources: the container engine or an
//! FTP daemon configuration file.

use std::fmt;

use crate::error::ManagerError;
use crate::model::{ResourceItem, ResourceKind};

/// Mutating verbs. Which (kind, verb) pairs are valid is up to the manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verb {
    Start,
    Stop,
    Restart,
    Remove,
    Toggle,
}

impl Verb {
    /// Past tense for status lines ("Stopped web").
    pub fn past_tense(self) -> &'static str {
        match self {
            Verb::Start => "Started",
            Verb::Stop => "Stopped",
            Verb::Restart => "Restarted",
            Verb::Remove => "Removed",
            Verb::Toggle => "Toggled",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verb::Start => "start",
            Verb::Stop => "stop",
            Verb::Restart => "restart",
            Verb::Remove => "remove",
            Verb::Toggle => "toggle",
        };
        f.write_str(s)
    }
}

/// List, inspect and mutate resources of an external manager.
///
/// Every call blocks until the manager answers. Nothing is cached between
/// calls and nothing is retried.
pub trait ResourceManager {
    /// Full current inventory of `kind`, in the manager's order.
    fn list(&mut self, kind: ResourceKind) -> Result<Vec<ResourceItem>, ManagerError>;

    /// Human-readable detail of one resource.
    fn inspect(&mut self, kind: ResourceKind, id: &str) -> Result<String, ManagerError>;

    fn mutate(&mut self, kind: ResourceKind, verb: Verb, id: &str) -> Result<(), ManagerError>;

    /// Remove every unused resource of `kind`. Returns a one-line summary.
    fn prune(&mut self, kind: ResourceKind) -> Result<String, ManagerError>;
}

/// Aggregate result of one verb issued against many targets.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub attempted: usize,
    pub succeeded: usize,
    pub failures: Vec<(String, ManagerError)>,
}

impl BatchOutcome {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Manager unreachable during the batch, if it was.
    pub fn fatal(&self) -> Option<&ManagerError> {
        self.failures.iter().map(|(_, e)| e).find(|e| e.is_fatal())
    }

    /// "Stopped 3/4 containers".
    pub fn summary(&self, verb: Verb, kind: ResourceKind) -> String {
        format!(
            "{} {}/{} {}s",
            verb.past_tense(),
            self.succeeded,
            self.attempted,
            kind
        )
    }
}

/// Issue `verb` once per target. Failures are collected, never rolled back,
/// and do not stop the remaining targets.
pub fn run_batch(
    manager: &mut dyn ResourceManager,
    kind: ResourceKind,
    verb: Verb,
    ids: &[String],
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    for id in ids {
        outcome.attempted += 1;
        match manager.mutate(kind, verb, id) {
            Ok(()) => outcome.succeeded += 1,
            Err(e) => {
                tracing::warn!(%kind, %verb, id = %id, error = %e, "batch item failed");
                outcome.failures.push((id.clone(), e));
            }
        }
    }
    outcome
}
