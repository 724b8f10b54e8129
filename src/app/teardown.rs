//! Bulk actions. Targets are always resolved from a fresh listing.

use std::fmt;

use crate::error::ManagerError;
use crate::manager::{BatchOutcome, ResourceManager, Verb, run_batch};
use crate::model::{ResourceItem, ResourceKind};

/// Ids of every item of `kind` a bulk `verb` should touch, listed now.
pub fn bulk_targets(
    manager: &mut dyn ResourceManager,
    kind: ResourceKind,
    verb: Verb,
) -> Result<Vec<String>, ManagerError> {
    let items = manager.list(kind)?;
    Ok(items
        .iter()
        .filter(|item| match item {
            ResourceItem::Container(c) if verb == Verb::Stop => c.is_running(),
            ResourceItem::Network(n) => !n.is_builtin(),
            _ => true,
        })
        .map(|item| item.id().to_string())
        .collect())
}

/// List `kind` fresh and issue `verb` against every eligible item.
pub fn bulk(
    manager: &mut dyn ResourceManager,
    kind: ResourceKind,
    verb: Verb,
) -> Result<BatchOutcome, ManagerError> {
    let ids = bulk_targets(manager, kind, verb)?;
    Ok(run_batch(manager, kind, verb, &ids))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NukeStep {
    StopContainers,
    RemoveContainers,
    RemoveVolumes,
    RemoveNetworks,
    RemoveImages,
    Prune,
}

impl NukeStep {
    pub const ALL: [NukeStep; 6] = [
        NukeStep::StopContainers,
        NukeStep::RemoveContainers,
        NukeStep::RemoveVolumes,
        NukeStep::RemoveNetworks,
        NukeStep::RemoveImages,
        NukeStep::Prune,
    ];
}

impl fmt::Display for NukeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NukeStep::StopContainers => "stop containers",
            NukeStep::RemoveContainers => "remove containers",
            NukeStep::RemoveVolumes => "remove volumes",
            NukeStep::RemoveNetworks => "remove custom networks",
            NukeStep::RemoveImages => "remove images",
            NukeStep::Prune => "final prune",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Default)]
pub struct NukeReport {
    pub steps: Vec<(NukeStep, Result<String, ManagerError>)>,
}

impl NukeReport {
    pub fn clean_steps(&self) -> usize {
        self.steps.iter().filter(|(_, r)| r.is_ok()).count()
    }

    pub fn summary(&self) -> String {
        format!("Nuke finished: {}/{} steps clean", self.clean_steps(), self.steps.len())
    }
}

/// One line per step, then the summary.
impl fmt::Display for NukeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (step, result) in &self.steps {
            match result {
                Ok(msg) => writeln!(f, "  ok    {}: {}", step, msg)?,
                Err(e) => writeln!(f, "  FAIL  {}: {}", step, e)?,
            }
        }
        writeln!(f, "{}", self.summary())
    }
}

/// Tear everything down. Every step runs whatever happened to the previous
/// ones, so the final prune is always reached.
pub fn nuke(manager: &mut dyn ResourceManager) -> NukeReport {
    let mut report = NukeReport::default();
    for step in NukeStep::ALL {
        let result = run_step(manager, step);
        match &result {
            Ok(msg) => tracing::info!(%step, %msg, "nuke step done"),
            Err(e) => tracing::warn!(%step, error = %e, "nuke step failed, continuing"),
        }
        report.steps.push((step, result));
    }
    report
}

fn run_step(manager: &mut dyn ResourceManager, step: NukeStep) -> Result<String, ManagerError> {
    let (kind, verb) = match step {
        NukeStep::StopContainers => (ResourceKind::Container, Verb::Stop),
        NukeStep::RemoveContainers => (ResourceKind::Container, Verb::Remove),
        NukeStep::RemoveVolumes => (ResourceKind::Volume, Verb::Remove),
        NukeStep::RemoveNetworks => (ResourceKind::Network, Verb::Remove),
        NukeStep::RemoveImages => (ResourceKind::Image, Verb::Remove),
        NukeStep::Prune => return prune_everything(manager),
    };
    let outcome = bulk(manager, kind, verb)?;
    let summary = outcome.summary(verb, kind);
    if outcome.is_clean() {
        Ok(summary)
    } else {
        Err(ManagerError::Rejected(summary))
    }
}

fn prune_everything(manager: &mut dyn ResourceManager) -> Result<String, ManagerError> {
    let mut failed = Vec::new();
    for kind in ResourceKind::ENGINE {
        if let Err(e) = manager.prune(kind) {
            tracing::warn!(%kind, error = %e, "prune failed");
            failed.push(kind.to_string());
        }
    }
    if failed.is_empty() {
        Ok("pruned everything".to_string())
    } else {
        Err(ManagerError::Rejected(format!("prune failed for {}", failed.join(", "))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::fake::{container, FakeEngine};

    #[test]
    fn stop_targets_only_running_containers() {
        let mut engine = FakeEngine::populated();
        engine.containers.push(container("ccc333", "old", "exited"));
        let ids = bulk_targets(&mut engine, ResourceKind::Container, Verb::Stop).unwrap();
        assert_eq!(ids, vec!["aaa111", "bbb222"]);
        let ids = bulk_targets(&mut engine, ResourceKind::Container, Verb::Remove).unwrap();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn builtin_networks_are_never_targets() {
        let mut engine = FakeEngine::populated();
        let ids = bulk_targets(&mut engine, ResourceKind::Network, Verb::Remove).unwrap();
        assert_eq!(ids, vec!["net1"]);
    }

    #[test]
    fn nuke_reaches_the_final_prune_when_unreachable() {
        let mut engine = FakeEngine::populated();
        engine.unreachable = true;
        let report = nuke(&mut engine);
        assert_eq!(report.steps.len(), NukeStep::ALL.len());
        assert_eq!(report.clean_steps(), 0);
        assert_eq!(report.steps.last().map(|(s, _)| *s), Some(NukeStep::Prune));
    }

    #[test]
    fn nuke_order_and_report() {
        let mut engine = FakeEngine::populated();
        engine.rejecting.insert("img1".into());
        let report = nuke(&mut engine);
        let kinds: Vec<ResourceKind> = engine.calls.iter().map(|(k, _, _)| *k).collect();
        let first_volume = kinds.iter().position(|k| *k == ResourceKind::Volume).unwrap();
        let first_image = kinds.iter().position(|k| *k == ResourceKind::Image).unwrap();
        assert!(kinds[..first_volume].iter().all(|k| *k == ResourceKind::Container));
        assert!(first_volume < first_image);
        assert_eq!(engine.prunes.len(), 4);

        let text = report.to_string();
        assert!(text.contains("  FAIL  remove images: rejected: Removed 0/1 images"));
        assert!(text.ends_with("Nuke finished: 5/6 steps clean\n"));
    }
}
