//! Non-interactive commands: one action, printed result, exit code.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use anyhow::{bail, Context};
use serde::Serialize;
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};

use crate::app::{self, Action, PendingConfirmation, QuitSignals, Target};
use crate::cli::{Command, Selection};
use crate::docker::DockerClient;
use crate::error::ManagerError;
use crate::ftp::VsftpdConfig;
use crate::handoff::Handoff;
use crate::manager::{ResourceManager, Verb};
use crate::model::{ConsoleKind, ResourceKind, VolumeRecord, ViewModel};
use crate::view::{heading, row_text};

/// Run `command`, opening whichever manager it needs.
pub fn run(command: Command, assume_yes: bool) -> anyhow::Result<ExitCode> {
    match command {
        Command::Console => {
            let client = DockerClient::connect().context("cannot reach the container engine")?;
            app::run(client, ConsoleKind::Engine, assume_yes, quit_signals())?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Ftp { config } => {
            let settings = VsftpdConfig::open(&config)
                .with_context(|| format!("cannot open {}", config.display()))?;
            app::run(settings, ConsoleKind::Ftp, assume_yes, quit_signals())?;
            Ok(ExitCode::SUCCESS)
        }
        other => {
            let mut client = DockerClient::connect().context("cannot reach the container engine")?;
            let stdin = io::stdin();
            let mut oneshot = Oneshot {
                manager: &mut client,
                input: stdin.lock(),
                out: io::stdout().lock(),
                assume_yes,
            };
            oneshot.run(&other)
        }
    }
}

/// Signal flags for a console. Only consoles install them; the one-shot
/// commands keep the default signal behaviour.
fn quit_signals() -> QuitSignals {
    let signals = QuitSignals::default();
    let hooks = [
        (SIGINT, signals.interrupt_flag()),
        (SIGTERM, signals.terminate_flag()),
        (SIGHUP, signals.terminate_flag()),
    ];
    for (signal, flag) in hooks {
        if let Err(e) = signal_hook::flag::register(signal, flag) {
            tracing::warn!(signal, error = %e, "cannot watch signal");
        }
    }
    signals
}

/// One command against a manager, with prompts read from `input`.
pub struct Oneshot<'a, R, W> {
    pub manager: &'a mut dyn ResourceManager,
    pub input: R,
    pub out: W,
    pub assume_yes: bool,
}

#[derive(Serialize)]
struct VolumeRow<'a> {
    #[serde(flatten)]
    volume: &'a VolumeRecord,
    used_by: &'a [String],
    originating_image: &'a str,
}

impl<R: BufRead, W: Write> Oneshot<'_, R, W> {
    pub fn run(&mut self, command: &Command) -> anyhow::Result<ExitCode> {
        tracing::info!(?command, assume_yes = self.assume_yes, "running command");
        match command {
            Command::Console | Command::Ftp { .. } => {
                bail!("interactive consoles need a terminal session")
            }
            Command::List { json } => self.list(ResourceKind::Container, *json),
            Command::Images { json } => self.list(ResourceKind::Image, *json),
            Command::Volumes { json } => self.list(ResourceKind::Volume, *json),
            Command::Networks { json } => self.list(ResourceKind::Network, *json),
            Command::Start { name } => self.apply(Verb::Start, name),
            Command::Restart { name } => self.apply(Verb::Restart, name),
            Command::Stop(Selection { all: true, .. }) => {
                self.bulk(Action::StopAll, ResourceKind::Container, Verb::Stop)
            }
            Command::Stop(selection) => self.apply(Verb::Stop, named(selection)?),
            Command::Logs { name } => {
                let target = self.resolve(ResourceKind::Container, name)?;
                self.handoff(Handoff::logs(&target.id))
            }
            Command::Shell { name } => {
                let target = self.resolve(ResourceKind::Container, name)?;
                self.handoff(Handoff::shell(&target.id))
            }
            Command::Inspect { name, kind } => {
                let kind = ResourceKind::from(*kind);
                let target = self.resolve(kind, name)?;
                let body = self.manager.inspect(kind, &target.id)?;
                writeln!(self.out, "{}", body)?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Rm(selection) => self.remove(ResourceKind::Container, selection),
            Command::Rmi(selection) => self.remove(ResourceKind::Image, selection),
            Command::Rmv(selection) => self.remove(ResourceKind::Volume, selection),
            Command::Rmn(selection) => self.remove(ResourceKind::Network, selection),
            Command::Prune { kind } => self.prune(kind.map(ResourceKind::from)),
            Command::Reset => self.reset(),
        }
    }

    fn list(&mut self, kind: ResourceKind, json: bool) -> anyhow::Result<ExitCode> {
        let mut view = ViewModel::new(vec![kind]);
        view.switch_view(kind, &mut *self.manager)?;

        if json {
            let text = match view.usage() {
                Some(usage) => {
                    let rows: Vec<VolumeRow<'_>> = view
                        .items()
                        .iter()
                        .filter_map(|item| item.as_volume())
                        .filter_map(|volume| {
                            usage.get(&volume.name).map(|u| VolumeRow {
                                volume,
                                used_by: &u.referencing_containers,
                                originating_image: &u.originating_image,
                            })
                        })
                        .collect();
                    serde_json::to_string_pretty(&rows)?
                }
                None => serde_json::to_string_pretty(view.items())?,
            };
            writeln!(self.out, "{}", text)?;
            return Ok(ExitCode::SUCCESS);
        }

        if view.items().is_empty() {
            writeln!(self.out, "No {} found.", kind.title().to_lowercase())?;
            return Ok(ExitCode::SUCCESS);
        }
        writeln!(self.out, "{}", heading(kind).trim_end())?;
        for item in view.items() {
            writeln!(self.out, "{}", row_text(&view, item).trim_end())?;
        }
        Ok(ExitCode::SUCCESS)
    }

    fn apply(&mut self, verb: Verb, name: &str) -> anyhow::Result<ExitCode> {
        let target = self.resolve(ResourceKind::Container, name)?;
        self.manager.mutate(ResourceKind::Container, verb, &target.id)?;
        writeln!(self.out, "{} {}", verb.past_tense(), target.name)?;
        Ok(ExitCode::SUCCESS)
    }

    fn remove(&mut self, kind: ResourceKind, selection: &Selection) -> anyhow::Result<ExitCode> {
        if selection.all {
            return self.bulk(Action::RemoveAll, kind, Verb::Remove);
        }
        let target = self.resolve(kind, named(selection)?)?;
        if !self.confirm(stages(Action::Remove, kind, Some(target.clone())))? {
            return Ok(ExitCode::SUCCESS);
        }
        self.manager.mutate(kind, Verb::Remove, &target.id)?;
        writeln!(self.out, "Removed {}", target.name)?;
        Ok(ExitCode::SUCCESS)
    }

    fn bulk(&mut self, action: Action, kind: ResourceKind, verb: Verb) -> anyhow::Result<ExitCode> {
        if !self.confirm(stages(action, kind, None))? {
            return Ok(ExitCode::SUCCESS);
        }
        let outcome = app::bulk(&mut *self.manager, kind, verb)?;
        if let Some(fatal) = outcome.fatal() {
            bail!(ManagerError::Unreachable(fatal.to_string()));
        }
        for (id, e) in &outcome.failures {
            writeln!(self.out, "  {}: {}", id, e)?;
        }
        writeln!(self.out, "{}", outcome.summary(verb, kind))?;
        Ok(if outcome.is_clean() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
    }

    fn prune(&mut self, kind: Option<ResourceKind>) -> anyhow::Result<ExitCode> {
        let (kinds, prompts) = match kind {
            Some(kind) => (vec![kind], stages(Action::Prune, kind, None)),
            None => (
                ResourceKind::ENGINE.to_vec(),
                vec!["Prune unused containers, images, volumes and networks?".to_string()],
            ),
        };
        if !self.confirm(prompts)? {
            return Ok(ExitCode::SUCCESS);
        }
        let mut clean = true;
        for kind in kinds {
            match self.manager.prune(kind) {
                Ok(summary) => writeln!(self.out, "{}", summary)?,
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => {
                    clean = false;
                    writeln!(self.out, "prune {}s failed: {}", kind, e)?;
                }
            }
        }
        Ok(if clean { ExitCode::SUCCESS } else { ExitCode::FAILURE })
    }

    fn reset(&mut self) -> anyhow::Result<ExitCode> {
        if !self.confirm(stages(Action::Nuke, ResourceKind::Container, None))? {
            return Ok(ExitCode::SUCCESS);
        }
        let report = app::nuke(&mut *self.manager);
        write!(self.out, "{}", report)?;
        Ok(if report.clean_steps() == report.steps.len() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        })
    }

    fn handoff(&mut self, handoff: Handoff) -> anyhow::Result<ExitCode> {
        self.out.flush()?;
        let status = handoff.run().with_context(|| format!("cannot run {}", handoff))?;
        if status.success() {
            return Ok(ExitCode::SUCCESS);
        }
        let code = status.code().and_then(|c| u8::try_from(c).ok()).unwrap_or(1);
        Ok(ExitCode::from(code))
    }

    /// Ask every prompt in turn; any answer other than y/yes declines.
    fn confirm(&mut self, prompts: Vec<String>) -> io::Result<bool> {
        if self.assume_yes {
            return Ok(true);
        }
        for prompt in prompts {
            write!(self.out, "{} [y/N] ", prompt)?;
            self.out.flush()?;
            let mut answer = String::new();
            self.input.read_line(&mut answer)?;
            if !is_yes(&answer) {
                tracing::info!(%prompt, "declined");
                writeln!(self.out, "Cancelled")?;
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Find one item of `kind` by name, id or unique id prefix.
    fn resolve(&mut self, kind: ResourceKind, name: &str) -> Result<Target, ManagerError> {
        let items = self.manager.list(kind)?;
        if let Some(item) = items.iter().find(|i| i.display_name() == name || i.id() == name) {
            return Ok(Target::of(item));
        }
        let mut by_prefix = items.iter().filter(|i| i.id().starts_with(name));
        match (by_prefix.next(), by_prefix.next()) {
            (Some(item), None) => Ok(Target::of(item)),
            (Some(_), Some(_)) => Err(ManagerError::Rejected(format!(
                "'{}' matches more than one {}",
                name, kind
            ))),
            _ => Err(ManagerError::NotFound(format!("{} '{}'", kind, name))),
        }
    }
}

fn named(selection: &Selection) -> anyhow::Result<&str> {
    match &selection.name {
        Some(name) => Ok(name),
        None => bail!("a name or --all is required"),
    }
}

/// Prompts the console would show for `action`, first stage first.
fn stages(action: Action, kind: ResourceKind, target: Option<Target>) -> Vec<String> {
    let mut prompts = Vec::new();
    let mut stage = Some(PendingConfirmation::new(action, kind, target));
    while let Some(pending) = stage {
        stage = pending.next_stage();
        prompts.push(pending.prompt);
    }
    prompts
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::app::fake::FakeEngine;

    fn run_with(engine: &mut FakeEngine, command: Command, answers: &str, assume_yes: bool) -> (ExitCode, String) {
        let mut out = Vec::new();
        let code = {
            let mut oneshot = Oneshot {
                manager: engine,
                input: Cursor::new(answers.as_bytes().to_vec()),
                out: &mut out,
                assume_yes,
            };
            oneshot.run(&command).unwrap()
        };
        (code, String::from_utf8(out).unwrap())
    }

    fn select(name: &str) -> Selection {
        Selection { name: Some(name.into()), all: false }
    }

    #[test]
    fn declined_remove_exits_cleanly() {
        let mut engine = FakeEngine::populated();
        let (code, out) = run_with(&mut engine, Command::Rm(select("web")), "n\n", false);
        assert_eq!(code, ExitCode::SUCCESS);
        assert!(out.contains("Remove container 'web'? [y/N] Cancelled"));
        assert!(engine.calls.is_empty());
    }

    #[test]
    fn confirmed_remove_by_name() {
        let mut engine = FakeEngine::populated();
        let (code, out) = run_with(&mut engine, Command::Rm(select("db")), "yes\n", false);
        assert_eq!(code, ExitCode::SUCCESS);
        assert!(out.ends_with("Removed db\n"));
        assert_eq!(engine.calls_for(Verb::Remove), vec!["bbb222"]);
    }

    #[test]
    fn eof_at_prompt_declines() {
        let mut engine = FakeEngine::populated();
        let (_, out) = run_with(&mut engine, Command::Rmv(select("pgdata")), "", false);
        assert!(out.contains("Cancelled"));
        assert!(engine.calls.is_empty());
    }

    #[test]
    fn unknown_name_is_not_found() {
        let mut engine = FakeEngine::populated();
        let mut out = Vec::new();
        let mut oneshot = Oneshot {
            manager: &mut engine,
            input: Cursor::new(Vec::new()),
            out: &mut out,
            assume_yes: true,
        };
        let err = oneshot.run(&Command::Start { name: "nope".into() }).unwrap_err();
        assert!(matches!(err.downcast_ref::<ManagerError>(), Some(ManagerError::NotFound(_))));
    }

    #[test]
    fn id_prefix_resolves() {
        let mut engine = FakeEngine::populated();
        let (_, out) = run_with(&mut engine, Command::Stop(select("bbb")), "", false);
        assert_eq!(out, "Stopped db\n");
        assert_eq!(engine.calls_for(Verb::Stop), vec!["bbb222"]);
    }

    #[test]
    fn stop_all_reports_counts() {
        let mut engine = FakeEngine::populated();
        engine.rejecting.insert("aaa111".into());
        let selection = Selection { name: None, all: true };
        let (code, out) = run_with(&mut engine, Command::Stop(selection), "y\n", false);
        assert_eq!(code, ExitCode::FAILURE);
        assert!(out.contains("aaa111: rejected: aaa111 is in use"));
        assert!(out.contains("Stopped 1/2 containers"));
    }

    #[test]
    fn reset_asks_twice() {
        let mut engine = FakeEngine::populated();
        let (code, out) = run_with(&mut engine, Command::Reset, "y\nn\n", false);
        assert_eq!(code, ExitCode::SUCCESS);
        assert!(out.contains("Really remove everything? [y/N] Cancelled"));
        assert!(engine.calls.is_empty());

        let (code, out) = run_with(&mut engine, Command::Reset, "y\ny\n", false);
        assert_eq!(code, ExitCode::SUCCESS);
        assert!(out.contains("Nuke finished: 6/6 steps clean"));
        assert!(engine.containers.is_empty());
        assert_eq!(engine.networks.len(), 1);
    }

    #[test]
    fn prune_every_kind() {
        let mut engine = FakeEngine::populated();
        let (code, out) = run_with(&mut engine, Command::Prune { kind: None }, "", true);
        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(engine.prunes, ResourceKind::ENGINE.to_vec());
        assert!(out.contains("pruned volumes"));
    }

    #[test]
    fn volumes_listing_shows_usage() {
        let mut engine = FakeEngine::populated();
        engine.containers[0].mounts = vec!["pgdata".into()];
        let (_, out) = run_with(&mut engine, Command::Volumes { json: false }, "", false);
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].contains("USED BY"));
        assert!(lines[1].starts_with("  pgdata"));
        assert!(lines[1].ends_with("web"));
    }

    #[test]
    fn volumes_json_carries_usage() {
        let mut engine = FakeEngine::populated();
        engine.containers[1].mounts = vec!["pgdata".into()];
        let (_, out) = run_with(&mut engine, Command::Volumes { json: true }, "", false);
        let rows: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(rows[0]["name"], "pgdata");
        assert_eq!(rows[0]["used_by"][0], "db");
        assert_eq!(rows[0]["originating_image"], "alpine");
    }

    #[test]
    fn container_json_is_tagged() {
        let mut engine = FakeEngine::populated();
        let (_, out) = run_with(&mut engine, Command::List { json: true }, "", false);
        let rows: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(rows[0]["kind"], "container");
        assert_eq!(rows[1]["name"], "db");
    }

    #[test]
    fn empty_listing() {
        let mut engine = FakeEngine::default();
        let (_, out) = run_with(&mut engine, Command::Networks { json: false }, "", false);
        assert_eq!(out, "No networks found.\n");
    }
}
