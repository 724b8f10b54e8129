//! In-memory resource manager for dispatcher tests.

use std::collections::HashSet;

use crate::error::ManagerError;
use crate::manager::{ResourceManager, Verb};
use crate::model::{
    ContainerRecord, FtpSetting, ImageRecord, NetworkRecord, ResourceItem, ResourceKind,
    VolumeRecord,
};

#[derive(Default)]
pub struct FakeEngine {
    pub containers: Vec<ContainerRecord>,
    pub images: Vec<ImageRecord>,
    pub volumes: Vec<VolumeRecord>,
    pub networks: Vec<NetworkRecord>,
    pub settings: Vec<FtpSetting>,
    /// Every mutate call, in order, including failed ones.
    pub calls: Vec<(ResourceKind, Verb, String)>,
    pub prunes: Vec<ResourceKind>,
    /// Ids whose mutations are rejected.
    pub rejecting: HashSet<String>,
    pub unreachable: bool,
}

pub fn container(id: &str, name: &str, state: &str) -> ContainerRecord {
    ContainerRecord {
        id: id.into(),
        name: name.into(),
        image: "alpine".into(),
        state: state.into(),
        ..Default::default()
    }
}

impl FakeEngine {
    /// Two running containers, one volume, the built-in bridge plus one
    /// custom network and one image.
    pub fn populated() -> Self {
        Self {
            containers: vec![
                container("aaa111", "web", "running"),
                container("bbb222", "db", "running"),
            ],
            images: vec![ImageRecord { id: "img1".into(), tag: "alpine:3".into(), ..Default::default() }],
            volumes: vec![VolumeRecord { name: "pgdata".into(), driver: "local".into(), ..Default::default() }],
            networks: vec![
                NetworkRecord { id: "net0".into(), name: "bridge".into(), ..Default::default() },
                NetworkRecord { id: "net1".into(), name: "backend".into(), ..Default::default() },
            ],
            ..Default::default()
        }
    }

    pub fn ftp() -> Self {
        Self {
            settings: vec![
                FtpSetting { key: "anonymous_enable".into(), value: "NO".into(), line: 1 },
                FtpSetting { key: "listen_port".into(), value: "21".into(), line: 2 },
            ],
            ..Default::default()
        }
    }

    pub fn calls_for(&self, verb: Verb) -> Vec<&str> {
        self.calls
            .iter()
            .filter(|(_, v, _)| *v == verb)
            .map(|(_, _, id)| id.as_str())
            .collect()
    }

    fn check(&self) -> Result<(), ManagerError> {
        if self.unreachable {
            return Err(ManagerError::Unreachable("connection refused".into()));
        }
        Ok(())
    }
}

impl ResourceManager for FakeEngine {
    fn list(&mut self, kind: ResourceKind) -> Result<Vec<ResourceItem>, ManagerError> {
        self.check()?;
        Ok(match kind {
            ResourceKind::Container => self.containers.iter().cloned().map(ResourceItem::Container).collect(),
            ResourceKind::Image => self.images.iter().cloned().map(ResourceItem::Image).collect(),
            ResourceKind::Volume => self.volumes.iter().cloned().map(ResourceItem::Volume).collect(),
            ResourceKind::Network => self.networks.iter().cloned().map(ResourceItem::Network).collect(),
            ResourceKind::FtpSetting => self.settings.iter().cloned().map(ResourceItem::FtpSetting).collect(),
        })
    }

    fn inspect(&mut self, kind: ResourceKind, id: &str) -> Result<String, ManagerError> {
        self.check()?;
        let found = self.list(kind)?.iter().any(|item| item.id() == id);
        if found {
            Ok(format!("{{\n  \"kind\": \"{kind}\",\n  \"id\": \"{id}\"\n}}"))
        } else {
            Err(ManagerError::NotFound(id.to_string()))
        }
    }

    fn mutate(&mut self, kind: ResourceKind, verb: Verb, id: &str) -> Result<(), ManagerError> {
        self.calls.push((kind, verb, id.to_string()));
        self.check()?;
        if self.rejecting.contains(id) {
            return Err(ManagerError::Rejected(format!("{id} is in use")));
        }
        match (kind, verb) {
            (ResourceKind::Container, Verb::Start | Verb::Restart) => {
                if let Some(c) = self.containers.iter_mut().find(|c| c.id == id) {
                    c.state = "running".into();
                }
            }
            (ResourceKind::Container, Verb::Stop) => {
                if let Some(c) = self.containers.iter_mut().find(|c| c.id == id) {
                    c.state = "exited".into();
                }
            }
            (ResourceKind::Container, Verb::Remove) => self.containers.retain(|c| c.id != id),
            (ResourceKind::Image, Verb::Remove) => self.images.retain(|i| i.id != id),
            (ResourceKind::Volume, Verb::Remove) => self.volumes.retain(|v| v.name != id),
            (ResourceKind::Network, Verb::Remove) => self.networks.retain(|n| n.id != id),
            (ResourceKind::FtpSetting, Verb::Toggle) => {
                if let Some(s) = self.settings.iter_mut().find(|s| s.key == id) {
                    s.value = if s.value == "YES" { "NO".into() } else { "YES".into() };
                }
            }
            (ResourceKind::FtpSetting, Verb::Remove) => self.settings.retain(|s| s.key != id),
            _ => return Err(ManagerError::Unsupported { kind, verb }),
        }
        Ok(())
    }

    fn prune(&mut self, kind: ResourceKind) -> Result<String, ManagerError> {
        self.check()?;
        self.prunes.push(kind);
        Ok(format!("pruned {kind}s"))
    }
}
