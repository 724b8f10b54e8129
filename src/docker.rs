use std::time::Duration;

use bollard::Docker;
use bollard::container::{
    InspectContainerOptions, ListContainersOptions, PruneContainersOptions,
    RemoveContainerOptions, RestartContainerOptions, StopContainerOptions,
};
use bollard::image::{ListImagesOptions, PruneImagesOptions, RemoveImageOptions};
use bollard::models::{ContainerSummary, ImageSummary, Network, Volume};
use bollard::network::{InspectNetworkOptions, ListNetworksOptions, PruneNetworksOptions};
use bollard::volume::{ListVolumesOptions, PruneVolumesOptions};
use serde::Serialize;
use tokio::runtime::Runtime;

use crate::error::ManagerError;
use crate::manager::{ResourceManager, Verb};
use crate::model::{
    ContainerRecord, ImageRecord, NetworkRecord, ResourceItem, ResourceKind, VolumeRecord,
};

/// Seconds the engine waits before killing a container on stop/restart.
const STOP_GRACE_SECS: i64 = 10;

/// Blocking wrapper around bollard's Docker client.
///
/// Owns a current-thread runtime and drives every request to completion
/// before returning, so callers see plain synchronous calls.
pub struct DockerClient {
    client: Docker,
    rt: Runtime,
}

impl DockerClient {
    /// Connect with local defaults (`DOCKER_HOST` or the local socket) and
    /// ping the daemon. Failure here is fatal for a session.
    ///
    /// Requests never time out: a slow engine blocks the caller.
    pub fn connect() -> Result<Self, ManagerError> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let client = {
            let _guard = rt.enter();
            Docker::connect_with_local_defaults()
                .map_err(|e| ManagerError::Unreachable(e.to_string()))?
                .with_timeout(Duration::MAX)
        };
        rt.block_on(client.ping())
            .map_err(|e| ManagerError::Unreachable(e.to_string()))?;
        tracing::info!("connected to container engine");
        Ok(Self { client, rt })
    }

    fn list_containers(&self) -> Result<Vec<ResourceItem>, ManagerError> {
        let options: ListContainersOptions<String> = ListContainersOptions {
            all: true, // stopped containers too
            ..Default::default()
        };
        let summaries = self.rt.block_on(self.client.list_containers(Some(options)))?;
        Ok(parse_all(&summaries, parse_container, ResourceItem::Container))
    }

    fn list_images(&self) -> Result<Vec<ResourceItem>, ManagerError> {
        let options: ListImagesOptions<String> = ListImagesOptions {
            all: false,
            ..Default::default()
        };
        let summaries = self.rt.block_on(self.client.list_images(Some(options)))?;
        Ok(parse_all(&summaries, parse_image, ResourceItem::Image))
    }

    fn list_volumes(&self) -> Result<Vec<ResourceItem>, ManagerError> {
        let response = self
            .rt
            .block_on(self.client.list_volumes(None::<ListVolumesOptions<String>>))?;
        let volumes = response.volumes.unwrap_or_default();
        Ok(parse_all(&volumes, parse_volume, ResourceItem::Volume))
    }

    fn list_networks(&self) -> Result<Vec<ResourceItem>, ManagerError> {
        let networks = self
            .rt
            .block_on(self.client.list_networks(None::<ListNetworksOptions<String>>))?;
        Ok(parse_all(&networks, parse_network, ResourceItem::Network))
    }

    fn mutate_container(&self, verb: Verb, id: &str) -> Result<(), ManagerError> {
        let result = match verb {
            Verb::Start => self.rt.block_on(self.client.start_container::<String>(id, None)),
            Verb::Stop => {
                let options = StopContainerOptions { t: STOP_GRACE_SECS };
                self.rt.block_on(self.client.stop_container(id, Some(options)))
            }
            Verb::Restart => {
                let options = RestartContainerOptions { t: STOP_GRACE_SECS as isize };
                self.rt.block_on(self.client.restart_container(id, Some(options)))
            }
            Verb::Remove => {
                let options = RemoveContainerOptions {
                    force: true,
                    v: true,
                    ..Default::default()
                };
                self.rt.block_on(self.client.remove_container(id, Some(options)))
            }
            Verb::Toggle => {
                return Err(ManagerError::Unsupported { kind: ResourceKind::Container, verb });
            }
        };
        result.map_err(ManagerError::from)
    }
}

impl ResourceManager for DockerClient {
    fn list(&mut self, kind: ResourceKind) -> Result<Vec<ResourceItem>, ManagerError> {
        let items = match kind {
            ResourceKind::Container => self.list_containers(),
            ResourceKind::Image => self.list_images(),
            ResourceKind::Volume => self.list_volumes(),
            ResourceKind::Network => self.list_networks(),
            ResourceKind::FtpSetting => Ok(Vec::new()),
        }?;
        tracing::debug!(%kind, count = items.len(), "listed");
        Ok(items)
    }

    fn inspect(&mut self, kind: ResourceKind, id: &str) -> Result<String, ManagerError> {
        match kind {
            ResourceKind::Container => {
                let detail = self
                    .rt
                    .block_on(self.client.inspect_container(id, None::<InspectContainerOptions>))?;
                to_pretty(&detail)
            }
            ResourceKind::Image => {
                let detail = self.rt.block_on(self.client.inspect_image(id))?;
                to_pretty(&detail)
            }
            ResourceKind::Volume => {
                let detail = self.rt.block_on(self.client.inspect_volume(id))?;
                to_pretty(&detail)
            }
            ResourceKind::Network => {
                let detail = self.rt.block_on(
                    self.client.inspect_network(id, None::<InspectNetworkOptions<String>>),
                )?;
                to_pretty(&detail)
            }
            ResourceKind::FtpSetting => Err(ManagerError::NotFound(id.to_string())),
        }
    }

    fn mutate(&mut self, kind: ResourceKind, verb: Verb, id: &str) -> Result<(), ManagerError> {
        tracing::info!(%kind, %verb, id, "mutate");
        match (kind, verb) {
            (ResourceKind::Container, _) => self.mutate_container(verb, id),
            (ResourceKind::Image, Verb::Remove) => {
                let options = RemoveImageOptions { force: true, ..Default::default() };
                self.rt
                    .block_on(self.client.remove_image(id, Some(options), None))
                    .map(|_| ())
                    .map_err(ManagerError::from)
            }
            (ResourceKind::Volume, Verb::Remove) => self
                .rt
                .block_on(self.client.remove_volume(id, None))
                .map_err(ManagerError::from),
            (ResourceKind::Network, Verb::Remove) => self
                .rt
                .block_on(self.client.remove_network(id))
                .map_err(ManagerError::from),
            _ => Err(ManagerError::Unsupported { kind, verb }),
        }
    }

    fn prune(&mut self, kind: ResourceKind) -> Result<String, ManagerError> {
        tracing::info!(%kind, "prune");
        match kind {
            ResourceKind::Container => {
                let report = self
                    .rt
                    .block_on(self.client.prune_containers(None::<PruneContainersOptions<String>>))?;
                let count = report.containers_deleted.map_or(0, |d| d.len());
                Ok(prune_summary(count, kind, report.space_reclaimed))
            }
            ResourceKind::Image => {
                let report = self
                    .rt
                    .block_on(self.client.prune_images(None::<PruneImagesOptions<String>>))?;
                let count = report.images_deleted.map_or(0, |d| d.len());
                Ok(prune_summary(count, kind, report.space_reclaimed))
            }
            ResourceKind::Volume => {
                let report = self
                    .rt
                    .block_on(self.client.prune_volumes(None::<PruneVolumesOptions<String>>))?;
                let count = report.volumes_deleted.map_or(0, |d| d.len());
                Ok(prune_summary(count, kind, report.space_reclaimed))
            }
            ResourceKind::Network => {
                let report = self
                    .rt
                    .block_on(self.client.prune_networks(None::<PruneNetworksOptions<String>>))?;
                let count = report.networks_deleted.map_or(0, |d| d.len());
                Ok(prune_summary(count, kind, None))
            }
            ResourceKind::FtpSetting => Err(ManagerError::Unsupported { kind, verb: Verb::Remove }),
        }
    }
}

// --- Parsers: one per kind, rejecting summaries that lack an identity ---

fn parse_all<T, R>(
    raw: &[T],
    parse: fn(&T) -> Result<R, ManagerError>,
    wrap: fn(R) -> ResourceItem,
) -> Vec<ResourceItem> {
    raw.iter()
        .filter_map(|r| match parse(r) {
            Ok(record) => Some(wrap(record)),
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed record");
                None
            }
        })
        .collect()
}

pub fn parse_container(s: &ContainerSummary) -> Result<ContainerRecord, ManagerError> {
    let id_full = s
        .id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ManagerError::Malformed("container without id".into()))?;
    let id = short_id(id_full);

    let name = s
        .names
        .as_ref()
        .and_then(|n| n.first())
        .map(|n| n.trim_start_matches('/').to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ManagerError::Malformed(format!("container {id} without name")))?;

    let mounts = s
        .mounts
        .as_ref()
        .map(|mounts| {
            mounts
                .iter()
                .filter(|m| {
                    m.typ.as_ref().map(|t| t.to_string()).as_deref() == Some("volume")
                })
                .filter_map(|m| m.name.clone())
                .collect()
        })
        .unwrap_or_default();

    Ok(ContainerRecord {
        id,
        name,
        image: s.image.clone().unwrap_or_default(),
        state: s.state.clone().unwrap_or_default(),
        status: s.status.clone().unwrap_or_default(),
        ports: format_ports(s),
        created: format_age(s.created.unwrap_or(0)),
        mounts,
    })
}

pub fn parse_image(s: &ImageSummary) -> Result<ImageRecord, ManagerError> {
    if s.id.is_empty() {
        return Err(ManagerError::Malformed("image without id".into()));
    }
    let tag = s
        .repo_tags
        .iter()
        .find(|t| !t.is_empty())
        .cloned()
        .unwrap_or_else(|| "<none>:<none>".to_string());
    let containers = if s.containers < 0 {
        "-".to_string()
    } else {
        s.containers.to_string()
    };

    Ok(ImageRecord {
        id: short_id(&s.id),
        tag,
        size: format_size(s.size),
        created: format_age(s.created),
        containers,
    })
}

pub fn parse_volume(v: &Volume) -> Result<VolumeRecord, ManagerError> {
    if v.name.is_empty() {
        return Err(ManagerError::Malformed("volume without name".into()));
    }
    Ok(VolumeRecord {
        name: v.name.clone(),
        driver: v.driver.clone(),
        scope: v.scope.as_ref().map(|s| s.to_string()).unwrap_or_default(),
        mountpoint: v.mountpoint.clone(),
    })
}

pub fn parse_network(n: &Network) -> Result<NetworkRecord, ManagerError> {
    let id = n
        .id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ManagerError::Malformed("network without id".into()))?;
    let name = n
        .name
        .clone()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ManagerError::Malformed(format!("network {id} without name")))?;

    Ok(NetworkRecord {
        id: short_id(id),
        name,
        driver: n.driver.clone().unwrap_or_default(),
        scope: n.scope.clone().unwrap_or_default(),
        internal: n.internal.unwrap_or(false),
    })
}

// --- Free helper functions ---

fn to_pretty<T: Serialize>(value: &T) -> Result<String, ManagerError> {
    serde_json::to_string_pretty(value).map_err(|e| ManagerError::Malformed(e.to_string()))
}

fn prune_summary(count: usize, kind: ResourceKind, reclaimed: Option<i64>) -> String {
    match reclaimed {
        Some(bytes) if bytes > 0 => {
            format!("Pruned {} {}(s), reclaimed {}", count, kind, format_size(bytes))
        }
        _ => format!("Pruned {} {}(s)", count, kind),
    }
}

fn short_id(id: &str) -> String {
    id.trim_start_matches("sha256:").chars().take(12).collect()
}

fn format_age(created_ts: i64) -> String {
    if created_ts <= 0 {
        return "unknown".to_string();
    }
    let now = chrono::Utc::now().timestamp();
    let secs = (now - created_ts).max(0) as u64;

    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else if secs < 86400 {
        let h = secs / 3600;
        let m = (secs % 3600) / 60;
        format!("{}h {}m", h, m)
    } else {
        let d = secs / 86400;
        let h = (secs % 86400) / 3600;
        format!("{}d {}h", d, h)
    }
}

fn format_size(bytes: i64) -> String {
    let bytes = bytes.max(0) as f64;
    if bytes >= 1_073_741_824.0 {
        format!("{:.2} GB", bytes / 1_073_741_824.0)
    } else if bytes >= 1_048_576.0 {
        format!("{:.1} MB", bytes / 1_048_576.0)
    } else if bytes >= 1024.0 {
        format!("{:.1} KB", bytes / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}

fn format_ports(s: &ContainerSummary) -> String {
    let Some(ports) = &s.ports else { return String::new() };
    let mut parts = Vec::new();
    for p in ports {
        let container_port = p.private_port;
        let proto = p
            .typ
            .as_ref()
            .map(|t| t.to_string())
            .unwrap_or_else(|| "tcp".to_string());
        if let (Some(ip), Some(pub_port)) = (&p.ip, p.public_port) {
            parts.push(format!("{}:{}->{}/{}", ip, pub_port, container_port, proto));
        } else {
            parts.push(format!("{}/{}", container_port, proto));
        }
    }
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use bollard::models::{MountPoint, MountPointTypeEnum, Port, PortTypeEnum};

    fn summary(id: &str, name: &str) -> ContainerSummary {
        ContainerSummary {
            id: Some(id.into()),
            names: Some(vec![format!("/{name}")]),
            image: Some("nginx:latest".into()),
            state: Some("running".into()),
            status: Some("Up 2 hours".into()),
            ..Default::default()
        }
    }

    #[test]
    fn container_summary_maps_to_record() {
        let mut s = summary("0123456789abcdef0123", "web");
        s.mounts = Some(vec![
            MountPoint {
                typ: Some(MountPointTypeEnum::VOLUME),
                name: Some("pgdata".into()),
                ..Default::default()
            },
            MountPoint {
                typ: Some(MountPointTypeEnum::BIND),
                source: Some("/srv".into()),
                ..Default::default()
            },
        ]);
        let record = parse_container(&s).unwrap();
        assert_eq!(record.id, "0123456789ab");
        assert_eq!(record.name, "web");
        assert!(record.is_running());
        assert_eq!(record.mounts, vec!["pgdata"]);
        assert_eq!(record.ports, "");
        assert_eq!(record.created, "unknown");
    }

    #[test]
    fn container_without_id_or_name_is_rejected() {
        let mut s = summary("abc", "web");
        s.id = None;
        assert!(matches!(parse_container(&s), Err(ManagerError::Malformed(_))));

        let mut s = summary("abc", "web");
        s.names = Some(vec![]);
        assert!(matches!(parse_container(&s), Err(ManagerError::Malformed(_))));
    }

    #[test]
    fn ports_with_and_without_public_binding() {
        let mut s = summary("abc", "web");
        s.ports = Some(vec![
            Port {
                ip: Some("0.0.0.0".into()),
                private_port: 80,
                public_port: Some(8080),
                typ: Some(PortTypeEnum::TCP),
            },
            Port {
                ip: None,
                private_port: 53,
                public_port: None,
                typ: Some(PortTypeEnum::UDP),
            },
        ]);
        assert_eq!(format_ports(&s), "0.0.0.0:8080->80/tcp, 53/udp");
    }

    #[test]
    fn untagged_image_gets_placeholder() {
        let s = ImageSummary {
            id: "sha256:feedfacecafebeef00".into(),
            size: 5 * 1_048_576,
            containers: -1,
            ..Default::default()
        };
        let record = parse_image(&s).unwrap();
        assert_eq!(record.id, "feedfacecafe");
        assert_eq!(record.tag, "<none>:<none>");
        assert_eq!(record.size, "5.0 MB");
        assert_eq!(record.containers, "-");
    }

    #[test]
    fn volume_and_network_require_identity() {
        assert!(parse_volume(&Volume::default()).is_err());
        let v = Volume {
            name: "pgdata".into(),
            driver: "local".into(),
            ..Default::default()
        };
        let record = parse_volume(&v).unwrap();
        assert_eq!(record.driver, "local");
        assert_eq!(record.scope, "");

        assert!(parse_network(&Network::default()).is_err());
        let n = Network {
            id: Some("9f8e7d6c5b4a3210".into()),
            name: Some("bridge".into()),
            driver: Some("bridge".into()),
            ..Default::default()
        };
        let record = parse_network(&n).unwrap();
        assert_eq!(record.id, "9f8e7d6c5b4a");
        assert!(record.is_builtin());
        assert!(!record.internal);
    }

    #[test]
    fn size_units() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1_073_741_824), "3.00 GB");
    }

    #[test]
    fn prune_summary_mentions_reclaimed_space() {
        assert_eq!(prune_summary(2, ResourceKind::Image, Some(2048)), "Pruned 2 image(s), reclaimed 2.0 KB");
        assert_eq!(prune_summary(0, ResourceKind::Network, None), "Pruned 0 network(s)");
    }
}
