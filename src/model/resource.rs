use std::fmt;

use serde::Serialize;

/// Kind of resource a console tab lists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Container,
    Image,
    Volume,
    Network,
    FtpSetting,
}

impl ResourceKind {
    /// Tabs of the container console, in display order.
    pub const ENGINE: [ResourceKind; 4] = [
        ResourceKind::Container,
        ResourceKind::Image,
        ResourceKind::Volume,
        ResourceKind::Network,
    ];

    /// Tab title.
    pub fn title(self) -> &'static str {
        match self {
            ResourceKind::Container => "Containers",
            ResourceKind::Image => "Images",
            ResourceKind::Volume => "Volumes",
            ResourceKind::Network => "Networks",
            ResourceKind::FtpSetting => "Settings",
        }
    }

    /// Column headings for the kind-specific fields, in field order.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            ResourceKind::Container => &["IMAGE", "STATE", "STATUS", "PORTS", "CREATED"],
            ResourceKind::Image => &["SIZE", "CREATED", "CONTAINERS"],
            ResourceKind::Volume => &["DRIVER", "SCOPE", "MOUNTPOINT"],
            ResourceKind::Network => &["DRIVER", "SCOPE", "INTERNAL"],
            ResourceKind::FtpSetting => &["VALUE", "LINE"],
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResourceKind::Container => "container",
            ResourceKind::Image => "image",
            ResourceKind::Volume => "volume",
            ResourceKind::Network => "network",
            ResourceKind::FtpSetting => "setting",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ContainerRecord {
    pub id: String,      // short ID (first 12 chars)
    pub name: String,
    pub image: String,
    pub state: String,   // raw state ("running", "exited", ...)
    pub status: String,  // human status ("Up 2 hours")
    pub ports: String,   // e.g. "0.0.0.0:8080->80/tcp"
    pub created: String, // human-readable age
    /// Names of the named volumes mounted by this container, in mount order.
    pub mounts: Vec<String>,
}

impl ContainerRecord {
    pub fn is_running(&self) -> bool {
        self.state == "running"
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ImageRecord {
    pub id: String,
    pub tag: String,
    pub size: String,
    pub created: String,
    pub containers: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct VolumeRecord {
    pub name: String,
    pub driver: String,
    pub scope: String,
    pub mountpoint: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct NetworkRecord {
    pub id: String,
    pub name: String,
    pub driver: String,
    pub scope: String,
    pub internal: bool,
}

impl NetworkRecord {
    /// Networks the engine creates itself and refuses to remove.
    pub fn is_builtin(&self) -> bool {
        matches!(self.name.as_str(), "bridge" | "host" | "none")
    }
}

/// One `key=value` directive of an FTP daemon configuration file.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FtpSetting {
    pub key: String,
    pub value: String,
    pub line: usize, // 1-based line number in the file
}

impl FtpSetting {
    pub fn is_boolean(&self) -> bool {
        self.value.eq_ignore_ascii_case("YES") || self.value.eq_ignore_ascii_case("NO")
    }
}

/// A listed resource. Rebuilt wholesale on every load.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ResourceItem {
    Container(ContainerRecord),
    Image(ImageRecord),
    Volume(VolumeRecord),
    Network(NetworkRecord),
    FtpSetting(FtpSetting),
}

impl ResourceItem {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceItem::Container(_) => ResourceKind::Container,
            ResourceItem::Image(_) => ResourceKind::Image,
            ResourceItem::Volume(_) => ResourceKind::Volume,
            ResourceItem::Network(_) => ResourceKind::Network,
            ResourceItem::FtpSetting(_) => ResourceKind::FtpSetting,
        }
    }

    /// Identifier the manager accepts for mutations of this item.
    pub fn id(&self) -> &str {
        match self {
            ResourceItem::Container(c) => &c.id,
            ResourceItem::Image(i) => &i.id,
            ResourceItem::Volume(v) => &v.name,
            ResourceItem::Network(n) => &n.id,
            ResourceItem::FtpSetting(s) => &s.key,
        }
    }

    /// Name shown to the operator. Not guaranteed unique.
    pub fn display_name(&self) -> &str {
        match self {
            ResourceItem::Container(c) => &c.name,
            ResourceItem::Image(i) => &i.tag,
            ResourceItem::Volume(v) => &v.name,
            ResourceItem::Network(n) => &n.name,
            ResourceItem::FtpSetting(s) => &s.key,
        }
    }

    /// Kind-specific fields, positionally matching `ResourceKind::columns`.
    pub fn fields(&self) -> Vec<String> {
        match self {
            ResourceItem::Container(c) => vec![
                c.image.clone(),
                c.state.clone(),
                c.status.clone(),
                c.ports.clone(),
                c.created.clone(),
            ],
            ResourceItem::Image(i) => {
                vec![i.size.clone(), i.created.clone(), i.containers.clone()]
            }
            ResourceItem::Volume(v) => {
                vec![v.driver.clone(), v.scope.clone(), v.mountpoint.clone()]
            }
            ResourceItem::Network(n) => vec![
                n.driver.clone(),
                n.scope.clone(),
                if n.internal { "yes".into() } else { "no".into() },
            ],
            ResourceItem::FtpSetting(s) => vec![s.value.clone(), s.line.to_string()],
        }
    }

    pub fn as_container(&self) -> Option<&ContainerRecord> {
        match self {
            ResourceItem::Container(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_volume(&self) -> Option<&VolumeRecord> {
        match self {
            ResourceItem::Volume(v) => Some(v),
            _ => None,
        }
    }
}
