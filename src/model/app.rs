use super::resource::ResourceKind;

/// Which console is running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsoleKind {
    /// Containers, images, volumes and networks of the container engine.
    Engine,
    /// Directives of an FTP daemon configuration file.
    Ftp,
}

impl ConsoleKind {
    pub fn title(self) -> &'static str {
        match self {
            ConsoleKind::Engine => "berth - container engine",
            ConsoleKind::Ftp => "berth - ftp daemon",
        }
    }

    pub fn tabs(self) -> Vec<ResourceKind> {
        match self {
            ConsoleKind::Engine => ResourceKind::ENGINE.to_vec(),
            ConsoleKind::Ftp => vec![ResourceKind::FtpSetting],
        }
    }
}
