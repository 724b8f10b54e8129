pub use app::ConsoleKind;
pub use resource::{
    ContainerRecord, FtpSetting, ImageRecord, NetworkRecord, ResourceItem, ResourceKind,
    VolumeRecord,
};
pub use status::{StatusLevel, StatusMessage, StatusSlot};
pub use usage::{UsageIndex, VolumeUsage};
pub use view::{scroll_offset, Direction, SelectionPolicy, ViewModel};

mod app;
mod resource;
mod status;
mod usage;
mod view;
