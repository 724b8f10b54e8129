use std::collections::HashMap;

use super::resource::{ContainerRecord, VolumeRecord};

/// Which containers reference one volume.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VolumeUsage {
    pub volume: String,
    /// Container display names, first-seen order, no duplicates.
    pub referencing_containers: Vec<String>,
    /// Image of the first container seen mounting the volume, empty if unused.
    pub originating_image: String,
}

impl VolumeUsage {
    pub fn is_unused(&self) -> bool {
        self.referencing_containers.is_empty()
    }

    /// "used by" cell text.
    pub fn describe(&self) -> String {
        if self.is_unused() {
            "(unused)".to_string()
        } else {
            self.referencing_containers.join(", ")
        }
    }
}

/// Reverse index volume -> referencing containers, built from one snapshot.
///
/// Holds exactly one entry per volume of the volume listing it was built
/// from, in that listing's order. It goes stale as soon as anything is
/// mutated and is rebuilt on every load of the volume view.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UsageIndex {
    entries: Vec<VolumeUsage>,
    positions: HashMap<String, usize>,
}

impl UsageIndex {
    /// Build the index in a single pass over the container inventory.
    pub fn build(containers: &[ContainerRecord], volumes: &[VolumeRecord]) -> Self {
        let mut index = UsageIndex::default();
        for v in volumes {
            if index.positions.contains_key(&v.name) {
                continue;
            }
            index.positions.insert(v.name.clone(), index.entries.len());
            index.entries.push(VolumeUsage {
                volume: v.name.clone(),
                ..Default::default()
            });
        }

        for c in containers {
            for mount in &c.mounts {
                // Mounts of volumes missing from the listing are not indexed.
                let Some(&pos) = index.positions.get(mount) else { continue };
                let usage = &mut index.entries[pos];
                if usage.referencing_containers.is_empty() {
                    usage.originating_image = c.image.clone();
                }
                if !usage.referencing_containers.contains(&c.name) {
                    usage.referencing_containers.push(c.name.clone());
                }
            }
        }

        index
    }

    pub fn get(&self, volume: &str) -> Option<&VolumeUsage> {
        self.positions.get(volume).map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn volumes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.volume.as_str())
    }
}
