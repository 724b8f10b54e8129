use crate::error::ManagerError;
use crate::manager::ResourceManager;

use super::resource::{ResourceItem, ResourceKind};
use super::usage::UsageIndex;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// What happens to the selection when a fresh listing replaces the items.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// Back to the first row (view switch).
    Reset,
    /// Keep the row if still in range, else the last valid row (reload).
    Clamp,
}

/// Which kind is displayed, its items and the cursor.
///
/// Invariant: `selected < items.len()`, or `selected == 0` when empty.
#[derive(Clone, Debug)]
pub struct ViewModel {
    tabs: Vec<ResourceKind>,
    current: ResourceKind,
    items: Vec<ResourceItem>,
    selected: usize,
    usage: Option<UsageIndex>,
}

impl ViewModel {
    /// A view over `tabs`, showing the first one. Nothing is loaded yet.
    pub fn new(tabs: Vec<ResourceKind>) -> Self {
        let current = tabs.first().copied().unwrap_or(ResourceKind::Container);
        Self {
            tabs,
            current,
            items: Vec::new(),
            selected: 0,
            usage: None,
        }
    }

    pub fn tabs(&self) -> &[ResourceKind] {
        &self.tabs
    }

    pub fn current(&self) -> ResourceKind {
        self.current
    }

    pub fn items(&self) -> &[ResourceItem] {
        &self.items
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn usage(&self) -> Option<&UsageIndex> {
        self.usage.as_ref()
    }

    pub fn selected_item(&self) -> Option<&ResourceItem> {
        self.items.get(self.selected)
    }

    /// Show `kind`, load it fresh and put the cursor on the first row.
    pub fn switch_view(
        &mut self,
        kind: ResourceKind,
        manager: &mut dyn ResourceManager,
    ) -> Result<(), ManagerError> {
        self.current = kind;
        self.items.clear();
        self.usage = None;
        self.selected = 0;
        let (items, usage) = load(kind, manager)?;
        self.replace_items(items, usage, SelectionPolicy::Reset);
        Ok(())
    }

    /// Reload the current kind, keeping the cursor where it can stay.
    pub fn reload(&mut self, manager: &mut dyn ResourceManager) -> Result<(), ManagerError> {
        let (items, usage) = load(self.current, manager)?;
        self.replace_items(items, usage, SelectionPolicy::Clamp);
        Ok(())
    }

    /// Swap in a fresh listing. The pure half of `switch_view`/`reload`.
    pub fn replace_items(
        &mut self,
        items: Vec<ResourceItem>,
        usage: Option<UsageIndex>,
        policy: SelectionPolicy,
    ) {
        self.items = items;
        self.usage = usage;
        self.selected = match policy {
            SelectionPolicy::Reset => 0,
            SelectionPolicy::Clamp => self.selected.min(self.items.len().saturating_sub(1)),
        };
    }

    /// Move the cursor one row; clamps at both ends.
    pub fn move_selection(&mut self, direction: Direction) {
        match direction {
            Direction::Up => self.selected = self.selected.saturating_sub(1),
            Direction::Down => {
                if self.selected + 1 < self.items.len() {
                    self.selected += 1;
                }
            }
        }
    }

    /// Tab to the right of the current one, wrapping around.
    pub fn next_tab(&self) -> ResourceKind {
        self.tab_offset(1)
    }

    /// Tab to the left of the current one, wrapping around.
    pub fn prev_tab(&self) -> ResourceKind {
        self.tab_offset(self.tabs.len().saturating_sub(1))
    }

    /// Tab at 0-based `index`, if the console has that many.
    pub fn tab_at(&self, index: usize) -> Option<ResourceKind> {
        self.tabs.get(index).copied()
    }

    fn tab_offset(&self, step: usize) -> ResourceKind {
        if self.tabs.is_empty() {
            return self.current;
        }
        let pos = self.tabs.iter().position(|k| *k == self.current).unwrap_or(0);
        self.tabs[(pos + step) % self.tabs.len()]
    }
}

fn load(
    kind: ResourceKind,
    manager: &mut dyn ResourceManager,
) -> Result<(Vec<ResourceItem>, Option<UsageIndex>), ManagerError> {
    let items = manager.list(kind)?;
    if kind != ResourceKind::Volume {
        return Ok((items, None));
    }

    let containers = manager.list(ResourceKind::Container)?;
    let containers: Vec<_> = containers
        .iter()
        .filter_map(ResourceItem::as_container)
        .cloned()
        .collect();
    let volumes: Vec<_> = items.iter().filter_map(ResourceItem::as_volume).cloned().collect();
    let index = UsageIndex::build(&containers, &volumes);
    Ok((items, Some(index)))
}

/// First visible row so that `selected` sits inside a window of `viewport` rows.
pub fn scroll_offset(selected: usize, len: usize, viewport: usize) -> usize {
    if viewport == 0 || len <= viewport {
        return 0;
    }
    let offset = (selected + 1).saturating_sub(viewport);
    offset.min(len - viewport)
}
