use std::io::{self, Write};
use crossterm::{cursor, queue, style::{Attribute, SetAttribute}};

use crate::model::{scroll_offset, ResourceItem, ResourceKind, ViewModel};
use super::shared::{truncate_str, writeln, write_selectable};
use super::Rows;

const NAME_WIDTH: usize = 24;
const ID_WIDTH: usize = 14;
const FIELD_WIDTH: usize = 16;

pub fn render_items(out: &mut impl Write, view: &ViewModel, rows: Rows, cols: u16) -> io::Result<()> {
    let kind = view.current();
    let width = cols as usize;
    queue!(out, cursor::MoveTo(0, rows.columns))?;

    queue!(out, SetAttribute(Attribute::Bold))?;
    write!(out, "{}", truncate_str(&heading(kind), width))?;
    queue!(out, SetAttribute(Attribute::Reset))?;
    write!(out, "\r\n")?;

    let items = view.items();
    if items.is_empty() {
        writeln(out, "")?;
        writeln(out, &format!("  No {} found.", kind.title().to_lowercase()))?;
        return Ok(());
    }

    let offset = scroll_offset(view.selected(), items.len(), rows.list_height);
    for (idx, item) in items.iter().enumerate().skip(offset).take(rows.list_height) {
        let line = truncate_str(&row_text(view, item), width);
        write_selectable(out, &line, idx == view.selected())?;
    }
    Ok(())
}

/// Column headings, aligned with `row_text`.
pub fn heading(kind: ResourceKind) -> String {
    let mut cells = vec![format!("{:<NAME_WIDTH$}", "NAME")];
    if kind != ResourceKind::Volume && kind != ResourceKind::FtpSetting {
        cells.push(format!("{:<ID_WIDTH$}", "ID"));
    }
    let columns = kind.columns();
    for (i, c) in columns.iter().enumerate() {
        if i + 1 == columns.len() && kind != ResourceKind::Volume {
            cells.push(c.to_string());
        } else {
            cells.push(format!("{:<FIELD_WIDTH$}", c));
        }
    }
    if kind == ResourceKind::Volume {
        cells.push("USED BY".to_string());
    }
    format!("  {}", cells.join(" "))
}

/// One list row: name, id (where it differs from the name), fields, usage.
pub fn row_text(view: &ViewModel, item: &ResourceItem) -> String {
    let mut cells = vec![format!(
        "{:<NAME_WIDTH$}",
        truncate_str(item.display_name(), NAME_WIDTH - 1)
    )];
    let kind = item.kind();
    if kind != ResourceKind::Volume && kind != ResourceKind::FtpSetting {
        cells.push(format!("{:<ID_WIDTH$}", item.id()));
    }
    let fields = item.fields();
    let last = fields.len().saturating_sub(1);
    for (i, field) in fields.iter().enumerate() {
        if i == last && kind != ResourceKind::Volume {
            cells.push(field.clone());
        } else {
            cells.push(format!("{:<FIELD_WIDTH$}", truncate_str(field, FIELD_WIDTH - 1)));
        }
    }
    if let (Some(usage), Some(volume)) = (view.usage(), item.as_volume()) {
        let used_by = usage.get(&volume.name).map(|u| u.describe()).unwrap_or_default();
        cells.push(used_by);
    }
    format!("  {}", cells.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContainerRecord, SelectionPolicy, UsageIndex, VolumeRecord};

    #[test]
    fn volume_rows_show_usage() {
        let volumes = vec![
            VolumeRecord { name: "pgdata".into(), driver: "local".into(), ..Default::default() },
            VolumeRecord { name: "spare".into(), driver: "local".into(), ..Default::default() },
        ];
        let containers = vec![ContainerRecord {
            name: "db".into(),
            image: "postgres".into(),
            mounts: vec!["pgdata".into()],
            ..Default::default()
        }];
        let index = UsageIndex::build(&containers, &volumes);
        let mut view = ViewModel::new(vec![ResourceKind::Volume]);
        view.replace_items(
            volumes.into_iter().map(ResourceItem::Volume).collect(),
            Some(index),
            SelectionPolicy::Reset,
        );

        let rows: Vec<String> = view.items().iter().map(|i| row_text(&view, i)).collect();
        assert!(rows[0].trim_end().ends_with("db"));
        assert!(rows[1].trim_end().ends_with("(unused)"));
    }

    #[test]
    fn render_scrolls_to_selection() {
        let items: Vec<ResourceItem> = (0..30)
            .map(|i| {
                ResourceItem::Container(ContainerRecord {
                    id: format!("id{i:02}"),
                    name: format!("box{i:02}"),
                    ..Default::default()
                })
            })
            .collect();
        let mut view = ViewModel::new(ResourceKind::ENGINE.to_vec());
        view.replace_items(items, None, SelectionPolicy::Reset);
        for _ in 0..25 {
            view.move_selection(crate::model::Direction::Down);
        }

        let mut buf = Vec::new();
        render_items(&mut buf, &view, Rows::for_height(24), 120).unwrap();
        let text = String::from_utf8_lossy(&buf);
        assert!(text.contains("box25"));
        assert!(!text.contains("box00"));
    }
}
