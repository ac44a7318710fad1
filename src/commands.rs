use crate::export::{self, ExportFormat};
use crate::model::{
    format_date, parse_date, parse_tags, Item, ItemError, ItemFilter, ItemId, ItemKind, ItemPatch,
    NewItem, Priority, Status,
};
use crate::storage::Store;
use crate::ui;
use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use std::path::Path;

const TABLE_HEADERS: [&str; 7] = ["ID", "TYPE", "TITLE", "STATUS", "PRI", "DUE", "TAGS"];

pub fn init(store: &Store) -> Result<()> {
    store.init()?;
    println!("Database initialized at {}", store.path().display());
    Ok(())
}

pub fn add(
    store: &Store,
    title: String,
    kind: ItemKind,
    body: Option<String>,
    priority: Priority,
    tags: Option<String>,
    due: Option<String>,
) -> Result<()> {
    let due_date = match due.as_deref() {
        Some(raw) => Some(parse_date(raw)?),
        None => None,
    };
    let item = NewItem {
        title,
        kind,
        body: body.unwrap_or_default(),
        priority,
        due_date,
        tags: tags.as_deref().map(parse_tags).unwrap_or_default(),
    };
    let id = store.insert_item(&item)?;
    println!("Added item #{}: {}", id, item.title);
    Ok(())
}

pub fn list(store: &Store, filter: ItemFilter) -> Result<()> {
    let items = store.query_items(&filter)?;
    if items.is_empty() {
        println!("No items found.");
        return Ok(());
    }
    print_table(&items);
    Ok(())
}

pub fn show(store: &Store, id: ItemId) -> Result<()> {
    let item = require_item(store, id)?;
    print_detail(&item);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn edit(
    store: &Store,
    id: ItemId,
    title: Option<String>,
    body: Option<String>,
    kind: Option<ItemKind>,
    status: Option<Status>,
    priority: Option<Priority>,
    due: Option<String>,
    tags: Option<String>,
) -> Result<()> {
    require_item(store, id)?;
    let due_date = match due.as_deref().map(str::trim) {
        Some("") => Some(None),
        Some(raw) => Some(Some(parse_date(raw)?)),
        None => None,
    };
    let patch = ItemPatch {
        title,
        body,
        kind,
        status,
        priority,
        due_date,
        tags: tags.as_deref().map(parse_tags),
    };
    if patch_is_empty(&patch) {
        println!("No changes specified.");
        return Ok(());
    }
    store.update_item(id, &patch)?;
    println!("Updated item #{}", id);
    Ok(())
}

pub fn set_status(store: &Store, id: ItemId, status: Status) -> Result<()> {
    require_item(store, id)?;
    let patch = ItemPatch {
        status: Some(status),
        ..ItemPatch::default()
    };
    store.update_item(id, &patch)?;
    println!("Item #{} status changed to {}", id, status);
    Ok(())
}

pub fn delete(store: &Store, id: ItemId, yes: bool) -> Result<()> {
    let item = require_item(store, id)?;
    if !yes {
        let prompt = format!("Delete item #{} '{}'?", id, item.title);
        let stdin = io::stdin();
        if !confirm(&prompt, stdin.lock())? {
            println!("Cancelled.");
            return Ok(());
        }
    }
    store.delete_item(id)?;
    println!("Deleted item #{}", id);
    Ok(())
}

pub fn agenda(store: &Store, days: u32) -> Result<()> {
    let filter = ItemFilter {
        open_only: true,
        due_within_days: Some(days),
        ..ItemFilter::default()
    };
    let items = store.query_items(&filter)?;
    if items.is_empty() {
        println!("No items due within {} days.", days);
        return Ok(());
    }
    println!("Items due within {} days:", days);
    println!();
    print_table(&items);
    Ok(())
}

pub fn export(store: &Store, format: ExportFormat, output: &Path) -> Result<()> {
    export::write_export(store, format, output)?;
    println!("Exported to {}", output.display());
    Ok(())
}

pub fn tui(store: Store) -> Result<()> {
    ui::run(store)
}

fn require_item(store: &Store, id: ItemId) -> Result<Item> {
    store
        .get_item(id)?
        .ok_or_else(|| ItemError::NotFound(id).into())
}

fn patch_is_empty(patch: &ItemPatch) -> bool {
    patch.title.is_none()
        && patch.body.is_none()
        && patch.kind.is_none()
        && patch.status.is_none()
        && patch.priority.is_none()
        && patch.due_date.is_none()
        && patch.tags.is_none()
}

/// Asks until the answer is yes or no; an empty answer or end of input is no.
fn confirm<R: BufRead>(prompt: &str, mut input: R) -> Result<bool> {
    loop {
        print!("{} [y/N]: ", prompt);
        io::stdout().flush()?;
        let mut answer = String::new();
        let read = input
            .read_line(&mut answer)
            .context("reading confirmation")?;
        if read == 0 {
            return Ok(false);
        }
        match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" | "" => return Ok(false),
            _ => println!("Please enter 'y' for yes or 'n' for no."),
        }
    }
}

fn table_row(item: &Item) -> [String; 7] {
    [
        item.id.to_string(),
        item.kind.to_string(),
        item.title.clone(),
        item.status.to_string(),
        item.priority.to_string(),
        item.due_date.map(format_date).unwrap_or_default(),
        item.tags.join(", "),
    ]
}

fn render_table(items: &[Item]) -> Vec<String> {
    let rows: Vec<[String; 7]> = items.iter().map(table_row).collect();
    let mut widths = TABLE_HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }
    let format_row = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let headers: Vec<String> = TABLE_HEADERS.iter().map(|h| h.to_string()).collect();
    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let mut lines = vec![format_row(&headers), format_row(&separator)];
    lines.extend(rows.iter().map(|row| format_row(row)));
    lines
}

fn print_table(items: &[Item]) {
    for line in render_table(items) {
        println!("{}", line);
    }
}

fn render_detail(item: &Item) -> Vec<String> {
    let mut lines = vec![
        format!("#{} {}", item.id, item.title),
        format!(
            "Type: {}  |  Status: {}  |  Priority: {}",
            item.kind, item.status, item.priority
        ),
        format!(
            "Due: {}  |  Tags: {}",
            item.due_date
                .map(format_date)
                .unwrap_or_else(|| "-".to_string()),
            if item.tags.is_empty() {
                "-".to_string()
            } else {
                item.tags.join(", ")
            }
        ),
        format!("Created: {}  Updated: {}", item.created_at, item.updated_at),
        String::new(),
    ];
    if item.body.trim().is_empty() {
        lines.push("(no body)".to_string());
    } else {
        lines.extend(item.body.lines().map(str::to_string));
    }
    lines
}

fn print_detail(item: &Item) {
    for line in render_detail(item) {
        println!("{}", line);
    }
}
