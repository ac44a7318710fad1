use crate::model::{format_date, Item, ItemFilter};
use crate::storage::Store;
use anyhow::{Context, Result};
use clap::ValueEnum;
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Md,
}

/// Writes every stored item to `path` and returns how many were written.
pub fn write_export(store: &Store, format: ExportFormat, path: &Path) -> Result<usize> {
    let items = store.query_items(&ItemFilter::default())?;
    let contents = match format {
        ExportFormat::Json => to_json(&items)?,
        ExportFormat::Md => to_markdown(&items),
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
        }
    }
    fs::write(path, contents).with_context(|| format!("writing {:?}", path))?;
    info!(count = items.len(), ?format, path = %path.display(), "items exported");
    Ok(items.len())
}

pub fn to_json(items: &[Item]) -> Result<String> {
    serde_json::to_string_pretty(items).context("serializing items")
}

pub fn to_markdown(items: &[Item]) -> String {
    let mut lines = vec!["# Mindlite Export\n".to_string()];
    for item in items {
        lines.push(format!("## #{} {}", item.id, item.title));
        lines.push(format!("- Type: {}", item.kind));
        lines.push(format!("- Status: {}", item.status));
        lines.push(format!("- Priority: {}", item.priority));
        lines.push(format!(
            "- Due: {}",
            item.due_date
                .map(format_date)
                .unwrap_or_else(|| "Not set".to_string())
        ));
        lines.push(format!(
            "- Tags: {}",
            if item.tags.is_empty() {
                "None".to_string()
            } else {
                item.tags.join(", ")
            }
        ));
        lines.push(format!("- Created: {}", item.created_at));
        lines.push(format!("- Updated: {}", item.updated_at));
        if item.body.is_empty() {
            lines.push("\nNo body text.".to_string());
        } else {
            lines.push(format!("\n{}", item.body));
        }
        lines.push("\n---\n".to_string());
    }
    lines.join("\n")
}
