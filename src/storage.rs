use crate::model::{
    format_date, parse_date, Item, ItemError, ItemFilter, ItemId, ItemPatch, NewItem, Status,
};
use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, Transaction};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS items(
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    type TEXT NOT NULL CHECK (type IN ('todo','idea','issue')),
    title TEXT NOT NULL,
    body TEXT DEFAULT '',
    status TEXT NOT NULL DEFAULT 'todo' CHECK (status IN ('todo','doing','blocked','done')),
    priority TEXT NOT NULL DEFAULT 'med' CHECK (priority IN ('low','med','high')),
    due_date TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS tags(
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT UNIQUE NOT NULL
);
CREATE TABLE IF NOT EXISTS item_tags(
    item_id INTEGER NOT NULL REFERENCES items(id) ON DELETE CASCADE,
    tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
    PRIMARY KEY(item_id, tag_id)
);
";

const ITEM_COLUMNS: &str =
    "id, type, title, body, status, priority, due_date, created_at, updated_at";

const ITEM_ORDER: &str = "ORDER BY
    CASE priority WHEN 'high' THEN 0 WHEN 'med' THEN 1 ELSE 2 END,
    due_date IS NULL, due_date, id";

/// The two store operations the reader interface depends on.
pub trait ItemStore {
    fn list_items(&self) -> Result<Vec<Item>>;
    fn update_item_status(&self, id: ItemId, status: Status) -> Result<()>;
}

/// SQLite-backed item store.
///
/// Holds only the database path: every operation opens a connection, runs,
/// and drops it before returning.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

struct RawItem {
    id: ItemId,
    kind: String,
    title: String,
    body: Option<String>,
    status: String,
    priority: String,
    due_date: Option<String>,
    created_at: String,
    updated_at: String,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Store { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn init(&self) -> Result<()> {
        self.connect()?;
        info!(path = %self.path.display(), "database initialized");
        Ok(())
    }

    pub fn insert_item(&self, item: &NewItem) -> Result<ItemId> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let now = now_iso();
        tx.execute(
            "INSERT INTO items (type, title, body, status, priority, due_date, created_at, updated_at)
             VALUES (?1, ?2, ?3, 'todo', ?4, ?5, ?6, ?6)",
            params![
                item.kind.as_str(),
                item.title,
                item.body,
                item.priority.as_str(),
                item.due_date.map(format_date),
                now,
            ],
        )
        .context("inserting item")?;
        let id = tx.last_insert_rowid();
        if !item.tags.is_empty() {
            set_item_tags(&tx, id, &item.tags)?;
        }
        tx.commit()?;
        info!(id, "item inserted");
        Ok(id)
    }

    pub fn get_item(&self, id: ItemId) -> Result<Option<Item>> {
        let conn = self.connect()?;
        let raw = conn
            .query_row(
                &format!("SELECT {} FROM items WHERE id = ?1", ITEM_COLUMNS),
                [id],
                raw_item,
            )
            .optional()
            .with_context(|| format!("loading item #{}", id))?;
        match raw {
            Some(raw) => {
                let tags = load_tags(&conn, raw.id)?;
                Ok(Some(raw.into_item(tags)?))
            }
            None => Ok(None),
        }
    }

    pub fn query_items(&self, filter: &ItemFilter) -> Result<Vec<Item>> {
        let conn = self.connect()?;
        let mut clauses: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(kind) = filter.kind {
            clauses.push("type = ?");
            values.push(Value::Text(kind.as_str().into()));
        }
        if let Some(status) = filter.status {
            clauses.push("status = ?");
            values.push(Value::Text(status.as_str().into()));
        }
        if filter.open_only {
            clauses.push("status != 'done'");
        }
        if let Some(tag) = &filter.tag {
            clauses.push(
                "id IN (SELECT it.item_id FROM item_tags it JOIN tags t ON t.id = it.tag_id WHERE t.name = ?)",
            );
            values.push(Value::Text(tag.clone()));
        }
        if let Some(search) = &filter.search {
            clauses.push("(title LIKE ? OR body LIKE ?)");
            let pattern = format!("%{}%", search);
            values.push(Value::Text(pattern.clone()));
            values.push(Value::Text(pattern));
        }
        if let Some(days) = filter.due_within_days {
            let cutoff = Utc::now().date_naive() + Duration::days(i64::from(days));
            clauses.push("due_date IS NOT NULL AND due_date <= ?");
            values.push(Value::Text(format_date(cutoff)));
        }

        let where_clause = if clauses.is_empty() {
            "1=1".to_string()
        } else {
            clauses.join(" AND ")
        };
        let sql = format!(
            "SELECT {} FROM items WHERE {} {}",
            ITEM_COLUMNS, where_clause, ITEM_ORDER
        );
        let mut stmt = conn.prepare(&sql).context("preparing item query")?;
        let raws = stmt
            .query_map(params_from_iter(values), raw_item)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("listing items")?;

        let mut items = Vec::with_capacity(raws.len());
        for raw in raws {
            let tags = load_tags(&conn, raw.id)?;
            items.push(raw.into_item(tags)?);
        }
        debug!(count = items.len(), "items listed");
        Ok(items)
    }

    pub fn update_item(&self, id: ItemId, patch: &ItemPatch) -> Result<()> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let exists: Option<ItemId> = tx
            .query_row("SELECT id FROM items WHERE id = ?1", [id], |row| row.get(0))
            .optional()?;
        if exists.is_none() {
            return Err(ItemError::NotFound(id).into());
        }

        let mut sets: Vec<&str> = vec!["updated_at = ?"];
        let mut values: Vec<Value> = vec![Value::Text(now_iso())];
        if let Some(title) = &patch.title {
            sets.push("title = ?");
            values.push(Value::Text(title.clone()));
        }
        if let Some(body) = &patch.body {
            sets.push("body = ?");
            values.push(Value::Text(body.clone()));
        }
        if let Some(kind) = patch.kind {
            sets.push("type = ?");
            values.push(Value::Text(kind.as_str().into()));
        }
        if let Some(status) = patch.status {
            sets.push("status = ?");
            values.push(Value::Text(status.as_str().into()));
        }
        if let Some(priority) = patch.priority {
            sets.push("priority = ?");
            values.push(Value::Text(priority.as_str().into()));
        }
        if let Some(due) = patch.due_date {
            sets.push("due_date = ?");
            values.push(match due {
                Some(date) => Value::Text(format_date(date)),
                None => Value::Null,
            });
        }
        values.push(Value::Integer(id));
        tx.execute(
            &format!("UPDATE items SET {} WHERE id = ?", sets.join(", ")),
            params_from_iter(values),
        )
        .with_context(|| format!("updating item #{}", id))?;
        if let Some(tags) = &patch.tags {
            set_item_tags(&tx, id, tags)?;
        }
        tx.commit()?;
        info!(id, "item updated");
        Ok(())
    }

    pub fn delete_item(&self, id: ItemId) -> Result<()> {
        let conn = self.connect()?;
        let removed = conn
            .execute("DELETE FROM items WHERE id = ?1", [id])
            .with_context(|| format!("deleting item #{}", id))?;
        if removed == 0 {
            return Err(ItemError::NotFound(id).into());
        }
        info!(id, "item deleted");
        Ok(())
    }

    fn connect(&self) -> Result<Connection> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
            }
        }
        let conn = Connection::open(&self.path)
            .with_context(|| format!("opening database {:?}", self.path))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA).context("applying schema")?;
        Ok(conn)
    }
}

impl ItemStore for Store {
    fn list_items(&self) -> Result<Vec<Item>> {
        self.query_items(&ItemFilter::default())
    }

    fn update_item_status(&self, id: ItemId, status: Status) -> Result<()> {
        let conn = self.connect()?;
        let changed = conn
            .execute(
                "UPDATE items SET status = ?1, updated_at = ?2 WHERE id = ?3",
                params![status.as_str(), now_iso(), id],
            )
            .with_context(|| format!("updating status of item #{}", id))?;
        if changed == 0 {
            debug!(id, "status update skipped, item no longer exists");
        } else {
            info!(id, status = %status, "status updated");
        }
        Ok(())
    }
}

impl RawItem {
    fn into_item(self, tags: Vec<String>) -> Result<Item> {
        let due_date = match self.due_date.as_deref() {
            Some(raw) if !raw.trim().is_empty() => Some(parse_date(raw)?),
            _ => None,
        };
        Ok(Item {
            id: self.id,
            title: self.title,
            kind: self.kind.parse()?,
            status: self.status.parse()?,
            priority: self.priority.parse()?,
            due_date,
            body: self.body.unwrap_or_default(),
            tags,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn raw_item(row: &Row<'_>) -> rusqlite::Result<RawItem> {
    Ok(RawItem {
        id: row.get(0)?,
        kind: row.get(1)?,
        title: row.get(2)?,
        body: row.get(3)?,
        status: row.get(4)?,
        priority: row.get(5)?,
        due_date: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn load_tags(conn: &Connection, item_id: ItemId) -> Result<Vec<String>> {
    let mut stmt = conn.prepare_cached(
        "SELECT t.name FROM tags t JOIN item_tags it ON t.id = it.tag_id
         WHERE it.item_id = ?1 ORDER BY t.name",
    )?;
    let tags = stmt
        .query_map([item_id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(tags)
}

fn set_item_tags(tx: &Transaction<'_>, item_id: ItemId, tags: &[String]) -> Result<()> {
    tx.execute("DELETE FROM item_tags WHERE item_id = ?1", [item_id])?;
    for name in tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        tx.execute("INSERT OR IGNORE INTO tags (name) VALUES (?1)", [name])?;
        let tag_id: i64 = tx.query_row("SELECT id FROM tags WHERE name = ?1", [name], |row| {
            row.get(0)
        })?;
        tx.execute(
            "INSERT OR IGNORE INTO item_tags (item_id, tag_id) VALUES (?1, ?2)",
            params![item_id, tag_id],
        )?;
    }
    Ok(())
}

fn now_iso() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
