use chrono::NaiveDate;
use clap::ValueEnum;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub type ItemId = i64;

/// Id reserved for the synthetic "no items yet" entry shown by the TUI.
/// Only meaningful inside the UI; the store never hands it out.
pub const PLACEHOLDER_ID: ItemId = 0;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Todo,
    Idea,
    Issue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Todo,
    Doing,
    Blocked,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Med,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub status: Status,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub body: String,
    pub tags: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields for a record that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub title: String,
    pub kind: ItemKind,
    pub body: String,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub tags: Vec<String>,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct ItemPatch {
    pub title: Option<String>,
    pub body: Option<String>,
    pub kind: Option<ItemKind>,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub due_date: Option<Option<NaiveDate>>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    pub kind: Option<ItemKind>,
    pub status: Option<Status>,
    pub open_only: bool,
    pub tag: Option<String>,
    pub search: Option<String>,
    pub due_within_days: Option<u32>,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ItemError {
    #[error("invalid type: {0} (expected todo, idea or issue)")]
    InvalidKind(String),
    #[error("invalid status: {0} (expected todo, doing, blocked or done)")]
    InvalidStatus(String),
    #[error("invalid priority: {0} (expected low, med or high)")]
    InvalidPriority(String),
    #[error("invalid date: {0} (use YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("item #{0} not found")]
    NotFound(ItemId),
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Todo => "todo",
            ItemKind::Idea => "idea",
            ItemKind::Issue => "issue",
        }
    }
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::Doing => "doing",
            Status::Blocked => "blocked",
            Status::Done => "done",
        }
    }

    /// Next status in the cycle todo -> doing -> blocked -> done -> todo.
    pub fn next(self) -> Status {
        match self {
            Status::Todo => Status::Doing,
            Status::Doing => Status::Blocked,
            Status::Blocked => Status::Done,
            Status::Done => Status::Todo,
        }
    }
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Med => "med",
            Priority::High => "high",
        }
    }
}

impl FromStr for ItemKind {
    type Err = ItemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "todo" => Ok(ItemKind::Todo),
            "idea" => Ok(ItemKind::Idea),
            "issue" => Ok(ItemKind::Issue),
            other => Err(ItemError::InvalidKind(other.to_string())),
        }
    }
}

impl FromStr for Status {
    type Err = ItemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "todo" => Ok(Status::Todo),
            "doing" => Ok(Status::Doing),
            "blocked" => Ok(Status::Blocked),
            "done" => Ok(Status::Done),
            other => Err(ItemError::InvalidStatus(other.to_string())),
        }
    }
}

impl FromStr for Priority {
    type Err = ItemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "low" => Ok(Priority::Low),
            "med" => Ok(Priority::Med),
            "high" => Ok(Priority::High),
            other => Err(ItemError::InvalidPriority(other.to_string())),
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Item {
    pub fn placeholder() -> Self {
        Item {
            id: PLACEHOLDER_ID,
            title: "(no items yet)".into(),
            kind: ItemKind::Todo,
            status: Status::Todo,
            priority: Priority::Med,
            due_date: None,
            body: "Use: mindlite add \"Title\" --type todo".into(),
            tags: Vec::new(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.id == PLACEHOLDER_ID
    }

    /// One-line summary: `type • status • priority [• due date] [• #tags]`.
    pub fn meta_line(&self) -> String {
        let mut meta = format!("{} • {} • {}", self.kind, self.status, self.priority);
        if let Some(due) = self.due_date {
            meta.push_str(&format!(" • due {}", format_date(due)));
        }
        if !self.tags.is_empty() {
            meta.push_str(&format!(" • #{}", self.tags.join(" #")));
        }
        meta
    }
}

pub fn parse_date(input: &str) -> Result<NaiveDate, ItemError> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| ItemError::InvalidDate(trimmed.to_string()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_cycle_returns_to_start_after_four_steps() {
        let mut status = Status::Todo;
        let mut seen = Vec::new();
        for _ in 0..4 {
            status = status.next();
            seen.push(status);
        }
        assert_eq!(
            seen,
            vec![Status::Doing, Status::Blocked, Status::Done, Status::Todo]
        );
    }

    #[test]
    fn enums_parse_their_display_form() {
        for status in [Status::Todo, Status::Doing, Status::Blocked, Status::Done] {
            assert_eq!(status.to_string().parse::<Status>(), Ok(status));
        }
        assert_eq!("issue".parse::<ItemKind>(), Ok(ItemKind::Issue));
        assert_eq!("high".parse::<Priority>(), Ok(Priority::High));
        assert_eq!(
            "urgent".parse::<Priority>(),
            Err(ItemError::InvalidPriority("urgent".into()))
        );
    }

    #[test]
    fn parse_date_rejects_other_formats() {
        assert!(parse_date("2025-10-25").is_ok());
        assert!(matches!(
            parse_date("2025.10.25"),
            Err(ItemError::InvalidDate(_))
        ));
        assert!(parse_date("2025-02-30").is_err());
    }

    #[test]
    fn parse_tags_trims_and_drops_empties() {
        assert_eq!(parse_tags(" work, ,home ,"), vec!["work", "home"]);
        assert!(parse_tags("").is_empty());
    }

    #[test]
    fn meta_line_includes_optional_parts() {
        let mut item = Item::placeholder();
        assert_eq!(item.meta_line(), "todo • todo • med");
        item.due_date = Some(parse_date("2025-10-25").unwrap());
        item.tags = vec!["cv".into(), "job".into()];
        assert_eq!(
            item.meta_line(),
            "todo • todo • med • due 2025-10-25 • #cv #job"
        );
    }
}
