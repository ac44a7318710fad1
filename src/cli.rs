use crate::export::ExportFormat;
use crate::model::{ItemId, ItemKind, Priority, Status};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "mindlite",
    version,
    about = "Todos, ideas and issues in a small SQLite file"
)]
pub struct Cli {
    /// Database file (overrides MINDLITE_DB and the config file)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the database schema
    Init,
    /// Add a new item
    Add {
        /// Title of the item
        title: String,
        /// Item type
        #[arg(long = "type", value_enum, default_value_t = ItemKind::Todo)]
        kind: ItemKind,
        /// Body/notes
        #[arg(long)]
        body: Option<String>,
        /// Priority
        #[arg(long, value_enum, default_value_t = Priority::Med)]
        priority: Priority,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
    },
    /// List items
    List {
        /// Filter by type
        #[arg(long = "type", value_enum)]
        kind: Option<ItemKind>,
        /// Filter by status
        #[arg(long, value_enum)]
        status: Option<Status>,
        /// Only items that are not done
        #[arg(long)]
        open: bool,
        /// Filter by tag
        #[arg(long)]
        tag: Option<String>,
        /// Search title and body
        #[arg(long)]
        search: Option<String>,
        /// Only items due within N days
        #[arg(long)]
        due_in: Option<u32>,
    },
    /// Show one item in detail
    Show {
        id: ItemId,
    },
    /// Edit an item
    Edit {
        id: ItemId,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New body
        #[arg(long)]
        body: Option<String>,
        /// New type
        #[arg(long = "type", value_enum)]
        kind: Option<ItemKind>,
        /// New status
        #[arg(long, value_enum)]
        status: Option<Status>,
        /// New priority
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        /// New due date (YYYY-MM-DD, empty to clear)
        #[arg(long)]
        due: Option<String>,
        /// Replace tags (comma-separated)
        #[arg(long)]
        tags: Option<String>,
    },
    /// Start working on an item
    Start { id: ItemId },
    /// Mark an item as blocked
    Block { id: ItemId },
    /// Mark an item as done
    Done { id: ItemId },
    /// Delete an item
    Delete {
        id: ItemId,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Open items due soon
    Agenda {
        /// Days ahead to include
        #[arg(long, default_value_t = 7)]
        days: u32,
    },
    /// Write every item to a JSON or Markdown file
    Export {
        #[arg(value_enum)]
        format: ExportFormat,
        /// Output file path
        output: PathBuf,
    },
    /// Launch the interactive reader
    Tui,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_parses() {
        let cli = Cli::try_parse_from(["mindlite"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn add_parses_enums_and_defaults() {
        let cli =
            Cli::try_parse_from(["mindlite", "add", "Fix bug", "--type", "issue", "--db", "x.db"])
                .unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("x.db")));
        match cli.command {
            Some(Command::Add { kind, priority, .. }) => {
                assert_eq!(kind, ItemKind::Issue);
                assert_eq!(priority, Priority::Med);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn export_takes_format_then_path() {
        let cli = Cli::try_parse_from(["mindlite", "export", "md", "out/items.md"]).unwrap();
        match cli.command {
            Some(Command::Export { format, output }) => {
                assert_eq!(format, ExportFormat::Md);
                assert_eq!(output, PathBuf::from("out/items.md"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(Cli::try_parse_from(["mindlite", "export", "csv", "x.csv"]).is_err());
    }

    #[test]
    fn invalid_status_is_rejected() {
        assert!(Cli::try_parse_from(["mindlite", "list", "--status", "later"]).is_err());
    }
}
