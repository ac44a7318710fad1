mod cli;
mod commands;
mod config;
mod export;
mod logging;
mod model;
mod storage;
mod ui;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use config::Config;
use model::{ItemFilter, Status};
use storage::Store;
use tracing::debug;

fn main() -> Result<()> {
    let args = Cli::parse();
    let config = Config::load()?;
    let db_path = config.resolve_db_path(args.db)?;
    if let Err(err) = logging::init(&db_path, config.log_level()) {
        eprintln!("warning: logging disabled: {:#}", err);
    }
    let store = Store::new(db_path);

    let command = args.command.unwrap_or(Command::Tui);
    debug!(?command, db = %store.path().display(), "dispatching");
    match command {
        Command::Init => commands::init(&store),
        Command::Add {
            title,
            kind,
            body,
            priority,
            tags,
            due,
        } => commands::add(&store, title, kind, body, priority, tags, due),
        Command::List {
            kind,
            status,
            open,
            tag,
            search,
            due_in,
        } => commands::list(
            &store,
            ItemFilter {
                kind,
                status,
                open_only: open,
                tag,
                search,
                due_within_days: due_in,
            },
        ),
        Command::Show { id } => commands::show(&store, id),
        Command::Edit {
            id,
            title,
            body,
            kind,
            status,
            priority,
            due,
            tags,
        } => commands::edit(&store, id, title, body, kind, status, priority, due, tags),
        Command::Start { id } => commands::set_status(&store, id, Status::Doing),
        Command::Block { id } => commands::set_status(&store, id, Status::Blocked),
        Command::Done { id } => commands::set_status(&store, id, Status::Done),
        Command::Delete { id, yes } => commands::delete(&store, id, yes),
        Command::Agenda { days } => commands::agenda(&store, days),
        Command::Export { format, output } => commands::export(&store, format, &output),
        Command::Tui => commands::tui(store),
    }
}
