//! Terminal host for the to-do core.
//!
//! # Responsibility
//! - Parse commands and hand them to a [`session::Session`].
//! - Print success notices followed by the rendered cells.

mod session;
mod view;

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use session::{CliResult, ListView, Session};
use std::path::PathBuf;
use todo_core::db::open_db;
use todo_core::{init_logging, CoreConfig, PresentationMode, SortField, SqliteTaskRepository, Task};

#[derive(Parser, Debug)]
#[command(name = "todo", version, about = "Local to-do list")]
struct Cli {
    /// Render cards instead of rows.
    #[arg(long, global = true)]
    grid: bool,

    /// Database file; overrides TODO_DB_PATH.
    #[arg(long = "db", global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a task.
    Add {
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// Replace the title and/or description of the task shown at POSITION.
    ///
    /// Pass the same --sort/--desc/--search options used to list it.
    Edit {
        position: usize,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Delete the task shown at POSITION.
    ///
    /// Pass the same --sort/--desc/--search options used to list it.
    Delete {
        position: usize,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Show all tasks.
    List {
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Show tasks whose title contains QUERY.
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
}

/// Options selecting the listed view.
#[derive(Args, Debug)]
struct ViewArgs {
    #[arg(long, value_enum)]
    sort: Option<SortArg>,
    #[arg(long)]
    desc: bool,
    /// Title filter; ordered newest first.
    #[arg(long, conflicts_with_all = ["sort", "desc"])]
    search: Option<String>,
}

impl From<ViewArgs> for ListView {
    fn from(args: ViewArgs) -> Self {
        Self {
            sort: args.sort.map(SortField::from),
            descending: args.desc,
            search: args.search,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum SortArg {
    Title,
    Date,
}

impl From<SortArg> for SortField {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Title => SortField::Title,
            SortArg::Date => SortField::Date,
        }
    }
}

fn main() {
    if let Err(err) = run(Cli::parse()) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let config = CoreConfig::from_env()?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(config.log_level, log_dir)?;
    }

    let db_path = cli.db.clone().unwrap_or_else(|| config.db_path.clone());
    let conn = open_db(&db_path)?;
    let layout = if cli.grid {
        PresentationMode::Grid
    } else {
        config.layout
    };
    let session = Session::new(
        SqliteTaskRepository::try_new(&conn)?,
        config.sort,
        layout,
        config.renderer_options(),
    );

    info!(
        "event=cli_command module=cli status=start layout={}",
        layout.as_str()
    );

    match cli.command {
        Command::Add { title, description } => session.add(&Task::new(title, description))?,
        Command::Edit {
            position,
            title,
            description,
            view,
        } => session.edit(position, title, description, &view.into())?,
        Command::Delete { position, view } => session.delete(position, &view.into())?,
        Command::List { view } => session.show(&view.into())?,
        Command::Search { query } => session.show(&ListView {
            search: Some(query.join(" ")),
            ..ListView::default()
        })?,
    }

    for notice in session.take_notices() {
        println!("{notice}");
    }
    print!("{}", session.render());
    Ok(())
}
