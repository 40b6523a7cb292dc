mod list;
mod logging;
mod tui;

use std::path::PathBuf;

use anyhow::{bail, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use tracing::debug;
use zentask_core::{
    parse_due_date_local, Config, FileKeyValueStore, Priority, TaskDraft, TaskStore,
};

#[derive(Parser)]
#[command(name = "zentask")]
#[command(about = "Stay organized, focused, and calm: a local task manager", long_about = None)]
struct Cli {
    /// Directory holding the task list (default: $ZENTASK_DATA_DIR or ~/.zentask)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log sink: off, stderr, or a file path (default: <data-dir>/zentask.log)
    #[arg(long, global = true)]
    log: Option<String>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// Task title
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
        /// Optional description
        #[arg(short, long)]
        description: Option<String>,
        /// low, medium or high
        #[arg(short, long, default_value = "medium")]
        priority: Priority,
        /// Due date (2025-05-01, today, tomorrow, fri, +3d, eow, eom)
        #[arg(long)]
        due: Option<String>,
    },
    /// List tasks, newest first
    List {
        /// Only show tasks that are not completed
        #[arg(long)]
        pending: bool,
    },
    /// Flip a task between active and completed
    Toggle {
        /// Task id or unique prefix
        id: String,
    },
    /// Replace a task's title and description
    Edit {
        /// Task id or unique prefix
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete a task permanently
    Delete {
        /// Task id or unique prefix
        id: String,
    },
    /// Open the Terminal User Interface
    Tui,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::resolve(cli.data_dir)?;
    logging::init(cli.log.as_deref(), &config.log_path(), cli.verbose)?;
    debug!(data_dir = %config.data_dir.display(), "resolved configuration");

    let storage = FileKeyValueStore::new(Some(config.data_dir.clone()))?;
    let mut store = TaskStore::hydrate(storage);

    match cli.command {
        Some(Commands::Add {
            title,
            description,
            priority,
            due,
        }) => {
            let mut draft = TaskDraft::new(title.join(" ")).with_priority(priority);
            if let Some(desc) = description {
                draft = draft.with_description(desc);
            }
            if let Some(d) = due {
                draft = draft.with_due_date(parse_due_date_local(&d)?);
            }

            let Some(task) = store.add(draft)? else {
                bail!("Task title is required.");
            };
            println!("Task added: {} (ID: {})", task.title, task.short_id());
            if let Some(d) = task.due_date {
                println!("  Due: {}", d);
            }
            println!("  Priority: {}", task.priority);
        }
        Some(Commands::List { pending }) => {
            let tasks: Vec<_> = store
                .tasks()
                .iter()
                .filter(|t| !pending || !t.completed)
                .collect();
            if tasks.is_empty() {
                println!("All caught up! No tasks found.");
            } else {
                println!("{}", list::render_tasks(&tasks, Local::now().date_naive()));
                println!("{} pending", store.pending_count());
            }
        }
        Some(Commands::Toggle { id }) => {
            let id = store.resolve_id(&id)?;
            store.toggle_complete(&id)?;
            if let Some(task) = store.get(&id) {
                let state = if task.completed { "completed" } else { "active" };
                println!("Task {} is now {}", task.short_id(), state);
            }
        }
        Some(Commands::Edit {
            id,
            title,
            description,
        }) => {
            let id = store.resolve_id(&id)?;
            let (current_title, current_desc) = match store.get(&id) {
                Some(task) => (task.title.clone(), task.description.clone().unwrap_or_default()),
                None => bail!("Task not found"),
            };
            let title = title.unwrap_or(current_title);
            let description = description.unwrap_or(current_desc);
            store.save_edit(&id, &title, &description)?;
            println!("Task updated: {}", title);
        }
        Some(Commands::Delete { id }) => {
            let id = store.resolve_id(&id)?;
            store.delete(&id)?;
            println!("Task deleted: {}", id);
        }
        Some(Commands::Tui) | None => {
            tui::run(store)?;
        }
    }
    Ok(())
}
