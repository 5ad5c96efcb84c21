use crate::config::settings::Settings;
use crate::domain::model::{Frequency, TaskCreate, TaskUpdate};
use crate::domain::services::DEFAULT_LIST_LIMIT;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "lastdone")]
#[command(about = "Track when you last did something and when to do it again")]
#[command(version)]
pub struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve(ServeArgs),

    /// Call the `/api` endpoint of a running server and print the response
    Fetch {
        /// Server base URL (defaults to the configured server.bind)
        #[arg(long)]
        url: Option<String>,
    },

    /// Manage tasks on a running server
    Tasks(TasksArgs),
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Override the listen address (host:port)
    #[arg(long)]
    pub bind: Option<String>,

    /// Override the data directory
    #[arg(long)]
    pub data_dir: Option<String>,

    /// Keep tasks in memory only
    #[arg(long)]
    pub in_memory: bool,
}

impl ServeArgs {
    /// 命令列參數優先於設定檔
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(bind) = &self.bind {
            settings.server.bind = bind.clone();
        }
        if let Some(data_dir) = &self.data_dir {
            settings.storage.data_dir = data_dir.clone();
        }
        if self.in_memory {
            settings.storage.in_memory = true;
        }
    }
}

#[derive(Debug, Args)]
pub struct TasksArgs {
    /// Server base URL (defaults to the configured server.bind)
    #[arg(long)]
    pub url: Option<String>,

    #[command(subcommand)]
    pub command: TaskCommand,
}

#[derive(Debug, Subcommand)]
pub enum TaskCommand {
    /// List tasks
    List {
        #[arg(long, default_value_t = 0)]
        skip: usize,
        #[arg(long, default_value_t = DEFAULT_LIST_LIMIT)]
        limit: usize,
    },

    /// Show one task
    Show { id: i64 },

    /// Create a task
    Add {
        name: String,
        #[command(flatten)]
        fields: TaskFields,
    },

    /// Update fields of a task
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        fields: TaskFields,
    },

    /// Delete a task
    Remove { id: i64 },
}

#[derive(Debug, Args)]
pub struct TaskFields {
    #[arg(long)]
    pub description: Option<String>,

    /// daily, weekly, monthly, yearly or other
    #[arg(long)]
    pub frequency: Option<Frequency>,

    /// Interval in days, used with `--frequency other`
    #[arg(long = "every")]
    pub frequency_value: Option<u32>,

    /// Date last done (YYYY-MM-DD)
    #[arg(long)]
    pub last_done: Option<NaiveDate>,

    /// Date to do next (YYYY-MM-DD)
    #[arg(long)]
    pub next_to_do: Option<NaiveDate>,
}

impl TaskFields {
    pub fn into_create(self, name: String) -> TaskCreate {
        TaskCreate {
            name,
            description: self.description,
            frequency: self.frequency.unwrap_or_default(),
            frequency_value: self.frequency_value,
            last_done: self.last_done,
            next_to_do: self.next_to_do,
        }
    }

    pub fn into_update(self, name: Option<String>) -> TaskUpdate {
        TaskUpdate {
            name,
            description: self.description.map(Some),
            frequency: self.frequency,
            frequency_value: self.frequency_value.map(Some),
            last_done: self.last_done.map(Some),
            next_to_do: self.next_to_do.map(Some),
        }
    }
}
