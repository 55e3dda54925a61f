/*
[INPUT]:  Parsed subcommand, AppConfig, data directory
[OUTPUT]: Command dispatch and one-line error reporting
[POS]:    CLI layer - shared context for every subcommand
[UPDATE]: When adding subcommands
*/

pub mod account;
pub mod init;
pub mod settings;
pub mod tasks;

use anyhow::Result;
use clap::Subcommand;
use console::style;
use std::path::PathBuf;
use taskr::{AppConfig, OfflineStore, PrefStore, Session, TaskService, UndoWindow};
use taskr_client::{Priority, TaskrClient, TaskrError};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a configuration file interactively
    Init {
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Create an account
    Register {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// Prompted when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Log in and remember the session
    Login {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the session and the offline copy
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Active tasks grouped by priority
    List,
    /// Completed tasks, newest first
    Completed,
    /// Add a task
    Add {
        title: String,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long, default_value = "medium")]
        priority: Priority,
        /// Due date, e.g. 2025-02-01
        #[arg(long)]
        due: Option<String>,
    },
    /// Edit a task; prompts for fields not given
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        /// New description; pass "" to clear it
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        priority: Option<Priority>,
    },
    /// Complete a task, with a short window to undo
    Complete {
        id: i64,
        /// Skip the undo prompt
        #[arg(long)]
        no_undo: bool,
    },
    /// Move a completed task back to the active list
    Reopen { id: i64 },
    /// Delete a task
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Move a task within its priority group (1 = top); needs offline storage
    Reorder { id: i64, position: usize },
    /// Show or change display settings
    Settings {
        /// Brighter group headings in task lists
        #[arg(long, value_name = "BOOL")]
        dark_mode: Option<bool>,
        /// Stored with the account preferences; the terminal font is not changed
        #[arg(long, value_name = "SIZE")]
        text_size: Option<f32>,
    },
}

/// Everything a subcommand needs
pub struct AppContext {
    pub config: AppConfig,
    pub data_dir: PathBuf,
    pub prefs: PrefStore,
    pub client: TaskrClient,
}

impl AppContext {
    pub async fn new(config: AppConfig, data_dir: PathBuf) -> Result<Self> {
        let prefs = PrefStore::open(&data_dir).await?;
        let client = TaskrClient::with_config(config.client_config())?;
        Ok(Self {
            config,
            data_dir,
            prefs,
            client,
        })
    }

    pub fn offline_store(&self) -> Result<Option<OfflineStore>> {
        if !self.config.offline.enabled {
            return Ok(None);
        }
        OfflineStore::in_data_dir(&self.data_dir).map(Some)
    }

    /// Task service for the logged-in user
    pub fn service(&self, session: &Session) -> Result<TaskService<TaskrClient>> {
        let mut service = TaskService::new(self.client.clone(), session.user_id)
            .with_undo_window(UndoWindow::new(self.config.undo_window()));
        if let Some(store) = self.offline_store()? {
            service = service.with_offline(store);
        }
        Ok(service)
    }
}

pub async fn execute(command: Command, config: AppConfig, data_dir: PathBuf) -> Result<()> {
    let ctx = AppContext::new(config, data_dir).await?;

    match command {
        Command::Init { output } => init::run_init(output),
        Command::Register {
            username,
            email,
            password,
        } => account::register(&ctx, username, email, password).await,
        Command::Login { email, password } => account::login(&ctx, email, password).await,
        Command::Logout => account::logout(&ctx).await,
        Command::Whoami => account::whoami(&ctx).await,
        Command::List => tasks::list(&ctx).await,
        Command::Completed => tasks::completed(&ctx).await,
        Command::Add {
            title,
            description,
            priority,
            due,
        } => tasks::add(&ctx, title, description, priority, due).await,
        Command::Edit {
            id,
            title,
            description,
            priority,
        } => tasks::edit(&ctx, id, title, description, priority).await,
        Command::Complete { id, no_undo } => tasks::complete(&ctx, id, no_undo).await,
        Command::Reopen { id } => tasks::reopen(&ctx, id).await,
        Command::Delete { id, yes } => tasks::delete(&ctx, id, yes).await,
        Command::Reorder { id, position } => tasks::reorder(&ctx, id, position).await,
        Command::Settings {
            dark_mode,
            text_size,
        } => settings::run(&ctx, dark_mode, text_size).await,
    }
}

/// Print an error as a single styled line
pub fn report_error(err: &anyhow::Error) {
    let message = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<TaskrError>())
        .map(TaskrError::user_message)
        .unwrap_or_else(|| format!("{err:#}"));
    eprintln!("{} {}", style("error:").red().bold(), message);
}
