use anyhow::Result;
use cairn_core::checkpoint::{CheckpointPriority, SortField, SortOrder};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "cairn")]
#[command(about = "Cairn - session and checkpoint manager", long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.config/cairn/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create and inspect sessions
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
    /// Create, list, restore and delete checkpoints
    Checkpoint {
        #[command(subcommand)]
        action: CheckpointAction,
    },
    /// Restore a session and keep it saved until Ctrl-C
    Autosave {
        #[arg(long)]
        session: String,
        /// Overrides the configured interval
        #[arg(long)]
        interval_ms: Option<u64>,
    },
}

#[derive(Subcommand)]
enum SessionAction {
    /// Create a new session
    Create {
        #[arg(long)]
        user: String,
        #[arg(long)]
        workspace: String,
        #[arg(long)]
        name: String,
        /// JSON file with the initial workspace state
        #[arg(long)]
        state: Option<PathBuf>,
    },
    /// Restore a session and print it
    Show { id: String },
}

#[derive(Subcommand)]
enum CheckpointAction {
    /// List checkpoints of a session
    List {
        #[arg(long)]
        session: String,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        sort_by: Option<SortField>,
        #[arg(long)]
        order: Option<SortOrder>,
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Checkpoint the current workspace state of a session
    Create {
        #[arg(long)]
        session: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long, default_value = "medium")]
        priority: CheckpointPriority,
    },
    /// Restore a checkpoint into its session
    Restore {
        id: String,
        /// Checkpoint the current state before restoring
        #[arg(long)]
        backup: bool,
        #[arg(long, requires = "backup")]
        backup_name: Option<String>,
    },
    /// Delete a checkpoint
    Delete { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let ctx = commands::Context::load(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Session { action } => match action {
            SessionAction::Create {
                user,
                workspace,
                name,
                state,
            } => commands::session::create(&ctx, user, workspace, name, state.as_deref()).await?,
            SessionAction::Show { id } => commands::session::show(&ctx, &id).await?,
        },
        Commands::Checkpoint { action } => match action {
            CheckpointAction::List {
                session,
                limit,
                sort_by,
                order,
                tags,
                search,
            } => {
                let query = commands::checkpoint::ListQuery {
                    limit,
                    sort_by,
                    order,
                    tags,
                    search,
                };
                commands::checkpoint::list(&ctx, &session, query).await?
            }
            CheckpointAction::Create {
                session,
                name,
                description,
                tags,
                priority,
            } => {
                let mut options = cairn_core::checkpoint::CreateCheckpointOptions::default()
                    .with_tags(tags)
                    .with_priority(priority);
                if let Some(description) = description {
                    options = options.with_description(description);
                }
                commands::checkpoint::create(&ctx, &session, &name, options).await?
            }
            CheckpointAction::Restore {
                id,
                backup,
                backup_name,
            } => commands::checkpoint::restore(&ctx, &id, backup, backup_name).await?,
            CheckpointAction::Delete { id } => commands::checkpoint::delete(&ctx, &id).await?,
        },
        Commands::Autosave {
            session,
            interval_ms,
        } => commands::autosave::run(&ctx, &session, interval_ms).await?,
    }

    Ok(())
}
