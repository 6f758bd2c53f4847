//! AmberDay CLI - Command-line interface for the AmberDay file-reference manager.

use amber_core::{AmberError, ErrorKind};
use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "amber")]
#[command(about = "Organize references to your files with folders, tags and backups", long_about = None)]
#[command(version)]
struct Cli {
    /// Library directory (default: $AMBER_HOME or the platform data directory)
    #[arg(long, global = true)]
    library: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new library
    Init,
    /// Manage virtual folders
    Folder {
        #[command(subcommand)]
        command: FolderCommands,
    },
    /// Manage anchors (tracked files)
    Anchor {
        #[command(subcommand)]
        command: AnchorCommands,
    },
    /// Inspect or empty the recycle bin
    Recycle {
        #[command(subcommand)]
        command: RecycleCommands,
    },
    /// Query and delete tags
    Tag {
        #[command(subcommand)]
        command: TagCommands,
    },
    /// Back up and restore anchor files
    Backup {
        #[command(subcommand)]
        command: BackupCommands,
    },
    /// Show or change settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
    /// Show the operation log
    Log {
        /// Maximum number of entries to show
        #[arg(short, long)]
        limit: Option<usize>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum FolderCommands {
    /// List folders
    List {
        /// Case-insensitive name filter
        #[arg(short, long)]
        keyword: Option<String>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Create a folder
    Create {
        /// Folder name
        name: String,
        /// Optional description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Rename or re-describe a folder
    Update {
        /// Folder ID
        id: u64,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New description (empty clears it)
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete a folder (anchors keep their other folders)
    Delete {
        /// Folder ID
        id: u64,
    },
    /// List the anchors in a folder
    Anchors {
        /// Folder ID
        id: u64,
        /// Only anchors carrying all of these tags (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        tags: Vec<String>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Re-check that the files of a folder's anchors still exist
    Check {
        /// Folder ID
        id: u64,
    },
}

#[derive(Subcommand)]
enum AnchorCommands {
    /// Track a file
    Add {
        /// Display name
        name: String,
        /// Path to the file (`~` is expanded when used)
        path: String,
        /// Folder to put the anchor in
        #[arg(short, long)]
        folder: u64,
        /// Optional description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Show an anchor with its folders, tags and backups
    Show {
        /// Anchor ID
        id: u64,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Rename an anchor
    Rename {
        /// Anchor ID
        id: u64,
        /// New name
        name: String,
    },
    /// Change an anchor's description (empty clears it)
    Describe {
        /// Anchor ID
        id: u64,
        /// Description text
        text: String,
    },
    /// Add an anchor to more folders
    Bind {
        /// Anchor ID
        id: u64,
        /// Folder IDs
        #[arg(required = true)]
        folders: Vec<u64>,
    },
    /// Tag an anchor
    Tag {
        /// Anchor ID
        id: u64,
        /// Tag names
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Remove a tag from an anchor
    Untag {
        /// Anchor ID
        id: u64,
        /// Tag ID
        tag: u64,
    },
    /// Move an anchor to the recycle bin
    Delete {
        /// Anchor ID
        id: u64,
    },
    /// Restore an anchor from the recycle bin
    Restore {
        /// Anchor ID
        id: u64,
        /// Folder to restore into
        #[arg(short, long)]
        folder: u64,
    },
}

#[derive(Subcommand)]
enum RecycleCommands {
    /// List recycled anchors
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Permanently delete every recycled anchor
    Empty {
        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum TagCommands {
    /// List tags
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// List tags, most used first
    Popular {
        /// Maximum number of tags to show
        #[arg(short, long)]
        limit: Option<usize>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Delete a tag from every anchor
    Delete {
        /// Tag ID
        id: u64,
    },
    /// Find anchors in a folder carrying all the given tags
    Find {
        /// Folder ID (defaults to every active anchor)
        #[arg(short, long)]
        folder: Option<u64>,
        /// Tag names
        #[arg(required = true)]
        names: Vec<String>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum BackupCommands {
    /// Copy an anchor's file into the backup directory
    Create {
        /// Anchor ID
        anchor: u64,
    },
    /// List backups, newest first
    List {
        /// Only backups of this anchor
        #[arg(short, long)]
        anchor: Option<u64>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Copy a backup back to its anchor's path
    Restore {
        /// Backup ID
        id: u64,
    },
    /// Delete a backup record and its file
    Delete {
        /// Backup ID
        id: u64,
    },
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Show current settings
    Show,
    /// Set the backup directory (must exist)
    BackupPath {
        /// Directory path
        path: String,
    },
    /// Reopen the last viewed folder on startup
    OpenLastFolder {
        /// true or false
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
}

fn main() {
    // Initialize tracing subscriber
    // Respects RUST_LOG environment variable (e.g., RUST_LOG=debug)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        std::process::exit(report(&err));
    }
}

fn run(cli: Cli) -> Result<()> {
    let dir = cli.library.unwrap_or_else(amber_core::default_library_dir);

    match cli.command {
        Commands::Init => commands::init::run(&dir),
        Commands::Folder { command } => match command {
            FolderCommands::List { keyword, json } => {
                commands::folder::list(&dir, keyword.as_deref(), json)
            }
            FolderCommands::Create { name, description } => {
                commands::folder::create(&dir, &name, description.as_deref())
            }
            FolderCommands::Update {
                id,
                name,
                description,
            } => commands::folder::update(&dir, id, name.as_deref(), description.as_deref()),
            FolderCommands::Delete { id } => commands::folder::delete(&dir, id),
            FolderCommands::Anchors { id, tags, json } => {
                commands::folder::anchors(&dir, id, &tags, json)
            }
            FolderCommands::Check { id } => commands::folder::check(&dir, id),
        },
        Commands::Anchor { command } => match command {
            AnchorCommands::Add {
                name,
                path,
                folder,
                description,
            } => commands::anchor::add(&dir, &name, &path, folder, description.as_deref()),
            AnchorCommands::Show { id, json } => commands::anchor::show(&dir, id, json),
            AnchorCommands::Rename { id, name } => commands::anchor::rename(&dir, id, &name),
            AnchorCommands::Describe { id, text } => commands::anchor::describe(&dir, id, &text),
            AnchorCommands::Bind { id, folders } => commands::anchor::bind(&dir, id, &folders),
            AnchorCommands::Tag { id, names } => commands::anchor::tag(&dir, id, &names),
            AnchorCommands::Untag { id, tag } => commands::anchor::untag(&dir, id, tag),
            AnchorCommands::Delete { id } => commands::anchor::delete(&dir, id),
            AnchorCommands::Restore { id, folder } => commands::anchor::restore(&dir, id, folder),
        },
        Commands::Recycle { command } => match command {
            RecycleCommands::List { json } => commands::recycle::list(&dir, json),
            RecycleCommands::Empty { yes } => commands::recycle::empty(&dir, yes),
        },
        Commands::Tag { command } => match command {
            TagCommands::List { json } => commands::tag::list(&dir, json),
            TagCommands::Popular { limit, json } => commands::tag::popular(&dir, limit, json),
            TagCommands::Delete { id } => commands::tag::delete(&dir, id),
            TagCommands::Find {
                folder,
                names,
                json,
            } => commands::tag::find(&dir, folder, &names, json),
        },
        Commands::Backup { command } => match command {
            BackupCommands::Create { anchor } => commands::backup::create(&dir, anchor),
            BackupCommands::List { anchor, json } => commands::backup::list(&dir, anchor, json),
            BackupCommands::Restore { id } => commands::backup::restore(&dir, id),
            BackupCommands::Delete { id } => commands::backup::delete(&dir, id),
        },
        Commands::Settings { command } => match command {
            SettingsCommands::Show => commands::settings::show(&dir),
            SettingsCommands::BackupPath { path } => commands::settings::backup_path(&dir, &path),
            SettingsCommands::OpenLastFolder { enabled } => {
                commands::settings::open_last_folder(&dir, enabled)
            }
        },
        Commands::Log { limit, json } => commands::log::run(&dir, limit, json),
    }
}

/// Prints an error with its recovery hint and returns the exit code.
fn report(err: &anyhow::Error) -> i32 {
    eprintln!("{} {:#}", style("error:").red().bold(), err);

    let Some(amber) = err.downcast_ref::<AmberError>() else {
        return 1;
    };
    if let Some(hint) = amber.recovery_suggestion() {
        eprintln!("  {} {}", style("hint:").cyan(), hint);
    }
    match amber.kind() {
        ErrorKind::Internal => 1,
        ErrorKind::NotFound => 2,
        ErrorKind::InvalidArgument => 3,
        ErrorKind::Conflict => 4,
    }
}
