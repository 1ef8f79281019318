use std::path::PathBuf;

use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use takeit_core::ConflictStrategy;

#[derive(Parser)]
#[command(name = "takeit")]
#[command(about = "Notes with local backups and schema-tolerant backup merge")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Data directory holding notes.db and database_backups/
    #[arg(long, global = true, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new note
    #[command(alias = "new")]
    Add {
        /// Note content
        content: Vec<String>,
        /// Tag to attach (repeatable)
        #[arg(short, long = "tag", value_name = "NAME")]
        tags: Vec<String>,
    },
    /// List notes, newest first
    List {
        /// Only notes carrying this tag
        #[arg(long, value_name = "NAME")]
        tag: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Move a note to the recycle bin
    Delete {
        /// Note ID
        id: String,
    },
    /// Manage tags
    Tag {
        #[command(subcommand)]
        command: TagCommands,
    },
    /// Manage the recycle bin
    Trash {
        #[command(subcommand)]
        command: TrashCommands,
    },
    /// Manage backup snapshots
    Backup {
        #[command(subcommand)]
        command: BackupCommands,
    },
    /// Replace the live store with a backup (a safety backup is taken first)
    Restore {
        /// Backup file name
        name: String,
    },
    /// Merge a backup into the live store (a safety backup is taken first)
    Merge {
        /// Backup file name
        name: String,
        /// How to resolve notes and tags present on both sides
        #[arg(long, value_enum, default_value_t = StrategyArg::KeepNewer)]
        strategy: StrategyArg,
    },
    /// Export raw bytes of a backup or of the live store
    #[command(group(ArgGroup::new("source").required(true).args(["name", "live"])))]
    Export {
        /// Backup file name
        name: Option<String>,
        /// Export the live store instead of a backup
        #[arg(long)]
        live: bool,
        /// Output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Upgrade the live store to the current schema version
    Upgrade,
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
        /// Directory to write `takeit.<ext>` into (stdout when omitted)
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum TagCommands {
    /// List tags with their colors
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change the color of a tag
    Color {
        /// Tag name
        name: String,
        /// Hex color, e.g. #4CAF50
        color: String,
    },
}

#[derive(Subcommand)]
pub enum TrashCommands {
    /// List notes in the recycle bin
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Move a note out of the recycle bin
    Restore {
        /// Note ID
        id: String,
    },
    /// Permanently remove notes deleted longer ago than the retention window
    Purge {
        /// Retention window in days (defaults to the configured value)
        #[arg(long, value_name = "DAYS")]
        retention_days: Option<u32>,
    },
}

#[derive(Subcommand)]
pub enum BackupCommands {
    /// Snapshot the live store
    Create {
        /// Mark the snapshot as an automatic backup
        #[arg(long)]
        auto: bool,
    },
    /// List snapshots, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete one snapshot
    Delete {
        /// Backup file name
        name: String,
    },
    /// Delete every snapshot
    Clear,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum StrategyArg {
    KeepCurrent,
    KeepBackup,
    KeepNewer,
}

impl From<StrategyArg> for ConflictStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::KeepCurrent => Self::KeepCurrent,
            StrategyArg::KeepBackup => Self::KeepBackup,
            StrategyArg::KeepNewer => Self::KeepNewer,
        }
    }
}
