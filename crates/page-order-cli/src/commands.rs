use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "page-order")]
#[command(about = "Order page images and renumber them into a clean sequence", long_about = None)]
pub struct Cli {
    /// Raise log verbosity for this tool (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check the numeric naming of a folder for gaps and duplicates
    Validate(ScanArgs),
    /// Print the content order of a folder without renaming
    Sort {
        #[command(flatten)]
        scan: ScanArgs,
        #[command(flatten)]
        oracle: OracleArgs,
    },
    /// Sort a folder and rename it into a zero-padded sequence
    Rename {
        #[command(flatten)]
        scan: ScanArgs,
        #[command(flatten)]
        oracle: OracleArgs,
        #[command(flatten)]
        rename: RenameArgs,
    },
    /// Copy a backup snapshot back into its parent folder
    Restore {
        backup_dir: PathBuf,
        /// Report what would be restored without copying
        #[arg(long)]
        dry_run: bool,
    },
    /// List backup snapshots in a folder, oldest first
    ListBackups { dir: PathBuf },
    /// Print configuration values
    PrintConfig,
}

impl Commands {
    /// Subcommand name as typed on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Validate(_) => "validate",
            Commands::Sort { .. } => "sort",
            Commands::Rename { .. } => "rename",
            Commands::Restore { .. } => "restore",
            Commands::ListBackups { .. } => "list-backups",
            Commands::PrintConfig => "print-config",
        }
    }
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Folder holding the page images
    pub dir: PathBuf,
    /// Include subfolders
    #[arg(long)]
    pub recursive: bool,
}

#[derive(Debug, Args)]
pub struct OracleArgs {
    /// Command run as `<cmd> <first> <second>`; stdout -1 / 0 / 1 decides the
    /// order. Without it, files are ordered by the number in their names.
    #[arg(long)]
    pub oracle_cmd: Option<String>,
    /// JSON file used to keep comparison results between runs
    #[arg(long)]
    pub cache_file: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct RenameArgs {
    #[arg(long)]
    pub prefix: Option<String>,
    #[arg(long)]
    pub digits: Option<usize>,
    #[arg(long)]
    pub start: Option<u64>,
    /// Write renamed files here instead of the source folder
    #[arg(long)]
    pub target_dir: Option<PathBuf>,
    #[arg(long)]
    pub no_backup: bool,
    #[arg(long)]
    pub dry_run: bool,
    /// Write the per-file rename log as JSON
    #[arg(long)]
    pub log_json: Option<PathBuf>,
}
