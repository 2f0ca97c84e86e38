use clap::{Parser, Subcommand, ValueEnum};
use shoebox::model::UploadState;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "shoebox", bin_name = "shoebox", version)]
#[command(about = "Local-first photo catalog with background upload", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output (debug logs on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Copy an image into the shoebox
    #[command(alias = "a")]
    Add {
        /// Image file to add
        path: PathBuf,

        /// Name to store it under (defaults to the file name)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// List assets, newest first
    #[command(alias = "ls")]
    List {
        /// Only show assets in this state
        #[arg(short, long, value_enum)]
        state: Option<StateFilter>,
    },

    /// Upload assets (pending or failed ones are sent, others are skipped)
    #[command(alias = "up")]
    Upload {
        /// Indexes of the assets (e.g. 1 3 2-4)
        #[arg(required_unless_present = "all", num_args = 1..)]
        indexes: Vec<String>,

        /// Upload every pending or failed asset
        #[arg(long, conflicts_with = "indexes")]
        all: bool,
    },

    /// Delete assets and their files
    #[command(alias = "rm")]
    Delete {
        /// Indexes of the assets (e.g. 1 3 2-4)
        #[arg(required = true, num_args = 1..)]
        indexes: Vec<String>,
    },

    /// Print the file path of one or more assets
    Path {
        /// Indexes of the assets (e.g. 1 3 2-4)
        #[arg(required = true, num_args = 1..)]
        indexes: Vec<String>,
    },

    /// Get or set configuration
    Config {
        /// Configuration key (e.g., endpoint, api-token, file-ext)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },

    /// Report catalog entries without files and files without entries
    Doctor,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StateFilter {
    Pending,
    Uploading,
    Uploaded,
    Failed,
}

impl From<StateFilter> for UploadState {
    fn from(filter: StateFilter) -> Self {
        match filter {
            StateFilter::Pending => UploadState::Pending,
            StateFilter::Uploading => UploadState::InFlight,
            StateFilter::Uploaded => UploadState::Uploaded,
            StateFilter::Failed => UploadState::Failed,
        }
    }
}

/// Logs go to stderr. `RUST_LOG` wins over `--verbose`.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
