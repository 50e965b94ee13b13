use crate::domain::storage::StorageKeys;
use crate::infrastructure::{TablePolicy, DEFAULT_FEED_URL};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// WordPress posts endpoint listing the tournament rounds
    #[arg(long, env = "ARKADISTI_FEED_URL", default_value = DEFAULT_FEED_URL)]
    pub feed_url: String,

    /// Path of the local result store
    #[arg(long, env = "ARKADISTI_STORE", default_value = StorageKeys::STORE_FILE)]
    pub store_file: PathBuf,

    /// Path of the settings file (created with defaults when missing)
    #[arg(long, default_value = "settings.json")]
    pub settings_file: PathBuf,

    /// Timeout for every HTTP request, in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Which table to keep when several match the same ROM in one post
    #[arg(long, value_enum, default_value_t = TablePolicy::FirstMatch)]
    pub table_policy: TablePolicy,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,

    /// Hide the refresh progress bar
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scrape every tournament round and replace the local store
    Refresh,
    /// Show the newest tournament round and its ROMs
    Newest,
    /// List the ROMs of the games index
    Games,
    /// Print the stored results of one ROM
    Results {
        /// ROM name as listed by `games`
        rom: String,
    },
    /// Add the newest round's tables to the store, keeping older ones
    MergeNewest,
    /// Download a replay bundle and unpack its recording into the input directory
    FetchReplay {
        url: String,
        /// Destination `.inp`, defaults to `<bundle stem>.inp` inside `inp_dir`
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Zip a recording from the input directory for submission
    Package {
        /// Recording file name inside `inp_dir`
        inp: PathBuf,
        /// Screenshot copied next to the archive under the recording's stem
        #[arg(long)]
        screenshot: Option<PathBuf>,
    },
    /// Print the effective settings
    Settings,
}
