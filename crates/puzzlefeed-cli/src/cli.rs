//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use puzzlefeed::Category;

#[derive(Parser)]
#[command(name = "puzzlefeed")]
#[command(version, about = "Browse chess puzzle feeds")]
pub struct Cli {
    #[command(flatten)]
    pub backend: BackendArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Where puzzles and preferences come from
#[derive(Args, Debug, Default)]
pub struct BackendArgs {
    /// Read puzzles from a JSON array file instead of the hosted backend
    #[arg(long, global = true)]
    pub fixture: Option<PathBuf>,

    /// Base URL of the PostgREST backend
    #[arg(long, env = "PUZZLEFEED_ENDPOINT", global = true)]
    pub endpoint: Option<String>,

    /// API key sent as `apikey` and bearer token
    #[arg(long, env = "PUZZLEFEED_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Preferences file (default: <config dir>/puzzlefeed/preferences.json)
    #[arg(long, global = true)]
    pub prefs: Option<PathBuf>,

    /// Config file (default: <config dir>/puzzlefeed/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fetch a single page of puzzles
    Fetch(FetchArgs),
    /// Page through a feed the way the app does
    Browse(BrowseArgs),
    /// Inspect or edit stored preferences
    #[command(subcommand)]
    Prefs(PrefsCommand),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CategoryArg {
    Trending,
    Practice,
    Other,
}

impl From<CategoryArg> for Category {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Trending => Category::Trending,
            CategoryArg::Practice => Category::Practice,
            CategoryArg::Other => Category::Other,
        }
    }
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    #[arg(short, long, value_enum, default_value = "trending")]
    pub category: CategoryArg,

    #[arg(short, long, default_value_t = 10)]
    pub limit: usize,

    /// First id of the window; omit to query the whole table
    #[arg(short, long)]
    pub start: Option<i64>,

    #[arg(long)]
    pub bucket_size: Option<i64>,

    #[arg(long)]
    pub max_hops: Option<u32>,

    /// Retry over the whole table when the window is empty
    #[arg(long)]
    pub fallback: bool,

    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct BrowseArgs {
    #[arg(short, long, value_enum, default_value = "trending")]
    pub category: CategoryArg,

    /// Number of puzzles to view
    #[arg(short = 'n', long, default_value_t = 25)]
    pub steps: usize,

    /// Pause between puzzles
    #[arg(long, default_value_t = 0)]
    pub delay_ms: u64,

    /// Draw each board
    #[arg(long)]
    pub board: bool,

    #[arg(long)]
    pub dark: bool,

    /// Dark-square color, e.g. #4b7399
    #[arg(long, requires = "secondary")]
    pub primary: Option<String>,

    /// Light-square color, e.g. #eae9d2
    #[arg(long, requires = "primary")]
    pub secondary: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum PrefsCommand {
    /// Print the stored record as JSON
    Show,
    /// Set the tactics rating used by the practice feed
    SetRating { rating: i64 },
    /// Set the stored bucket start of a feed
    SetBucket {
        #[arg(value_enum)]
        category: CategoryArg,
        start: i64,
    },
    /// Clear all stored preferences
    Reset,
}
