use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    /// Spreadsheet web-app endpoint.
    Sheet,
    /// Local SQLite database.
    Sqlite,
    /// Generated roster kept in memory.
    Demo,
}

#[derive(Debug, Parser)]
#[clap(name = "lucky-draw", version, about = "Lucky draw with a slot-machine reveal")]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Option<Command>,

    #[clap(flatten)]
    pub overrides: Overrides,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Interactive draw loop (default)
    Run,
    /// List the participants that can still win
    Pool,
    /// List stored results, newest first
    Results,
    /// Wipe every stored result
    Reset {
        /// Required; nothing is deleted without it
        #[clap(long)]
        yes: bool,
    },
    /// Load a JSON roster into the SQLite store
    Import { path: PathBuf },
}

/// Command-line values that take precedence over the environment.
#[derive(Debug, Default, Clone, Args)]
pub struct Overrides {
    #[clap(long, value_enum, global = true)]
    pub store: Option<StoreKind>,

    /// Web-app endpoint for the sheet store
    #[clap(long, global = true)]
    pub url: Option<String>,

    #[clap(long, global = true)]
    pub database_url: Option<String>,

    /// Roster size in demo mode
    #[clap(long, global = true)]
    pub demo_size: Option<usize>,

    /// Number of reels
    #[clap(long)]
    pub digits: Option<usize>,

    #[clap(long)]
    pub spin_ms: Option<u64>,

    #[clap(long)]
    pub stagger_ms: Option<u64>,

    #[clap(long)]
    pub prize_id: Option<String>,

    #[clap(long)]
    pub prize_name: Option<String>,

    /// Effects volume in 0.0..=1.0
    #[clap(long)]
    pub volume: Option<f32>,

    #[clap(long)]
    pub mute: bool,

    /// Seed the winner selection for a reproducible run
    #[clap(long)]
    pub seed: Option<u64>,
}
