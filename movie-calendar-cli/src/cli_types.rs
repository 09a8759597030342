//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "movie-calendar")]
#[command(about = "Track theatrical release schedules enriched with TMDb metadata", long_about = None)]
pub(crate) struct Cli {
    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Movie database file (defaults to the config file entry, then the user data dir)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Arguments shared by commands that run the reconciliation engine.
#[derive(Args, Clone)]
pub(crate) struct RunArgs {
    /// TMDb API key (overrides TMDB_APIKEY and the config file)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Scrape, enrich and reconcile release schedules
    Scrape {
        /// Years to reconcile (e.g., 2024,2025). Defaults to last, this and next year
        #[arg(short, long, value_delimiter = ',')]
        years: Option<Vec<i32>>,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Populate an empty database with the default year window
    Seed {
        #[command(flatten)]
        run: RunArgs,
    },

    /// List stored movies for a year, or per-year totals without --year
    List {
        /// Release year to list
        #[arg(short, long)]
        year: Option<i32>,
    },

    /// Show every stored field of one movie
    Show {
        /// Movie identity (e.g., dunepartwo_2024-03-01)
        id: String,
    },

    /// Search stored movies
    Search(SearchArgs),

    /// Manage TMDb and storage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args, Clone)]
pub(crate) struct SearchArgs {
    /// Partial title match
    pub query: Option<String>,

    /// Genre name
    #[arg(short, long)]
    pub genre: Option<String>,

    /// Director name
    #[arg(short, long)]
    pub director: Option<String>,

    /// Cast member name
    #[arg(short, long)]
    pub cast: Option<String>,

    /// Content rating (e.g., PG-13)
    #[arg(short, long)]
    pub rating: Option<String>,

    /// Release year
    #[arg(short, long)]
    pub year: Option<i32>,

    /// Release month (1-12)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,

    /// Exact IMDb id (e.g., tt1234567)
    #[arg(long)]
    pub imdb: Option<String>,

    /// Maximum number of results
    #[arg(short, long)]
    pub limit: Option<usize>,
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show current settings and where each comes from
    Show,

    /// Save a TMDb API key to the config file
    SetKey {
        /// The API read access token
        key: String,
    },

    /// Print the config file path
    Path,
}
