//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

/// Fetch and parse past exam questions.
///
/// Kakomon reads question pages from public exam archives at a polite pace
/// and prints them as JSON, or serves them over HTTP.
#[derive(Parser, Debug)]
#[command(name = "kakomon")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (default: $XDG_CONFIG_HOME/kakomon/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve every configured source over HTTP
    Serve,

    /// Fetch one question
    Get {
        /// Source name from the config (e.g. fe, ap)
        #[arg(short, long)]
        source: String,

        #[command(flatten)]
        question: QuestionArgs,
    },

    /// Fetch a random question
    Random {
        /// Source name from the config (e.g. fe, ap)
        #[arg(short, long)]
        source: String,

        #[command(flatten)]
        range: RangeArgs,
    },

    /// Print a question URL without fetching it
    Url {
        /// Source name from the config (e.g. fe, ap)
        #[arg(short, long)]
        source: String,

        /// Pick a random question instead of a fixed one
        #[arg(long, conflicts_with_all = ["year", "season", "no"])]
        random: bool,

        #[arg(long)]
        year: Option<u32>,

        /// Season code: haru or aki
        #[arg(long)]
        season: Option<String>,

        #[arg(long)]
        no: Option<u32>,

        #[command(flatten)]
        range: RangeArgs,
    },

    /// Parse a saved question page (UTF-8 HTML)
    Parse {
        /// Path to the HTML file
        file: PathBuf,
    },
}

/// One question's coordinates.
#[derive(ClapArgs, Debug)]
pub struct QuestionArgs {
    /// Exam year as used in archive URLs (e.g. 29)
    #[arg(long)]
    pub year: u32,

    /// Season code: haru or aki
    #[arg(long)]
    pub season: String,

    /// Question number
    #[arg(long)]
    pub no: u32,
}

/// Optional bounds for random selection; unset bounds use the source's.
#[derive(ClapArgs, Debug, Default)]
pub struct RangeArgs {
    #[arg(long)]
    pub min_year: Option<u32>,

    #[arg(long)]
    pub max_year: Option<u32>,

    #[arg(long)]
    pub min_no: Option<u32>,

    #[arg(long)]
    pub max_no: Option<u32>,

    /// Season constraint: haru, aki or all
    #[arg(long)]
    pub season_range: Option<String>,
}

impl RangeArgs {
    /// Whether no bound was given.
    pub fn is_empty(&self) -> bool {
        self.min_year.is_none()
            && self.max_year.is_none()
            && self.min_no.is_none()
            && self.max_no.is_none()
            && self.season_range.is_none()
    }
}
