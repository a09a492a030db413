//! CLI entry point for the kakomon tool.

use std::fs;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use kakomon_core::server;
use kakomon_core::{
    AppConfig, Fetcher, Query, QueryRange, Response, SeasonRange, SharedRng, SourceConfig,
    UrlGenerator, deadline_token, load_config, parse_html,
};
use tracing::{debug, info};

mod cli;

use cli::{Args, Command, QuestionArgs, RangeArgs};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // Logs go to stderr so JSON on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let rng = SharedRng::from_entropy();

    match args.command {
        Command::Parse { file } => {
            let html = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let response = parse_html(&html)
                .with_context(|| format!("Failed to parse {}", file.display()))?;
            print_json(&response)
        }
        Command::Serve => {
            let config = load_config(args.config.as_deref())?.config;
            info!("kakomon starting");
            server::serve(&config, rng).await
        }
        Command::Get { source, question } => {
            let config = load_config(args.config.as_deref())?.config;
            let entry = find_source(&config, &source)?;
            let query = query_from_args(&question)?;
            let fetcher = fetcher_for(entry, rng)?;
            let token = deadline_token(entry.wait());
            let response = fetcher.get(&query, &token).await?;
            print_json(&response)
        }
        Command::Random { source, range } => {
            let config = load_config(args.config.as_deref())?.config;
            let entry = find_source(&config, &source)?;
            let range = range_from_args(entry, &range)?;
            let fetcher = fetcher_for(entry, rng)?;
            let token = deadline_token(entry.wait());
            let response = fetcher.get_random(&range, &token).await?;
            print_json(&response)
        }
        Command::Url {
            source,
            random,
            year,
            season,
            no,
            range,
        } => {
            let config = load_config(args.config.as_deref())?.config;
            let entry = find_source(&config, &source)?;
            let urls = UrlGenerator::new(entry.source(), rng)?;
            let url = if random {
                urls.random(&range_from_args(entry, &range)?)?
            } else {
                let (Some(year), Some(season), Some(no)) = (year, season, no) else {
                    bail!("`url` needs --year, --season and --no, or --random");
                };
                let question = QuestionArgs { year, season, no };
                urls.generate(&query_from_args(&question)?)?
            };
            println!("{url}");
            Ok(())
        }
    }
}

fn find_source<'a>(config: &'a AppConfig, name: &str) -> Result<&'a SourceConfig> {
    config.source_named(name).ok_or_else(|| {
        anyhow!(
            "Unknown source `{name}`. Configured sources: {}",
            config.source_names()
        )
    })
}

fn fetcher_for(entry: &SourceConfig, rng: SharedRng) -> Result<Fetcher> {
    Fetcher::with_charset(entry.source(), entry.interval(), rng, &entry.charset)
        .with_context(|| format!("Failed to set up source `{}`", entry.name))
}

fn query_from_args(args: &QuestionArgs) -> Result<Query> {
    let season = args.season.parse()?;
    Ok(Query::new(args.year, season, args.no))
}

fn range_from_args(entry: &SourceConfig, args: &RangeArgs) -> Result<QueryRange> {
    if args.is_empty() {
        return Ok(QueryRange::SOURCE_MAX);
    }
    let base = entry.range;
    let season = match &args.season_range {
        Some(code) => code.parse::<SeasonRange>()?,
        None => base.season,
    };
    Ok(QueryRange::new(
        args.min_year.unwrap_or(base.min_year),
        args.max_year.unwrap_or(base.max_year),
        args.min_no.unwrap_or(base.min_no),
        args.max_no.unwrap_or(base.max_no),
        season,
    ))
}

fn print_json(response: &Response) -> Result<()> {
    let json = serde_json::to_string_pretty(response).context("Failed to encode response")?;
    println!("{json}");
    Ok(())
}
