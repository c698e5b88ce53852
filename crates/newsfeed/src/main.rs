mod cli;

use std::io;
use std::path::{Path, PathBuf};

use clap::Parser;
use cli::{DbCmd, DevCmd, FeedCmd, ImportOpts, Opts, OptsCmd};
use newsfeed::distance::{DistanceError, distance};
use newsfeed::feed::FeedError;
use newsfeed::prompt::{PromptError, Prompter};
use newsfeed::publisher::PublisherError;
use newsfeed::{FeedFile, PublishOutcome, Publisher, RecordOutcome};
use newsfeed_core::RecordKind;
use newsfeed_core::parse::{self, Decoded, ParseError};
use newsfeed_db::{Database, DbError, RowFields, StoredRow};
use newsfeed_exercises::feed_stats::{FeedStats, StatsError};
use newsfeed_exercises::{dicts, numbers, text};
use newsfeed_util_error::FmtCompact as _;
use rand::SeedableRng as _;
use rand::rngs::StdRng;
use snafu::{FromString, ResultExt, Snafu, Whatever};
use time::OffsetDateTime;
use tracing::level_filters::LevelFilter;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub const LOG_TARGET: &str = "newsfeed::cli";

type WhateverResult<T> = std::result::Result<T, snafu::Whatever>;

#[derive(Debug, Snafu)]
pub enum CliError {
    #[snafu(display("Miscellaneous error: {source}"))]
    Whatever { source: Whatever },
    #[snafu(display("Data dir error: {source:?}"))]
    DataDir { source: io::Error },
    #[snafu(display("Database error: {source}"))]
    Database { source: DbError },
    #[snafu(display("Input error: {source}"))]
    Parse { source: ParseError },
    #[snafu(transparent)]
    Publish { source: PublisherError },
    #[snafu(display("Feed error: {source}"))]
    Feed { source: FeedError },
    #[snafu(transparent)]
    Prompt { source: PromptError },
    #[snafu(transparent)]
    Distance { source: DistanceError },
    #[snafu(display("Statistics error: {source}"))]
    Stats { source: StatsError },
    #[snafu(display("Failed to read {}", path.display()))]
    ReadInput { source: io::Error, path: PathBuf },
    #[snafu(display("Failed to remove processed file {}", path.display()))]
    RemoveProcessed { source: io::Error, path: PathBuf },
    #[snafu(display("Refusing to clear the database without --yes"))]
    ClearNotConfirmed,
}

pub type CliResult<T> = std::result::Result<T, CliError>;

#[snafu::report]
fn main() -> CliResult<()> {
    init_logging().context(WhateverSnafu)?;

    let opts = Opts::parse();
    handle_cmd(opts)
}

fn handle_cmd(opts: Opts) -> CliResult<()> {
    match opts.cmd {
        OptsCmd::Add { kind, no_persist } => {
            let publisher = open_publisher(&opts.global)?;
            let mut prompter = Prompter::stdio();
            let today = OffsetDateTime::now_utc().date();
            let record = prompter.record(kind.into(), today, &mut rand::rng())?;

            match publisher.publish(&record, !no_persist)? {
                PublishOutcome::Published => println!("Record published."),
                PublishOutcome::Skipped => {
                    println!("Identical {} record already published, skipped.", record.kind())
                }
            }
        }
        OptsCmd::ImportJson(import) => {
            let decoded = parse::json::decode_file(&import.path).context(ParseSnafu)?;
            handle_import(&opts.global, &import, decoded)?;
        }
        OptsCmd::ImportXml(import) => {
            let decoded = parse::xml::decode_file(&import.path).context(ParseSnafu)?;
            handle_import(&opts.global, &import, decoded)?;
        }
        OptsCmd::Db(cmd) => {
            let db = open_db(&opts.global)?;
            match cmd {
                DbCmd::Info => println!("{}", db.info().context(DatabaseSnafu)?),
                DbCmd::Counts => {
                    let counts = db.counts().context(DatabaseSnafu)?;
                    for kind in RecordKind::ALL {
                        println!("{kind}: {}", counts.get(kind));
                    }
                    println!("Total: {}", counts.total());
                }
                DbCmd::Recent { kind, limit } => {
                    let kind = RecordKind::from(kind);
                    let rows = db.recent(kind, limit).context(DatabaseSnafu)?;
                    if rows.is_empty() {
                        println!("No {kind} records stored.");
                    }
                    for row in &rows {
                        println!("{}", describe_row(row));
                    }
                }
                DbCmd::Clear { yes } => {
                    if !yes {
                        return Err(CliError::ClearNotConfirmed);
                    }
                    let removed = db.clear_all().context(DatabaseSnafu)?;
                    println!("Removed {removed} records.");
                }
            }
        }
        OptsCmd::Feed(cmd) => {
            let feed = FeedFile::new(opts.global.feed_file());
            match cmd {
                FeedCmd::Show => print!("{}", feed.read().context(FeedSnafu)?),
                FeedCmd::Clear => {
                    let question =
                        format!("Clear the feed file {}? (y/N): ", feed.path().display());
                    if Prompter::stdio().confirm(&question, false)? {
                        feed.clear().context(FeedSnafu)?;
                        println!("Feed cleared.");
                    }
                }
            }
        }
        OptsCmd::Stats { out_dir } => {
            let feed = FeedFile::new(opts.global.feed_file());
            let stats = FeedStats::from_feed(&feed.read().context(FeedSnafu)?);
            if stats.is_empty() {
                println!("Feed is empty, nothing to count.");
                return Ok(());
            }
            let out_dir = out_dir.unwrap_or_else(|| opts.global.data_dir().to_owned());
            std::fs::create_dir_all(&out_dir).context(DataDirSnafu)?;
            let (words, letters) = stats.write_reports(&out_dir).context(StatsSnafu)?;
            println!("{}", words.display());
            println!("{}", letters.display());
        }
        OptsCmd::Distance { from, to } => {
            let db = open_db(&opts.global)?;
            let report = distance(&db, &from, &to, &mut Prompter::stdio())?;
            println!("{report}");
        }
        OptsCmd::Cities => {
            let db = open_db(&opts.global)?;
            db.seed_default_cities().context(DatabaseSnafu)?;
            for city in db.list_cities().context(DatabaseSnafu)? {
                match city.country {
                    Some(country) => println!("{}, {country} {}", city.name, city.coordinates),
                    None => println!("{} {}", city.name, city.coordinates),
                }
            }
            let stats = db.city_stats().context(DatabaseSnafu)?;
            println!("{} cities in {} countries", stats.cities, stats.countries);
        }
        OptsCmd::Dev(cmd) => handle_dev_cmd(cmd)?,
    }

    Ok(())
}

fn handle_import(
    global: &cli::GlobalOpts,
    import: &ImportOpts,
    decoded: Decoded,
) -> CliResult<()> {
    let persist = !import.no_persist;
    let publisher = open_publisher(global)?;
    let report = publisher.publish_decoded(decoded, persist);

    for (idx, outcome) in report.outcomes.iter().enumerate() {
        match outcome {
            RecordOutcome::Published => println!("Record {idx}: published"),
            RecordOutcome::Skipped => println!("Record {idx}: duplicate, skipped"),
            RecordOutcome::Failed(err) => println!("Record {idx}: failed: {}", err.fmt_compact()),
        }
    }
    println!("{report}");

    if import.remove_processed {
        let path = &import.path;
        if report.source_consumed() {
            std::fs::remove_file(path).context(RemoveProcessedSnafu { path: path.clone() })?;
            info!(target: LOG_TARGET, path = %path.display(), "Removed processed file");
        } else {
            warn!(target: LOG_TARGET, path = %path.display(), "Nothing processed, keeping file");
        }
    }
    Ok(())
}

fn handle_dev_cmd(cmd: DevCmd) -> CliResult<()> {
    match cmd {
        DevCmd::Text { file } => {
            let original = match file {
                Some(path) => std::fs::read_to_string(&path).context(ReadInputSnafu { path })?,
                None => text::HOMEWORK_TEXT.to_owned(),
            };
            let report = text::process(&original);
            println!("{}", report.text);
            println!();
            println!("Whitespace in the original text:\n{}", report.original_whitespace);
            println!();
            println!("Whitespace in the processed text:\n{}", report.whitespace);
        }
        DevCmd::Numbers { seed, count } => {
            let mut rng = rng_from(seed);
            let numbers = numbers::random_numbers(&mut rng, count, numbers::DEFAULT_RANGE);
            println!("{}", numbers::NumbersReport::new(numbers));
        }
        DevCmd::Dicts { seed } => {
            let mut rng = rng_from(seed);
            let dicts = dicts::random_dicts(&mut rng);
            for (idx, dict) in dicts.iter().enumerate() {
                println!("Dict {}: {dict:?}", idx + 1);
            }
            println!("Merged: {:?}", dicts::merge(&dicts));
        }
    }
    Ok(())
}

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

fn open_db(global: &cli::GlobalOpts) -> CliResult<Database> {
    let db_path = match &global.db_file {
        Some(path) => {
            create_parent_dir(path)?;
            path.clone()
        }
        None => Database::mk_db_path(global.data_dir()).context(DataDirSnafu)?,
    };
    Database::open(db_path).context(DatabaseSnafu)
}

fn open_publisher(global: &cli::GlobalOpts) -> CliResult<Publisher> {
    Ok(Publisher::new(
        open_db(global)?,
        FeedFile::new(global.feed_file()),
    ))
}

fn create_parent_dir(path: &Path) -> CliResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).context(DataDirSnafu)?;
    }
    Ok(())
}

fn describe_row(row: &StoredRow) -> String {
    let body = match &row.fields {
        RowFields::News { text, city } => format!("{text} ({city})"),
        RowFields::PrivateAd {
            text,
            expiration_date,
            days_left,
        } => format!("{text} (until {expiration_date}, {days_left} days left when stored)"),
        RowFields::WeatherAlert {
            text,
            severity,
            location,
            alert_id,
        } => format!("{alert_id} {severity}: {text} ({location})"),
    };
    format!("#{} [{}] {body}", row.id, row.inserted_at)
}

pub fn init_logging() -> WhateverResult<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .try_init()
        .map_err(|_| Whatever::without_source("Failed to initialize logging".to_string()))?;

    Ok(())
}
