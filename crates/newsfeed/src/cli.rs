use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use clap::{Args, Parser, Subcommand, ValueEnum};
use newsfeed::feed::FEED_FILE_NAME;
use newsfeed_core::RecordKind;

/// Command line options for the newsfeed tool
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Opts {
    /// Global options that apply to all commands
    #[command(flatten)]
    pub global: GlobalOpts,

    /// The specific command to execute
    #[command(subcommand)]
    pub cmd: OptsCmd,
}

/// Global options that apply across all commands
#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Directory holding the database and the feed file
    #[arg(env = "NEWSFEED_DATA_DIR", long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Feed file to append published records to
    #[arg(env = "NEWSFEED_FEED_FILE", long, global = true)]
    pub feed_file: Option<PathBuf>,

    /// Database file (defaults to `newsfeed.redb` in the data dir)
    #[arg(env = "NEWSFEED_DB_FILE", long, global = true)]
    pub db_file: Option<PathBuf>,
}

static PROJECTS_DIR: LazyLock<directories::ProjectDirs> = LazyLock::new(|| {
    directories::ProjectDirs::from("org", "Newsfeed", "newsfeed")
        .expect("Unable to determine project's dir")
});

impl GlobalOpts {
    pub fn data_dir(&self) -> &Path {
        self.data_dir.as_deref().unwrap_or_else(|| {
            PROJECTS_DIR
                .state_dir()
                .unwrap_or_else(|| PROJECTS_DIR.data_local_dir())
        })
    }

    pub fn feed_file(&self) -> PathBuf {
        self.feed_file
            .clone()
            .unwrap_or_else(|| self.data_dir().join(FEED_FILE_NAME))
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    News,
    PrivateAd,
    WeatherAlert,
}

impl From<KindArg> for RecordKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::News => RecordKind::News,
            KindArg::PrivateAd => RecordKind::PrivateAd,
            KindArg::WeatherAlert => RecordKind::WeatherAlert,
        }
    }
}

/// Options shared by the file import commands
#[derive(Debug, Args)]
pub struct ImportOpts {
    /// File to import
    pub path: PathBuf,

    /// Only append to the feed, skip the database and its duplicate check
    #[arg(long)]
    pub no_persist: bool,

    /// Delete the file once at least one record from it went through
    #[arg(long)]
    pub remove_processed: bool,
}

#[derive(Debug, Subcommand)]
pub enum OptsCmd {
    /// Enter a record interactively and publish it
    Add {
        kind: KindArg,

        /// Only append to the feed, skip the database and its duplicate check
        #[arg(long)]
        no_persist: bool,
    },
    /// Publish records from a JSON file
    ImportJson(ImportOpts),
    /// Publish records from an XML file
    ImportXml(ImportOpts),

    /// Inspect or reset the record database
    #[command(subcommand)]
    Db(DbCmd),

    /// Show or reset the feed file
    #[command(subcommand)]
    Feed(FeedCmd),

    /// Write word and letter statistics of the feed as CSV
    Stats {
        /// Directory for the CSV files (defaults to the data dir)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Great-circle distance between two cities
    Distance { from: String, to: String },
    /// List known cities
    Cities,

    /// Small standalone exercises
    #[command(subcommand)]
    Dev(DevCmd),
}

#[derive(Debug, Subcommand)]
pub enum DbCmd {
    /// Database location, size and record counts
    Info,
    /// Record counts per kind
    Counts,
    /// Most recently stored records of one kind
    Recent {
        kind: KindArg,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Delete every stored record
    Clear {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum FeedCmd {
    Show,
    Clear,
}

#[derive(Debug, Subcommand)]
pub enum DevCmd {
    /// Normalize letter case, fix "iz" and count whitespace
    Text {
        /// Text file to process (defaults to the built-in paragraph)
        file: Option<PathBuf>,
    },
    /// Sort random numbers and average the even and odd ones
    Numbers {
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value_t = newsfeed_exercises::numbers::DEFAULT_COUNT)]
        count: usize,
    },
    /// Generate random letter maps and merge them
    Dicts {
        #[arg(long)]
        seed: Option<u64>,
    },
}
