//! The append-only feed file published records are rendered into.

use std::fs::{self, OpenOptions};
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use snafu::{ResultExt as _, Snafu};
use tracing::debug;

const LOG_TARGET: &str = "newsfeed::feed";

pub const FEED_FILE_NAME: &str = "news_feed.txt";

#[derive(Debug, Snafu)]
pub enum FeedError {
    #[snafu(display("Failed to write feed file {}", path.display()))]
    Write { source: io::Error, path: PathBuf },
    #[snafu(display("Failed to read feed file {}", path.display()))]
    Read { source: io::Error, path: PathBuf },
}

pub type FeedResult<T> = std::result::Result<T, FeedError>;

/// Feed file location. The file is opened for every operation and never
/// kept open.
#[derive(Debug, Clone)]
pub struct FeedFile {
    path: PathBuf,
}

impl FeedFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a rendered block, creating the file (and its directory) if
    /// needed.
    pub fn append(&self, block: &str) -> FeedResult<()> {
        let ctx = || WriteSnafu {
            path: self.path.clone(),
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|_| ctx())?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|_| ctx())?;
        file.write_all(block.as_bytes()).with_context(|_| ctx())?;
        debug!(target: LOG_TARGET, path = %self.path.display(), len = block.len(), "Appended to feed");
        Ok(())
    }

    /// Whole feed content; a feed that was never written reads as empty.
    pub fn read(&self) -> FeedResult<String> {
        match fs::read_to_string(&self.path) {
            Ok(s) => Ok(s),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(err) => Err(err).context(ReadSnafu {
                path: self.path.clone(),
            }),
        }
    }

    pub fn clear(&self) -> FeedResult<()> {
        fs::write(&self.path, "").context(WriteSnafu {
            path: self.path.clone(),
        })
    }
}
