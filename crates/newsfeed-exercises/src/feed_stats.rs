//! Word and letter statistics over the published feed, exported as CSV.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write as _};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use newsfeed_core::RecordKind;
use regex::Regex;
use snafu::{ResultExt as _, Snafu};
use tracing::info;

const LOG_TARGET: &str = "newsfeed::stats";

pub const WORD_COUNT_FILE: &str = "word-count.csv";
pub const LETTER_COUNT_FILE: &str = "letter-count.csv";

/// Lines inside a block that carry metadata rather than text.
const METADATA_PREFIXES: [&str; 2] = ["Alert ID: ", "Severity: "];

#[derive(Debug, Snafu)]
pub enum StatsError {
    #[snafu(display("Failed to write {}", path.display()))]
    Write { source: io::Error, path: PathBuf },
}

pub type StatsResult<T> = std::result::Result<T, StatsError>;

fn header_kind(line: &str) -> Option<RecordKind> {
    RecordKind::ALL.into_iter().find(|kind| {
        line.strip_prefix(kind.display_name())
            .is_some_and(|rest| rest.starts_with(" -") && rest.trim_end().ends_with('-'))
    })
}

static NEWS_FOOTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r", \d{4}-\d{2}-\d{2} \d{2}:\d{2}$").expect("Can't fail")
});

/// The metadata line that closes a rendered record of `kind`.
fn is_footer(kind: RecordKind, line: &str) -> bool {
    match kind {
        RecordKind::News => NEWS_FOOTER.is_match(line.trim_end()),
        RecordKind::PrivateAd => line.starts_with("Actual until: "),
        RecordKind::WeatherAlert => line.starts_with("Location: "),
    }
}

/// Pull the record bodies out of rendered feed text.
///
/// The feed is cut at record headers. Inside a record, everything between
/// the header and the last footer line of its kind is body, minus alert id
/// and severity lines, so bodies may span blank lines. Text outside any
/// record is taken whole.
pub fn extract_body_text(feed: &str) -> String {
    let lines: Vec<&str> = feed.lines().collect();
    let mut taken: Vec<&str> = vec![];
    let mut rest = &lines[..];

    while let Some(first) = rest.first() {
        let next = rest
            .iter()
            .skip(1)
            .position(|line| header_kind(line).is_some())
            .map_or(rest.len(), |i| i + 1);
        let (section, tail) = rest.split_at(next);
        rest = tail;

        let Some(kind) = header_kind(first) else {
            taken.extend(section);
            continue;
        };
        let footer = section
            .iter()
            .rposition(|line| is_footer(kind, line))
            .unwrap_or(section.len());
        taken.extend(
            section[1..footer]
                .iter()
                .filter(|line| !METADATA_PREFIXES.iter().any(|p| line.starts_with(p))),
        );
        if footer < section.len() {
            taken.extend(&section[footer + 1..]);
        }
    }

    taken
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercased words, with everything but `a-z` acting as a separator.
pub fn word_counts(text: &str) -> BTreeMap<String, u64> {
    let lower = text.to_lowercase();
    let mut counts = BTreeMap::new();
    for word in lower
        .split(|c: char| !c.is_ascii_lowercase())
        .filter(|w| !w.is_empty())
    {
        *counts.entry(word.to_owned()).or_default() += 1;
    }
    counts
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LetterStat {
    pub count_all: u64,
    pub count_uppercase: u64,
}

impl LetterStat {
    /// Share of uppercase occurrences, in percent, rounded to 2 decimals.
    pub fn percentage(&self) -> f64 {
        if self.count_all == 0 {
            return 0.0;
        }
        let pct = self.count_uppercase as f64 / self.count_all as f64 * 100.0;
        (pct * 100.0).round() / 100.0
    }
}

/// Per-letter counts, case-folded, over every alphabetic character.
pub fn letter_stats(text: &str) -> BTreeMap<char, LetterStat> {
    let mut stats: BTreeMap<char, LetterStat> = BTreeMap::new();
    for c in text.chars().filter(|c| c.is_alphabetic()) {
        let folded = c.to_lowercase().next().unwrap_or(c);
        let stat = stats.entry(folded).or_default();
        stat.count_all += 1;
        if c.is_uppercase() {
            stat.count_uppercase += 1;
        }
    }
    stats
}

pub fn write_word_counts(
    out: &mut impl io::Write,
    counts: &BTreeMap<String, u64>,
) -> io::Result<()> {
    writeln!(out, "word,count")?;
    for (word, count) in counts {
        writeln!(out, "{word},{count}")?;
    }
    Ok(())
}

pub fn write_letter_stats(
    out: &mut impl io::Write,
    stats: &BTreeMap<char, LetterStat>,
) -> io::Result<()> {
    writeln!(out, "letter,count_all,count_uppercase,percentage")?;
    for (letter, stat) in stats {
        writeln!(
            out,
            "{letter},{},{},{:.2}",
            stat.count_all,
            stat.count_uppercase,
            stat.percentage()
        )?;
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedStats {
    pub words: BTreeMap<String, u64>,
    pub letters: BTreeMap<char, LetterStat>,
}

impl FeedStats {
    pub fn from_feed(feed: &str) -> Self {
        let text = extract_body_text(feed);
        Self {
            words: word_counts(&text),
            letters: letter_stats(&text),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty() && self.letters.is_empty()
    }

    /// Write both CSV reports into `dir`, returning their paths.
    pub fn write_reports(&self, dir: &Path) -> StatsResult<(PathBuf, PathBuf)> {
        let words_path = dir.join(WORD_COUNT_FILE);
        write_csv(&words_path, |out| write_word_counts(out, &self.words))?;

        let letters_path = dir.join(LETTER_COUNT_FILE);
        write_csv(&letters_path, |out| write_letter_stats(out, &self.letters))?;

        info!(
            target: LOG_TARGET,
            words = self.words.len(),
            letters = self.letters.len(),
            dir = %dir.display(),
            "Wrote feed statistics"
        );
        Ok((words_path, letters_path))
    }
}

fn write_csv(
    path: &Path,
    f: impl FnOnce(&mut BufWriter<File>) -> io::Result<()>,
) -> StatsResult<()> {
    let ctx = || WriteSnafu {
        path: path.to_owned(),
    };
    let mut out = BufWriter::new(File::create(path).with_context(|_| ctx())?);
    f(&mut out).with_context(|_| ctx())?;
    out.flush().with_context(|_| ctx())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = "News -------------------------
Fire downtown, again!
Springfield, 2024-03-05 07:09

Private Ad -------------------
Selling a Bike
Actual until: 2099-01-01, 10 days left

Weather Alert ----------------
Alert ID: WA-7QX2
Severity: High
Heavy RAIN
Location: Kyiv, 2024-11-30 18:45

";

    #[test]
    fn extracts_only_bodies() {
        assert_eq!(
            extract_body_text(FEED),
            "Fire downtown, again! Selling a Bike Heavy RAIN"
        );
    }

    #[test]
    fn unknown_blocks_are_kept() {
        assert_eq!(extract_body_text("just text\n\nmore"), "just text more");
        assert_eq!(extract_body_text(""), "");
    }

    #[test]
    fn bodies_may_span_blank_lines() {
        let feed = "News -------------------------\na\n\nb\nSpringfield, 2024-03-05 07:09\n\n\
                    Weather Alert ----------------\nAlert ID: WA-1\nSeverity: Low\n\
                    c\n\nd\nLocation: Kyiv, 2024-11-30 18:45\n\n";
        assert_eq!(extract_body_text(feed), "a b c d");
    }

    #[test]
    fn text_after_a_record_is_kept() {
        let feed = format!("{FEED}note one\n\nnote two\n");
        assert_eq!(
            extract_body_text(&feed),
            "Fire downtown, again! Selling a Bike Heavy RAIN note one note two"
        );
    }

    #[test]
    fn words_are_lowercased_and_split_on_non_letters() {
        let counts = word_counts("Fire, fire! it's café 2x");
        let pairs: Vec<_> = counts.iter().map(|(w, c)| (w.as_str(), *c)).collect();
        assert_eq!(
            pairs,
            [("caf", 1), ("fire", 2), ("it", 1), ("s", 1), ("x", 1)]
        );
    }

    #[test]
    fn letters_track_uppercase_share() {
        let stats = letter_stats("AaA b, Ä!");
        assert_eq!(
            stats[&'a'],
            LetterStat {
                count_all: 3,
                count_uppercase: 2
            }
        );
        assert_eq!(stats[&'a'].percentage(), 66.67);
        assert_eq!(stats[&'b'].percentage(), 0.0);
        assert_eq!(stats[&'ä'].count_uppercase, 1);
        assert_eq!(stats.len(), 3);
    }

    #[test]
    fn csv_layout() {
        let stats = FeedStats::from_feed(FEED);
        let mut words = vec![];
        write_word_counts(&mut words, &stats.words).unwrap();
        let words = String::from_utf8(words).unwrap();
        assert!(words.starts_with("word,count\na,1\nagain,1\nbike,1\n"));

        let mut letters = vec![];
        write_letter_stats(&mut letters, &stats.letters).unwrap();
        let letters = String::from_utf8(letters).unwrap();
        assert!(letters.starts_with("letter,count_all,count_uppercase,percentage\n"));
        assert!(letters.contains("\nb,1,1,100.00\n"));
    }

    #[test_log::test]
    fn writes_both_reports() {
        let dir = tempfile::tempdir().unwrap();
        let stats = FeedStats::from_feed(FEED);
        let (words, letters) = stats.write_reports(dir.path()).unwrap();
        assert_eq!(words.file_name().unwrap(), WORD_COUNT_FILE);
        assert!(std::fs::read_to_string(letters).unwrap().contains("\nr,2,1,50.00\n"));
    }
}
