//! Sentence-case normalization and whitespace accounting.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("Can't fail"));
static STANDALONE_IZ: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\biz\b").expect("Can't fail"));

/// The paragraph the exercise ships with.
pub const HOMEWORK_TEXT: &str = r#"
  tHis iz your homeWork, copy these Text to variable.



  You NEED TO normalize it fROM letter CASEs point oF View. also, create one MORE senTENCE witH LAST WoRDS of each existING SENtence and add it to the END OF this Paragraph.



  it iZ misspeLLing here. fix"iZ" with correct "is", but ONLY when it Iz a mistAKE.



  last iz TO calculate nuMber OF Whitespace characteRS in this Tex. caREFULL, not only Spaces, but ALL whitespaces. I got 87."#;

/// Split into `(sentence, terminator)` pairs. The last sentence may have an
/// empty terminator.
fn sentences(text: &str) -> Vec<(&str, &str)> {
    let mut out = vec![];
    let mut start = 0;
    for m in SENTENCE_END.find_iter(text) {
        out.push((&text[start..m.start()], m.as_str()));
        start = m.end();
    }
    out.push((&text[start..], ""));
    out
}

fn sentence_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.as_str().to_lowercase().chars())
            .collect(),
        None => String::new(),
    }
}

/// Upper-case the first letter of every sentence and lower-case the rest.
///
/// Whitespace in front of a sentence is kept; whitespace before its
/// terminator is dropped, as are sentences with no content.
pub fn normalize_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (sentence, terminator) in sentences(text) {
        let body = sentence.trim();
        if body.is_empty() {
            continue;
        }
        let leading = &sentence[..sentence.len() - sentence.trim_start().len()];
        out.push_str(leading);
        out.push_str(&sentence_case(body));
        out.push_str(terminator);
    }
    out
}

/// Replace the standalone word `iz` (any case) with `is`.
pub fn fix_iz(text: &str) -> String {
    STANDALONE_IZ.replace_all(text, "is").into_owned()
}

pub fn last_words(text: &str) -> Vec<&str> {
    sentences(text)
        .into_iter()
        .filter_map(|(sentence, _)| sentence.split_whitespace().last())
        .collect()
}

/// Append one more sentence made of the last word of every sentence.
pub fn append_last_words_sentence(text: &str) -> String {
    let words = last_words(text);
    if words.is_empty() {
        return text.to_owned();
    }
    format!("{text} {}.", words.join(" "))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WhitespaceStats {
    pub spaces: usize,
    pub newlines: usize,
    pub tabs: usize,
    pub carriage_returns: usize,
    pub other: usize,
    pub total: usize,
}

impl WhitespaceStats {
    pub fn of(text: &str) -> Self {
        let mut stats = Self::default();
        for c in text.chars().filter(|c| c.is_whitespace()) {
            stats.total += 1;
            match c {
                ' ' => stats.spaces += 1,
                '\n' => stats.newlines += 1,
                '\t' => stats.tabs += 1,
                '\r' => stats.carriage_returns += 1,
                _ => stats.other += 1,
            }
        }
        stats
    }
}

impl fmt::Display for WhitespaceStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Spaces: {}", self.spaces)?;
        writeln!(f, "Newlines: {}", self.newlines)?;
        writeln!(f, "Tabs: {}", self.tabs)?;
        writeln!(f, "Carriage returns: {}", self.carriage_returns)?;
        writeln!(f, "Other whitespace: {}", self.other)?;
        write!(f, "Total whitespace: {}", self.total)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextReport {
    pub original_whitespace: WhitespaceStats,
    pub text: String,
    pub whitespace: WhitespaceStats,
}

/// Normalize case, fix `iz`, append the last-words sentence, and count
/// whitespace before and after.
pub fn process(original: &str) -> TextReport {
    let normalized = normalize_case(original);
    let fixed = fix_iz(&normalized);
    let text = append_last_words_sentence(&fixed);
    TextReport {
        original_whitespace: WhitespaceStats::of(original),
        whitespace: WhitespaceStats::of(&text),
        text,
    }
}
