use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

use crate::error::{Error, Result};

/// A parsed `<book> <chapter>:<start>[-<end>]` reference. Verses are inclusive
/// and 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceRange {
    pub book: String,
    pub chapter: usize,
    pub start_verse: usize,
    pub end_verse: usize,
}

impl fmt::Display for ReferenceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}:{}", self.book, self.chapter, self.start_verse)?;
        if self.end_verse != self.start_verse {
            write!(f, "-{}", self.end_verse)?;
        }
        Ok(())
    }
}

fn reference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(\w+(?:[ \t]+\w+)*)[ \t]+(\d+):(\d+)(?:[ \t]*-[ \t]*(\d+))?")
            .expect("reference pattern is valid")
    })
}

/// Parse the first reference found in `input`; surrounding text is ignored.
/// Only the syntax is checked here; whether the book or chapter exists is
/// left to the resolver.
pub fn parse(input: &str) -> Result<ReferenceRange> {
    let malformed = || Error::MalformedReference {
        input: input.to_string(),
    };

    let caps = reference_pattern()
        .captures(input.trim())
        .ok_or_else(malformed)?;

    let number = |idx: usize| -> Result<usize> {
        caps[idx].parse().map_err(|_| malformed())
    };

    let book = caps[1].split_whitespace().collect::<Vec<_>>().join(" ");
    let chapter = number(2)?;
    let start_verse = number(3)?;
    let end_verse = match caps.get(4) {
        Some(_) => number(4)?,
        None => start_verse,
    };

    Ok(ReferenceRange {
        book,
        chapter,
        start_verse,
        end_verse,
    })
}
