use serde::{Deserialize, Serialize};

use crate::corpus::CorpusIndex;
use crate::reference::ReferenceRange;

/// What to do when consecutive verses point at the same sentence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatPolicy {
    /// One line per covering verse.
    #[default]
    PerVerse,
    /// Consecutive repeats of a sentence render once.
    Collapse,
}

/// Sentence identifiers for a range, in verse order. Unknown books and
/// chapters give an empty list; the end verse is clamped to the chapter.
pub fn resolve<'c>(
    range: &ReferenceRange,
    index: &'c CorpusIndex,
    policy: RepeatPolicy,
) -> Vec<&'c str> {
    let Some(slots) = index.chapter(&range.book, range.chapter) else {
        tracing::debug!(reference = %range, "reference outside corpus");
        return Vec::new();
    };

    let mut ids: Vec<&'c str> = Vec::new();
    for verse in range.start_verse..=range.end_verse {
        if verse >= slots.len() {
            break;
        }
        let Some(id) = slots[verse].as_deref() else {
            continue;
        };
        if policy == RepeatPolicy::Collapse && ids.last() == Some(&id) {
            continue;
        }
        ids.push(id);
    }

    if ids.is_empty() {
        tracing::debug!(reference = %range, "reference resolved to no sentences");
    }
    ids
}
