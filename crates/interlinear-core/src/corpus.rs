use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::error::CorpusLoadFailure;

pub type SentenceId = String;

/// One verse slot per position in a chapter. `None` marks a verse with no
/// sentence of its own.
pub type Chapter = Vec<Option<SentenceId>>;

/// Whether a space follows a word in the surface text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum SpaceAfter {
    SpaceFollows,
    NoSpaceFollows,
    #[default]
    Unspecified,
}

impl SpaceAfter {
    /// Unspecified reads as a following space.
    pub fn space_follows(self) -> bool {
        !matches!(self, SpaceAfter::NoSpaceFollows)
    }

    fn is_unspecified(&self) -> bool {
        matches!(self, SpaceAfter::Unspecified)
    }
}

impl From<Option<String>> for SpaceAfter {
    fn from(value: Option<String>) -> Self {
        match value.as_deref() {
            Some("No") => SpaceAfter::NoSpaceFollows,
            Some(_) => SpaceAfter::SpaceFollows,
            None => SpaceAfter::Unspecified,
        }
    }
}

impl From<SpaceAfter> for Option<String> {
    fn from(value: SpaceAfter) -> Self {
        match value {
            SpaceAfter::SpaceFollows => Some("Yes".to_string()),
            SpaceAfter::NoSpaceFollows => Some("No".to_string()),
            SpaceAfter::Unspecified => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Misc {
    #[serde(
        rename = "SpaceAfter",
        default,
        skip_serializing_if = "SpaceAfter::is_unspecified"
    )]
    pub space_after: SpaceAfter,
    #[serde(flatten)]
    pub other: BTreeMap<String, serde_json::Value>,
}

/// A single token of the corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub form: String,
    pub lemma: String,
    pub upos: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub feats: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub misc: Misc,
}

impl Word {
    pub fn space_follows(&self) -> bool {
        self.misc.space_after.space_follows()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The loaded corpus. Never mutated after construction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorpusIndex {
    order: HashMap<String, Vec<Chapter>>,
    sentences: HashMap<SentenceId, Vec<Word>>,
}

impl CorpusIndex {
    /// Build an index from parts, checking that every sentence named in
    /// `order` exists.
    pub fn new(
        order: HashMap<String, Vec<Chapter>>,
        sentences: HashMap<SentenceId, Vec<Word>>,
    ) -> Result<Self, CorpusLoadFailure> {
        let index = Self { order, sentences };
        index.validate()?;
        Ok(index)
    }

    pub fn from_json_str(content: &str) -> Result<Self, CorpusLoadFailure> {
        let index: CorpusIndex = serde_json::from_str(content)?;
        index.validate()?;
        Ok(index)
    }

    pub async fn load_from_json(path: impl AsRef<Path>) -> Result<Self, CorpusLoadFailure> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "loading corpus");

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| CorpusLoadFailure::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let index = Self::from_json_str(&content)?;

        tracing::info!(
            books = index.order.len(),
            sentences = index.sentences.len(),
            "corpus loaded"
        );
        Ok(index)
    }

    fn validate(&self) -> Result<(), CorpusLoadFailure> {
        for (book, chapters) in &self.order {
            for (chapter_idx, verses) in chapters.iter().enumerate() {
                for (verse, slot) in verses.iter().enumerate() {
                    if let Some(sentence) = slot {
                        if !self.sentences.contains_key(sentence) {
                            return Err(CorpusLoadFailure::DanglingSentence {
                                book: book.clone(),
                                chapter: chapter_idx + 1,
                                verse,
                                sentence: sentence.clone(),
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Verse slots of a 1-based chapter.
    pub fn chapter(&self, book: &str, chapter: usize) -> Option<&[Option<SentenceId>]> {
        let chapters = self.order.get(book)?;
        let idx = chapter.checked_sub(1)?;
        chapters.get(idx).map(Vec::as_slice)
    }

    pub fn sentence(&self, id: &str) -> Option<&[Word]> {
        self.sentences.get(id).map(Vec::as_slice)
    }

    /// Book names in alphabetical order.
    pub fn books(&self) -> Vec<&str> {
        let mut books: Vec<&str> = self.order.keys().map(String::as_str).collect();
        books.sort_unstable();
        books
    }

    pub fn chapter_count(&self, book: &str) -> usize {
        self.order.get(book).map_or(0, Vec::len)
    }

    pub fn sentence_count(&self) -> usize {
        self.sentences.len()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    /// Mark 1 has slots 0..=5 with verse 3 empty; verses 4 and 5 share a sentence.
    pub(crate) fn sample_corpus() -> CorpusIndex {
        let data = json!({
            "order": {
                "Mark": [[null, "s1", "s2", null, "s3", "s3"]],
                "1 Corinthians": [[null, "c1"]]
            },
            "sentences": {
                "s1": [{
                    "form": "Ἀρχὴ", "lemma": "ἀρχή", "upos": "NOUN",
                    "feats": {"Case": "Nom"}, "misc": {}
                }],
                "s2": [
                    {"form": "Καθὼς", "lemma": "καθώς", "upos": "SCONJ", "feats": {}, "misc": {}},
                    {"form": "γέγραπται", "lemma": "γράφω", "upos": "VERB",
                     "feats": {"Voice": "Pass", "Tense": "Perf", "Mood": "Ind"},
                     "misc": {"SpaceAfter": "No"}},
                    {"form": ",", "lemma": ",", "upos": "PUNCT", "feats": null, "misc": null}
                ],
                "s3": [{"form": "ἐγένετο", "lemma": "γίνομαι", "upos": "VERB", "feats": {}, "misc": {}}],
                "c1": [{"form": "Ἡ", "lemma": "ὁ", "upos": "DET", "feats": {"Gender": "Fem"}, "misc": {}}]
            }
        });
        CorpusIndex::from_json_str(&data.to_string()).expect("sample corpus is valid")
    }

    #[test]
    fn test_chapter_lookup_is_one_based() {
        let corpus = sample_corpus();
        assert_eq!(corpus.chapter("Mark", 1).map(<[_]>::len), Some(6));
        assert!(corpus.chapter("Mark", 0).is_none());
        assert!(corpus.chapter("Mark", 2).is_none());
        assert!(corpus.chapter("Luke", 1).is_none());
    }

    #[test]
    fn test_space_after_decodes_three_states() {
        let corpus = sample_corpus();
        let words = corpus.sentence("s2").unwrap();
        assert_eq!(words[0].misc.space_after, SpaceAfter::Unspecified);
        assert_eq!(words[1].misc.space_after, SpaceAfter::NoSpaceFollows);
        assert!(words[0].space_follows());
        assert!(!words[1].space_follows());

        let yes: Word = serde_json::from_value(json!({
            "form": "a", "lemma": "a", "upos": "X", "misc": {"SpaceAfter": "Yes", "Gloss": "x"}
        }))
        .unwrap();
        assert_eq!(yes.misc.space_after, SpaceAfter::SpaceFollows);
        assert_eq!(yes.misc.other.get("Gloss"), Some(&json!("x")));
    }

    #[test]
    fn test_null_feats_and_misc_read_as_empty() {
        let corpus = sample_corpus();
        let comma = &corpus.sentence("s2").unwrap()[2];
        assert!(comma.feats.is_empty());
        assert_eq!(comma.misc, Misc::default());
    }

    #[test]
    fn test_feats_enumerate_sorted_by_name() {
        let corpus = sample_corpus();
        let verb = &corpus.sentence("s2").unwrap()[1];
        let keys: Vec<&str> = verb.feats.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Mood", "Tense", "Voice"]);
    }

    #[test]
    fn test_dangling_sentence_rejected() {
        let data = json!({
            "order": {"Mark": [[null, "missing"]]},
            "sentences": {}
        });
        let err = CorpusIndex::from_json_str(&data.to_string()).unwrap_err();
        match err {
            CorpusLoadFailure::DanglingSentence { book, chapter, verse, sentence } => {
                assert_eq!(book, "Mark");
                assert_eq!(chapter, 1);
                assert_eq!(verse, 1);
                assert_eq!(sentence, "missing");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_new_checks_parts() {
        let word: Word = serde_json::from_value(json!({"form": "καί", "lemma": "καί", "upos": "CCONJ"})).unwrap();
        let order = HashMap::from([("Mark".to_string(), vec![vec![None, Some("k1".to_string())]])]);

        let sentences = HashMap::from([("k1".to_string(), vec![word])]);
        let corpus = CorpusIndex::new(order.clone(), sentences).unwrap();
        assert_eq!(corpus.sentence("k1").map(<[_]>::len), Some(1));

        assert!(CorpusIndex::new(order, HashMap::new()).is_err());
    }

    #[test]
    fn test_books_and_counts() {
        let corpus = sample_corpus();
        assert_eq!(corpus.books(), vec!["1 Corinthians", "Mark"]);
        assert_eq!(corpus.chapter_count("Mark"), 1);
        assert_eq!(corpus.chapter_count("Luke"), 0);
        assert_eq!(corpus.sentence_count(), 4);
    }

    #[tokio::test]
    async fn test_load_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let data = json!({
            "order": {"John": [[null, "j1"]]},
            "sentences": {"j1": [{"form": "Ἐν", "lemma": "ἐν", "upos": "ADP", "feats": {}, "misc": {}}]}
        });
        write!(file, "{}", data).unwrap();

        let corpus = CorpusIndex::load_from_json(file.path()).await.unwrap();
        assert_eq!(corpus.sentence("j1").unwrap()[0].form, "Ἐν");
    }

    #[tokio::test]
    async fn test_load_missing_file_is_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = CorpusIndex::load_from_json(dir.path().join("grc.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, CorpusLoadFailure::Io { .. }));
    }

    #[test]
    fn test_malformed_json_is_json_failure() {
        let err = CorpusIndex::from_json_str("{\"order\": ").unwrap_err();
        assert!(matches!(err, CorpusLoadFailure::Json(_)));
    }
}
