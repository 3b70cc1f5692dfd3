//! Error taxonomy for the passage pipeline.
//!
//! Only [`Error::CorpusLoadFailure`] is fatal. Malformed references and corrupt
//! annotations are recovered where they occur and rendered as degraded output.

use std::path::PathBuf;
use thiserror::Error;

use crate::render::NodeId;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// The reference text has no `<book> <chapter>:<verse>` shape at all.
    #[error("malformed reference: {input:?}")]
    MalformedReference { input: String },

    /// A rendered word carries no usable snapshot.
    #[error("corrupt annotation on node {node}: {reason}")]
    CorruptAnnotation { node: NodeId, reason: String },

    #[error("failed to load corpus: {0}")]
    CorpusLoadFailure(#[from] CorpusLoadFailure),
}

#[derive(Debug, Error)]
pub enum CorpusLoadFailure {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid corpus json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{book} {chapter}:{verse} points at missing sentence {sentence:?}")]
    DanglingSentence {
        book: String,
        chapter: usize,
        verse: usize,
        sentence: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corpus_failure_converts_into_fatal_error() {
        let failure = CorpusLoadFailure::DanglingSentence {
            book: "Mark".to_string(),
            chapter: 1,
            verse: 2,
            sentence: "s9".to_string(),
        };
        let err: Error = failure.into();
        assert!(matches!(err, Error::CorpusLoadFailure(_)));
        assert_eq!(
            err.to_string(),
            "failed to load corpus: Mark 1:2 points at missing sentence \"s9\""
        );
    }

    #[test]
    fn test_malformed_reference_message_quotes_input() {
        let err = Error::MalformedReference { input: "not a reference".to_string() };
        assert_eq!(err.to_string(), "malformed reference: \"not a reference\"");
    }
}
