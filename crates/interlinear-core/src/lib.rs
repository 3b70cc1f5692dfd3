//! Interlinear passage rendering: resolve a reference such as `John 3:16-18`
//! against a tokenized corpus and render its sentences word by word, with a
//! morphological gloss behind every word.

pub mod config;
pub mod corpus;
pub mod error;
pub mod host;
pub mod inspect;
pub mod reference;
pub mod render;
pub mod resolver;

// Re-export main types for convenience
pub use config::Config;
pub use corpus::{CorpusIndex, SentenceId, SpaceAfter, Word};
pub use error::{CorpusLoadFailure, Error, Result};
pub use host::{activate, register_passage_renderer, BlockRegistry, PassageRenderer};
pub use inspect::{gloss_for, inspect, GlossPanel, InspectorSlot, ModalHost};
pub use reference::{parse, ReferenceRange};
pub use render::{render_sentences, Document, Element, ElementSpec, NodeId, RenderTarget, RenderedLine};
pub use resolver::{resolve, RepeatPolicy};
