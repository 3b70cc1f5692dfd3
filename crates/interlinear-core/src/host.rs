//! Block-renderer registration and the `passage` renderer.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::Config;
use crate::corpus::CorpusIndex;
use crate::error::{Error, Result};
use crate::reference;
use crate::render::{
    render_sentences, ElementSpec, NodeId, RenderTarget, RenderedLine, ERROR_CLASS,
};
use crate::resolver::{resolve, RepeatPolicy};

pub type BlockCallback = Box<dyn Fn(&str, &mut dyn RenderTarget, NodeId) + Send + Sync>;

/// Language tag -> block renderer.
#[derive(Default)]
pub struct BlockRegistry {
    renderers: HashMap<String, BlockCallback>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tag: impl Into<String>, renderer: BlockCallback) {
        self.renderers.insert(tag.into(), renderer);
    }

    pub fn is_registered(&self, tag: &str) -> bool {
        self.renderers.contains_key(tag)
    }

    /// Run the renderer for `tag`. Returns false when no renderer is registered.
    pub fn process(
        &self,
        tag: &str,
        source: &str,
        target: &mut dyn RenderTarget,
        parent: NodeId,
    ) -> bool {
        match self.renderers.get(tag) {
            Some(renderer) => {
                renderer(source, target, parent);
                true
            }
            None => false,
        }
    }
}

/// Parses a reference block and renders its sentences.
#[derive(Debug, Clone)]
pub struct PassageRenderer {
    corpus: Arc<CorpusIndex>,
    policy: RepeatPolicy,
}

impl PassageRenderer {
    pub fn new(corpus: Arc<CorpusIndex>, policy: RepeatPolicy) -> Self {
        Self { corpus, policy }
    }

    /// Render `source` under `parent`. A malformed reference renders the raw
    /// source in a single error paragraph instead.
    pub fn render(
        &self,
        source: &str,
        target: &mut dyn RenderTarget,
        parent: NodeId,
    ) -> Vec<RenderedLine> {
        let range = match reference::parse(source) {
            Ok(range) => range,
            Err(e) => {
                tracing::warn!("{}", e);
                target.create_child(
                    parent,
                    ElementSpec::new("p").text(source.trim()).class(ERROR_CLASS),
                );
                return Vec::new();
            }
        };

        let ids = resolve(&range, &self.corpus, self.policy);
        tracing::debug!(reference = %range, sentences = ids.len(), "rendering passage");
        render_sentences(target, parent, &ids, &self.corpus)
    }
}

/// Load the configured corpus and register the passage renderer under the
/// configured tag. On a load failure nothing is registered.
pub async fn activate(registry: &mut BlockRegistry, config: &Config) -> Result<Arc<CorpusIndex>> {
    let corpus = match CorpusIndex::load_from_json(config.corpus_path()).await {
        Ok(corpus) => Arc::new(corpus),
        Err(e) => {
            tracing::error!("passage renderer disabled: {}", e);
            return Err(Error::CorpusLoadFailure(e));
        }
    };

    register_passage_renderer(
        registry,
        config.language_tag(),
        corpus.clone(),
        config.repeat_policy(),
    );
    Ok(corpus)
}

pub fn register_passage_renderer(
    registry: &mut BlockRegistry,
    tag: &str,
    corpus: Arc<CorpusIndex>,
    policy: RepeatPolicy,
) {
    let renderer = PassageRenderer::new(corpus, policy);
    registry.register(
        tag,
        Box::new(move |source: &str, target: &mut dyn RenderTarget, parent: NodeId| {
            renderer.render(source, target, parent);
        }),
    );
    tracing::info!(tag, "registered passage renderer");
}
