use crate::corpus::Word;
use crate::error::{Error, Result};
use crate::render::{Document, NodeId, WORD_ATTRIBUTE};

/// Contents of the floating inspector for one word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlossPanel {
    pub title: String,
    /// `"<lemma> <upos>"`; absent on a degraded panel.
    pub summary: Option<String>,
    /// `"<feature> <value>"`, sorted by feature name.
    pub features: Vec<String>,
    pub corrupt: bool,
}

impl GlossPanel {
    pub fn from_word(word: &Word) -> Self {
        Self {
            title: word.form.clone(),
            summary: Some(format!("{} {}", word.lemma, word.upos)),
            features: word
                .feats
                .iter()
                .map(|(name, value)| format!("{} {}", name, value))
                .collect(),
            corrupt: false,
        }
    }

    /// Decode the JSON transport form carried on a rendered element.
    pub fn decode(node: NodeId, raw: &str) -> Result<Self> {
        let word: Word = serde_json::from_str(raw).map_err(|e| Error::CorruptAnnotation {
            node,
            reason: e.to_string(),
        })?;
        Ok(Self::from_word(&word))
    }

    pub fn degraded(fallback: impl Into<String>) -> Self {
        Self {
            title: fallback.into(),
            summary: None,
            features: Vec::new(),
            corrupt: true,
        }
    }
}

/// The host's modal surface.
pub trait ModalHost {
    fn open_modal(&mut self, panel: GlossPanel);
    fn close_modal(&mut self);
}

/// A single modal slot: opening a panel replaces whatever was showing.
#[derive(Debug, Clone, Default)]
pub struct InspectorSlot {
    current: Option<GlossPanel>,
}

impl InspectorSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&GlossPanel> {
        self.current.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }
}

impl ModalHost for InspectorSlot {
    fn open_modal(&mut self, panel: GlossPanel) {
        self.current = Some(panel);
    }

    fn close_modal(&mut self) {
        self.current = None;
    }
}

/// Build the panel for an activated element.
///
/// The typed snapshot wins. Without one, the `data-word` attribute is decoded.
/// If that fails too the panel degrades to the element's visible text.
/// Elements removed from the document never inspect.
pub fn gloss_for(document: &Document, node: NodeId) -> Result<GlossPanel> {
    if !document.is_attached(node) {
        return Err(Error::CorruptAnnotation {
            node,
            reason: "element is no longer in the document".to_string(),
        });
    }
    if let Some(word) = document.snapshot(node) {
        return Ok(GlossPanel::from_word(word));
    }
    match document
        .element(node)
        .and_then(|el| el.attributes.get(WORD_ATTRIBUTE))
    {
        Some(raw) => GlossPanel::decode(node, raw),
        None => Err(Error::CorruptAnnotation {
            node,
            reason: "no word snapshot attached".to_string(),
        }),
    }
}

/// Open the inspector for an activated element. Never fails: a corrupt
/// annotation is logged and shown as a degraded panel.
pub fn inspect(document: &Document, node: NodeId, host: &mut dyn ModalHost) {
    let panel = match gloss_for(document, node) {
        Ok(panel) => panel,
        Err(e) => {
            tracing::warn!("{}", e);
            let fallback = document.text_content(node);
            GlossPanel::degraded(if fallback.is_empty() { "?".to_string() } else { fallback })
        }
    };
    host.open_modal(panel);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::tests::sample_corpus;
    use crate::render::{render_sentences, ElementSpec, RenderTarget, WORD_CLASS};

    #[test]
    fn test_panel_matches_word() {
        let corpus = sample_corpus();
        let verb = &corpus.sentence("s2").unwrap()[1];
        let panel = GlossPanel::from_word(verb);
        assert_eq!(panel.title, "γέγραπται");
        assert_eq!(panel.summary.as_deref(), Some("γράφω VERB"));
        assert_eq!(panel.features, vec!["Mood Ind", "Tense Perf", "Voice Pass"]);
        assert!(!panel.corrupt);
    }

    #[test]
    fn test_inspect_rendered_word_round_trip() {
        let corpus = sample_corpus();
        let mut doc = Document::new();
        let root = doc.root();
        let lines = render_sentences(&mut doc, root, &["s2"], &corpus);

        let mut slot = InspectorSlot::new();
        for (node, word) in lines[0].words.iter().zip(corpus.sentence("s2").unwrap()) {
            inspect(&doc, *node, &mut slot);
            assert_eq!(slot.current(), Some(&GlossPanel::from_word(word)));
        }
    }

    #[test]
    fn test_last_activation_wins() {
        let corpus = sample_corpus();
        let mut doc = Document::new();
        let root = doc.root();
        let lines = render_sentences(&mut doc, root, &["s1", "s3"], &corpus);

        let mut slot = InspectorSlot::new();
        inspect(&doc, lines[0].words[0], &mut slot);
        inspect(&doc, lines[1].words[0], &mut slot);
        assert_eq!(slot.current().map(|p| p.title.as_str()), Some("ἐγένετο"));

        slot.close_modal();
        assert!(!slot.is_open());
    }

    #[test]
    fn test_attribute_fallback_without_snapshot() {
        let mut doc = Document::new();
        let root = doc.root();
        let span = doc.create_child(root, ElementSpec::new("span").text("λόγος").class(WORD_CLASS));
        doc.set_attribute(
            span,
            WORD_ATTRIBUTE,
            r#"{"form":"λόγος","lemma":"λόγος","upos":"NOUN","feats":{"Number":"Sing","Case":"Nom"}}"#
                .to_string(),
        );

        let panel = gloss_for(&doc, span).unwrap();
        assert_eq!(panel.summary.as_deref(), Some("λόγος NOUN"));
        assert_eq!(panel.features, vec!["Case Nom", "Number Sing"]);
    }

    #[test]
    fn test_corrupt_annotation_degrades_to_form() {
        let mut doc = Document::new();
        let root = doc.root();
        let span = doc.create_child(root, ElementSpec::new("span").text("λόγος").class(WORD_CLASS));
        doc.set_attribute(span, WORD_ATTRIBUTE, "{not json".to_string());

        assert!(matches!(
            gloss_for(&doc, span),
            Err(Error::CorruptAnnotation { node, .. }) if node == span
        ));

        let mut slot = InspectorSlot::new();
        inspect(&doc, span, &mut slot);
        let panel = slot.current().unwrap();
        assert_eq!(panel.title, "λόγος");
        assert!(panel.corrupt);
        assert!(panel.summary.is_none());
        assert!(panel.features.is_empty());
    }

    #[test]
    fn test_removed_word_no_longer_inspects() {
        let corpus = sample_corpus();
        let mut doc = Document::new();
        let root = doc.root();
        let first = render_sentences(&mut doc, root, &["s2"], &corpus);
        let stale = first[0].words[0];
        assert!(gloss_for(&doc, stale).is_ok());

        doc.empty(root);
        render_sentences(&mut doc, root, &["s2"], &corpus);
        assert!(matches!(
            gloss_for(&doc, stale),
            Err(Error::CorruptAnnotation { node, .. }) if node == stale
        ));

        let mut slot = InspectorSlot::new();
        inspect(&doc, stale, &mut slot);
        let panel = slot.current().unwrap();
        assert!(panel.corrupt);
        assert_eq!(panel.title, "?");
    }

    #[test]
    fn test_detached_element_with_attribute_is_rejected() {
        let mut doc = Document::new();
        let root = doc.root();
        let line = doc.create_child(root, ElementSpec::new("p"));
        doc.empty(root);

        let orphan = doc.create_child(line, ElementSpec::new("span").text("λόγος"));
        doc.set_attribute(
            orphan,
            WORD_ATTRIBUTE,
            r#"{"form":"λόγος","lemma":"λόγος","upos":"NOUN"}"#.to_string(),
        );
        assert!(doc.element(orphan).is_some());
        assert!(gloss_for(&doc, orphan).is_err());
    }

    #[test]
    fn test_missing_snapshot_and_attribute_is_corrupt() {
        let mut doc = Document::new();
        let root = doc.root();
        let span = doc.create_child(root, ElementSpec::new("span").text("καί"));
        assert!(gloss_for(&doc, span).is_err());
    }
}
