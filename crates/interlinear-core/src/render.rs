//! Word-level rendering of resolved sentences.
//!
//! Rendering writes into any [`RenderTarget`]. [`Document`] is the in-memory
//! element tree used by the terminal host and by tests. Every word element gets
//! its source [`Word`] attached twice: as a typed snapshot registered through
//! [`RenderTarget::on_activate`], and as a JSON `data-word` attribute for
//! exported markup.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::corpus::{CorpusIndex, Word};

pub const LINE_CLASS: &str = "interlinear-line";
pub const WORD_CLASS: &str = "interlinear-word";
pub const SPACE_CLASS: &str = "interlinear-space";
pub const ERROR_CLASS: &str = "interlinear-error";
pub const WORD_ATTRIBUTE: &str = "data-word";

/// Handle to an element. A handle to a removed element never resolves again,
/// even after its slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}

/// Arguments for creating one child element.
#[derive(Debug, Clone, Default)]
pub struct ElementSpec {
    pub tag: &'static str,
    pub text: Option<String>,
    pub title: Option<String>,
    pub class: Option<&'static str>,
}

impl ElementSpec {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            ..Self::default()
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn class(mut self, class: &'static str) -> Self {
        self.class = Some(class);
        self
    }
}

/// The host's element-creation surface.
pub trait RenderTarget {
    fn create_child(&mut self, parent: NodeId, spec: ElementSpec) -> NodeId;

    fn set_attribute(&mut self, node: NodeId, name: &str, value: String);

    /// Make `node` activatable; activation inspects `snapshot`.
    fn on_activate(&mut self, node: NodeId, snapshot: Word);

    /// Remove all children of `node` and anything attached to them.
    fn empty(&mut self, node: NodeId);
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub tag: String,
    pub text: Option<String>,
    pub title: Option<String>,
    pub class: Option<String>,
    pub attributes: BTreeMap<String, String>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    element: Option<Element>,
}

/// Arena-backed element tree with a typed snapshot side-table. Emptied
/// subtrees go back on a free list.
#[derive(Debug, Clone)]
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<usize>,
    snapshots: HashMap<NodeId, Word>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            slots: vec![Slot {
                generation: 0,
                element: Some(Element {
                    tag: "div".to_string(),
                    ..Element::default()
                }),
            }],
            free: Vec::new(),
            snapshots: HashMap::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId {
            index: 0,
            generation: 0,
        }
    }

    pub fn element(&self, node: NodeId) -> Option<&Element> {
        self.slots
            .get(node.index)
            .filter(|slot| slot.generation == node.generation)
            .and_then(|slot| slot.element.as_ref())
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        self.slots
            .get_mut(node.index)
            .filter(|slot| slot.generation == node.generation)
            .and_then(|slot| slot.element.as_mut())
    }

    /// Whether `node` is still reachable from the root.
    pub fn is_attached(&self, node: NodeId) -> bool {
        let mut current = node;
        loop {
            match self.element(current) {
                Some(el) => match el.parent {
                    Some(parent) => current = parent,
                    None => return current == self.root(),
                },
                None => return false,
            }
        }
    }

    /// Number of live elements, the root included.
    pub fn node_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Number of arena slots, live or free.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.element(node)
            .map(|el| el.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn snapshot(&self, node: NodeId) -> Option<&Word> {
        self.snapshots.get(&node)
    }

    pub fn is_activatable(&self, node: NodeId) -> bool {
        self.snapshots.contains_key(&node)
    }

    /// Concatenated text of `node` and its descendants.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        if let Some(el) = self.element(node) {
            if let Some(text) = &el.text {
                out.push_str(text);
            }
            for child in &el.children {
                self.collect_text(*child, out);
            }
        }
    }

    /// Serialize the subtree under the root as HTML.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for child in self.children(self.root()) {
            self.write_html(*child, &mut out);
        }
        out
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        let Some(el) = self.element(node) else {
            return;
        };
        out.push('<');
        out.push_str(&el.tag);
        if let Some(class) = &el.class {
            push_attribute(out, "class", class);
        }
        if let Some(title) = &el.title {
            push_attribute(out, "title", title);
        }
        for (name, value) in &el.attributes {
            push_attribute(out, name, value);
        }
        out.push('>');
        if let Some(text) = &el.text {
            out.push_str(&escape_html(text));
        }
        for child in &el.children {
            self.write_html(*child, out);
        }
        out.push_str("</");
        out.push_str(&el.tag);
        out.push('>');
    }

    fn allocate(&mut self, element: Element) -> NodeId {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.element = Some(element);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    element: Some(element),
                });
                NodeId {
                    index: self.slots.len() - 1,
                    generation: 0,
                }
            }
        }
    }

    fn release_children(&mut self, node: NodeId) {
        let children = match self.element_mut(node) {
            Some(el) => std::mem::take(&mut el.children),
            None => return,
        };
        for child in children {
            self.release_children(child);
            self.snapshots.remove(&child);
            if let Some(slot) = self.slots.get_mut(child.index) {
                if slot.generation == child.generation {
                    slot.element = None;
                    slot.generation = slot.generation.wrapping_add(1);
                    self.free.push(child.index);
                }
            }
        }
    }
}

fn push_attribute(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape_html(value));
    out.push('"');
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

impl RenderTarget for Document {
    fn create_child(&mut self, parent: NodeId, spec: ElementSpec) -> NodeId {
        let attached = self.element(parent).is_some();
        let id = self.allocate(Element {
            tag: spec.tag.to_string(),
            text: spec.text,
            title: spec.title,
            class: spec.class.map(str::to_string),
            parent: attached.then_some(parent),
            ..Element::default()
        });
        match self.element_mut(parent) {
            Some(el) => el.children.push(id),
            None => tracing::warn!(%parent, "creating element under a removed parent"),
        }
        id
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: String) {
        if let Some(el) = self.element_mut(node) {
            el.attributes.insert(name.to_string(), value);
        }
    }

    fn on_activate(&mut self, node: NodeId, snapshot: Word) {
        if self.element(node).is_some() {
            self.snapshots.insert(node, snapshot);
        }
    }

    fn empty(&mut self, node: NodeId) {
        self.release_children(node);
    }
}

/// One rendered sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    pub node: NodeId,
    pub words: Vec<NodeId>,
}

/// Render each sentence as one line under `parent`.
pub fn render_sentences(
    target: &mut dyn RenderTarget,
    parent: NodeId,
    sentence_ids: &[&str],
    index: &CorpusIndex,
) -> Vec<RenderedLine> {
    let mut lines = Vec::with_capacity(sentence_ids.len());

    for id in sentence_ids {
        let Some(words) = index.sentence(id) else {
            tracing::warn!(sentence = %id, "sentence missing from corpus");
            continue;
        };

        let line = target.create_child(parent, ElementSpec::new("p").class(LINE_CLASS));
        let mut rendered = Vec::with_capacity(words.len());

        for word in words {
            let span = target.create_child(
                line,
                ElementSpec::new("span")
                    .text(word.form.as_str())
                    .title(word.lemma.as_str())
                    .class(WORD_CLASS),
            );
            match serde_json::to_string(word) {
                Ok(json) => target.set_attribute(span, WORD_ATTRIBUTE, json),
                Err(e) => tracing::warn!(form = %word.form, "cannot encode word: {}", e),
            }
            target.on_activate(span, word.clone());
            rendered.push(span);

            if word.space_follows() {
                target.create_child(line, ElementSpec::new("span").text(" ").class(SPACE_CLASS));
            }
        }

        lines.push(RenderedLine {
            node: line,
            words: rendered,
        });
    }

    lines
}
