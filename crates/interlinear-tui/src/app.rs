use interlinear_core::{
    inspect, BlockRegistry, Document, GlossPanel, InspectorSlot, ModalHost, NodeId, RenderTarget,
};
use interlinear_core::render::ERROR_CLASS;
use ratatui::layout::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Screen position of a rendered word, refreshed on every draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordHitbox {
    pub area: Rect,
    pub node: NodeId,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,

    // Reference input
    pub reference_input: String,
    pub current_reference: Option<String>,
    pub status: Option<String>,

    // Rendering
    pub registry: BlockRegistry,
    pub language_tag: String,
    pub document: Document,
    pub words: Vec<NodeId>,
    pub selected_word: Option<usize>,
    pub inspector: InspectorSlot,

    // Content state
    pub content_scroll: u16,

    // Word areas for mouse hit-testing (updated during render)
    pub word_hitboxes: Vec<WordHitbox>,
}

impl App {
    pub fn new(registry: BlockRegistry, language_tag: impl Into<String>) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,

            reference_input: String::new(),
            current_reference: None,
            status: None,

            registry,
            language_tag: language_tag.into(),
            document: Document::new(),
            words: Vec::new(),
            selected_word: None,
            inspector: InspectorSlot::new(),

            content_scroll: 0,

            word_hitboxes: Vec::new(),
        }
    }

    /// Replace the passage with the rendering of `source`.
    pub fn open_reference(&mut self, source: &str) {
        let root = self.document.root();
        self.document.empty(root);
        self.inspector.close_modal();
        self.registry
            .process(&self.language_tag, source, &mut self.document, root);

        self.words = self
            .document
            .children(root)
            .iter()
            .flat_map(|line| self.document.children(*line).iter().copied())
            .filter(|node| self.document.is_activatable(*node))
            .collect();
        self.selected_word = if self.words.is_empty() { None } else { Some(0) };
        self.content_scroll = 0;
        self.current_reference = Some(source.trim().to_string());

        let lines = self.document.children(root);
        let unparseable = lines.iter().any(|line| {
            self.document
                .element(*line)
                .is_some_and(|el| el.class.as_deref() == Some(ERROR_CLASS))
        });
        self.status = if unparseable {
            Some("Unparseable reference".to_string())
        } else if lines.is_empty() {
            Some(format!("Nothing found for {}", source.trim()))
        } else {
            Some(format!("{} sentence(s), {} words", lines.len(), self.words.len()))
        };
    }

    pub fn submit_input(&mut self) {
        let source = self.reference_input.clone();
        if !source.trim().is_empty() {
            self.open_reference(&source);
        }
        self.input_mode = InputMode::Normal;
    }

    pub fn selected_node(&self) -> Option<NodeId> {
        self.selected_word.and_then(|i| self.words.get(i).copied())
    }

    // Word cursor
    pub fn select_next_word(&mut self) {
        let len = self.words.len();
        if len > 0 {
            let i = self.selected_word.map_or(0, |i| (i + 1).min(len - 1));
            self.selected_word = Some(i);
        }
    }

    pub fn select_prev_word(&mut self) {
        if !self.words.is_empty() {
            let i = self.selected_word.map_or(0, |i| i.saturating_sub(1));
            self.selected_word = Some(i);
        }
    }

    pub fn select_first_word(&mut self) {
        if !self.words.is_empty() {
            self.selected_word = Some(0);
        }
    }

    pub fn select_last_word(&mut self) {
        if !self.words.is_empty() {
            self.selected_word = Some(self.words.len() - 1);
        }
    }

    // Inspector
    pub fn activate_selected(&mut self) {
        if let Some(node) = self.selected_node() {
            self.activate_word(node);
        }
    }

    pub fn activate_word(&mut self, node: NodeId) {
        if let Some(i) = self.words.iter().position(|n| *n == node) {
            self.selected_word = Some(i);
        }
        inspect(&self.document, node, &mut self.inspector);
    }

    pub fn close_inspector(&mut self) {
        self.inspector.close_modal();
    }

    pub fn open_panel(&self) -> Option<&GlossPanel> {
        self.inspector.current()
    }

    pub fn word_at(&self, column: u16, row: u16) -> Option<NodeId> {
        self.word_hitboxes
            .iter()
            .find(|hit| {
                column >= hit.area.x
                    && column < hit.area.x + hit.area.width
                    && row >= hit.area.y
                    && row < hit.area.y + hit.area.height
            })
            .map(|hit| hit.node)
    }

    // Scrolling
    pub fn scroll_down(&mut self) {
        self.content_scroll = self.content_scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.content_scroll = self.content_scroll.saturating_sub(1);
    }
}
