use interlinear_core::render::ERROR_CLASS;
use interlinear_core::{Document, GlossPanel, NodeId};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use crate::app::{App, InputMode, WordHitbox};

/// Where a word landed in the laid-out passage, relative to the content area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WordPlacement {
    row: u16,
    col: u16,
    width: u16,
    node: NodeId,
}

struct PassageLayout {
    lines: Vec<Line<'static>>,
    words: Vec<WordPlacement>,
}

/// Rows being filled for one passage.
struct RowFiller {
    width: usize,
    selected: Option<NodeId>,
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    col: usize,
    words: Vec<WordPlacement>,
}

impl RowFiller {
    fn break_row(&mut self) {
        if !self.spans.is_empty() {
            self.lines.push(Line::from(std::mem::take(&mut self.spans)));
        }
        self.col = 0;
    }

    /// Place words with no space between them. The run moves to a new row
    /// as a whole when it does not fit.
    fn push_run(&mut self, run: &mut Vec<(NodeId, String, usize)>) {
        let run_width: usize = run.iter().map(|(_, _, w)| w).sum();
        if self.col > 0 && self.col + run_width > self.width {
            self.break_row();
        }
        for (node, text, width) in run.drain(..) {
            self.words.push(WordPlacement {
                row: self.lines.len() as u16,
                col: self.col as u16,
                width: width as u16,
                node,
            });
            let style = if Some(node) == self.selected {
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            self.spans.push(Span::styled(text, style));
            self.col += width;
        }
    }

    /// Spaces at the start of a row are dropped.
    fn push_space(&mut self, text: String, width: usize) {
        if self.col > 0 {
            self.spans.push(Span::raw(text));
            self.col += width;
        }
    }
}

/// Lay out each rendered line, wrapping only where a space separates words.
/// Leading spaces after a wrap are dropped; a blank line separates sentences.
fn layout_passage(document: &Document, width: u16, selected: Option<NodeId>) -> PassageLayout {
    let mut rows = RowFiller {
        width: width.max(1) as usize,
        selected,
        lines: Vec::new(),
        spans: Vec::new(),
        col: 0,
        words: Vec::new(),
    };

    for line_node in document.children(document.root()) {
        let Some(line_el) = document.element(*line_node) else {
            continue;
        };
        if line_el.class.as_deref() == Some(ERROR_CLASS) {
            rows.lines.push(Line::styled(
                document.text_content(*line_node),
                Style::default().fg(Color::Red),
            ));
            rows.lines.push(Line::default());
            continue;
        }

        let mut run = Vec::new();
        for child in document.children(*line_node) {
            let text = document.text_content(*child);
            let span_width = Span::raw(text.as_str()).width();

            if document.is_activatable(*child) {
                run.push((*child, text, span_width));
            } else {
                rows.push_run(&mut run);
                rows.push_space(text, span_width);
            }
        }
        rows.push_run(&mut run);

        rows.break_row();
        rows.lines.push(Line::default());
    }

    PassageLayout {
        lines: rows.lines,
        words: rows.words,
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, input, body, footer
    let [header_area, input_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(frame, header_area);
    render_input(app, frame, input_area);
    render_passage(app, frame, body_area);
    render_footer(app, frame, footer_area);

    if let Some(panel) = app.open_panel() {
        render_gloss_panel(panel, frame, area);
    }
}

fn render_header(frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" Interlinear ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let border_style = match app.input_mode {
        InputMode::Editing => Style::default().fg(Color::Yellow),
        InputMode::Normal => Style::default().fg(Color::DarkGray),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(" Reference ");

    let input = Paragraph::new(app.reference_input.as_str()).block(block);
    frame.render_widget(input, area);

    if app.input_mode == InputMode::Editing {
        let cursor_x = area.x + 1 + Span::raw(app.reference_input.as_str()).width() as u16;
        frame.set_cursor_position((cursor_x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

fn render_passage(app: &mut App, frame: &mut Frame, area: Rect) {
    let title = match &app.current_reference {
        Some(reference) => format!(" {} ", reference),
        None => " Passage ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title);
    let inner = block.inner(area);

    let layout = layout_passage(&app.document, inner.width, app.selected_node());

    // Keep the selected word on screen
    if let Some(selected) = app.selected_node() {
        if let Some(placement) = layout.words.iter().find(|w| w.node == selected) {
            let height = inner.height.max(1);
            if placement.row < app.content_scroll {
                app.content_scroll = placement.row;
            } else if placement.row >= app.content_scroll + height {
                app.content_scroll = placement.row + 1 - height;
            }
        }
    }
    let max_scroll = (layout.lines.len() as u16).saturating_sub(inner.height);
    app.content_scroll = app.content_scroll.min(max_scroll);

    app.word_hitboxes = layout
        .words
        .iter()
        .filter(|w| w.row >= app.content_scroll && w.row - app.content_scroll < inner.height)
        .map(|w| WordHitbox {
            area: Rect::new(inner.x + w.col, inner.y + w.row - app.content_scroll, w.width, 1),
            node: w.node,
        })
        .collect();

    let paragraph = Paragraph::new(layout.lines)
        .block(block)
        .scroll((app.content_scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().fg(Color::White);

    let hints: &[(&str, &str)] = match (app.input_mode, app.open_panel().is_some()) {
        (InputMode::Editing, _) => &[("Enter", "render"), ("Esc", "cancel")],
        (InputMode::Normal, true) => &[("Esc", "close"), ("←/→", "neighbour")],
        (InputMode::Normal, false) => &[
            ("/", "reference"),
            ("←/→", "word"),
            ("Enter", "inspect"),
            ("↑/↓", "scroll"),
            ("q", "quit"),
        ],
    };

    let mut spans = Vec::new();
    for (key, label) in hints {
        spans.push(Span::styled(format!(" {} ", key), key_style));
        spans.push(Span::styled(format!(" {} ", label), label_style));
    }
    if let Some(status) = &app.status {
        spans.push(Span::styled(
            format!("  {}", status),
            Style::default().fg(Color::DarkGray),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_gloss_panel(panel: &GlossPanel, frame: &mut Frame, area: Rect) {
    // Calculate popup size and position (centered)
    let popup_width = 50.min(area.width.saturating_sub(4));
    let popup_height = (panel.features.len() as u16 + 5).min(area.height.saturating_sub(4));

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} ", panel.title));

    let mut lines = Vec::new();
    match &panel.summary {
        Some(summary) => lines.push(Line::styled(
            summary.clone(),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        None => lines.push(Line::styled(
            "annotation unavailable",
            Style::default().fg(Color::Red),
        )),
    }
    lines.push(Line::default());
    for feature in &panel.features {
        lines.push(Line::from(format!(" • {}", feature)));
    }

    let body = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(body, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::sample_app;

    fn row_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_layout_keeps_punctuation_attached() {
        let mut app = sample_app();
        app.open_reference("Mark 1:2");
        let layout = layout_passage(&app.document, 80, None);
        assert_eq!(row_text(&layout.lines[0]), "Καθὼς γέγραπται, ");
        assert_eq!(layout.words.len(), 3);
        assert_eq!(layout.words[1].col, 6);
        assert_eq!(layout.words[2].col, 15);
    }

    #[test]
    fn test_layout_wraps_between_words() {
        let mut app = sample_app();
        app.open_reference("Mark 1:2");
        let layout = layout_passage(&app.document, 10, None);
        assert_eq!(row_text(&layout.lines[0]), "Καθὼς ");
        assert_eq!(row_text(&layout.lines[1]), "γέγραπται, ");
        assert_eq!(layout.words[1].row, 1);
        assert_eq!(layout.words[1].col, 0);
    }

    #[test]
    fn test_layout_never_splits_unspaced_words() {
        let mut app = sample_app();
        app.open_reference("Mark 1:2");
        let layout = layout_passage(&app.document, 15, None);
        assert_eq!(row_text(&layout.lines[0]), "Καθὼς ");
        assert_eq!(row_text(&layout.lines[1]), "γέγραπται, ");
        assert_eq!(layout.words[1].row, 1);
        assert_eq!(layout.words[2].row, 1);
        assert_eq!(layout.words[2].col, 9);
    }

    #[test]
    fn test_layout_overlong_run_keeps_its_own_row() {
        let mut app = sample_app();
        app.open_reference("Mark 1:2");
        let layout = layout_passage(&app.document, 4, None);
        assert_eq!(row_text(&layout.lines[0]), "Καθὼς ");
        assert_eq!(row_text(&layout.lines[1]), "γέγραπται, ");
        assert_eq!(layout.lines.len(), 3);
    }

    #[test]
    fn test_layout_separates_sentences() {
        let mut app = sample_app();
        app.open_reference("Mark 1:1-2");
        let layout = layout_passage(&app.document, 80, None);
        assert_eq!(layout.lines.len(), 4);
        assert_eq!(layout.words[0].row, 0);
        assert_eq!(layout.words[1].row, 2);
    }

    #[test]
    fn test_layout_shows_unparseable_source() {
        let mut app = sample_app();
        app.open_reference("hello there");
        let layout = layout_passage(&app.document, 80, None);
        assert_eq!(row_text(&layout.lines[0]), "hello there");
        assert!(layout.words.is_empty());
    }
}
