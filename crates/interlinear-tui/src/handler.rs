use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use crate::app::{App, InputMode};
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Editing => handle_editing_mode(app, key),
        InputMode::Normal if app.open_panel().is_some() => handle_inspector_keys(app, key),
        InputMode::Normal => handle_normal_mode(app, key),
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit_input(),
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Backspace => {
            app.reference_input.pop();
        }
        KeyCode::Char(c) => app.reference_input.push(c),
        _ => {}
    }
}

fn handle_inspector_keys(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Backspace => {
            app.close_inspector();
        }
        // Inspect the neighbouring word in place
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab => {
            app.select_next_word();
            app.activate_selected();
        }
        KeyCode::Left | KeyCode::Char('h') | KeyCode::BackTab => {
            app.select_prev_word();
            app.activate_selected();
        }
        _ => {}
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        // Quit
        KeyCode::Char('q') => app.should_quit = true,

        // Edit reference
        KeyCode::Char('/') | KeyCode::Char('i') => app.input_mode = InputMode::Editing,

        // Word cursor
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab => app.select_next_word(),
        KeyCode::Left | KeyCode::Char('h') | KeyCode::BackTab => app.select_prev_word(),
        KeyCode::Home | KeyCode::Char('g') => app.select_first_word(),
        KeyCode::End | KeyCode::Char('G') => app.select_last_word(),

        // Inspect
        KeyCode::Enter | KeyCode::Char(' ') => app.activate_selected(),

        // Scroll
        KeyCode::Down | KeyCode::Char('j') => app.scroll_down(),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_up(),
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => match app.word_at(mouse.column, mouse.row) {
            Some(node) => {
                app.input_mode = InputMode::Normal;
                app.activate_word(node);
            }
            None => app.close_inspector(),
        },
        MouseEventKind::ScrollDown => app.scroll_down(),
        MouseEventKind::ScrollUp => app.scroll_up(),
        _ => {}
    }
}
