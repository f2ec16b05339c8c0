//! Keyboard input handling.
//!
//! Maps terminal key events to [`App`] actions.  Adding a new keybinding is
//! a single match arm in the handler for the relevant screen.
//!
//! On the search screen printable keys edit the query, so only `Esc`,
//! `Enter`, the arrow keys and `Ctrl-C` act as commands there.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{App, Screen};

/// Process a single key event, updating app state accordingly.
///
/// Only reacts to key-press events (ignoring release / repeat) so that each
/// physical keypress triggers exactly one action.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit = true;
        return;
    }

    match app.screen {
        Screen::Home => handle_home(app, key),
        Screen::Search => handle_search(app, key),
        Screen::Details => handle_details(app, key),
    }
}

fn handle_home(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Char('/') | KeyCode::Char('s') => app.enter_search(),
        KeyCode::Tab => app.toggle_pane(),
        KeyCode::Enter => app.open_details(),
        KeyCode::Char('r') => app.refresh(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),
        _ => {}
    }
}

fn handle_search(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.back(),
        KeyCode::Enter => app.open_details(),
        KeyCode::Backspace => app.pop_char(),
        KeyCode::Down => app.select_next(),
        KeyCode::Up => app.select_previous(),
        KeyCode::Char(c) => app.push_char(c),
        _ => {}
    }
}

fn handle_details(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('q') => app.back(),
        KeyCode::Char('r') => app.refresh(),
        _ => {}
    }
}
