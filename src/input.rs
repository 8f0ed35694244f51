use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, AppMode};

/// Handle a single key input event.
pub fn handle_input(app: &mut App, key: KeyEvent) {
    match app.mode {
        AppMode::Normal => handle_normal_mode(app, key),
        AppMode::Help => handle_help_mode(app, key),
    }
}

// ── Normal mode ─────────────────────────────────────────────────────────

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        // ── Quit ──
        KeyCode::F(10) | KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }

        // ── Manual refresh ("Update Info") ──
        KeyCode::F(5) | KeyCode::Char('r') | KeyCode::Enter | KeyCode::Char(' ') => app.request_refresh(),

        // ── Scrolling ──
        KeyCode::Up | KeyCode::Char('k') => app.scroll_up(),
        KeyCode::Down | KeyCode::Char('j') => app.scroll_down(),
        KeyCode::PageUp => app.page_up(),
        KeyCode::PageDown => app.page_down(),
        KeyCode::Home => app.scroll_home(),
        KeyCode::End => app.scroll_end(),

        KeyCode::Char('c') => app.cycle_color_scheme(),

        KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('h') => app.mode = AppMode::Help,

        _ => {}
    }
}

// ── Help overlay ────────────────────────────────────────────────────────

fn handle_help_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::F(10) => app.should_quit = true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }
        // Any other key closes help
        _ => app.mode = AppMode::Normal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoremonConfig;
    use crate::system::TopologyDescriptor;
    use std::sync::Arc;

    fn new_app() -> App {
        let topology = Arc::new(TopologyDescriptor::new(2, 4, None, None).unwrap());
        App::new(topology, &CoremonConfig::default())
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_input(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn refresh_keys_request_refresh() {
        for code in [KeyCode::F(5), KeyCode::Char('r'), KeyCode::Enter] {
            let mut app = new_app();
            press(&mut app, code);
            assert!(app.refresh_requested);
        }
    }

    #[test]
    fn help_opens_and_any_key_closes() {
        let mut app = new_app();
        press(&mut app, KeyCode::F(1));
        assert_eq!(app.mode, AppMode::Help);
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.mode, AppMode::Normal);
        assert!(!app.should_quit);
    }

    #[test]
    fn quit_keys() {
        let mut app = new_app();
        handle_input(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);

        let mut app = new_app();
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
