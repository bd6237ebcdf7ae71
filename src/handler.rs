use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Screen};

/// Handle a key event based on the current screen.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // Global Ctrl+C handler, works on every screen
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.running = false;
        return;
    }

    match &app.screen {
        Screen::HostList if app.search_query.is_some() => handle_search(app, key),
        Screen::HostList => handle_host_list(app, key),
        Screen::HostDetail { .. } => handle_host_detail(app, key),
        Screen::GroupPicker => handle_group_picker(app, key),
        Screen::Help => handle_help(app, key),
    }
}

fn handle_host_list(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            app.running = false;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.select_next();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.select_prev();
        }
        KeyCode::Enter => {
            app.connect_selected();
        }
        KeyCode::Char('/') => {
            app.start_search();
        }
        KeyCode::Char('g') => {
            if app.groups.is_empty() {
                app.set_status("No groups in this inventory.", true);
            } else {
                app.open_group_picker();
            }
        }
        KeyCode::Char('s') => {
            app.cycle_sort();
        }
        KeyCode::Char('i') => {
            if let Some(index) = app.selected_index() {
                app.screen = Screen::HostDetail { index };
            }
        }
        KeyCode::Char('?') => {
            app.screen = Screen::Help;
        }
        _ => {}
    }
}

fn handle_search(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.cancel_search();
        }
        KeyCode::Enter => {
            app.connect_selected();
        }
        KeyCode::Down | KeyCode::Tab => {
            app.select_next();
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.select_prev();
        }
        KeyCode::Backspace => {
            app.pop_search_char();
        }
        KeyCode::Char(c) => {
            app.push_search_char(c);
        }
        _ => {}
    }
}

fn handle_host_detail(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('i') => {
            app.screen = Screen::HostList;
        }
        KeyCode::Enter => {
            app.screen = Screen::HostList;
            app.connect_selected();
        }
        _ => {}
    }
}

fn handle_group_picker(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('g') => {
            app.screen = Screen::HostList;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.group_picker_next();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.group_picker_prev();
        }
        KeyCode::Enter => {
            app.pick_group();
        }
        _ => {}
    }
}

fn handle_help(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            app.screen = Screen::HostList;
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::SortMode;
    use crate::inventory::model::{Inventory, InventoryEntry};

    fn app() -> App {
        let mut web = InventoryEntry::new("web1");
        web.groups.insert("webservers".to_string());
        let inventory = Inventory {
            entries: vec![web, InventoryEntry::new("db1")],
            groups: vec!["webservers".to_string()],
        };
        App::new(inventory, SortMode::Original)
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn test_ctrl_c_quits_from_anywhere() {
        let mut app = app();
        app.screen = Screen::Help;
        handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(!app.running);
        assert!(app.pending_connect.is_none());
    }

    #[test]
    fn test_enter_connects_selected() {
        let mut app = app();
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);
        assert!(!app.running);
        assert_eq!(app.pending_connect, Some(1));
    }

    #[test]
    fn test_search_typing_does_not_trigger_commands() {
        let mut app = app();
        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Char('q'));
        assert!(app.running);
        assert_eq!(app.search_query.as_deref(), Some("q"));
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.pending_connect, Some(1));
    }

    #[test]
    fn test_esc_leaves_search_before_quitting() {
        let mut app = app();
        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Esc);
        assert!(app.running);
        assert!(app.search_query.is_none());
        press(&mut app, KeyCode::Esc);
        assert!(!app.running);
    }

    #[test]
    fn test_detail_and_help_overlays() {
        let mut app = app();
        press(&mut app, KeyCode::Char('i'));
        assert_eq!(app.screen, Screen::HostDetail { index: 0 });
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen, Screen::HostList);
        press(&mut app, KeyCode::Char('?'));
        assert_eq!(app.screen, Screen::Help);
        press(&mut app, KeyCode::Char('?'));
        assert_eq!(app.screen, Screen::HostList);
    }

    #[test]
    fn test_group_picker_via_keys() {
        let mut app = app();
        press(&mut app, KeyCode::Char('g'));
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen, Screen::HostList);
        assert_eq!(app.view, vec![0]);
    }
}
