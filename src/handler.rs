use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use tracing::debug;

use crate::app::{App, Focus, ANALYSIS_SHORTCUT, BACKTEST_SHORTCUT, CHART_SHORTCUT};
use crate::palette::FunctionTab;
use crate::tasks::Backend;
use crate::tui::AppEvent;

const PAGE_SCROLL: u16 = 10;
const WHEEL_SCROLL: u16 = 3;

pub fn handle_event(app: &mut App, event: AppEvent, backend: &Backend) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key, backend),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick(),
        AppEvent::StatusPoll => backend.check_status(),
        AppEvent::Backend(event) => app.apply_backend(event),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent, backend: &Backend) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // Global keys that work in any mode
    if ctrl && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q')) {
        app.should_quit = true;
        return;
    }

    // Popups swallow everything while open
    if app.show_model_picker {
        handle_model_picker(app, key, backend);
        return;
    }
    if app.show_attach_input {
        handle_attach_input(app, key);
        return;
    }

    if handle_shortcut(app, key, backend) {
        return;
    }

    match app.focus {
        Focus::Input => handle_input(app, key, backend),
        Focus::Chat => handle_chat(app, key),
        Focus::Functions => handle_functions(app, key),
    }
}

/// Function keys and Ctrl chords available from every pane. Returns true if consumed.
fn handle_shortcut(app: &mut App, key: KeyEvent, backend: &Backend) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::F(2) => app.open_model_picker(),
        KeyCode::F(3) => app.insert_command(ANALYSIS_SHORTCUT),
        KeyCode::F(4) => app.insert_command(CHART_SHORTCUT),
        KeyCode::F(5) => {
            debug!("reloading market snapshot");
            backend.load_market();
        }
        KeyCode::F(6) => app.insert_command(BACKTEST_SHORTCUT),
        KeyCode::F(7) => app.open_attach_input(),
        KeyCode::F(8) => {
            if let Some(dispatch) = app.run_analysis() {
                backend.dispatch(dispatch);
            }
        }
        KeyCode::F(9) => app.toggle_market_panel(),
        KeyCode::Char('o') if ctrl => app.open_workflow(),
        KeyCode::Char('s') if ctrl => app.save_latest_chart(),
        KeyCode::Char('y') if ctrl => app.copy_latest_chart(),
        KeyCode::Tab => app.next_focus(),
        KeyCode::BackTab => app.prev_focus(),
        KeyCode::PageUp => app.scroll_chat_up(PAGE_SCROLL),
        KeyCode::PageDown => app.scroll_chat_down(PAGE_SCROLL),
        _ => return false,
    }
    true
}

fn handle_model_picker(app: &mut App, key: KeyEvent, backend: &Backend) {
    match key.code {
        KeyCode::Esc | KeyCode::F(2) => app.show_model_picker = false,
        KeyCode::Char('j') | KeyCode::Down => app.model_picker_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.model_picker_nav_up(),
        KeyCode::Enter => {
            if let Some(model) = app.confirm_model_choice() {
                backend.switch_model(model);
            }
        }
        _ => {}
    }
}

fn handle_attach_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_attach_input(),
        KeyCode::Enter => app.confirm_attach(),
        KeyCode::Backspace => app.attach_backspace(),
        KeyCode::Left => app.attach_cursor = app.attach_cursor.saturating_sub(1),
        KeyCode::Right => {
            let char_count = app.attach_input.chars().count();
            app.attach_cursor = (app.attach_cursor + 1).min(char_count);
        }
        KeyCode::Char(c) => app.attach_insert_char(c),
        _ => {}
    }
}

fn handle_input(app: &mut App, key: KeyEvent, backend: &Backend) {
    match key.code {
        KeyCode::Esc => app.focus = Focus::Chat,
        KeyCode::Enter
            if key.modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) =>
        {
            app.insert_newline();
        }
        KeyCode::Enter => {
            if let Some(dispatch) = app.submit() {
                backend.dispatch(dispatch);
            }
        }
        KeyCode::Char('j') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.insert_newline();
        }
        KeyCode::Backspace => app.delete_before_cursor(),
        KeyCode::Delete => app.delete_at_cursor(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        KeyCode::Home => app.cursor_home(),
        KeyCode::End => app.cursor_end(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => app.insert_char(c),
        _ => {}
    }
}

fn handle_chat(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('j') | KeyCode::Down => app.scroll_chat_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_chat_up(1),
        KeyCode::Char('g') | KeyCode::Home => app.scroll_chat_to_top(),
        KeyCode::Char('G') | KeyCode::End => app.scroll_chat_to_bottom(),
        KeyCode::Char('i') | KeyCode::Enter | KeyCode::Esc => app.focus = Focus::Input,
        _ => {}
    }
}

fn handle_functions(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('j') | KeyCode::Down => app.function_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.function_nav_up(),
        KeyCode::Char('l') | KeyCode::Right => app.set_function_tab(app.function_tab.next()),
        KeyCode::Char('h') | KeyCode::Left => app.set_function_tab(app.function_tab.prev()),
        KeyCode::Char('1') => app.set_function_tab(FunctionTab::Chat),
        KeyCode::Char('2') => app.set_function_tab(FunctionTab::Analysis),
        KeyCode::Char('3') => app.set_function_tab(FunctionTab::Tools),
        KeyCode::Enter => app.select_function(),
        KeyCode::Char('i') | KeyCode::Esc => app.focus = Focus::Input,
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let in_chat = app
        .chat_area
        .map(|r| point_in_rect(mouse.column, mouse.row, r))
        .unwrap_or(false);
    if !in_chat {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_chat_down(WHEEL_SCROLL),
        MouseEventKind::ScrollUp => app.scroll_chat_up(WHEEL_SCROLL),
        _ => {}
    }
}
