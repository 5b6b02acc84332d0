//! Keyboard input dispatch — global keys, then panel-specific handlers.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{AppState, Panel};

pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.running = false,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.running = false
        }
        KeyCode::Char(c @ '1'..='5') => {
            if let Some(panel) = Panel::from_index(c as usize - '1' as usize) {
                app.active_panel = panel;
            }
        }
        KeyCode::Tab => {
            app.active_panel = if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.active_panel.prev()
            } else {
                app.active_panel.next()
            };
        }
        KeyCode::BackTab => app.active_panel = app.active_panel.prev(),
        KeyCode::Char('r') => app.refetch(),
        KeyCode::Char('b') => app.run_backtest(),
        KeyCode::Char('s') => app.toggle_stream(),
        KeyCode::Char(']') => app.cycle_interval(true),
        KeyCode::Char('[') => app.cycle_interval(false),
        KeyCode::Char('+') | KeyCode::Char('=') => app.adjust_days(1),
        KeyCode::Char('-') => app.adjust_days(-1),
        KeyCode::Char('n') => app.cycle_symbol(true),
        KeyCode::Char('p') => app.cycle_symbol(false),
        KeyCode::Char('x') => app.clear(),
        _ => handle_panel_key(app, key),
    }
}

fn handle_panel_key(app: &mut AppState, key: KeyEvent) {
    if app.active_panel != Panel::Trades {
        return;
    }
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.scroll_trades(true),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_trades(false),
        KeyCode::Home | KeyCode::Char('g') => app.trade_scroll = 0,
        _ => {}
    }
}
