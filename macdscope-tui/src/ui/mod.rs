//! Top-level UI layout — one active panel with a status bar.

pub mod status_bar;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::Frame;

use crate::app::{AppState, Panel};
use crate::panels::{
    HelpPanel, OscillatorChartPanel, PerformancePanel, PriceChartPanel, TradeTapePanel,
};
use crate::theme::Theme;

pub use status_bar::StatusBar;

/// Draw the entire UI.
pub fn draw(f: &mut Frame, app: &AppState, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(f.area());

    draw_panel(f, chunks[0], app, theme);

    f.render_widget(
        StatusBar::new(
            app.snapshot(),
            app.config(),
            app.status_message.as_ref(),
            theme,
        ),
        chunks[1],
    );
}

fn draw_panel(f: &mut Frame, area: Rect, app: &AppState, theme: &Theme) {
    let snapshot = app.snapshot();
    match app.active_panel {
        Panel::Price => {
            let title = format!("{} {}", app.config().symbol, app.config().interval);
            f.render_widget(PriceChartPanel::new(&app.overlay.price, &title, theme), area);
        }
        Panel::Oscillator => {
            f.render_widget(OscillatorChartPanel::new(&app.overlay.oscillator, theme), area)
        }
        Panel::Trades => f.render_widget(
            TradeTapePanel::new(snapshot.trades(), app.trade_scroll, theme),
            area,
        ),
        Panel::Performance => f.render_widget(
            PerformancePanel::new(snapshot.performance.as_ref(), theme),
            area,
        ),
        Panel::Help => f.render_widget(HelpPanel::new(theme), area),
    }
}
