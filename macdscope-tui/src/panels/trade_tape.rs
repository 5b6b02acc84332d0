//! Trade tape panel - list of all backtest trades with details
//!
//! Displays:
//! - Entry/exit timestamps and prices
//! - Return, colored by outcome
//! - Exit reason
//! - Holding time

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table, Widget},
};

use macdscope_core::classify;
use macdscope_core::domain::Trade;

use super::axis_label;
use crate::theme::Theme;

pub struct TradeTapePanel<'a> {
    trades: &'a [Trade],
    selected_index: usize,
    theme: &'a Theme,
}

impl<'a> TradeTapePanel<'a> {
    pub fn new(trades: &'a [Trade], selected_index: usize, theme: &'a Theme) -> Self {
        Self {
            trades,
            selected_index,
            theme,
        }
    }

    /// First row to show so the selection stays on screen.
    fn offset(&self, visible_rows: usize) -> usize {
        if visible_rows == 0 {
            return self.selected_index;
        }
        self.selected_index.saturating_sub(visible_rows - 1)
    }
}

/// `3d04h`, `2h15m` or `45m`.
pub fn format_holding(trade: &Trade) -> String {
    let minutes = trade.holding().num_minutes().max(0);
    let (days, hours, mins) = (minutes / 1440, (minutes % 1440) / 60, minutes % 60);
    if days > 0 {
        format!("{days}d{hours:02}h")
    } else if hours > 0 {
        format!("{hours}h{mins:02}m")
    } else {
        format!("{mins}m")
    }
}

impl<'a> Widget for TradeTapePanel<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(format!(" Trade Tape ({} trades) ", self.trades.len()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.accent))
            .style(Style::default().bg(self.theme.background));

        let header_cells = ["#", "Entry", "Exit", "Entry Px", "Exit Px", "Return", "Reason", "Held"]
            .iter()
            .map(|h| Cell::from(*h).style(self.theme.header()));
        let header = Row::new(header_cells).height(1);

        // borders + header
        let visible_rows = area.height.saturating_sub(3) as usize;
        let offset = self.offset(visible_rows);

        let rows = self
            .trades
            .iter()
            .enumerate()
            .skip(offset)
            .take(visible_rows)
            .map(|(i, trade)| {
                let style = if i == self.selected_index {
                    Style::default()
                        .bg(self.theme.neutral)
                        .fg(self.theme.text_primary)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(self.theme.text_primary)
                };
                let tone = classify(trade.return_pct, 0.0);

                Row::new(vec![
                    Cell::from(format!("{}", i + 1)),
                    Cell::from(trade.entry_date.short()),
                    Cell::from(trade.exit_date.short()),
                    Cell::from(axis_label(trade.entry_price)),
                    Cell::from(axis_label(trade.exit_price)),
                    Cell::from(trade.return_label())
                        .style(Style::default().fg(self.theme.tone_color(tone))),
                    Cell::from(trade.exit_reason.label().to_string()),
                    Cell::from(format_holding(trade)),
                ])
                .style(style)
                .height(1)
            });

        let widths = [
            Constraint::Length(4),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(9),
            Constraint::Length(14),
            Constraint::Min(6),
        ];

        Table::new(rows, widths)
            .header(header)
            .block(block)
            .column_spacing(1)
            .render(area, buf);
    }
}
