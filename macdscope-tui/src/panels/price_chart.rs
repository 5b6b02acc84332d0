//! Price chart panel - candles with trend line and trade markers
//!
//! Renders the price view traces using direct buffer writes:
//! - Each candle = 1 terminal column, newest bars on the right
//! - Body: block char, green if close >= open, pink otherwise
//! - Trend line: dots in the trend color
//! - Entry markers `▲`, exit markers `▼` colored by trade outcome

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, Widget},
};

use macdscope_core::domain::{Ohlcv, Timestamp};
use macdscope_core::overlay::{LineRole, MarkerRole};
use macdscope_core::{overlay::y_range, Trace};

use super::{axis_label, column, padded, value_to_row};
use crate::theme::Theme;

pub struct PriceChartPanel<'a> {
    traces: &'a [Trace],
    title: &'a str,
    theme: &'a Theme,
}

impl<'a> PriceChartPanel<'a> {
    pub fn new(traces: &'a [Trace], title: &'a str, theme: &'a Theme) -> Self {
        Self {
            traces,
            title,
            theme,
        }
    }

    fn candles(&self) -> &'a [(Timestamp, Ohlcv)] {
        self.traces
            .iter()
            .find_map(|t| match t {
                Trace::Candles { points } => Some(points.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    fn trend(&self) -> Option<(&'a str, &'a [(Timestamp, f64)])> {
        self.traces.iter().find_map(|t| match t {
            Trace::Line {
                role: LineRole::Trend,
                name,
                points,
            } => Some((name.as_str(), points.as_slice())),
            _ => None,
        })
    }
}

impl<'a> Widget for PriceChartPanel<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let candles = self.candles();
        if candles.is_empty() {
            let block = Block::default()
                .title(format!(" Price: {} [No Data] ", self.title))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(self.theme.muted))
                .style(Style::default().bg(self.theme.background));
            block.render(area, buf);
            return;
        }

        let entries = self
            .traces
            .iter()
            .find_map(|t| t.markers(MarkerRole::Entry))
            .unwrap_or(&[]);
        let exits = self
            .traces
            .iter()
            .find_map(|t| t.markers(MarkerRole::Exit))
            .unwrap_or(&[]);

        let title = format!(
            " {} | {} bars | {} trades ",
            self.title,
            candles.len(),
            exits.len()
        );
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.accent))
            .style(Style::default().bg(self.theme.background));
        let inner = block.inner(area);
        block.render(area, buf);

        // Left margin for Y-axis labels, bottom row for the info line
        let label_width: u16 = 10;
        let plot_left = inner.x + label_width;
        let plot_top = inner.y;
        let plot_width = inner.width.saturating_sub(label_width);
        let plot_height = inner.height.saturating_sub(1);
        if plot_width == 0 || plot_height == 0 {
            return;
        }

        let visible = &candles[candles.len().saturating_sub(plot_width as usize)..];
        let stamps: Vec<Timestamp> = visible.iter().map(|(t, _)| *t).collect();
        let Some(range) = y_range(self.traces) else {
            return;
        };
        let (lo, hi) = padded(range);
        let row = |v: f64| plot_top + value_to_row(v, lo, hi, plot_height);

        // Y-axis labels
        for (value, y) in [
            (hi, 0u16),
            ((hi + lo) / 2.0, plot_height / 2),
            (lo, plot_height.saturating_sub(1)),
        ] {
            buf.set_string(
                inner.x,
                plot_top + y,
                format!("{:>9}", axis_label(value)),
                Style::default().fg(self.theme.muted),
            );
        }

        // Candles
        for (i, (_, bar)) in visible.iter().enumerate() {
            let x = plot_left + i as u16;
            let style = Style::default().fg(if bar.is_up() {
                self.theme.positive
            } else {
                self.theme.negative
            });
            let high_y = row(bar.high);
            let low_y = row(bar.low);
            let body_top = row(bar.open.max(bar.close));
            let body_bot = row(bar.open.min(bar.close));
            for y in high_y..body_top {
                buf.set_string(x, y, "│", style);
            }
            let body = if bar.is_up() { "\u{2588}" } else { "\u{2593}" };
            for y in body_top..=body_bot {
                buf.set_string(x, y, body, style);
            }
            for y in (body_bot + 1)..=low_y {
                buf.set_string(x, y, "│", style);
            }
        }

        // Trend line
        if let Some((_, points)) = self.trend() {
            let style = Style::default().fg(self.theme.trend);
            for (t, v) in points {
                if let Some(i) = column(&stamps, t) {
                    buf.set_string(plot_left + i as u16, row(*v), "·", style);
                }
            }
        }

        // Trade markers
        for (markers, glyph) in [(entries, "▲"), (exits, "▼")] {
            for m in markers {
                if let Some(i) = column(&stamps, &m.timestamp) {
                    let style = Style::default()
                        .fg(self.theme.tone_color(m.tone))
                        .add_modifier(Modifier::BOLD);
                    buf.set_string(plot_left + i as u16, row(m.y), glyph, style);
                }
            }
        }

        // Info line
        let info_y = plot_top + plot_height;
        let last_close = visible.last().map(|(_, b)| b.close).unwrap_or_default();
        let trend_name = self.trend().map(|(name, _)| name).unwrap_or("no trend");
        let info = format!(
            "last {} | {} | {} .. {}",
            axis_label(last_close),
            trend_name,
            stamps.first().map(Timestamp::short).unwrap_or_default(),
            stamps.last().map(Timestamp::short).unwrap_or_default(),
        );
        buf.set_stringn(
            plot_left,
            info_y,
            info,
            plot_width as usize,
            Style::default().fg(self.theme.muted),
        );
    }
}
