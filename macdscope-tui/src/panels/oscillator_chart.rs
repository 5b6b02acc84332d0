//! Oscillator chart panel - histogram around a zero line, value and signal
//! lines, crossover markers at aligned trade entries.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, Widget},
};

use macdscope_core::domain::Timestamp;
use macdscope_core::overlay::{y_range, HistogramBar, LineRole, MarkerRole};
use macdscope_core::Trace;

use super::{axis_label, column, padded, value_to_row};
use crate::theme::Theme;

pub struct OscillatorChartPanel<'a> {
    traces: &'a [Trace],
    theme: &'a Theme,
}

impl<'a> OscillatorChartPanel<'a> {
    pub fn new(traces: &'a [Trace], theme: &'a Theme) -> Self {
        Self { traces, theme }
    }

    fn histogram(&self) -> &'a [HistogramBar] {
        self.traces
            .iter()
            .find_map(|t| match t {
                Trace::Histogram { bars } => Some(bars.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    fn series_name(&self) -> &'a str {
        self.traces
            .iter()
            .find_map(|t| match t {
                Trace::Line {
                    role: LineRole::Oscillator,
                    name,
                    ..
                } => Some(name.as_str()),
                _ => None,
            })
            .unwrap_or("Oscillator")
    }

    fn last_of(&self, role: LineRole) -> Option<f64> {
        self.traces
            .iter()
            .find_map(|t| t.line(role))
            .and_then(|points| points.last())
            .map(|(_, v)| *v)
    }
}

impl<'a> Widget for OscillatorChartPanel<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bars = self.histogram();
        if bars.is_empty() {
            let block = Block::default()
                .title(" Oscillator [No Data] ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(self.theme.muted))
                .style(Style::default().bg(self.theme.background));
            block.render(area, buf);
            return;
        }

        let value = self.last_of(LineRole::Oscillator).unwrap_or_default();
        let signal = self.last_of(LineRole::Signal).unwrap_or_default();
        let title = format!(
            " {} | value {} | signal {} | hist {} ",
            self.series_name(),
            axis_label(value),
            axis_label(signal),
            axis_label(value - signal),
        );
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.accent))
            .style(Style::default().bg(self.theme.background));
        let inner = block.inner(area);
        block.render(area, buf);

        let label_width: u16 = 10;
        let plot_left = inner.x + label_width;
        let plot_top = inner.y;
        let plot_width = inner.width.saturating_sub(label_width);
        let plot_height = inner.height;
        if plot_width == 0 || plot_height == 0 {
            return;
        }

        let visible = &bars[bars.len().saturating_sub(plot_width as usize)..];
        let stamps: Vec<Timestamp> = visible.iter().map(|b| b.timestamp).collect();
        let (lo, hi) = y_range(self.traces).unwrap_or((0.0, 0.0));
        let (lo, hi) = padded((lo.min(0.0), hi.max(0.0)));
        let row = |v: f64| plot_top + value_to_row(v, lo, hi, plot_height);
        let zero = row(0.0);

        for (value, y) in [(hi, plot_top), (0.0, zero), (lo, plot_top + plot_height - 1)] {
            buf.set_string(
                inner.x,
                y,
                format!("{:>9}", axis_label(value)),
                Style::default().fg(self.theme.muted),
            );
        }

        // Zero line
        let muted = Style::default().fg(self.theme.muted);
        for x in plot_left..plot_left + plot_width {
            buf.set_string(x, zero, "─", muted);
        }

        // Histogram: bar from the zero line to the value
        for (i, bar) in visible.iter().enumerate() {
            let x = plot_left + i as u16;
            let style = Style::default().fg(self.theme.tone_color(bar.tone));
            let y = row(bar.value);
            let (top, bottom) = if y <= zero { (y, zero) } else { (zero, y) };
            for py in top..=bottom {
                buf.set_string(x, py, "█", style);
            }
        }

        // Value and signal lines
        for (role, glyph, color) in [
            (LineRole::Oscillator, "•", self.theme.accent),
            (LineRole::Signal, "·", self.theme.neutral),
        ] {
            let Some(points) = self.traces.iter().find_map(|t| t.line(role)) else {
                continue;
            };
            let style = Style::default().fg(color);
            for (t, v) in points {
                if let Some(i) = column(&stamps, t) {
                    buf.set_string(plot_left + i as u16, row(*v), glyph, style);
                }
            }
        }

        // Crossover markers
        if let Some(markers) = self
            .traces
            .iter()
            .find_map(|t| t.markers(MarkerRole::Crossover))
        {
            for m in markers {
                if let Some(i) = column(&stamps, &m.timestamp) {
                    let style = Style::default()
                        .fg(self.theme.tone_color(m.tone))
                        .add_modifier(Modifier::BOLD);
                    buf.set_string(plot_left + i as u16, row(m.y), "◆", style);
                }
            }
        }
    }
}
