//! Performance panel - classified readings of the last backtest.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::Style,
    text::Line,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget},
};

use macdscope_core::domain::PerformanceSummary;
use macdscope_core::readings;

use crate::theme::Theme;

pub struct PerformancePanel<'a> {
    performance: Option<&'a PerformanceSummary>,
    theme: &'a Theme,
}

impl<'a> PerformancePanel<'a> {
    pub fn new(performance: Option<&'a PerformanceSummary>, theme: &'a Theme) -> Self {
        Self { performance, theme }
    }
}

impl<'a> Widget for PerformancePanel<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Performance ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.accent))
            .style(Style::default().bg(self.theme.background));

        let Some(perf) = self.performance else {
            Paragraph::new(Line::styled(
                "No backtest yet. Press [b] to run one.",
                Style::default().fg(self.theme.muted),
            ))
            .block(block)
            .render(area, buf);
            return;
        };

        let header = Row::new(vec![
            Cell::from("Metric").style(self.theme.header()),
            Cell::from("Value").style(self.theme.header()),
        ]);
        let rows = readings(perf).into_iter().map(|r| {
            Row::new(vec![
                Cell::from(r.metric.label()).style(Style::default().fg(self.theme.text_primary)),
                Cell::from(r.formatted()).style(Style::default().fg(self.theme.tone_color(r.tone))),
            ])
        });

        Table::new(rows, [Constraint::Length(18), Constraint::Min(10)])
            .header(header)
            .block(block)
            .column_spacing(2)
            .render(area, buf);
    }
}
