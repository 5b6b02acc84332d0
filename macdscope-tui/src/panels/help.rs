//! Help panel - keyboard shortcuts.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::theme::Theme;

pub const KEY_BINDINGS: &[(&str, &str)] = &[
    ("1-5 / Tab", "Switch panel"),
    ("r", "Refetch market data (retry after an error)"),
    ("b", "Run backtest with the current config"),
    ("s", "Start / stop live stream"),
    ("[ / ]", "Previous / next interval"),
    ("- / +", "Fewer / more days back"),
    ("p / n", "Previous / next symbol"),
    ("j / k", "Scroll trades"),
    ("x", "Clear results"),
    ("q", "Quit"),
];

pub struct HelpPanel<'a> {
    theme: &'a Theme,
}

impl<'a> HelpPanel<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }
}

impl<'a> Widget for HelpPanel<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines: Vec<Line> = KEY_BINDINGS
            .iter()
            .map(|(key, action)| {
                Line::from(vec![
                    Span::styled(format!("  {key:<12}"), self.theme.header()),
                    Span::styled(*action, Style::default().fg(self.theme.text_primary)),
                ])
            })
            .collect();

        Paragraph::new(lines)
            .block(
                Block::default()
                    .title(" Keys ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.theme.accent))
                    .style(Style::default().bg(self.theme.background)),
            )
            .render(area, buf);
    }
}
