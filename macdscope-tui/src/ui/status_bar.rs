//! Bottom status bar — config, connection and stream flags, load/error state, panel hints.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use macdscope_core::domain::ConfigModel;
use macdscope_core::ResultSnapshot;

use crate::app::{Panel, StatusLevel};
use crate::theme::Theme;

pub struct StatusBar<'a> {
    snapshot: &'a ResultSnapshot,
    config: &'a ConfigModel,
    message: Option<&'a (String, StatusLevel)>,
    theme: &'a Theme,
}

impl<'a> StatusBar<'a> {
    pub fn new(
        snapshot: &'a ResultSnapshot,
        config: &'a ConfigModel,
        message: Option<&'a (String, StatusLevel)>,
        theme: &'a Theme,
    ) -> Self {
        Self {
            snapshot,
            config,
            message,
            theme,
        }
    }
}

impl<'a> Widget for StatusBar<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let sep = || Span::styled(" | ", Style::default().fg(self.theme.muted));
        let mut spans: Vec<Span> = vec![Span::styled(
            format!(
                " {} {} {}d",
                self.config.symbol, self.config.interval, self.config.days_back
            ),
            Style::default()
                .fg(self.theme.text_primary)
                .add_modifier(Modifier::BOLD),
        )];

        spans.push(sep());
        spans.push(if self.snapshot.connected {
            Span::styled("● online", Style::default().fg(self.theme.positive))
        } else {
            Span::styled("○ offline", Style::default().fg(self.theme.negative))
        });

        if self.snapshot.live_trading {
            spans.push(sep());
            spans.push(Span::styled(
                "LIVE",
                Style::default()
                    .fg(self.theme.positive)
                    .add_modifier(Modifier::BOLD),
            ));
        }

        if self.snapshot.loading {
            spans.push(sep());
            spans.push(Span::styled(
                "Loading...",
                Style::default().fg(self.theme.warning),
            ));
        } else if let Some(error) = &self.snapshot.error {
            spans.push(sep());
            spans.push(Span::styled(
                format!("Error: {error}"),
                Style::default().fg(self.theme.negative),
            ));
            spans.push(Span::styled(" [r] retry", Style::default().fg(self.theme.accent)));
        } else if let Some((msg, level)) = self.message {
            let color = match level {
                StatusLevel::Info => self.theme.accent,
                StatusLevel::Warning => self.theme.warning,
            };
            spans.push(sep());
            spans.push(Span::styled(msg.as_str(), Style::default().fg(color)));
        }

        spans.push(sep());
        let hints: Vec<String> = Panel::ALL
            .iter()
            .map(|p| format!("{}:{}", p.index() + 1, p.label()))
            .collect();
        spans.push(Span::styled(
            hints.join(" "),
            Style::default().fg(self.theme.muted),
        ));

        Paragraph::new(Line::from(spans))
            .style(Style::default().bg(self.theme.background))
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::buffer_text;

    fn render(snapshot: &ResultSnapshot, message: Option<&(String, StatusLevel)>) -> String {
        let theme = Theme::default();
        let config = ConfigModel::default();
        let area = Rect::new(0, 0, 140, 1);
        let mut buf = Buffer::empty(area);
        StatusBar::new(snapshot, &config, message, &theme).render(area, &mut buf);
        buffer_text(&buf)
    }

    #[test]
    fn test_status_bar_shows_config_and_offline() {
        let text = render(&ResultSnapshot::default(), None);
        assert!(text.contains("ROSEUSDT 5m 7d"));
        assert!(text.contains("offline"));
        assert!(!text.contains("LIVE"));
        assert!(text.contains("1:Price 2:Oscillator"));
    }

    #[test]
    fn test_status_bar_loading() {
        let snapshot = ResultSnapshot {
            loading: true,
            connected: true,
            live_trading: true,
            ..ResultSnapshot::default()
        };
        let text = render(&snapshot, None);
        assert!(text.contains("Loading..."));
        assert!(text.contains("online"));
        assert!(text.contains("LIVE"));
    }

    #[test]
    fn test_status_bar_error_offers_retry() {
        let snapshot = ResultSnapshot {
            error: Some("insufficient data".into()),
            ..ResultSnapshot::default()
        };
        let message = ("Loaded 10 bars".to_string(), StatusLevel::Info);
        let text = render(&snapshot, Some(&message));
        assert!(text.contains("Error: insufficient data [r] retry"));
        assert!(!text.contains("Loaded 10 bars"));
    }

    #[test]
    fn test_status_bar_info_message() {
        let message = ("Backtest complete: 2 trades".to_string(), StatusLevel::Info);
        let text = render(&ResultSnapshot::default(), Some(&message));
        assert!(text.contains("Backtest complete: 2 trades"));
    }
}
