//! Parrot/neon theme tokens for the macdscope TUI
//!
//! # Color Palette
//! - **Background**: Near-black / deep charcoal (base layer)
//! - **Accent**: Electric cyan (focus, titles, headers)
//! - **Positive**: Neon green (gains, winning trades, bullish histogram)
//! - **Negative**: Hot pink (losses, errors, bearish histogram)
//! - **Warning**: Neon orange (loading, rejected input)
//! - **Neutral**: Cool purple (unclassified readings, signal line)
//! - **Muted**: Steel blue (axis labels, hints)

use ratatui::style::{Color, Modifier, Style};

use macdscope_core::Tone;

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    /// Near-black background (primary surface)
    pub background: Color,
    /// Electric cyan accent (focus, highlights)
    pub accent: Color,
    /// Neon green (positive values, gains)
    pub positive: Color,
    /// Hot pink (negative values, losses)
    pub negative: Color,
    /// Neon orange (warnings, loading)
    pub warning: Color,
    /// Cool purple (neutral info, secondary)
    pub neutral: Color,
    /// Steel blue (muted text, disabled)
    pub muted: Color,
    /// Gold (trend line)
    pub trend: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::parrot_neon()
    }
}

impl Theme {
    pub fn parrot_neon() -> Self {
        Self {
            background: Color::Rgb(18, 18, 20),
            accent: Color::Rgb(0, 255, 255),
            positive: Color::Rgb(0, 255, 128),
            negative: Color::Rgb(255, 20, 147),
            warning: Color::Rgb(255, 140, 0),
            neutral: Color::Rgb(147, 112, 219),
            muted: Color::Rgb(100, 149, 237),
            trend: Color::Rgb(255, 215, 0),
            text_primary: Color::White,
            text_secondary: Color::Rgb(170, 170, 170),
        }
    }

    /// Color for a classified value.
    pub fn tone_color(&self, tone: Tone) -> Color {
        match tone {
            Tone::Positive => self.positive,
            Tone::Negative => self.negative,
            Tone::Neutral => self.text_secondary,
        }
    }

    pub fn panel_border(&self, active: bool) -> Style {
        if active {
            Style::default().fg(self.accent)
        } else {
            Style::default().fg(self.muted)
        }
    }

    pub fn panel_title(&self, active: bool) -> Style {
        let style = Style::default().fg(self.text_primary);
        if active {
            style.add_modifier(Modifier::BOLD)
        } else {
            style
        }
    }

    pub fn header(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_creation() {
        let theme = Theme::default();
        assert_eq!(theme.background, Color::Rgb(18, 18, 20));
        assert_eq!(theme.accent, Color::Rgb(0, 255, 255));
    }

    #[test]
    fn test_tone_color() {
        let theme = Theme::default();
        assert_eq!(theme.tone_color(Tone::Positive), theme.positive);
        assert_eq!(theme.tone_color(Tone::Negative), theme.negative);
        assert_eq!(theme.tone_color(Tone::Neutral), theme.text_secondary);
    }

    #[test]
    fn test_panel_border_follows_focus() {
        let theme = Theme::default();
        assert_eq!(theme.panel_border(true).fg, Some(theme.accent));
        assert_eq!(theme.panel_border(false).fg, Some(theme.muted));
    }
}
