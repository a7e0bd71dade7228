use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::ui::theme::Theme;

/// Live numbers for the running drill.
#[derive(Clone, Debug, Default)]
pub struct LiveStats {
    pub smoothed_wpm: f64,
    pub accuracy: f64,
    pub current_streak: u32,
    pub best_streak: u32,
    pub errors: usize,
    pub elapsed_secs: f64,
}

impl LiveStats {
    pub fn header_text(&self) -> String {
        format!(
            " WPM: {:.0} | Acc: {:.1}% | Streak: {} (best {}) | Errors: {}",
            self.smoothed_wpm, self.accuracy, self.current_streak, self.best_streak, self.errors
        )
    }
}

pub struct StatsSidebar<'a> {
    stats: &'a LiveStats,
    theme: &'a Theme,
}

impl<'a> StatsSidebar<'a> {
    pub fn new(stats: &'a LiveStats, theme: &'a Theme) -> Self {
        Self { stats, theme }
    }
}

impl Widget for StatsSidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let palette = &self.theme.palette;
        let stats = self.stats;

        let acc_color = palette.accuracy(stats.accuracy);

        let lines = vec![
            Line::from(vec![
                Span::styled("WPM: ", Style::default().fg(palette.text)),
                Span::styled(
                    format!("{:.0}", stats.smoothed_wpm),
                    Style::default().fg(palette.speed),
                ),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Accuracy: ", Style::default().fg(palette.text)),
                Span::styled(format!("{:.1}%", stats.accuracy), Style::default().fg(acc_color)),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Streak: ", Style::default().fg(palette.text)),
                Span::styled(
                    format!("{}", stats.current_streak),
                    Style::default().fg(palette.streak),
                ),
            ]),
            Line::from(vec![
                Span::styled("Best:   ", Style::default().fg(palette.text)),
                Span::styled(
                    format!("{}", stats.best_streak),
                    Style::default().fg(palette.streak),
                ),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Errors: ", Style::default().fg(palette.text)),
                Span::styled(format!("{}", stats.errors), Style::default().fg(palette.poor)),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Time: ", Style::default().fg(palette.text)),
                Span::styled(
                    format!("{:.1}s", stats.elapsed_secs),
                    Style::default().fg(palette.text),
                ),
            ]),
        ];

        let block = Block::bordered()
            .title(" Stats ")
            .border_style(Style::default().fg(palette.frame))
            .style(Style::default().bg(palette.background));

        Paragraph::new(lines).block(block).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_text() {
        let stats = LiveStats {
            smoothed_wpm: 41.6,
            accuracy: 97.5,
            current_streak: 3,
            best_streak: 12,
            errors: 1,
            elapsed_secs: 9.0,
        };
        assert_eq!(
            stats.header_text(),
            " WPM: 42 | Acc: 97.5% | Streak: 3 (best 12) | Errors: 1"
        );
    }
}
