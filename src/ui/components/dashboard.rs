use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};
use tierdrill::catalog::Tier;
use tierdrill::engine::rank::Rank;
use tierdrill::session::result::SessionRecord;

use crate::ui::theme::Theme;

/// Result screen for a finished drill.
pub struct Dashboard<'a> {
    pub result: &'a SessionRecord,
    pub best_streak: u32,
    pub rank: Rank,
    pub newly_unlocked: Option<Tier>,
    pub save_error: Option<&'a str>,
    pub theme: &'a Theme,
}

impl Widget for Dashboard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let palette = &self.theme.palette;

        let block = Block::bordered()
            .title(" Drill Complete ")
            .border_style(Style::default().fg(palette.frame_active))
            .style(Style::default().bg(palette.background));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(2),
            ])
            .split(inner);

        let title = Paragraph::new(Line::from(Span::styled(
            "Results",
            Style::default()
                .fg(palette.selection)
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center);
        title.render(layout[0], buf);

        let wpm_text = format!("{:.0} WPM", self.result.wpm);
        let char_wpm_text = format!("  ({:.1} by characters)", self.result.char_wpm());
        Paragraph::new(Line::from(vec![
            Span::styled("  Speed:    ", Style::default().fg(palette.text)),
            Span::styled(
                wpm_text,
                Style::default()
                    .fg(palette.speed)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(char_wpm_text, Style::default().fg(palette.muted)),
        ]))
        .render(layout[1], buf);

        let acc_color = palette.accuracy(self.result.accuracy);
        Paragraph::new(Line::from(vec![
            Span::styled("  Accuracy: ", Style::default().fg(palette.text)),
            Span::styled(
                format!("{:.1}%", self.result.accuracy),
                Style::default().fg(acc_color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  (strict {:.1}%)", self.result.strict_accuracy),
                Style::default().fg(palette.muted),
            ),
        ]))
        .render(layout[2], buf);

        Paragraph::new(Line::from(vec![
            Span::styled("  Time:     ", Style::default().fg(palette.text)),
            Span::styled(
                format!("{:.1}s", self.result.duration_seconds),
                Style::default().fg(palette.text),
            ),
            Span::styled(
                format!("  Score {:.0}", self.result.score),
                Style::default().fg(palette.muted),
            ),
        ]))
        .render(layout[3], buf);

        Paragraph::new(Line::from(vec![
            Span::styled("  Streak:   ", Style::default().fg(palette.text)),
            Span::styled(
                format!("{} best", self.best_streak),
                Style::default().fg(palette.streak),
            ),
        ]))
        .render(layout[4], buf);

        let mut rank_spans = vec![
            Span::styled("  Rank:     ", Style::default().fg(palette.text)),
            Span::styled(
                self.rank.name(),
                Style::default()
                    .fg(palette.streak)
                    .add_modifier(Modifier::BOLD),
            ),
        ];
        if let Some(next) = self.rank.next_threshold() {
            rank_spans.push(Span::styled(
                format!("  (next at {next:.0} WPM)"),
                Style::default().fg(palette.muted),
            ));
        }
        Paragraph::new(Line::from(rank_spans)).render(layout[5], buf);

        let mut notes: Vec<Line> = Vec::new();
        if let Some(tier) = self.newly_unlocked {
            notes.push(Line::from(Span::styled(
                format!("  Tier {tier} unlocked!"),
                Style::default()
                    .fg(palette.good)
                    .add_modifier(Modifier::BOLD),
            )));
        }
        if let Some(err) = self.save_error {
            notes.push(Line::from(Span::styled(
                format!("  Session not saved: {err}"),
                Style::default().fg(palette.poor),
            )));
        }
        Paragraph::new(notes).render(layout[6], buf);

        Paragraph::new(Line::from(vec![
            Span::styled("  [Enter] Next drill  ", Style::default().fg(palette.selection)),
            Span::styled("[r] Retry  ", Style::default().fg(palette.selection)),
            Span::styled("[q] Tiers", Style::default().fg(palette.selection)),
        ]))
        .render(layout[7], buf);
    }
}
