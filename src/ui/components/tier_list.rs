use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};
use tierdrill::engine::progression::{TierProgress, TierStatus};

use crate::ui::theme::Theme;

const BAR_WIDTH: usize = 15;

pub struct TierList<'a> {
    pub tiers: &'a [TierProgress],
    pub selected: usize,
    pub theme: &'a Theme,
}

impl<'a> TierList<'a> {
    pub fn new(tiers: &'a [TierProgress], selected: usize, theme: &'a Theme) -> Self {
        Self {
            tiers,
            selected,
            theme,
        }
    }
}

impl Widget for TierList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let palette = &self.theme.palette;

        let block = Block::bordered()
            .title(" Tiers ")
            .border_style(Style::default().fg(palette.frame))
            .style(Style::default().bg(palette.background));
        let inner = block.inner(area);
        block.render(area, buf);

        // Keep the selected row on screen
        let visible = inner.height as usize;
        let skip = (self.selected + 1).saturating_sub(visible);

        let mut lines: Vec<Line> = Vec::new();
        for (i, progress) in self.tiers.iter().enumerate().skip(skip).take(visible) {
            let is_selected = i == self.selected;
            let prefix = if is_selected { " \u{25b6} " } else { "   " };

            let (marker, label_color) = match progress.status {
                TierStatus::Locked => ("\u{2717}", palette.tier_locked),
                TierStatus::Available => ("\u{00b7}", palette.tier_open),
                TierStatus::Complete => ("\u{2713}", palette.tier_done),
            };
            let label_color = if is_selected && progress.status != TierStatus::Locked {
                palette.selection
            } else {
                label_color
            };
            let modifier = if is_selected {
                Modifier::BOLD
            } else {
                Modifier::empty()
            };

            let (done_bar, empty_bar) = bar_parts(progress.completed, progress.total, BAR_WIDTH);
            let status = match progress.status {
                TierStatus::Locked => "locked",
                TierStatus::Available => "",
                TierStatus::Complete => "complete",
            };

            lines.push(Line::from(vec![
                Span::styled(prefix, Style::default().fg(palette.selection)),
                Span::styled(format!("{marker} "), Style::default().fg(label_color)),
                Span::styled(
                    format!("Tier {:<3}", progress.tier),
                    Style::default().fg(label_color).add_modifier(modifier),
                ),
                Span::styled(done_bar, Style::default().fg(palette.meter_fill)),
                Span::styled(empty_bar, Style::default().fg(palette.meter_track)),
                Span::styled(
                    format!(" {}/{} {status}", progress.completed, progress.total),
                    Style::default().fg(palette.muted),
                ),
            ]));
        }

        Paragraph::new(lines).render(inner, buf);
    }
}

fn bar_parts(done: usize, total: usize, width: usize) -> (String, String) {
    if total == 0 {
        return (String::new(), "\u{2591}".repeat(width));
    }
    let done_cells = (done.min(total) * width) / total;
    (
        "\u{2588}".repeat(done_cells),
        "\u{2591}".repeat(width - done_cells),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_parts() {
        assert_eq!(bar_parts(0, 3, 6), (String::new(), "\u{2591}".repeat(6)));
        assert_eq!(bar_parts(1, 3, 6), ("\u{2588}".repeat(2), "\u{2591}".repeat(4)));
        assert_eq!(bar_parts(3, 3, 6), ("\u{2588}".repeat(6), String::new()));
    }

    #[test]
    fn test_bar_parts_handles_empty_and_overfull() {
        assert_eq!(bar_parts(0, 0, 4), (String::new(), "\u{2591}".repeat(4)));
        assert_eq!(bar_parts(9, 3, 6).0.chars().count(), 6);
    }
}
