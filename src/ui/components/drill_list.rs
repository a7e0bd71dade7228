use std::collections::BTreeSet;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};
use tierdrill::catalog::{Drill, DrillId, Tier};

use crate::ui::theme::Theme;

/// Drills of one tier, marking those the user has already finished.
pub struct DrillList<'a> {
    pub tier: Tier,
    pub drills: &'a [&'a Drill],
    pub completed: &'a BTreeSet<DrillId>,
    pub selected: usize,
    pub theme: &'a Theme,
}

impl Widget for DrillList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let palette = &self.theme.palette;

        let block = Block::bordered()
            .title(format!(" Tier {} ", self.tier))
            .border_style(Style::default().fg(palette.frame_active))
            .style(Style::default().bg(palette.background));
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines: Vec<Line> = Vec::new();
        for (i, drill) in self.drills.iter().enumerate() {
            let is_selected = i == self.selected;
            let done = self.completed.contains(&drill.id);
            let prefix = if is_selected { " \u{25b6} " } else { "   " };
            let mark = if done { "\u{2713} " } else { "  " };

            let title_style = Style::default()
                .fg(if is_selected { palette.selection } else { palette.text })
                .add_modifier(if is_selected {
                    Modifier::BOLD
                } else {
                    Modifier::empty()
                });

            lines.push(Line::from(vec![
                Span::styled(prefix, Style::default().fg(palette.selection)),
                Span::styled(mark, Style::default().fg(palette.good)),
                Span::styled(drill.title.as_str(), title_style),
            ]));

            if is_selected {
                let preview: String = drill.body.chars().take(inner.width.saturating_sub(7) as usize).collect();
                lines.push(Line::from(Span::styled(
                    format!("       {preview}"),
                    Style::default().fg(palette.muted),
                )));
            }
        }

        if self.drills.is_empty() {
            lines.push(Line::from(Span::styled(
                "   No drills in this tier",
                Style::default().fg(palette.muted),
            )));
        }

        Paragraph::new(lines).render(inner, buf);
    }
}
