use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Widget};

use crate::ui::theme::Theme;

/// How far through the target text the user is.
pub struct DrillProgress<'a> {
    typed: usize,
    total: usize,
    theme: &'a Theme,
}

impl<'a> DrillProgress<'a> {
    pub fn new(typed: usize, total: usize, theme: &'a Theme) -> Self {
        Self {
            typed: typed.min(total),
            total,
            theme,
        }
    }

    fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.typed as f64 / self.total as f64
    }
}

impl Widget for DrillProgress<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let palette = &self.theme.palette;

        let block = Block::bordered()
            .title(" Progress ")
            .border_style(Style::default().fg(palette.frame));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let filled_width = (self.ratio() * inner.width as f64) as u16;
        for x in inner.x..inner.x + inner.width {
            let style = if x < inner.x + filled_width {
                Style::default().fg(palette.background).bg(palette.meter_fill)
            } else {
                Style::default().fg(palette.text).bg(palette.meter_track)
            };
            buf[(x, inner.y)].set_style(style);
        }

        let label = format!("{}/{}", self.typed, self.total);
        let label_x = inner.x + (inner.width.saturating_sub(label.len() as u16)) / 2;
        buf.set_string(label_x, inner.y, &label, Style::default().fg(palette.text));
    }
}
