use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};
use tierdrill::session::metrics::MetricsEngine;

use crate::ui::theme::Theme;

pub struct TypingArea<'a> {
    engine: &'a MetricsEngine,
    title: &'a str,
    theme: &'a Theme,
}

impl<'a> TypingArea<'a> {
    pub fn new(engine: &'a MetricsEngine, title: &'a str, theme: &'a Theme) -> Self {
        Self {
            engine,
            title,
            theme,
        }
    }
}

/// A render token maps a single target character to its display representation.
struct RenderToken {
    target_idx: usize,
    display: String,
    is_line_break: bool,
}

/// Expand target chars into render tokens, handling whitespace display.
fn build_render_tokens(target: &[char]) -> Vec<RenderToken> {
    let mut tokens = Vec::new();
    let mut col = 0usize;

    for (i, &ch) in target.iter().enumerate() {
        match ch {
            '\n' => {
                tokens.push(RenderToken {
                    target_idx: i,
                    display: "\u{21b5}".to_string(), // ↵
                    is_line_break: true,
                });
                col = 0;
            }
            '\t' => {
                let tab_width = 4 - (col % 4);
                let mut display = String::from("\u{2192}"); // →
                for _ in 1..tab_width {
                    display.push('\u{00b7}'); // ·
                }
                tokens.push(RenderToken {
                    target_idx: i,
                    display,
                    is_line_break: false,
                });
                col += tab_width;
            }
            _ => {
                tokens.push(RenderToken {
                    target_idx: i,
                    display: ch.to_string(),
                    is_line_break: false,
                });
                col += 1;
            }
        }
    }

    tokens
}

impl Widget for TypingArea<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let palette = &self.theme.palette;
        let target = self.engine.target();
        let input = self.engine.input();
        let cursor = input.len();
        let tokens = build_render_tokens(target);

        let incorrect = Style::default()
            .fg(palette.typed_miss)
            .bg(palette.typed_miss_bg)
            .add_modifier(Modifier::UNDERLINED);

        let mut lines: Vec<Vec<Span>> = vec![Vec::new()];

        for token in &tokens {
            let idx = token.target_idx;
            let (display, style) = match input.get(idx) {
                Some(&typed) if typed == target[idx] => (
                    token.display.clone(),
                    Style::default().fg(palette.typed_ok),
                ),
                // Whitespace markers stay visible even when mistyped
                Some(&typed) if target[idx] == '\n' || target[idx] == '\t' || typed.is_control() => {
                    (token.display.clone(), incorrect)
                }
                Some(&typed) => (typed.to_string(), incorrect),
                None if idx == cursor => (
                    token.display.clone(),
                    Style::default()
                        .fg(palette.caret_fg)
                        .bg(palette.caret_bg),
                ),
                None => (
                    token.display.clone(),
                    Style::default().fg(palette.muted),
                ),
            };

            if let Some(line) = lines.last_mut() {
                line.push(Span::styled(display, style));
            }
            if token.is_line_break {
                lines.push(Vec::new());
            }
        }

        // Characters typed past the end of the target
        if input.len() > target.len() {
            let overflow: String = input[target.len()..].iter().collect();
            if let Some(line) = lines.last_mut() {
                line.push(Span::styled(overflow, incorrect));
            }
        }

        let ratatui_lines: Vec<Line> = lines.into_iter().map(Line::from).collect();

        let block = Block::bordered()
            .title(format!(" {} ", self.title))
            .border_style(Style::default().fg(palette.frame_active))
            .style(Style::default().bg(palette.background));

        let paragraph = Paragraph::new(ratatui_lines)
            .block(block)
            .wrap(Wrap { trim: false });

        paragraph.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::theme::Theme;

    fn rendered_text(engine: &MetricsEngine) -> String {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 30, 4);
        let mut buf = Buffer::empty(area);
        TypingArea::new(engine, "drill", &theme).render(area, &mut buf);
        (1..29).map(|x| buf[(x, 1)].symbol().to_string()).collect()
    }

    #[test]
    fn test_render_tokens_basic() {
        let target: Vec<char> = "abc".chars().collect();
        let tokens = build_render_tokens(&target);
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].display, "a");
        assert_eq!(tokens[2].display, "c");
        assert!(!tokens[0].is_line_break);
    }

    #[test]
    fn test_render_tokens_newline() {
        let target: Vec<char> = "a\nb".chars().collect();
        let tokens = build_render_tokens(&target);
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1].display, "\u{21b5}");
        assert!(tokens[1].is_line_break);
        assert_eq!(tokens[1].target_idx, 1);
    }

    #[test]
    fn test_render_tokens_tab_alignment() {
        // "ab\t": col 2, so the tab fills 2 cells
        let target: Vec<char> = "ab\t".chars().collect();
        let tokens = build_render_tokens(&target);
        assert_eq!(tokens[2].display, "\u{2192}\u{00b7}");
    }

    #[test]
    fn test_mistyped_char_shows_typed_char() {
        let mut engine = MetricsEngine::new("cat");
        engine.update("cx");
        assert!(rendered_text(&engine).starts_with("cxt"));
    }

    #[test]
    fn test_overflow_is_rendered() {
        let mut engine = MetricsEngine::new("ab");
        engine.update("abz");
        assert!(rendered_text(&engine).starts_with("abz"));
    }
}
