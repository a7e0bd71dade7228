use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoginField {
    Name,
    Password,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoginMode {
    LogIn,
    Register,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoginAction {
    Continue,
    Submit(LoginMode),
    Quit,
}

/// Name and password being typed on the sign-in screen.
#[derive(Clone, Debug)]
pub struct LoginForm {
    pub name: String,
    pub password: String,
    pub focus: LoginField,
    /// Why the last attempt was rejected.
    pub error: Option<String>,
}

impl LoginForm {
    /// Start with `name` filled in; focus goes straight to the password when
    /// there is one.
    pub fn new(name: &str) -> Self {
        let name = name.trim().to_string();
        let focus = if name.is_empty() {
            LoginField::Name
        } else {
            LoginField::Password
        };
        Self {
            name,
            password: String::new(),
            focus,
            error: None,
        }
    }

    pub fn handle(&mut self, key: KeyEvent) -> LoginAction {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return LoginAction::Quit,
            KeyCode::Enter => return LoginAction::Submit(LoginMode::LogIn),
            KeyCode::Char('n') if ctrl => return LoginAction::Submit(LoginMode::Register),
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.focus = match self.focus {
                    LoginField::Name => LoginField::Password,
                    LoginField::Password => LoginField::Name,
                };
            }
            KeyCode::Char('u') if ctrl => self.field_mut().clear(),
            KeyCode::Backspace => {
                self.field_mut().pop();
            }
            KeyCode::Char(ch) if !ctrl => self.field_mut().push(ch),
            _ => {}
        }
        LoginAction::Continue
    }

    fn field_mut(&mut self) -> &mut String {
        match self.focus {
            LoginField::Name => &mut self.name,
            LoginField::Password => &mut self.password,
        }
    }
}

pub struct LoginPanel<'a> {
    pub form: &'a LoginForm,
    pub theme: &'a Theme,
}

impl Widget for LoginPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let palette = &self.theme.palette;
        let form = self.form;

        let field = |label: &'static str, value: String, which: LoginField| {
            let focused = form.focus == which;
            let marker = if focused { "\u{25b6} " } else { "  " };
            let value_style = if focused {
                Style::default().fg(palette.selection).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(palette.text)
            };
            Line::from(vec![
                Span::styled(marker, Style::default().fg(palette.selection)),
                Span::styled(label, Style::default().fg(palette.muted)),
                Span::styled(value, value_style),
                Span::styled(if focused { "_" } else { "" }, Style::default().fg(palette.caret_bg)),
            ])
        };

        let mut lines = vec![
            Line::from(""),
            field("User      ", form.name.clone(), LoginField::Name),
            Line::from(""),
            field(
                "Password  ",
                "\u{2022}".repeat(form.password.chars().count()),
                LoginField::Password,
            ),
            Line::from(""),
        ];
        if let Some(err) = &form.error {
            lines.push(Line::from(Span::styled(
                format!("  {err}"),
                Style::default().fg(palette.poor),
            )));
        }

        Paragraph::new(lines)
            .block(
                Block::bordered()
                    .title(" Sign in ")
                    .title_alignment(Alignment::Center)
                    .border_style(Style::default().fg(palette.frame_active))
                    .style(Style::default().bg(palette.background)),
            )
            .render(area, buf);
    }
}
