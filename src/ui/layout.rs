use ratatui::layout::{Constraint, Flex, Layout, Rect};

/// Stats column shown beside the typing area.
const SIDEBAR_WIDTH: u16 = 26;
/// The sidebar is dropped before the typing column gets narrower than this.
const MIN_TEXT_WIDTH: u16 = 52;
/// Progress gauge, border included.
const PROGRESS_HEIGHT: u16 = 3;
/// The gauge is dropped before the typing area gets shorter than this.
const MIN_TEXT_HEIGHT: u16 = 6;

/// Title bar, body and footer hint line; shared by every screen.
pub struct ScreenLayout {
    pub title: Rect,
    pub body: Rect,
    pub footer: Rect,
}

impl ScreenLayout {
    pub fn new(area: Rect) -> Self {
        let [title, body, footer] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(area);
        Self { title, body, footer }
    }
}

/// Body of the typing screen. Live stats go in the sidebar when it fits,
/// otherwise the caller puts them in the title bar.
pub struct TypingLayout {
    pub text: Rect,
    pub progress: Option<Rect>,
    pub sidebar: Option<Rect>,
}

impl TypingLayout {
    pub fn new(body: Rect) -> Self {
        let (main, sidebar) = if body.width >= MIN_TEXT_WIDTH + SIDEBAR_WIDTH {
            let [main, sidebar] = Layout::horizontal([
                Constraint::Min(MIN_TEXT_WIDTH),
                Constraint::Length(SIDEBAR_WIDTH),
            ])
            .areas(body);
            (main, Some(sidebar))
        } else {
            (body, None)
        };

        let (text, progress) = if main.height >= MIN_TEXT_HEIGHT + PROGRESS_HEIGHT {
            let [text, progress] = Layout::vertical([
                Constraint::Min(MIN_TEXT_HEIGHT),
                Constraint::Length(PROGRESS_HEIGHT),
            ])
            .areas(main);
            (text, Some(progress))
        } else {
            (main, None)
        };

        Self {
            text,
            progress,
            sidebar,
        }
    }
}

/// A `width` x `height` box centred in `area`, shrunk to fit it.
pub fn panel(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    cell
}
