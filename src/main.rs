mod app;
mod event;
mod ui;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use tierdrill::config::Config;
use tierdrill::logging;
use tierdrill::store::json_store::JsonStore;

use app::{App, AppScreen};
use event::{AppEvent, EventHandler};
use ui::components::dashboard::Dashboard;
use ui::components::drill_list::DrillList;
use ui::components::progress_bar::DrillProgress;
use ui::components::stats_sidebar::StatsSidebar;
use ui::components::tier_list::TierList;
use ui::components::typing_area::TypingArea;
use ui::layout::{ScreenLayout, TypingLayout, panel};
use ui::login::{LoginAction, LoginPanel};
use ui::theme::Theme;

#[derive(Parser)]
#[command(name = "tierdrill", version, about = "Terminal typing game with tiered drills")]
struct Cli {
    #[arg(short, long, help = "User name to pre-fill on the login screen")]
    user: Option<String>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, help = "Load drills from this JSON file")]
    drills: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_default();
    if let Some(user) = cli.user {
        config.default_user = user;
    }
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    if let Some(drills) = cli.drills {
        config.drills_path = Some(drills);
    }
    config.validate();

    // Logging is optional; the game runs without it
    if let Err(err) = logging::init(&JsonStore::default_dir(), &config.log_filter) {
        eprintln!("Logging disabled: {err:#}");
    }

    let theme = Theme::load(&config.theme).unwrap_or_else(|| {
        tracing::warn!(
            theme = %config.theme,
            available = ?Theme::available_themes(),
            "unknown theme, using default"
        );
        Theme::default()
    });
    let theme: &'static Theme = Box::leak(Box::new(theme));
    let mut app = App::new(config, theme)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(250));

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!(error = %err, "terminal loop failed");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick => app.tick(),
            AppEvent::Resize => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::Login => handle_login_key(app, key),
        AppScreen::Menu => handle_menu_key(app, key),
        AppScreen::DrillSelect => handle_drill_select_key(app, key),
        AppScreen::Typing => handle_typing_key(app, key),
        AppScreen::Result => handle_result_key(app, key),
    }
}

fn handle_login_key(app: &mut App, key: KeyEvent) {
    match app.login.handle(key) {
        LoginAction::Continue => {}
        LoginAction::Submit(mode) => app.submit_login(mode),
        LoginAction::Quit => app.should_quit = true,
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('u') => app.logout(),
        KeyCode::Up | KeyCode::Char('k') => app.tier_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.tier_next(),
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => app.open_selected_tier(),
        KeyCode::Char('r') => app.start_random_drill(),
        _ => {}
    }
}

fn handle_drill_select_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('q') => app.go_to_menu(),
        KeyCode::Up | KeyCode::Char('k') => app.drill_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.drill_next(),
        KeyCode::Enter => app.start_selected_drill(),
        _ => {}
    }
}

fn handle_typing_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.abandon_drill(),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Enter => app.type_char('\n'),
        KeyCode::Tab => app.type_char('\t'),
        KeyCode::Char(ch) => app.type_char(ch),
        _ => {}
    }
}

fn handle_result_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('r') => app.retry_drill(),
        KeyCode::Enter | KeyCode::Char('n') | KeyCode::Char(' ') => app.start_next_drill(),
        KeyCode::Char('q') | KeyCode::Esc => app.go_to_menu(),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let bg = Block::default().style(Style::default().bg(app.theme.palette.background));
    frame.render_widget(bg, area);

    let layout = ScreenLayout::new(area);
    match app.screen {
        AppScreen::Login => render_login(frame, app, &layout),
        AppScreen::Menu => render_menu(frame, app, &layout),
        AppScreen::DrillSelect => render_drill_select(frame, app, &layout),
        AppScreen::Typing => render_typing(frame, app, &layout),
        AppScreen::Result => render_result(frame, app, &layout),
    }
}

fn render_title(frame: &mut ratatui::Frame, app: &App, area: Rect, info: String) {
    let palette = &app.theme.palette;
    let title = Paragraph::new(Line::from(vec![
        Span::styled(
            " tierdrill ",
            Style::default()
                .fg(palette.title_fg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(info, Style::default().fg(palette.muted)),
    ]))
    .style(Style::default().bg(palette.title_bg));
    frame.render_widget(title, area);
}

/// User, unlocked tier, best speed and rank.
fn progress_summary(app: &App) -> String {
    let Some(user) = &app.user else {
        return String::new();
    };
    let best = app
        .best_wpm
        .map_or_else(|| "-".to_string(), |wpm| format!("{wpm:.0}"));
    format!(
        "| {} | Tier {} unlocked | Best {best} WPM | {}",
        user.name,
        app.unlocked,
        app.rank()
    )
}

fn render_footer(frame: &mut ratatui::Frame, app: &App, area: Rect, hints: &str) {
    let palette = &app.theme.palette;
    let line = match &app.status {
        Some(status) => Line::from(Span::styled(
            format!(" {status}"),
            Style::default().fg(palette.fair),
        )),
        None => Line::from(Span::styled(
            hints.to_string(),
            Style::default().fg(palette.muted),
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_login(frame: &mut ratatui::Frame, app: &App, layout: &ScreenLayout) {
    render_title(frame, app, layout.title, String::new());
    frame.render_widget(
        LoginPanel {
            form: &app.login,
            theme: app.theme,
        },
        panel(layout.body, 48, 9),
    );
    render_footer(
        frame,
        app,
        layout.footer,
        " [Enter] Log in  [Ctrl-N] Register  [Tab] Switch field  [Esc] Quit ",
    );
}

fn render_menu(frame: &mut ratatui::Frame, app: &App, layout: &ScreenLayout) {
    render_title(frame, app, layout.title, progress_summary(app));

    let height = app.tiers.len() as u16 + 2;
    frame.render_widget(
        TierList::new(&app.tiers, app.tier_selected, app.theme),
        panel(layout.body, 56, height),
    );

    render_footer(
        frame,
        app,
        layout.footer,
        " [Enter] Open tier  [r] Random drill  [j/k] Move  [u] Switch user  [q] Quit ",
    );
}

fn render_drill_select(frame: &mut ratatui::Frame, app: &App, layout: &ScreenLayout) {
    render_title(frame, app, layout.title, progress_summary(app));

    let drills = app.drills_in_selected_tier();
    if let Some(tier) = app.selected_tier() {
        // One row per drill, one for the preview, two for the border
        let height = drills.len().max(1) as u16 + 3;
        frame.render_widget(
            DrillList {
                tier,
                drills: &drills,
                completed: &app.completed,
                selected: app.drill_selected,
                theme: app.theme,
            },
            panel(layout.body, 64, height),
        );
    }

    render_footer(frame, app, layout.footer, " [Enter] Start  [j/k] Move  [Esc] Tiers ");
}

fn render_typing(frame: &mut ratatui::Frame, app: &App, layout: &ScreenLayout) {
    let Some(active) = &app.active else {
        return;
    };
    let typing = TypingLayout::new(layout.body);
    let stats = app.live_stats();
    let title = active.title();

    let info = if typing.sidebar.is_some() {
        progress_summary(app)
    } else {
        stats.header_text()
    };
    render_title(frame, app, layout.title, info);

    frame.render_widget(TypingArea::new(&active.engine, &title, app.theme), typing.text);
    if let Some(area) = typing.progress {
        let progress = DrillProgress::new(
            active.buffer.char_count(),
            active.engine.target().len(),
            app.theme,
        );
        frame.render_widget(progress, area);
    }
    if let Some(area) = typing.sidebar {
        frame.render_widget(StatsSidebar::new(&stats, app.theme), area);
    }

    render_footer(frame, app, layout.footer, " [Esc] Abandon  [Backspace] Delete ");
}

fn render_result(frame: &mut ratatui::Frame, app: &App, layout: &ScreenLayout) {
    render_title(frame, app, layout.title, progress_summary(app));

    if let Some(ref result) = app.last_result {
        let dashboard = Dashboard {
            result,
            best_streak: app.last_best_streak,
            rank: app.rank(),
            newly_unlocked: app.newly_unlocked,
            save_error: app.save_error.as_deref(),
            theme: app.theme,
        };
        frame.render_widget(dashboard, panel(layout.body, 60, 18));
    }
}
