use std::collections::BTreeSet;
use std::time::Instant;

use anyhow::Result;
use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{debug, info, warn};

use tierdrill::catalog::{Catalog, Drill, DrillId, Tier};
use tierdrill::config::Config;
use tierdrill::engine::progression::{ProgressionGate, TierProgress};
use tierdrill::engine::rank::Rank;
use tierdrill::session::input::{self, TypingBuffer};
use tierdrill::session::metrics::MetricsEngine;
use tierdrill::session::result::SessionRecord;
use tierdrill::session::smoothing::WpmWindow;
use tierdrill::store::json_store::JsonStore;
use tierdrill::store::memory::MemoryHistory;
use tierdrill::store::schema::UserRegistryData;
use tierdrill::store::{SessionHistory, StoreError, UserContext, UserId};

use crate::ui::components::stats_sidebar::LiveStats;
use crate::ui::login::{LoginForm, LoginMode};
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Login,
    Menu,
    DrillSelect,
    Typing,
    Result,
}

/// Where finished sessions and accounts are kept.
pub enum Backend {
    Disk(JsonStore),
    /// Used when the data dir is unusable; nothing survives a restart.
    Memory {
        history: MemoryHistory,
        users: UserRegistryData,
    },
}

impl Backend {
    pub fn memory() -> Self {
        Backend::Memory {
            history: MemoryHistory::new(),
            users: UserRegistryData::default(),
        }
    }

    pub fn history(&self) -> &dyn SessionHistory {
        match self {
            Backend::Disk(store) => store,
            Backend::Memory { history, .. } => history,
        }
    }

    fn register(&mut self, name: &str, password: &str) -> Result<UserContext, StoreError> {
        match self {
            Backend::Disk(store) => store.register(name, password),
            Backend::Memory { users, .. } => users.register(name, password),
        }
    }

    fn login(&self, name: &str, password: &str) -> Result<UserContext, StoreError> {
        match self {
            Backend::Disk(store) => store.login(name, password),
            Backend::Memory { users, .. } => users.login(name, password),
        }
    }

    fn sessions_for(&self, user: UserId) -> Result<Vec<SessionRecord>, StoreError> {
        match self {
            Backend::Disk(store) => store.sessions_for(user),
            Backend::Memory { history, .. } => history.sessions_for(user),
        }
    }

    fn best_wpm(&self, user: UserId) -> Result<Option<f64>, StoreError> {
        match self {
            Backend::Disk(store) => store.best_wpm(user),
            Backend::Memory { history, .. } => history.best_wpm(user),
        }
    }
}

/// The drill being typed, or the one just finished while the result is shown.
pub struct ActiveDrill {
    pub drill: Drill,
    pub engine: MetricsEngine,
    pub buffer: TypingBuffer,
    // Set on the first keystroke
    started: Option<(Instant, DateTime<Utc>)>,
}

impl ActiveDrill {
    fn new(drill: Drill) -> Self {
        let engine = MetricsEngine::new(&drill.body);
        Self {
            drill,
            engine,
            buffer: TypingBuffer::new(),
            started: None,
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.started
            .map_or(0.0, |(instant, _)| instant.elapsed().as_secs_f64())
    }

    pub fn title(&self) -> String {
        format!("Tier {} \u{00b7} {}", self.drill.tier, self.drill.title)
    }
}

pub struct App {
    pub screen: AppScreen,
    pub theme: &'static Theme,
    pub catalog: Catalog,
    pub backend: Backend,
    pub login: LoginForm,
    /// `None` until someone logs in.
    pub user: Option<UserContext>,
    pub unlocked: Tier,
    pub tiers: Vec<TierProgress>,
    pub tier_selected: usize,
    pub drill_selected: usize,
    pub completed: BTreeSet<DrillId>,
    pub best_wpm: Option<f64>,
    pub active: Option<ActiveDrill>,
    pub wpm_window: WpmWindow,
    pub last_result: Option<SessionRecord>,
    pub last_best_streak: u32,
    pub newly_unlocked: Option<Tier>,
    pub save_error: Option<String>,
    pub status: Option<String>,
    pub should_quit: bool,
    rng: SmallRng,
}

impl App {
    pub fn new(config: Config, theme: &'static Theme) -> Result<Self> {
        let catalog = Catalog::load(config.drills_path.as_deref())?;
        if catalog.is_empty() {
            warn!("drill catalog is empty");
        }
        let backend = match JsonStore::new() {
            Ok(store) => Backend::Disk(store),
            Err(e) => {
                warn!(error = %e, "data dir unavailable, sessions will not be saved");
                Backend::memory()
            }
        };
        Ok(Self::with_parts(config, theme, catalog, backend))
    }

    pub fn with_parts(
        config: Config,
        theme: &'static Theme,
        catalog: Catalog,
        backend: Backend,
    ) -> Self {
        info!(drills = catalog.len(), "catalog ready");
        Self {
            screen: AppScreen::Login,
            theme,
            catalog,
            backend,
            login: LoginForm::new(&config.default_user),
            user: None,
            unlocked: Tier::FIRST,
            tiers: Vec::new(),
            tier_selected: 0,
            drill_selected: 0,
            completed: BTreeSet::new(),
            best_wpm: None,
            active: None,
            wpm_window: WpmWindow::new(config.wpm_smoothing_window),
            last_result: None,
            last_best_streak: 0,
            newly_unlocked: None,
            save_error: None,
            status: None,
            should_quit: false,
            rng: SmallRng::from_entropy(),
        }
    }

    // --- Login ---

    pub fn submit_login(&mut self, mode: LoginMode) {
        let name = self.login.name.clone();
        let result = match mode {
            LoginMode::LogIn => self.backend.login(&name, &self.login.password),
            LoginMode::Register => self.backend.register(&name, &self.login.password),
        };
        match result {
            Ok(user) => {
                info!(user = %user.id, name = %user.name, ?mode, "user signed in");
                self.login.password.clear();
                self.login.error = None;
                self.user = Some(user);
                self.refresh_progress();
                self.tier_selected = self
                    .tiers
                    .iter()
                    .rposition(|t| t.tier <= self.unlocked)
                    .unwrap_or(0);
                self.status = None;
                self.screen = AppScreen::Menu;
            }
            Err(e) => {
                warn!(name = %name.trim(), ?mode, error = %e, "sign-in rejected");
                self.login.password.clear();
                self.login.error = Some(e.to_string());
            }
        }
    }

    pub fn logout(&mut self) {
        if let Some(user) = self.user.take() {
            info!(user = %user.id, "user logged out");
            self.login = LoginForm::new(&user.name);
        }
        self.active = None;
        self.last_result = None;
        self.completed.clear();
        self.best_wpm = None;
        self.tiers.clear();
        self.unlocked = Tier::FIRST;
        self.status = None;
        self.screen = AppScreen::Login;
    }

    /// Re-read the history and ask the gate again. Called after every append.
    pub fn refresh_progress(&mut self) {
        let Some(user) = self.user.as_ref().map(|u| u.id) else {
            return;
        };
        let gate = ProgressionGate::new(&self.catalog, self.backend.history());
        self.unlocked = gate.unlocked_up_to(user);
        match gate.tier_overview(user) {
            Ok(tiers) => self.tiers = tiers,
            Err(e) => {
                warn!(%user, error = %e, "tier overview unavailable");
                self.status = Some(format!("Could not read progress: {e}"));
            }
        }

        match self.backend.sessions_for(user) {
            Ok(sessions) => self.completed = sessions.iter().map(|s| s.drill_id).collect(),
            Err(e) => warn!(%user, error = %e, "session list unavailable"),
        }
        match self.backend.best_wpm(user) {
            Ok(best) => self.best_wpm = best,
            Err(e) => warn!(%user, error = %e, "best wpm unavailable"),
        }
        debug!(%user, unlocked = %self.unlocked, "progress refreshed");
    }

    pub fn rank(&self) -> Rank {
        Rank::for_wpm(self.best_wpm.unwrap_or(0.0))
    }

    // --- Menu ---

    pub fn selected_tier(&self) -> Option<Tier> {
        self.tiers.get(self.tier_selected).map(|t| t.tier)
    }

    pub fn tier_next(&mut self) {
        if !self.tiers.is_empty() {
            self.tier_selected = (self.tier_selected + 1) % self.tiers.len();
        }
    }

    pub fn tier_prev(&mut self) {
        if self.tiers.is_empty() {
            return;
        }
        self.tier_selected = self
            .tier_selected
            .checked_sub(1)
            .unwrap_or(self.tiers.len() - 1);
    }

    pub fn open_selected_tier(&mut self) {
        let Some(tier) = self.selected_tier() else {
            return;
        };
        if tier > self.unlocked {
            self.status = Some(format!(
                "Tier {tier} is locked. Finish every drill in the tiers below first."
            ));
            return;
        }
        let drills = self.drills_in_selected_tier();
        self.drill_selected = drills
            .iter()
            .position(|d| !self.completed.contains(&d.id))
            .unwrap_or(0);
        self.status = None;
        self.screen = AppScreen::DrillSelect;
    }

    pub fn start_random_drill(&mut self) {
        let drill = self
            .catalog
            .random_drill_up_to(self.unlocked, &mut self.rng)
            .cloned();
        match drill {
            Some(drill) => self.start_drill(drill),
            None => self.status = Some("No drills available".to_string()),
        }
    }

    // --- Drill selection ---

    pub fn drills_in_selected_tier(&self) -> Vec<&Drill> {
        match self.selected_tier() {
            Some(tier) => self.catalog.drills_in_tier(tier).collect(),
            None => Vec::new(),
        }
    }

    pub fn drill_next(&mut self) {
        let count = self.drills_in_selected_tier().len();
        if count > 0 {
            self.drill_selected = (self.drill_selected + 1) % count;
        }
    }

    pub fn drill_prev(&mut self) {
        let count = self.drills_in_selected_tier().len();
        if count > 0 {
            self.drill_selected = self.drill_selected.checked_sub(1).unwrap_or(count - 1);
        }
    }

    pub fn start_selected_drill(&mut self) {
        let drill = self
            .drills_in_selected_tier()
            .get(self.drill_selected)
            .map(|d| (*d).clone());
        if let Some(drill) = drill {
            self.start_drill(drill);
        }
    }

    // --- Typing ---

    pub fn start_drill(&mut self, drill: Drill) {
        if self.user.is_none() {
            self.screen = AppScreen::Login;
            return;
        }
        if drill.tier > self.unlocked {
            warn!(drill = %drill.id, tier = %drill.tier, unlocked = %self.unlocked, "refusing locked drill");
            self.status = Some(format!("Tier {} is locked", drill.tier));
            return;
        }
        debug!(drill = %drill.id, tier = %drill.tier, "starting drill");
        self.active = Some(ActiveDrill::new(drill));
        self.wpm_window.clear();
        self.newly_unlocked = None;
        self.save_error = None;
        self.status = None;
        self.screen = AppScreen::Typing;
    }

    pub fn type_char(&mut self, ch: char) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if active.started.is_none() {
            active.started = Some((Instant::now(), Utc::now()));
        }
        let snapshot = input::process_char(&mut active.engine, &mut active.buffer, ch);
        if snapshot.complete {
            self.finish_drill();
        }
    }

    pub fn backspace(&mut self) {
        if let Some(active) = self.active.as_mut() {
            input::process_backspace(&mut active.engine, &mut active.buffer);
        }
    }

    /// Sample the live WPM for the smoothed display.
    pub fn tick(&mut self) {
        if self.screen != AppScreen::Typing {
            return;
        }
        if let Some(active) = &self.active
            && active.started.is_some()
            && !active.engine.is_complete()
        {
            let wpm = active.engine.wpm(active.elapsed_secs() / 60.0);
            self.wpm_window.push(wpm);
        }
    }

    pub fn live_stats(&self) -> LiveStats {
        let Some(active) = &self.active else {
            return LiveStats::default();
        };
        let snapshot = active.engine.snapshot();
        LiveStats {
            smoothed_wpm: self.wpm_window.mean(),
            accuracy: snapshot.accuracy,
            current_streak: snapshot.current_streak,
            best_streak: snapshot.best_streak,
            errors: active.engine.cumulative_error_count(),
            elapsed_secs: active.elapsed_secs(),
        }
    }

    /// Leave without recording anything.
    pub fn abandon_drill(&mut self) {
        if let Some(active) = self.active.take() {
            debug!(drill = %active.drill.id, "drill abandoned");
        }
        self.screen = AppScreen::DrillSelect;
    }

    /// Record the finished attempt, then recompute the unlocked tier.
    fn finish_drill(&mut self) {
        let (Some(active), Some(user)) = (self.active.as_ref(), self.user.as_ref()) else {
            return;
        };
        let (duration_seconds, started_at) = match active.started {
            Some((instant, at)) => (instant.elapsed().as_secs_f64(), at),
            None => (0.0, Utc::now()),
        };
        let record = SessionRecord::from_attempt(
            user,
            &active.drill,
            &active.engine,
            active.buffer.as_str(),
            duration_seconds,
            started_at,
        );
        self.last_best_streak = active.engine.best_streak();

        self.save_error = match self.backend.history().append(&record) {
            Ok(()) => None,
            Err(e) => {
                warn!(user = %record.user_id, drill = %record.drill_id, error = %e, "failed to save session");
                Some(e.to_string())
            }
        };
        info!(
            user = %record.user_id,
            drill = %record.drill_id,
            wpm = record.wpm,
            accuracy = record.accuracy,
            "drill finished"
        );

        let previous = self.unlocked;
        self.refresh_progress();
        self.newly_unlocked = (self.unlocked > previous).then_some(self.unlocked);
        if let Some(tier) = self.newly_unlocked {
            info!(user = %record.user_id, %tier, "tier unlocked");
        }

        self.last_result = Some(record);
        self.screen = AppScreen::Result;
    }

    // --- Result ---

    /// Replay the last drill as the catalog currently has it.
    pub fn retry_drill(&mut self) {
        let drill = self
            .active
            .as_ref()
            .and_then(|a| self.catalog.drill(a.drill.id))
            .cloned();
        if let Some(drill) = drill {
            self.start_drill(drill);
        }
    }

    /// First unfinished drill within the unlocked tiers, else a random one.
    pub fn start_next_drill(&mut self) {
        let current = self.active.as_ref().map(|a| a.drill.id);
        let next = self
            .catalog
            .drills_up_to(self.unlocked)
            .into_iter()
            .find(|d| !self.completed.contains(&d.id) && Some(d.id) != current)
            .cloned();
        match next {
            Some(drill) => self.start_drill(drill),
            None => self.start_random_drill(),
        }
    }

    pub fn go_to_menu(&mut self) {
        self.status = None;
        self.screen = AppScreen::Menu;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn theme() -> &'static Theme {
        Box::leak(Box::new(Theme::default()))
    }

    fn drill(id: u32, tier: u32, body: &str) -> Drill {
        Drill {
            id: DrillId(id),
            title: format!("Drill {id}"),
            body: body.to_string(),
            tier: Tier::new(tier).unwrap(),
        }
    }

    fn logged_out_app() -> App {
        let catalog = Catalog::new(vec![
            drill(11, 1, "ab"),
            drill(12, 1, "cd"),
            drill(21, 2, "ef"),
        ])
        .unwrap();
        let mut config = Config::default();
        config.default_user = "tester".to_string();
        App::with_parts(config, theme(), catalog, Backend::memory())
    }

    fn test_app() -> App {
        let mut app = logged_out_app();
        app.login.password = "pw".to_string();
        app.submit_login(LoginMode::Register);
        app
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.type_char(ch);
        }
    }

    #[test]
    fn test_starts_on_login_with_configured_name() {
        let app = logged_out_app();
        assert_eq!(app.screen, AppScreen::Login);
        assert_eq!(app.login.name, "tester");
        assert!(app.user.is_none());
    }

    #[test]
    fn test_register_lands_on_menu_with_first_tier() {
        let app = test_app();
        assert_eq!(app.screen, AppScreen::Menu);
        assert_eq!(app.user.as_ref().map(|u| u.name.as_str()), Some("tester"));
        assert_eq!(app.unlocked, Tier::FIRST);
        assert_eq!(app.tiers.len(), 2);
        assert_eq!(app.rank(), Rank::Krill);
        assert!(app.login.password.is_empty());
    }

    #[test]
    fn test_wrong_password_stays_on_login() {
        let mut app = test_app();
        app.logout();
        assert_eq!(app.screen, AppScreen::Login);

        app.login.password = "nope".to_string();
        app.submit_login(LoginMode::LogIn);
        assert_eq!(app.screen, AppScreen::Login);
        assert!(app.user.is_none());
        assert!(app.login.error.is_some());

        app.login.password = "pw".to_string();
        app.submit_login(LoginMode::LogIn);
        assert_eq!(app.screen, AppScreen::Menu);
    }

    #[test]
    fn test_drill_needs_a_user() {
        let mut app = logged_out_app();
        app.start_drill(drill(11, 1, "ab"));
        assert_eq!(app.screen, AppScreen::Login);
        assert!(app.active.is_none());
    }

    #[test]
    fn test_locked_tier_cannot_be_opened() {
        let mut app = test_app();
        app.tier_selected = 1;
        app.open_selected_tier();
        assert_eq!(app.screen, AppScreen::Menu);
        assert!(app.status.as_deref().is_some_and(|s| s.contains("locked")));
    }

    #[test]
    fn test_finishing_tier_unlocks_next() {
        let mut app = test_app();
        app.open_selected_tier();
        assert_eq!(app.screen, AppScreen::DrillSelect);

        app.start_selected_drill();
        type_text(&mut app, "ab");
        assert_eq!(app.screen, AppScreen::Result);
        assert_eq!(app.newly_unlocked, None);
        assert!(app.completed.contains(&DrillId(11)));

        app.start_next_drill();
        assert_eq!(app.active.as_ref().map(|a| a.drill.id), Some(DrillId(12)));
        type_text(&mut app, "cd");
        assert_eq!(app.newly_unlocked, Some(Tier::new(2).unwrap()));
        assert_eq!(app.unlocked, Tier::new(2).unwrap());
        assert!(app.save_error.is_none());
    }

    #[test]
    fn test_best_wpm_comes_from_history() {
        let mut app = test_app();
        app.start_selected_drill();
        type_text(&mut app, "ab");
        let user = app.user.as_ref().unwrap().id;
        assert_eq!(app.best_wpm, app.backend.best_wpm(user).unwrap());
        assert!(app.best_wpm.is_some());
    }

    #[test]
    fn test_abandoned_drill_is_not_recorded() {
        let mut app = test_app();
        app.start_selected_drill();
        type_text(&mut app, "a");
        app.abandon_drill();
        assert_eq!(app.screen, AppScreen::DrillSelect);
        assert!(app.active.is_none());
        let user = app.user.as_ref().unwrap().id;
        assert!(app.backend.sessions_for(user).unwrap().is_empty());
    }

    #[test]
    fn test_mistakes_are_reported_in_result() {
        let mut app = test_app();
        app.start_selected_drill();
        type_text(&mut app, "x");
        app.backspace();
        type_text(&mut app, "ab");
        let result = app.last_result.as_ref().unwrap();
        assert!((result.accuracy - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(result.strict_accuracy, 100.0);
        assert_eq!(app.last_best_streak, 2);
    }

    #[test]
    fn test_retry_replays_same_drill() {
        let mut app = test_app();
        app.start_selected_drill();
        type_text(&mut app, "ab");
        app.retry_drill();
        assert_eq!(app.screen, AppScreen::Typing);
        assert_eq!(app.active.as_ref().map(|a| a.drill.id), Some(DrillId(11)));
        assert!(app.active.as_ref().is_some_and(|a| a.buffer.as_str().is_empty()));
    }

    #[test]
    fn test_locked_drill_refused() {
        let mut app = test_app();
        app.start_drill(drill(21, 2, "ef"));
        assert_eq!(app.screen, AppScreen::Menu);
        assert!(app.active.is_none());
    }

    #[test]
    fn test_tier_navigation_wraps() {
        let mut app = test_app();
        app.tier_selected = 0;
        app.tier_prev();
        assert_eq!(app.tier_selected, 1);
        app.tier_next();
        assert_eq!(app.tier_selected, 0);
    }
}
