//! Terminal driver for one export session.
//!
//! The session state machine lives in the engine; this module owns the
//! event loop that feeds it keyboard input and runner completions, and
//! renders whichever screen the current phase calls for.

use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use engine::document::{classify, decode_budget_object};
use engine::{
    Client, ListEntry, Msg, NO_CACHE_ENV, Phase, Runner, Session, TOKEN_ENV, TokenCache, resolve,
};
use ratatui::Frame;

use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::ui::keymap::{AppAction, map_key};
use crate::ui::screens;
use crate::ui::terminal::TerminalGuard;
use crate::ui::theme::Theme;

const TICK_RATE: Duration = Duration::from_millis(120);

pub struct App {
    session: Session,
    runner: Runner,
    theme: Theme,
    /// Token entry buffer, only meaningful in the entry phase.
    input: String,
    /// Highlighted row on the budget list.
    selected: usize,
    /// Type-ahead buffer on the budget list.
    filter: String,
    /// Ordered `(field, shape)` lines for the done screen, computed once.
    inspection: Option<Vec<(String, String)>>,
    preview_bytes: usize,
    tick: usize,
    should_quit: bool,
    /// Set when the user quits from the error screen; drives the exit code.
    failed: Option<String>,
}

impl App {
    pub fn new(config: &AppConfig, token_flag: Option<String>) -> Result<Self> {
        let client = Client::new(&config.base_url)?;

        let no_cache = std::env::var(NO_CACHE_ENV)
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        let cache = if no_cache {
            None
        } else {
            TokenCache::at_default_location()
        };

        let env_token = std::env::var(TOKEN_ENV).ok();
        let resolution = resolve(token_flag.as_deref(), env_token.as_deref(), cache.as_ref());

        let (session, commands) = Session::start(
            resolution.token,
            resolution.source,
            resolution.warning,
        );
        let mut runner = Runner::new(client, cache);
        runner.dispatch(commands);

        Ok(Self {
            session,
            runner,
            theme: Theme::default(),
            input: String::new(),
            selected: 0,
            filter: String::new(),
            inspection: None,
            preview_bytes: config.preview_bytes,
            tick: 0,
            should_quit: false,
            failed: None,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = TerminalGuard::acquire()?;
        let looped = self.event_loop(&mut terminal);
        let released = terminal.release();
        looped?;
        released?;
        self.runner.teardown();

        match self.failed.take() {
            Some(message) => Err(AppError::Session(message)),
            None => Ok(()),
        }
    }

    fn event_loop(&mut self, terminal: &mut TerminalGuard) -> Result<()> {
        while !self.should_quit {
            while let Some(msg) = self.runner.try_recv() {
                self.apply(msg);
            }

            terminal
                .draw(|frame| self.draw(frame))
                .map_err(|err| AppError::Terminal(err.to_string()))?;

            if event::poll(TICK_RATE)? {
                if let Event::Key(key) = event::read()?
                    && key.kind == KeyEventKind::Press
                {
                    self.handle_key(key);
                }
            } else {
                self.tick = self.tick.wrapping_add(1);
            }
        }
        Ok(())
    }

    /// Applies one message and launches whatever effects the transition asks
    /// for.
    fn apply(&mut self, msg: Msg) {
        let commands = self.session.apply(msg);
        self.runner.dispatch(commands);
        self.after_transition();
    }

    fn after_transition(&mut self) {
        match self.session.phase() {
            Phase::Done => self.build_inspection(),
            Phase::SelectingBudget => {
                if self.selected >= self.session.budgets().len() {
                    self.selected = 0;
                }
            }
            _ => {}
        }
    }

    /// Re-reads the exported bytes into the ordered document model so the
    /// done screen can list top-level fields in service order. Skipped for
    /// documents past the configured preview size.
    fn build_inspection(&mut self) {
        if self.inspection.is_some() {
            return;
        }
        let Some(outcome) = self.session.outcome() else {
            return;
        };
        if outcome.raw.len() > self.preview_bytes {
            return;
        }
        match decode_budget_object(&outcome.raw) {
            Ok(object) => {
                self.inspection = Some(
                    object
                        .members()
                        .map(|member| (member.name.clone(), classify(&member.value)))
                        .collect(),
                );
            }
            Err(err) => tracing::warn!("could not build document preview: {err}"),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        let action = map_key(key);
        if action == AppAction::Quit {
            if self.session.phase() == Phase::Error
                && let Some(error) = self.session.error()
            {
                self.failed = Some(error.to_string());
            }
            self.should_quit = true;
            return;
        }

        match self.session.phase() {
            Phase::AwaitingToken => self.handle_entry_key(action),
            Phase::SelectingBudget => self.handle_list_key(action),
            Phase::Done => {
                if matches!(action, AppAction::Submit | AppAction::Input('q')) {
                    self.should_quit = true;
                }
            }
            Phase::Error => self.handle_error_key(action),
            // In-flight phases only react to completions.
            Phase::ValidatingToken | Phase::FetchingBudgets | Phase::Exporting => {}
        }
    }

    fn handle_entry_key(&mut self, action: AppAction) {
        match action {
            AppAction::Input(ch) => self.input.push(ch),
            AppAction::Backspace => {
                self.input.pop();
            }
            AppAction::Submit => {
                self.apply(Msg::SubmitToken(self.input.clone()));
                // Keep the buffer on rejection so the user can correct it.
                if self.session.phase() != Phase::AwaitingToken {
                    self.input.clear();
                }
            }
            _ => {}
        }
    }

    fn handle_list_key(&mut self, action: AppAction) {
        let count = self.session.budgets().len();
        match action {
            AppAction::Up => {
                self.selected = self.selected.saturating_sub(1);
            }
            AppAction::Down => {
                if count > 0 && self.selected < count - 1 {
                    self.selected += 1;
                }
            }
            AppAction::Submit => {
                let index = (count > 0).then_some(self.selected);
                self.filter.clear();
                self.apply(Msg::Select(index));
            }
            AppAction::Cancel => {
                self.filter.clear();
                self.selected = 0;
                self.apply(Msg::Back);
            }
            AppAction::Input('q') if self.filter.is_empty() => {
                self.should_quit = true;
            }
            AppAction::Input(ch) => {
                self.filter.push(ch);
                self.jump_to_filter();
            }
            AppAction::Backspace => {
                self.filter.pop();
                self.jump_to_filter();
            }
            _ => {}
        }
    }

    /// Moves the highlight to the first budget whose name starts with the
    /// type-ahead buffer.
    fn jump_to_filter(&mut self) {
        if self.filter.is_empty() {
            return;
        }
        let needle = self.filter.to_lowercase();
        if let Some(index) = self
            .session
            .budgets()
            .iter()
            .position(|budget| budget.filter_key().to_lowercase().starts_with(&needle))
        {
            self.selected = index;
        }
    }

    fn handle_error_key(&mut self, action: AppAction) {
        match action {
            AppAction::Input('r') => {
                self.input.clear();
                self.filter.clear();
                self.selected = 0;
                self.inspection = None;
                self.apply(Msg::Acknowledge);
            }
            AppAction::Submit | AppAction::Input('q') => {
                if let Some(error) = self.session.error() {
                    self.failed = Some(error.to_string());
                }
                self.should_quit = true;
            }
            _ => {}
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        match self.session.phase() {
            Phase::AwaitingToken => screens::token::render(
                frame,
                area,
                &self.theme,
                &self.input,
                self.session.notice(),
            ),
            Phase::ValidatingToken => {
                screens::progress::render(frame, area, &self.theme, "Validating token...", self.tick)
            }
            Phase::FetchingBudgets => {
                screens::progress::render(frame, area, &self.theme, "Fetching budgets...", self.tick)
            }
            Phase::SelectingBudget => screens::budgets::render(
                frame,
                area,
                &self.theme,
                self.session.budgets(),
                self.selected,
                &self.filter,
            ),
            Phase::Exporting => {
                screens::progress::render(frame, area, &self.theme, "Exporting budget...", self.tick)
            }
            Phase::Done => {
                if let Some(outcome) = self.session.outcome() {
                    screens::done::render(
                        frame,
                        area,
                        &self.theme,
                        outcome,
                        self.inspection.as_deref(),
                    );
                }
            }
            Phase::Error => {
                let message = self.session.error().unwrap_or("unknown error");
                screens::error::render(frame, area, &self.theme, message);
            }
        }
    }
}
