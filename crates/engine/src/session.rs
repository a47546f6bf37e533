//! The export workflow state machine.
//!
//! One session owns one state value. Long-running operations run elsewhere
//! (see [`runner`]) and report back through tagged completion messages; the
//! state holder applies exactly one message at a time, and each application
//! returns the effect commands the driver should launch next. No transition
//! launches more than one network operation, so at most one is ever in
//! flight per session.
//!
//! [`runner`]: crate::runner

use std::path::PathBuf;

use api_types::budget::BudgetSummary;

use crate::{
    error::EngineError,
    summary::Summary,
    token::{TOKEN_LENGTH, TokenSource},
};

/// Where the session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingToken,
    ValidatingToken,
    FetchingBudgets,
    SelectingBudget,
    Exporting,
    Done,
    Error,
}

/// Everything a finished export hands back to the renderer.
#[derive(Debug)]
pub struct ExportOutcome {
    pub summary: Summary,
    pub path: PathBuf,
    /// The exact bytes written to disk, kept for the inspection view.
    pub raw: Vec<u8>,
}

/// Input events and operation completions, applied one at a time.
#[derive(Debug)]
pub enum Msg {
    /// The user submitted a token from the entry screen.
    SubmitToken(String),
    TokenValidated(Result<(), EngineError>),
    BudgetsFetched(Result<Vec<BudgetSummary>, EngineError>),
    /// The user confirmed a selection; `None` when nothing is highlighted.
    Select(Option<usize>),
    ExportFinished(Result<ExportOutcome, EngineError>),
    /// Leave budget selection and return to token entry.
    Back,
    /// Acknowledge a terminal error and restart the session.
    Acknowledge,
}

/// Effects the driver must execute after a transition.
#[derive(Debug, Clone)]
pub enum Command {
    ValidateToken { token: String },
    ListBudgets { token: String },
    Export { token: String, budget: BudgetSummary },
    /// Best-effort: a failure here must never fail the session.
    CacheToken { token: String },
    /// Drop a cached token the service just rejected.
    EvictCachedToken,
}

/// Local length check result for the token entry field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenFeedback {
    Empty,
    TooShort(usize),
    TooLong(usize),
    Valid,
}

impl TokenFeedback {
    pub fn message(self) -> Option<String> {
        match self {
            Self::Empty | Self::Valid => None,
            Self::TooShort(len) => {
                Some(format!("Token too short ({len}/{TOKEN_LENGTH} characters)"))
            }
            Self::TooLong(len) => Some(format!("Token too long ({len}/{TOKEN_LENGTH} characters)")),
        }
    }
}

/// Length-validity check performed before any network call.
pub fn check_token_length(input: &str) -> TokenFeedback {
    let len = input.trim().chars().count();
    if len == 0 {
        TokenFeedback::Empty
    } else if len < TOKEN_LENGTH {
        TokenFeedback::TooShort(len)
    } else if len > TOKEN_LENGTH {
        TokenFeedback::TooLong(len)
    } else {
        TokenFeedback::Valid
    }
}

/// State of one export session.
///
/// Owned exclusively by its driver; mutated only through [`Session::apply`].
#[derive(Debug)]
pub struct Session {
    phase: Phase,
    token: String,
    source: TokenSource,
    notice: Option<String>,
    budgets: Vec<BudgetSummary>,
    selected: Option<BudgetSummary>,
    outcome: Option<ExportOutcome>,
    error: Option<String>,
}

impl Session {
    /// Starts a session from a resolved credential.
    ///
    /// With a token of non-`None` provenance the session begins validating
    /// immediately; otherwise it waits for manual entry.
    pub fn start(token: String, source: TokenSource, notice: Option<String>) -> (Self, Vec<Command>) {
        let mut session = Self {
            phase: Phase::AwaitingToken,
            token: String::new(),
            source,
            notice,
            budgets: Vec::new(),
            selected: None,
            outcome: None,
            error: None,
        };

        if source != TokenSource::None && !token.is_empty() {
            session.phase = Phase::ValidatingToken;
            session.token = token.clone();
            return (session, vec![Command::ValidateToken { token }]);
        }

        (session, Vec::new())
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn source(&self) -> TokenSource {
        self.source
    }

    /// Local message for the current screen (validation feedback, cache
    /// warnings, selection hints).
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn budgets(&self) -> &[BudgetSummary] {
        &self.budgets
    }

    pub fn selected(&self) -> Option<&BudgetSummary> {
        self.selected.as_ref()
    }

    pub fn outcome(&self) -> Option<&ExportOutcome> {
        self.outcome.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Applies one message and returns the commands to launch.
    ///
    /// The next state depends only on the current state and the message.
    /// Messages that do not fit the current phase (stale completions
    /// included) are dropped.
    pub fn apply(&mut self, msg: Msg) -> Vec<Command> {
        match (self.phase, msg) {
            (Phase::AwaitingToken, Msg::SubmitToken(input)) => self.submit_token(&input),
            (Phase::ValidatingToken, Msg::TokenValidated(result)) => self.token_validated(result),
            (Phase::FetchingBudgets, Msg::BudgetsFetched(result)) => self.budgets_fetched(result),
            (Phase::SelectingBudget, Msg::Select(index)) => self.select(index),
            (Phase::Exporting, Msg::ExportFinished(result)) => {
                self.export_finished(result);
                Vec::new()
            }
            (Phase::SelectingBudget, Msg::Back) => {
                self.reset_to_entry(None);
                Vec::new()
            }
            (Phase::Error, Msg::Acknowledge) => {
                self.reset_to_entry(None);
                self.error = None;
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn submit_token(&mut self, input: &str) -> Vec<Command> {
        let token = input.trim().to_string();
        match check_token_length(&token) {
            TokenFeedback::Valid => {
                self.token = token.clone();
                self.source = TokenSource::Manual;
                self.notice = None;
                self.phase = Phase::ValidatingToken;
                vec![Command::ValidateToken { token }]
            }
            feedback => {
                // Rejected locally: no network call, phase unchanged.
                self.notice = feedback
                    .message()
                    .or_else(|| Some("Enter your API token.".to_string()));
                Vec::new()
            }
        }
    }

    fn token_validated(&mut self, result: Result<(), EngineError>) -> Vec<Command> {
        match result {
            Ok(()) => {
                let mut commands = Vec::new();
                if self.source.should_cache() {
                    commands.push(Command::CacheToken {
                        token: self.token.clone(),
                    });
                }
                commands.push(Command::ListBudgets {
                    token: self.token.clone(),
                });
                self.notice = None;
                self.phase = Phase::FetchingBudgets;
                commands
            }
            Err(err) => {
                let was_cached = self.source == TokenSource::Cached;
                let notice = format!("{err} (token from {})", self.source);
                self.reset_to_entry(Some(notice));
                if was_cached {
                    // Do not retry a known-bad cached token on the next run.
                    vec![Command::EvictCachedToken]
                } else {
                    Vec::new()
                }
            }
        }
    }

    fn budgets_fetched(&mut self, result: Result<Vec<BudgetSummary>, EngineError>) -> Vec<Command> {
        match result {
            Ok(budgets) => {
                self.budgets = budgets;
                self.phase = Phase::SelectingBudget;
            }
            Err(err) => self.fail(err),
        }
        Vec::new()
    }

    fn select(&mut self, index: Option<usize>) -> Vec<Command> {
        let Some(budget) = index.and_then(|i| self.budgets.get(i)) else {
            // No budget chosen: stay put, no network call.
            self.notice = Some("Select a budget first.".to_string());
            return Vec::new();
        };

        let budget = budget.clone();
        self.selected = Some(budget.clone());
        self.notice = None;
        self.phase = Phase::Exporting;
        vec![Command::Export {
            token: self.token.clone(),
            budget,
        }]
    }

    fn export_finished(&mut self, result: Result<ExportOutcome, EngineError>) {
        match result {
            Ok(outcome) => {
                self.outcome = Some(outcome);
                self.phase = Phase::Done;
            }
            Err(err) => self.fail(err),
        }
    }

    fn fail(&mut self, err: EngineError) {
        self.error = Some(err.to_string());
        self.phase = Phase::Error;
    }

    fn reset_to_entry(&mut self, notice: Option<String>) {
        self.phase = Phase::AwaitingToken;
        self.token.clear();
        self.source = TokenSource::None;
        self.budgets.clear();
        self.selected = None;
        self.notice = notice;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budget(id: &str, last_modified_on: Option<&str>) -> BudgetSummary {
        BudgetSummary {
            id: id.to_string(),
            name: format!("budget-{id}"),
            last_modified_on: last_modified_on.map(str::to_string),
        }
    }

    fn valid_token() -> String {
        "a".repeat(TOKEN_LENGTH)
    }

    fn auth_err() -> EngineError {
        EngineError::Auth("API returned 401 Unauthorized".to_string())
    }

    #[test]
    fn starts_awaiting_without_a_resolved_token() {
        let (session, commands) = Session::start(String::new(), TokenSource::None, None);
        assert_eq!(session.phase(), Phase::AwaitingToken);
        assert!(commands.is_empty());
    }

    #[test]
    fn starts_validating_with_resolved_provenance() {
        let (session, commands) = Session::start(valid_token(), TokenSource::Env, None);
        assert_eq!(session.phase(), Phase::ValidatingToken);
        assert!(matches!(&commands[..], [Command::ValidateToken { token }] if *token == valid_token()));
    }

    #[test]
    fn wrong_length_token_never_reaches_the_network() {
        let (mut session, _) = Session::start(String::new(), TokenSource::None, None);

        for input in ["short", &"a".repeat(TOKEN_LENGTH + 1)] {
            let commands = session.apply(Msg::SubmitToken(input.to_string()));
            assert!(commands.is_empty());
            assert_eq!(session.phase(), Phase::AwaitingToken);
            assert!(session.notice().is_some());
        }
    }

    #[test]
    fn manual_token_is_validated_then_cached_then_listed() {
        // Scenario: manual entry, validation succeeds.
        let (mut session, _) = Session::start(String::new(), TokenSource::None, None);

        let commands = session.apply(Msg::SubmitToken(valid_token()));
        assert_eq!(session.phase(), Phase::ValidatingToken);
        assert_eq!(session.source(), TokenSource::Manual);
        assert!(matches!(&commands[..], [Command::ValidateToken { .. }]));

        let commands = session.apply(Msg::TokenValidated(Ok(())));
        assert_eq!(session.phase(), Phase::FetchingBudgets);
        assert!(matches!(
            &commands[..],
            [Command::CacheToken { .. }, Command::ListBudgets { .. }]
        ));
    }

    #[test]
    fn cached_token_is_not_written_back() {
        let (mut session, _) = Session::start(valid_token(), TokenSource::Cached, None);
        let commands = session.apply(Msg::TokenValidated(Ok(())));
        assert!(matches!(&commands[..], [Command::ListBudgets { .. }]));
    }

    #[test]
    fn rejected_cached_token_is_evicted() {
        // Scenario: cached token fails validation.
        let (mut session, _) = Session::start(valid_token(), TokenSource::Cached, None);

        let commands = session.apply(Msg::TokenValidated(Err(auth_err())));
        assert_eq!(session.phase(), Phase::AwaitingToken);
        assert!(matches!(&commands[..], [Command::EvictCachedToken]));
        let notice = session.notice().unwrap();
        assert!(notice.contains("cached token file"), "{notice}");
    }

    #[test]
    fn rejected_manual_token_keeps_the_cache() {
        let (mut session, _) = Session::start(String::new(), TokenSource::None, None);
        session.apply(Msg::SubmitToken(valid_token()));

        let commands = session.apply(Msg::TokenValidated(Err(auth_err())));
        assert!(commands.is_empty());
        assert_eq!(session.phase(), Phase::AwaitingToken);
        assert!(session.notice().unwrap().contains("manual entry"));
    }

    #[test]
    fn listing_failure_is_terminal() {
        let (mut session, _) = Session::start(valid_token(), TokenSource::Flag, None);
        session.apply(Msg::TokenValidated(Ok(())));

        session.apply(Msg::BudgetsFetched(Err(EngineError::Remote {
            status: 500,
            body: "oops".to_string(),
        })));
        assert_eq!(session.phase(), Phase::Error);
        assert!(session.error().unwrap().contains("500"));
    }

    #[test]
    fn selecting_nothing_is_a_no_op() {
        let (mut session, _) = Session::start(valid_token(), TokenSource::Flag, None);
        session.apply(Msg::TokenValidated(Ok(())));
        session.apply(Msg::BudgetsFetched(Ok(vec![budget("a", None)])));
        assert_eq!(session.phase(), Phase::SelectingBudget);

        let commands = session.apply(Msg::Select(None));
        assert!(commands.is_empty());
        assert_eq!(session.phase(), Phase::SelectingBudget);
        assert!(session.notice().is_some());
    }

    #[test]
    fn selecting_a_budget_launches_the_export() {
        let (mut session, _) = Session::start(valid_token(), TokenSource::Flag, None);
        session.apply(Msg::TokenValidated(Ok(())));
        session.apply(Msg::BudgetsFetched(Ok(vec![
            budget("a", None),
            budget("b", None),
        ])));

        let commands = session.apply(Msg::Select(Some(1)));
        assert_eq!(session.phase(), Phase::Exporting);
        assert!(matches!(
            &commands[..],
            [Command::Export { budget, .. }] if budget.id == "b"
        ));
        assert_eq!(session.selected().unwrap().id, "b");
    }

    #[test]
    fn back_discards_the_list_and_clears_the_token() {
        let (mut session, _) = Session::start(valid_token(), TokenSource::Flag, None);
        session.apply(Msg::TokenValidated(Ok(())));
        session.apply(Msg::BudgetsFetched(Ok(vec![budget("a", None)])));

        let commands = session.apply(Msg::Back);
        assert!(commands.is_empty());
        assert_eq!(session.phase(), Phase::AwaitingToken);
        assert!(session.budgets().is_empty());
        assert_eq!(session.source(), TokenSource::None);
    }

    #[test]
    fn export_completion_finishes_the_session() {
        let (mut session, _) = Session::start(valid_token(), TokenSource::Flag, None);
        session.apply(Msg::TokenValidated(Ok(())));
        session.apply(Msg::BudgetsFetched(Ok(vec![budget("a", None)])));
        session.apply(Msg::Select(Some(0)));

        session.apply(Msg::ExportFinished(Ok(ExportOutcome {
            summary: Summary::default(),
            path: "/tmp/export.json".into(),
            raw: b"{}".to_vec(),
        })));
        assert_eq!(session.phase(), Phase::Done);
        assert!(session.outcome().is_some());
    }

    #[test]
    fn acknowledging_an_error_restarts_the_session() {
        let (mut session, _) = Session::start(valid_token(), TokenSource::Flag, None);
        session.apply(Msg::TokenValidated(Ok(())));
        session.apply(Msg::BudgetsFetched(Err(EngineError::Remote {
            status: 503,
            body: "down".to_string(),
        })));
        assert_eq!(session.phase(), Phase::Error);

        session.apply(Msg::Acknowledge);
        assert_eq!(session.phase(), Phase::AwaitingToken);
        assert!(session.error().is_none());
        assert!(session.budgets().is_empty());
    }

    #[test]
    fn stale_completions_are_dropped() {
        let (mut session, _) = Session::start(String::new(), TokenSource::None, None);

        session.apply(Msg::TokenValidated(Ok(())));
        session.apply(Msg::BudgetsFetched(Ok(vec![budget("a", None)])));
        session.apply(Msg::ExportFinished(Err(auth_err())));
        assert_eq!(session.phase(), Phase::AwaitingToken);
        assert!(session.budgets().is_empty());
    }

    #[test]
    fn length_feedback_messages() {
        assert_eq!(check_token_length(""), TokenFeedback::Empty);
        assert_eq!(check_token_length("abc"), TokenFeedback::TooShort(3));
        assert_eq!(
            check_token_length(&"a".repeat(TOKEN_LENGTH)),
            TokenFeedback::Valid
        );
        let long = "a".repeat(TOKEN_LENGTH + 2);
        assert_eq!(
            check_token_length(&long),
            TokenFeedback::TooLong(TOKEN_LENGTH + 2)
        );
        assert!(TokenFeedback::TooShort(3).message().unwrap().contains("3/43"));
        assert!(TokenFeedback::Valid.message().is_none());
    }
}
