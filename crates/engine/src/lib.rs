//! Core of the budget export tool: credential resolution, the remote
//! client, the order-preserving document model, summary extraction, and the
//! session state machine that sequences them. Renderers consume
//! [`Session`] state and feed it input messages; they hold no workflow
//! logic of their own.

pub use client::{Client, DEFAULT_BASE_URL, sort_budgets};
pub use error::{EngineError, ResultEngine};
pub use runner::Runner;
pub use session::{
    Command, ExportOutcome, Msg, Phase, Session, TokenFeedback, check_token_length,
};
pub use summary::{Summary, human_size, summarize};
pub use token::{
    NO_CACHE_ENV, Resolution, TOKEN_ENV, TOKEN_LENGTH, TokenCache, TokenSource, resolve,
};

pub mod client;
pub mod document;
pub mod error;
pub mod export;
pub mod runner;
pub mod session;
pub mod summary;
pub mod token;

mod util;

use api_types::budget::BudgetSummary;

/// What a selectable list item exposes to a renderer.
pub trait ListEntry {
    fn display_title(&self) -> String;
    fn display_subtitle(&self) -> String;
    fn filter_key(&self) -> &str;
}

impl ListEntry for BudgetSummary {
    /// Budget name, with the last-modified date appended when it parses.
    fn display_title(&self) -> String {
        match self.last_modified_at() {
            Some(at) => format!("{} (Last Modified: {})", self.name, at.format("%Y-%m-%d")),
            None => self.name.clone(),
        }
    }

    fn display_subtitle(&self) -> String {
        self.id.clone()
    }

    fn filter_key(&self) -> &str {
        &self.name
    }
}
