//! Failure taxonomy for the export workflow.
//!
//! The variants map to different recovery paths:
//!
//! - [`Auth`] routes back to credential entry, it is recoverable by typing a
//!   new token.
//! - [`Remote`], [`Transport`] and [`Parse`] during listing or export are
//!   terminal for the session; the user restarts to retry.
//! - [`Io`] from the token cache is always non-fatal, caching is best-effort.
//! - [`Validation`] is raised before any network call is issued.
//!
//! [`Auth`]: EngineError::Auth
//! [`Remote`]: EngineError::Remote
//! [`Transport`]: EngineError::Transport
//! [`Parse`]: EngineError::Parse
//! [`Io`]: EngineError::Io
//! [`Validation`]: EngineError::Validation
use thiserror::Error;

pub type ResultEngine<T> = Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("token rejected: {0}")]
    Auth(String),
    #[error("API error: {status} - {body}")]
    Remote { status: u16, body: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Validation(String),
}

impl EngineError {
    /// Returns `true` when the failure means the credential itself was
    /// refused, as opposed to the service or transport misbehaving.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}
