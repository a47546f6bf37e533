//! Executes session commands and feeds completions back as messages.
//!
//! Network operations run on their own tokio task so the message consumer
//! never blocks on the wire; it only waits for the next message. Cache
//! operations are cheap local I/O and run inline, and their failures are
//! logged instead of surfaced, caching is never a requirement for the
//! export to succeed.

use api_types::budget::BudgetSummary;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    client::Client,
    error::ResultEngine,
    export,
    session::{Command, ExportOutcome, Msg},
    summary,
    token::TokenCache,
};

/// Drives the effectful side of one session.
#[derive(Debug)]
pub struct Runner {
    client: Client,
    cache: Option<TokenCache>,
    tx: mpsc::UnboundedSender<Msg>,
    rx: mpsc::UnboundedReceiver<Msg>,
    in_flight: Option<JoinHandle<()>>,
}

impl Runner {
    pub fn new(client: Client, cache: Option<TokenCache>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            client,
            cache,
            tx,
            rx,
            in_flight: None,
        }
    }

    /// Launches the effects of one transition.
    ///
    /// A transition emits at most one network command, so at most one task
    /// is in flight at any time.
    pub fn dispatch(&mut self, commands: Vec<Command>) {
        for command in commands {
            match command {
                Command::ValidateToken { token } => {
                    let client = self.client.clone();
                    let tx = self.tx.clone();
                    self.spawn(async move {
                        let result = client.validate_token(&token).await;
                        let _ = tx.send(Msg::TokenValidated(result));
                    });
                }
                Command::ListBudgets { token } => {
                    let client = self.client.clone();
                    let tx = self.tx.clone();
                    self.spawn(async move {
                        let result = client.list_budgets(&token).await;
                        let _ = tx.send(Msg::BudgetsFetched(result));
                    });
                }
                Command::Export { token, budget } => {
                    let client = self.client.clone();
                    let tx = self.tx.clone();
                    self.spawn(async move {
                        let result = run_export(&client, &token, &budget).await;
                        let _ = tx.send(Msg::ExportFinished(result));
                    });
                }
                Command::CacheToken { token } => {
                    if let Some(cache) = &self.cache
                        && let Err(err) = cache.save(&token)
                    {
                        tracing::warn!("could not cache token: {err}");
                    }
                }
                Command::EvictCachedToken => {
                    if let Some(cache) = &self.cache
                        && let Err(err) = cache.delete()
                    {
                        tracing::warn!("could not delete cached token: {err}");
                    }
                }
            }
        }
    }

    fn spawn<F>(&mut self, future: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        self.teardown();
        self.in_flight = Some(tokio::spawn(future));
    }

    /// Non-blocking drain of pending completion messages.
    pub fn try_recv(&mut self) -> Option<Msg> {
        self.rx.try_recv().ok()
    }

    /// Waits for the next completion message.
    pub async fn recv(&mut self) -> Option<Msg> {
        self.rx.recv().await
    }

    /// Cancels any in-flight operation; its result will never be applied.
    pub fn teardown(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

impl Drop for Runner {
    fn drop(&mut self) {
        self.teardown();
    }
}

async fn run_export(
    client: &Client,
    token: &str,
    budget: &BudgetSummary,
) -> ResultEngine<ExportOutcome> {
    let (raw, detail) = client.fetch_budget_detail(token, &budget.id).await?;
    let summary = summary::summarize(&detail, raw.len() as u64);
    let path = export::write_export(&raw, &budget.name)?;
    tracing::info!(path = %path.display(), bytes = raw.len(), "export complete");
    Ok(ExportOutcome { summary, path, raw })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner_with_cache(dir: &tempfile::TempDir) -> (Runner, TokenCache) {
        let cache = TokenCache::at(dir.path().join("api-token"));
        let client = Client::new("http://127.0.0.1:9").unwrap();
        (Runner::new(client, Some(cache.clone())), cache)
    }

    #[tokio::test]
    async fn cache_commands_write_and_evict() {
        let dir = tempfile::tempdir().unwrap();
        let (mut runner, cache) = runner_with_cache(&dir);

        runner.dispatch(vec![Command::CacheToken {
            token: "tok".to_string(),
        }]);
        assert_eq!(cache.load().unwrap().as_deref(), Some("tok"));

        runner.dispatch(vec![Command::EvictCachedToken]);
        assert!(cache.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn unreachable_service_reports_an_auth_failure() {
        let dir = tempfile::tempdir().unwrap();
        let (mut runner, _cache) = runner_with_cache(&dir);

        runner.dispatch(vec![Command::ValidateToken {
            token: "tok".to_string(),
        }]);

        match runner.recv().await {
            Some(Msg::TokenValidated(Err(err))) => assert!(err.is_auth()),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn teardown_drops_the_in_flight_operation() {
        let dir = tempfile::tempdir().unwrap();
        let (mut runner, _cache) = runner_with_cache(&dir);

        runner.dispatch(vec![Command::ValidateToken {
            token: "tok".to_string(),
        }]);
        runner.teardown();

        // The aborted task may or may not have sent before the abort; either
        // way nothing new arrives afterwards.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(runner.in_flight.is_none());
    }
}
