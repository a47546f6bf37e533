//! Remote HTTP client for the budgeting service.
//!
//! Three bounded-duration operations: identity check, budget listing, full
//! budget fetch. No call is ever retried automatically; the session decides
//! what a failure means.

use std::time::Duration;

use reqwest::Url;

use api_types::budget::{BudgetDetail, BudgetDetailResponse, BudgetSummary, BudgetsResponse};

use crate::error::{EngineError, ResultEngine};

pub const DEFAULT_BASE_URL: &str = "https://api.ynab.com/v1";

/// Validation and listing are small requests.
const SHORT_TIMEOUT: Duration = Duration::from_secs(10);
/// The detail payload can run to many megabytes.
const DETAIL_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
}

impl Client {
    pub fn new(base_url: &str) -> ResultEngine<Self> {
        // A trailing slash keeps Url::join from swallowing the version
        // segment.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized)
            .map_err(|err| EngineError::Validation(format!("invalid base_url: {err}")))?;
        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
        })
    }

    fn endpoint(&self, path: &str) -> ResultEngine<Url> {
        self.base_url
            .join(path)
            .map_err(|err| EngineError::Validation(format!("invalid endpoint {path}: {err}")))
    }

    /// Issues the authenticated identity check (`GET /user`).
    ///
    /// Any failure here, non-2xx or transport, means the token cannot be
    /// used and is reported as [`EngineError::Auth`].
    pub async fn validate_token(&self, token: &str) -> ResultEngine<()> {
        let endpoint = self.endpoint("user")?;
        let res = self
            .http
            .get(endpoint)
            .bearer_auth(token)
            .timeout(SHORT_TIMEOUT)
            .send()
            .await
            .map_err(|err| EngineError::Auth(format!("validation request failed: {err}")))?;

        if !res.status().is_success() {
            return Err(EngineError::Auth(format!(
                "API returned {}",
                res.status()
            )));
        }
        Ok(())
    }

    /// Fetches the budget listing, most recently modified first.
    pub async fn list_budgets(&self, token: &str) -> ResultEngine<Vec<BudgetSummary>> {
        let endpoint = self.endpoint("budgets")?;
        let res = self
            .http
            .get(endpoint)
            .bearer_auth(token)
            .timeout(SHORT_TIMEOUT)
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(remote_error(res).await);
        }

        let body: BudgetsResponse = serde_json::from_slice(&res.bytes().await?)?;
        let mut budgets = body.data.budgets;
        sort_budgets(&mut budgets);
        Ok(budgets)
    }

    /// Fetches the full budget document.
    ///
    /// Returns the raw bytes untouched (the exported artifact, and the input
    /// for size accounting and ordered inspection) next to the typed view
    /// the summary counts need.
    pub async fn fetch_budget_detail(
        &self,
        token: &str,
        budget_id: &str,
    ) -> ResultEngine<(Vec<u8>, BudgetDetail)> {
        let endpoint = self.endpoint(&format!("budgets/{budget_id}"))?;
        let res = self
            .http
            .get(endpoint)
            .bearer_auth(token)
            .timeout(DETAIL_TIMEOUT)
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(remote_error(res).await);
        }

        let raw = res.bytes().await?.to_vec();
        let body: BudgetDetailResponse = serde_json::from_slice(&raw)?;
        Ok((raw, body.data.budget))
    }
}

async fn remote_error(res: reqwest::Response) -> EngineError {
    let status = res.status().as_u16();
    let body = res
        .text()
        .await
        .unwrap_or_else(|_| "unknown error".to_string());
    EngineError::Remote { status, body }
}

/// Sorts by last-modified timestamp, most recent first.
///
/// The sort is stable, so entries with equal timestamps, and entries whose
/// timestamp is absent or unparsable (treated as older than any valid one),
/// keep the order the service emitted them in.
pub fn sort_budgets(budgets: &mut [BudgetSummary]) {
    budgets.sort_by(|a, b| b.last_modified_at().cmp(&a.last_modified_at()));
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

    #[test]
    fn sorts_most_recent_first_with_absent_last() {
        let mut budgets = vec![
            budget("a", Some("2024-01-01T00:00:00Z")),
            budget("b", Some("2024-06-01T00:00:00Z")),
            budget("c", None),
        ];
        sort_budgets(&mut budgets);
        let ids: Vec<&str> = budgets.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, ["b", "a", "c"]);
    }

    #[test]
    fn unparsable_timestamps_sort_like_absent() {
        let mut budgets = vec![
            budget("a", Some("not-a-timestamp")),
            budget("b", Some("2023-03-05T10:00:00Z")),
            budget("c", Some("garbage")),
        ];
        sort_budgets(&mut budgets);
        let ids: Vec<&str> = budgets.iter().map(|b| b.id.as_str()).collect();
        // Valid entry first; the two invalid ones keep their relative order.
        assert_eq!(ids, ["b", "a", "c"]);
    }

    #[test]
    fn equal_timestamps_keep_service_order() {
        let mut budgets = vec![
            budget("a", Some("2024-02-02T00:00:00Z")),
            budget("b", Some("2024-02-02T00:00:00Z")),
            budget("c", Some("2024-02-02T00:00:00Z")),
        ];
        sort_budgets(&mut budgets);
        let ids: Vec<&str> = budgets.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let client = Client::new("https://api.ynab.com/v1").unwrap();
        let endpoint = client.endpoint("budgets").unwrap();
        assert_eq!(endpoint.as_str(), "https://api.ynab.com/v1/budgets");
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(Client::new("not a url").is_err());
    }
}
