use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod budget {
    use super::*;

    /// One entry of the budget listing.
    ///
    /// Produced fresh per session, never mutated. `last_modified_on` is kept
    /// as the raw RFC3339 string the service emitted; use
    /// [`BudgetSummary::last_modified_at`] for the parsed form.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct BudgetSummary {
        pub id: String,
        pub name: String,
        #[serde(default)]
        pub last_modified_on: Option<String>,
    }

    impl BudgetSummary {
        /// Parses `last_modified_on`, returning `None` when the field is
        /// absent or not valid RFC3339.
        pub fn last_modified_at(&self) -> Option<DateTime<Utc>> {
            self.last_modified_on
                .as_deref()
                .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
                .map(|dt| dt.with_timezone(&Utc))
        }
    }

    /// Full budget document, typed only as far as the summary counts need.
    ///
    /// The exported artifact is always the raw response bytes; this view
    /// exists for counting and display, not for re-serialization.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct BudgetDetail {
        pub name: String,
        #[serde(default)]
        pub first_month: String,
        #[serde(default)]
        pub last_month: String,
        #[serde(default)]
        pub currency_format: CurrencyFormat,
        #[serde(default)]
        pub accounts: Vec<Account>,
        #[serde(default)]
        pub payees: Vec<Payee>,
        #[serde(default)]
        pub categories: Vec<Category>,
        #[serde(default)]
        pub transactions: Vec<Transaction>,
    }

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    pub struct CurrencyFormat {
        #[serde(default)]
        pub iso_code: String,
        #[serde(default)]
        pub currency_symbol: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Account {
        #[serde(default)]
        pub closed: bool,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Payee {
        pub id: String,
    }

    /// Deleted takes precedence over hidden when partitioning counts.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Category {
        #[serde(default)]
        pub hidden: bool,
        #[serde(default)]
        pub deleted: bool,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Transaction {
        pub id: String,
    }

    /// Envelope of `GET /budgets`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetsResponse {
        pub data: BudgetsData,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetsData {
        pub budgets: Vec<BudgetSummary>,
    }

    /// Envelope of `GET /budgets/{id}`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetDetailResponse {
        pub data: BudgetDetailData,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetDetailData {
        pub budget: BudgetDetail,
    }
}
