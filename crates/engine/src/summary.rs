//! Aggregate statistics derived from a budget detail document.

use api_types::budget::BudgetDetail;

use crate::document::format_month_year;

/// Immutable aggregate computed once per export.
///
/// Counts partition cleanly: `account_count + closed_account_count` covers
/// every account, and `category_count + hidden_category_count +
/// deleted_category_count` covers every category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub name: String,
    pub currency: String,
    pub first_month: String,
    pub last_month: String,
    pub file_size_bytes: u64,
    pub account_count: usize,
    pub closed_account_count: usize,
    pub category_count: usize,
    pub hidden_category_count: usize,
    pub deleted_category_count: usize,
    pub payee_count: usize,
    pub transaction_count: usize,
}

impl Summary {
    /// `Mon YYYY to Mon YYYY` label for the covered months.
    pub fn date_range(&self) -> String {
        format!(
            "{} to {}",
            format_month_year(&self.first_month),
            format_month_year(&self.last_month)
        )
    }
}

/// Computes the summary. Pure, no I/O.
pub fn summarize(detail: &BudgetDetail, raw_byte_len: u64) -> Summary {
    let mut category_count = 0;
    let mut hidden_category_count = 0;
    let mut deleted_category_count = 0;
    for category in &detail.categories {
        // Deleted takes precedence over hidden; a category lands in exactly
        // one bucket.
        if category.deleted {
            deleted_category_count += 1;
        } else if category.hidden {
            hidden_category_count += 1;
        } else {
            category_count += 1;
        }
    }

    let closed_account_count = detail.accounts.iter().filter(|a| a.closed).count();
    let account_count = detail.accounts.len() - closed_account_count;

    let currency = if detail.currency_format.currency_symbol.is_empty() {
        detail.currency_format.iso_code.clone()
    } else {
        format!(
            "{} ({})",
            detail.currency_format.iso_code, detail.currency_format.currency_symbol
        )
    };

    Summary {
        name: detail.name.clone(),
        currency,
        first_month: detail.first_month.clone(),
        last_month: detail.last_month.clone(),
        file_size_bytes: raw_byte_len,
        account_count,
        closed_account_count,
        category_count,
        hidden_category_count,
        deleted_category_count,
        payee_count: detail.payees.len(),
        transaction_count: detail.transactions.len(),
    }
}

/// Converts bytes to a human-readable size (KB, MB, GB).
pub fn human_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    match bytes {
        _ if bytes >= GB => format!("{:.2} GB", bytes as f64 / GB as f64),
        _ if bytes >= MB => format!("{:.2} MB", bytes as f64 / MB as f64),
        _ if bytes >= KB => format!("{:.2} KB", bytes as f64 / KB as f64),
        _ => format!("{bytes} bytes"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_types::budget::{Account, Category, CurrencyFormat, Payee, Transaction};

    fn detail() -> BudgetDetail {
        BudgetDetail {
            name: "Household".to_string(),
            first_month: "2023-01-01".to_string(),
            last_month: "2024-06-01".to_string(),
            currency_format: CurrencyFormat {
                iso_code: "EUR".to_string(),
                currency_symbol: "€".to_string(),
            },
            accounts: vec![Account { closed: false }, Account { closed: true }],
            payees: (0..5)
                .map(|i| Payee { id: format!("p{i}") })
                .collect(),
            categories: vec![
                Category {
                    hidden: false,
                    deleted: true,
                },
                Category {
                    hidden: true,
                    deleted: false,
                },
                Category {
                    hidden: false,
                    deleted: false,
                },
            ],
            transactions: (0..100)
                .map(|i| Transaction { id: format!("t{i}") })
                .collect(),
        }
    }

    #[test]
    fn partitions_counts() {
        let summary = summarize(&detail(), 2048);
        assert_eq!(summary.account_count, 1);
        assert_eq!(summary.closed_account_count, 1);
        assert_eq!(summary.category_count, 1);
        assert_eq!(summary.hidden_category_count, 1);
        assert_eq!(summary.deleted_category_count, 1);
        assert_eq!(summary.payee_count, 5);
        assert_eq!(summary.transaction_count, 100);
        assert_eq!(summary.file_size_bytes, 2048);
    }

    #[test]
    fn counts_cover_every_entry() {
        let d = detail();
        let summary = summarize(&d, 0);
        assert_eq!(
            summary.account_count + summary.closed_account_count,
            d.accounts.len()
        );
        assert_eq!(
            summary.category_count + summary.hidden_category_count + summary.deleted_category_count,
            d.categories.len()
        );
    }

    #[test]
    fn deleted_takes_precedence_over_hidden() {
        let mut d = detail();
        d.categories = vec![Category {
            hidden: true,
            deleted: true,
        }];
        let summary = summarize(&d, 0);
        assert_eq!(summary.deleted_category_count, 1);
        assert_eq!(summary.hidden_category_count, 0);
    }

    #[test]
    fn currency_includes_symbol_when_present() {
        let summary = summarize(&detail(), 0);
        assert_eq!(summary.currency, "EUR (€)");

        let mut d = detail();
        d.currency_format = CurrencyFormat {
            iso_code: "USD".to_string(),
            currency_symbol: String::new(),
        };
        assert_eq!(summarize(&d, 0).currency, "USD");
    }

    #[test]
    fn date_range_uses_month_year_labels() {
        let summary = summarize(&detail(), 0);
        assert_eq!(summary.date_range(), "Jan 2023 to Jun 2024");
    }

    #[test]
    fn human_size_picks_the_right_unit() {
        assert_eq!(human_size(512), "512 bytes");
        assert_eq!(human_size(1024), "1.00 KB");
        assert_eq!(human_size(1536), "1.50 KB");
        assert_eq!(human_size(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(human_size(3 * 1024 * 1024 * 1024), "3.00 GB");
    }
}
