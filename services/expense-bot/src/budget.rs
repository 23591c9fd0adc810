//! Monthly budget prompt
//!
//! `/budget` leaves a `budget` status for the user; the next free-text message
//! is read as the budget amount.

use std::sync::Arc;

use finance_calc::{calculate, format_number};
use finance_state::{StateStore, StatusRepository};
use tracing::{info, warn};

use crate::error::Result;
use crate::ports::Ledger;
use crate::reply::{self, Reply};

/// Pending conversation status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    AwaitingBudget,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::AwaitingBudget => "budget",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "budget" => Some(Status::AwaitingBudget),
            _ => None,
        }
    }
}

pub struct BudgetFlow<S, L> {
    statuses: StatusRepository<S>,
    ledger: Arc<L>,
}

impl<S: StateStore, L: Ledger> BudgetFlow<S, L> {
    pub fn new(statuses: StatusRepository<S>, ledger: Arc<L>) -> Self {
        Self { statuses, ledger }
    }

    pub async fn begin(&self, user_id: &str) -> Result<Reply> {
        self.statuses
            .set(user_id, Status::AwaitingBudget.as_str())
            .await?;
        Ok(reply::budget_prompt())
    }

    pub async fn status(&self, user_id: &str) -> Result<Option<String>> {
        Ok(self.statuses.get(user_id).await?)
    }

    pub async fn clear(&self, user_id: &str) -> Result<()> {
        Ok(self.statuses.delete(user_id).await?)
    }

    /// Handle free text while `raw_status` is pending
    pub async fn handle_text(&self, user_id: &str, raw_status: &str, text: &str) -> Result<Reply> {
        let Some(status) = Status::parse(raw_status) else {
            warn!("User {} has unknown status '{}', clearing", user_id, raw_status);
            self.statuses.delete(user_id).await?;
            return Ok(Reply::text("Something went wrong. Use /help to start over."));
        };

        match status {
            Status::AwaitingBudget => self.set_budget(user_id, text).await,
        }
    }

    async fn set_budget(&self, user_id: &str, text: &str) -> Result<Reply> {
        let amount = match calculate(text) {
            Ok(amount) if amount > 0.0 => amount,
            Ok(amount) => {
                warn!("User {} entered non-positive budget {}", user_id, amount);
                return Ok(reply::budget_prompt().prefixed(&format!(
                    "❗ The budget must be positive, got {}.",
                    format_number(amount)
                )));
            },
            Err(err) => {
                warn!("User {} entered invalid budget: {}", user_id, err);
                return Ok(reply::budget_prompt().prefixed(&format!("❗ {}.", err)));
            },
        };

        self.ledger.set_monthly_budget(user_id, amount).await?;
        self.statuses.delete(user_id).await?;
        info!("User {} set monthly budget {}", user_id, format_number(amount));
        Ok(reply::budget_set(amount))
    }
}
