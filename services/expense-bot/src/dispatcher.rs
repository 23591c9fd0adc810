//! Inbound routing
//!
//! [`Assistant::handle`] is the single entry point for a user turn. Each turn
//! runs under that user's lock, so reads and writes of the user's entry and
//! status never interleave with another turn of the same user.

use std::sync::Arc;

use finance_calc::format_number;
use finance_state::{JsonRepository, KeySpace, KeyedLocks, StateStore, StatusRepository};
use tracing::{debug, error, info, warn};

use crate::action::{Callback, Input};
use crate::budget::BudgetFlow;
use crate::clock::Clock;
use crate::config::StateConfig;
use crate::dates::{format_date, month_bounds, week_bounds};
use crate::entry::NewExpense;
use crate::error::{BotError, Result};
use crate::guided::GuidedEntry;
use crate::ports::{CategoryCatalog, Ledger, DEFAULT_CATEGORY};
use crate::quick::{QuickEntryError, QuickEntryParser};
use crate::reply::{self, Reply};
use crate::summary::{MonthSummary, WeekSummary};

/// One inbound event from a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// Free text, including `/commands`
    Text(String),
    /// Button press carrying its callback payload
    Button(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Start,
    Help,
    Add,
    Budget,
    ShowBudget,
    Spent,
    Week(u32),
    Cancel,
    Unknown(String),
}

impl Command {
    fn parse(text: &str) -> Self {
        let mut words = text.split_whitespace();
        let name = words.next().unwrap_or_default();
        // `/week@bot_name` style suffixes
        let name = name.split('@').next().unwrap_or(name);
        match name {
            "/start" => Command::Start,
            "/help" => Command::Help,
            "/add" => Command::Add,
            "/budget" => Command::Budget,
            "/monthly" => Command::ShowBudget,
            "/spent" => Command::Spent,
            "/week" => match words.next().map(str::parse::<u32>) {
                None => Command::Week(0),
                Some(Ok(n)) => Command::Week(n),
                Some(Err(_)) => Command::Unknown(text.to_string()),
            },
            "/cancel" => Command::Cancel,
            _ => Command::Unknown(text.to_string()),
        }
    }
}

pub struct Assistant<S, C, L> {
    guided: GuidedEntry<S, C, L>,
    budget: BudgetFlow<S, L>,
    quick: QuickEntryParser,
    ledger: Arc<L>,
    clock: Arc<dyn Clock>,
    locks: KeyedLocks,
}

impl<S, C, L> Assistant<S, C, L>
where
    S: StateStore,
    C: CategoryCatalog,
    L: Ledger,
{
    pub fn new(
        store: Arc<S>,
        catalog: Arc<C>,
        ledger: Arc<L>,
        clock: Arc<dyn Clock>,
        settings: &StateConfig,
    ) -> Result<Self> {
        let keys = KeySpace::default();
        let entries = JsonRepository::new(
            Arc::clone(&store),
            keys.expense_prefix.clone(),
            settings.expense_ttl(),
        )
        .with_timeout(settings.storage_timeout());
        let statuses = StatusRepository::new(store, keys.status_prefix, settings.status_ttl())
            .with_timeout(settings.storage_timeout());

        Ok(Self {
            guided: GuidedEntry::new(entries, catalog, Arc::clone(&ledger), Arc::clone(&clock)),
            budget: BudgetFlow::new(statuses, Arc::clone(&ledger)),
            quick: QuickEntryParser::new()?,
            ledger,
            clock,
            locks: KeyedLocks::new(),
        })
    }

    /// Handle one turn; failures are turned into a reply and logged
    pub async fn handle(&self, user_id: &str, inbound: Inbound) -> Reply {
        let _turn = self.locks.lock(user_id).await;
        debug!("User {}: {:?}", user_id, inbound);

        let result = match &inbound {
            Inbound::Text(text) if text.trim_start().starts_with('/') => {
                self.command(user_id, Command::parse(text.trim())).await
            },
            Inbound::Text(text) => self.text(user_id, text).await,
            Inbound::Button(payload) => self.button(user_id, payload).await,
        };

        result.unwrap_or_else(|err| render_error(user_id, &err))
    }

    async fn command(&self, user_id: &str, command: Command) -> Result<Reply> {
        match command {
            Command::Start => Ok(reply::welcome()),
            Command::Help => Ok(reply::help()),
            Command::Add => {
                self.budget.clear(user_id).await?;
                self.guided.start(user_id).await
            },
            Command::Budget => self.budget.begin(user_id).await,
            Command::ShowBudget => match self.ledger.monthly_budget(user_id).await? {
                Some(amount) => Ok(reply::budget_current(amount)),
                None => Ok(reply::budget_missing()),
            },
            Command::Spent => self.month(user_id).await,
            Command::Week(weeks_back) => self.week(user_id, weeks_back).await,
            Command::Cancel => {
                let had_entry = self.guided.discard(user_id).await?;
                let had_status = self.budget.status(user_id).await?.is_some();
                self.budget.clear(user_id).await?;
                if had_entry || had_status {
                    Ok(Reply::text("Input cancelled. Use /help to see the commands."))
                } else {
                    Ok(Reply::text("Nothing to cancel."))
                }
            },
            Command::Unknown(text) => {
                debug!("User {}: unknown command {}", user_id, text);
                Ok(Reply::text("Unknown command. Use /help to see the commands."))
            },
        }
    }

    async fn text(&self, user_id: &str, text: &str) -> Result<Reply> {
        if let Some(status) = self.budget.status(user_id).await? {
            return self.budget.handle_text(user_id, &status, text).await;
        }
        if self.guided.current(user_id).await?.is_some() {
            return self.guided.handle(user_id, Input::Text(text.to_string())).await;
        }
        self.quick_entry(user_id, text).await
    }

    async fn button(&self, user_id: &str, payload: &str) -> Result<Reply> {
        match Callback::parse(payload) {
            Some(Callback::Entry(action)) => self.guided.handle(user_id, Input::Action(action)).await,
            Some(Callback::WeekPage(weeks_back)) => self.week(user_id, weeks_back).await,
            None => {
                warn!("User {}: unknown button payload '{}'", user_id, payload);
                Ok(Reply::text("This button is no longer valid."))
            },
        }
    }

    async fn quick_entry(&self, user_id: &str, text: &str) -> Result<Reply> {
        let tx = self.quick.parse(text, self.clock.today());
        let amount = match (&tx.error, tx.result) {
            (None, Some(amount)) => amount,
            (Some(QuickEntryError::EmptyExpression), _) => {
                return Ok(reply::help().prefixed("I did not find an amount in that message."))
            },
            (Some(err), _) => {
                warn!("User {}: quick entry '{}' rejected: {}", user_id, text, err);
                return Ok(Reply::text(format!(
                    "❗ {}.\nSend the amount first, e.g. 250 coffee or 21.03 100+10% taxi",
                    err
                )));
            },
            (None, None) => return Err(BotError::state("quick entry produced no amount")),
        };

        let expense = NewExpense {
            date: tx.date,
            amount,
            category: DEFAULT_CATEGORY.to_string(),
            note: tx.description,
        };
        self.ledger.record_expense(user_id, &expense).await?;
        info!(
            "User {} quick-recorded {} on {}",
            user_id,
            format_number(amount),
            format_date(expense.date)
        );
        Ok(reply::recorded(&expense))
    }

    async fn week(&self, user_id: &str, weeks_back: u32) -> Result<Reply> {
        let (start, end) = week_bounds(self.clock.today(), weeks_back).ok_or_else(|| {
            BotError::validation(format!("{} weeks back is out of range", weeks_back))
        })?;
        let expenses = self.ledger.expenses_between(user_id, start, end).await?;
        Ok(WeekSummary::new(start, end, expenses).render(weeks_back))
    }

    async fn month(&self, user_id: &str) -> Result<Reply> {
        let today = self.clock.today();
        let bounds = month_bounds(today)
            .ok_or_else(|| BotError::validation("this month is out of range"))?;
        let expenses = self.ledger.expenses_between(user_id, bounds.0, today).await?;
        let budget = self.ledger.monthly_budget(user_id).await?;
        Ok(MonthSummary::new(today, bounds, budget, &expenses).render())
    }
}

fn render_error(user_id: &str, err: &BotError) -> Reply {
    match err {
        BotError::State(msg) => {
            debug!("User {}: {}", user_id, msg);
            reply::no_entry()
        },
        err if err.is_user_error() => {
            warn!("User {}: {}", user_id, err);
            Reply::text(format!("❗ {}", err))
        },
        err => {
            error!("User {}: turn failed: {}", user_id, err);
            reply::retry()
        },
    }
}
