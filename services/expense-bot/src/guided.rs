//! Guided-entry state machine
//!
//! [`transition`] is the pure step function over `Step x Input`. [`GuidedEntry`]
//! loads the entry, applies the transition and performs whatever I/O the
//! outcome asks for. Callers serialize turns per user (see
//! [`crate::dispatcher::Assistant`]).
//!
//! | Step                 | Input             | Next                     |
//! |----------------------|-------------------|--------------------------|
//! | AwaitingDateChoice   | today             | AwaitingAmount           |
//! | AwaitingDateChoice   | pick a date       | AwaitingDateText         |
//! | AwaitingDateText     | text (date)       | AwaitingAmount           |
//! | AwaitingAmount       | text (expression) | AwaitingCategory         |
//! | AwaitingCategory     | category X        | AwaitingNoteChoice       |
//! | AwaitingNoteChoice   | add note          | AwaitingNoteText         |
//! | AwaitingNoteChoice   | skip note         | AwaitingConfirmation     |
//! | AwaitingNoteText     | text              | AwaitingConfirmation     |
//! | AwaitingConfirmation | confirm           | committed, entry removed |
//! | any                  | cancel            | entry removed            |

use std::sync::Arc;

use chrono::NaiveDate;
use finance_calc::{calculate, format_number};
use finance_state::{JsonRepository, StateStore};
use tracing::{debug, error, info, warn};

use crate::action::{Action, Input};
use crate::clock::Clock;
use crate::dates::{format_date, parse_date};
use crate::entry::{ExpenseEntry, NewExpense, Step};
use crate::error::{BotError, Result};
use crate::ports::{CategoryCatalog, Ledger};
use crate::reply::{self, Reply};

/// What a successful step asks the caller to do
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Persist the updated entry and prompt for its new step
    Advance(ExpenseEntry),
    /// Record the expense, then delete the entry
    Commit(NewExpense),
    /// Delete the entry
    Cancel,
}

fn advance(entry: &ExpenseEntry, next: Step, update: impl FnOnce(&mut ExpenseEntry)) -> Outcome {
    let mut entry = entry.clone();
    update(&mut entry);
    entry.step = next;
    Outcome::Advance(entry)
}

/// Apply one input to an entry
///
/// Errors leave the entry untouched: `Validation`/`Expression` for input that
/// failed to parse, `State` for input the step does not accept.
pub fn transition(entry: &ExpenseEntry, input: &Input, today: NaiveDate) -> Result<Outcome> {
    use Step::*;

    match (entry.step, input) {
        (_, Input::Action(Action::Cancel)) => Ok(Outcome::Cancel),

        (AwaitingDateChoice, Input::Action(Action::ChooseToday)) => {
            Ok(advance(entry, AwaitingAmount, |e| e.date = Some(today)))
        },
        (AwaitingDateChoice, Input::Action(Action::ChooseCustomDate)) => {
            Ok(advance(entry, AwaitingDateText, |_| {}))
        },

        (AwaitingDateText, Input::Text(text)) => {
            let date = parse_date(text, today).ok_or_else(|| {
                BotError::validation(format!("'{}' is not a date", text.trim()))
            })?;
            Ok(advance(entry, AwaitingAmount, |e| e.date = Some(date)))
        },

        (AwaitingAmount, Input::Text(text)) => {
            let amount = calculate(text)?;
            Ok(advance(entry, AwaitingCategory, |e| e.amount = Some(amount)))
        },

        (AwaitingCategory, Input::Action(Action::ChooseCategory(name))) => {
            let name = name.clone();
            Ok(advance(entry, AwaitingNoteChoice, |e| e.category = Some(name)))
        },

        (AwaitingNoteChoice, Input::Action(Action::AddNote)) => {
            Ok(advance(entry, AwaitingNoteText, |_| {}))
        },
        (AwaitingNoteChoice, Input::Action(Action::SkipNote)) => {
            Ok(advance(entry, AwaitingConfirmation, |e| e.note = Some(String::new())))
        },

        (AwaitingNoteText, Input::Text(text)) => {
            let note = text.trim();
            if note.is_empty() {
                return Err(BotError::validation("the note is empty"));
            }
            let note = note.to_string();
            Ok(advance(entry, AwaitingConfirmation, |e| e.note = Some(note)))
        },

        (AwaitingConfirmation, Input::Action(Action::Confirm)) => {
            Ok(Outcome::Commit(entry.to_expense()?))
        },

        (step, input) => Err(BotError::state(format!(
            "{} while waiting for {}",
            input,
            step.expects()
        ))),
    }
}

/// Guided-entry service over a state store, category catalog and ledger
pub struct GuidedEntry<S, C, L> {
    entries: JsonRepository<S, ExpenseEntry>,
    catalog: Arc<C>,
    ledger: Arc<L>,
    clock: Arc<dyn Clock>,
}

impl<S, C, L> GuidedEntry<S, C, L>
where
    S: StateStore,
    C: CategoryCatalog,
    L: Ledger,
{
    pub fn new(
        entries: JsonRepository<S, ExpenseEntry>,
        catalog: Arc<C>,
        ledger: Arc<L>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            entries,
            catalog,
            ledger,
            clock,
        }
    }

    /// Begin a new entry, replacing any unfinished one
    pub async fn start(&self, user_id: &str) -> Result<Reply> {
        let entry = ExpenseEntry::new();
        self.entries.set(user_id, &entry).await?;
        debug!("User {} started a guided entry", user_id);
        Ok(reply::date_choice())
    }

    pub async fn current(&self, user_id: &str) -> Result<Option<ExpenseEntry>> {
        Ok(self.entries.get(user_id).await?)
    }

    /// Drop the user's entry; returns whether one existed
    pub async fn discard(&self, user_id: &str) -> Result<bool> {
        let existed = self.entries.get(user_id).await?.is_some();
        self.entries.delete(user_id).await?;
        Ok(existed)
    }

    /// Apply one input to the user's entry
    ///
    /// Input errors become a re-prompt. Storage and ledger errors are
    /// returned and leave the stored entry as it was.
    pub async fn handle(&self, user_id: &str, input: Input) -> Result<Reply> {
        let Some(entry) = self.entries.get(user_id).await? else {
            return Err(BotError::state("no expense entry in progress"));
        };

        let result = match self.check_choice(&entry, &input).await {
            Ok(()) => transition(&entry, &input, self.clock.today()),
            Err(err) => Err(err),
        };

        match result {
            Ok(Outcome::Advance(next)) => {
                let prompt = self.prompt(&next).await?;
                self.entries.set(user_id, &next).await?;
                debug!("User {}: {} -> {}", user_id, entry.step, next.step);
                Ok(prompt)
            },
            Ok(Outcome::Commit(expense)) => self.commit(user_id, &expense).await,
            Ok(Outcome::Cancel) => {
                self.entries.delete(user_id).await?;
                info!("User {} cancelled the entry at {}", user_id, entry.step);
                Ok(reply::cancelled())
            },
            Err(err) if err.is_user_error() => {
                warn!("User {} at {}: {}", user_id, entry.step, err);
                Ok(self.prompt(&entry).await?.prefixed(&rejection(&err)))
            },
            Err(err) => Err(err),
        }
    }

    /// A chosen category must come from the catalog
    async fn check_choice(&self, entry: &ExpenseEntry, input: &Input) -> Result<()> {
        let (Step::AwaitingCategory, Input::Action(Action::ChooseCategory(name))) =
            (entry.step, input)
        else {
            return Ok(());
        };
        let categories = self.catalog.list_default_categories().await?;
        if categories.iter().any(|c| c.name == *name) {
            Ok(())
        } else {
            Err(BotError::validation(format!("unknown category '{}'", name)))
        }
    }

    async fn prompt(&self, entry: &ExpenseEntry) -> Result<Reply> {
        if entry.step == Step::AwaitingCategory {
            let categories = self.catalog.list_default_categories().await?;
            return Ok(reply::step_prompt(entry, &categories));
        }
        Ok(reply::step_prompt(entry, &[]))
    }

    async fn commit(&self, user_id: &str, expense: &NewExpense) -> Result<Reply> {
        if let Err(err) = self.ledger.record_expense(user_id, expense).await {
            error!("User {}: recording expense failed, entry kept: {}", user_id, err);
            return Err(err);
        }
        info!(
            "User {} recorded {} on {} ({})",
            user_id,
            format_number(expense.amount),
            format_date(expense.date),
            expense.category
        );
        // Already in the ledger: report success even if the delete fails, so
        // the user does not confirm twice. A stale entry expires with its TTL.
        if let Err(err) = self.entries.delete(user_id).await {
            error!("User {}: expense recorded but entry not removed: {}", user_id, err);
        }
        Ok(reply::recorded(expense))
    }
}

fn rejection(err: &BotError) -> String {
    match err {
        BotError::Validation(msg) => format!("❗ {}.", capitalize(msg)),
        BotError::Expression(calc) => format!("❗ Could not calculate the amount: {}.", calc),
        BotError::State(_) => "❗ That does not fit this step.".to_string(),
        other => format!("❗ {}", other),
    }
}

fn capitalize(msg: &str) -> String {
    let mut chars = msg.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
