//! The in-flight expense record
//!
//! One [`ExpenseEntry`] per user while the guided dialog runs. It is stored as
//! a JSON document `{step, date, amount, category, note}` and removed on
//! commit or cancel; there is no terminal step.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{BotError, Result};

/// Where the guided dialog currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    AwaitingDateChoice,
    AwaitingDateText,
    AwaitingAmount,
    AwaitingCategory,
    AwaitingNoteChoice,
    AwaitingNoteText,
    AwaitingConfirmation,
}

impl Step {
    /// What the step waits for, as shown to the user
    pub fn expects(self) -> &'static str {
        match self {
            Step::AwaitingDateChoice => "a choice between today and another date",
            Step::AwaitingDateText => "a date as DD.MM.YYYY",
            Step::AwaitingAmount => "an amount or an expression",
            Step::AwaitingCategory => "a category from the list",
            Step::AwaitingNoteChoice => "a choice to add or skip a note",
            Step::AwaitingNoteText => "the note text",
            Step::AwaitingConfirmation => "confirm or cancel",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::AwaitingDateChoice => "awaiting_date_choice",
            Step::AwaitingDateText => "awaiting_date_text",
            Step::AwaitingAmount => "awaiting_amount",
            Step::AwaitingCategory => "awaiting_category",
            Step::AwaitingNoteChoice => "awaiting_note_choice",
            Step::AwaitingNoteText => "awaiting_note_text",
            Step::AwaitingConfirmation => "awaiting_confirmation",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExpenseEntry {
    pub step: Step,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

impl ExpenseEntry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The expense to commit; every field but the note must be set
    pub fn to_expense(&self) -> Result<NewExpense> {
        let missing = |field: &str| {
            BotError::state(format!("entry at {} has no {}", self.step, field))
        };
        Ok(NewExpense {
            date: self.date.ok_or_else(|| missing("date"))?,
            amount: self.amount.ok_or_else(|| missing("amount"))?,
            category: self.category.clone().ok_or_else(|| missing("category"))?,
            note: self.note.clone().unwrap_or_default(),
        })
    }
}

/// A complete expense as handed to the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    pub date: NaiveDate,
    pub amount: f64,
    pub category: String,
    pub note: String,
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_starts_at_date_choice() {
        let entry = ExpenseEntry::new();
        assert_eq!(entry.step, Step::AwaitingDateChoice);
        assert!(entry.date.is_none() && entry.amount.is_none());
    }

    #[test]
    fn test_document_shape() {
        let entry = ExpenseEntry {
            step: Step::AwaitingCategory,
            date: NaiveDate::from_ymd_opt(2025, 3, 23),
            amount: Some(110.0),
            category: None,
            note: None,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["step"], "awaiting_category");
        assert_eq!(json["date"], "2025-03-23");
        assert_eq!(json["amount"], 110.0);

        let back: ExpenseEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_display_matches_serde_name() {
        let step = Step::AwaitingNoteText;
        let json = serde_json::to_string(&step).unwrap();
        assert_eq!(json, format!("\"{}\"", step));
    }

    #[test]
    fn test_to_expense_requires_fields() {
        let mut entry = ExpenseEntry {
            step: Step::AwaitingConfirmation,
            date: NaiveDate::from_ymd_opt(2025, 3, 23),
            amount: Some(42.5),
            category: None,
            note: None,
        };
        assert!(matches!(entry.to_expense(), Err(BotError::State(_))));

        entry.category = Some("Food".to_string());
        let expense = entry.to_expense().unwrap();
        assert_eq!(expense.category, "Food");
        assert_eq!(expense.note, "");
    }
}
