//! Outbound messages
//!
//! A [`Reply`] is text plus an optional button keyboard. Every prompt for a
//! text step restates the format it expects.

use std::fmt;

use finance_calc::format_number;
use serde::Serialize;

use crate::action::{Action, Callback};
use crate::dates::format_date;
use crate::entry::{ExpenseEntry, NewExpense, Step};
use crate::ports::Category;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Button {
    pub label: String,
    pub payload: String,
}

impl Button {
    pub fn new(label: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            payload: payload.into(),
        }
    }

    fn action(label: &str, action: &Action) -> Self {
        Self::new(label, action.payload())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Reply {
    pub text: String,
    /// Rows of buttons
    pub keyboard: Vec<Vec<Button>>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: Vec::new(),
        }
    }

    pub fn with_keyboard(mut self, keyboard: Vec<Vec<Button>>) -> Self {
        self.keyboard = keyboard;
        self
    }

    /// Put `reason` on its own line above the text
    pub fn prefixed(mut self, reason: &str) -> Self {
        self.text = format!("{}\n{}", reason, self.text);
        self
    }

    /// Every payload offered by the keyboard
    pub fn payloads(&self) -> impl Iterator<Item = &str> {
        self.keyboard
            .iter()
            .flatten()
            .map(|button| button.payload.as_str())
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)?;
        for row in &self.keyboard {
            f.write_str("\n")?;
            let labels: Vec<String> = row
                .iter()
                .map(|b| format!("[{}](!{})", b.label, b.payload))
                .collect();
            f.write_str(&labels.join(" "))?;
        }
        Ok(())
    }
}

pub const AMOUNT_FORMAT: &str =
    "Enter the amount. Arithmetic is allowed, e.g. 250, 100+10% or (100-10%)*2";
pub const DATE_TEXT_FORMAT: &str = "Enter the date as DD.MM.YYYY (e.g. 23.03.2025)";
const RETRY: &str = "Something went wrong. Please try again.";

/// Prompt for the given step; the category step needs the catalog
pub fn step_prompt(entry: &ExpenseEntry, categories: &[Category]) -> Reply {
    match entry.step {
        Step::AwaitingDateChoice => date_choice(),
        Step::AwaitingDateText => Reply::text(DATE_TEXT_FORMAT),
        Step::AwaitingAmount => Reply::text(AMOUNT_FORMAT),
        Step::AwaitingCategory => category_choice(categories),
        Step::AwaitingNoteChoice => note_choice(),
        Step::AwaitingNoteText => Reply::text("Enter the note:"),
        Step::AwaitingConfirmation => confirmation(entry),
    }
}

pub fn date_choice() -> Reply {
    Reply::text("When was the expense?").with_keyboard(vec![vec![
        Button::action("Today", &Action::ChooseToday),
        Button::action("Another date", &Action::ChooseCustomDate),
    ]])
}

pub fn category_choice(categories: &[Category]) -> Reply {
    let buttons: Vec<Button> = categories
        .iter()
        .map(|c| {
            Button::action(
                &format!("{} {}", c.icon, c.name),
                &Action::ChooseCategory(c.name.clone()),
            )
        })
        .collect();
    Reply::text("Choose a category:")
        .with_keyboard(buttons.chunks(2).map(<[Button]>::to_vec).collect())
}

pub fn note_choice() -> Reply {
    Reply::text("Add a note?").with_keyboard(vec![vec![
        Button::action("Add note", &Action::AddNote),
        Button::action("Skip", &Action::SkipNote),
    ]])
}

pub fn confirmation(entry: &ExpenseEntry) -> Reply {
    let date = entry.date.map(format_date).unwrap_or_else(|| "-".to_string());
    let amount = entry.amount.map(format_number).unwrap_or_else(|| "-".to_string());
    let category = entry.category.as_deref().unwrap_or("-");
    let mut text = format!(
        "Check the expense:\nDate: {}\nAmount: {}\nCategory: {}",
        date, amount, category
    );
    if let Some(note) = entry.note.as_deref().filter(|n| !n.is_empty()) {
        text.push_str(&format!("\nNote: {}", note));
    }
    Reply::text(text).with_keyboard(vec![vec![
        Button::action("✅ Confirm", &Action::Confirm),
        Button::action("❌ Cancel", &Action::Cancel),
    ]])
}

pub fn recorded(expense: &NewExpense) -> Reply {
    let mut text = format!(
        "✅ Expense recorded: {} on {} ({})",
        format_number(expense.amount),
        format_date(expense.date),
        expense.category
    );
    if !expense.note.is_empty() {
        text.push_str(&format!(": {}", expense.note));
    }
    Reply::text(text)
}

pub fn cancelled() -> Reply {
    Reply::text("Entry cancelled.")
}

pub fn no_entry() -> Reply {
    Reply::text("There is no expense in progress. Use /add to start one.")
}

pub fn retry() -> Reply {
    Reply::text(RETRY)
}

pub fn budget_prompt() -> Reply {
    Reply::text("Enter your monthly budget, e.g. 50000 or 45000+10%")
}

pub fn budget_set(amount: f64) -> Reply {
    Reply::text(format!("Monthly budget set: {}", format_number(amount)))
}

pub fn budget_current(amount: f64) -> Reply {
    Reply::text(format!("Your monthly budget: {}", format_number(amount)))
}

pub fn budget_missing() -> Reply {
    Reply::text("No monthly budget set. Use /budget to set one.")
}

pub fn help() -> Reply {
    Reply::text(
        "To record an expense for today, just send the amount and an optional description:\n\
         250 coffee\n\
         100+10% taxi\n\
         To record it for another day, put the date first: 21.03 1 500 groceries\n\n\
         Commands:\n\
         /add - step-by-step expense entry\n\
         /budget - set the monthly budget\n\
         /monthly - show the monthly budget\n\
         /spent - spending this month and what is left per day\n\
         /week [n] - expenses for this week, or n weeks back\n\
         /cancel - cancel the current input\n\
         /help - this message",
    )
}

pub fn welcome() -> Reply {
    help().prefixed("Hi! I keep track of your expenses.")
}

pub fn week_navigation(weeks_back: u32) -> Vec<Vec<Button>> {
    let mut row = Vec::with_capacity(2);
    if let Some(previous) = weeks_back.checked_add(1) {
        row.push(Button::new("⬅ Previous week", Callback::week_page(previous)));
    }
    if let Some(next) = weeks_back.checked_sub(1) {
        row.push(Button::new("Next week ➡", Callback::week_page(next)));
    }
    vec![row]
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_category_keyboard_rows_of_two() {
        let categories = vec![
            Category::new("Food", "🍔"),
            Category::new("Home", "🏠"),
            Category::new("Other", "📁"),
        ];
        let reply = category_choice(&categories);
        assert_eq!(reply.keyboard.len(), 2);
        assert_eq!(reply.keyboard[1][0].payload, "add_category_Other");
        assert_eq!(reply.keyboard[0][0].label, "🍔 Food");
    }

    #[test]
    fn test_text_steps_restate_format() {
        let mut entry = ExpenseEntry::new();
        entry.step = Step::AwaitingDateText;
        assert!(step_prompt(&entry, &[]).text.contains("DD.MM.YYYY"));

        entry.step = Step::AwaitingAmount;
        assert!(step_prompt(&entry, &[]).text.contains("100+10%"));
    }

    #[test]
    fn test_confirmation_summary() {
        let entry = ExpenseEntry {
            step: Step::AwaitingConfirmation,
            date: NaiveDate::from_ymd_opt(2025, 3, 23),
            amount: Some(2.123456789),
            category: Some("Food".to_string()),
            note: Some("lunch".to_string()),
        };
        let reply = confirmation(&entry);
        assert!(reply.text.contains("23.03.2025"));
        assert!(reply.text.contains("2.12346"));
        assert!(reply.text.contains("Food"));
        assert!(reply.text.contains("Note: lunch"));
        let payloads: Vec<&str> = reply.payloads().collect();
        assert_eq!(payloads, vec!["add_confirm", "add_cancel"]);
    }

    #[test]
    fn test_week_navigation() {
        assert_eq!(week_navigation(0)[0].len(), 1);
        let row = &week_navigation(2)[0];
        assert_eq!(row[0].payload, "expenses_page_3");
        assert_eq!(row[1].payload, "expenses_page_1");

        let last = &week_navigation(u32::MAX)[0];
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].payload, format!("expenses_page_{}", u32::MAX - 1));
    }

    #[test]
    fn test_display_lists_buttons() {
        let rendered = note_choice().to_string();
        assert!(rendered.contains("[Skip](!add_skip_note)"));
    }
}
