//! Weekly and month-to-date expense overviews

use chrono::NaiveDate;
use finance_calc::format_number;

use crate::dates::format_date;
use crate::entry::NewExpense;
use crate::reply::{self, Reply};

#[derive(Debug, Clone, PartialEq)]
pub struct WeekSummary {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub total: f64,
    pub average: f64,
    /// Largest expense and its date
    pub max: Option<(f64, NaiveDate)>,
    pub expenses: Vec<NewExpense>,
}

impl WeekSummary {
    /// Summarize the expenses dated `start..=end`
    pub fn new(start: NaiveDate, end: NaiveDate, expenses: Vec<NewExpense>) -> Self {
        let total: f64 = expenses.iter().map(|e| e.amount).sum();
        let average = if expenses.is_empty() {
            0.0
        } else {
            total / expenses.len() as f64
        };
        let max = expenses.iter().fold(None, |best: Option<(f64, NaiveDate)>, e| match best {
            Some((amount, _)) if amount >= e.amount => best,
            _ => Some((e.amount, e.date)),
        });

        Self {
            start,
            end,
            total,
            average,
            max,
            expenses,
        }
    }

    pub fn render(&self, weeks_back: u32) -> Reply {
        let mut text = format!(
            "Expenses for {} - {}:\n",
            format_date(self.start),
            format_date(self.end)
        );

        match self.max {
            None => text.push_str("No expenses recorded."),
            Some((max, max_date)) => {
                text.push_str(&format!(
                    "Total: {}\nAverage: {}\nLargest: {} ({})\n",
                    format_number(self.total),
                    format_number(self.average),
                    format_number(max),
                    format_date(max_date)
                ));
                for e in &self.expenses {
                    text.push_str(&format!(
                        "\n📅 {}: {} {}",
                        format_date(e.date),
                        format_number(e.amount),
                        e.category
                    ));
                    if !e.note.is_empty() {
                        text.push_str(&format!(" ({})", e.note));
                    }
                }
            },
        }

        Reply::text(text).with_keyboard(reply::week_navigation(weeks_back))
    }
}

/// Spending so far this month against the monthly budget
#[derive(Debug, Clone, PartialEq)]
pub struct MonthSummary {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub spent: f64,
    pub count: usize,
    pub budget: Option<f64>,
    /// Days left in the month, today included
    pub days_left: i64,
}

impl MonthSummary {
    pub fn new(
        today: NaiveDate,
        (start, end): (NaiveDate, NaiveDate),
        budget: Option<f64>,
        expenses: &[NewExpense],
    ) -> Self {
        Self {
            start,
            end,
            spent: expenses.iter().map(|e| e.amount).sum(),
            count: expenses.len(),
            budget,
            days_left: (end - today).num_days().max(0) + 1,
        }
    }

    pub fn remaining(&self) -> Option<f64> {
        self.budget.map(|budget| budget - self.spent)
    }

    /// What is left of the budget spread over the remaining days
    pub fn daily_allowance(&self) -> Option<f64> {
        self.remaining().map(|left| left / self.days_left as f64)
    }

    pub fn render(&self) -> Reply {
        let mut text = format!(
            "Spent {} - {}: {} ({} expenses)\n",
            format_date(self.start),
            format_date(self.end),
            format_number(self.spent),
            self.count
        );

        match (self.budget, self.remaining(), self.daily_allowance()) {
            (Some(budget), Some(left), Some(per_day)) if left >= 0.0 => {
                text.push_str(&format!(
                    "Monthly budget: {}\nLeft: {}\nFor the remaining {} days: {} per day",
                    format_number(budget),
                    format_number(left),
                    self.days_left,
                    format_number(per_day)
                ));
            },
            (Some(budget), Some(left), _) => {
                text.push_str(&format!(
                    "Monthly budget: {}\n❗ Over budget by {}",
                    format_number(budget),
                    format_number(-left)
                ));
            },
            _ => text.push_str("No monthly budget set. Use /budget to set one."),
        }

        Reply::text(text)
    }
}
