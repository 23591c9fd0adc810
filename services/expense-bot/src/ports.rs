//! External collaborators: category catalog and expense ledger
//!
//! The relational store behind these lives outside this crate. The in-memory
//! implementations back the console driver and tests.

use std::future::Future;
use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::entry::NewExpense;
use crate::error::Result;

/// Category used when none was chosen (quick entry)
pub const DEFAULT_CATEGORY: &str = "Other";

/// Icon for categories that do not define one
pub const DEFAULT_ICON: &str = "📁";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub icon: String,
}

impl Category {
    pub fn new(name: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon: icon.into(),
        }
    }
}

/// Source of the categories offered during guided entry
pub trait CategoryCatalog: Send + Sync {
    fn list_default_categories(&self) -> impl Future<Output = Result<Vec<Category>>> + Send;
}

/// Persistent record of expenses and budgets
pub trait Ledger: Send + Sync {
    fn record_expense(
        &self,
        user_id: &str,
        expense: &NewExpense,
    ) -> impl Future<Output = Result<()>> + Send;

    fn set_monthly_budget(&self, user_id: &str, amount: f64)
        -> impl Future<Output = Result<()>> + Send;

    /// The budget last set, if any
    fn monthly_budget(&self, user_id: &str) -> impl Future<Output = Result<Option<f64>>> + Send;

    /// Expenses dated within `from..=to`, oldest first
    fn expenses_between(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> impl Future<Output = Result<Vec<NewExpense>>> + Send;
}

impl<C: CategoryCatalog> CategoryCatalog for Arc<C> {
    fn list_default_categories(&self) -> impl Future<Output = Result<Vec<Category>>> + Send {
        self.as_ref().list_default_categories()
    }
}

impl<L: Ledger> Ledger for Arc<L> {
    fn record_expense(
        &self,
        user_id: &str,
        expense: &NewExpense,
    ) -> impl Future<Output = Result<()>> + Send {
        self.as_ref().record_expense(user_id, expense)
    }

    fn set_monthly_budget(
        &self,
        user_id: &str,
        amount: f64,
    ) -> impl Future<Output = Result<()>> + Send {
        self.as_ref().set_monthly_budget(user_id, amount)
    }

    fn monthly_budget(&self, user_id: &str) -> impl Future<Output = Result<Option<f64>>> + Send {
        self.as_ref().monthly_budget(user_id)
    }

    fn expenses_between(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> impl Future<Output = Result<Vec<NewExpense>>> + Send {
        self.as_ref().expenses_between(user_id, from, to)
    }
}

/// Fixed category list
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    categories: Vec<Category>,
}

impl StaticCatalog {
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self::new(vec![
            Category::new("Food", "🍔"),
            Category::new("Transport", "🚌"),
            Category::new("Home", "🏠"),
            Category::new("Health", "💊"),
            Category::new("Entertainment", "🎬"),
            Category::new(DEFAULT_CATEGORY, DEFAULT_ICON),
        ])
    }
}

impl CategoryCatalog for StaticCatalog {
    fn list_default_categories(&self) -> impl Future<Output = Result<Vec<Category>>> + Send {
        let categories = self.categories.clone();
        async move { Ok(categories) }
    }
}

#[derive(Debug, Default, Clone)]
struct UserBook {
    expenses: Vec<NewExpense>,
    monthly_budget: Option<f64>,
}

/// Process-local ledger
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    books: DashMap<String, UserBook>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expenses(&self, user_id: &str) -> Vec<NewExpense> {
        self.books
            .get(user_id)
            .map(|book| book.expenses.clone())
            .unwrap_or_default()
    }

    pub fn budget(&self, user_id: &str) -> Option<f64> {
        self.books.get(user_id).and_then(|book| book.monthly_budget)
    }
}

impl Ledger for InMemoryLedger {
    fn record_expense(
        &self,
        user_id: &str,
        expense: &NewExpense,
    ) -> impl Future<Output = Result<()>> + Send {
        self.books
            .entry(user_id.to_string())
            .or_default()
            .expenses
            .push(expense.clone());
        async { Ok(()) }
    }

    fn set_monthly_budget(
        &self,
        user_id: &str,
        amount: f64,
    ) -> impl Future<Output = Result<()>> + Send {
        self.books
            .entry(user_id.to_string())
            .or_default()
            .monthly_budget = Some(amount);
        async { Ok(()) }
    }

    fn monthly_budget(&self, user_id: &str) -> impl Future<Output = Result<Option<f64>>> + Send {
        let budget = self.budget(user_id);
        async move { Ok(budget) }
    }

    fn expenses_between(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> impl Future<Output = Result<Vec<NewExpense>>> + Send {
        let mut found: Vec<NewExpense> = self
            .expenses(user_id)
            .into_iter()
            .filter(|e| e.date >= from && e.date <= to)
            .collect();
        found.sort_by_key(|e| e.date);
        async move { Ok(found) }
    }
}
