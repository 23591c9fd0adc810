//! Expense assistant core
//!
//! A user records expenses either step by step ([`guided`]) or in one line
//! ([`quick`]); amounts go through `finance_calc::calculate`, so `100+10%` and
//! `(100-10%)*2` are valid amounts. Per-user dialog state lives in a
//! `finance_state` store with an inactivity expiry. [`dispatcher::Assistant`]
//! routes every inbound event and serializes turns per user.

pub mod action;
pub mod budget;
pub mod clock;
pub mod config;
pub mod dates;
pub mod dispatcher;
pub mod entry;
pub mod error;
pub mod guided;
pub mod ports;
pub mod quick;
pub mod reply;
pub mod summary;

pub use action::{Action, Callback, Input};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::BotConfig;
pub use dispatcher::{Assistant, Inbound};
pub use entry::{ExpenseEntry, NewExpense, Step};
pub use error::{BotError, Result};
pub use guided::{transition, GuidedEntry, Outcome};
pub use ports::{Category, CategoryCatalog, InMemoryLedger, Ledger, StaticCatalog};
pub use quick::{QuickEntryError, QuickEntryParser, Transaction};
pub use reply::{Button, Reply};
