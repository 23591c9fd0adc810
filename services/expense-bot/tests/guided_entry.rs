//! Guided entry against the in-memory store

#![allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use expense_bot::{
    Action, BotError, ExpenseEntry, FixedClock, GuidedEntry, InMemoryLedger, Input, Ledger,
    NewExpense, StaticCatalog, Step,
};
use finance_state::{JsonRepository, MemoryStateStore, StateStore, StoreError};

/// Ledger that fails while `down` is set
#[derive(Default)]
struct FlakyLedger {
    down: AtomicBool,
    inner: InMemoryLedger,
}

impl Ledger for FlakyLedger {
    fn record_expense(
        &self,
        user_id: &str,
        expense: &NewExpense,
    ) -> impl Future<Output = expense_bot::Result<()>> + Send {
        let down = self.down.load(Ordering::SeqCst);
        let recorded = if down {
            None
        } else {
            Some(self.inner.record_expense(user_id, expense))
        };
        async move {
            match recorded {
                Some(fut) => fut.await,
                None => Err(BotError::ledger("ledger unavailable")),
            }
        }
    }

    fn set_monthly_budget(
        &self,
        user_id: &str,
        amount: f64,
    ) -> impl Future<Output = expense_bot::Result<()>> + Send {
        self.inner.set_monthly_budget(user_id, amount)
    }

    fn monthly_budget(
        &self,
        user_id: &str,
    ) -> impl Future<Output = expense_bot::Result<Option<f64>>> + Send {
        self.inner.monthly_budget(user_id)
    }

    fn expenses_between(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> impl Future<Output = expense_bot::Result<Vec<NewExpense>>> + Send {
        self.inner.expenses_between(user_id, from, to)
    }
}

/// Store whose deletes time out while `stuck` is set
#[derive(Default)]
struct StuckDeleteStore {
    stuck: AtomicBool,
    inner: MemoryStateStore,
}

impl StateStore for StuckDeleteStore {
    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = finance_state::Result<Option<Vec<u8>>>> + Send {
        self.inner.get(key)
    }

    fn set(
        &self,
        key: &str,
        value: &[u8],
        ttl: Duration,
    ) -> impl Future<Output = finance_state::Result<()>> + Send {
        self.inner.set(key, value, ttl)
    }

    fn delete(&self, key: &str) -> impl Future<Output = finance_state::Result<()>> + Send {
        let deleted = if self.stuck.load(Ordering::SeqCst) {
            None
        } else {
            Some(self.inner.delete(key))
        };
        async move {
            match deleted {
                Some(fut) => fut.await,
                None => Err(StoreError::timeout("DEL")),
            }
        }
    }
}

struct Harness {
    guided: GuidedEntry<MemoryStateStore, StaticCatalog, FlakyLedger>,
    ledger: Arc<FlakyLedger>,
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 23).unwrap()
}

fn harness() -> Harness {
    common::init_test_logging();
    let store = Arc::new(MemoryStateStore::new());
    let ledger = Arc::new(FlakyLedger::default());
    let entries = JsonRepository::new(store, "expense", Duration::from_secs(3600));
    let guided = GuidedEntry::new(
        entries,
        Arc::new(StaticCatalog::default()),
        Arc::clone(&ledger),
        Arc::new(FixedClock::new(today())),
    );
    Harness { guided, ledger }
}

fn action(a: Action) -> Input {
    Input::Action(a)
}

fn text(s: &str) -> Input {
    Input::Text(s.to_string())
}

async fn step(h: &Harness, user: &str) -> Option<Step> {
    h.guided.current(user).await.unwrap().map(|e| e.step)
}

/// Drive a fresh entry up to the confirmation prompt
async fn fill_entry(h: &Harness, user: &str) {
    h.guided.start(user).await.unwrap();
    h.guided.handle(user, action(Action::ChooseToday)).await.unwrap();
    h.guided.handle(user, text("(100-10%)*2-50%")).await.unwrap();
    h.guided
        .handle(user, action(Action::ChooseCategory("Food".to_string())))
        .await
        .unwrap();
    h.guided.handle(user, action(Action::AddNote)).await.unwrap();
    h.guided.handle(user, text("team lunch")).await.unwrap();
}

#[tokio::test]
async fn full_dialog_records_expense() {
    let h = harness();
    fill_entry(&h, "u1").await;

    let entry = h.guided.current("u1").await.unwrap().unwrap();
    assert_eq!(
        entry,
        ExpenseEntry {
            step: Step::AwaitingConfirmation,
            date: Some(today()),
            amount: Some(90.0),
            category: Some("Food".to_string()),
            note: Some("team lunch".to_string()),
        }
    );

    let reply = h.guided.handle("u1", action(Action::Confirm)).await.unwrap();
    assert!(reply.text.contains("Expense recorded"));
    assert_eq!(step(&h, "u1").await, None);

    let recorded = h.ledger.inner.expenses("u1");
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].amount, 90.0);
    assert_eq!(recorded[0].note, "team lunch");
}

#[tokio::test]
async fn starting_twice_keeps_only_second_entry() {
    let h = harness();
    h.guided.start("u").await.unwrap();
    h.guided.handle("u", action(Action::ChooseToday)).await.unwrap();
    h.guided.handle("u", text("500")).await.unwrap();
    assert_eq!(step(&h, "u").await, Some(Step::AwaitingCategory));

    h.guided.start("u").await.unwrap();
    let entry = h.guided.current("u").await.unwrap().unwrap();
    assert_eq!(entry, ExpenseEntry::new());
}

#[tokio::test]
async fn invalid_date_reprompts_without_transition() {
    let h = harness();
    h.guided.start("u").await.unwrap();
    h.guided.handle("u", action(Action::ChooseCustomDate)).await.unwrap();

    let reply = h.guided.handle("u", text("31.02.2025")).await.unwrap();
    assert!(reply.text.contains("DD.MM.YYYY"));
    assert_eq!(step(&h, "u").await, Some(Step::AwaitingDateText));

    h.guided.handle("u", text("21.03.2025")).await.unwrap();
    let entry = h.guided.current("u").await.unwrap().unwrap();
    assert_eq!(entry.step, Step::AwaitingAmount);
    assert_eq!(entry.date, NaiveDate::from_ymd_opt(2025, 3, 21));
}

#[tokio::test]
async fn invalid_amount_reprompts_with_format() {
    let h = harness();
    h.guided.start("u").await.unwrap();
    h.guided.handle("u", action(Action::ChooseToday)).await.unwrap();

    for bad in ["100*10%", "1/0", "abc", "1+1))"] {
        let reply = h.guided.handle("u", text(bad)).await.unwrap();
        assert!(reply.text.contains("100+10%"), "{}", bad);
        assert_eq!(step(&h, "u").await, Some(Step::AwaitingAmount), "{}", bad);
    }
}

#[tokio::test]
async fn amount_step_offers_catalog() {
    let h = harness();
    h.guided.start("u").await.unwrap();
    h.guided.handle("u", action(Action::ChooseToday)).await.unwrap();

    let reply = h.guided.handle("u", text("250")).await.unwrap();
    let payloads: Vec<&str> = reply.payloads().collect();
    assert!(payloads.contains(&"add_category_Food"));
    assert!(payloads.contains(&"add_category_Other"));
}

#[tokio::test]
async fn unknown_category_is_rejected() {
    let h = harness();
    h.guided.start("u").await.unwrap();
    h.guided.handle("u", action(Action::ChooseToday)).await.unwrap();
    h.guided.handle("u", text("250")).await.unwrap();

    let reply = h
        .guided
        .handle("u", action(Action::ChooseCategory("Yachts".to_string())))
        .await
        .unwrap();
    assert!(reply.text.contains("Unknown category 'Yachts'"));
    assert_eq!(step(&h, "u").await, Some(Step::AwaitingCategory));
}

#[tokio::test]
async fn ledger_failure_keeps_entry_for_retry() {
    let h = harness();
    fill_entry(&h, "u").await;
    let before = h.guided.current("u").await.unwrap();

    h.ledger.down.store(true, Ordering::SeqCst);
    let err = h.guided.handle("u", action(Action::Confirm)).await.unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(h.guided.current("u").await.unwrap(), before);
    assert!(h.ledger.inner.expenses("u").is_empty());

    h.ledger.down.store(false, Ordering::SeqCst);
    h.guided.handle("u", action(Action::Confirm)).await.unwrap();
    assert_eq!(h.ledger.inner.expenses("u").len(), 1);
    assert_eq!(step(&h, "u").await, None);
}

#[tokio::test]
async fn cancel_removes_entry() {
    let h = harness();
    fill_entry(&h, "u").await;

    let reply = h.guided.handle("u", action(Action::Cancel)).await.unwrap();
    assert!(reply.text.contains("cancelled"));
    assert_eq!(step(&h, "u").await, None);
    assert!(h.ledger.inner.expenses("u").is_empty());
}

#[tokio::test]
async fn action_without_entry_is_state_error() {
    let h = harness();
    let err = h.guided.handle("nobody", action(Action::Confirm)).await.unwrap_err();
    assert!(matches!(err, BotError::State(_)));
}

#[tokio::test]
async fn wrong_input_for_step_reprompts() {
    let h = harness();
    h.guided.start("u").await.unwrap();

    let reply = h.guided.handle("u", text("today please")).await.unwrap();
    assert!(reply.text.contains("does not fit"));
    let payloads: Vec<&str> = reply.payloads().collect();
    assert_eq!(payloads, vec!["add_date_today", "add_date_custom"]);
    assert_eq!(step(&h, "u").await, Some(Step::AwaitingDateChoice));
}

#[tokio::test]
async fn users_are_independent() {
    let h = harness();
    h.guided.start("a").await.unwrap();
    h.guided.start("b").await.unwrap();
    h.guided.handle("a", action(Action::ChooseCustomDate)).await.unwrap();

    assert_eq!(step(&h, "a").await, Some(Step::AwaitingDateText));
    assert_eq!(step(&h, "b").await, Some(Step::AwaitingDateChoice));
}

#[tokio::test]
async fn failed_cleanup_after_commit_still_reports_success() {
    let store = Arc::new(StuckDeleteStore::default());
    let ledger = Arc::new(InMemoryLedger::new());
    let guided = GuidedEntry::new(
        JsonRepository::new(Arc::clone(&store), "expense", Duration::from_secs(3600)),
        Arc::new(StaticCatalog::default()),
        Arc::clone(&ledger),
        Arc::new(FixedClock::new(today())),
    );

    guided.start("u").await.unwrap();
    guided.handle("u", action(Action::ChooseToday)).await.unwrap();
    guided.handle("u", text("75")).await.unwrap();
    guided
        .handle("u", action(Action::ChooseCategory("Home".to_string())))
        .await
        .unwrap();
    guided.handle("u", action(Action::SkipNote)).await.unwrap();

    store.stuck.store(true, Ordering::SeqCst);
    let reply = guided.handle("u", action(Action::Confirm)).await.unwrap();
    assert!(reply.text.contains("Expense recorded"));
    assert_eq!(ledger.expenses("u").len(), 1);
}
