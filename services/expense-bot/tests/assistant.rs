//! End-to-end routing through the assistant

#![allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable

use std::sync::Arc;

use chrono::NaiveDate;
use expense_bot::config::StateConfig;
use expense_bot::{Assistant, FixedClock, InMemoryLedger, Inbound, Reply, StaticCatalog};
use finance_state::MemoryStateStore;

struct Harness {
    assistant: Arc<Assistant<MemoryStateStore, StaticCatalog, InMemoryLedger>>,
    ledger: Arc<InMemoryLedger>,
}

// Sunday
fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 23).unwrap()
}

fn harness() -> Harness {
    common::init_test_logging();
    let ledger = Arc::new(InMemoryLedger::new());
    let assistant = Assistant::new(
        Arc::new(MemoryStateStore::new()),
        Arc::new(StaticCatalog::default()),
        Arc::clone(&ledger),
        Arc::new(FixedClock::new(today())),
        &StateConfig::default(),
    )
    .unwrap();
    Harness {
        assistant: Arc::new(assistant),
        ledger,
    }
}

impl Harness {
    async fn say(&self, user: &str, text: &str) -> Reply {
        self.assistant.handle(user, Inbound::Text(text.to_string())).await
    }

    async fn press(&self, user: &str, payload: &str) -> Reply {
        self.assistant
            .handle(user, Inbound::Button(payload.to_string()))
            .await
    }
}

#[tokio::test]
async fn quick_entry_records_with_default_category() {
    let h = harness();
    let reply = h.say("u", "1 500+10% groceries").await;
    assert!(reply.text.contains("1650"), "{}", reply.text);

    let expenses = h.ledger.expenses("u");
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].amount, 1650.0);
    assert_eq!(expenses[0].category, "Other");
    assert_eq!(expenses[0].note, "groceries");
    assert_eq!(expenses[0].date, today());
}

#[tokio::test]
async fn quick_entry_with_date_and_errors() {
    let h = harness();
    h.say("u", "21.03 80 bus").await;
    assert_eq!(
        h.ledger.expenses("u")[0].date,
        NaiveDate::from_ymd_opt(2025, 3, 21).unwrap()
    );

    let reply = h.say("u", "31.02 80 bus").await;
    assert!(reply.text.contains("invalid date format"));

    let reply = h.say("u", "hello there").await;
    assert!(reply.text.contains("did not find an amount"));

    let reply = h.say("u", "100*10% shoes").await;
    assert!(reply.text.contains("percent"), "{}", reply.text);
    assert_eq!(h.ledger.expenses("u").len(), 1);
}

#[tokio::test]
async fn guided_entry_takes_priority_over_quick_entry() {
    let h = harness();
    h.say("u", "/add").await;
    h.press("u", "add_date_today").await;

    // Looks like a quick entry, but the dialog is waiting for an amount
    let reply = h.say("u", "250").await;
    assert!(reply.text.contains("Choose a category"));
    assert!(h.ledger.expenses("u").is_empty());

    h.press("u", "add_category_Transport").await;
    h.press("u", "add_skip_note").await;
    let reply = h.press("u", "add_confirm").await;
    assert!(reply.text.contains("Expense recorded"));

    let expenses = h.ledger.expenses("u");
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].category, "Transport");

    // Dialog over: plain numbers are quick entries again
    h.say("u", "40 coffee").await;
    assert_eq!(h.ledger.expenses("u").len(), 2);
}

#[tokio::test]
async fn budget_status_captures_next_message() {
    let h = harness();
    let reply = h.say("u", "/budget").await;
    assert!(reply.text.contains("monthly budget"));

    let reply = h.say("u", "not a number").await;
    assert!(reply.text.contains("monthly budget"));
    assert_eq!(h.ledger.budget("u"), None);

    let reply = h.say("u", "50 000").await;
    assert!(reply.text.contains("50000"));
    assert_eq!(h.ledger.budget("u"), Some(50000.0));

    // Status cleared, so this is an expense now
    h.say("u", "300").await;
    assert_eq!(h.ledger.expenses("u").len(), 1);
}

#[tokio::test]
async fn cancel_clears_dialog_and_status() {
    let h = harness();
    assert!(h.say("u", "/cancel").await.text.contains("Nothing to cancel"));

    h.say("u", "/add").await;
    h.say("u", "/budget").await;
    let reply = h.say("u", "/cancel").await;
    assert!(reply.text.contains("Input cancelled"));

    let reply = h.press("u", "add_date_today").await;
    assert!(reply.text.contains("/add"));
    h.say("u", "10").await;
    assert_eq!(h.ledger.budget("u"), None);
    assert_eq!(h.ledger.expenses("u").len(), 1);
}

#[tokio::test]
async fn weekly_summary_and_paging() {
    let h = harness();
    h.say("u", "17.03 100 a").await;
    h.say("u", "19.03 300 b").await;
    h.say("u", "12.03 999 last week").await;

    let reply = h.say("u", "/week").await;
    assert!(reply.text.contains("17.03.2025 - 23.03.2025"));
    assert!(reply.text.contains("Total: 400"));
    assert!(reply.text.contains("Largest: 300 (19.03.2025)"));
    assert!(!reply.text.contains("999"));

    let previous = reply.keyboard[0][0].payload.clone();
    let reply = h.press("u", &previous).await;
    assert!(reply.text.contains("10.03.2025 - 16.03.2025"));
    assert!(reply.text.contains("999"));

    let reply = h.say("u", "/week 1").await;
    assert!(reply.text.contains("Total: 999"));
}

#[tokio::test]
async fn far_away_weeks_are_rejected_not_fatal() {
    let h = harness();
    let reply = h.say("u", "/week 100000000").await;
    assert!(reply.text.contains("out of range"), "{}", reply.text);

    let reply = h.press("u", &format!("expenses_page_{}", u32::MAX)).await;
    assert!(reply.text.contains("out of range"), "{}", reply.text);

    // The session carries on
    h.say("u", "40 coffee").await;
    assert!(h.say("u", "/week").await.text.contains("Total: 40"));
}

#[tokio::test]
async fn quick_entry_date_without_amount() {
    let h = harness();
    let reply = h.say("u", "21.03 coffee").await;
    assert!(reply.text.contains("did not find an amount"), "{}", reply.text);
    assert!(h.ledger.expenses("u").is_empty());
}

#[tokio::test]
async fn monthly_budget_is_shown() {
    let h = harness();
    assert!(h.say("u", "/monthly").await.text.contains("No monthly budget set"));

    h.say("u", "/budget").await;
    h.say("u", "45000+10%").await;
    let reply = h.say("u", "/monthly").await;
    assert!(reply.text.contains("Your monthly budget: 49500"), "{}", reply.text);
}

#[tokio::test]
async fn spent_reports_month_to_date_and_daily_allowance() {
    let h = harness();
    h.say("u", "/budget").await;
    h.say("u", "50000").await;
    h.say("u", "03.03 10 000 rent").await;
    h.say("u", "20.03 5 500 groceries").await;
    h.say("u", "28.02 999 last month").await;

    // 23 March: 9 days left including today
    let reply = h.say("u", "/spent").await;
    assert!(reply.text.contains("15500 (2 expenses)"), "{}", reply.text);
    assert!(reply.text.contains("Left: 34500"), "{}", reply.text);
    assert!(reply.text.contains("remaining 9 days: 3833.33333"), "{}", reply.text);

    let fresh = h.say("other", "/spent").await;
    assert!(fresh.text.contains("Use /budget"));
}

#[tokio::test]
async fn unknown_inputs_get_a_hint() {
    let h = harness();
    assert!(h.say("u", "/notify").await.text.contains("Unknown command"));
    assert!(h.press("u", "callback_1").await.text.contains("no longer valid"));
    assert!(h.say("u", "/help").await.text.contains("/week"));
    assert!(h.say("u", "/start").await.text.contains("/add"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_turns_for_one_user_are_serialized() {
    let h = harness();

    let tasks: Vec<_> = (0..20)
        .map(|i| {
            let assistant = Arc::clone(&h.assistant);
            tokio::spawn(async move {
                assistant
                    .handle("same", Inbound::Text(format!("{} item", i + 1)))
                    .await
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    let total: f64 = h.ledger.expenses("same").iter().map(|e| e.amount).sum();
    assert_eq!(h.ledger.expenses("same").len(), 20);
    assert_eq!(total, 210.0);
}
