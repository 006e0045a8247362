use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

use engine::{
    AddEntryCmd, Engine, EngineError, EntryKind, NewAccountCmd, UpdateAccountCmd, UpdateEntryCmd,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for username in ["alice", "bob"] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password) VALUES (?, ?)",
            vec![username.into(), "password".into()],
        ))
        .await
        .unwrap();
    }
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn add_expense_debits_account_and_updates_user() {
    let (engine, _db) = engine_with_db().await;
    let main = engine
        .new_account(NewAccountCmd::new("alice", "Main", 100_000))
        .await
        .unwrap();

    let entry = engine
        .add_entry(
            AddEntryCmd::new("alice", 20_000, "Groceries", "Food", date(2026, 1, 10))
                .bank_account_id(main.id),
        )
        .await
        .unwrap();

    assert_eq!(entry.kind, EntryKind::Expense);
    assert_eq!(entry.bank_account.as_ref().unwrap().name, "Main");

    let main = engine.account("alice", main.id).await.unwrap();
    assert_eq!(main.balance, 80_000);

    let user = engine.user("alice").await.unwrap();
    assert_eq!(user.total_expenses, 20_000);
    assert_eq!(user.total_transactions, 1);
}

#[tokio::test]
async fn add_income_credits_account_and_skips_expense_total() {
    let (engine, _db) = engine_with_db().await;
    let main = engine
        .new_account(NewAccountCmd::new("alice", "Main", 100_000))
        .await
        .unwrap();

    engine
        .add_entry(
            AddEntryCmd::new("alice", 50_000, "Paycheck", "Salary", date(2026, 1, 1))
                .kind(EntryKind::Income)
                .bank_account_id(main.id),
        )
        .await
        .unwrap();

    let main = engine.account("alice", main.id).await.unwrap();
    assert_eq!(main.balance, 150_000);

    let user = engine.user("alice").await.unwrap();
    assert_eq!(user.total_expenses, 0);
    assert_eq!(user.total_transactions, 1);
}

#[tokio::test]
async fn add_entry_resolves_default_account() {
    let (engine, _db) = engine_with_db().await;
    engine
        .new_account(NewAccountCmd::new("alice", "Savings", 0))
        .await
        .unwrap();
    let main = engine
        .new_account(NewAccountCmd::new("alice", "Main", 100_000).default_account())
        .await
        .unwrap();

    let entry = engine
        .add_entry(AddEntryCmd::new(
            "alice",
            10_000,
            "Lunch",
            "Food",
            date(2026, 1, 10),
        ))
        .await
        .unwrap();
    assert_eq!(entry.bank_account.as_ref().unwrap().id, main.id);

    let main = engine.account("alice", main.id).await.unwrap();
    assert_eq!(main.balance, 90_000);
}

#[tokio::test]
async fn add_entry_without_any_account_is_legal() {
    let (engine, _db) = engine_with_db().await;

    let entry = engine
        .add_entry(AddEntryCmd::new(
            "alice",
            5_000,
            "Cash coffee",
            "Food",
            date(2026, 1, 10),
        ))
        .await
        .unwrap();
    assert!(entry.bank_account.is_none());

    let user = engine.user("alice").await.unwrap();
    assert_eq!(user.total_expenses, 5_000);
    assert_eq!(user.total_transactions, 1);
}

#[tokio::test]
async fn add_entry_with_foreign_account_is_not_found() {
    let (engine, _db) = engine_with_db().await;
    let bobs = engine
        .new_account(NewAccountCmd::new("bob", "Bob main", 100_000))
        .await
        .unwrap();

    let result = engine
        .add_entry(
            AddEntryCmd::new("alice", 1_000, "Sneaky", "Misc", date(2026, 1, 10))
                .bank_account_id(bobs.id),
        )
        .await;
    assert_eq!(
        result.unwrap_err(),
        EngineError::NotFound("bank account".to_string())
    );

    // Nothing moved anywhere.
    let bobs = engine.account("bob", bobs.id).await.unwrap();
    assert_eq!(bobs.balance, 100_000);
    let alice = engine.user("alice").await.unwrap();
    assert_eq!(alice.total_transactions, 0);
}

#[tokio::test]
async fn update_reverses_old_state_before_applying_new() {
    let (engine, _db) = engine_with_db().await;
    let main = engine
        .new_account(NewAccountCmd::new("alice", "Main", 100_000))
        .await
        .unwrap();

    let entry = engine
        .add_entry(
            AddEntryCmd::new("alice", 20_000, "Groceries", "Food", date(2026, 1, 10))
                .bank_account_id(main.id),
        )
        .await
        .unwrap();
    assert_eq!(engine.account("alice", main.id).await.unwrap().balance, 80_000);

    engine
        .update_entry(
            UpdateEntryCmd::new(
                "alice",
                entry.id,
                30_000,
                "Groceries",
                "Food",
                date(2026, 1, 10),
            )
            .bank_account_id(main.id),
        )
        .await
        .unwrap();

    // 80_000 + 20_000 reversed - 30_000 applied.
    assert_eq!(engine.account("alice", main.id).await.unwrap().balance, 70_000);

    let user = engine.user("alice").await.unwrap();
    assert_eq!(user.total_expenses, 30_000);
    assert_eq!(user.total_transactions, 1);
}

#[tokio::test]
async fn update_relinks_between_accounts_conserving_total() {
    let (engine, _db) = engine_with_db().await;
    let a = engine
        .new_account(NewAccountCmd::new("alice", "A", 100_000))
        .await
        .unwrap();
    let b = engine
        .new_account(NewAccountCmd::new("alice", "B", 100_000))
        .await
        .unwrap();

    let entry = engine
        .add_entry(
            AddEntryCmd::new("alice", 20_000, "Rent", "Housing", date(2026, 1, 1))
                .bank_account_id(a.id),
        )
        .await
        .unwrap();

    engine
        .update_entry(
            UpdateEntryCmd::new("alice", entry.id, 20_000, "Rent", "Housing", date(2026, 1, 1))
                .bank_account_id(b.id),
        )
        .await
        .unwrap();

    let a = engine.account("alice", a.id).await.unwrap();
    let b = engine.account("alice", b.id).await.unwrap();
    assert_eq!(a.balance, 100_000);
    assert_eq!(b.balance, 80_000);
    assert_eq!(a.balance + b.balance, 180_000);
}

#[tokio::test]
async fn update_can_unlink_the_account() {
    let (engine, _db) = engine_with_db().await;
    let main = engine
        .new_account(NewAccountCmd::new("alice", "Main", 100_000))
        .await
        .unwrap();

    let entry = engine
        .add_entry(
            AddEntryCmd::new("alice", 20_000, "Rent", "Housing", date(2026, 1, 1))
                .bank_account_id(main.id),
        )
        .await
        .unwrap();

    let updated = engine
        .update_entry(UpdateEntryCmd::new(
            "alice",
            entry.id,
            20_000,
            "Rent",
            "Housing",
            date(2026, 1, 1),
        ))
        .await
        .unwrap();
    assert!(updated.bank_account.is_none());

    // The reversal restored the account; nothing re-applied.
    assert_eq!(
        engine.account("alice", main.id).await.unwrap().balance,
        100_000
    );
}

#[tokio::test]
async fn update_changing_kind_flips_the_sign() {
    let (engine, _db) = engine_with_db().await;
    let main = engine
        .new_account(NewAccountCmd::new("alice", "Main", 100_000))
        .await
        .unwrap();

    let entry = engine
        .add_entry(
            AddEntryCmd::new("alice", 20_000, "Mislabeled", "Misc", date(2026, 1, 1))
                .bank_account_id(main.id),
        )
        .await
        .unwrap();
    assert_eq!(engine.account("alice", main.id).await.unwrap().balance, 80_000);

    engine
        .update_entry(
            UpdateEntryCmd::new(
                "alice",
                entry.id,
                20_000,
                "Mislabeled",
                "Misc",
                date(2026, 1, 1),
            )
            .kind(EntryKind::Income)
            .bank_account_id(main.id),
        )
        .await
        .unwrap();

    assert_eq!(
        engine.account("alice", main.id).await.unwrap().balance,
        120_000
    );
    let user = engine.user("alice").await.unwrap();
    assert_eq!(user.total_expenses, 0);
}

#[tokio::test]
async fn delete_restores_opening_balance_and_aggregates() {
    let (engine, _db) = engine_with_db().await;
    let main = engine
        .new_account(NewAccountCmd::new("alice", "Main", 100_000))
        .await
        .unwrap();

    let entry = engine
        .add_entry(
            AddEntryCmd::new("alice", 20_000, "Groceries", "Food", date(2026, 1, 10))
                .bank_account_id(main.id),
        )
        .await
        .unwrap();

    engine.delete_entry("alice", entry.id).await.unwrap();

    assert_eq!(
        engine.account("alice", main.id).await.unwrap().balance,
        100_000
    );
    let user = engine.user("alice").await.unwrap();
    assert_eq!(user.total_expenses, 0);
    assert_eq!(user.total_transactions, 0);
    assert!(engine.entries("alice").await.unwrap().is_empty());
}

#[tokio::test]
async fn foreign_update_is_forbidden_and_leaves_no_trace() {
    let (engine, _db) = engine_with_db().await;
    let main = engine
        .new_account(NewAccountCmd::new("alice", "Main", 100_000))
        .await
        .unwrap();
    let entry = engine
        .add_entry(
            AddEntryCmd::new("alice", 20_000, "Groceries", "Food", date(2026, 1, 10))
                .bank_account_id(main.id),
        )
        .await
        .unwrap();

    let result = engine
        .update_entry(UpdateEntryCmd::new(
            "bob",
            entry.id,
            1,
            "Hijack",
            "Misc",
            date(2026, 1, 10),
        ))
        .await;
    assert!(matches!(result, Err(EngineError::Forbidden(_))));

    let result = engine.delete_entry("bob", entry.id).await;
    assert!(matches!(result, Err(EngineError::Forbidden(_))));

    assert_eq!(engine.account("alice", main.id).await.unwrap().balance, 80_000);
    let alice = engine.user("alice").await.unwrap();
    assert_eq!(alice.total_expenses, 20_000);
    assert_eq!(alice.total_transactions, 1);
    let bob = engine.user("bob").await.unwrap();
    assert_eq!(bob.total_transactions, 0);
}

#[tokio::test]
async fn missing_entry_is_not_found() {
    let (engine, _db) = engine_with_db().await;
    let result = engine.delete_entry("alice", Uuid::new_v4()).await;
    assert_eq!(result.unwrap_err(), EngineError::NotFound("entry".to_string()));
}

#[tokio::test]
async fn at_most_one_default_account_per_user() {
    let (engine, _db) = engine_with_db().await;
    let first = engine
        .new_account(NewAccountCmd::new("alice", "First", 0).default_account())
        .await
        .unwrap();
    let second = engine
        .new_account(NewAccountCmd::new("alice", "Second", 0).default_account())
        .await
        .unwrap();

    let defaults = |accounts: Vec<engine::BankAccount>| {
        accounts.into_iter().filter(|a| a.is_default).count()
    };
    assert_eq!(defaults(engine.accounts("alice").await.unwrap()), 1);
    assert_eq!(
        engine.default_account("alice").await.unwrap().unwrap().id,
        second.id
    );

    // Promote the first one back through an update.
    engine
        .update_account(UpdateAccountCmd::new("alice", first.id, "First", 0).default_account())
        .await
        .unwrap();
    assert_eq!(defaults(engine.accounts("alice").await.unwrap()), 1);
    assert_eq!(
        engine.default_account("alice").await.unwrap().unwrap().id,
        first.id
    );
}

#[tokio::test]
async fn deleting_an_account_detaches_its_entries() {
    let (engine, _db) = engine_with_db().await;
    let main = engine
        .new_account(NewAccountCmd::new("alice", "Main", 100_000))
        .await
        .unwrap();
    let entry = engine
        .add_entry(
            AddEntryCmd::new("alice", 20_000, "Groceries", "Food", date(2026, 1, 10))
                .bank_account_id(main.id),
        )
        .await
        .unwrap();

    engine.delete_account("alice", main.id).await.unwrap();

    let entries = engine.entries("alice").await.unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].bank_account.is_none());

    // Deleting the detached entry still settles the user aggregates.
    engine.delete_entry("alice", entry.id).await.unwrap();
    let user = engine.user("alice").await.unwrap();
    assert_eq!(user.total_expenses, 0);
    assert_eq!(user.total_transactions, 0);
}

#[tokio::test]
async fn entries_listing_carries_account_names() {
    let (engine, _db) = engine_with_db().await;
    let main = engine
        .new_account(NewAccountCmd::new("alice", "Main", 0))
        .await
        .unwrap();
    engine
        .add_entry(
            AddEntryCmd::new("alice", 1_000, "Coffee", "Food", date(2026, 1, 2))
                .bank_account_id(main.id)
                .note("morning"),
        )
        .await
        .unwrap();
    engine
        .add_entry(AddEntryCmd::new(
            "alice",
            2_000,
            "Book",
            "Leisure",
            date(2026, 1, 1),
        ))
        .await
        .unwrap();

    let entries = engine.entries("alice").await.unwrap();
    assert_eq!(entries.len(), 2);
    // Ordered by entry date.
    assert_eq!(entries[0].description, "Book");
    assert!(entries[0].bank_account.is_none());
    assert_eq!(entries[1].bank_account.as_ref().unwrap().name, "Main");
    assert_eq!(entries[1].note.as_deref(), Some("morning"));
}
