//! Initial schema migration - creates all tables from scratch.
//!
//! The full schema for Spendbook:
//!
//! - `users`: account owners plus their denormalized ledger aggregates
//! - `bank_accounts`: money locations, optionally receiving a monthly credit
//! - `expenses`: ledger entries (both expenses and income), optionally linked
//!   to a bank account with a weak reference

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
    MonthlyBudget,
    TotalExpenses,
    TotalTransactions,
    IsPremium,
}

#[derive(Iden)]
enum BankAccounts {
    Table,
    Id,
    Name,
    Balance,
    IsDefault,
    IsRecurring,
    RecurringAmount,
    RecurringDay,
    UserId,
}

#[derive(Iden)]
enum Expenses {
    Table,
    Id,
    AmountMinor,
    Description,
    Category,
    Note,
    EntryDate,
    Kind,
    IsRecurring,
    RecurringDay,
    BankAccountId,
    UserId,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(
                        ColumnDef::new(Users::MonthlyBudget)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Users::TotalExpenses)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Users::TotalTransactions)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Users::IsPremium)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Bank accounts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(BankAccounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BankAccounts::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BankAccounts::Name).string().not_null())
                    .col(
                        ColumnDef::new(BankAccounts::Balance)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(BankAccounts::IsDefault)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(BankAccounts::IsRecurring)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(BankAccounts::RecurringAmount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(BankAccounts::RecurringDay)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(BankAccounts::UserId).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-bank_accounts-user_id")
                            .from(BankAccounts::Table, BankAccounts::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-bank_accounts-user_id")
                    .table(BankAccounts::Table)
                    .col(BankAccounts::UserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Expenses (ledger entries)
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Expenses::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Expenses::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Expenses::Description).string().not_null())
                    .col(ColumnDef::new(Expenses::Category).string().not_null())
                    .col(ColumnDef::new(Expenses::Note).string())
                    .col(ColumnDef::new(Expenses::EntryDate).date().not_null())
                    .col(
                        ColumnDef::new(Expenses::Kind)
                            .string()
                            .not_null()
                            .default("expense"),
                    )
                    .col(
                        ColumnDef::new(Expenses::IsRecurring)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Expenses::RecurringDay).integer())
                    .col(ColumnDef::new(Expenses::BankAccountId).string())
                    .col(ColumnDef::new(Expenses::UserId).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-bank_account_id")
                            .from(Expenses::Table, Expenses::BankAccountId)
                            .to(BankAccounts::Table, BankAccounts::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-user_id")
                            .from(Expenses::Table, Expenses::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-user_id")
                    .table(Expenses::Table)
                    .col(Expenses::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-recurring_day")
                    .table(Expenses::Table)
                    .col(Expenses::IsRecurring)
                    .col(Expenses::RecurringDay)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BankAccounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
