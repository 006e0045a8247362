//! Monthly recurrence materialization.
//!
//! A tick scans two sources keyed on the trigger date's day-of-month:
//! recurring bank accounts (automatic salary-style credits) and recurring
//! entry templates (expenses/income stamped out monthly). The whole tick is
//! one database transaction: either every credit and clone of the day
//! lands, or none do.
//!
//! The scan is stateless - there is no "last materialized" marker - so a
//! second tick on the same calendar day applies everything again. Callers
//! own the cadence.

use chrono::{Datelike, NaiveDate};
use sea_orm::{QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Direction, Entry, EntryKind, MoneyCents, ResultEngine, bank_accounts, entries, signed_delta,
};

use super::{Engine, account_ref, with_tx};

/// Outcome of one scheduler tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RecurringReport {
    /// Recurring bank accounts credited.
    pub accounts_credited: usize,
    /// Recurring entry templates materialized.
    pub entries_materialized: usize,
}

impl Engine {
    /// Runs one recurrence tick for `today`.
    ///
    /// Pass 1 credits every recurring account whose `recurring_day` matches
    /// today's day-of-month and records the credit as an income entry. Pass
    /// 2 clones every matching entry template into a new non-recurring
    /// entry dated today. Account balances and user aggregates move through
    /// the same primitives as user-initiated writes.
    pub async fn process_recurring(&self, today: NaiveDate) -> ResultEngine<RecurringReport> {
        let day = today.day() as i32;
        with_tx!(self, |db_tx| {
            let mut report = RecurringReport::default();

            // Pass 1: recurring bank accounts.
            let recurring_accounts = bank_accounts::Entity::find()
                .filter(bank_accounts::Column::IsRecurring.eq(true))
                .filter(bank_accounts::Column::RecurringDay.eq(day))
                .all(&db_tx)
                .await?;

            for account in recurring_accounts {
                // A pure credit: the configured amount goes straight onto
                // the balance, not through the entry-kind sign logic.
                self.shift_account_balance(&db_tx, &account, account.recurring_amount)
                    .await?;

                let credit = Entry {
                    id: Uuid::new_v4(),
                    amount_minor: account.recurring_amount,
                    description: format!("Recurring credit to {}", account.name),
                    category: "Salary".to_string(),
                    note: Some("Auto-generated from recurring bank account".to_string()),
                    entry_date: today,
                    kind: EntryKind::Income,
                    is_recurring: false,
                    recurring_day: None,
                    bank_account: Some(account_ref(&account)?),
                    user_id: account.user_id.clone(),
                };
                entries::ActiveModel::from(&credit).insert(&db_tx).await?;

                // Income never moves total_expenses.
                self.shift_user_totals(&db_tx, &account.user_id, 1, 0)
                    .await?;

                tracing::info!(
                    account = %account.name,
                    amount = %MoneyCents::new(account.recurring_amount),
                    "credited recurring account"
                );
                report.accounts_credited += 1;
            }

            // Pass 2: recurring entry templates.
            let templates = entries::Entity::find()
                .filter(entries::Column::IsRecurring.eq(true))
                .filter(entries::Column::RecurringDay.eq(day))
                .all(&db_tx)
                .await?;

            for template in templates {
                let kind = EntryKind::try_from(template.kind.as_str())?;

                // The clone keeps the template's account link; the template
                // row itself is untouched and keeps recurring.
                let linked_account = match &template.bank_account_id {
                    Some(account_id) => bank_accounts::Entity::find_by_id(account_id.clone())
                        .one(&db_tx)
                        .await?,
                    None => None,
                };

                let materialized = Entry {
                    id: Uuid::new_v4(),
                    amount_minor: template.amount_minor,
                    description: template.description.clone(),
                    category: template.category.clone(),
                    note: template.note.clone(),
                    entry_date: today,
                    kind,
                    is_recurring: false,
                    recurring_day: None,
                    bank_account: match &linked_account {
                        Some(model) => Some(account_ref(model)?),
                        None => None,
                    },
                    user_id: template.user_id.clone(),
                };
                entries::ActiveModel::from(&materialized)
                    .insert(&db_tx)
                    .await?;

                if let Some(account) = &linked_account {
                    let delta = signed_delta(template.amount_minor, kind, Direction::Apply);
                    self.shift_account_balance(&db_tx, account, delta).await?;
                }

                let expenses_delta = match kind {
                    EntryKind::Expense => template.amount_minor,
                    EntryKind::Income => 0,
                };
                self.shift_user_totals(&db_tx, &template.user_id, 1, expenses_delta)
                    .await?;

                tracing::info!(
                    kind = kind.as_str(),
                    description = %template.description,
                    amount = %MoneyCents::new(template.amount_minor),
                    "materialized recurring entry"
                );
                report.entries_materialized += 1;
            }

            tracing::info!(
                accounts = report.accounts_credited,
                entries = report.entries_materialized,
                "recurrence tick committed"
            );
            Ok(report)
        })
    }
}
