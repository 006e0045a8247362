//! Ledger entry operations.
//!
//! Every operation here mutates up to three rows - the entry itself, the
//! linked bank account's balance and the owning user's aggregates - inside
//! one database transaction, so the ledger never holds a partial write.

use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    AddEntryCmd, Direction, Entry, EntryKind, ResultEngine, UpdateEntryCmd, bank_accounts,
    entries, signed_delta,
};

use super::{Engine, account_ref, with_tx};

impl Engine {
    /// Creates a ledger entry for a user.
    ///
    /// When no account is named, the user's default account (if any) takes
    /// the amount; an entry without any account link is legal. The linked
    /// balance and the user's aggregates move in the same transaction as
    /// the insert.
    pub async fn add_entry(&self, cmd: AddEntryCmd) -> ResultEngine<Entry> {
        with_tx!(self, |db_tx| {
            let account_model = match cmd.bank_account_id {
                Some(account_id) => {
                    Some(self.require_account(&db_tx, account_id, &cmd.user_id).await?)
                }
                None => self.default_account_model(&db_tx, &cmd.user_id).await?,
            };

            let entry = Entry {
                id: Uuid::new_v4(),
                amount_minor: cmd.amount_minor,
                description: cmd.description.clone(),
                category: cmd.category.clone(),
                note: cmd.note.clone(),
                entry_date: cmd.entry_date,
                kind: cmd.kind,
                is_recurring: cmd.is_recurring,
                recurring_day: if cmd.is_recurring {
                    cmd.recurring_day
                } else {
                    None
                },
                bank_account: match &account_model {
                    Some(model) => Some(account_ref(model)?),
                    None => None,
                },
                user_id: cmd.user_id.clone(),
            };
            entries::ActiveModel::from(&entry).insert(&db_tx).await?;

            if let Some(account) = &account_model {
                let delta = signed_delta(cmd.amount_minor, cmd.kind, Direction::Apply);
                self.shift_account_balance(&db_tx, account, delta).await?;
            }

            let expenses_delta = match cmd.kind {
                EntryKind::Expense => cmd.amount_minor,
                EntryKind::Income => 0,
            };
            self.shift_user_totals(&db_tx, &cmd.user_id, 1, expenses_delta)
                .await?;

            Ok(entry)
        })
    }

    /// Lists a user's ledger entries with the linked account identity.
    pub async fn entries(&self, user_id: &str) -> ResultEngine<Vec<Entry>> {
        with_tx!(self, |db_tx| {
            let rows = entries::Entity::find()
                .filter(entries::Column::UserId.eq(user_id.to_string()))
                .find_also_related(bank_accounts::Entity)
                .order_by_asc(entries::Column::EntryDate)
                .all(&db_tx)
                .await?;

            let mut result = Vec::with_capacity(rows.len());
            for (model, account) in rows {
                let account = match &account {
                    Some(model) => Some(account_ref(model)?),
                    None => None,
                };
                result.push(Entry::from_model(model, account)?);
            }
            Ok(result)
        })
    }

    /// Replaces an entry's fields, keeping balances and aggregates in sync.
    ///
    /// The old state's effect is reversed before the new state's effect is
    /// applied - not collapsed into a net delta - because the account link
    /// itself may change in the same update: moving an entry from account A
    /// to account B must credit A and debit B independently.
    pub async fn update_entry(&self, cmd: UpdateEntryCmd) -> ResultEngine<Entry> {
        with_tx!(self, |db_tx| {
            let old = self.require_entry(&db_tx, cmd.entry_id, &cmd.user_id).await?;
            let old_kind = EntryKind::try_from(old.kind.as_str())?;
            let new_kind = cmd.kind.unwrap_or(old_kind);

            // 1. Reverse the old effect on the previously linked account.
            //    The link may dangle after an account deletion; that is not
            //    an error, there is simply no balance left to adjust.
            if let Some(old_account_id) = &old.bank_account_id
                && let Some(account) = bank_accounts::Entity::find_by_id(old_account_id.clone())
                    .one(&db_tx)
                    .await?
            {
                let delta = signed_delta(old.amount_minor, old_kind, Direction::Reverse);
                self.shift_account_balance(&db_tx, &account, delta).await?;
            }

            // 2. Rewrite the entry row.
            let recurring_day = if cmd.is_recurring {
                cmd.recurring_day
            } else {
                None
            };
            let active = entries::ActiveModel {
                id: ActiveValue::Set(old.id.clone()),
                amount_minor: ActiveValue::Set(cmd.amount_minor),
                description: ActiveValue::Set(cmd.description.clone()),
                category: ActiveValue::Set(cmd.category.clone()),
                note: ActiveValue::Set(cmd.note.clone()),
                entry_date: ActiveValue::Set(cmd.entry_date),
                kind: ActiveValue::Set(new_kind.as_str().to_string()),
                is_recurring: ActiveValue::Set(cmd.is_recurring),
                recurring_day: ActiveValue::Set(recurring_day),
                bank_account_id: ActiveValue::Set(cmd.bank_account_id.map(|id| id.to_string())),
                ..Default::default()
            };
            active.update(&db_tx).await?;

            // 3. Apply the new effect. The account is re-read after the
            //    reversal so a same-account update sees the fresh balance.
            let new_account = match cmd.bank_account_id {
                Some(account_id) => {
                    Some(self.require_account(&db_tx, account_id, &cmd.user_id).await?)
                }
                None => None,
            };
            if let Some(account) = &new_account {
                let delta = signed_delta(cmd.amount_minor, new_kind, Direction::Apply);
                self.shift_account_balance(&db_tx, account, delta).await?;
            }

            // 4. User aggregates: the entry count is untouched by updates.
            let mut expenses_delta = 0;
            if old_kind == EntryKind::Expense {
                expenses_delta -= old.amount_minor;
            }
            if new_kind == EntryKind::Expense {
                expenses_delta += cmd.amount_minor;
            }
            self.shift_user_totals(&db_tx, &cmd.user_id, 0, expenses_delta)
                .await?;

            Ok(Entry {
                id: cmd.entry_id,
                amount_minor: cmd.amount_minor,
                description: cmd.description.clone(),
                category: cmd.category.clone(),
                note: cmd.note.clone(),
                entry_date: cmd.entry_date,
                kind: new_kind,
                is_recurring: cmd.is_recurring,
                recurring_day,
                bank_account: match &new_account {
                    Some(model) => Some(account_ref(model)?),
                    None => None,
                },
                user_id: cmd.user_id.clone(),
            })
        })
    }

    /// Deletes an entry, undoing its effect on the linked account balance
    /// and the owner's aggregates.
    pub async fn delete_entry(&self, user_id: &str, entry_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_entry(&db_tx, entry_id, user_id).await?;
            let kind = EntryKind::try_from(model.kind.as_str())?;

            if let Some(account_id) = &model.bank_account_id
                && let Some(account) = bank_accounts::Entity::find_by_id(account_id.clone())
                    .one(&db_tx)
                    .await?
            {
                let delta = signed_delta(model.amount_minor, kind, Direction::Reverse);
                self.shift_account_balance(&db_tx, &account, delta).await?;
            }

            entries::Entity::delete_by_id(model.id.clone())
                .exec(&db_tx)
                .await?;

            let expenses_delta = match kind {
                EntryKind::Expense => -model.amount_minor,
                EntryKind::Income => 0,
            };
            self.shift_user_totals(&db_tx, user_id, -1, expenses_delta)
                .await?;

            Ok(())
        })
    }

    /// Fetches a single entry owned by `user_id`.
    pub async fn entry(&self, user_id: &str, entry_id: Uuid) -> ResultEngine<Entry> {
        with_tx!(self, |db_tx| {
            let model = self.require_entry(&db_tx, entry_id, user_id).await?;
            let account = match &model.bank_account_id {
                Some(account_id) => bank_accounts::Entity::find_by_id(account_id.clone())
                    .one(&db_tx)
                    .await?,
                None => None,
            };
            let account = match &account {
                Some(model) => Some(account_ref(model)?),
                None => None,
            };
            Entry::from_model(model, account)
        })
    }
}
