//! Bank account management.
//!
//! Enforces the "at most one default account per user" invariant: any
//! operation that marks an account as default clears the flag on the user's
//! other accounts inside the same transaction. The default flag is then
//! consumed read-only by the entry operations through
//! [`Engine::default_account_model`].

use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    BankAccount, NewAccountCmd, ResultEngine, UpdateAccountCmd, bank_accounts,
    bank_accounts::normalize_recurring, entries,
};

use super::{Engine, with_tx};

impl Engine {
    /// Creates a bank account.
    pub async fn new_account(&self, cmd: NewAccountCmd) -> ResultEngine<BankAccount> {
        let (recurring_amount, recurring_day) =
            normalize_recurring(cmd.is_recurring, cmd.recurring_amount, cmd.recurring_day)?;
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, &cmd.user_id).await?;

            if cmd.is_default {
                self.clear_default_flags(&db_tx, &cmd.user_id).await?;
            }

            let account = BankAccount {
                id: Uuid::new_v4(),
                name: cmd.name.trim().to_string(),
                balance: cmd.balance,
                is_default: cmd.is_default,
                is_recurring: cmd.is_recurring,
                recurring_amount,
                recurring_day,
                user_id: cmd.user_id.clone(),
            };
            bank_accounts::ActiveModel::from(&account)
                .insert(&db_tx)
                .await?;
            Ok(account)
        })
    }

    /// Lists a user's bank accounts.
    pub async fn accounts(&self, user_id: &str) -> ResultEngine<Vec<BankAccount>> {
        with_tx!(self, |db_tx| {
            let models = bank_accounts::Entity::find()
                .filter(bank_accounts::Column::UserId.eq(user_id.to_string()))
                .all(&db_tx)
                .await?;
            models.into_iter().map(BankAccount::try_from).collect()
        })
    }

    /// Replaces an account's fields.
    ///
    /// Promoting an account to default demotes the user's other accounts in
    /// the same transaction, keeping the uniqueness invariant. The balance
    /// is directly settable here; the ledger operations treat whatever value
    /// is stored as the new opening point.
    pub async fn update_account(&self, cmd: UpdateAccountCmd) -> ResultEngine<BankAccount> {
        let (recurring_amount, recurring_day) =
            normalize_recurring(cmd.is_recurring, cmd.recurring_amount, cmd.recurring_day)?;
        with_tx!(self, |db_tx| {
            let model = self
                .require_account(&db_tx, cmd.account_id, &cmd.user_id)
                .await?;

            if cmd.is_default && !model.is_default {
                self.clear_default_flags(&db_tx, &cmd.user_id).await?;
            }

            let active = bank_accounts::ActiveModel {
                id: ActiveValue::Set(model.id.clone()),
                name: ActiveValue::Set(cmd.name.trim().to_string()),
                balance: ActiveValue::Set(cmd.balance),
                is_default: ActiveValue::Set(cmd.is_default),
                is_recurring: ActiveValue::Set(cmd.is_recurring),
                recurring_amount: ActiveValue::Set(recurring_amount),
                recurring_day: ActiveValue::Set(recurring_day),
                ..Default::default()
            };
            let updated = active.update(&db_tx).await?;
            BankAccount::try_from(updated)
        })
    }

    /// Deletes an account, detaching its ledger entries.
    ///
    /// Entries are never cascaded: their account link is set to NULL so the
    /// expense history survives the account.
    pub async fn delete_account(&self, user_id: &str, account_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_account(&db_tx, account_id, user_id).await?;

            entries::Entity::update_many()
                .col_expr(entries::Column::BankAccountId, Expr::value(Option::<String>::None))
                .filter(entries::Column::BankAccountId.eq(model.id.clone()))
                .exec(&db_tx)
                .await?;

            bank_accounts::Entity::delete_by_id(model.id.clone())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Returns a single account owned by `user_id`.
    pub async fn account(&self, user_id: &str, account_id: Uuid) -> ResultEngine<BankAccount> {
        with_tx!(self, |db_tx| {
            let model = self.require_account(&db_tx, account_id, user_id).await?;
            BankAccount::try_from(model)
        })
    }

    /// Returns the user's default account, if one is marked.
    pub async fn default_account(&self, user_id: &str) -> ResultEngine<Option<BankAccount>> {
        with_tx!(self, |db_tx| {
            let model = self.default_account_model(&db_tx, user_id).await?;
            model.map(BankAccount::try_from).transpose()
        })
    }

    /// Default Account Resolver: the row-level lookup shared with
    /// `add_entry` when the caller names no account.
    pub(crate) async fn default_account_model(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<Option<bank_accounts::Model>> {
        let model = bank_accounts::Entity::find()
            .filter(bank_accounts::Column::UserId.eq(user_id.to_string()))
            .filter(bank_accounts::Column::IsDefault.eq(true))
            .one(db_tx)
            .await?;
        Ok(model)
    }

    async fn clear_default_flags(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<()> {
        bank_accounts::Entity::update_many()
            .col_expr(bank_accounts::Column::IsDefault, Expr::value(false))
            .filter(bank_accounts::Column::UserId.eq(user_id.to_string()))
            .exec(db_tx)
            .await?;
        Ok(())
    }
}
