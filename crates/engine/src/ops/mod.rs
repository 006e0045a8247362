use sea_orm::{
    ActiveValue, DatabaseConnection, DatabaseTransaction, QueryFilter, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{AccountRef, EngineError, ResultEngine, bank_accounts, entries, users};

mod accounts;
mod entries_ops;
mod recurring;

pub use recurring::RecurringReport;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Returns a user's stored row, aggregates included.
    pub async fn user(&self, user_id: &str) -> ResultEngine<users::Model> {
        with_tx!(self, |db_tx| { self.require_user(&db_tx, user_id).await })
    }

    /// Loads an entry row and checks ownership.
    ///
    /// Detection happens before any mutation: a missing row short-circuits
    /// with `NotFound` and a foreign owner with `Forbidden`, leaving no side
    /// effects in either case.
    pub(crate) async fn require_entry(
        &self,
        db_tx: &DatabaseTransaction,
        entry_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<entries::Model> {
        let model = entries::Entity::find_by_id(entry_id.to_string())
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::NotFound("entry".to_string()))?;
        if model.user_id != user_id {
            return Err(EngineError::Forbidden(
                "entry belongs to another user".to_string(),
            ));
        }
        Ok(model)
    }

    /// Loads a bank account owned by `user_id`.
    ///
    /// An account that exists but belongs to someone else is reported as
    /// `NotFound` too, so callers cannot probe other users' account ids.
    pub(crate) async fn require_account(
        &self,
        db_tx: &DatabaseTransaction,
        account_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<bank_accounts::Model> {
        bank_accounts::Entity::find_by_id(account_id.to_string())
            .filter(bank_accounts::Column::UserId.eq(user_id.to_string()))
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::NotFound("bank account".to_string()))
    }

    pub(crate) async fn require_user(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id.to_string())
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::NotFound("user".to_string()))
    }

    /// Adds `delta_minor` to a stored account balance.
    pub(crate) async fn shift_account_balance(
        &self,
        db_tx: &DatabaseTransaction,
        account: &bank_accounts::Model,
        delta_minor: i64,
    ) -> ResultEngine<()> {
        let active = bank_accounts::ActiveModel {
            id: ActiveValue::Set(account.id.clone()),
            balance: ActiveValue::Set(account.balance + delta_minor),
            ..Default::default()
        };
        active.update(db_tx).await?;
        Ok(())
    }

    /// Adjusts the owning user's denormalized aggregates.
    ///
    /// `transactions_delta` moves `total_transactions` (+1 on create, -1 on
    /// delete, 0 on update); `expenses_delta` moves `total_expenses` and is
    /// already signed by the caller via [`crate::signed_delta`] semantics.
    pub(crate) async fn shift_user_totals(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        transactions_delta: i64,
        expenses_delta: i64,
    ) -> ResultEngine<()> {
        let user = self.require_user(db_tx, user_id).await?;
        let active = users::ActiveModel {
            username: ActiveValue::Set(user.username.clone()),
            total_expenses: ActiveValue::Set(user.total_expenses + expenses_delta),
            total_transactions: ActiveValue::Set(user.total_transactions + transactions_delta),
            ..Default::default()
        };
        active.update(db_tx).await?;
        Ok(())
    }
}

/// Minimal display identity for a linked account.
pub(crate) fn account_ref(model: &bank_accounts::Model) -> ResultEngine<AccountRef> {
    Ok(AccountRef {
        id: Uuid::parse_str(&model.id)
            .map_err(|_| EngineError::NotFound("bank account".to_string()))?,
        name: model.name.clone(),
    })
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
