//! The module contains the `BankAccount` struct and its entity.

use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// A bank account.
///
/// An account is a place money lives: a checking account, a cash stash, a
/// card. Its `balance` is denormalized and kept in sync with the linked
/// ledger entries by the engine operations. At most one account per user is
/// marked `is_default`; a recurring account receives `recurring_amount` as
/// an automatic credit every month on `recurring_day`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankAccount {
    /// Stable identifier, generated once and persisted.
    pub id: Uuid,
    pub name: String,
    pub balance: i64,
    pub is_default: bool,
    pub is_recurring: bool,
    pub recurring_amount: i64,
    pub recurring_day: i32,
    pub user_id: String,
}

impl BankAccount {
    pub fn new(name: String, balance: i64, user_id: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            balance,
            is_default: false,
            is_recurring: false,
            recurring_amount: 0,
            recurring_day: 1,
            user_id,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "bank_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub balance: i64,
    pub is_default: bool,
    pub is_recurring: bool,
    pub recurring_amount: i64,
    pub recurring_day: i32,
    pub user_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::entries::Entity")]
    Entries,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Username",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Users,
}

impl Related<super::entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Entries.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&BankAccount> for ActiveModel {
    fn from(account: &BankAccount) -> Self {
        Self {
            id: ActiveValue::Set(account.id.to_string()),
            name: ActiveValue::Set(account.name.clone()),
            balance: ActiveValue::Set(account.balance),
            is_default: ActiveValue::Set(account.is_default),
            is_recurring: ActiveValue::Set(account.is_recurring),
            recurring_amount: ActiveValue::Set(account.recurring_amount),
            recurring_day: ActiveValue::Set(account.recurring_day),
            user_id: ActiveValue::Set(account.user_id.clone()),
        }
    }
}

impl TryFrom<Model> for BankAccount {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::NotFound("bank account".to_string()))?,
            name: model.name,
            balance: model.balance,
            is_default: model.is_default,
            is_recurring: model.is_recurring,
            recurring_amount: model.recurring_amount,
            recurring_day: model.recurring_day,
            user_id: model.user_id,
        })
    }
}

/// Recurring configuration as stored: the amount/day pair is only
/// meaningful while `is_recurring` is set, so it collapses to the model
/// defaults otherwise.
pub(crate) fn normalize_recurring(
    is_recurring: bool,
    recurring_amount: Option<i64>,
    recurring_day: Option<i32>,
) -> ResultEngine<(i64, i32)> {
    if !is_recurring {
        return Ok((0, 1));
    }
    let amount = recurring_amount.unwrap_or(0);
    if amount < 0 {
        return Err(EngineError::InvalidAmount(
            "recurring amount must be >= 0".to_string(),
        ));
    }
    Ok((amount, recurring_day.unwrap_or(1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recurring_fields_collapse_when_not_recurring() {
        assert_eq!(
            normalize_recurring(false, Some(5000), Some(15)).unwrap(),
            (0, 1)
        );
    }

    #[test]
    fn recurring_fields_default_when_missing() {
        assert_eq!(normalize_recurring(true, None, None).unwrap(), (0, 1));
        assert_eq!(
            normalize_recurring(true, Some(500_000), Some(28)).unwrap(),
            (500_000, 28)
        );
    }

    #[test]
    fn negative_recurring_amount_rejected() {
        assert!(normalize_recurring(true, Some(-1), Some(1)).is_err());
    }
}
