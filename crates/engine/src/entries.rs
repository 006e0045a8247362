//! The module contains the `Entry` type representing a row in the ledger.
//!
//! Both expenses and income are represented by the `Entry` type; the table
//! keeps its historical name `expenses`. The stored amount is always a
//! non-negative magnitude in minor units, and the sign is derived from
//! [`EntryKind`] only at the point a balance or aggregate is touched, via
//! [`signed_delta`].

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Expense,
    Income,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
        }
    }
}

impl TryFrom<&str> for EntryKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "expense" => Ok(Self::Expense),
            "income" => Ok(Self::Income),
            other => Err(EngineError::InvalidKind(other.to_string())),
        }
    }
}

/// Whether a delta is being applied to a balance or undone from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Apply,
    Reverse,
}

/// Converts `(amount, kind, direction)` into the signed delta to add to a
/// balance or aggregate.
///
/// This is the single source of truth for sign semantics. Every place that
/// touches an account balance must route through it, so that reversing an
/// entry is always the exact inverse of applying it.
#[must_use]
pub fn signed_delta(amount_minor: i64, kind: EntryKind, direction: Direction) -> i64 {
    let applied = match kind {
        EntryKind::Income => amount_minor,
        EntryKind::Expense => -amount_minor,
    };
    match direction {
        Direction::Apply => applied,
        Direction::Reverse => -applied,
    }
}

/// Minimal identity of a linked bank account, carried for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRef {
    pub id: Uuid,
    pub name: String,
}

/// A single ledger entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: Uuid,
    pub amount_minor: i64,
    pub description: String,
    pub category: String,
    pub note: Option<String>,
    pub entry_date: NaiveDate,
    pub kind: EntryKind,
    pub is_recurring: bool,
    pub recurring_day: Option<i32>,
    pub bank_account: Option<AccountRef>,
    pub user_id: String,
}

impl Entry {
    /// Builds an entry from a stored row plus the linked account identity
    /// (resolved separately, since the weak reference may be dangling).
    pub(crate) fn from_model(
        model: Model,
        bank_account: Option<AccountRef>,
    ) -> ResultEngine<Self> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::NotFound("entry".to_string()))?,
            amount_minor: model.amount_minor,
            description: model.description,
            category: model.category,
            note: model.note,
            entry_date: model.entry_date,
            kind: EntryKind::try_from(model.kind.as_str())?,
            is_recurring: model.is_recurring,
            recurring_day: model.recurring_day,
            bank_account,
            user_id: model.user_id,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub amount_minor: i64,
    pub description: String,
    pub category: String,
    pub note: Option<String>,
    pub entry_date: Date,
    pub kind: String,
    pub is_recurring: bool,
    pub recurring_day: Option<i32>,
    pub bank_account_id: Option<String>,
    pub user_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bank_accounts::Entity",
        from = "Column::BankAccountId",
        to = "super::bank_accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    BankAccounts,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Username",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Users,
}

impl Related<super::bank_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankAccounts.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Entry> for ActiveModel {
    fn from(entry: &Entry) -> Self {
        Self {
            id: ActiveValue::Set(entry.id.to_string()),
            amount_minor: ActiveValue::Set(entry.amount_minor),
            description: ActiveValue::Set(entry.description.clone()),
            category: ActiveValue::Set(entry.category.clone()),
            note: ActiveValue::Set(entry.note.clone()),
            entry_date: ActiveValue::Set(entry.entry_date),
            kind: ActiveValue::Set(entry.kind.as_str().to_string()),
            is_recurring: ActiveValue::Set(entry.is_recurring),
            recurring_day: ActiveValue::Set(entry.recurring_day),
            bank_account_id: ActiveValue::Set(
                entry.bank_account.as_ref().map(|a| a.id.to_string()),
            ),
            user_id: ActiveValue::Set(entry.user_id.clone()),
        }
    }
}
