//! Users table.
//!
//! The engine keys ownership by `user_id`, which is the username. The row
//! also carries the denormalized ledger aggregates: `total_expenses` is the
//! running sum (in minor units) of all live expense-kind entries, and
//! `total_transactions` the count of all live entries. Both are maintained
//! exclusively by the ledger operations, inside the same database
//! transaction as the entry write.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,
    pub password: String,
    pub monthly_budget: i64,
    pub total_expenses: i64,
    pub total_transactions: i64,
    pub is_premium: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::bank_accounts::Entity")]
    BankAccounts,
    #[sea_orm(has_many = "super::entries::Entity")]
    Entries,
}

impl Related<super::bank_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankAccounts.def()
    }
}

impl Related<super::entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Entries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
