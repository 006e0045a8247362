//! Command structs for engine operations.
//!
//! These types group parameters for write operations (add/update entry,
//! create/update account), keeping call sites readable and avoiding long
//! argument lists. Input shape validation (amount positivity, string
//! bounds, day ranges) belongs to the caller; the engine only enforces
//! ledger consistency.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::EntryKind;

/// Create a ledger entry.
#[derive(Clone, Debug)]
pub struct AddEntryCmd {
    pub user_id: String,
    pub amount_minor: i64,
    pub description: String,
    pub category: String,
    pub note: Option<String>,
    pub entry_date: NaiveDate,
    /// Explicit account link; when `None` the user's default account is
    /// resolved, which may itself be absent.
    pub bank_account_id: Option<Uuid>,
    pub kind: EntryKind,
    pub is_recurring: bool,
    pub recurring_day: Option<i32>,
}

impl AddEntryCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        amount_minor: i64,
        description: impl Into<String>,
        category: impl Into<String>,
        entry_date: NaiveDate,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            amount_minor,
            description: description.into(),
            category: category.into(),
            note: None,
            entry_date,
            bank_account_id: None,
            kind: EntryKind::Expense,
            is_recurring: false,
            recurring_day: None,
        }
    }

    #[must_use]
    pub fn kind(mut self, kind: EntryKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    #[must_use]
    pub fn bank_account_id(mut self, account_id: Uuid) -> Self {
        self.bank_account_id = Some(account_id);
        self
    }

    /// Marks the entry as a recurring template materialized monthly on `day`.
    #[must_use]
    pub fn recurring(mut self, day: i32) -> Self {
        self.is_recurring = true;
        self.recurring_day = Some(day);
        self
    }
}

/// Replace a ledger entry's fields.
///
/// The update is a full replacement: the account link is whatever
/// `bank_account_id` says, so passing `None` explicitly unlinks the entry.
/// Only `kind` is patch-like (`None` keeps the stored kind).
#[derive(Clone, Debug)]
pub struct UpdateEntryCmd {
    pub user_id: String,
    pub entry_id: Uuid,
    pub amount_minor: i64,
    pub description: String,
    pub category: String,
    pub note: Option<String>,
    pub entry_date: NaiveDate,
    pub bank_account_id: Option<Uuid>,
    pub kind: Option<EntryKind>,
    pub is_recurring: bool,
    pub recurring_day: Option<i32>,
}

impl UpdateEntryCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        entry_id: Uuid,
        amount_minor: i64,
        description: impl Into<String>,
        category: impl Into<String>,
        entry_date: NaiveDate,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            entry_id,
            amount_minor,
            description: description.into(),
            category: category.into(),
            note: None,
            entry_date,
            bank_account_id: None,
            kind: None,
            is_recurring: false,
            recurring_day: None,
        }
    }

    #[must_use]
    pub fn kind(mut self, kind: EntryKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    #[must_use]
    pub fn bank_account_id(mut self, account_id: Uuid) -> Self {
        self.bank_account_id = Some(account_id);
        self
    }

    #[must_use]
    pub fn recurring(mut self, day: i32) -> Self {
        self.is_recurring = true;
        self.recurring_day = Some(day);
        self
    }
}

/// Create a bank account.
#[derive(Clone, Debug)]
pub struct NewAccountCmd {
    pub user_id: String,
    pub name: String,
    pub balance: i64,
    pub is_default: bool,
    pub is_recurring: bool,
    pub recurring_amount: Option<i64>,
    pub recurring_day: Option<i32>,
}

impl NewAccountCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, name: impl Into<String>, balance: i64) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            balance,
            is_default: false,
            is_recurring: false,
            recurring_amount: None,
            recurring_day: None,
        }
    }

    #[must_use]
    pub fn default_account(mut self) -> Self {
        self.is_default = true;
        self
    }

    /// Configures a monthly credit of `amount_minor` on `day`.
    #[must_use]
    pub fn recurring(mut self, amount_minor: i64, day: i32) -> Self {
        self.is_recurring = true;
        self.recurring_amount = Some(amount_minor);
        self.recurring_day = Some(day);
        self
    }
}

/// Replace a bank account's fields.
#[derive(Clone, Debug)]
pub struct UpdateAccountCmd {
    pub user_id: String,
    pub account_id: Uuid,
    pub name: String,
    pub balance: i64,
    pub is_default: bool,
    pub is_recurring: bool,
    pub recurring_amount: Option<i64>,
    pub recurring_day: Option<i32>,
}

impl UpdateAccountCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        account_id: Uuid,
        name: impl Into<String>,
        balance: i64,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            account_id,
            name: name.into(),
            balance,
            is_default: false,
            is_recurring: false,
            recurring_amount: None,
            recurring_day: None,
        }
    }

    #[must_use]
    pub fn default_account(mut self) -> Self {
        self.is_default = true;
        self
    }

    #[must_use]
    pub fn recurring(mut self, amount_minor: i64, day: i32) -> Self {
        self.is_recurring = true;
        self.recurring_amount = Some(amount_minor);
        self.recurring_day = Some(day);
        self
    }
}
