//! Ledger consistency engine.
//!
//! The engine keeps three kinds of rows mutually consistent under every
//! write: ledger entries (`expenses` table), the denormalized balances of
//! the bank accounts they link to, and the owning user's running
//! aggregates. Each operation runs inside a single database transaction;
//! on any failure the whole operation rolls back and the ledger reads as
//! if it never started.
//!
//! The [`Engine::process_recurring`] tick materializes monthly recurring
//! credits and entry templates through the same primitives.

pub use bank_accounts::BankAccount;
pub use commands::{AddEntryCmd, NewAccountCmd, UpdateAccountCmd, UpdateEntryCmd};
pub use entries::{AccountRef, Direction, Entry, EntryKind, signed_delta};
pub use error::EngineError;
pub use money::MoneyCents;
pub use ops::{Engine, EngineBuilder, RecurringReport};

pub mod bank_accounts;
mod commands;
pub mod entries;
mod error;
mod money;
mod ops;
pub mod users;

type ResultEngine<T> = Result<T, EngineError>;
