//! Vehicle tally engine.
//!
//! A counting session keeps a [`Tally`] in memory. [`Engine::commit`] merges
//! it into the durable [`Ledger`] of its (operator, route) pair and
//! [`Engine::finalize`] produces the [`LedgerSnapshot`] handed to delivery.

pub use aggregate_rows::AggregateRow;
pub use categories::{BASE_CATEGORIES, Category, CategoryOrigin, CategoryRegistry, TOTAL_ROW_NAME};
pub use error::EngineError;
pub use history_entries::HistoryEntry;
pub use ledgers::{Ledger, LedgerKey};
pub use ops::{CommitReceipt, Engine, EngineBuilder};
pub use snapshot::LedgerSnapshot;
pub use tally::{CategoryCount, Direction, Tally, TallyView};

mod aggregate_rows;
mod categories;
mod error;
mod history_entries;
mod ledgers;
mod ops;
mod snapshot;
mod tally;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
