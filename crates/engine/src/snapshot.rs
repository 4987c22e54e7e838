//! Immutable copy of a ledger handed to delivery sinks.

use serde::{Deserialize, Serialize};

use crate::{AggregateRow, HistoryEntry, LedgerKey};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub key: LedgerKey,
    pub operator: String,
    pub route: String,
    /// Aggregate table in table order; the total row, if any, is last.
    pub aggregate: Vec<AggregateRow>,
    /// History table in append order.
    pub history: Vec<HistoryEntry>,
}

impl LedgerSnapshot {
    pub fn total(&self) -> Option<i64> {
        self.aggregate
            .iter()
            .find(|row| row.is_total)
            .map(|row| row.accumulated_count)
    }

    pub fn row(&self, category: &str) -> Option<&AggregateRow> {
        self.aggregate
            .iter()
            .find(|row| !row.is_total && row.category == category)
    }
}
