use chrono::{NaiveDate, NaiveDateTime};
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{
    AggregateRow, HistoryEntry, LedgerKey, ResultEngine, Tally, aggregate_rows,
};

use super::{Engine, stored_count, with_tx};

/// Outcome of a [`Engine::commit`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReceipt {
    pub key: LedgerKey,
    /// History entries appended by this commit.
    pub entries: usize,
    /// Value of the recomputed total row, `None` when nothing was pending.
    pub total: Option<i64>,
}

impl Engine {
    /// Merge `tally` into its ledger and reset it.
    ///
    /// Only categories with a positive count take part: each one is added to
    /// its aggregate row (created when missing) and gets one history entry
    /// stamped with the running total read at the start of the commit. The
    /// total row is then deleted and recomputed from every other row.
    ///
    /// Everything happens in one DB transaction. On error nothing is written
    /// and `tally` is left as it was.
    pub async fn commit(&self, tally: &mut Tally, at: NaiveDateTime) -> ResultEngine<CommitReceipt> {
        let key = tally.ledger_key();
        let pending = tally.pending();
        if pending.is_empty() {
            tally.reset();
            return Ok(CommitReceipt {
                key,
                entries: 0,
                total: None,
            });
        }

        let running_total = stored_count(tally.running_total());
        let date = at.date();
        let operator = tally.operator().to_string();
        let route = tally.route().to_string();

        let total = with_tx!(self, |db_tx| {
            Self::open_or_create_in(&db_tx, &key, &operator, &route).await?;

            for (category, count) in &pending {
                let quantity = stored_count(*count);
                Self::merge_aggregate(&db_tx, &key, &category.name, quantity, date, &route)
                    .await?;

                let entry = HistoryEntry {
                    date,
                    time: at.time(),
                    route: route.clone(),
                    operator: operator.clone(),
                    category: category.name.clone(),
                    quantity,
                    running_total_at_commit: running_total,
                };
                entry.to_active(key.as_str()).insert(&db_tx).await?;
            }

            Self::recompute_total(&db_tx, &key, date, &route).await
        })?;

        tally.reset();
        tracing::info!(
            "committed {} categories to {key}, total {total}",
            pending.len()
        );

        Ok(CommitReceipt {
            key,
            entries: pending.len(),
            total: Some(total),
        })
    }

    async fn merge_aggregate(
        db_tx: &DatabaseTransaction,
        key: &LedgerKey,
        category: &str,
        quantity: i64,
        date: NaiveDate,
        route: &str,
    ) -> ResultEngine<()> {
        let existing = aggregate_rows::Entity::find()
            .filter(aggregate_rows::Column::LedgerKey.eq(key.as_str()))
            .filter(aggregate_rows::Column::Category.eq(category))
            .filter(aggregate_rows::Column::IsTotal.eq(false))
            .one(db_tx)
            .await?;

        match existing {
            Some(model) => {
                let accumulated = model.accumulated_count + quantity;
                let mut row: aggregate_rows::ActiveModel = model.into();
                row.accumulated_count = ActiveValue::Set(accumulated);
                row.last_date = ActiveValue::Set(Some(date));
                row.last_route = ActiveValue::Set(Some(route.to_string()));
                row.update(db_tx).await?;
            }
            None => {
                let row = AggregateRow {
                    category: category.to_string(),
                    accumulated_count: quantity,
                    last_date: Some(date),
                    last_route: Some(route.to_string()),
                    is_total: false,
                };
                row.to_active(key.as_str()).insert(db_tx).await?;
            }
        }

        Ok(())
    }

    /// Replace the total row with the sum of every other aggregate row.
    async fn recompute_total(
        db_tx: &DatabaseTransaction,
        key: &LedgerKey,
        date: NaiveDate,
        route: &str,
    ) -> ResultEngine<i64> {
        aggregate_rows::Entity::delete_many()
            .filter(aggregate_rows::Column::LedgerKey.eq(key.as_str()))
            .filter(aggregate_rows::Column::IsTotal.eq(true))
            .exec(db_tx)
            .await?;

        let total: i64 = aggregate_rows::Entity::find()
            .filter(aggregate_rows::Column::LedgerKey.eq(key.as_str()))
            .all(db_tx)
            .await?
            .iter()
            .map(|row| row.accumulated_count)
            .sum();

        AggregateRow::total(total, date, route)
            .to_active(key.as_str())
            .insert(db_tx)
            .await?;

        Ok(total)
    }
}
