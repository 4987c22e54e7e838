use chrono::Utc;
use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    AggregateRow, BASE_CATEGORIES, EngineError, HistoryEntry, Ledger, LedgerKey, LedgerSnapshot,
    ResultEngine, aggregate_rows, history_entries, ledgers, util::normalize_required_name,
};

use super::{Engine, with_tx};

impl Engine {
    /// Open the ledger of (`operator`, `route`), creating it on first use.
    ///
    /// A new ledger gets one zero row per base category and an empty history.
    /// An existing ledger is returned as is.
    pub async fn open_or_create(&self, operator: &str, route: &str) -> ResultEngine<Ledger> {
        let operator = normalize_required_name(operator, "operator")?;
        let route = normalize_required_name(route, "route")?;
        let key = LedgerKey::new(&operator, &route);

        with_tx!(self, |db_tx| {
            Self::open_or_create_in(&db_tx, &key, &operator, &route).await
        })
    }

    /// Same as [`Engine::open_or_create`], inside the caller's transaction.
    pub(super) async fn open_or_create_in<C: ConnectionTrait>(
        db: &C,
        key: &LedgerKey,
        operator: &str,
        route: &str,
    ) -> ResultEngine<Ledger> {
        if let Some(model) = ledgers::Entity::find_by_id(key.as_str().to_string())
            .one(db)
            .await?
        {
            return Ok(model.into());
        }

        let ledger = Ledger {
            key: key.clone(),
            operator: operator.to_string(),
            route: route.to_string(),
            created_at: Utc::now(),
        };
        // Primary key on `key`: a racing creator fails here instead of
        // overwriting the first one.
        ledgers::ActiveModel::from(&ledger).insert(db).await?;

        let seed = BASE_CATEGORIES
            .iter()
            .map(|name| AggregateRow::seed(name).to_active(key.as_str()));
        aggregate_rows::Entity::insert_many(seed)
            .exec_without_returning(db)
            .await?;

        tracing::info!("created ledger {key}");
        Ok(ledger)
    }

    pub async fn ledger(&self, key: &LedgerKey) -> ResultEngine<Option<Ledger>> {
        Ok(ledgers::Entity::find_by_id(key.as_str().to_string())
            .one(&self.database)
            .await?
            .map(Ledger::from))
    }

    pub async fn ledger_exists(&self, key: &LedgerKey) -> ResultEngine<bool> {
        Ok(self.ledger(key).await?.is_some())
    }

    pub async fn list_ledgers(&self) -> ResultEngine<Vec<Ledger>> {
        Ok(ledgers::Entity::find()
            .order_by_asc(ledgers::Column::Key)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Ledger::from)
            .collect())
    }

    /// Read the whole ledger into an immutable [`LedgerSnapshot`].
    ///
    /// Both tables are read in one transaction so a concurrent commit is
    /// either fully in the snapshot or not at all.
    pub async fn finalize(&self, key: &LedgerKey) -> ResultEngine<LedgerSnapshot> {
        let db_tx = self.database.begin().await?;

        let ledger = ledgers::Entity::find_by_id(key.as_str().to_string())
            .one(&db_tx)
            .await?
            .ok_or_else(|| EngineError::UnknownLedger(key.to_string()))?;

        let aggregate = aggregate_rows::Entity::find()
            .filter(aggregate_rows::Column::LedgerKey.eq(key.as_str()))
            .order_by_asc(aggregate_rows::Column::Id)
            .all(&db_tx)
            .await?
            .into_iter()
            .map(AggregateRow::from)
            .collect();

        let history = history_entries::Entity::find()
            .filter(history_entries::Column::LedgerKey.eq(key.as_str()))
            .order_by_asc(history_entries::Column::Id)
            .all(&db_tx)
            .await?
            .into_iter()
            .map(HistoryEntry::from)
            .collect();

        db_tx.commit().await?;

        Ok(LedgerSnapshot {
            key: key.clone(),
            operator: ledger.operator,
            route: ledger.route,
            aggregate,
            history,
        })
    }
}
