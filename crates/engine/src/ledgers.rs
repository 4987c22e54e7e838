//! The `Ledger` is the durable record of one (operator, route) pair. It owns
//! an aggregate table and a history table, see
//! [`aggregate_rows`](crate::aggregate_rows) and
//! [`history_entries`](crate::history_entries).

use std::fmt;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::util::underscore_whitespace;

const KEY_PREFIX: &str = "registro";

/// Deterministic identity of a ledger: `registro_<operator>_<route>` with
/// whitespace runs replaced by `_`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LedgerKey(String);

impl LedgerKey {
    pub fn new(operator: &str, route: &str) -> Self {
        Self(format!(
            "{KEY_PREFIX}_{}_{}",
            underscore_whitespace(operator),
            underscore_whitespace(route)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LedgerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    pub key: LedgerKey,
    pub operator: String,
    pub route: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "ledgers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    pub operator: String,
    pub route: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::aggregate_rows::Entity")]
    AggregateRows,
    #[sea_orm(has_many = "super::history_entries::Entity")]
    HistoryEntries,
}

impl Related<super::aggregate_rows::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AggregateRows.def()
    }
}

impl Related<super::history_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HistoryEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Ledger> for ActiveModel {
    fn from(value: &Ledger) -> Self {
        Self {
            key: ActiveValue::Set(value.key.as_str().to_string()),
            operator: ActiveValue::Set(value.operator.clone()),
            route: ActiveValue::Set(value.route.clone()),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl From<Model> for Ledger {
    fn from(model: Model) -> Self {
        Self {
            key: LedgerKey(model.key),
            operator: model.operator,
            route: model.route,
            created_at: model.created_at,
        }
    }
}
