//! Append-only history of a ledger. One entry per category and commit; rows
//! are never updated or deleted.

use chrono::{NaiveDate, NaiveTime};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub route: String,
    pub operator: String,
    pub category: String,
    pub quantity: i64,
    /// Session running total when the commit started. Shared by every entry
    /// of the same commit.
    pub running_total_at_commit: i64,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "history_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub ledger_key: String,
    pub date: Date,
    pub time: Time,
    pub route: String,
    pub operator: String,
    pub category: String,
    pub quantity: i64,
    pub running_total_at_commit: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ledgers::Entity",
        from = "Column::LedgerKey",
        to = "super::ledgers::Column::Key",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Ledger,
}

impl Related<super::ledgers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ledger.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl HistoryEntry {
    pub(crate) fn to_active(&self, ledger_key: &str) -> ActiveModel {
        ActiveModel {
            id: ActiveValue::NotSet,
            ledger_key: ActiveValue::Set(ledger_key.to_string()),
            date: ActiveValue::Set(self.date),
            time: ActiveValue::Set(self.time),
            route: ActiveValue::Set(self.route.clone()),
            operator: ActiveValue::Set(self.operator.clone()),
            category: ActiveValue::Set(self.category.clone()),
            quantity: ActiveValue::Set(self.quantity),
            running_total_at_commit: ActiveValue::Set(self.running_total_at_commit),
        }
    }
}

impl From<Model> for HistoryEntry {
    fn from(model: Model) -> Self {
        Self {
            date: model.date,
            time: model.time,
            route: model.route,
            operator: model.operator,
            category: model.category,
            quantity: model.quantity,
            running_total_at_commit: model.running_total_at_commit,
        }
    }
}
