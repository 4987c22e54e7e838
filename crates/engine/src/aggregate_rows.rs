//! Aggregate table of a ledger: one accumulated counter per category plus
//! the synthetic total row.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::TOTAL_ROW_NAME;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub category: String,
    pub accumulated_count: i64,
    pub last_date: Option<NaiveDate>,
    pub last_route: Option<String>,
    pub is_total: bool,
}

impl AggregateRow {
    /// A zero row with blank date/route, as seeded for base categories.
    pub(crate) fn seed(category: &str) -> Self {
        Self {
            category: category.to_string(),
            accumulated_count: 0,
            last_date: None,
            last_route: None,
            is_total: false,
        }
    }

    pub(crate) fn total(value: i64, date: NaiveDate, route: &str) -> Self {
        Self {
            category: TOTAL_ROW_NAME.to_string(),
            accumulated_count: value,
            last_date: Some(date),
            last_route: Some(route.to_string()),
            is_total: true,
        }
    }

    pub(crate) fn to_active(&self, ledger_key: &str) -> ActiveModel {
        ActiveModel {
            id: ActiveValue::NotSet,
            ledger_key: ActiveValue::Set(ledger_key.to_string()),
            category: ActiveValue::Set(self.category.clone()),
            accumulated_count: ActiveValue::Set(self.accumulated_count),
            last_date: ActiveValue::Set(self.last_date),
            last_route: ActiveValue::Set(self.last_route.clone()),
            is_total: ActiveValue::Set(self.is_total),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "aggregate_rows")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub ledger_key: String,
    pub category: String,
    pub accumulated_count: i64,
    pub last_date: Option<Date>,
    pub last_route: Option<String>,
    pub is_total: bool,
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

impl From<Model> for AggregateRow {
    fn from(model: Model) -> Self {
        Self {
            category: model.category,
            accumulated_count: model.accumulated_count,
            last_date: model.last_date,
            last_route: model.last_route,
            is_total: model.is_total,
        }
    }
}
