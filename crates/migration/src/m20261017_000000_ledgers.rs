//! Ledger schema.
//!
//! - `ledgers`: one row per (operator, route) key
//! - `aggregate_rows`: accumulated count per category, plus the total row
//! - `history_entries`: append-only log of every commit

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Ledgers {
    Table,
    Key,
    Operator,
    Route,
    CreatedAt,
}

#[derive(Iden)]
enum AggregateRows {
    Table,
    Id,
    LedgerKey,
    Category,
    AccumulatedCount,
    LastDate,
    LastRoute,
    IsTotal,
}

#[derive(Iden)]
enum HistoryEntries {
    Table,
    Id,
    LedgerKey,
    Date,
    Time,
    Route,
    Operator,
    Category,
    Quantity,
    RunningTotalAtCommit,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Ledgers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Ledgers::Key)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Ledgers::Operator).string().not_null())
                    .col(ColumnDef::new(Ledgers::Route).string().not_null())
                    .col(ColumnDef::new(Ledgers::CreatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AggregateRows::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AggregateRows::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AggregateRows::LedgerKey).string().not_null())
                    .col(ColumnDef::new(AggregateRows::Category).string().not_null())
                    .col(
                        ColumnDef::new(AggregateRows::AccumulatedCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(AggregateRows::LastDate).date())
                    .col(ColumnDef::new(AggregateRows::LastRoute).string())
                    .col(
                        ColumnDef::new(AggregateRows::IsTotal)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-aggregate_rows-ledger_key")
                            .from(AggregateRows::Table, AggregateRows::LedgerKey)
                            .to(Ledgers::Table, Ledgers::Key)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-aggregate_rows-ledger_key-category-unique")
                    .table(AggregateRows::Table)
                    .col(AggregateRows::LedgerKey)
                    .col(AggregateRows::Category)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(HistoryEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(HistoryEntries::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(HistoryEntries::LedgerKey).string().not_null())
                    .col(ColumnDef::new(HistoryEntries::Date).date().not_null())
                    .col(ColumnDef::new(HistoryEntries::Time).time().not_null())
                    .col(ColumnDef::new(HistoryEntries::Route).string().not_null())
                    .col(ColumnDef::new(HistoryEntries::Operator).string().not_null())
                    .col(ColumnDef::new(HistoryEntries::Category).string().not_null())
                    .col(
                        ColumnDef::new(HistoryEntries::Quantity)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(HistoryEntries::RunningTotalAtCommit)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-history_entries-ledger_key")
                            .from(HistoryEntries::Table, HistoryEntries::LedgerKey)
                            .to(Ledgers::Table, Ledgers::Key)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-history_entries-ledger_key")
                    .table(HistoryEntries::Table)
                    .col(HistoryEntries::LedgerKey)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(HistoryEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AggregateRows::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Ledgers::Table).to_owned())
            .await?;
        Ok(())
    }
}
