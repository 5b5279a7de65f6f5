//! Migration: Create donations table with the one-active-donation rule.

use domain::{STATUS_FULFILLED, STATUS_IN_PROGRESS, STATUS_PENDING};
use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_users_table::Users;
use super::m20250101_000002_create_food_requests_table::FoodRequests;

const ONE_ACTIVE_PER_REQUEST_INDEX: &str = "idx_donations_one_active_per_request";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Donations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Donations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Donations::DonorId).integer().not_null())
                    .col(ColumnDef::new(Donations::RequestId).integer().not_null())
                    .col(ColumnDef::new(Donations::Message).text().null())
                    .col(
                        ColumnDef::new(Donations::Status)
                            .string()
                            .not_null()
                            .default(STATUS_PENDING)
                            .check(Expr::col(Donations::Status).is_in([
                                STATUS_PENDING,
                                STATUS_IN_PROGRESS,
                                STATUS_FULFILLED,
                            ])),
                    )
                    .col(
                        ColumnDef::new(Donations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_donations_donor_id")
                            .from(Donations::Table, Donations::DonorId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_donations_request_id")
                            .from(Donations::Table, Donations::RequestId)
                            .to(FoodRequests::Table, FoodRequests::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_donations_donor_id")
                    .table(Donations::Table)
                    .col(Donations::DonorId)
                    .to_owned(),
            )
            .await?;

        // At most one pending/in_progress donation per request. The query
        // builder has no partial index support, so this one is raw SQL
        // (valid on both PostgreSQL and SQLite).
        manager
            .get_connection()
            .execute_unprepared(&format!(
                "CREATE UNIQUE INDEX {} ON donations (request_id) WHERE status <> '{}'",
                ONE_ACTIVE_PER_REQUEST_INDEX, STATUS_FULFILLED
            ))
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(&format!("DROP INDEX IF EXISTS {}", ONE_ACTIVE_PER_REQUEST_INDEX))
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_donations_donor_id")
                    .table(Donations::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Donations::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Donations {
    Table,
    Id,
    DonorId,
    RequestId,
    Message,
    Status,
    CreatedAt,
}
