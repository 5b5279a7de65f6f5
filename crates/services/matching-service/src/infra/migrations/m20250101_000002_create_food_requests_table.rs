//! Migration: Create food_requests table.

use domain::{STATUS_FULFILLED, STATUS_PENDING};
use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FoodRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FoodRequests::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FoodRequests::ReceiverId).integer().not_null())
                    .col(ColumnDef::new(FoodRequests::FoodType).string().not_null())
                    .col(ColumnDef::new(FoodRequests::Quantity).integer().not_null())
                    .col(ColumnDef::new(FoodRequests::Location).string().not_null())
                    .col(ColumnDef::new(FoodRequests::Description).text().not_null())
                    .col(
                        ColumnDef::new(FoodRequests::Status)
                            .string()
                            .not_null()
                            .default(STATUS_PENDING)
                            .check(
                                Expr::col(FoodRequests::Status)
                                    .is_in([STATUS_PENDING, STATUS_FULFILLED]),
                            ),
                    )
                    .col(
                        ColumnDef::new(FoodRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_food_requests_receiver_id")
                            .from(FoodRequests::Table, FoodRequests::ReceiverId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Receivers list their own requests on every dashboard load
        manager
            .create_index(
                Index::create()
                    .name("idx_food_requests_receiver_id")
                    .table(FoodRequests::Table)
                    .col(FoodRequests::ReceiverId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_food_requests_receiver_id")
                    .table(FoodRequests::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(FoodRequests::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum FoodRequests {
    Table,
    Id,
    ReceiverId,
    FoodType,
    Quantity,
    Location,
    Description,
    Status,
    CreatedAt,
}
