use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if !manager.has_table("checkout_attempts").await? {
            // Create checkout_attempts table
            manager
                .create_table(
                    Table::create()
                        .table(CheckoutAttempts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CheckoutAttempts::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(CheckoutAttempts::UserId).string().not_null())
                        .col(ColumnDef::new(CheckoutAttempts::ItemId).string().not_null())
                        .col(
                            ColumnDef::new(CheckoutAttempts::Code)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(CheckoutAttempts::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .col(
                            ColumnDef::new(CheckoutAttempts::Used)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .to_owned(),
                )
                .await?;
        }

        if !manager.has_table("sales").await? {
            // Create sales table
            manager
                .create_table(
                    Table::create()
                        .table(Sales::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Sales::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Sales::UserId).string().not_null())
                        .col(ColumnDef::new(Sales::ItemId).string().not_null())
                        .col(ColumnDef::new(Sales::Status).string_len(20).not_null())
                        .col(
                            ColumnDef::new(Sales::PurchasedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .col(ColumnDef::new(Sales::CommittedAt).timestamp_with_time_zone())
                        .to_owned(),
                )
                .await?;

            // Create indexes used by the finalization query
            manager
                .create_index(
                    Index::create()
                        .name("sales_status_idx")
                        .table(Sales::Table)
                        .col(Sales::Status)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("sales_purchased_idx")
                        .table(Sales::Table)
                        .col(Sales::PurchasedAt)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order
        manager
            .drop_table(Table::drop().table(Sales::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(CheckoutAttempts::Table).to_owned())
            .await?;

        Ok(())
    }
}

// Checkout attempts table
#[derive(Iden)]
enum CheckoutAttempts {
    Table,
    Id,
    UserId,
    ItemId,
    Code,
    CreatedAt,
    Used,
}

// Sales table
#[derive(Iden)]
enum Sales {
    Table,
    Id,
    UserId,
    ItemId,
    Status,
    PurchasedAt,
    CommittedAt,
}
