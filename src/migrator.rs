use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_users_table::Migration),
            Box::new(m20240301_000002_create_partners_table::Migration),
            Box::new(m20240301_000003_create_bikes_tables::Migration),
            Box::new(m20240301_000004_create_purchase_orders_tables::Migration),
            Box::new(m20240301_000005_create_expenses_tables::Migration),
            Box::new(m20240301_000006_create_content_tables::Migration),
        ]
    }
}

mod m20240301_000001_create_users_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_users_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Users::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Users::Name).string().not_null())
                        .col(
                            ColumnDef::new(Users::Email)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                        .col(ColumnDef::new(Users::Role).string_len(32).not_null())
                        .col(
                            ColumnDef::new(Users::IsVerified)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Users::VerificationTokenHash).string().null())
                        .col(
                            ColumnDef::new(Users::VerificationExpiresAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Users::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Users::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_users_verification_token_hash")
                        .table(Users::Table)
                        .col(Users::VerificationTokenHash)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Id,
        Name,
        Email,
        PasswordHash,
        Role,
        IsVerified,
        VerificationTokenHash,
        VerificationExpiresAt,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000002_create_partners_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_partners_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Partners::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Partners::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Partners::Name).string().not_null())
                        .col(
                            ColumnDef::new(Partners::Email)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Partners::Phone).string().null())
                        .col(ColumnDef::new(Partners::Address).string().null())
                        .col(ColumnDef::new(Partners::Notes).text().null())
                        .col(
                            ColumnDef::new(Partners::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Partners::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Partners::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Partners::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Partners {
        Table,
        Id,
        Name,
        Email,
        Phone,
        Address,
        Notes,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000003_create_bikes_tables {
    use super::m20240301_000002_create_partners_table::Partners;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000003_create_bikes_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Bikes::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Bikes::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Bikes::Name).string().not_null())
                        .col(ColumnDef::new(Bikes::Brand).string().not_null())
                        .col(ColumnDef::new(Bikes::Model).string().not_null())
                        .col(ColumnDef::new(Bikes::Year).integer().not_null())
                        .col(
                            ColumnDef::new(Bikes::Mileage)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Bikes::Description).text().null())
                        .col(ColumnDef::new(Bikes::ImageUrl).string().null())
                        .col(ColumnDef::new(Bikes::Price).decimal_len(14, 2).not_null())
                        .col(
                            ColumnDef::new(Bikes::PurchasePrice)
                                .decimal_len(14, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Bikes::MyShare).decimal_len(14, 2).null())
                        .col(ColumnDef::new(Bikes::Status).string_len(32).not_null())
                        .col(
                            ColumnDef::new(Bikes::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Bikes::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_bikes_status")
                        .table(Bikes::Table)
                        .col(Bikes::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(BikePartners::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(BikePartners::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(BikePartners::BikeId).uuid().not_null())
                        .col(ColumnDef::new(BikePartners::PartnerId).uuid().not_null())
                        .col(
                            ColumnDef::new(BikePartners::Percentage)
                                .decimal_len(7, 4)
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_bike_partners_bike")
                                .from(BikePartners::Table, BikePartners::BikeId)
                                .to(Bikes::Table, Bikes::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_bike_partners_partner")
                                .from(BikePartners::Table, BikePartners::PartnerId)
                                .to(Partners::Table, Partners::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_bike_partners_bike_partner")
                        .table(BikePartners::Table)
                        .col(BikePartners::BikeId)
                        .col(BikePartners::PartnerId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_bike_partners_partner_id")
                        .table(BikePartners::Table)
                        .col(BikePartners::PartnerId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(BikePartners::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Bikes::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Bikes {
        Table,
        Id,
        Name,
        Brand,
        Model,
        Year,
        Mileage,
        Description,
        ImageUrl,
        Price,
        PurchasePrice,
        MyShare,
        Status,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum BikePartners {
        Table,
        Id,
        BikeId,
        PartnerId,
        Percentage,
    }
}

mod m20240301_000004_create_purchase_orders_tables {
    use super::m20240301_000002_create_partners_table::Partners;
    use super::m20240301_000003_create_bikes_tables::Bikes;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000004_create_purchase_orders_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PurchaseOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseOrders::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PurchaseOrders::BikeId).uuid().not_null())
                        .col(ColumnDef::new(PurchaseOrders::BuyerName).string().not_null())
                        .col(
                            ColumnDef::new(PurchaseOrders::BuyerEmail)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PurchaseOrders::BuyerPhone).string().null())
                        .col(ColumnDef::new(PurchaseOrders::BuyerAddress).string().null())
                        .col(
                            ColumnDef::new(PurchaseOrders::Amount)
                                .decimal_len(14, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::Profit)
                                .decimal_len(14, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::Status)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::PaymentStatus)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::PaymentMethod)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(ColumnDef::new(PurchaseOrders::Notes).text().null())
                        .col(
                            ColumnDef::new(PurchaseOrders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchase_orders_bike")
                                .from(PurchaseOrders::Table, PurchaseOrders::BikeId)
                                .to(Bikes::Table, Bikes::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchase_orders_status")
                        .table(PurchaseOrders::Table)
                        .col(PurchaseOrders::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchase_orders_created_at")
                        .table(PurchaseOrders::Table)
                        .col(PurchaseOrders::CreatedAt)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PurchaseOrderPartnerProfits::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseOrderPartnerProfits::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderPartnerProfits::PurchaseOrderId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderPartnerProfits::PartnerId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderPartnerProfits::Profit)
                                .decimal_len(14, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderPartnerProfits::SharePercentage)
                                .decimal_len(7, 4)
                                .not_null()
                                .default(0),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_po_partner_profits_order")
                                .from(
                                    PurchaseOrderPartnerProfits::Table,
                                    PurchaseOrderPartnerProfits::PurchaseOrderId,
                                )
                                .to(PurchaseOrders::Table, PurchaseOrders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_po_partner_profits_partner")
                                .from(
                                    PurchaseOrderPartnerProfits::Table,
                                    PurchaseOrderPartnerProfits::PartnerId,
                                )
                                .to(Partners::Table, Partners::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_po_partner_profits_order_id")
                        .table(PurchaseOrderPartnerProfits::Table)
                        .col(PurchaseOrderPartnerProfits::PurchaseOrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(
                    Table::drop()
                        .table(PurchaseOrderPartnerProfits::Table)
                        .to_owned(),
                )
                .await?;
            manager
                .drop_table(Table::drop().table(PurchaseOrders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum PurchaseOrders {
        Table,
        Id,
        BikeId,
        BuyerName,
        BuyerEmail,
        BuyerPhone,
        BuyerAddress,
        Amount,
        Profit,
        Status,
        PaymentStatus,
        PaymentMethod,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum PurchaseOrderPartnerProfits {
        Table,
        Id,
        PurchaseOrderId,
        PartnerId,
        Profit,
        SharePercentage,
    }
}

mod m20240301_000005_create_expenses_tables {
    use super::m20240301_000002_create_partners_table::Partners;
    use super::m20240301_000003_create_bikes_tables::Bikes;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000005_create_expenses_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Expenses::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Expenses::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Expenses::BikeId).uuid().not_null())
                        .col(ColumnDef::new(Expenses::PartnerId).uuid().null())
                        .col(ColumnDef::new(Expenses::Amount).decimal_len(14, 2).not_null())
                        .col(
                            ColumnDef::new(Expenses::ExpenseType)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Expenses::Description).text().not_null())
                        .col(
                            ColumnDef::new(Expenses::ExpenseDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Expenses::AdjustBikePrice)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Expenses::AdjustPartnerShares)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Expenses::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Expenses::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_expenses_bike")
                                .from(Expenses::Table, Expenses::BikeId)
                                .to(Bikes::Table, Bikes::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_expenses_partner")
                                .from(Expenses::Table, Expenses::PartnerId)
                                .to(Partners::Table, Partners::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_expenses_bike_id")
                        .table(Expenses::Table)
                        .col(Expenses::BikeId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(BikeServiceRecords::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(BikeServiceRecords::BikeId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(BikeServiceRecords::ExpenseId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(BikeServiceRecords::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .primary_key(
                            Index::create()
                                .col(BikeServiceRecords::BikeId)
                                .col(BikeServiceRecords::ExpenseId),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_bike_service_records_bike")
                                .from(BikeServiceRecords::Table, BikeServiceRecords::BikeId)
                                .to(Bikes::Table, Bikes::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_bike_service_records_expense")
                                .from(BikeServiceRecords::Table, BikeServiceRecords::ExpenseId)
                                .to(Expenses::Table, Expenses::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(BikeServiceRecords::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Expenses::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Expenses {
        Table,
        Id,
        BikeId,
        PartnerId,
        Amount,
        ExpenseType,
        Description,
        ExpenseDate,
        AdjustBikePrice,
        AdjustPartnerShares,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum BikeServiceRecords {
        Table,
        BikeId,
        ExpenseId,
        CreatedAt,
    }
}

mod m20240301_000006_create_content_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000006_create_content_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(BikeWashLocations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(BikeWashLocations::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(BikeWashLocations::Name).string().not_null())
                        .col(
                            ColumnDef::new(BikeWashLocations::Address)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(BikeWashLocations::City).string().not_null())
                        .col(ColumnDef::new(BikeWashLocations::Phone).string().null())
                        .col(ColumnDef::new(BikeWashLocations::Services).json().not_null())
                        .col(
                            ColumnDef::new(BikeWashLocations::PriceFrom)
                                .decimal_len(14, 2)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(BikeWashLocations::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(BikeWashLocations::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(BikeWashLocations::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PublicInfo::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PublicInfo::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PublicInfo::Title).string().not_null())
                        .col(ColumnDef::new(PublicInfo::Content).text().not_null())
                        .col(ColumnDef::new(PublicInfo::Category).string().not_null())
                        .col(
                            ColumnDef::new(PublicInfo::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(PublicInfo::SortOrder)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PublicInfo::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PublicInfo::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_public_info_category")
                        .table(PublicInfo::Table)
                        .col(PublicInfo::Category)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PublicInfo::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(BikeWashLocations::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum BikeWashLocations {
        Table,
        Id,
        Name,
        Address,
        City,
        Phone,
        Services,
        PriceFrom,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum PublicInfo {
        Table,
        Id,
        Title,
        Content,
        Category,
        IsActive,
        SortOrder,
        CreatedAt,
        UpdatedAt,
    }
}
