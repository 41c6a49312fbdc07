use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create centers table
        manager
            .create_table(
                Table::create()
                    .table(Centers::Table)
                    .if_not_exists()
                    .col(big_integer(Centers::Id).auto_increment().primary_key())
                    .col(string_uniq(Centers::Name))
                    .col(big_integer(Centers::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(big_integer(Users::Id).auto_increment().primary_key())
                    .col(string_uniq(Users::Email))
                    .col(string_null(Users::Name))
                    .col(big_integer(Users::CenterId))
                    .col(big_integer(Users::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // Create servers table
        manager
            .create_table(
                Table::create()
                    .table(Servers::Table)
                    .if_not_exists()
                    .col(big_integer(Servers::Id).auto_increment().primary_key())
                    .col(string_uniq(Servers::Name))
                    .col(big_integer(Servers::CenterId))
                    .col(string_null(Servers::Os))
                    .col(big_integer(Servers::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // Create server_partitions table
        manager
            .create_table(
                Table::create()
                    .table(ServerPartitions::Table)
                    .if_not_exists()
                    .col(
                        big_integer(ServerPartitions::Id)
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(big_integer(ServerPartitions::ServerId))
                    .col(string(ServerPartitions::Letter))
                    .col(big_integer_null(ServerPartitions::CapacityMb))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_server_partitions_server")
                    .table(ServerPartitions::Table)
                    .col(ServerPartitions::ServerId)
                    .to_owned(),
            )
            .await?;

        // Create repositories table
        manager
            .create_table(
                Table::create()
                    .table(Repositories::Table)
                    .if_not_exists()
                    .col(big_integer(Repositories::Id).auto_increment().primary_key())
                    .col(big_integer(Repositories::CenterId))
                    .col(string(Repositories::RepoType))
                    .col(string_null(Repositories::Path))
                    .col(string_null(Repositories::Name))
                    .col(big_integer(Repositories::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // Create schedules table
        manager
            .create_table(
                Table::create()
                    .table(Schedules::Table)
                    .if_not_exists()
                    .col(big_integer(Schedules::Id).auto_increment().primary_key())
                    .col(integer(Schedules::ScheduleType))
                    .col(big_integer(Schedules::CenterId))
                    .col(big_integer(Schedules::OwnerUser))
                    .col(string_null(Schedules::Time))
                    .col(string_null(Schedules::Date))
                    .col(integer_null(Schedules::Weekday))
                    .col(integer_null(Schedules::Day))
                    .col(integer_null(Schedules::Week))
                    .col(integer_null(Schedules::IntervalValue))
                    .col(string_null(Schedules::IntervalUnit))
                    .col(big_integer(Schedules::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // Create jobs table
        manager
            .create_table(
                Table::create()
                    .table(Jobs::Table)
                    .if_not_exists()
                    .col(big_integer(Jobs::Id).auto_increment().primary_key())
                    .col(big_integer(Jobs::OwnerUser))
                    .col(big_integer(Jobs::CenterId))
                    .col(string(Jobs::SystemName))
                    .col(string_uniq(Jobs::JobName))
                    .col(
                        ColumnDef::new(Jobs::JobId)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(string(Jobs::Status))
                    .col(
                        ColumnDef::new(Jobs::ScheduleId)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Jobs::ScheduleIdAdvanced)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(string_null(Jobs::Result))
                    .col(big_integer(Jobs::CreatedAt))
                    .col(big_integer(Jobs::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_jobs_system_name")
                    .table(Jobs::Table)
                    .col(Jobs::SystemName)
                    .to_owned(),
            )
            .await?;

        // Create job_details table (primary key shared with jobs, not generated)
        manager
            .create_table(
                Table::create()
                    .table(JobDetails::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(JobDetails::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(string(JobDetails::BackupMode))
                    .col(
                        ColumnDef::new(JobDetails::Rotation)
                            .big_integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(JobDetails::Compression)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(JobDetails::Encryption)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(string(JobDetails::Partition))
                    .col(string_null(JobDetails::ExcludeDir))
                    .col(big_integer(JobDetails::RepositoryId))
                    .col(string(JobDetails::RepositoryType))
                    .col(string_null(JobDetails::RepositoryPath))
                    .col(
                        ColumnDef::new(JobDetails::NetworkLimit)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(JobDetails::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Jobs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Schedules::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Repositories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ServerPartitions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Servers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Centers::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Centers {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    Name,
    CenterId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Servers {
    Table,
    Id,
    Name,
    CenterId,
    Os,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ServerPartitions {
    Table,
    Id,
    ServerId,
    Letter,
    CapacityMb,
}

#[derive(DeriveIden)]
enum Repositories {
    Table,
    Id,
    CenterId,
    RepoType,
    Path,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Schedules {
    Table,
    Id,
    ScheduleType,
    CenterId,
    OwnerUser,
    Time,
    Date,
    Weekday,
    Day,
    Week,
    IntervalValue,
    IntervalUnit,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Jobs {
    Table,
    Id,
    OwnerUser,
    CenterId,
    SystemName,
    JobName,
    JobId,
    Status,
    ScheduleId,
    ScheduleIdAdvanced,
    Result,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum JobDetails {
    Table,
    Id,
    BackupMode,
    Rotation,
    Compression,
    Encryption,
    Partition,
    ExcludeDir,
    RepositoryId,
    RepositoryType,
    RepositoryPath,
    NetworkLimit,
}
