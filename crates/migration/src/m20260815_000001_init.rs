//! Initial schema. Runs unchanged on SQLite and PostgreSQL: identifiers
//! are 36-char text UUIDs and timestamps are RFC3339 text, so every column
//! binds plain text/int/real/bool values on both backends.

use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Companies {
    Table,
    Id,
    CompanyName,
    FirstName,
    LastName,
    Email,
    PhoneNumber,
    Address,
    City,
    ZipCode,
    Country,
    Website,
    Industry,
    CompanySize,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Roles {
    Table,
    Id,
    CompanyId,
    RoleName,
    Description,
    SystemAdmin,
    CanManageUsers,
    CanManageRoles,
    CreatedAt,
    UpdatedAt,
}

/// One read/edit/delete triple per guarded entity.
pub const ROLE_FLAG_COLUMNS: &[&str] = &[
    "company_access_read",
    "company_access_edit",
    "company_access_delete",
    "user_access_read",
    "user_access_edit",
    "user_access_delete",
    "customer_access_read",
    "customer_access_edit",
    "customer_access_delete",
    "opportunity_access_read",
    "opportunity_access_edit",
    "opportunity_access_delete",
    "work_order_access_read",
    "work_order_access_edit",
    "work_order_access_delete",
    "task_access_read",
    "task_access_edit",
    "task_access_delete",
    "case_access_read",
    "case_access_edit",
    "case_access_delete",
    "event_access_read",
    "event_access_edit",
    "event_access_delete",
    "role_access_read",
    "role_access_edit",
    "role_access_delete",
];

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    CompanyId,
    RoleId,
    Email,
    PasswordHash,
    FirstName,
    LastName,
    PhoneNumber,
    Department,
    Position,
    IsActive,
    LastLoginAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Customers {
    Table,
    Id,
    CompanyId,
    FirstName,
    LastName,
    DateOfBirth,
    MobileNumber,
    Email,
    Address,
    City,
    State,
    ZipCode,
    Country,
    Company,
    JobTitle,
    Industry,
    LeadSource,
    Status,
    Notes,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Tasks {
    Table,
    Id,
    CompanyId,
    CustomerId,
    Title,
    Description,
    Status,
    Priority,
    DueDate,
    CompletedAt,
    AssignedTo,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Opportunities {
    Table,
    Id,
    CompanyId,
    CustomerId,
    Title,
    Description,
    Stage,
    Status,
    Value,
    Probability,
    ExpectedCloseDate,
    AssignedTo,
    Notes,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum WorkOrders {
    Table,
    Id,
    CompanyId,
    CustomerId,
    OpportunityId,
    Title,
    Description,
    Status,
    Priority,
    ScheduledDate,
    CompletedDate,
    EstimatedHours,
    ActualHours,
    Notes,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Cases {
    Table,
    Id,
    CompanyId,
    CustomerId,
    CaseNumber,
    Title,
    Description,
    CaseType,
    Priority,
    Status,
    ContactPerson,
    ContactEmail,
    ContactPhone,
    AssignedTo,
    ResolutionNotes,
    EscalationLevel,
    EscalatedTo,
    EscalationReason,
    SlaDeadline,
    SlaBreached,
    Notes,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Events {
    Table,
    Id,
    CompanyId,
    CustomerId,
    OpportunityId,
    CaseId,
    Title,
    Description,
    StartDate,
    EndDate,
    AllDay,
    Location,
    EventType,
    Status,
    Priority,
    AssignedTo,
    ReminderMinutes,
    Notes,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

fn id_column(name: impl IntoIden) -> ColumnDef {
    let mut column = ColumnDef::new(name);
    column.string_len(36).not_null().primary_key();
    column
}

fn tenant_column() -> ColumnDef {
    let mut column = ColumnDef::new(Alias::new("company_id"));
    column.string_len(36).not_null();
    column
}

fn timestamp_column(name: impl IntoIden) -> ColumnDef {
    let mut column = ColumnDef::new(name);
    column.string_len(40).not_null();
    column
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Companies::Table)
                    .if_not_exists()
                    .col(&mut id_column(Companies::Id))
                    .col(ColumnDef::new(Companies::CompanyName).string_len(100).not_null())
                    .col(ColumnDef::new(Companies::FirstName).string_len(50).not_null())
                    .col(ColumnDef::new(Companies::LastName).string_len(50).not_null())
                    .col(ColumnDef::new(Companies::Email).string_len(100).not_null().unique_key())
                    .col(ColumnDef::new(Companies::PhoneNumber).string_len(20).not_null())
                    .col(ColumnDef::new(Companies::Address).string_len(200))
                    .col(ColumnDef::new(Companies::City).string_len(50))
                    .col(ColumnDef::new(Companies::ZipCode).string_len(10))
                    .col(ColumnDef::new(Companies::Country).string_len(50))
                    .col(ColumnDef::new(Companies::Website).string_len(200))
                    .col(ColumnDef::new(Companies::Industry).string_len(100))
                    .col(ColumnDef::new(Companies::CompanySize).string_len(20))
                    .col(&mut timestamp_column(Companies::CreatedAt))
                    .col(&mut timestamp_column(Companies::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        let mut roles = Table::create()
            .table(Roles::Table)
            .if_not_exists()
            .col(&mut id_column(Roles::Id))
            .col(&mut tenant_column())
            .col(ColumnDef::new(Roles::RoleName).string_len(50).not_null())
            .col(ColumnDef::new(Roles::Description).string_len(200))
            .to_owned();
        for column in ROLE_FLAG_COLUMNS {
            roles.col(
                ColumnDef::new(Alias::new(*column))
                    .boolean()
                    .not_null()
                    .default(false),
            );
        }
        roles
            .col(ColumnDef::new(Roles::SystemAdmin).boolean().not_null().default(false))
            .col(ColumnDef::new(Roles::CanManageUsers).boolean().not_null().default(false))
            .col(ColumnDef::new(Roles::CanManageRoles).boolean().not_null().default(false))
            .col(&mut timestamp_column(Roles::CreatedAt))
            .col(&mut timestamp_column(Roles::UpdatedAt))
            .foreign_key(
                ForeignKey::create()
                    .name("fk_roles_company")
                    .from(Roles::Table, Alias::new("company_id"))
                    .to(Companies::Table, Companies::Id),
            );
        manager.create_table(roles).await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(&mut id_column(Users::Id))
                    .col(&mut tenant_column())
                    .col(ColumnDef::new(Users::RoleId).string_len(36))
                    // Global uniqueness: login is by email alone, with no
                    // tenant in hand yet.
                    .col(ColumnDef::new(Users::Email).string_len(100).not_null().unique_key())
                    .col(ColumnDef::new(Users::PasswordHash).string_len(200).not_null())
                    .col(ColumnDef::new(Users::FirstName).string_len(50))
                    .col(ColumnDef::new(Users::LastName).string_len(50))
                    .col(ColumnDef::new(Users::PhoneNumber).string_len(20))
                    .col(ColumnDef::new(Users::Department).string_len(100))
                    .col(ColumnDef::new(Users::Position).string_len(100))
                    .col(ColumnDef::new(Users::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(Users::LastLoginAt).string_len(40))
                    .col(&mut timestamp_column(Users::CreatedAt))
                    .col(&mut timestamp_column(Users::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_company")
                            .from(Users::Table, Users::CompanyId)
                            .to(Companies::Table, Companies::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Customers::Table)
                    .if_not_exists()
                    .col(&mut id_column(Customers::Id))
                    .col(&mut tenant_column())
                    .col(ColumnDef::new(Customers::FirstName).string_len(50).not_null())
                    .col(ColumnDef::new(Customers::LastName).string_len(50).not_null())
                    .col(ColumnDef::new(Customers::DateOfBirth).string_len(10))
                    .col(ColumnDef::new(Customers::MobileNumber).string_len(20).unique_key())
                    .col(ColumnDef::new(Customers::Email).string_len(100).unique_key())
                    .col(ColumnDef::new(Customers::Address).string_len(200))
                    .col(ColumnDef::new(Customers::City).string_len(50))
                    .col(ColumnDef::new(Customers::State).string_len(50))
                    .col(ColumnDef::new(Customers::ZipCode).string_len(10))
                    .col(ColumnDef::new(Customers::Country).string_len(50))
                    .col(ColumnDef::new(Customers::Company).string_len(100))
                    .col(ColumnDef::new(Customers::JobTitle).string_len(100))
                    .col(ColumnDef::new(Customers::Industry).string_len(100))
                    .col(ColumnDef::new(Customers::LeadSource).string_len(50))
                    .col(ColumnDef::new(Customers::Status).string_len(20))
                    .col(ColumnDef::new(Customers::Notes).string_len(1000))
                    .col(ColumnDef::new(Customers::CreatedBy).string_len(36))
                    .col(&mut timestamp_column(Customers::CreatedAt))
                    .col(&mut timestamp_column(Customers::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_customers_company")
                            .from(Customers::Table, Customers::CompanyId)
                            .to(Companies::Table, Companies::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_customers_company")
                    .table(Customers::Table)
                    .col(Customers::CompanyId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tasks::Table)
                    .if_not_exists()
                    .col(&mut id_column(Tasks::Id))
                    .col(&mut tenant_column())
                    .col(ColumnDef::new(Tasks::CustomerId).string_len(36))
                    .col(ColumnDef::new(Tasks::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Tasks::Description).string_len(1000))
                    .col(ColumnDef::new(Tasks::Status).string_len(20).not_null())
                    .col(ColumnDef::new(Tasks::Priority).string_len(20).not_null())
                    .col(ColumnDef::new(Tasks::DueDate).string_len(40))
                    .col(ColumnDef::new(Tasks::CompletedAt).string_len(40))
                    .col(ColumnDef::new(Tasks::AssignedTo).string_len(36))
                    .col(ColumnDef::new(Tasks::CreatedBy).string_len(36))
                    .col(&mut timestamp_column(Tasks::CreatedAt))
                    .col(&mut timestamp_column(Tasks::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_company")
                            .from(Tasks::Table, Tasks::CompanyId)
                            .to(Companies::Table, Companies::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_customer")
                            .from(Tasks::Table, Tasks::CustomerId)
                            .to(Customers::Table, Customers::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tasks_company")
                    .table(Tasks::Table)
                    .col(Tasks::CompanyId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Opportunities::Table)
                    .if_not_exists()
                    .col(&mut id_column(Opportunities::Id))
                    .col(&mut tenant_column())
                    .col(ColumnDef::new(Opportunities::CustomerId).string_len(36))
                    .col(ColumnDef::new(Opportunities::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Opportunities::Description).string_len(1000))
                    .col(ColumnDef::new(Opportunities::Stage).string_len(30).not_null())
                    .col(ColumnDef::new(Opportunities::Status).string_len(20).not_null())
                    .col(ColumnDef::new(Opportunities::Value).double())
                    .col(ColumnDef::new(Opportunities::Probability).integer())
                    .col(ColumnDef::new(Opportunities::ExpectedCloseDate).string_len(10))
                    .col(ColumnDef::new(Opportunities::AssignedTo).string_len(36))
                    .col(ColumnDef::new(Opportunities::Notes).string_len(1000))
                    .col(ColumnDef::new(Opportunities::CreatedBy).string_len(36))
                    .col(&mut timestamp_column(Opportunities::CreatedAt))
                    .col(&mut timestamp_column(Opportunities::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_opportunities_company")
                            .from(Opportunities::Table, Opportunities::CompanyId)
                            .to(Companies::Table, Companies::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_opportunities_customer")
                            .from(Opportunities::Table, Opportunities::CustomerId)
                            .to(Customers::Table, Customers::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WorkOrders::Table)
                    .if_not_exists()
                    .col(&mut id_column(WorkOrders::Id))
                    .col(&mut tenant_column())
                    .col(ColumnDef::new(WorkOrders::CustomerId).string_len(36))
                    .col(ColumnDef::new(WorkOrders::OpportunityId).string_len(36))
                    .col(ColumnDef::new(WorkOrders::Title).string_len(200).not_null())
                    .col(ColumnDef::new(WorkOrders::Description).string_len(1000))
                    .col(ColumnDef::new(WorkOrders::Status).string_len(20).not_null())
                    .col(ColumnDef::new(WorkOrders::Priority).string_len(20).not_null())
                    .col(ColumnDef::new(WorkOrders::ScheduledDate).string_len(10))
                    .col(ColumnDef::new(WorkOrders::CompletedDate).string_len(10))
                    .col(ColumnDef::new(WorkOrders::EstimatedHours).double())
                    .col(ColumnDef::new(WorkOrders::ActualHours).double())
                    .col(ColumnDef::new(WorkOrders::Notes).string_len(1000))
                    .col(ColumnDef::new(WorkOrders::CreatedBy).string_len(36))
                    .col(&mut timestamp_column(WorkOrders::CreatedAt))
                    .col(&mut timestamp_column(WorkOrders::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_work_orders_company")
                            .from(WorkOrders::Table, WorkOrders::CompanyId)
                            .to(Companies::Table, Companies::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_work_orders_customer")
                            .from(WorkOrders::Table, WorkOrders::CustomerId)
                            .to(Customers::Table, Customers::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Cases::Table)
                    .if_not_exists()
                    .col(&mut id_column(Cases::Id))
                    .col(&mut tenant_column())
                    .col(ColumnDef::new(Cases::CustomerId).string_len(36))
                    .col(ColumnDef::new(Cases::CaseNumber).string_len(20).not_null().unique_key())
                    .col(ColumnDef::new(Cases::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Cases::Description).string_len(2000))
                    .col(ColumnDef::new(Cases::CaseType).string_len(50))
                    .col(ColumnDef::new(Cases::Priority).string_len(20).not_null())
                    .col(ColumnDef::new(Cases::Status).string_len(30).not_null())
                    .col(ColumnDef::new(Cases::ContactPerson).string_len(100))
                    .col(ColumnDef::new(Cases::ContactEmail).string_len(100))
                    .col(ColumnDef::new(Cases::ContactPhone).string_len(20))
                    .col(ColumnDef::new(Cases::AssignedTo).string_len(36))
                    .col(ColumnDef::new(Cases::ResolutionNotes).string_len(2000))
                    .col(ColumnDef::new(Cases::EscalationLevel).integer().not_null().default(0))
                    .col(ColumnDef::new(Cases::EscalatedTo).string_len(36))
                    .col(ColumnDef::new(Cases::EscalationReason).string_len(500))
                    .col(ColumnDef::new(Cases::SlaDeadline).string_len(40))
                    .col(ColumnDef::new(Cases::SlaBreached).boolean().not_null().default(false))
                    .col(ColumnDef::new(Cases::Notes).string_len(1000))
                    .col(ColumnDef::new(Cases::CreatedBy).string_len(36))
                    .col(&mut timestamp_column(Cases::CreatedAt))
                    .col(&mut timestamp_column(Cases::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cases_company")
                            .from(Cases::Table, Cases::CompanyId)
                            .to(Companies::Table, Companies::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cases_customer")
                            .from(Cases::Table, Cases::CustomerId)
                            .to(Customers::Table, Customers::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(&mut id_column(Events::Id))
                    .col(&mut tenant_column())
                    .col(ColumnDef::new(Events::CustomerId).string_len(36))
                    .col(ColumnDef::new(Events::OpportunityId).string_len(36))
                    .col(ColumnDef::new(Events::CaseId).string_len(36))
                    .col(ColumnDef::new(Events::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Events::Description).string_len(1000))
                    .col(ColumnDef::new(Events::StartDate).string_len(40).not_null())
                    .col(ColumnDef::new(Events::EndDate).string_len(40))
                    .col(ColumnDef::new(Events::AllDay).boolean().not_null().default(false))
                    .col(ColumnDef::new(Events::Location).string_len(200))
                    .col(ColumnDef::new(Events::EventType).string_len(30).not_null())
                    .col(ColumnDef::new(Events::Status).string_len(20).not_null())
                    .col(ColumnDef::new(Events::Priority).string_len(20).not_null())
                    .col(ColumnDef::new(Events::AssignedTo).string_len(36))
                    .col(ColumnDef::new(Events::ReminderMinutes).integer())
                    .col(ColumnDef::new(Events::Notes).string_len(1000))
                    .col(ColumnDef::new(Events::CreatedBy).string_len(36))
                    .col(&mut timestamp_column(Events::CreatedAt))
                    .col(&mut timestamp_column(Events::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_events_company")
                            .from(Events::Table, Events::CompanyId)
                            .to(Companies::Table, Companies::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_events_customer")
                            .from(Events::Table, Events::CustomerId)
                            .to(Customers::Table, Customers::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_events_company_start")
                    .table(Events::Table)
                    .col(Events::CompanyId)
                    .col(Events::StartDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            Events::Table.into_iden(),
            Cases::Table.into_iden(),
            WorkOrders::Table.into_iden(),
            Opportunities::Table.into_iden(),
            Tasks::Table.into_iden(),
            Customers::Table.into_iden(),
            Users::Table.into_iden(),
            Roles::Table.into_iden(),
            Companies::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}
