use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum WaitlistEntries {
    Table,
    Id,
    Email,
    ZipCode,
    Verified,
    CreatedAt,
}

#[derive(DeriveIden)]
enum VerificationTokens {
    Table,
    Id,
    Email,
    Code,
    ExpiresAt,
    Used,
    CreatedAt,
}

#[derive(DeriveIden)]
enum EmailTemplates {
    Table,
    Id,
    Name,
    Subject,
    HtmlContent,
    FromEmail,
    RecipientType,
    RecipientFilter,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum EmailSegments {
    Table,
    Id,
    TemplateId,
    TemplateName,
    ZipCodes,
    SentAt,
    TotalRecipients,
}

#[derive(DeriveIden)]
enum AdminUsers {
    Table,
    Id,
    Email,
    PasswordHash,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WaitlistEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WaitlistEntries::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(WaitlistEntries::Email)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WaitlistEntries::ZipCode)
                            .string_len(10)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WaitlistEntries::Verified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(WaitlistEntries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_waitlist_entries_email_unique")
                    .table(WaitlistEntries::Table)
                    .col(WaitlistEntries::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(VerificationTokens::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VerificationTokens::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(VerificationTokens::Email)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VerificationTokens::Code)
                            .string_len(6)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VerificationTokens::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VerificationTokens::Used)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(VerificationTokens::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        // verification lookup path (email, code)
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_verification_tokens_email_code")
                    .table(VerificationTokens::Table)
                    .col(VerificationTokens::Email)
                    .col(VerificationTokens::Code)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EmailTemplates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EmailTemplates::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EmailTemplates::Name)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EmailTemplates::Subject)
                            .string_len(998)
                            .not_null(),
                    )
                    .col(ColumnDef::new(EmailTemplates::HtmlContent).text().not_null())
                    .col(ColumnDef::new(EmailTemplates::FromEmail).string_len(255).null())
                    .col(
                        ColumnDef::new(EmailTemplates::RecipientType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(EmailTemplates::RecipientFilter).json_binary().null())
                    .col(
                        ColumnDef::new(EmailTemplates::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(EmailTemplates::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(EmailTemplates::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_email_templates_name_unique")
                    .table(EmailTemplates::Table)
                    .col(EmailTemplates::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // one audit row per campaign send
        manager
            .create_table(
                Table::create()
                    .table(EmailSegments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EmailSegments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EmailSegments::TemplateId).big_integer().null())
                    .col(
                        ColumnDef::new(EmailSegments::TemplateName)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(EmailSegments::ZipCodes).json_binary().null())
                    .col(
                        ColumnDef::new(EmailSegments::SentAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EmailSegments::TotalRecipients)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AdminUsers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AdminUsers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AdminUsers::Email).string_len(255).not_null())
                    .col(
                        ColumnDef::new(AdminUsers::PasswordHash)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AdminUsers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_admin_users_email_unique")
                    .table(AdminUsers::Table)
                    .col(AdminUsers::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(AdminUsers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(EmailSegments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(EmailTemplates::Table).to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(VerificationTokens::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(WaitlistEntries::Table)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
