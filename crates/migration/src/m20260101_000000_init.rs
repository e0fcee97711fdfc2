//! Initial schema migration.
//!
//! Creates the household ledger:
//!
//! - `expenses`: shared costs split 50/50, including generated instances
//! - `recurring_expenses`: templates the generation pass materializes
//! - `personal_debts`: advances between the two participants
//! - `reimbursements`: direct payments between the participants
//! - `reimbursement_debts`: advances settled by a reimbursement

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Expenses {
    Table,
    Id,
    AmountMinor,
    Date,
    PaidBy,
    AddedBy,
    Description,
    PaymentMethod,
    BankAccount,
    Category,
    IsRecurring,
    RecurringId,
    CreatedAt,
}

#[derive(Iden)]
enum RecurringExpenses {
    Table,
    Id,
    AmountMinor,
    PaidBy,
    Description,
    PaymentMethod,
    BankAccount,
    Category,
    Recurrence,
    StartDate,
    LastGeneratedAt,
    IsActive,
    CreatedAt,
}

#[derive(Iden)]
enum PersonalDebts {
    Table,
    Id,
    AmountMinor,
    PaidBy,
    OwedBy,
    Description,
    Date,
    AddedBy,
    IsPaid,
    PaidAt,
    CreatedAt,
}

#[derive(Iden)]
enum Reimbursements {
    Table,
    Id,
    AmountMinor,
    FromParticipant,
    ToParticipant,
    Date,
    Note,
    CreatedAt,
}

#[derive(Iden)]
enum ReimbursementDebts {
    Table,
    ReimbursementId,
    DebtId,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Recurring templates
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(RecurringExpenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RecurringExpenses::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RecurringExpenses::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RecurringExpenses::PaidBy).string().not_null())
                    .col(
                        ColumnDef::new(RecurringExpenses::Description)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RecurringExpenses::PaymentMethod).string())
                    .col(ColumnDef::new(RecurringExpenses::BankAccount).string())
                    .col(ColumnDef::new(RecurringExpenses::Category).string())
                    .col(
                        ColumnDef::new(RecurringExpenses::Recurrence)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecurringExpenses::StartDate)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RecurringExpenses::LastGeneratedAt).timestamp())
                    .col(
                        ColumnDef::new(RecurringExpenses::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(RecurringExpenses::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Expenses
        // ───────────────────────────────────────────────────────────────────
        // `recurring_id` has no foreign key: instances of earlier months
        // outlive their template.
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Expenses::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Expenses::AmountMinor).big_integer().not_null())
                    .col(ColumnDef::new(Expenses::Date).timestamp().not_null())
                    .col(ColumnDef::new(Expenses::PaidBy).string().not_null())
                    .col(ColumnDef::new(Expenses::AddedBy).string().not_null())
                    .col(ColumnDef::new(Expenses::Description).string().not_null())
                    .col(ColumnDef::new(Expenses::PaymentMethod).string())
                    .col(ColumnDef::new(Expenses::BankAccount).string())
                    .col(ColumnDef::new(Expenses::Category).string())
                    .col(
                        ColumnDef::new(Expenses::IsRecurring)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Expenses::RecurringId).uuid())
                    .col(ColumnDef::new(Expenses::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-date")
                    .table(Expenses::Table)
                    .col(Expenses::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-recurring_id")
                    .table(Expenses::Table)
                    .col(Expenses::RecurringId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Personal debts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(PersonalDebts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PersonalDebts::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PersonalDebts::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PersonalDebts::PaidBy).string().not_null())
                    .col(ColumnDef::new(PersonalDebts::OwedBy).string().not_null())
                    .col(ColumnDef::new(PersonalDebts::Description).string().not_null())
                    .col(ColumnDef::new(PersonalDebts::Date).timestamp().not_null())
                    .col(ColumnDef::new(PersonalDebts::AddedBy).string().not_null())
                    .col(
                        ColumnDef::new(PersonalDebts::IsPaid)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(PersonalDebts::PaidAt).timestamp())
                    .col(ColumnDef::new(PersonalDebts::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Reimbursements
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Reimbursements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reimbursements::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Reimbursements::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reimbursements::FromParticipant)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reimbursements::ToParticipant)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Reimbursements::Date).timestamp().not_null())
                    .col(ColumnDef::new(Reimbursements::Note).string())
                    .col(
                        ColumnDef::new(Reimbursements::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Reimbursement ↔ debt links
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ReimbursementDebts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ReimbursementDebts::ReimbursementId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ReimbursementDebts::DebtId).uuid().not_null())
                    .primary_key(
                        Index::create()
                            .col(ReimbursementDebts::ReimbursementId)
                            .col(ReimbursementDebts::DebtId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-reimbursement_debts-reimbursement_id")
                            .from(
                                ReimbursementDebts::Table,
                                ReimbursementDebts::ReimbursementId,
                            )
                            .to(Reimbursements::Table, Reimbursements::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-reimbursement_debts-debt_id")
                            .from(ReimbursementDebts::Table, ReimbursementDebts::DebtId)
                            .to(PersonalDebts::Table, PersonalDebts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-reimbursement_debts-debt_id")
                    .table(ReimbursementDebts::Table)
                    .col(ReimbursementDebts::DebtId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(ReimbursementDebts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Reimbursements::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PersonalDebts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RecurringExpenses::Table).to_owned())
            .await?;
        Ok(())
    }
}
