//! Personal advances between the two participants.
//!
//! An advance is money one participant lent the other outside the shared
//! pot. It stays open (`is_paid = false`) until marked paid, either directly
//! or by a reimbursement that settles it.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalDebt {
    pub id: Uuid,
    pub amount: MoneyCents,
    /// Creditor.
    pub paid_by: String,
    /// Debtor.
    pub owed_by: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub added_by: String,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "personal_debts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub amount_minor: i64,
    pub paid_by: String,
    pub owed_by: String,
    pub description: String,
    pub date: DateTimeUtc,
    pub added_by: String,
    pub is_paid: bool,
    pub paid_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::reimbursement_debts::Entity")]
    ReimbursementDebts,
}

impl Related<super::reimbursement_debts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReimbursementDebts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&PersonalDebt> for ActiveModel {
    fn from(debt: &PersonalDebt) -> Self {
        Self {
            id: ActiveValue::Set(debt.id),
            amount_minor: ActiveValue::Set(debt.amount.cents()),
            paid_by: ActiveValue::Set(debt.paid_by.clone()),
            owed_by: ActiveValue::Set(debt.owed_by.clone()),
            description: ActiveValue::Set(debt.description.clone()),
            date: ActiveValue::Set(debt.date),
            added_by: ActiveValue::Set(debt.added_by.clone()),
            is_paid: ActiveValue::Set(debt.is_paid),
            paid_at: ActiveValue::Set(debt.paid_at),
            created_at: ActiveValue::Set(debt.created_at),
        }
    }
}

impl TryFrom<Model> for PersonalDebt {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            amount: MoneyCents::new(model.amount_minor),
            paid_by: model.paid_by,
            owed_by: model.owed_by,
            description: model.description,
            date: model.date,
            added_by: model.added_by,
            is_paid: model.is_paid,
            paid_at: model.paid_at,
            created_at: model.created_at,
        })
    }
}
