//! Direct payments from one participant to the other.
//!
//! A reimbursement shifts the monthly balance by its amount. It may also
//! settle a list of personal debts; the links live in
//! [`reimbursement_debts`](crate::reimbursement_debts) so that deleting the
//! reimbursement can reopen exactly those debts.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::MoneyCents;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reimbursement {
    pub id: Uuid,
    pub amount: MoneyCents,
    pub from: String,
    pub to: String,
    pub date: DateTime<Utc>,
    pub note: Option<String>,
    pub settled_debt_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "reimbursements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub amount_minor: i64,
    pub from_participant: String,
    pub to_participant: String,
    pub date: DateTimeUtc,
    pub note: Option<String>,
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

impl From<&Reimbursement> for ActiveModel {
    fn from(reimbursement: &Reimbursement) -> Self {
        Self {
            id: ActiveValue::Set(reimbursement.id),
            amount_minor: ActiveValue::Set(reimbursement.amount.cents()),
            from_participant: ActiveValue::Set(reimbursement.from.clone()),
            to_participant: ActiveValue::Set(reimbursement.to.clone()),
            date: ActiveValue::Set(reimbursement.date),
            note: ActiveValue::Set(reimbursement.note.clone()),
            created_at: ActiveValue::Set(reimbursement.created_at),
        }
    }
}

impl Reimbursement {
    pub(crate) fn from_model(model: Model, settled_debt_ids: Vec<Uuid>) -> Self {
        Self {
            id: model.id,
            amount: MoneyCents::new(model.amount_minor),
            from: model.from_participant,
            to: model.to_participant,
            date: model.date,
            note: model.note,
            settled_debt_ids,
            created_at: model.created_at,
        }
    }
}
