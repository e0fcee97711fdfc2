//! Link between a reimbursement and the personal debts it settled.

use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "reimbursement_debts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub reimbursement_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub debt_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::reimbursements::Entity",
        from = "Column::ReimbursementId",
        to = "super::reimbursements::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Reimbursement,
    #[sea_orm(
        belongs_to = "super::personal_debts::Entity",
        from = "Column::DebtId",
        to = "super::personal_debts::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    PersonalDebt,
}

impl Related<super::reimbursements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reimbursement.def()
    }
}

impl Related<super::personal_debts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PersonalDebt.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
