use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, NewPersonalDebtCmd, PersonalDebt, ResultEngine, personal_debts,
    util::{distinct_parties, normalize_required_text},
};

use super::{Engine, with_tx};

impl Engine {
    /// Records a personal advance. Creditor and debtor must differ.
    pub async fn create_personal_debt(&self, cmd: NewPersonalDebtCmd) -> ResultEngine<PersonalDebt> {
        let amount = cmd.amount.ensure_storable("amount")?;
        let (paid_by, owed_by) = distinct_parties(&cmd.paid_by, &cmd.owed_by, ("paid_by", "owed_by"))?;
        let description = normalize_required_text(&cmd.description, "description")?;
        let added_by = normalize_required_text(&cmd.added_by, "added_by")?;

        let debt = PersonalDebt {
            id: Uuid::new_v4(),
            amount,
            paid_by,
            owed_by,
            description,
            date: cmd.date,
            added_by,
            is_paid: false,
            paid_at: None,
            created_at: self.clock.now(),
        };
        personal_debts::ActiveModel::from(&debt)
            .insert(&self.database)
            .await?;
        Ok(debt)
    }

    /// Lists advances, newest first. `is_paid` narrows to paid or open ones.
    pub async fn list_personal_debts(&self, is_paid: Option<bool>) -> ResultEngine<Vec<PersonalDebt>> {
        let mut query = personal_debts::Entity::find();
        if let Some(is_paid) = is_paid {
            query = query.filter(personal_debts::Column::IsPaid.eq(is_paid));
        }
        query
            .order_by_desc(personal_debts::Column::Date)
            .order_by_desc(personal_debts::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(PersonalDebt::try_from)
            .collect()
    }

    /// Marks an open advance as paid now.
    pub async fn mark_debt_paid(&self, id: Uuid) -> ResultEngine<PersonalDebt> {
        let paid_at = self.clock.now();
        with_tx!(self, |db_tx| {
            let model = personal_debts::Entity::find_by_id(id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("personal debt not exists".to_string()))?;
            if model.is_paid {
                Err(EngineError::Conflict(
                    "personal debt already paid".to_string(),
                ))
            } else {
                let mut active: personal_debts::ActiveModel = model.into();
                active.is_paid = ActiveValue::Set(true);
                active.paid_at = ActiveValue::Set(Some(paid_at));
                let model = active.update(&db_tx).await?;
                PersonalDebt::try_from(model)
            }
        })
    }

    pub async fn delete_personal_debt(&self, id: Uuid) -> ResultEngine<()> {
        let res = personal_debts::Entity::delete_by_id(id)
            .exec(&self.database)
            .await?;
        if res.rows_affected == 0 {
            return Err(EngineError::KeyNotFound(
                "personal debt not exists".to_string(),
            ));
        }
        Ok(())
    }
}
