use std::collections::HashMap;

use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, NewReimbursementCmd, Reimbursement, ResultEngine, personal_debts,
    reimbursement_debts, reimbursements,
    util::{distinct_parties, normalize_optional_text},
};

use super::{Engine, with_tx};

impl Engine {
    /// Records a reimbursement and settles the listed advances.
    ///
    /// Every id in `settles` must exist, otherwise nothing is written. Open
    /// advances are marked paid at the reimbursement date and linked to it;
    /// advances already paid are left alone and not linked.
    pub async fn create_reimbursement(
        &self,
        cmd: NewReimbursementCmd,
    ) -> ResultEngine<Reimbursement> {
        let amount = cmd.amount.ensure_storable("amount")?;
        let (from, to) = distinct_parties(&cmd.from, &cmd.to, ("from", "to"))?;
        let note = normalize_optional_text(cmd.note.as_deref());
        let mut requested = cmd.settles;
        requested.sort_unstable();
        requested.dedup();

        let mut reimbursement = Reimbursement {
            id: Uuid::new_v4(),
            amount,
            from,
            to,
            date: cmd.date,
            note,
            settled_debt_ids: Vec::new(),
            created_at: self.clock.now(),
        };

        let settled = with_tx!(self, |db_tx| {
            let debts = personal_debts::Entity::find()
                .filter(personal_debts::Column::Id.is_in(requested.clone()))
                .all(&db_tx)
                .await?;
            if let Some(missing) = requested
                .iter()
                .find(|id| !debts.iter().any(|debt| debt.id == **id))
            {
                Err(EngineError::KeyNotFound(format!(
                    "personal debt {missing} not exists"
                )))
            } else {
                let settled: Vec<Uuid> = debts
                    .iter()
                    .filter(|debt| !debt.is_paid)
                    .map(|debt| debt.id)
                    .collect();

                reimbursements::ActiveModel::from(&reimbursement)
                    .insert(&db_tx)
                    .await?;
                if !settled.is_empty() {
                    let links = settled.iter().map(|debt_id| reimbursement_debts::ActiveModel {
                        reimbursement_id: ActiveValue::Set(reimbursement.id),
                        debt_id: ActiveValue::Set(*debt_id),
                    });
                    reimbursement_debts::Entity::insert_many(links)
                        .exec_without_returning(&db_tx)
                        .await?;
                    personal_debts::Entity::update_many()
                        .set(personal_debts::ActiveModel {
                            is_paid: ActiveValue::Set(true),
                            paid_at: ActiveValue::Set(Some(reimbursement.date)),
                            ..Default::default()
                        })
                        .filter(personal_debts::Column::Id.is_in(settled.clone()))
                        .exec(&db_tx)
                        .await?;
                }
                Ok::<_, EngineError>(settled)
            }
        })?;

        tracing::debug!(
            reimbursement = %reimbursement.id,
            settled = settled.len(),
            "reimbursement created"
        );
        reimbursement.settled_debt_ids = settled;
        Ok(reimbursement)
    }

    /// Lists reimbursements, newest first, with the advances they settled.
    pub async fn list_reimbursements(&self) -> ResultEngine<Vec<Reimbursement>> {
        let models = reimbursements::Entity::find()
            .order_by_desc(reimbursements::Column::Date)
            .order_by_desc(reimbursements::Column::CreatedAt)
            .all(&self.database)
            .await?;

        let mut links: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for link in reimbursement_debts::Entity::find()
            .all(&self.database)
            .await?
        {
            links
                .entry(link.reimbursement_id)
                .or_default()
                .push(link.debt_id);
        }

        Ok(models
            .into_iter()
            .map(|model| {
                let settled = links.remove(&model.id).unwrap_or_default();
                Reimbursement::from_model(model, settled)
            })
            .collect())
    }

    /// Deletes a reimbursement and reopens the advances it settled.
    ///
    /// Returns the number of advances reopened.
    pub async fn delete_reimbursement(&self, id: Uuid) -> ResultEngine<u64> {
        with_tx!(self, |db_tx| {
            let model = reimbursements::Entity::find_by_id(id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("reimbursement not exists".to_string()))?;

            let debt_ids: Vec<Uuid> = reimbursement_debts::Entity::find()
                .filter(reimbursement_debts::Column::ReimbursementId.eq(model.id))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|link| link.debt_id)
                .collect();

            let reopened = if debt_ids.is_empty() {
                0
            } else {
                personal_debts::Entity::update_many()
                    .set(personal_debts::ActiveModel {
                        is_paid: ActiveValue::Set(false),
                        paid_at: ActiveValue::Set(None),
                        ..Default::default()
                    })
                    .filter(personal_debts::Column::Id.is_in(debt_ids))
                    .exec(&db_tx)
                    .await?
                    .rows_affected
            };
            reimbursement_debts::Entity::delete_many()
                .filter(reimbursement_debts::Column::ReimbursementId.eq(model.id))
                .exec(&db_tx)
                .await?;
            reimbursements::Entity::delete_by_id(model.id)
                .exec(&db_tx)
                .await?;

            tracing::debug!(reimbursement = %model.id, reopened, "reimbursement deleted");
            Ok::<_, EngineError>(reopened)
        })
    }
}
