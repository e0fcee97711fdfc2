use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, Period, RecurringExpense, ResultEngine, UpdateRecurringCmd, expenses, recurring,
    util::{normalize_optional_text, normalize_required_text},
};

use super::{Engine, with_tx};

/// Outcome of a template edit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringUpdate {
    pub template: RecurringExpense,
    /// Instances of the current period rewritten with the new values.
    pub propagated: u64,
}

/// Ids of the template's generated instances dated in `period`.
async fn current_instance_ids<C: ConnectionTrait>(
    db: &C,
    template_id: Uuid,
    period: &Period,
) -> ResultEngine<Vec<Uuid>> {
    let instances = expenses::Entity::find()
        .filter(expenses::Column::RecurringId.eq(template_id))
        .filter(expenses::Column::IsRecurring.eq(true))
        .all(db)
        .await?;
    Ok(instances
        .into_iter()
        .filter(|model| period.contains(model.date))
        .map(|model| model.id)
        .collect())
}

async fn require_template<C: ConnectionTrait>(db: &C, id: Uuid) -> ResultEngine<RecurringExpense> {
    let model = recurring::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("recurring expense not exists".to_string()))?;
    RecurringExpense::try_from(model)
}

impl Engine {
    /// Lists templates, oldest start first.
    pub async fn list_recurring(&self, include_inactive: bool) -> ResultEngine<Vec<RecurringExpense>> {
        let mut query = recurring::Entity::find();
        if !include_inactive {
            query = query.filter(recurring::Column::IsActive.eq(true));
        }
        query
            .order_by_asc(recurring::Column::StartDate)
            .order_by_asc(recurring::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(RecurringExpense::try_from)
            .collect()
    }

    pub async fn recurring_expense(&self, id: Uuid) -> ResultEngine<RecurringExpense> {
        require_template(&self.database, id).await
    }

    /// Patches a template and rewrites its instances of the current period.
    ///
    /// Only instances dated in the month containing `clock.now()` are
    /// touched; their date is kept and the recurrence is never copied.
    /// `added_by` follows `paid_by` only when the payer changes. A patch that
    /// only changes the recurrence or pauses the template leaves instances
    /// alone.
    pub async fn update_recurring(&self, cmd: UpdateRecurringCmd) -> ResultEngine<RecurringUpdate> {
        let amount = cmd
            .amount
            .map(|amount| amount.ensure_storable("amount"))
            .transpose()?;
        let paid_by = cmd
            .paid_by
            .as_deref()
            .map(|value| normalize_required_text(value, "paid_by"))
            .transpose()?;
        let description = cmd
            .description
            .as_deref()
            .map(|value| normalize_required_text(value, "description"))
            .transpose()?;
        let bank_account = cmd
            .bank_account
            .as_ref()
            .map(|value| normalize_optional_text(value.as_deref()));
        let touches_instances = amount.is_some()
            || paid_by.is_some()
            || description.is_some()
            || cmd.payment_method.is_some()
            || bank_account.is_some()
            || cmd.category.is_some();
        let period = self.current_period()?;

        with_tx!(self, |db_tx| {
            let mut template = require_template(&db_tx, cmd.id).await?;
            let payer_changed = paid_by
                .as_ref()
                .is_some_and(|payer| *payer != template.paid_by);

            if let Some(amount) = amount {
                template.amount = amount;
            }
            if let Some(paid_by) = paid_by {
                template.paid_by = paid_by;
            }
            if let Some(description) = description {
                template.description = description;
            }
            if let Some(payment_method) = cmd.payment_method {
                template.payment_method = payment_method;
            }
            if let Some(bank_account) = bank_account {
                template.bank_account = bank_account;
            }
            if let Some(category) = cmd.category {
                template.category = category;
            }
            if let Some(recurrence) = cmd.recurrence {
                template.recurrence = recurrence;
            }
            if let Some(is_active) = cmd.is_active {
                template.is_active = is_active;
            }

            recurring::ActiveModel::from(&template).update(&db_tx).await?;

            let ids = if touches_instances {
                current_instance_ids(&db_tx, template.id, &period).await?
            } else {
                Vec::new()
            };
            let propagated = if ids.is_empty() {
                0
            } else {
                let patch = expenses::ActiveModel {
                    amount_minor: ActiveValue::Set(template.amount.cents()),
                    paid_by: ActiveValue::Set(template.paid_by.clone()),
                    added_by: if payer_changed {
                        ActiveValue::Set(template.paid_by.clone())
                    } else {
                        ActiveValue::NotSet
                    },
                    description: ActiveValue::Set(template.description.clone()),
                    payment_method: ActiveValue::Set(
                        template.payment_method.map(|m| m.as_str().to_string()),
                    ),
                    bank_account: ActiveValue::Set(template.bank_account.clone()),
                    category: ActiveValue::Set(
                        template.category.map(|c| c.as_str().to_string()),
                    ),
                    ..Default::default()
                };
                expenses::Entity::update_many()
                    .set(patch)
                    .filter(expenses::Column::Id.is_in(ids))
                    .exec(&db_tx)
                    .await?
                    .rows_affected
            };

            tracing::debug!(
                template = %template.id,
                propagated,
                year = period.year,
                month = period.month,
                "recurring template updated"
            );
            Ok::<_, EngineError>(RecurringUpdate {
                template,
                propagated,
            })
        })
    }

    /// Deletes a template together with its instances of the current period.
    ///
    /// Returns the number of instances removed. Older instances stay and keep
    /// their `recurring_id`.
    pub async fn delete_recurring(&self, id: Uuid) -> ResultEngine<u64> {
        let period = self.current_period()?;

        with_tx!(self, |db_tx| {
            let template = require_template(&db_tx, id).await?;
            let ids = current_instance_ids(&db_tx, template.id, &period).await?;
            let removed = if ids.is_empty() {
                0
            } else {
                expenses::Entity::delete_many()
                    .filter(expenses::Column::Id.is_in(ids))
                    .exec(&db_tx)
                    .await?
                    .rows_affected
            };
            recurring::Entity::delete_by_id(template.id)
                .exec(&db_tx)
                .await?;

            tracing::debug!(template = %template.id, removed, "recurring template deleted");
            Ok::<_, EngineError>(removed)
        })
    }
}
