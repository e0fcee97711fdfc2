use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, Expense, RecurringExpense, ResultEngine, expenses, recurring};

use super::{Engine, with_tx};

/// Payer recorded on generated instances when the template has none.
pub const UNKNOWN_PARTICIPANT: &str = "unknown";

fn materialize(template: &RecurringExpense, date: DateTime<Utc>, now: DateTime<Utc>) -> Expense {
    let payer = if template.paid_by.trim().is_empty() {
        UNKNOWN_PARTICIPANT.to_string()
    } else {
        template.paid_by.clone()
    };
    Expense {
        id: Uuid::new_v4(),
        amount: template.amount,
        date,
        paid_by: payer.clone(),
        added_by: payer,
        description: template.description.clone(),
        payment_method: template.payment_method,
        bank_account: template.bank_account.clone(),
        category: template.category,
        is_recurring: true,
        recurring_id: Some(template.id),
        created_at: now,
    }
}

impl Engine {
    /// Runs one generation pass at the clock's current instant.
    pub async fn generate_recurring(&self) -> ResultEngine<Vec<Expense>> {
        self.generate_recurring_at(self.clock.now()).await
    }

    /// Materializes at most one occurrence per active template.
    ///
    /// A template is due when `advance(last_generated_at or start_date) <=
    /// now`, stepping on the household calendar. Each template is handled in its own DB transaction: the instance
    /// insert and the `last_generated_at` bump commit together, so rerunning
    /// with the same `now` generates nothing. A template that fell several
    /// periods behind catches up one occurrence per pass.
    pub async fn generate_recurring_at(&self, now: DateTime<Utc>) -> ResultEngine<Vec<Expense>> {
        let templates = self.list_recurring(false).await?;
        tracing::debug!(templates = templates.len(), %now, "recurring generation pass");

        let mut generated = Vec::new();
        for template in templates {
            let Some(date) = template.due_at(now, self.timezone)? else {
                continue;
            };

            let expense = with_tx!(self, |db_tx| {
                // Another pass may have advanced the template in the meantime.
                let current = recurring::Entity::find_by_id(template.id)
                    .filter(recurring::Column::IsActive.eq(true))
                    .one(&db_tx)
                    .await?
                    .map(RecurringExpense::try_from)
                    .transpose()?
                    .filter(|t| matches!(t.due_at(now, self.timezone), Ok(Some(due)) if due == date));

                match current {
                    Some(current) => {
                        let expense = materialize(&current, date, self.clock.now());
                        expenses::ActiveModel::from(&expense).insert(&db_tx).await?;
                        recurring::ActiveModel {
                            id: ActiveValue::Unchanged(current.id),
                            last_generated_at: ActiveValue::Set(Some(date)),
                            ..Default::default()
                        }
                        .update(&db_tx)
                        .await?;
                        Ok::<_, EngineError>(Some(expense))
                    }
                    None => Ok(None),
                }
            })?;

            if let Some(expense) = expense {
                tracing::debug!(
                    template = %template.id,
                    expense = %expense.id,
                    date = %expense.date,
                    "recurring expense generated"
                );
                generated.push(expense);
            }
        }

        tracing::info!(generated = generated.len(), "recurring generation done");
        Ok(generated)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::{MoneyCents, Recurrence};

    fn template(paid_by: &str) -> RecurringExpense {
        let start = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        RecurringExpense {
            id: Uuid::new_v4(),
            amount: MoneyCents::new(85_000),
            paid_by: paid_by.to_string(),
            description: "Rent".to_string(),
            payment_method: None,
            bank_account: Some("joint".to_string()),
            category: None,
            recurrence: Recurrence::Monthly,
            start_date: start,
            last_generated_at: Some(start),
            is_active: true,
            created_at: start,
        }
    }

    #[test]
    fn instance_copies_template_fields() {
        let template = template("Claire");
        let date = Utc.with_ymd_and_hms(2024, 2, 15, 0, 0, 0).unwrap();
        let expense = materialize(&template, date, date);

        assert_eq!(expense.date, date);
        assert_eq!(expense.amount, template.amount);
        assert_eq!(expense.paid_by, "Claire");
        assert_eq!(expense.added_by, "Claire");
        assert_eq!(expense.bank_account.as_deref(), Some("joint"));
        assert!(expense.is_recurring);
        assert_eq!(expense.recurring_id, Some(template.id));
    }

    #[test]
    fn blank_payer_becomes_unknown() {
        let date = Utc.with_ymd_and_hms(2024, 2, 15, 0, 0, 0).unwrap();
        let expense = materialize(&template("  "), date, date);
        assert_eq!(expense.paid_by, UNKNOWN_PARTICIPANT);
        assert_eq!(expense.added_by, UNKNOWN_PARTICIPANT);
    }
}
