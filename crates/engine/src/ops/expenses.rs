use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Expense, ExpenseFilter, NewExpenseCmd, RecurringExpense, ResultEngine, expenses,
    recurring,
    util::{normalize_optional_text, normalize_required_text},
};

use super::{Engine, with_tx};

impl Engine {
    /// Records a shared expense.
    ///
    /// With a recurrence the same transaction also stores a template whose
    /// `start_date` and `last_generated_at` are the expense date, so the next
    /// generation pass produces the following occurrence.
    pub async fn create_expense(&self, cmd: NewExpenseCmd) -> ResultEngine<Expense> {
        let amount = cmd.amount.ensure_storable("amount")?;
        let paid_by = normalize_required_text(&cmd.paid_by, "paid_by")?;
        let added_by = normalize_required_text(&cmd.added_by, "added_by")?;
        let description = normalize_required_text(&cmd.description, "description")?;
        let bank_account = normalize_optional_text(cmd.bank_account.as_deref());
        let now = self.clock.now();

        let template = cmd.recurrence.map(|recurrence| RecurringExpense {
            id: Uuid::new_v4(),
            amount,
            paid_by: paid_by.clone(),
            description: description.clone(),
            payment_method: cmd.payment_method,
            bank_account: bank_account.clone(),
            category: cmd.category,
            recurrence,
            start_date: cmd.date,
            last_generated_at: Some(cmd.date),
            is_active: true,
            created_at: now,
        });
        let expense = Expense {
            id: Uuid::new_v4(),
            amount,
            date: cmd.date,
            paid_by,
            added_by,
            description,
            payment_method: cmd.payment_method,
            bank_account,
            category: cmd.category,
            is_recurring: template.is_some(),
            recurring_id: template.as_ref().map(|t| t.id),
            created_at: now,
        };

        with_tx!(self, |db_tx| {
            if let Some(template) = &template {
                recurring::ActiveModel::from(template).insert(&db_tx).await?;
            }
            expenses::ActiveModel::from(&expense).insert(&db_tx).await?;
            Ok::<_, EngineError>(())
        })?;

        tracing::debug!(expense = %expense.id, recurring = ?expense.recurring_id, "expense created");
        Ok(expense)
    }

    /// Lists expenses matching `filter`, newest first.
    pub async fn list_expenses(&self, filter: &ExpenseFilter) -> ResultEngine<Vec<Expense>> {
        if let (Some(from), Some(to)) = (filter.from, filter.to)
            && from > to
        {
            return Err(EngineError::Validation(
                "invalid range: from must be <= to".to_string(),
            ));
        }

        let mut query = expenses::Entity::find();
        if let Some(from) = filter.from {
            query = query.filter(expenses::Column::Date.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(expenses::Column::Date.lte(to));
        }
        if let Some(category) = filter.category {
            query = query.filter(expenses::Column::Category.eq(category.as_str()));
        }
        if let Some(paid_by) = normalize_optional_text(filter.paid_by.as_deref()) {
            query = query.filter(expenses::Column::PaidBy.eq(paid_by));
        }

        query
            .order_by_desc(expenses::Column::Date)
            .order_by_desc(expenses::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Expense::try_from)
            .collect()
    }

    pub async fn expense(&self, id: Uuid) -> ResultEngine<Expense> {
        let model = expenses::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;
        Expense::try_from(model)
    }

    pub async fn delete_expense(&self, id: Uuid) -> ResultEngine<()> {
        let res = expenses::Entity::delete_by_id(id)
            .exec(&self.database)
            .await?;
        if res.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("expense not exists".to_string()));
        }
        Ok(())
    }
}
