//! Expense primitives.
//!
//! An `Expense` is a shared cost paid by one participant and split 50/50 in
//! the monthly balance. Recurring templates materialize expenses with
//! `is_recurring = true` and `recurring_id` pointing back to the template.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Rent,
    Utilities,
    Meals,
    Groceries,
    Pet,
    Subscriptions,
    Leisure,
    Health,
    Transport,
    Other,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Self::Rent,
        Self::Utilities,
        Self::Meals,
        Self::Groceries,
        Self::Pet,
        Self::Subscriptions,
        Self::Leisure,
        Self::Health,
        Self::Transport,
        Self::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rent => "rent",
            Self::Utilities => "utilities",
            Self::Meals => "meals",
            Self::Groceries => "groceries",
            Self::Pet => "pet",
            Self::Subscriptions => "subscriptions",
            Self::Leisure => "leisure",
            Self::Health => "health",
            Self::Transport => "transport",
            Self::Other => "other",
        }
    }
}

impl TryFrom<&str> for Category {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let value = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == value)
            .ok_or_else(|| EngineError::Validation(format!("invalid category: {value}")))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    DirectDebit,
    Cash,
    Transfer,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::DirectDebit => "direct_debit",
            Self::Cash => "cash",
            Self::Transfer => "transfer",
        }
    }
}

impl TryFrom<&str> for PaymentMethod {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "card" => Ok(Self::Card),
            "direct_debit" => Ok(Self::DirectDebit),
            "cash" => Ok(Self::Cash),
            "transfer" => Ok(Self::Transfer),
            other => Err(EngineError::Validation(format!(
                "invalid payment method: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub amount: MoneyCents,
    pub date: DateTime<Utc>,
    pub paid_by: String,
    pub added_by: String,
    pub description: String,
    pub payment_method: Option<PaymentMethod>,
    pub bank_account: Option<String>,
    pub category: Option<Category>,
    pub is_recurring: bool,
    pub recurring_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub amount_minor: i64,
    pub date: DateTimeUtc,
    pub paid_by: String,
    pub added_by: String,
    pub description: String,
    pub payment_method: Option<String>,
    pub bank_account: Option<String>,
    pub category: Option<String>,
    pub is_recurring: bool,
    pub recurring_id: Option<Uuid>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Expense> for ActiveModel {
    fn from(expense: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(expense.id),
            amount_minor: ActiveValue::Set(expense.amount.cents()),
            date: ActiveValue::Set(expense.date),
            paid_by: ActiveValue::Set(expense.paid_by.clone()),
            added_by: ActiveValue::Set(expense.added_by.clone()),
            description: ActiveValue::Set(expense.description.clone()),
            payment_method: ActiveValue::Set(
                expense.payment_method.map(|m| m.as_str().to_string()),
            ),
            bank_account: ActiveValue::Set(expense.bank_account.clone()),
            category: ActiveValue::Set(expense.category.map(|c| c.as_str().to_string())),
            is_recurring: ActiveValue::Set(expense.is_recurring),
            recurring_id: ActiveValue::Set(expense.recurring_id),
            created_at: ActiveValue::Set(expense.created_at),
        }
    }
}

impl TryFrom<Model> for Expense {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            amount: MoneyCents::new(model.amount_minor),
            date: model.date,
            paid_by: model.paid_by,
            added_by: model.added_by,
            description: model.description,
            payment_method: model
                .payment_method
                .as_deref()
                .map(PaymentMethod::try_from)
                .transpose()?,
            bank_account: model.bank_account,
            category: model
                .category
                .as_deref()
                .map(Category::try_from)
                .transpose()?,
            is_recurring: model.is_recurring,
            recurring_id: model.recurring_id,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trips_through_storage_name() {
        for category in Category::ALL {
            assert_eq!(Category::try_from(category.as_str()).unwrap(), category);
        }
        assert!(Category::try_from("fireworks").is_err());
    }

    #[test]
    fn payment_method_is_case_insensitive() {
        assert_eq!(
            PaymentMethod::try_from(" Direct_Debit ").unwrap(),
            PaymentMethod::DirectDebit
        );
        assert!(PaymentMethod::try_from("cheque").is_err());
    }
}
