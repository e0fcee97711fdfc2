//! Recurring expense templates.
//!
//! A template is not an expense: it never shows up in balances. The
//! generation pass materializes one [`Expense`](crate::Expense) per elapsed
//! occurrence and records the occurrence in `last_generated_at`.

use chrono::{DateTime, Duration, Months, Utc};
use chrono_tz::Tz;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Category, EngineError, MoneyCents, PaymentMethod, ResultEngine, period::local_to_utc};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Recurrence {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }

    /// Next occurrence after `from`, stepped on the wall clock of `tz`.
    ///
    /// Months and years use calendar arithmetic: the day of month is kept
    /// when it exists and clamped to the last day otherwise (Jan 31 + 1 month
    /// is Feb 29 in a leap year). The local time of day is preserved across
    /// DST changes.
    pub fn advance(self, from: DateTime<Utc>, tz: Tz) -> ResultEngine<DateTime<Utc>> {
        let local = from.with_timezone(&tz).naive_local();
        let next = match self {
            Self::Weekly => local.checked_add_signed(Duration::days(7)),
            Self::Monthly => local.checked_add_months(Months::new(1)),
            Self::Quarterly => local.checked_add_months(Months::new(3)),
            Self::Yearly => local.checked_add_months(Months::new(12)),
        }
        .ok_or_else(|| {
            EngineError::Validation(format!("cannot advance {from} by one {}", self.as_str()))
        })?;
        local_to_utc(tz, Some(next))
    }
}

impl TryFrom<&str> for Recurrence {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "yearly" => Ok(Self::Yearly),
            other => Err(EngineError::Validation(format!(
                "invalid recurrence: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for Recurrence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringExpense {
    pub id: Uuid,
    pub amount: MoneyCents,
    pub paid_by: String,
    pub description: String,
    pub payment_method: Option<PaymentMethod>,
    pub bank_account: Option<String>,
    pub category: Option<Category>,
    pub recurrence: Recurrence,
    pub start_date: DateTime<Utc>,
    pub last_generated_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl RecurringExpense {
    /// The occurrence the next generation pass will materialize.
    pub fn next_occurrence(&self, tz: Tz) -> ResultEngine<DateTime<Utc>> {
        self.recurrence
            .advance(self.last_generated_at.unwrap_or(self.start_date), tz)
    }

    /// `Some(date)` when an occurrence is due at `now`.
    pub fn due_at(&self, now: DateTime<Utc>, tz: Tz) -> ResultEngine<Option<DateTime<Utc>>> {
        if !self.is_active {
            return Ok(None);
        }
        let next = self.next_occurrence(tz)?;
        Ok((next <= now).then_some(next))
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "recurring_expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub amount_minor: i64,
    pub paid_by: String,
    pub description: String,
    pub payment_method: Option<String>,
    pub bank_account: Option<String>,
    pub category: Option<String>,
    pub recurrence: String,
    pub start_date: DateTimeUtc,
    pub last_generated_at: Option<DateTimeUtc>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&RecurringExpense> for ActiveModel {
    fn from(template: &RecurringExpense) -> Self {
        Self {
            id: ActiveValue::Set(template.id),
            amount_minor: ActiveValue::Set(template.amount.cents()),
            paid_by: ActiveValue::Set(template.paid_by.clone()),
            description: ActiveValue::Set(template.description.clone()),
            payment_method: ActiveValue::Set(
                template.payment_method.map(|m| m.as_str().to_string()),
            ),
            bank_account: ActiveValue::Set(template.bank_account.clone()),
            category: ActiveValue::Set(template.category.map(|c| c.as_str().to_string())),
            recurrence: ActiveValue::Set(template.recurrence.as_str().to_string()),
            start_date: ActiveValue::Set(template.start_date),
            last_generated_at: ActiveValue::Set(template.last_generated_at),
            is_active: ActiveValue::Set(template.is_active),
            created_at: ActiveValue::Set(template.created_at),
        }
    }
}

impl TryFrom<Model> for RecurringExpense {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            amount: MoneyCents::new(model.amount_minor),
            paid_by: model.paid_by,
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
            recurrence: Recurrence::try_from(model.recurrence.as_str())?,
            start_date: model.start_date,
            last_generated_at: model.last_generated_at,
            is_active: model.is_active,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono_tz::{Europe::Paris, UTC};

    use super::*;

    fn paris(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Paris
            .with_ymd_and_hms(y, m, d, 0, 0, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn template(recurrence: Recurrence) -> RecurringExpense {
        RecurringExpense {
            id: Uuid::new_v4(),
            amount: MoneyCents::new(5000),
            paid_by: "Claire".to_string(),
            description: "Internet".to_string(),
            payment_method: None,
            bank_account: None,
            category: Some(Category::Subscriptions),
            recurrence,
            start_date: at(2024, 1, 15),
            last_generated_at: None,
            is_active: true,
            created_at: at(2024, 1, 15),
        }
    }

    #[test]
    fn advance_uses_calendar_arithmetic() {
        assert_eq!(Recurrence::Weekly.advance(at(2024, 2, 26), UTC).unwrap(), at(2024, 3, 4));
        assert_eq!(Recurrence::Monthly.advance(at(2024, 1, 15), UTC).unwrap(), at(2024, 2, 15));
        assert_eq!(Recurrence::Monthly.advance(at(2024, 1, 31), UTC).unwrap(), at(2024, 2, 29));
        assert_eq!(Recurrence::Quarterly.advance(at(2024, 11, 30), UTC).unwrap(), at(2025, 2, 28));
        assert_eq!(Recurrence::Yearly.advance(at(2024, 2, 29), UTC).unwrap(), at(2025, 2, 28));
    }

    #[test]
    fn local_midnight_keeps_its_day_across_months() {
        // Paris midnight on the 1st is still the previous day in UTC.
        assert_eq!(
            Recurrence::Monthly.advance(paris(2024, 2, 1), Paris).unwrap(),
            paris(2024, 3, 1)
        );
        // Crosses the switch to summer time on 2024-03-31.
        assert_eq!(
            Recurrence::Monthly.advance(paris(2024, 3, 1), Paris).unwrap(),
            paris(2024, 4, 1)
        );
        assert_eq!(
            Recurrence::Weekly.advance(paris(2024, 3, 28), Paris).unwrap(),
            paris(2024, 4, 4)
        );
        assert_eq!(
            Recurrence::Monthly.advance(paris(2024, 1, 31), Paris).unwrap(),
            paris(2024, 2, 29)
        );
    }

    #[test]
    fn next_occurrence_starts_from_last_generation() {
        let mut t = template(Recurrence::Monthly);
        assert_eq!(t.next_occurrence(UTC).unwrap(), at(2024, 2, 15));
        t.last_generated_at = Some(at(2024, 2, 15));
        assert_eq!(t.next_occurrence(UTC).unwrap(), at(2024, 3, 15));
    }

    #[test]
    fn due_only_when_active_and_elapsed() {
        let mut t = template(Recurrence::Monthly);
        assert_eq!(t.due_at(at(2024, 2, 14), UTC).unwrap(), None);
        assert_eq!(t.due_at(at(2024, 2, 15), UTC).unwrap(), Some(at(2024, 2, 15)));
        t.is_active = false;
        assert_eq!(t.due_at(at(2024, 6, 1), UTC).unwrap(), None);
    }

    #[test]
    fn recurrence_parsing_rejects_unknown_values() {
        assert_eq!(Recurrence::try_from("Monthly").unwrap(), Recurrence::Monthly);
        assert!(Recurrence::try_from("daily").is_err());
    }
}
